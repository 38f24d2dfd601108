use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::debug;

use crate::ports::library::{AlbumId, FileId, LibraryOps, ReconcileError};

/// Where a file currently lives in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileParent {
    /// Matched onto a track of a loaded album.
    Track {
        album: AlbumId,
        recording_id: String,
    },
    /// Matched onto a standalone (non-album) recording.
    Standalone { recording_id: String },
}

#[derive(Debug)]
struct LibraryFile {
    name: String,
    parent: Option<FileParent>,
}

#[derive(Debug, Default)]
struct Album {
    /// Number of files currently matched onto this album's tracks.
    file_count: usize,
}

#[derive(Debug, Default)]
struct StandaloneRecording {
    title: String,
    file_count: usize,
}

/// In-memory ownership tree of albums, standalone recordings, and files.
///
/// Albums and recordings are owned here, keyed by id; files refer to their
/// parent by id only. Moving a file reassigns that reference and adjusts
/// the file counts on both ends, so the counts always equal the number of
/// files pointing at each parent.
#[derive(Debug, Default)]
pub struct Library {
    files: HashMap<FileId, LibraryFile>,
    albums: HashMap<AlbumId, Album>,
    standalone: HashMap<String, StandaloneRecording>,
    /// Release group id -> release ids currently tracked for it.
    loaded_groups: HashMap<String, HashSet<String>>,
    next_file_id: u64,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a local file; it starts unmatched.
    pub fn add_file(&mut self, name: impl Into<String>) -> FileId {
        let id = FileId(self.next_file_id);
        self.next_file_id += 1;
        self.files.insert(
            id,
            LibraryFile {
                name: name.into(),
                parent: None,
            },
        );
        id
    }

    pub fn file_name(&self, file: FileId) -> Option<&str> {
        self.files.get(&file).map(|f| f.name.as_str())
    }

    pub fn file_parent(&self, file: FileId) -> Option<&FileParent> {
        self.files.get(&file).and_then(|f| f.parent.as_ref())
    }

    /// The album a file would have to be cleaned out of, if it is moved:
    /// set only when the file is currently matched onto an album track.
    pub fn previous_album_of(&self, file: FileId) -> Option<AlbumId> {
        match self.file_parent(file)? {
            FileParent::Track { album, .. } => Some(album.clone()),
            FileParent::Standalone { .. } => None,
        }
    }

    pub fn has_album(&self, album: &AlbumId) -> bool {
        self.albums.contains_key(album)
    }

    pub fn has_standalone_recording(&self, recording_id: &str) -> bool {
        self.standalone.contains_key(recording_id)
    }

    pub fn album_count(&self) -> usize {
        self.albums.len()
    }

    pub fn is_release_loaded(&self, release_group_id: &str, release_id: &str) -> bool {
        self.loaded_groups
            .get(release_group_id)
            .is_some_and(|releases| releases.contains(release_id))
    }

    /// Detach a file from its current parent, decrementing that parent's
    /// file count. The caller attaches it somewhere else afterwards.
    fn detach(&mut self, file: FileId) -> Result<(), ReconcileError> {
        let previous = self
            .files
            .get_mut(&file)
            .ok_or(ReconcileError::UnknownFile(file))?
            .parent
            .take();

        match previous {
            Some(FileParent::Track { album, .. }) => {
                if let Some(entry) = self.albums.get_mut(&album) {
                    entry.file_count = entry.file_count.saturating_sub(1);
                }
            }
            Some(FileParent::Standalone { recording_id }) => {
                if let Some(entry) = self.standalone.get_mut(&recording_id) {
                    entry.file_count = entry.file_count.saturating_sub(1);
                }
            }
            None => {}
        }
        Ok(())
    }

    fn attach(&mut self, file: FileId, parent: FileParent) {
        match &parent {
            FileParent::Track { album, .. } => {
                self.albums.entry(album.clone()).or_default().file_count += 1;
            }
            FileParent::Standalone { recording_id } => {
                self.standalone
                    .entry(recording_id.clone())
                    .or_default()
                    .file_count += 1;
            }
        }
        if let Some(entry) = self.files.get_mut(&file) {
            entry.parent = Some(parent);
        }
    }
}

impl LibraryOps for Library {
    fn move_file_to_track(
        &mut self,
        file: FileId,
        release_id: &str,
        recording_id: &str,
    ) -> Result<(), ReconcileError> {
        self.detach(file)?;
        self.attach(
            file,
            FileParent::Track {
                album: AlbumId::new(release_id),
                recording_id: recording_id.to_string(),
            },
        );
        debug!(file = file.0, release_id, recording_id, "file moved to track");
        Ok(())
    }

    fn move_file_to_standalone(
        &mut self,
        file: FileId,
        recording_id: &str,
    ) -> Result<(), ReconcileError> {
        self.detach(file)?;
        self.attach(
            file,
            FileParent::Standalone {
                recording_id: recording_id.to_string(),
            },
        );
        debug!(file = file.0, recording_id, "file moved to standalone recording");
        Ok(())
    }

    fn load_album(&mut self, release_id: &str) -> Result<(), ReconcileError> {
        self.albums.entry(AlbumId::new(release_id)).or_default();
        debug!(release_id, "album loaded");
        Ok(())
    }

    fn load_standalone_recording(
        &mut self,
        recording_id: &str,
        raw_node: &Value,
    ) -> Result<(), ReconcileError> {
        let title = raw_node
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.standalone
            .entry(recording_id.to_string())
            .or_default()
            .title = title;
        debug!(recording_id, "standalone recording loaded");
        Ok(())
    }

    fn remove_album_if_empty(&mut self, album: &AlbumId) -> Result<(), ReconcileError> {
        match self.albums.get(album) {
            Some(entry) if entry.file_count == 0 => {
                self.albums.remove(album);
                debug!(album = %album.0, "empty album removed");
            }
            Some(entry) => {
                debug!(album = %album.0, files = entry.file_count, "album still owns files, kept");
            }
            None => {}
        }
        Ok(())
    }

    fn mark_album_loaded(&mut self, release_group_id: &str, release_id: &str) {
        self.loaded_groups
            .entry(release_group_id.to_string())
            .or_default()
            .insert(release_id.to_string());
    }

    fn album_file_count(&self, album: &AlbumId) -> usize {
        self.albums.get(album).map_or(0, |entry| entry.file_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::candidate::CandidateRecord;
    use crate::search::reconciler::{ReconciliationContext, commit_selection};
    use serde_json::json;

    fn release_candidate(release_id: &str, recording_id: &str) -> CandidateRecord {
        CandidateRecord {
            recording_id: recording_id.into(),
            release_id: Some(release_id.into()),
            release_group_id: Some(format!("rg-{release_id}")),
            ..CandidateRecord::default()
        }
    }

    fn standalone_candidate(recording_id: &str) -> CandidateRecord {
        CandidateRecord {
            recording_id: recording_id.into(),
            ..CandidateRecord::default()
        }
    }

    /// A file is owned by exactly one parent, and counts agree with the
    /// files pointing at them.
    fn assert_consistent(library: &Library) {
        let mut counted: HashMap<FileParent, usize> = HashMap::new();
        for file in library.files.values() {
            if let Some(parent) = &file.parent {
                *counted.entry(parent.clone()).or_default() += 1;
            }
        }
        let mut album_totals: HashMap<&AlbumId, usize> = HashMap::new();
        let mut standalone_totals: HashMap<&str, usize> = HashMap::new();
        for (parent, count) in &counted {
            match parent {
                FileParent::Track { album, .. } => {
                    *album_totals.entry(album).or_default() += count;
                }
                FileParent::Standalone { recording_id } => {
                    *standalone_totals.entry(recording_id.as_str()).or_default() += count;
                }
            }
        }
        for (album, entry) in &library.albums {
            assert_eq!(
                entry.file_count,
                album_totals.get(album).copied().unwrap_or(0),
                "album {} count out of sync",
                album.0,
            );
        }
        for (recording_id, entry) in &library.standalone {
            assert_eq!(
                entry.file_count,
                standalone_totals.get(recording_id.as_str()).copied().unwrap_or(0),
                "standalone {recording_id} count out of sync",
            );
        }
    }

    #[test]
    fn test_move_round_trip_has_exactly_one_owner() {
        let mut library = Library::new();
        let file = library.add_file("track.flac");

        library.move_file_to_track(file, "rel-1", "rec-1").unwrap();
        assert!(matches!(
            library.file_parent(file),
            Some(FileParent::Track { .. })
        ));
        assert_eq!(library.album_file_count(&AlbumId::new("rel-1")), 1);
        assert_consistent(&library);

        library.move_file_to_standalone(file, "rec-1").unwrap();
        assert!(matches!(
            library.file_parent(file),
            Some(FileParent::Standalone { .. })
        ));
        assert_eq!(library.album_file_count(&AlbumId::new("rel-1")), 0);
        assert_consistent(&library);

        library.move_file_to_track(file, "rel-2", "rec-1").unwrap();
        assert_eq!(library.album_file_count(&AlbumId::new("rel-2")), 1);
        assert_consistent(&library);
    }

    #[test]
    fn test_moving_an_unknown_file_fails() {
        let mut library = Library::new();
        assert!(matches!(
            library.move_file_to_track(FileId(99), "rel-1", "rec-1"),
            Err(ReconcileError::UnknownFile(FileId(99)))
        ));
    }

    #[test]
    fn test_sole_file_album_is_removed_after_commit() {
        let mut library = Library::new();
        let file = library.add_file("track.flac");
        library.move_file_to_track(file, "old-rel", "old-rec").unwrap();

        let context =
            ReconciliationContext::for_file(file, library.previous_album_of(file));
        commit_selection(
            &release_candidate("new-rel", "rec-1"),
            None,
            &context,
            &mut library,
        )
        .unwrap();

        assert!(!library.has_album(&AlbumId::new("old-rel")));
        assert!(library.has_album(&AlbumId::new("new-rel")));
        assert!(library.is_release_loaded("rg-new-rel", "new-rel"));
        assert_consistent(&library);
    }

    #[test]
    fn test_shared_album_survives_a_commit() {
        let mut library = Library::new();
        let moving = library.add_file("a.flac");
        let staying = library.add_file("b.flac");
        library.move_file_to_track(moving, "old-rel", "rec-a").unwrap();
        library.move_file_to_track(staying, "old-rel", "rec-b").unwrap();

        let context =
            ReconciliationContext::for_file(moving, library.previous_album_of(moving));
        commit_selection(
            &release_candidate("new-rel", "rec-1"),
            None,
            &context,
            &mut library,
        )
        .unwrap();

        assert!(library.has_album(&AlbumId::new("old-rel")));
        assert_eq!(library.album_file_count(&AlbumId::new("old-rel")), 1);
        assert_consistent(&library);
    }

    #[test]
    fn test_standalone_commit_cleans_up_previous_album() {
        let mut library = Library::new();
        let file = library.add_file("track.flac");
        library.move_file_to_track(file, "old-rel", "old-rec").unwrap();

        let context =
            ReconciliationContext::for_file(file, library.previous_album_of(file));
        commit_selection(&standalone_candidate("rec-1"), None, &context, &mut library).unwrap();

        assert!(!library.has_album(&AlbumId::new("old-rel")));
        assert!(library.has_standalone_recording("rec-1"));
        assert_consistent(&library);
    }

    #[test]
    fn test_detached_commit_loads_without_touching_files() {
        let mut library = Library::new();
        commit_selection(
            &release_candidate("rel-1", "rec-1"),
            None,
            &ReconciliationContext::detached(),
            &mut library,
        )
        .unwrap();

        assert!(library.has_album(&AlbumId::new("rel-1")));
        assert_eq!(library.album_file_count(&AlbumId::new("rel-1")), 0);
    }

    #[test]
    fn test_standalone_load_uses_the_raw_node() {
        let mut library = Library::new();
        let node = json!({ "id": "rec-1", "title": "Alone" });
        commit_selection(
            &standalone_candidate("rec-1"),
            Some(&node),
            &ReconciliationContext::detached(),
            &mut library,
        )
        .unwrap();

        assert!(library.has_standalone_recording("rec-1"));
        assert_eq!(library.standalone["rec-1"].title, "Alone");
    }

    #[test]
    fn test_remove_album_if_empty_keeps_occupied_albums() {
        let mut library = Library::new();
        let file = library.add_file("track.flac");
        library.move_file_to_track(file, "rel-1", "rec-1").unwrap();

        library.remove_album_if_empty(&AlbumId::new("rel-1")).unwrap();
        assert!(library.has_album(&AlbumId::new("rel-1")));

        // Unknown albums are a no-op
        library.remove_album_if_empty(&AlbumId::new("missing")).unwrap();
    }

    #[test]
    fn test_load_album_is_idempotent() {
        let mut library = Library::new();
        library.load_album("rel-1").unwrap();
        let file = library.add_file("track.flac");
        library.move_file_to_track(file, "rel-1", "rec-1").unwrap();
        library.load_album("rel-1").unwrap();

        assert_eq!(library.album_count(), 1);
        assert_eq!(library.album_file_count(&AlbumId::new("rel-1")), 1);
    }

    #[test]
    fn test_mark_album_loaded_tracks_pairings() {
        let mut library = Library::new();
        library.mark_album_loaded("rg-1", "rel-1");
        library.mark_album_loaded("rg-1", "rel-2");
        library.mark_album_loaded("rg-1", "rel-1");

        assert!(library.is_release_loaded("rg-1", "rel-1"));
        assert!(library.is_release_loaded("rg-1", "rel-2"));
        assert!(!library.is_release_loaded("rg-1", "rel-3"));
        assert!(!library.is_release_loaded("rg-2", "rel-1"));
    }
}
