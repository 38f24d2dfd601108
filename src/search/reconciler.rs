use serde_json::Value;
use tracing::debug;

use crate::ports::library::{AlbumId, FileId, LibraryOps, ReconcileError};
use crate::search::candidate::CandidateRecord;

/// What the dialog knew about its invoking file when it opened.
///
/// Built once per dialog session and immutable thereafter. `previous_album`
/// is set only when the file was already matched into an album track, which
/// is what makes it a move candidate for empty-album cleanup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationContext {
    pub file: Option<FileId>,
    pub previous_album: Option<AlbumId>,
}

impl ReconciliationContext {
    /// A pure search with no file attached.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn for_file(file: FileId, previous_album: Option<AlbumId>) -> Self {
        Self {
            file: Some(file),
            previous_album,
        }
    }
}

/// Commit a chosen candidate against the library.
///
/// The release-group pairing is marked before the move so a refresh
/// triggered by the move already sees the release as tracked. The previous
/// album is removed only when the move left it without files; a first-time
/// match has no previous album and skips cleanup. Nothing is retried here:
/// a failed operation propagates and the result set stays selectable.
pub fn commit_selection(
    candidate: &CandidateRecord,
    raw_node: Option<&Value>,
    context: &ReconciliationContext,
    library: &mut dyn LibraryOps,
) -> Result<(), ReconcileError> {
    match (&candidate.release_id, context.file) {
        (Some(release_id), Some(file)) => {
            mark_loaded(candidate, release_id, library);
            library.move_file_to_track(file, release_id, &candidate.recording_id)?;
            cleanup_previous_album(context, library)
        }
        (Some(release_id), None) => {
            mark_loaded(candidate, release_id, library);
            library.load_album(release_id)
        }
        (None, Some(file)) => {
            library.move_file_to_standalone(file, &candidate.recording_id)?;
            cleanup_previous_album(context, library)
        }
        (None, None) => {
            let node = raw_node.ok_or(ReconcileError::MissingSourceNode)?;
            library.load_standalone_recording(&candidate.recording_id, node)
        }
    }
}

fn mark_loaded(candidate: &CandidateRecord, release_id: &str, library: &mut dyn LibraryOps) {
    if let Some(group_id) = &candidate.release_group_id {
        library.mark_album_loaded(group_id, release_id);
    }
}

fn cleanup_previous_album(
    context: &ReconciliationContext,
    library: &mut dyn LibraryOps,
) -> Result<(), ReconcileError> {
    let Some(album) = &context.previous_album else {
        return Ok(());
    };
    if library.album_file_count(album) == 0 {
        debug!(album = %album.0, "previous album left without files, removing");
        library.remove_album_if_empty(album)?;
    }
    Ok(())
}
