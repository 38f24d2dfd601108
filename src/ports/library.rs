use serde_json::Value;
use thiserror::Error;

/// Key of a loaded album: the release id it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlbumId(pub String);

impl AlbumId {
    pub fn new(release_id: impl Into<String>) -> Self {
        Self(release_id.into())
    }
}

/// Key of a local file tracked by the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub u64);

/// Errors from committing a selection into the library.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("no file {0:?} in the library")]
    UnknownFile(FileId),

    #[error("no results to choose from")]
    NoResults,

    #[error("row {0} is out of range")]
    InvalidRow(usize),

    #[error("candidate has no source node")]
    MissingSourceNode,
}

/// Mutations the selection commit performs on the album/track/file tree.
///
/// Implemented by `library::Library` in production and by a mock in tests.
#[cfg_attr(test, mockall::automock)]
pub trait LibraryOps {
    /// Re-parent a file onto a track of the given release, loading the
    /// album on demand.
    fn move_file_to_track(
        &mut self,
        file: FileId,
        release_id: &str,
        recording_id: &str,
    ) -> Result<(), ReconcileError>;

    /// Re-parent a file onto a standalone (non-album) recording.
    fn move_file_to_standalone(
        &mut self,
        file: FileId,
        recording_id: &str,
    ) -> Result<(), ReconcileError>;

    /// Load an album for the given release id. Idempotent.
    fn load_album(&mut self, release_id: &str) -> Result<(), ReconcileError>;

    /// Load a standalone recording from its raw catalog node.
    fn load_standalone_recording(
        &mut self,
        recording_id: &str,
        raw_node: &Value,
    ) -> Result<(), ReconcileError>;

    /// Remove an album, unless it still owns files.
    fn remove_album_if_empty(&mut self, album: &AlbumId) -> Result<(), ReconcileError>;

    /// Record that this release of the release group is being tracked.
    fn mark_album_loaded(&mut self, release_group_id: &str, release_id: &str);

    /// Number of files currently owned by an album's tracks.
    fn album_file_count(&self, album: &AlbumId) -> usize;
}
