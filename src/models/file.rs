use serde::Serialize;

/// One entry in a project's storage directory. There is no database row
/// behind this; the filesystem is the source of truth.
#[derive(Serialize, Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub size_bytes: i64,
}
