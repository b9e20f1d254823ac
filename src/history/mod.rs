pub mod location;
pub mod storage;
pub mod types;

pub use location::{
    default_fallback_dir, program_data_dir, resolve_location, DirProbe, FsProbe, ResolvedLocation,
    StorageLocations, StorageScope,
};
pub use storage::{HistoryStore, HISTORY_FILE_NAME};
pub use types::{find_by_prefix, HistoryEntry, HistoryFile};
