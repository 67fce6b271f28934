pub mod apply;
pub mod history_file;
pub mod loader;
pub mod paths;

pub use crate::apply::{AppliedChange, BACKUP_SUFFIX, apply_file_change};
pub use crate::history_file::JsonHistoryRepository;
pub use crate::loader::CodebaseLoader;
