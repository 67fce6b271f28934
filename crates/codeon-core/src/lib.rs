pub mod clients;
pub mod codebase;
pub mod error;
pub mod fix;
pub mod history;
pub mod transcript;

// Re-export common error type
pub use error::CodeonError;
pub use error::Result;
