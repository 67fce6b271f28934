pub mod config;
pub mod gemini;
pub mod retrieval;

pub use crate::config::ApiConfig;
pub use crate::gemini::GeminiClient;
pub use crate::retrieval::HttpRetrievalClient;
