pub mod core;
pub mod nlp;
pub mod scraping;
pub mod service;
pub mod tools;

// --- Primary core exports ---
pub use core::types;
pub use core::types::*;
pub use core::AppState;

// --- Short module paths ---
pub use nlp::query_rewriter;
pub use service::stdio as stdio_service;
pub use service::ServiceManager;
pub use tools::stackoverflow;
