pub mod traits;

// Collaborator implementations
pub mod gemini;
pub mod memory_store;
pub mod static_identity;
