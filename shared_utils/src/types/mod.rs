//! Type-Safe Wrappers Module
//!
//! Newtypes that lift unit assumptions out of comments and into the
//! type system.

pub mod file_size;

// Re-exports for convenience
pub use file_size::FileSize;

// ============================================================================
// Property-Based Tests
// ============================================================================
