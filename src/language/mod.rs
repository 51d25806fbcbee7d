// Types representing oprex source constructs and compiled fragments

mod types;

// Re-export all public symbols
pub use types::*;
