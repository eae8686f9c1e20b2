//! Utility modules: monetary rounding, validation, in-memory storage

pub mod memory_store;
pub mod money;
pub mod validation;

pub use memory_store::MemoryStore;
pub use money::*;
pub use validation::*;
