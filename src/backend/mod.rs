pub mod fs;
pub mod memory;

pub use fs::DirectorySource;
pub use memory::{MemoryRepo, MemorySource};
