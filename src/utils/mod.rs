pub mod fs;
pub mod memory_fs;
