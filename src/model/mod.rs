pub mod error;
pub mod file_handle;
pub mod json_store;
pub mod open_mode;
