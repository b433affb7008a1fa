//! 文本文件句柄与 JSON 文档存取工具库
//!
//! 提供六种打开模式的文件句柄（整段读取、写入、按字节偏移定位），
//! 以及基于它的整文档 JSON 落盘/加载。

pub mod model;
pub mod utils;

// 重新导出主要类型
pub use model::error::{ErrorCode, FileError};
pub use model::file_handle::FileHandle;
pub use model::json_store::{dump, empty_document, load, JsonDocument, JsonFormat, JsonStore, StoreConfig};
pub use model::open_mode::{AccessFlags, OpenMode};
pub use utils::fs::{FileSystem, OsFileSystem};
pub use utils::memory_fs::MemoryFileSystem;
