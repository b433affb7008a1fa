//! 错误类型：四值兼容错误码 + 详细错误枚举

use std::path::PathBuf;

use thiserror::Error;

/// `open` 的兼容返回值，调用方据此分支
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoError,
    InvalidMode,
    FilePathNotExist,
    FailOpenFile,
}

#[derive(Error, Debug)]
pub enum FileError {
    #[error("无效的打开模式: {0}")]
    InvalidMode(String),
    #[error("父目录不存在: {}", .0.display())]
    FilePathNotExist(PathBuf),
    #[error("打开文件失败: {}: {source}", .path.display())]
    FailOpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("文件已打开: {}", .0.display())]
    AlreadyOpen(PathBuf),
    #[error("文件未打开")]
    NotOpen,
    #[error("当前模式不可读")]
    NotReadable,
    #[error("当前模式不可写")]
    NotWritable,
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON解析失败: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FileError {
    /// 折叠为四值错误码
    pub fn code(&self) -> ErrorCode {
        match self {
            FileError::InvalidMode(_) => ErrorCode::InvalidMode,
            FileError::FilePathNotExist(_) => ErrorCode::FilePathNotExist,
            // 打开之后的读写失败同样归入 FailOpenFile
            _ => ErrorCode::FailOpenFile,
        }
    }
}

impl From<Result<(), FileError>> for ErrorCode {
    fn from(result: Result<(), FileError>) -> Self {
        match result {
            Ok(()) => ErrorCode::NoError,
            Err(e) => e.code(),
        }
    }
}
