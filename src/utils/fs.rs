//! IO helper: injectable filesystem seam and text-mode conversions

use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, Write};
use std::path::Path;

use crate::model::open_mode::AccessFlags;

/// 文件系统抽象：目录存在性检查 + 按标志位打开文件
///
/// `FileHandle` 只通过此 trait 接触文件系统，单元测试可注入 `MemoryFileSystem`。
pub trait FileSystem {
    type File: Read + Write + Seek;

    /// 目录是否存在
    fn dir_exists(&self, path: &Path) -> bool;

    /// 按访问标志位打开文件
    fn open(&self, path: &Path, flags: AccessFlags) -> io::Result<Self::File>;
}

/// 操作系统文件系统
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    type File = File;

    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn open(&self, path: &Path, flags: AccessFlags) -> io::Result<File> {
        let mut options = OpenOptions::new();
        options.read(flags.readable);
        if flags.append {
            options.append(true);
        } else {
            options.write(flags.writable);
        }
        options
            .create(flags.creates())
            .truncate(flags.truncates())
            .open(path)
    }
}

/// 父目录；相对文件名的父目录视为当前目录，根路径与空路径没有父目录
pub fn parent_dir(path: &Path) -> Option<&Path> {
    match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Some(Path::new(".")),
        other => other,
    }
}

/// 文本模式读取：UTF-8 解码（非法序列替换为 U+FFFD），`\r\n` 统一为 `\n`
pub fn decode_text(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };
    if text.contains("\r\n") {
        text.replace("\r\n", "\n")
    } else {
        text
    }
}

/// 文本模式写入：Windows 下换行转换为 `\r\n`
pub fn encode_text(text: &str) -> Cow<'_, [u8]> {
    if cfg!(windows) && text.contains('\n') {
        Cow::Owned(text.replace('\n', "\r\n").into_bytes())
    } else {
        Cow::Borrowed(text.as_bytes())
    }
}
