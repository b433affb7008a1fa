//! FileHandle：独占一个文件资源，提供文本读写与字节偏移定位
//!
//! 每个操作都有两种形式：`try_*` 返回 `Result`，同名的兼容形式吞掉错误
//! （`open` 返回四值错误码，`read` 返回空文本，`write`/`seek` 无返回）。

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::model::error::{ErrorCode, FileError};
use crate::model::open_mode::{AccessFlags, OpenMode};
use crate::utils::fs::{decode_text, encode_text, parent_dir, FileSystem, OsFileSystem};

pub struct FileHandle<F: FileSystem = OsFileSystem> {
    fs: F,
    file: Option<F::File>,
    path: Option<PathBuf>,
    mode: Option<OpenMode>,
}

impl FileHandle<OsFileSystem> {
    pub fn new() -> Self {
        Self::with_fs(OsFileSystem)
    }
}

impl Default for FileHandle<OsFileSystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FileSystem> FileHandle<F> {
    /// 使用指定的文件系统实现
    pub fn with_fs(fs: F) -> Self {
        Self { fs, file: None, path: None, mode: None }
    }

    /// 打开文件：检查父目录、按模式映射标志位并打开
    pub fn try_open(&mut self, path: impl AsRef<Path>, mode: OpenMode) -> Result<(), FileError> {
        let path = path.as_ref();
        if self.file.is_some() {
            return Err(FileError::AlreadyOpen(self.path.clone().unwrap_or_default()));
        }

        let parent = parent_dir(path).ok_or_else(|| FileError::FilePathNotExist(path.to_path_buf()))?;
        if !self.fs.dir_exists(parent) {
            return Err(FileError::FilePathNotExist(parent.to_path_buf()));
        }

        let file = self
            .fs
            .open(path, mode.flags())
            .map_err(|source| FileError::FailOpenFile { path: path.to_path_buf(), source })?;

        tracing::debug!("已打开文件: {} (模式: {})", path.display(), mode);
        self.file = Some(file);
        self.path = Some(path.to_path_buf());
        self.mode = Some(mode);
        Ok(())
    }

    /// 兼容形式：返回错误码
    pub fn open(&mut self, path: impl AsRef<Path>, mode: OpenMode) -> ErrorCode {
        let path = path.as_ref();
        let result = self.try_open(path, mode);
        if let Err(e) = &result {
            tracing::warn!("打开文件失败: {}", e);
        }
        result.into()
    }

    /// 以原始数值指定模式，越界时不触碰文件系统直接返回 InvalidMode
    pub fn open_raw(&mut self, path: impl AsRef<Path>, raw_mode: u8) -> ErrorCode {
        match OpenMode::from_raw(raw_mode) {
            Ok(mode) => self.open(path, mode),
            Err(e) => {
                tracing::warn!("{}", e);
                e.code()
            }
        }
    }

    /// 以模式名称指定模式（如 `"r+"`、`"appendplus"`）
    pub fn open_named(&mut self, path: impl AsRef<Path>, mode: &str) -> ErrorCode {
        match mode.parse::<OpenMode>() {
            Ok(mode) => self.open(path, mode),
            Err(e) => {
                tracing::warn!("{}", e);
                e.code()
            }
        }
    }

    /// 关闭文件，可重复调用
    pub fn close(&mut self) {
        if self.file.take().is_some() {
            if let Some(path) = &self.path {
                tracing::debug!("已关闭文件: {}", path.display());
            }
        }
        self.path = None;
        self.mode = None;
    }

    /// 从当前位置读取到文件末尾
    pub fn try_read(&mut self) -> Result<String, FileError> {
        let (file, flags) = self.file_mut()?;
        if !flags.readable {
            return Err(FileError::NotReadable);
        }
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Ok(decode_text(buf))
    }

    /// 兼容形式：失败时返回空文本
    pub fn read(&mut self) -> String {
        self.try_read().unwrap_or_else(|e| {
            tracing::warn!("读取失败: {}", e);
            String::new()
        })
    }

    /// 在当前位置写入文本（追加模式下总是写到末尾），返回写入的字节数
    pub fn try_write(&mut self, text: &str) -> Result<usize, FileError> {
        let (file, flags) = self.file_mut()?;
        if !flags.allows_write() {
            return Err(FileError::NotWritable);
        }
        let bytes = encode_text(text);
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(bytes.len())
    }

    pub fn write(&mut self, text: &str) {
        if let Err(e) = self.try_write(text) {
            tracing::warn!("写入失败: {}", e);
        }
    }

    /// 定位到绝对字节偏移，不做边界检查
    pub fn try_seek(&mut self, offset: u64) -> Result<u64, FileError> {
        let (file, _) = self.file_mut()?;
        Ok(file.seek(SeekFrom::Start(offset))?)
    }

    pub fn seek(&mut self, offset: u64) {
        if let Err(e) = self.try_seek(offset) {
            tracing::warn!("定位失败: {}", e);
        }
    }

    pub fn try_tell(&mut self) -> Result<u64, FileError> {
        let (file, _) = self.file_mut()?;
        Ok(file.stream_position()?)
    }

    /// 当前位置；未打开时为 0
    pub fn tell(&mut self) -> u64 {
        self.try_tell().unwrap_or(0)
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// 当前打开的路径；关闭后为 None
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn mode(&self) -> Option<OpenMode> {
        self.mode
    }

    pub fn flags(&self) -> Option<AccessFlags> {
        self.mode.map(OpenMode::flags)
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    fn file_mut(&mut self) -> Result<(&mut F::File, AccessFlags), FileError> {
        let flags = self.flags().ok_or(FileError::NotOpen)?;
        let file = self.file.as_mut().ok_or(FileError::NotOpen)?;
        Ok((file, flags))
    }
}

impl<F: FileSystem> Drop for FileHandle<F> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_fs::MemoryFileSystem;
    use tempfile::TempDir;

    fn memory_handle() -> (MemoryFileSystem, FileHandle<MemoryFileSystem>) {
        let fs = MemoryFileSystem::new();
        fs.add_dir("data");
        let handle = FileHandle::with_fs(fs.clone());
        (fs, handle)
    }

    #[test]
    fn test_open_close_every_mode() {
        let dir = TempDir::new().expect("创建临时目录失败");
        let path = dir.path().join("modes.txt");
        std::fs::write(&path, "seed").unwrap();

        for mode in OpenMode::ALL {
            let mut file = FileHandle::new();
            assert_eq!(file.open(&path, mode), ErrorCode::NoError, "模式 {} 应能打开", mode);
            assert!(file.is_open());
            assert_eq!(file.mode(), Some(mode));
            file.close();
            assert!(!file.is_open());
            file.close();
        }
    }

    #[test]
    fn test_missing_parent_dir() {
        let (fs, mut file) = memory_handle();
        assert_eq!(file.open("nope/a.txt", OpenMode::Write), ErrorCode::FilePathNotExist);
        assert!(!file.is_open());
        assert!(!fs.exists("nope/a.txt"), "不应创建文件");

        let dir = TempDir::new().unwrap();
        let mut os_file = FileHandle::new();
        let code = os_file.open(dir.path().join("missing").join("a.txt"), OpenMode::Write);
        assert_eq!(code, ErrorCode::FilePathNotExist);
        assert_eq!(os_file.open("", OpenMode::Read), ErrorCode::FilePathNotExist);
    }

    #[test]
    fn test_invalid_mode_does_not_touch_fs() {
        let (fs, mut file) = memory_handle();
        assert_eq!(file.open_raw("data/a.txt", 6), ErrorCode::InvalidMode);
        assert_eq!(file.open_named("data/a.txt", "rw"), ErrorCode::InvalidMode);
        assert_eq!(fs.calls(), 0, "无效模式不应访问文件系统");
        assert!(!file.is_open());

        assert_eq!(file.open_named("data/a.txt", "w+"), ErrorCode::NoError);
        assert_eq!(file.mode(), Some(OpenMode::WritePlus));
    }

    #[test]
    fn test_fail_open_file() {
        let (fs, mut file) = memory_handle();
        assert_eq!(file.open("data/missing.txt", OpenMode::Read), ErrorCode::FailOpenFile);
        assert!(!file.is_open());

        fs.add_file("data/ro.txt", "x").set_read_only("data/ro.txt");
        assert_eq!(file.open("data/ro.txt", OpenMode::Write), ErrorCode::FailOpenFile);
        let err = file.try_open("data/ro.txt", OpenMode::Append).unwrap_err();
        assert!(matches!(err, FileError::FailOpenFile { .. }));
    }

    #[test]
    fn test_reopen_while_open_fails() {
        let (fs, mut file) = memory_handle();
        fs.add_file("data/b.txt", "bbb");
        assert_eq!(file.open("data/a.txt", OpenMode::Write), ErrorCode::NoError);
        assert_eq!(file.open("data/b.txt", OpenMode::Read), ErrorCode::FailOpenFile);
        assert_eq!(file.path(), Some(Path::new("data/a.txt")), "原资源应保持不变");
    }

    #[test]
    fn test_read_from_cursor() {
        let (fs, mut file) = memory_handle();
        fs.add_file("data/a.txt", "line1\r\nline2\n");
        file.open("data/a.txt", OpenMode::Read);
        assert_eq!(file.read(), "line1\nline2\n");
        assert_eq!(file.read(), "", "到达末尾后应返回空文本");

        file.seek(7);
        assert_eq!(file.read(), "line2\n");
    }

    #[test]
    fn test_read_write_on_wrong_mode_is_silent() {
        let (fs, mut file) = memory_handle();
        assert_eq!(file.read(), "", "未打开时读取为空");
        assert_eq!(file.tell(), 0);
        file.write("ignored");
        file.seek(3);

        file.open("data/w.txt", OpenMode::Write);
        assert_eq!(file.read(), "");
        assert!(matches!(file.try_read(), Err(FileError::NotReadable)));
        file.close();

        fs.add_file("data/r.txt", "keep");
        file.open("data/r.txt", OpenMode::Read);
        file.write("nope");
        assert!(matches!(file.try_write("nope"), Err(FileError::NotWritable)));
        assert_eq!(fs.contents("data/r.txt").unwrap(), b"keep");
    }

    #[test]
    fn test_append_ignores_seek() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.txt");
        std::fs::write(&path, "abc").unwrap();

        let mut file = FileHandle::new();
        assert_eq!(file.open(&path, OpenMode::Append), ErrorCode::NoError);
        file.seek(0);
        file.write("def");
        file.seek(1);
        file.write("g");
        file.close();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "abcdefg");
    }

    #[test]
    fn test_appendplus_reads_and_appends() {
        let (fs, mut file) = memory_handle();
        fs.add_file("data/a.txt", "head");
        file.open("data/a.txt", OpenMode::AppendPlus);
        assert_eq!(file.read(), "head");
        file.seek(0);
        file.write("-tail");
        assert_eq!(fs.contents("data/a.txt").unwrap(), b"head-tail");
    }

    #[test]
    fn test_writeplus_truncates_readplus_keeps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.txt");
        std::fs::write(&path, "old content").unwrap();

        let mut file = FileHandle::new();
        file.open(&path, OpenMode::ReadPlus);
        file.write("new");
        file.close();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new content");

        file.open(&path, OpenMode::WritePlus);
        assert_eq!(file.read(), "", "w+ 打开时应清空内容");
        file.write("fresh");
        file.seek(0);
        assert_eq!(file.read(), "fresh");
    }

    #[test]
    fn test_write_mode_truncates_and_creates() {
        let (fs, mut file) = memory_handle();
        fs.add_file("data/a.txt", "previous");
        file.open("data/a.txt", OpenMode::Write);
        file.write("x");
        assert_eq!(fs.contents("data/a.txt").unwrap(), b"x");
        file.close();

        file.open("data/new.txt", OpenMode::Append);
        assert!(fs.exists("data/new.txt"), "追加模式应创建文件");
    }

    #[test]
    fn test_seek_tell() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s.txt");
        let mut file = FileHandle::new();
        file.open(&path, OpenMode::WritePlus);
        file.write("0123456789");
        for n in [0u64, 4, 10, 25] {
            file.seek(n);
            assert_eq!(file.tell(), n, "seek({}) 之后 tell 应返回 {}", n, n);
        }
        assert_eq!(file.try_seek(3).unwrap(), 3);
        assert_eq!(file.read(), "3456789");
        assert_eq!(file.tell(), 10);
    }

    #[test]
    fn test_write_after_huge_seek_is_silent() {
        let (fs, mut file) = memory_handle();
        fs.add_file("data/a.txt", "abc");
        assert_eq!(file.open("data/a.txt", OpenMode::ReadPlus), ErrorCode::NoError);
        file.seek(u64::MAX);
        file.write("x");
        assert!(file.try_write("x").is_err());
        assert_eq!(file.read(), "");
        assert_eq!(fs.contents("data/a.txt").unwrap(), b"abc", "内容应保持不变");
    }

    #[test]
    fn test_close_clears_state() {
        let (_fs, mut file) = memory_handle();
        file.open("data/a.txt", OpenMode::Write);
        assert_eq!(file.path(), Some(Path::new("data/a.txt")));
        file.close();
        assert_eq!(file.path(), None);
        assert_eq!(file.mode(), None);
        assert_eq!(file.flags(), None);
    }

    #[test]
    fn test_drop_releases_resource() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("d.txt");
        {
            let mut file = FileHandle::new();
            file.open(&path, OpenMode::Write);
            file.write("scoped");
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "scoped");
    }
}
