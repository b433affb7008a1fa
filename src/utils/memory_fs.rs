//! 内存文件系统：不触碰磁盘地验证打开模式语义

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::model::open_mode::AccessFlags;
use crate::utils::fs::{parent_dir, FileSystem};

type Contents = Rc<RefCell<Vec<u8>>>;

#[derive(Debug, Default)]
struct MemoryState {
    files: HashMap<PathBuf, Contents>,
    dirs: HashSet<PathBuf>,
    read_only: HashSet<PathBuf>,
    /// 对文件系统的调用次数（目录检查 + 打开）
    calls: Cell<usize>,
}

/// 单线程内存文件系统，克隆后共享同一份状态
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    state: Rc<RefCell<MemoryState>>,
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFileSystem {
    /// 新建，仅包含当前目录 `.` 和根目录 `/`
    pub fn new() -> Self {
        let mut state = MemoryState::default();
        state.dirs.insert(PathBuf::from("."));
        state.dirs.insert(PathBuf::from("/"));
        Self { state: Rc::new(RefCell::new(state)) }
    }

    pub fn add_dir(&self, path: impl Into<PathBuf>) -> &Self {
        self.state.borrow_mut().dirs.insert(path.into());
        self
    }

    pub fn add_file(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> &Self {
        self.state
            .borrow_mut()
            .files
            .insert(path.into(), Rc::new(RefCell::new(contents.into())));
        self
    }

    /// 标记为只读，以可写方式打开时返回 PermissionDenied
    pub fn set_read_only(&self, path: impl Into<PathBuf>) -> &Self {
        self.state.borrow_mut().read_only.insert(path.into());
        self
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.state
            .borrow()
            .files
            .get(path.as_ref())
            .map(|c| c.borrow().clone())
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.state.borrow().files.contains_key(path.as_ref())
    }

    pub fn calls(&self) -> usize {
        self.state.borrow().calls.get()
    }

    fn record_call(&self) {
        let state = self.state.borrow();
        state.calls.set(state.calls.get() + 1);
    }
}

impl FileSystem for MemoryFileSystem {
    type File = MemoryFile;

    fn dir_exists(&self, path: &Path) -> bool {
        self.record_call();
        self.state.borrow().dirs.contains(path)
    }

    fn open(&self, path: &Path, flags: AccessFlags) -> io::Result<MemoryFile> {
        self.record_call();
        let mut state = self.state.borrow_mut();

        let parent_ok = parent_dir(path).is_some_and(|p| state.dirs.contains(p));
        if !parent_ok {
            return Err(io::Error::new(ErrorKind::NotFound, "parent directory not found"));
        }
        if state.dirs.contains(path) {
            return Err(io::Error::other("is a directory"));
        }
        if flags.allows_write() && state.read_only.contains(path) {
            return Err(io::Error::new(ErrorKind::PermissionDenied, "read-only file"));
        }

        let existing = state.files.get(path).cloned();
        let data = match existing {
            Some(data) => data,
            None if flags.creates() => {
                let data: Contents = Rc::default();
                state.files.insert(path.to_path_buf(), data.clone());
                data
            }
            None => return Err(io::Error::new(ErrorKind::NotFound, "file not found")),
        };
        if flags.truncates() {
            data.borrow_mut().clear();
        }
        Ok(MemoryFile { data, pos: 0, flags })
    }
}

/// 内存文件句柄
#[derive(Debug)]
pub struct MemoryFile {
    data: Contents,
    pos: u64,
    flags: AccessFlags,
}

impl Read for MemoryFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.flags.readable {
            return Err(io::Error::new(ErrorKind::PermissionDenied, "not opened for reading"));
        }
        let data = self.data.borrow();
        let start = usize::try_from(self.pos).map_or(data.len(), |pos| pos.min(data.len()));
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Write for MemoryFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.flags.allows_write() {
            return Err(io::Error::new(ErrorKind::PermissionDenied, "not opened for writing"));
        }
        let mut data = self.data.borrow_mut();
        if self.flags.append {
            self.pos = data.len() as u64;
        }
        let start = usize::try_from(self.pos)
            .map_err(|_| io::Error::new(ErrorKind::InvalidInput, "offset out of range"))?;
        let end = start
            .checked_add(buf.len())
            .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "offset out of range"))?;
        let cur_len = data.len();
        if cur_len < end {
            data.try_reserve(end - cur_len)
                .map_err(|_| io::Error::new(ErrorKind::OutOfMemory, "file too large"))?;
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        self.pos = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = self.data.borrow().len() as i128;
        let target = match pos {
            SeekFrom::Start(n) => n as i128,
            SeekFrom::End(d) => len + d as i128,
            SeekFrom::Current(d) => self.pos as i128 + d as i128,
        };
        if target < 0 {
            return Err(io::Error::new(ErrorKind::InvalidInput, "seek before start"));
        }
        self.pos = target as u64;
        Ok(self.pos)
    }
}
