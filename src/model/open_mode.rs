//! 打开模式：六种模式到访问标志位的纯映射

use std::fmt;
use std::str::FromStr;

use crate::model::error::FileError;

/// 文件打开模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpenMode {
    Read = 0,
    Write = 1,
    Append = 2,
    ReadPlus = 3,
    WritePlus = 4,
    AppendPlus = 5,
}

/// 访问标志位（与平台无关）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AccessFlags {
    pub readable: bool,
    pub writable: bool,
    /// 每次写入都追加到文件末尾
    pub append: bool,
    /// 打开时截断
    pub truncate: bool,
}

impl OpenMode {
    pub const ALL: [OpenMode; 6] = [
        OpenMode::Read,
        OpenMode::Write,
        OpenMode::Append,
        OpenMode::ReadPlus,
        OpenMode::WritePlus,
        OpenMode::AppendPlus,
    ];

    /// 模式 → 标志位映射表
    pub const fn flags(self) -> AccessFlags {
        const fn f(readable: bool, writable: bool, append: bool, truncate: bool) -> AccessFlags {
            AccessFlags { readable, writable, append, truncate }
        }
        match self {
            OpenMode::Read => f(true, false, false, false),
            OpenMode::Write => f(false, true, false, false),
            OpenMode::Append => f(false, true, true, false),
            OpenMode::ReadPlus => f(true, true, false, false),
            OpenMode::WritePlus => f(true, true, false, true),
            OpenMode::AppendPlus => f(true, false, true, false),
        }
    }

    /// 从原始数值解析，越界返回 InvalidMode
    pub fn from_raw(raw: u8) -> Result<Self, FileError> {
        Self::ALL
            .get(raw as usize)
            .copied()
            .ok_or_else(|| FileError::InvalidMode(raw.to_string()))
    }

    pub const fn name(self) -> &'static str {
        match self {
            OpenMode::Read => "read",
            OpenMode::Write => "write",
            OpenMode::Append => "append",
            OpenMode::ReadPlus => "readplus",
            OpenMode::WritePlus => "writeplus",
            OpenMode::AppendPlus => "appendplus",
        }
    }
}

impl TryFrom<u8> for OpenMode {
    type Error = FileError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl FromStr for OpenMode {
    type Err = FileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" | "r" => Ok(OpenMode::Read),
            "write" | "w" => Ok(OpenMode::Write),
            "append" | "a" => Ok(OpenMode::Append),
            "readplus" | "r+" => Ok(OpenMode::ReadPlus),
            "writeplus" | "w+" => Ok(OpenMode::WritePlus),
            "appendplus" | "a+" => Ok(OpenMode::AppendPlus),
            other => Err(FileError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl AccessFlags {
    /// 允许写入（普通写或追加写）
    pub fn allows_write(&self) -> bool {
        self.writable || self.append
    }

    /// 可写时文件不存在则创建
    pub fn creates(&self) -> bool {
        self.allows_write()
    }

    /// 实际是否截断：显式截断，或者只写（不可读、不追加）隐含截断
    pub fn truncates(&self) -> bool {
        self.truncate || (self.writable && !self.readable && !self.append)
    }
}
