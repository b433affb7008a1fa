//! JsonStore：整文档 JSON 的落盘与加载

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::error::FileError;
use crate::model::file_handle::FileHandle;
use crate::model::open_mode::OpenMode;
use crate::utils::fs::{FileSystem, OsFileSystem};

/// 解析后的 JSON 文档
pub type JsonDocument = Value;

/// 空文档（加载失败时的默认值）
pub fn empty_document() -> JsonDocument {
    Value::Null
}

/// 序列化格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonFormat {
    /// 缩进输出，以换行结尾
    #[default]
    Indented,
    Compact,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub format: JsonFormat,
}

impl StoreConfig {
    pub fn compact() -> Self {
        Self { format: JsonFormat::Compact }
    }

    /// 从 JSON 配置文件读取；空文件得到默认配置
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let doc = JsonStore::new().try_load(path)?;
        if doc.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(doc)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsonStore<F: FileSystem + Clone = OsFileSystem> {
    fs: F,
    config: StoreConfig,
}

impl JsonStore<OsFileSystem> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: FileSystem + Clone> JsonStore<F> {
    pub fn with_fs(fs: F) -> Self {
        Self { fs, config: StoreConfig::default() }
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// 按配置格式序列化
    pub fn to_text(&self, document: &JsonDocument) -> Result<String, FileError> {
        Ok(match self.config.format {
            JsonFormat::Indented => {
                let mut text = serde_json::to_string_pretty(document)?;
                text.push('\n');
                text
            }
            JsonFormat::Compact => serde_json::to_string(document)?,
        })
    }

    /// 以写模式打开并整体写入
    pub fn try_dump(&self, path: impl AsRef<Path>, document: &JsonDocument) -> Result<(), FileError> {
        let path = path.as_ref();
        let text = self.to_text(document)?;
        let mut file = FileHandle::with_fs(self.fs.clone());
        file.try_open(path, OpenMode::Write)?;
        let written = file.try_write(&text)?;
        file.close();
        tracing::debug!("JSON文件已保存到: {} ({} 字节)", path.display(), written);
        Ok(())
    }

    /// 兼容形式：失败时静默返回
    pub fn dump(&self, path: impl AsRef<Path>, document: &JsonDocument) {
        let path = path.as_ref();
        if let Err(e) = self.try_dump(path, document) {
            tracing::warn!("保存JSON失败，数据未写入: {}: {}", path.display(), e);
        }
    }

    /// 以读模式打开并整体解析；空白内容直接返回空文档，不经过解析器
    pub fn try_load(&self, path: impl AsRef<Path>) -> Result<JsonDocument, FileError> {
        let path = path.as_ref();
        let mut file = FileHandle::with_fs(self.fs.clone());
        file.try_open(path, OpenMode::Read)?;
        let text = file.try_read()?;
        file.close();

        if text.trim().is_empty() {
            tracing::debug!("JSON文件为空: {}", path.display());
            return Ok(empty_document());
        }
        let document = serde_json::from_str(&text)?;
        tracing::debug!("已加载JSON文件: {}", path.display());
        Ok(document)
    }

    /// 兼容形式：任何失败都返回空文档
    pub fn load(&self, path: impl AsRef<Path>) -> JsonDocument {
        let path = path.as_ref();
        self.try_load(path).unwrap_or_else(|e| {
            tracing::warn!("加载JSON失败，返回空文档: {}: {}", path.display(), e);
            empty_document()
        })
    }
}

/// 使用默认配置将文档写入磁盘
pub fn dump(path: impl AsRef<Path>, document: &JsonDocument) {
    JsonStore::new().dump(path, document)
}

/// 使用默认配置从磁盘加载文档
pub fn load(path: impl AsRef<Path>) -> JsonDocument {
    JsonStore::new().load(path)
}
