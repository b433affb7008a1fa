//! 程序入口：初始化日志、解析命令行并调用文件/JSON 操作

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::fmt::SubscriberBuilder;

use json_file_store::{FileHandle, JsonDocument, JsonStore, OpenMode, StoreConfig};

#[derive(Parser, Debug)]
#[command(name = "json_file_store", version, about = "Text file and JSON document helper")]
struct Cli {
    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    /// 使用紧凑格式写 JSON
    #[arg(long, global = true)]
    compact: bool,

    /// JSON 格式的存储配置文件
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 加载 JSON 文件并输出
    Load { path: PathBuf },
    /// 将 JSON 文本写入文件
    Dump { path: PathBuf, json: String },
    /// 从指定偏移读取文件剩余内容
    Read {
        path: PathBuf,
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
    /// 以指定模式写入文本，输出写入后的位置
    Write {
        path: PathBuf,
        text: String,
        #[arg(short, long, default_value = "write")]
        mode: OpenMode,
        #[arg(long)]
        offset: Option<u64>,
    },
}

fn store_config(cli: &Cli) -> Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::from_file(path)
            .with_context(|| format!("读取配置失败: {}", path.display()))?,
        None => StoreConfig::default(),
    };
    if cli.compact {
        config = StoreConfig::compact();
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let store = JsonStore::new().with_config(store_config(&cli)?);

    match cli.command {
        Command::Load { path } => {
            let doc = store
                .try_load(&path)
                .with_context(|| format!("加载失败: {}", path.display()))?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        Command::Dump { path, json } => {
            let doc: JsonDocument = serde_json::from_str(&json).context("参数不是合法的JSON")?;
            store
                .try_dump(&path, &doc)
                .with_context(|| format!("保存失败: {}", path.display()))?;
            tracing::info!("已保存: {}", path.display());
        }
        Command::Read { path, offset } => {
            let mut file = FileHandle::new();
            file.try_open(&path, OpenMode::Read)
                .with_context(|| format!("打开失败: {}", path.display()))?;
            file.try_seek(offset)?;
            print!("{}", file.try_read()?);
        }
        Command::Write { path, text, mode, offset } => {
            let mut file = FileHandle::new();
            file.try_open(&path, mode)
                .with_context(|| format!("打开失败: {}", path.display()))?;
            if let Some(offset) = offset {
                file.try_seek(offset)?;
            }
            let written = file.try_write(&text)?;
            tracing::info!("写入 {} 字节", written);
            println!("{}", file.try_tell()?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志输出（写到 stderr，避免与命令输出混杂）
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let _ = SubscriberBuilder::default()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();

    run(cli)
}
