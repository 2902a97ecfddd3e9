//! CLIモジュール

use crate::config::{Config, Defaults};
use crate::database::{Database, EntryRepository};
use crate::error::EntryError;
use crate::gitlog::GitLogParser;
use crate::logging;
use crate::model::{RawEntry, StoredEntry};
use crate::store::EntryStore;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};

/// Hamster - 時間記録データベースへのエントリ登録ツール
#[derive(Parser, Debug)]
#[command(name = "hamster")]
#[command(about = "Hamster時間記録データベースにエントリを登録", long_about = None)]
pub struct Cli {
    /// 実行する処理
    #[arg(short = 'm', long = "method", value_enum)]
    pub method: Method,

    /// アクティビティ（activity@category）
    #[arg(short = 'a', long)]
    pub activity: Option<String>,

    /// 開始日時
    #[arg(short = 's', long)]
    pub start: Option<String>,

    /// 終了日時
    #[arg(short = 'e', long)]
    pub end: Option<String>,

    /// 説明
    #[arg(short = 'd', long)]
    pub description: Option<String>,

    /// タグ（カンマ区切り）
    #[arg(short = 't', long)]
    pub tags: Option<String>,

    /// gitログファイル（省略時は標準入力）
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// gitログのうち、この作者のコミットのみ登録
    #[arg(long)]
    pub author: Option<String>,

    /// データベースに書き込まず、登録内容を表示
    #[arg(long)]
    pub test: bool,

    /// 設定ファイルのパス
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 詳細ログを出力
    #[arg(short, long)]
    pub verbose: bool,
}

/// 処理方法
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// 1件のエントリを登録
    Add,
    /// gitログからエントリを登録
    Gitlog,
}

/// 設定ファイルの既定値をマージした後のオプション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub method: Method,
    pub activity: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub file: Option<PathBuf>,
    pub author: Option<String>,
    pub test: bool,
}

impl Options {
    /// CLI引数と既定値をマージ
    ///
    /// 優先順位: CLI引数 > 設定ファイルの既定値
    pub fn merge(cli: Cli, defaults: &Defaults) -> Self {
        Self {
            method: cli.method,
            activity: cli.activity.or_else(|| defaults.activity.clone()),
            start: cli.start.or_else(|| defaults.start.clone()),
            end: cli.end.or_else(|| defaults.end.clone()),
            description: cli.description.or_else(|| defaults.description.clone()),
            tags: cli.tags.or_else(|| defaults.tags.clone()),
            file: cli.file,
            author: cli.author.or_else(|| defaults.author.clone()),
            test: cli.test,
        }
    }
}

/// gitログの読み込み元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSource {
    File(PathBuf),
    Stdin,
}

impl LogSource {
    fn read(&self) -> Result<String> {
        match self {
            LogSource::File(path) => fs::read_to_string(path)
                .with_context(|| format!("ログファイルを読み込めません: {}", path.display())),
            LogSource::Stdin => {
                io::read_to_string(io::stdin()).context("標準入力を読み込めません")
            }
        }
    }
}

/// 実行するコマンド
#[derive(Debug, Clone)]
pub enum Command {
    Add(RawEntry),
    GitLog {
        source: LogSource,
        parser: GitLogParser,
    },
}

impl Command {
    /// オプションからコマンドを組み立てる
    pub fn from_options(options: Options) -> Result<Self, EntryError> {
        let activity = options.activity.ok_or_else(|| {
            EntryError::InvalidInput(
                "アクティビティが指定されていません（-a activity@category）".to_string(),
            )
        })?;

        let command = match options.method {
            Method::Add => Command::Add(RawEntry {
                activity,
                start: options.start.unwrap_or_default(),
                end: options.end,
                description: options.description.unwrap_or_default(),
                tags: options.tags,
            }),
            Method::Gitlog => {
                let source = match options.file {
                    Some(path) if path.exists() => LogSource::File(path),
                    Some(path) => {
                        warn!(
                            "ログファイルが存在しないため標準入力を読み込みます: {}",
                            path.display()
                        );
                        LogSource::Stdin
                    }
                    None => LogSource::Stdin,
                };

                Command::GitLog {
                    source,
                    parser: GitLogParser {
                        author: options.author,
                        activity,
                        tags: options.tags,
                    },
                }
            }
        };

        Ok(command)
    }

    /// コマンドを実行し、登録したエントリを返す
    pub fn execute<R: EntryRepository>(
        self,
        store: &EntryStore<'_, R>,
    ) -> Result<Vec<StoredEntry>> {
        match self {
            Command::Add(entry) => Ok(vec![store.store(&entry)?]),
            Command::GitLog { source, parser } => {
                let log = source.read()?;
                let entries = parser.parse(&log)?;
                info!("{}件のコミットを登録します", entries.len());
                Ok(store.store_all(&entries)?)
            }
        }
    }
}

/// CLIエントリポイント
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let options = Options::merge(cli, &config.defaults);
    let test_mode = options.test;
    let command = Command::from_options(options)?;

    let db = Database::open(&config.db_path)?;
    let store = EntryStore::new(&db, test_mode);
    let stored = command.execute(&store)?;

    if test_mode {
        for entry in &stored {
            print!("{}", entry);
        }
    } else {
        println!("{}件のエントリを登録しました", stored.len());
    }

    Ok(())
}
