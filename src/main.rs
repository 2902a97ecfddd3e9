//! Hamster CLI - Hamster時間記録データベースへのエントリ登録ツール

mod activity;
mod cli;
mod config;
mod database;
mod error;
mod fact;
mod gitlog;
mod logging;
mod model;
mod store;
mod tags;

use anyhow::Result;

fn main() -> Result<()> {
    cli::run()
}
