// apps/fsi_cli/src/main.rs

//! ImmerFSI 命令行界面
//!
//! 使用解析给定的参考求解器驱动浸入式流固耦合，
//! 用于检查配置、网格与耦合数据。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// ImmerFSI 浸入式流固耦合命令行工具
#[derive(Parser)]
#[command(name = "fsi_cli")]
#[command(author = "ImmerFSI Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Immersed fluid-structure interaction coupling driver", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行耦合模拟
    Run(commands::run::RunArgs),
    /// 显示网格与耦合信息
    Info(commands::info::InfoArgs),
    /// 验证配置
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
