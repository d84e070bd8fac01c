// apps/fsi_cli/src/commands/validate.rs

//! 配置验证命令

use anyhow::{bail, Result};
use clap::Args;
use fsi_config::FsiParameters;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== ImmerFSI 配置验证 ===");
    println!("检查配置文件: {}", args.config.display());

    let params = match FsiParameters::from_file(&args.config) {
        Ok(params) => params,
        Err(e) => {
            error!("  ✗ {}", e);
            println!("  ✗ {}", e);
            bail!("验证失败：{}", e);
        }
    };
    println!("  ✓ 配置有效");

    let warnings = params.warnings();
    if !warnings.is_empty() {
        println!("\n警告 ({}):", warnings.len());
        for warning in &warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    if args.strict && !warnings.is_empty() {
        println!("\n✗ 验证失败");
        bail!("严格模式下发现 {} 个警告", warnings.len());
    }
    println!("\n✓ 验证通过");
    Ok(())
}
