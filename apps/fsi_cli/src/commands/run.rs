// apps/fsi_cli/src/commands/run.rs

//! 运行耦合模拟
//!
//! 流体为恒定压力的静止流体，固体按参考速度做刚体平移。

use super::{build_mesh, load_parameters};
use anyhow::{Context, Result};
use clap::Args;
use fsi_coupling::{Fsi, PrescribedFluid, PrescribedSolid};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 覆盖结束时间 [s]
    #[arg(short = 't', long)]
    pub end_time: Option<f64>,

    /// 覆盖时间步长 [s]
    #[arg(long)]
    pub dt: Option<f64>,

    /// 运行摘要输出路径 (JSON)
    #[arg(short, long)]
    pub summary: Option<PathBuf>,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== ImmerFSI 模拟启动 ===");

    let mut params = load_parameters(args.config.as_deref())?;
    if let Some(end_time) = args.end_time {
        params.time.end_time = end_time;
    }
    if let Some(dt) = args.dt {
        params.time.time_step = dt;
    }
    params.validate().context("配置无效")?;

    let fluid_mesh = build_mesh(&params.fluid.mesh, "流体")?;
    let solid_mesh = build_mesh(&params.solid.mesh, "固体")?;
    info!(
        "流体网格: {} 单元, 固体网格: {} 单元",
        fluid_mesh.n_cells(),
        solid_mesh.n_cells()
    );

    let mut fluid = PrescribedFluid::constant_pressure(fluid_mesh, params.fluid.reference_pressure);
    let mut solid = PrescribedSolid::translating(solid_mesh, params.solid.reference_velocity);

    let start = Instant::now();
    let summary = {
        let mut fsi = Fsi::new(&mut fluid, &mut solid, &params).context("耦合初始化失败")?;
        fsi.run().context("耦合模拟失败")?
    };
    let elapsed = start.elapsed();

    info!("=== 模拟完成 ===");
    info!("总步数: {}", summary.steps);
    info!("结束时间: {:.6} s", summary.final_time);
    info!("输出次数: {}", summary.outputs);
    info!("最大人工单元数: {}", summary.max_artificial_cells);
    let force = solid.net_traction_force();
    info!("固体边界合力: ({:.6e}, {:.6e})", force.x, force.y);
    info!("计算时间: {:.3} s", elapsed.as_secs_f64());

    let summary_path = args.summary.or_else(|| params.output.summary_file.clone());
    if let Some(path) = summary_path {
        let content = serde_json::to_string_pretty(&summary).context("无法序列化运行摘要")?;
        std::fs::write(&path, content)
            .with_context(|| format!("无法写入运行摘要 {}", path.display()))?;
        info!("运行摘要已写入: {}", path.display());
    }

    Ok(())
}
