// apps/fsi_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示配置、网格统计与初始构型下的人工流体区域。

use super::{build_mesh, load_parameters};
use anyhow::Result;
use clap::Args;
use fsi_coupling::{update_indicator, FluidQuadratureData};
use fsi_fem::Quadrature;
use fsi_mesh::{LocateTolerance, MeshLocator, MeshStatistics};
use std::path::PathBuf;
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 列出被固体覆盖的流体单元
    #[arg(long)]
    pub cells: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== ImmerFSI 信息 ===");
    let params = load_parameters(args.config.as_deref())?;

    println!("=== 时间 ===");
    println!("结束时间: {} s", params.time.end_time);
    println!("时间步长: {} s", params.time.time_step);
    println!("输出间隔: {} s", params.time.output_interval);

    println!("\n=== 材料 ===");
    println!("流体黏度: {} Pa·s", params.fluid.viscosity);
    println!("杨氏模量: {} Pa", params.solid.youngs_modulus);
    println!("泊松比: {}", params.solid.poissons_ratio);
    println!(
        "Lamé 参数: λ = {:.6e}, μ = {:.6e}",
        params.solid.lame_lambda(),
        params.solid.lame_mu()
    );

    let fluid_mesh = build_mesh(&params.fluid.mesh, "流体")?;
    let solid_mesh = build_mesh(&params.solid.mesh, "固体")?;
    print_statistics("流体网格", &fluid_mesh.statistics());
    print_statistics("固体网格", &solid_mesh.statistics());

    let quadrature = Quadrature::gauss(params.coupling.quadrature_points)?;
    let tolerance = LocateTolerance {
        inside_tol: params.coupling.inside_tolerance,
        boundary_tol: params.coupling.boundary_tolerance,
        ..LocateTolerance::STANDARD
    };
    let locator = MeshLocator::with_tolerance(&solid_mesh, tolerance);
    let mut data = FluidQuadratureData::new(fluid_mesh.n_cells(), &quadrature);
    let n_artificial = update_indicator(&fluid_mesh, &locator, &mut data)?;

    println!("\n=== 耦合 ===");
    println!("积分点/单元: {}", quadrature.size());
    println!("人工流体单元: {n_artificial}");
    if args.cells {
        let cells: Vec<usize> = data.artificial_cells().collect();
        println!("  {cells:?}");
    }

    Ok(())
}

fn print_statistics(title: &str, stats: &MeshStatistics) {
    println!("\n=== {title} ===");
    println!("节点数: {}", stats.n_nodes);
    println!("单元数: {}", stats.n_cells);
    println!("边界面数: {}", stats.n_boundary_faces);
    println!(
        "单元面积: [{:.6e}, {:.6e}], 总面积 {:.6e}",
        stats.min_cell_area, stats.max_cell_area, stats.total_area
    );
    let [x0, y0, x1, y1] = stats.bounds;
    println!("范围: [{x0}, {x1}] x [{y0}, {y1}]");
}
