// crates/fsi_coupling/src/fluid_bc.rs

//! 流体边界条件与 FSI 力缓存
//!
//! 对每个人工流体单元：
//!
//! 1. 在每个顶点采样固体速度，作为流体速度自由度的 Dirichlet 约束；
//!    共享顶点保留第一次写入的值。
//! 2. 在每个积分点采样固体加速度与位移梯度，缓存加速度与线弹性应力
//!    `σ = λ tr(ε) I + 2 μ ε`。
//!
//! 非人工单元的力缓存清零。固体网格必须已处于推进后的当前构型。

use crate::cache::{DirichletConstraints, FluidQuadratureData};
use crate::error::{CouplingError, CouplingResult};
use crate::solid_bc::symmetric_part;
use crate::traits::{SolidFields, FLUID_COMPONENTS, SOLID_COMPONENTS};
use fsi_fem::{DofHandler, FeValues, GridInterpolator, Quadrature};
use fsi_mesh::{MeshLocator, QuadMesh};
use glam::{DMat2, DVec2};
use tracing::debug;

/// 线弹性材料参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticMaterial {
    /// 第一 Lamé 参数 λ
    pub lambda: f64,
    /// 剪切模量 μ
    pub mu: f64,
}

impl ElasticMaterial {
    pub fn from_config(solid: &fsi_config::SolidConfig) -> Self {
        Self {
            lambda: solid.lame_lambda(),
            mu: solid.lame_mu(),
        }
    }

    /// 由位移梯度计算 Cauchy 应力
    pub fn stress(&self, grad_displacement: DMat2) -> DMat2 {
        let strain = symmetric_part(grad_displacement);
        let trace = strain.col(0).x + strain.col(1).y;
        DMat2::IDENTITY * (self.lambda * trace) + strain * (2.0 * self.mu)
    }
}

/// 流体边界条件统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FluidBcSummary {
    /// 人工流体单元数
    pub n_artificial_cells: usize,
    /// 被约束的速度自由度数
    pub n_constrained_dofs: usize,
}

/// 计算人工流体区域的速度约束与力缓存
#[allow(clippy::too_many_arguments)]
pub fn find_fluid_bc(
    fluid_mesh: &QuadMesh,
    fluid_dofs: &DofHandler,
    quadrature: &Quadrature,
    solid_locator: &MeshLocator<'_>,
    solid: SolidFields<'_>,
    material: ElasticMaterial,
    data: &mut FluidQuadratureData,
    constraints: &mut DirichletConstraints,
) -> CouplingResult<FluidBcSummary> {
    if fluid_dofs.n_components() != FLUID_COMPONENTS {
        return Err(CouplingError::Layout(format!(
            "流体场应有 {FLUID_COMPONENTS} 个分量，实际 {}",
            fluid_dofs.n_components()
        )));
    }
    if data.n_cells() != fluid_mesh.n_cells() || data.n_q_points_per_cell() != quadrature.size() {
        return Err(CouplingError::Layout(format!(
            "积分点数据 {}x{} 与流体网格 {}x{} 不符",
            data.n_cells(),
            data.n_q_points_per_cell(),
            fluid_mesh.n_cells(),
            quadrature.size()
        )));
    }
    let solid_mesh = solid_locator.mesh();
    solid.dofs.check_compatible(solid_mesh, solid.displacement)?;
    solid.dofs.check_compatible(solid_mesh, solid.velocity)?;
    solid.dofs.check_compatible(solid_mesh, solid.acceleration)?;

    constraints.clear();
    let mut summary = FluidBcSummary::default();
    let mut fe_values = FeValues::new(quadrature.clone());
    let mut value = [0.0; SOLID_COMPONENTS];
    let mut gradient = [DVec2::ZERO; SOLID_COMPONENTS];

    for cell in 0..fluid_mesh.n_cells() {
        if !data.is_artificial(cell) {
            data.cell_mut(cell).iter_mut().for_each(|p| p.clear_force());
            continue;
        }
        summary.n_artificial_cells += 1;

        for node in fluid_mesh.cell_nodes(cell) {
            let u_dof = fluid_dofs.dof_index(node, 0);
            if constraints.is_constrained(u_dof) {
                continue;
            }
            let sampler = GridInterpolator::new(solid_locator, solid.dofs, fluid_mesh.node(node));
            sampler.point_value(solid.velocity, &mut value)?;
            constraints.add(u_dof, value[0]);
            constraints.add(fluid_dofs.dof_index(node, 1), value[1]);
        }

        fe_values.reinit(fluid_mesh, cell)?;
        for (q, point) in data.cell_mut(cell).iter_mut().enumerate() {
            let sampler =
                GridInterpolator::new(solid_locator, solid.dofs, fe_values.quadrature_point(q));
            sampler.point_value(solid.acceleration, &mut value)?;
            sampler.point_gradient(solid.displacement, &mut gradient)?;

            point.acceleration = DVec2::from_array(value);
            point.stress = material.stress(DMat2::from_cols(gradient[0], gradient[1]).transpose());
        }
    }

    summary.n_constrained_dofs = constraints.len();
    debug!(
        n_artificial_cells = summary.n_artificial_cells,
        n_constrained_dofs = summary.n_constrained_dofs,
        "流体边界条件已更新"
    );
    Ok(summary)
}
