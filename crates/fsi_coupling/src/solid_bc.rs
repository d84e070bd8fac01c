// crates/fsi_coupling/src/solid_bc.rs

//! 固体边界牵引力
//!
//! 在固体 Neumann 边界的每个面积分点上采样流体压力与速度梯度：
//!
//! ```text
//! t = -p n + 2 μ ε(v) n,   ε(v) = (∇v + ∇vᵀ) / 2
//! ```
//!
//! `n` 为固体外法向。采样失败的点牵引力为零。

use crate::cache::SolidTraction;
use crate::error::{CouplingError, CouplingResult};
use crate::traits::{FLUID_COMPONENTS, PRESSURE_COMPONENT};
use fsi_fem::{DofHandler, FaceQuadrature, FeFaceValues, GridInterpolator};
use fsi_mesh::{BoundaryFace, MeshLocator, QuadMesh};
use glam::{DMat2, DVec2};
use tracing::{debug, warn};

/// 流体场的只读视图
#[derive(Debug, Clone, Copy)]
pub struct FluidField<'a> {
    pub locator: &'a MeshLocator<'a>,
    pub dofs: &'a DofHandler,
    pub solution: &'a [f64],
    /// 动力黏度 μ
    pub viscosity: f64,
}

/// 牵引力计算统计
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TractionSummary {
    /// 写入的边界面数
    pub n_faces: usize,
    /// 采样失败（牵引力记为零）的积分点数
    pub n_missed: usize,
    /// 合力 ∫ t ds
    pub net_force: DVec2,
}

/// 由各分量梯度组成速度梯度张量，`col(j)[i] = ∂v_i/∂x_j`
#[inline]
pub fn velocity_gradient(grad_u: DVec2, grad_v: DVec2) -> DMat2 {
    DMat2::from_cols(grad_u, grad_v).transpose()
}

/// 对称部分 (A + Aᵀ) / 2
#[inline]
pub fn symmetric_part(a: DMat2) -> DMat2 {
    (a + a.transpose()) * 0.5
}

/// 流体作用在法向为 `normal` 的面上的牵引力
#[inline]
pub fn fluid_traction(pressure: f64, grad_velocity: DMat2, viscosity: f64, normal: DVec2) -> DVec2 {
    -pressure * normal + 2.0 * viscosity * (symmetric_part(grad_velocity) * normal)
}

/// 计算固体边界牵引力
///
/// 固体网格必须已处于当前构型。`traction` 被完整重写，重复调用结果相同。
pub fn find_solid_bc(
    solid_mesh: &QuadMesh,
    neumann_ids: &[u32],
    fluid: FluidField<'_>,
    face_quadrature: &FaceQuadrature,
    traction: &mut SolidTraction,
) -> CouplingResult<TractionSummary> {
    if fluid.dofs.n_components() != FLUID_COMPONENTS {
        return Err(CouplingError::Layout(format!(
            "流体场应有 {FLUID_COMPONENTS} 个分量，实际 {}",
            fluid.dofs.n_components()
        )));
    }
    fluid
        .dofs
        .check_compatible(fluid.locator.mesh(), fluid.solution)?;

    traction.clear();
    let mut summary = TractionSummary::default();
    let mut fe_face = FeFaceValues::new(face_quadrature.clone());
    let mut value = [0.0; FLUID_COMPONENTS];
    let mut gradient = [DVec2::ZERO; FLUID_COMPONENTS];

    let faces: Vec<BoundaryFace> = solid_mesh
        .boundary_faces_with_ids()
        .filter(|(f, id)| neumann_ids.contains(id) && solid_mesh.is_locally_owned(f.cell))
        .map(|(f, _)| f)
        .collect();

    for face in faces {
        fe_face.reinit(solid_mesh, face.cell, face.face)?;
        let mut values = Vec::with_capacity(fe_face.n_q_points());

        for q in 0..fe_face.n_q_points() {
            let sampler = GridInterpolator::new(fluid.locator, fluid.dofs, fe_face.quadrature_point(q));
            if !sampler.is_available() {
                summary.n_missed += 1;
            }
            sampler.point_value(fluid.solution, &mut value)?;
            sampler.point_gradient(fluid.solution, &mut gradient)?;

            let t = fluid_traction(
                value[PRESSURE_COMPONENT],
                velocity_gradient(gradient[0], gradient[1]),
                fluid.viscosity,
                fe_face.normal(q),
            );
            summary.net_force += t * fe_face.jxw(q);
            values.push(t);
        }

        traction.insert(face, values)?;
        summary.n_faces += 1;
    }

    if summary.n_missed > 0 {
        warn!(
            n_missed = summary.n_missed,
            "部分固体边界点不在本地流体网格中，牵引力取零"
        );
    }
    debug!(
        n_faces = summary.n_faces,
        fx = summary.net_force.x,
        fy = summary.net_force.y,
        "固体边界牵引力已更新"
    );
    Ok(summary)
}
