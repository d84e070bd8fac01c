// crates/fsi_coupling/src/motion.rs

//! 固体网格临时移动
//!
//! 几何查询（指示场、牵引力、流体边界条件）需要固体处于当前变形构型，
//! 而固体求解器在参考构型上组装。[`MovedSolid`] 在构造时按当前位移
//! 前移网格，在 `Drop` 时按同一组位移移回，任何退出路径都会恢复。

use crate::error::{CouplingError, CouplingResult};
use crate::traits::SolidSolver;
use fsi_fem::DofHandler;
use fsi_mesh::{MotionDirection, QuadMesh};
use glam::DVec2;
use std::ops::Deref;
use tracing::{error, trace};

/// 每个网格节点的位移
pub fn nodal_displacement(
    mesh: &QuadMesh,
    dofs: &DofHandler,
    displacement: &[f64],
) -> CouplingResult<Vec<DVec2>> {
    dofs.check_compatible(mesh, displacement)?;
    Ok(dofs.nodal_vectors(displacement, 0)?)
}

/// 按位移移动固体网格
///
/// 前移后再以相同位移后移，节点坐标恢复到浮点精度。
pub fn move_solid_mesh(
    mesh: &mut QuadMesh,
    offsets: &[DVec2],
    direction: MotionDirection,
) -> CouplingResult<()> {
    mesh.move_nodes(offsets, direction).map_err(CouplingError::from)
}

/// 处于当前构型的固体
///
/// 只提供只读访问，作用域内无法推进固体求解器。
pub struct MovedSolid<'a, S: SolidSolver + ?Sized> {
    solid: &'a mut S,
    offsets: Vec<DVec2>,
}

impl<'a, S: SolidSolver + ?Sized> MovedSolid<'a, S> {
    /// 按当前位移前移固体网格
    pub fn new(solid: &'a mut S) -> CouplingResult<Self> {
        let offsets = nodal_displacement(solid.mesh(), solid.dof_handler(), solid.displacement())?;
        move_solid_mesh(solid.mesh_mut(), &offsets, MotionDirection::Forward)?;
        trace!(n_nodes = offsets.len(), "固体网格前移");
        Ok(Self { solid, offsets })
    }

    /// 本次移动使用的节点位移
    pub fn offsets(&self) -> &[DVec2] {
        &self.offsets
    }
}

impl<S: SolidSolver + ?Sized> Deref for MovedSolid<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &*self.solid
    }
}

impl<S: SolidSolver + ?Sized> Drop for MovedSolid<'_, S> {
    fn drop(&mut self) {
        // 节点数在作用域内不变，后移只会在网格被外部替换时失败
        if let Err(e) = move_solid_mesh(
            self.solid.mesh_mut(),
            &self.offsets,
            MotionDirection::Backward,
        ) {
            error!("固体网格恢复失败: {e}");
        } else {
            trace!(n_nodes = self.offsets.len(), "固体网格恢复");
        }
    }
}
