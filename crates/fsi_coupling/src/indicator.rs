// crates/fsi_coupling/src/indicator.rs

//! 指示场更新
//!
//! 流体单元的全部顶点都在固体网格内时，该单元属于人工流体区域。
//! 部分重叠按未覆盖处理。"在固体内" 指固体定位器找到包含该点的
//! 单元，且该单元属于本地分区；孔洞中没有单元，自然不算在内。

use crate::cache::{FluidQuadratureData, FsiPointData};
use crate::error::{CouplingError, CouplingResult};
use fsi_mesh::{MeshLocator, PointLocation, QuadMesh};
use glam::DVec2;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// 定位结果是否落在固体的本地分区内
#[inline]
fn location_in_solid(solid_mesh: &QuadMesh, location: &PointLocation) -> bool {
    location.cell().is_some_and(|cell| solid_mesh.is_locally_owned(cell))
}

/// 点是否在固体的本地占据区域内
#[inline]
pub fn point_in_solid(solid_locator: &MeshLocator<'_>, point: DVec2) -> bool {
    location_in_solid(solid_locator.mesh(), &solid_locator.locate(point))
}

/// 每个流体节点是否在固体内（批量定位）
pub fn vertices_in_solid(fluid_mesh: &QuadMesh, solid_locator: &MeshLocator<'_>) -> Vec<bool> {
    let solid_mesh = solid_locator.mesh();
    solid_locator
        .locate_batch(fluid_mesh.nodes())
        .iter()
        .map(|loc| location_in_solid(solid_mesh, loc))
        .collect()
}

/// 流体单元是否被固体完全覆盖
///
/// `inside` 为 [`vertices_in_solid`] 的结果。非本地流体单元不做分类，视为未覆盖。
pub fn cell_covered(fluid_mesh: &QuadMesh, inside: &[bool], cell: usize) -> bool {
    fluid_mesh.is_locally_owned(cell)
        && fluid_mesh
            .cell_nodes(cell)
            .iter()
            .all(|&node| inside[node])
}

/// 重新计算所有流体单元的指示值，返回人工流体单元数
///
/// 每个流体节点只定位一次，每个单元的积分点在一次遍历中统一写入。
/// 固体网格必须已处于当前构型。
pub fn update_indicator(
    fluid_mesh: &QuadMesh,
    solid_locator: &MeshLocator<'_>,
    data: &mut FluidQuadratureData,
) -> CouplingResult<usize> {
    if data.n_cells() != fluid_mesh.n_cells() {
        return Err(CouplingError::Layout(format!(
            "积分点数据有 {} 个单元，流体网格有 {} 个",
            data.n_cells(),
            fluid_mesh.n_cells()
        )));
    }

    let inside = vertices_in_solid(fluid_mesh, solid_locator);
    let n_q = data.n_q_points_per_cell();
    let classify = |(cell, points): (usize, &mut [FsiPointData])| {
        let covered = cell_covered(fluid_mesh, &inside, cell);
        for p in points.iter_mut() {
            p.indicator = covered;
        }
    };

    #[cfg(feature = "parallel")]
    data.points_mut()
        .par_chunks_mut(n_q)
        .enumerate()
        .for_each(classify);

    #[cfg(not(feature = "parallel"))]
    data.points_mut()
        .chunks_mut(n_q)
        .enumerate()
        .for_each(classify);

    data.verify_indicator()?;
    let n_artificial = data.n_artificial_cells();
    debug!(n_artificial, n_cells = fluid_mesh.n_cells(), "指示场已更新");
    Ok(n_artificial)
}
