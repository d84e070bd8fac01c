// crates/fsi_mesh/src/quad_mesh.rs

//! 四边形网格
//!
//! 计算用的 SoA 布局网格。节点坐标是唯一可变的几何数据：
//! 固体网格在耦合查询期间会被临时移动到当前构型（见
//! [`QuadMesh::move_nodes`]），拓扑始终不变。
//!
//! # 分区归属
//!
//! 每个单元带一个子域编号，`local_subdomain` 表示当前进程拥有的子域。
//! 单进程运行时所有单元都属于子域 0。

use crate::error::{MeshError, MeshResult};
use crate::mapping::{self, cell_diameter, signed_area, FACE_VERTICES, VERTICES_PER_CELL};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 边界面（单元 + 局部面编号）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoundaryFace {
    /// 所属单元
    pub cell: usize,
    /// 局部面编号 (0..4)
    pub face: usize,
}

/// 网格运动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionDirection {
    /// 节点坐标 += 位移
    Forward,
    /// 节点坐标 -= 位移
    Backward,
}

impl MotionDirection {
    #[inline]
    fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

/// 四边形网格
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadMesh {
    /// 节点坐标
    nodes: Vec<DVec2>,
    /// 单元节点（字典序）
    cells: Vec<[usize; VERTICES_PER_CELL]>,
    /// 单元所属子域
    cell_subdomain: Vec<u32>,
    /// 本进程拥有的子域
    local_subdomain: u32,
    /// 边界面列表（按单元、面排序）
    boundary_faces: Vec<BoundaryFace>,
    /// 边界面的边界 ID（与 `boundary_faces` 一一对应）
    boundary_ids: Vec<u32>,
}

impl QuadMesh {
    /// 从节点和单元构建网格
    ///
    /// 校验节点索引范围与单元方向（Jacobian 在单元中心必须为正），
    /// 并识别只被一个单元引用的面作为边界面，边界 ID 默认为 0。
    pub fn new(nodes: Vec<DVec2>, cells: Vec<[usize; VERTICES_PER_CELL]>) -> MeshResult<Self> {
        let n_nodes = nodes.len();
        for (c, cell) in cells.iter().enumerate() {
            if let Some(&bad) = cell.iter().find(|&&n| n >= n_nodes) {
                return Err(MeshError::invalid_topology(
                    "QuadMesh::new",
                    format!("单元 {} 引用了不存在的节点 {} (节点数 {})", c, bad, n_nodes),
                ));
            }

            let vertices = cell.map(|n| nodes[n]);
            let det = mapping::jacobian(&vertices, DVec2::splat(0.5)).determinant();
            let h = cell_diameter(&vertices);
            if det <= 1e-12 * h * h {
                return Err(MeshError::degenerate_cell(c, "jacobian", det));
            }
        }

        let mut face_use: HashMap<(usize, usize), u32> = HashMap::new();
        for cell in &cells {
            for fv in FACE_VERTICES.iter() {
                *face_use.entry(face_key(cell[fv[0]], cell[fv[1]])).or_insert(0) += 1;
            }
        }

        let mut boundary_faces = Vec::new();
        for (c, cell) in cells.iter().enumerate() {
            for (f, fv) in FACE_VERTICES.iter().enumerate() {
                match face_use[&face_key(cell[fv[0]], cell[fv[1]])] {
                    1 => boundary_faces.push(BoundaryFace { cell: c, face: f }),
                    2 => {}
                    n => {
                        return Err(MeshError::invalid_topology(
                            "QuadMesh::new",
                            format!("单元 {} 的面 {} 被 {} 个单元共享", c, f, n),
                        ))
                    }
                }
            }
        }

        let n_cells = cells.len();
        let n_boundary = boundary_faces.len();
        Ok(Self {
            nodes,
            cells,
            cell_subdomain: vec![0; n_cells],
            local_subdomain: 0,
            boundary_faces,
            boundary_ids: vec![0; n_boundary],
        })
    }

    // ===== 基本访问 =====

    /// 节点数
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// 单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// 节点坐标
    #[inline]
    pub fn node(&self, node: usize) -> DVec2 {
        self.nodes[node]
    }

    /// 全部节点坐标
    #[inline]
    pub fn nodes(&self) -> &[DVec2] {
        &self.nodes
    }

    /// 单元的节点索引
    #[inline]
    pub fn cell_nodes(&self, cell: usize) -> [usize; VERTICES_PER_CELL] {
        self.cells[cell]
    }

    /// 单元的顶点坐标
    #[inline]
    pub fn cell_vertices(&self, cell: usize) -> [DVec2; VERTICES_PER_CELL] {
        self.cells[cell].map(|n| self.nodes[n])
    }

    /// 单元中心（参考单元中心的像）
    pub fn cell_center(&self, cell: usize) -> DVec2 {
        mapping::map_to_real(&self.cell_vertices(cell), DVec2::splat(0.5))
    }

    /// 单元面积
    pub fn cell_area(&self, cell: usize) -> f64 {
        signed_area(&self.cell_vertices(cell))
    }

    /// 单元直径
    pub fn cell_diameter(&self, cell: usize) -> f64 {
        cell_diameter(&self.cell_vertices(cell))
    }

    /// 面的两个端点
    pub fn face_vertices(&self, cell: usize, face: usize) -> [DVec2; 2] {
        let nodes = self.cells[cell];
        let fv = FACE_VERTICES[face];
        [self.nodes[nodes[fv[0]]], self.nodes[nodes[fv[1]]]]
    }

    /// 面中心
    pub fn face_center(&self, cell: usize, face: usize) -> DVec2 {
        let [a, b] = self.face_vertices(cell, face);
        (a + b) * 0.5
    }

    // ===== 边界 =====

    /// 全部边界面
    #[inline]
    pub fn boundary_faces(&self) -> &[BoundaryFace] {
        &self.boundary_faces
    }

    /// 边界面及其边界 ID
    pub fn boundary_faces_with_ids(&self) -> impl Iterator<Item = (BoundaryFace, u32)> + '_ {
        self.boundary_faces
            .iter()
            .copied()
            .zip(self.boundary_ids.iter().copied())
    }

    /// 查询某个面的边界 ID（内部面返回 None）
    pub fn boundary_id(&self, cell: usize, face: usize) -> Option<u32> {
        self.boundary_faces
            .binary_search(&BoundaryFace { cell, face })
            .ok()
            .map(|i| self.boundary_ids[i])
    }

    /// 按面中心坐标设置边界 ID
    pub fn set_boundary_ids<F>(&mut self, mut classify: F)
    where
        F: FnMut(DVec2) -> u32,
    {
        for (i, bf) in self.boundary_faces.iter().enumerate() {
            let [a, b] = self.face_vertices(bf.cell, bf.face);
            self.boundary_ids[i] = classify((a + b) * 0.5);
        }
    }

    // ===== 分区 =====

    /// 设置单元子域编号
    pub fn set_subdomains(&mut self, subdomains: Vec<u32>) -> MeshResult<()> {
        if subdomains.len() != self.cells.len() {
            return Err(MeshError::element_count_mismatch(
                self.cells.len(),
                subdomains.len(),
                "cell subdomains",
            ));
        }
        self.cell_subdomain = subdomains;
        Ok(())
    }

    /// 设置本进程拥有的子域
    pub fn set_local_subdomain(&mut self, subdomain: u32) {
        self.local_subdomain = subdomain;
    }

    /// 单元子域
    #[inline]
    pub fn subdomain(&self, cell: usize) -> u32 {
        self.cell_subdomain[cell]
    }

    /// 单元是否由本进程拥有
    #[inline]
    pub fn is_locally_owned(&self, cell: usize) -> bool {
        self.cell_subdomain[cell] == self.local_subdomain
    }

    // ===== 运动 =====

    /// 按节点位移移动网格
    ///
    /// `Forward` 后接相同位移的 `Backward` 在浮点精度内恢复原坐标。
    pub fn move_nodes(&mut self, offsets: &[DVec2], direction: MotionDirection) -> MeshResult<()> {
        if offsets.len() != self.nodes.len() {
            return Err(MeshError::element_count_mismatch(
                self.nodes.len(),
                offsets.len(),
                "node offsets",
            ));
        }
        let sign = direction.sign();
        for (node, offset) in self.nodes.iter_mut().zip(offsets) {
            *node += *offset * sign;
        }
        Ok(())
    }

    // ===== 统计 =====

    /// 包围盒 (min, max)
    pub fn bounds(&self) -> Option<(DVec2, DVec2)> {
        let first = *self.nodes.first()?;
        Some(
            self.nodes
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }

    /// 网格统计信息
    pub fn statistics(&self) -> MeshStatistics {
        let areas: Vec<f64> = (0..self.n_cells()).map(|c| self.cell_area(c)).collect();
        let (min_x, min_y, max_x, max_y) = match self.bounds() {
            Some((lo, hi)) => (lo.x, lo.y, hi.x, hi.y),
            None => (0.0, 0.0, 0.0, 0.0),
        };
        MeshStatistics {
            n_nodes: self.n_nodes(),
            n_cells: self.n_cells(),
            n_boundary_faces: self.boundary_faces.len(),
            min_cell_area: areas.iter().cloned().fold(f64::MAX, f64::min),
            max_cell_area: areas.iter().cloned().fold(0.0, f64::max),
            total_area: areas.iter().sum(),
            bounds: [min_x, min_y, max_x, max_y],
        }
    }
}

/// 网格统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshStatistics {
    pub n_nodes: usize,
    pub n_cells: usize,
    pub n_boundary_faces: usize,
    pub min_cell_area: f64,
    pub max_cell_area: f64,
    pub total_area: f64,
    /// [min_x, min_y, max_x, max_y]
    pub bounds: [f64; 4],
}

#[inline]
fn face_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 两个单元横向拼接: [0,2] x [0,1]
    fn two_cells() -> QuadMesh {
        let nodes = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(2.0, 1.0),
        ];
        let cells = vec![[0, 1, 3, 4], [1, 2, 4, 5]];
        QuadMesh::new(nodes, cells).unwrap()
    }

    #[test]
    fn test_boundary_faces() {
        let mesh = two_cells();
        // 8 个面中共享 1 个 -> 6 个边界面
        assert_eq!(mesh.boundary_faces().len(), 6);
        assert_eq!(mesh.boundary_id(0, 1), None);
        assert_eq!(mesh.boundary_id(1, 0), None);
        assert_eq!(mesh.boundary_id(0, 0), Some(0));
    }

    #[test]
    fn test_set_boundary_ids() {
        let mut mesh = two_cells();
        mesh.set_boundary_ids(|c| if c.x < 1e-12 { 7 } else { 1 });
        assert_eq!(mesh.boundary_id(0, 0), Some(7));
        assert_eq!(mesh.boundary_id(1, 1), Some(1));
    }

    #[test]
    fn test_rejects_inverted_cell() {
        let nodes = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(1.0, 1.0),
        ];
        let err = QuadMesh::new(nodes, vec![[1, 0, 3, 2]]).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateCell { .. }));
    }

    #[test]
    fn test_rejects_bad_node_index() {
        let nodes = vec![DVec2::ZERO; 3];
        assert!(QuadMesh::new(nodes, vec![[0, 1, 2, 3]]).is_err());
    }

    #[test]
    fn test_move_round_trip() {
        let mut mesh = two_cells();
        let original = mesh.nodes().to_vec();
        let offsets: Vec<DVec2> = (0..mesh.n_nodes())
            .map(|i| DVec2::new(0.1 * i as f64, -0.033 * i as f64))
            .collect();

        mesh.move_nodes(&offsets, MotionDirection::Forward).unwrap();
        assert!((mesh.node(5) - original[5]).length() > 0.1);
        mesh.move_nodes(&offsets, MotionDirection::Backward).unwrap();

        for (a, b) in mesh.nodes().iter().zip(&original) {
            assert!(a.distance(*b) < 1e-14);
        }
    }

    #[test]
    fn test_move_wrong_length() {
        let mut mesh = two_cells();
        assert!(mesh
            .move_nodes(&[DVec2::ZERO], MotionDirection::Forward)
            .is_err());
    }

    #[test]
    fn test_ownership() {
        let mut mesh = two_cells();
        assert!(mesh.is_locally_owned(1));
        mesh.set_subdomains(vec![0, 1]).unwrap();
        assert!(mesh.is_locally_owned(0));
        assert!(!mesh.is_locally_owned(1));
        mesh.set_local_subdomain(1);
        assert!(mesh.is_locally_owned(1));
        assert!(mesh.set_subdomains(vec![0]).is_err());
    }

    #[test]
    fn test_statistics() {
        let stats = two_cells().statistics();
        assert_eq!(stats.n_cells, 2);
        assert!((stats.total_area - 2.0).abs() < 1e-14);
        assert_eq!(stats.bounds, [0.0, 0.0, 2.0, 1.0]);
    }
}
