// crates/fsi_mesh/src/spatial_index.rs

//! 网格空间索引
//!
//! 基于 R-Tree 的单元包围盒索引，用于快速筛选可能包含某点的候选单元。
//! 使用 rstar crate 实现。
//!
//! 索引记录的是构建时刻的节点坐标。固体网格移动之后必须重新构建，
//! 否则查询结果对应的是旧构型。

use crate::quad_mesh::QuadMesh;
use glam::DVec2;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

/// 单元包围盒
///
/// 存储单元的轴对齐包围盒（AABB），用于 R-Tree 索引。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellEnvelope {
    /// 单元索引
    pub cell_index: usize,
    /// 最小 x 坐标
    pub min_x: f64,
    /// 最小 y 坐标
    pub min_y: f64,
    /// 最大 x 坐标
    pub max_x: f64,
    /// 最大 y 坐标
    pub max_y: f64,
}

impl CellEnvelope {
    /// 创建单元包围盒并向外扩张 `margin`
    ///
    /// 扩张量保证恰好落在单元边上的点（含浮点舍入）仍能被筛选到。
    pub fn new(cell_index: usize, vertices: &[DVec2], margin: f64) -> Self {
        debug_assert!(!vertices.is_empty(), "单元顶点列表不能为空");

        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;

        for v in vertices {
            min_x = min_x.min(v.x);
            min_y = min_y.min(v.y);
            max_x = max_x.max(v.x);
            max_y = max_y.max(v.y);
        }

        Self {
            cell_index,
            min_x: min_x - margin,
            min_y: min_y - margin,
            max_x: max_x + margin,
            max_y: max_y + margin,
        }
    }

    /// 检查点是否在包围盒内（闭区间）
    #[inline]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

impl RTreeObject for CellEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }
}

impl PointDistance for CellEnvelope {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        // 点到 AABB 的最短距离平方
        let dx = if point[0] < self.min_x {
            self.min_x - point[0]
        } else if point[0] > self.max_x {
            point[0] - self.max_x
        } else {
            0.0
        };

        let dy = if point[1] < self.min_y {
            self.min_y - point[1]
        } else if point[1] > self.max_y {
            point[1] - self.max_y
        } else {
            0.0
        };

        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        CellEnvelope::contains_point(self, point[0], point[1])
    }
}

/// 网格空间索引
#[derive(Debug)]
pub struct MeshSpatialIndex {
    tree: RTree<CellEnvelope>,
}

impl MeshSpatialIndex {
    /// 从网格当前节点坐标构建索引
    ///
    /// `relative_margin` 乘以各单元直径作为包围盒扩张量。
    pub fn build(mesh: &QuadMesh, relative_margin: f64) -> Self {
        let envelopes: Vec<CellEnvelope> = (0..mesh.n_cells())
            .map(|c| {
                let vertices = mesh.cell_vertices(c);
                let margin = relative_margin * mesh.cell_diameter(c);
                CellEnvelope::new(c, &vertices, margin)
            })
            .collect();

        Self {
            tree: RTree::bulk_load(envelopes),
        }
    }

    /// 包围盒包含该点的所有候选单元（按单元索引升序）
    pub fn candidates(&self, point: DVec2) -> Vec<usize> {
        let mut cells: Vec<usize> = self
            .tree
            .locate_all_at_point(&[point.x, point.y])
            .map(|env| env.cell_index)
            .collect();
        cells.sort_unstable();
        cells
    }
}
