// crates/fsi_mesh/src/generation.rs

//! 网格生成模块
//!
//! 提供简单的结构化四边形网格生成工具，用于测试、验证和命令行演示。
//! 复杂几何的网格由外部提供。
//!
//! 边界 ID 按位置着色：
//!
//! | ID | 位置 |
//! |----|------|
//! | 0  | x = x0 |
//! | 1  | x = x0 + lx |
//! | 2  | y = y0 |
//! | 3  | y = y0 + ly |
//! | 4  | 孔洞边界 |
//!
//! # 使用示例
//!
//! ```rust
//! use fsi_mesh::generation::RectMeshGenerator;
//!
//! let mesh = RectMeshGenerator::new(10, 5, 1.0, 0.5).build().unwrap();
//! assert_eq!(mesh.n_cells(), 50);
//! assert_eq!(mesh.n_nodes(), 66);
//! ```

use crate::error::{MeshError, MeshResult};
use crate::quad_mesh::QuadMesh;
use glam::DVec2;

/// x = x0 边界
pub const BOUNDARY_X_MIN: u32 = 0;
/// x = x0 + lx 边界
pub const BOUNDARY_X_MAX: u32 = 1;
/// y = y0 边界
pub const BOUNDARY_Y_MIN: u32 = 2;
/// y = y0 + ly 边界
pub const BOUNDARY_Y_MAX: u32 = 3;
/// 孔洞边界
pub const BOUNDARY_HOLE: u32 = 4;

/// 矩形结构化网格生成器
///
/// 生成矩形域上的四边形网格。无孔洞时单元按行主序排列
/// （单元 `j * nx + i` 位于第 i 列第 j 行），节点按首次被单元引用的顺序编号。
#[derive(Debug, Clone)]
pub struct RectMeshGenerator {
    /// x 方向单元数
    nx: usize,
    /// y 方向单元数
    ny: usize,
    /// x 方向域长度
    lx: f64,
    /// y 方向域长度
    ly: f64,
    /// 原点
    origin: DVec2,
    /// 矩形孔洞 (min, max)，中心落在其中的单元被剔除
    hole: Option<(DVec2, DVec2)>,
}

impl RectMeshGenerator {
    /// 创建矩形网格生成器
    pub fn new(nx: usize, ny: usize, lx: f64, ly: f64) -> Self {
        Self {
            nx,
            ny,
            lx,
            ly,
            origin: DVec2::ZERO,
            hole: None,
        }
    }

    /// 创建方形网格生成器
    pub fn square(n: usize, length: f64) -> Self {
        Self::new(n, n, length, length)
    }

    /// 设置原点偏移
    pub fn with_origin(mut self, x0: f64, y0: f64) -> Self {
        self.origin = DVec2::new(x0, y0);
        self
    }

    /// 挖去一个矩形孔洞
    pub fn with_hole(mut self, min: DVec2, max: DVec2) -> Self {
        self.hole = Some((min, max));
        self
    }

    /// x 方向网格间距
    pub fn dx(&self) -> f64 {
        self.lx / self.nx as f64
    }

    /// y 方向网格间距
    pub fn dy(&self) -> f64 {
        self.ly / self.ny as f64
    }

    /// 生成网格
    pub fn build(&self) -> MeshResult<QuadMesh> {
        if self.nx == 0 || self.ny == 0 {
            return Err(MeshError::InvalidGeneration(format!(
                "细分数必须为正: nx={}, ny={}",
                self.nx, self.ny
            )));
        }
        if !(self.lx > 0.0 && self.ly > 0.0) {
            return Err(MeshError::InvalidGeneration(format!(
                "域长度必须为正: lx={}, ly={}",
                self.lx, self.ly
            )));
        }

        let (dx, dy) = (self.dx(), self.dy());
        let row = self.nx + 1;
        let lattice = |i: usize, j: usize| j * row + i;

        // 先在完整格点上生成单元，再压缩掉孔洞中未被引用的节点
        let mut cells = Vec::with_capacity(self.nx * self.ny);
        for j in 0..self.ny {
            for i in 0..self.nx {
                let center = self.origin + DVec2::new((i as f64 + 0.5) * dx, (j as f64 + 0.5) * dy);
                if self.in_hole(center) {
                    continue;
                }
                cells.push([
                    lattice(i, j),
                    lattice(i + 1, j),
                    lattice(i, j + 1),
                    lattice(i + 1, j + 1),
                ]);
            }
        }
        if cells.is_empty() {
            return Err(MeshError::InvalidGeneration("孔洞覆盖了整个区域".into()));
        }

        let n_lattice = row * (self.ny + 1);
        let mut remap = vec![usize::MAX; n_lattice];
        let mut nodes = Vec::with_capacity(n_lattice);
        for cell in &mut cells {
            for node in cell.iter_mut() {
                if remap[*node] == usize::MAX {
                    let (i, j) = (*node % row, *node / row);
                    remap[*node] = nodes.len();
                    nodes.push(self.origin + DVec2::new(i as f64 * dx, j as f64 * dy));
                }
                *node = remap[*node];
            }
        }

        let mut mesh = QuadMesh::new(nodes, cells)?;

        let (x0, y0) = (self.origin.x, self.origin.y);
        let (x1, y1) = (x0 + self.lx, y0 + self.ly);
        let eps = 1e-10 * dx.min(dy);
        mesh.set_boundary_ids(|c| {
            if (c.x - x0).abs() < eps {
                BOUNDARY_X_MIN
            } else if (c.x - x1).abs() < eps {
                BOUNDARY_X_MAX
            } else if (c.y - y0).abs() < eps {
                BOUNDARY_Y_MIN
            } else if (c.y - y1).abs() < eps {
                BOUNDARY_Y_MAX
            } else {
                BOUNDARY_HOLE
            }
        });

        Ok(mesh)
    }

    fn in_hole(&self, p: DVec2) -> bool {
        match self.hole {
            Some((lo, hi)) => p.x > lo.x && p.x < hi.x && p.y > lo.y && p.y < hi.y,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mesh = RectMeshGenerator::new(3, 2, 3.0, 2.0).build().unwrap();
        assert_eq!(mesh.n_cells(), 6);
        assert_eq!(mesh.n_nodes(), 12);
        assert_eq!(mesh.boundary_faces().len(), 10);
        assert!((mesh.statistics().total_area - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_colorized_boundary_ids() {
        let mesh = RectMeshGenerator::square(2, 1.0).build().unwrap();
        // 单元 0 在左下角
        assert_eq!(mesh.boundary_id(0, 0), Some(BOUNDARY_X_MIN));
        assert_eq!(mesh.boundary_id(0, 2), Some(BOUNDARY_Y_MIN));
        assert_eq!(mesh.boundary_id(3, 1), Some(BOUNDARY_X_MAX));
        assert_eq!(mesh.boundary_id(3, 3), Some(BOUNDARY_Y_MAX));
        assert_eq!(mesh.boundary_id(0, 1), None);
    }

    #[test]
    fn test_origin_offset() {
        let mesh = RectMeshGenerator::square(1, 0.2)
            .with_origin(0.4, 0.4)
            .build()
            .unwrap();
        let (lo, hi) = mesh.bounds().unwrap();
        assert!(lo.distance(DVec2::new(0.4, 0.4)) < 1e-14);
        assert!(hi.distance(DVec2::new(0.6, 0.6)) < 1e-14);
    }

    #[test]
    fn test_hole() {
        let mesh = RectMeshGenerator::square(3, 3.0)
            .with_hole(DVec2::new(1.0, 1.0), DVec2::new(2.0, 2.0))
            .build()
            .unwrap();
        assert_eq!(mesh.n_cells(), 8);
        // 16 个格点全部被引用
        assert_eq!(mesh.n_nodes(), 16);
        let hole_faces = mesh
            .boundary_faces_with_ids()
            .filter(|(_, id)| *id == BOUNDARY_HOLE)
            .count();
        assert_eq!(hole_faces, 4);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(RectMeshGenerator::new(0, 2, 1.0, 1.0).build().is_err());
        assert!(RectMeshGenerator::new(2, 2, -1.0, 1.0).build().is_err());
        assert!(RectMeshGenerator::square(1, 1.0)
            .with_hole(DVec2::splat(-1.0), DVec2::splat(2.0))
            .build()
            .is_err());
    }
}
