// crates/fsi_mesh/src/locator.rs

//! 网格点定位器
//!
//! 在一个网格上查找包含给定物理点的单元，并求出该点在参考单元中的坐标。
//! "找不到"是正常且频繁的结果（点落在另一个网格覆盖、而本网格没有覆盖的
//! 区域），因此用 [`PointLocation`] 显式表达，而不是错误。
//!
//! 查询只针对实际存在的单元：网格中的孔洞不会被当作内部。

use crate::mapping::{self, distance_to_unit_cell};
use crate::quad_mesh::QuadMesh;
use crate::spatial_index::MeshSpatialIndex;
use glam::DVec2;

// ============================================================
// 容差配置
// ============================================================

/// 定位容差配置
///
/// 控制各种几何判断的容差阈值，用于处理浮点精度问题。
#[derive(Debug, Clone, Copy)]
pub struct LocateTolerance {
    /// 包围盒扩张量（相对单元直径）
    ///
    /// 默认值: 1e-8
    pub boundary_tol: f64,

    /// 参考坐标到单位单元的最大距离
    ///
    /// 定位成功的点必须满足 `distance_to_unit_cell(local) < inside_tol`。
    /// 默认值: 1e-10
    pub inside_tol: f64,

    /// 退化单元判断容差（相对 Jacobian 行列式）
    ///
    /// 默认值: 1e-12
    pub degenerate_tol: f64,
}

impl Default for LocateTolerance {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl LocateTolerance {
    /// 高精度容差
    pub const HIGH_PRECISION: Self = Self {
        boundary_tol: 1e-12,
        inside_tol: 1e-12,
        degenerate_tol: 1e-15,
    };

    /// 标准容差（默认设置）
    pub const STANDARD: Self = Self {
        boundary_tol: 1e-8,
        inside_tol: 1e-10,
        degenerate_tol: 1e-12,
    };
}

/// 点定位结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointLocation {
    /// 点在某个单元内
    Found {
        /// 单元索引
        cell: usize,
        /// 参考单元坐标，满足 `distance_to_unit_cell(local) < inside_tol`
        local: DVec2,
    },
    /// 点不在任何单元内
    NotFound,
}

impl PointLocation {
    /// 是否找到
    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// 是否未找到
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// 单元索引
    #[inline]
    pub fn cell(&self) -> Option<usize> {
        match self {
            Self::Found { cell, .. } => Some(*cell),
            Self::NotFound => None,
        }
    }
}

/// 网格定位器
///
/// 内部使用 R-Tree 空间索引筛选候选单元，再用 Q1 反映射做精确判断。
/// 定位器借用网格，因此在其生命周期内网格不能被移动；网格移动后
/// 需要重新构建。
///
/// ```ignore
/// let locator = MeshLocator::with_tolerance(&mesh, LocateTolerance::HIGH_PRECISION);
/// ```
#[derive(Debug)]
pub struct MeshLocator<'a> {
    /// 空间索引
    index: MeshSpatialIndex,
    mesh: &'a QuadMesh,
    tolerance: LocateTolerance,
}

impl<'a> MeshLocator<'a> {
    /// 从网格创建定位器（使用默认容差）
    pub fn new(mesh: &'a QuadMesh) -> Self {
        Self::with_tolerance(mesh, LocateTolerance::default())
    }

    /// 使用自定义容差创建定位器
    pub fn with_tolerance(mesh: &'a QuadMesh, tolerance: LocateTolerance) -> Self {
        let index = MeshSpatialIndex::build(mesh, tolerance.boundary_tol);
        Self {
            index,
            mesh,
            tolerance,
        }
    }

    /// 获取当前容差配置
    #[inline]
    pub fn tolerance(&self) -> &LocateTolerance {
        &self.tolerance
    }

    /// 定位点
    ///
    /// 在所有候选单元中选取参考坐标离单位单元最近的一个；
    /// 共享面/顶点上的点距离相同，此时取索引最小的单元。
    /// 平局的结果依赖单元编号，网格重编号后可能不同。
    pub fn locate(&self, point: DVec2) -> PointLocation {
        let mut best: Option<(usize, DVec2, f64)> = None;

        for cell in self.index.candidates(point) {
            let vertices = self.mesh.cell_vertices(cell);
            let Some(local) = mapping::map_to_unit(&vertices, point, self.tolerance.degenerate_tol)
            else {
                continue;
            };

            let distance = distance_to_unit_cell(local);
            if distance >= self.tolerance.inside_tol {
                continue;
            }

            // 候选按索引升序，严格小于保证平局取最小索引
            if best.map_or(true, |(_, _, d)| distance < d) {
                best = Some((cell, local, distance));
            }
        }

        match best {
            Some((cell, local, _)) => PointLocation::Found { cell, local },
            None => PointLocation::NotFound,
        }
    }

    /// 批量定位点，结果与输入一一对应
    ///
    /// 启用 `parallel` 特性时使用 rayon 并行查询。
    pub fn locate_batch(&self, points: &[DVec2]) -> Vec<PointLocation> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            points.par_iter().map(|&p| self.locate(p)).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            points.iter().map(|&p| self.locate(p)).collect()
        }
    }

    /// 获取网格引用
    #[inline]
    pub fn mesh(&self) -> &'a QuadMesh {
        self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::RectMeshGenerator;

    fn single_quad() -> QuadMesh {
        let nodes = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(0.5, 1.0),
            DVec2::new(2.0, 1.5),
        ];
        QuadMesh::new(nodes, vec![[0, 1, 2, 3]]).unwrap()
    }

    #[test]
    fn test_point_location() {
        let found = PointLocation::Found {
            cell: 3,
            local: DVec2::new(0.2, 0.4),
        };
        assert!(found.is_found());
        assert_eq!(found.cell(), Some(3));
        assert!(PointLocation::NotFound.is_not_found());
        assert_eq!(PointLocation::NotFound.cell(), None);
    }

    #[test]
    fn test_locate_inside_general_quad() {
        let mesh = single_quad();
        let locator = MeshLocator::new(&mesh);

        let xi = DVec2::new(0.25, 0.6);
        let p = mapping::map_to_real(&mesh.cell_vertices(0), xi);
        match locator.locate(p) {
            PointLocation::Found { cell, local } => {
                assert_eq!(cell, 0);
                assert!(local.distance(xi) < 1e-10);
            }
            PointLocation::NotFound => panic!("点应在单元内"),
        }
    }

    #[test]
    fn test_locate_outside_bbox_but_inside_envelope() {
        let mesh = single_quad();
        let locator = MeshLocator::new(&mesh);
        // 在包围盒内但在四边形外（左上角）
        assert!(locator.locate(DVec2::new(0.1, 1.4)).is_not_found());
        assert!(locator.locate(DVec2::new(100.0, -3.0)).is_not_found());
    }

    #[test]
    fn test_shared_face_found() {
        let mesh = RectMeshGenerator::new(2, 1, 2.0, 1.0).build().unwrap();
        let locator = MeshLocator::new(&mesh);

        // x = 1 为两个单元的公共面
        let loc = locator.locate(DVec2::new(1.0, 0.3));
        assert!(loc.is_found());
        assert!(matches!(loc.cell(), Some(0) | Some(1)));
        // 确定性：同一网格重复查询结果一致
        assert_eq!(loc, locator.locate(DVec2::new(1.0, 0.3)));
    }

    #[test]
    fn test_hole_is_not_inside() {
        let mesh = RectMeshGenerator::square(4, 1.0)
            .with_hole(DVec2::new(0.25, 0.25), DVec2::new(0.75, 0.75))
            .build()
            .unwrap();
        let locator = MeshLocator::new(&mesh);

        assert!(locator.locate(DVec2::new(0.1, 0.1)).is_found());
        assert!(locator.locate(DVec2::new(0.5, 0.5)).is_not_found());
        // 孔洞边界上的点仍属于周围单元
        assert!(locator.locate(DVec2::new(0.25, 0.5)).is_found());
    }

    #[test]
    fn test_locate_batch() {
        let mesh = RectMeshGenerator::square(3, 3.0).build().unwrap();
        let locator = MeshLocator::new(&mesh);
        let results = locator.locate_batch(&[DVec2::new(0.5, 0.5), DVec2::new(2.5, 2.5), DVec2::new(4.0, 0.0)]);
        assert_eq!(results[0].cell(), Some(0));
        assert_eq!(results[1].cell(), Some(8));
        assert!(results[2].is_not_found());
    }
}
