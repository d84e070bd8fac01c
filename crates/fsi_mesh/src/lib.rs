// crates/fsi_mesh/src/lib.rs

//! ImmerFSI 网格模块
//!
//! 提供浸入式流固耦合所需的二维四边形网格、空间索引和点定位功能。
//! 流体网格与固体网格互相独立、互不协调，两者之间的所有信息交换都依赖
//! 本模块的点定位结果。
//!
//! # 核心类型
//!
//! - [`QuadMesh`]: 双线性四边形网格（顶点按字典序排列）
//! - [`MeshSpatialIndex`]: 基于 R-Tree 的单元包围盒索引
//! - [`MeshLocator`]: 点定位器，返回 [`PointLocation`]
//!
//! # 模块结构
//!
//! - [`quad_mesh`]: 网格数据、边界面、分区归属
//! - [`mapping`]: Q1 等参映射与参考单元几何
//! - [`spatial_index`]: 空间索引
//! - [`locator`]: 点定位
//! - [`generation`]: 结构化矩形网格生成
//!
//! # 示例
//!
//! ```rust
//! use fsi_mesh::generation::RectMeshGenerator;
//! use fsi_mesh::{MeshLocator, PointLocation};
//! use glam::DVec2;
//!
//! let mesh = RectMeshGenerator::square(4, 1.0).build().unwrap();
//! let locator = MeshLocator::new(&mesh);
//!
//! match locator.locate(DVec2::new(0.3, 0.6)) {
//!     PointLocation::Found { cell, .. } => assert!(cell < mesh.n_cells()),
//!     PointLocation::NotFound => unreachable!(),
//! }
//! assert!(locator.locate(DVec2::new(5.0, 5.0)).is_not_found());
//! ```

pub mod error;
pub mod generation;
pub mod locator;
pub mod mapping;
pub mod quad_mesh;
pub mod spatial_index;

// 重新导出核心类型
pub use error::{MeshError, MeshResult};
pub use generation::RectMeshGenerator;
pub use locator::{LocateTolerance, MeshLocator, PointLocation};
pub use mapping::{
    distance_to_unit_cell, project_to_unit_cell, FACES_PER_CELL, FACE_VERTICES,
    VERTICES_PER_CELL,
};
pub use quad_mesh::{BoundaryFace, MeshStatistics, MotionDirection, QuadMesh};
pub use spatial_index::{CellEnvelope, MeshSpatialIndex};
