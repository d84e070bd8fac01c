// crates/fsi_fem/src/lib.rs

//! ImmerFSI 有限元层
//!
//! 在 [`fsi_mesh::QuadMesh`] 上定义节点型 Q1 有限元场，并提供跨网格场采样。
//!
//! # 模块概览
//!
//! - [`quadrature`]: 单元与面上的 Gauss 积分
//! - [`dof_handler`]: 自由度编号（`dof = node * n_components + component`）
//! - [`fe_values`]: 积分点处的形函数、梯度、JxW 与外法向
//! - [`interpolator`]: 场采样器 [`GridInterpolator`]
//! - [`error`]: 有限元错误类型
//!
//! # 层级架构
//!
//! ```text
//! fsi_coupling ─> 指示场、牵引力、流体边界条件
//! fsi_fem      ─> DofHandler, FeValues, GridInterpolator (本层)
//! fsi_mesh     ─> QuadMesh, MeshLocator
//! ```

pub mod dof_handler;
pub mod error;
pub mod fe_values;
pub mod interpolator;
pub mod quadrature;

pub use dof_handler::DofHandler;
pub use error::{FemError, FemResult};
pub use fe_values::{FeFaceValues, FeValues, PointValues};
pub use interpolator::GridInterpolator;
pub use quadrature::{FaceQuadrature, Quadrature};
