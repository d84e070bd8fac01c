// crates/fsi_coupling/src/lib.rs

//! ImmerFSI 耦合层
//!
//! 浸入式流固耦合引擎：固体占据固定流体网格中的一部分区域，两套互不
//! 协调的网格之间通过点定位与场采样交换数据，没有共享的界面网格。
//!
//! # 模块概览
//!
//! - [`time`]: 时间控制器 [`Time`]
//! - [`traits`]: 外部求解器接口 [`FluidSolver`]、[`SolidSolver`]
//! - [`cache`]: 指示值、力缓存、Dirichlet 约束与牵引力
//! - [`motion`]: 固体网格临时移动 [`MovedSolid`]
//! - [`indicator`]: 指示场更新
//! - [`solid_bc`]: 固体边界牵引力
//! - [`fluid_bc`]: 流体边界条件与力缓存
//! - [`fsi`]: 耦合编排器 [`Fsi`]
//! - [`prescribed`]: 解析给定的参考求解器
//! - [`error`]: 耦合错误类型
//!
//! # 层级架构
//!
//! ```text
//! fsi_cli      ─> 命令行
//! fsi_coupling ─> Fsi, 指示场, 牵引力, 流体边界条件 (本层)
//! fsi_config   ─> FsiParameters
//! fsi_fem      ─> DofHandler, FeValues, GridInterpolator
//! fsi_mesh     ─> QuadMesh, MeshLocator
//! ```
//!
//! # 使用示例
//!
//! ```rust
//! use fsi_config::FsiParameters;
//! use fsi_coupling::{Fsi, PrescribedFluid, PrescribedSolid};
//! use fsi_mesh::RectMeshGenerator;
//!
//! let fluid_mesh = RectMeshGenerator::square(10, 1.0).build().unwrap();
//! let solid_mesh = RectMeshGenerator::square(2, 0.2).with_origin(0.4, 0.4).build().unwrap();
//! let mut fluid = PrescribedFluid::constant_pressure(fluid_mesh, 1.0);
//! let mut solid = PrescribedSolid::at_rest(solid_mesh);
//!
//! let params = FsiParameters::default();
//! let mut fsi = Fsi::new(&mut fluid, &mut solid, &params).unwrap();
//! let summary = fsi.run().unwrap();
//! assert_eq!(summary.steps, 10);
//! assert_eq!(summary.max_artificial_cells, 4);
//! ```

pub mod cache;
pub mod error;
pub mod fluid_bc;
pub mod fsi;
pub mod indicator;
pub mod motion;
pub mod prescribed;
pub mod solid_bc;
pub mod time;
pub mod traits;

pub use cache::{DirichletConstraints, FluidQuadratureData, FsiPointData, SolidTraction};
pub use error::{CouplingError, CouplingPhase, CouplingResult, PhaseContext, SolverError};
pub use fluid_bc::{find_fluid_bc, ElasticMaterial, FluidBcSummary};
pub use fsi::{Fsi, RunSummary, StepReport};
pub use indicator::{point_in_solid, update_indicator, vertices_in_solid};
pub use motion::{move_solid_mesh, MovedSolid};
pub use prescribed::{PrescribedFluid, PrescribedSolid, RigidMotion};
pub use solid_bc::{find_solid_bc, FluidField, TractionSummary};
pub use time::Time;
pub use traits::{
    FluidCouplingData, FluidSolver, SolidFields, SolidSolver, FLUID_COMPONENTS,
    PRESSURE_COMPONENT, SOLID_COMPONENTS,
};
