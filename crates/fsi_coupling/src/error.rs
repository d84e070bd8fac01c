// crates/fsi_coupling/src/error.rs

//! 耦合层错误类型
//!
//! 几何查询失败（点不在网格中）不是错误，由采样器以零值吸收。
//! 这里的错误都是致命的：编程约定被破坏、内部不变量失效、
//! 或外部求解器失败。编排器把它们包装为 [`CouplingError::Phase`]，
//! 消息中带有失败的耦合阶段。

use fsi_config::ConfigError;
use fsi_fem::FemError;
use fsi_mesh::MeshError;
use std::fmt;
use thiserror::Error;

/// 耦合结果类型
pub type CouplingResult<T> = Result<T, CouplingError>;

/// 外部求解器错误
///
/// 由 [`crate::FluidSolver`]/[`crate::SolidSolver`] 的实现返回，编排器原样向上传播。
#[derive(Error, Debug)]
pub enum SolverError {
    /// 线性系统求解失败
    #[error("线性求解失败: {message}")]
    LinearSolve { message: String },

    /// 数值发散
    #[error("数值发散: {message}")]
    Divergence { message: String },

    /// 求解器状态无效
    #[error("求解器状态无效: {0}")]
    InvalidState(String),

    /// 有限元错误
    #[error("有限元错误: {0}")]
    Fem(#[from] FemError),

    /// 网格错误
    #[error("网格错误: {0}")]
    Mesh(#[from] MeshError),
}

/// 耦合阶段（对应时间步循环中的各个子步）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CouplingPhase {
    /// 初始化
    Setup,
    /// 固体网格移动到当前构型
    MoveSolid,
    /// 指示场更新
    UpdateIndicator,
    /// 固体边界牵引力
    SolidTraction,
    /// 固体求解器推进
    SolidStep,
    /// 流体边界条件与力缓存
    FluidBoundary,
    /// 流体求解器推进
    FluidStep,
    /// 输出
    Output,
    /// 网格加密
    Refinement,
}

impl CouplingPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::MoveSolid => "move_solid",
            Self::UpdateIndicator => "update_indicator",
            Self::SolidTraction => "find_solid_bc",
            Self::SolidStep => "solid_step",
            Self::FluidBoundary => "find_fluid_bc",
            Self::FluidStep => "fluid_step",
            Self::Output => "output",
            Self::Refinement => "refinement",
        }
    }
}

impl fmt::Display for CouplingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 耦合错误
#[derive(Error, Debug)]
pub enum CouplingError {
    /// 某个耦合阶段失败
    #[error("耦合阶段 '{phase}' 失败: {source}")]
    Phase {
        phase: CouplingPhase,
        #[source]
        source: Box<CouplingError>,
    },

    /// 同一流体单元的积分点指示值不一致
    #[error("内部错误: 流体单元 {cell} 的积分点指示值不一致")]
    InconsistentIndicator { cell: usize },

    /// 耦合数据与网格不匹配
    #[error("耦合数据不匹配: {0}")]
    Layout(String),

    /// 外部求解器错误
    #[error("求解器错误: {0}")]
    Solver(#[from] SolverError),

    /// 有限元错误
    #[error("有限元错误: {0}")]
    Fem(#[from] FemError),

    /// 网格错误
    #[error("网格错误: {0}")]
    Mesh(#[from] MeshError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

impl CouplingError {
    /// 标注失败阶段
    pub fn in_phase(self, phase: CouplingPhase) -> Self {
        Self::Phase {
            phase,
            source: Box::new(self),
        }
    }

    /// 失败阶段（未标注时为 `None`）
    pub fn phase(&self) -> Option<CouplingPhase> {
        match self {
            Self::Phase { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// 去掉阶段包装后的根错误
    pub fn root(&self) -> &CouplingError {
        match self {
            Self::Phase { source, .. } => source.root(),
            other => other,
        }
    }
}

/// 为 `Result` 附加耦合阶段
pub trait PhaseContext<T> {
    fn phase(self, phase: CouplingPhase) -> CouplingResult<T>;
}

impl<T, E> PhaseContext<T> for Result<T, E>
where
    E: Into<CouplingError>,
{
    fn phase(self, phase: CouplingPhase) -> CouplingResult<T> {
        self.map_err(|e| e.into().in_phase(phase))
    }
}
