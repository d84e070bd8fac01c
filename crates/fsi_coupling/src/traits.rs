// crates/fsi_coupling/src/traits.rs

//! 外部求解器接口
//!
//! 流体/固体求解器各自拥有网格、场向量与线性代数状态。耦合层只读取
//! 它们的场，唯一的写操作是在 [`crate::MovedSolid`] 作用域内临时移动固体网格。
//! 耦合数据通过 `run_one_step` 的参数显式传入。

use crate::cache::{DirichletConstraints, FluidQuadratureData, SolidTraction};
use crate::error::SolverError;
use crate::time::Time;
use fsi_fem::{DofHandler, Quadrature};
use fsi_mesh::QuadMesh;

/// 流体场分量数 (u, v, p)
pub const FLUID_COMPONENTS: usize = 3;

/// 流体压力分量
pub const PRESSURE_COMPONENT: usize = 2;

/// 固体场分量数 (u_x, u_y)
pub const SOLID_COMPONENTS: usize = 2;

/// 流体步所需的耦合数据
#[derive(Debug, Clone, Copy)]
pub struct FluidCouplingData<'a> {
    /// 人工流体区域上的速度约束
    pub constraints: &'a DirichletConstraints,
    /// 积分点上的指示值与 FSI 力缓存
    pub quadrature_data: &'a FluidQuadratureData,
    /// 缓存对应的单元积分公式
    pub quadrature: &'a Quadrature,
}

/// 流体求解器
///
/// 组装时应在人工流体单元上加入体力项 `加速度 - div(应力)`，
/// 其中散度通过弱形式中应力与试函数梯度的积分得到。
pub trait FluidSolver {
    /// 流体网格（欧拉网格，不移动）
    fn mesh(&self) -> &QuadMesh;

    /// 自由度编号，分量为 (u, v, p)
    fn dof_handler(&self) -> &DofHandler;

    /// 当前解向量
    fn solution(&self) -> &[f64];

    /// 推进一步
    fn run_one_step(&mut self, time: &Time, coupling: FluidCouplingData<'_>) -> Result<(), SolverError>;

    /// 输出钩子
    fn output(&mut self, _time: &Time) -> Result<(), SolverError> {
        Ok(())
    }

    /// 网格加密钩子
    fn refine(&mut self, _time: &Time) -> Result<(), SolverError> {
        Ok(())
    }
}

/// 固体求解器
pub trait SolidSolver {
    /// 固体网格（拉格朗日网格，参考构型）
    fn mesh(&self) -> &QuadMesh;

    /// 可变网格，耦合层只用于临时移动节点
    fn mesh_mut(&mut self) -> &mut QuadMesh;

    /// 自由度编号，分量为 (x, y)
    fn dof_handler(&self) -> &DofHandler;

    /// 当前位移
    fn displacement(&self) -> &[f64];

    /// 当前速度
    fn velocity(&self) -> &[f64];

    /// 当前加速度
    fn acceleration(&self) -> &[f64];

    /// 使用给定牵引力推进一步
    fn run_one_step(&mut self, time: &Time, traction: &SolidTraction) -> Result<(), SolverError>;

    fn output(&mut self, _time: &Time) -> Result<(), SolverError> {
        Ok(())
    }

    fn refine(&mut self, _time: &Time) -> Result<(), SolverError> {
        Ok(())
    }
}

/// 固体场的只读视图
#[derive(Debug, Clone, Copy)]
pub struct SolidFields<'a> {
    pub dofs: &'a DofHandler,
    pub displacement: &'a [f64],
    pub velocity: &'a [f64],
    pub acceleration: &'a [f64],
}

impl<'a> SolidFields<'a> {
    pub fn from_solver<S: SolidSolver + ?Sized>(solid: &'a S) -> Self {
        Self {
            dofs: solid.dof_handler(),
            displacement: solid.displacement(),
            velocity: solid.velocity(),
            acceleration: solid.acceleration(),
        }
    }
}
