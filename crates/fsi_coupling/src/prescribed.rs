// crates/fsi_coupling/src/prescribed.rs

//! 解析给定的参考求解器
//!
//! [`PrescribedFluid`] 的流体状态来自解析场，[`PrescribedSolid`] 做刚体运动。
//! 它们不求解任何方程，但完整消费耦合数据：流体把 Dirichlet 约束写入
//! 解向量并积分力缓存，固体积分边界牵引力得到合力。
//! 用于端到端测试与命令行演示。

use crate::cache::SolidTraction;
use crate::error::SolverError;
use crate::time::Time;
use crate::traits::{FluidCouplingData, FluidSolver, SolidSolver, FLUID_COMPONENTS, SOLID_COMPONENTS};
use fsi_fem::{DofHandler, FaceQuadrature, FeFaceValues, FeValues};
use fsi_mesh::QuadMesh;
use glam::DVec2;
use tracing::{debug, info};

type AnalyticFluid = Box<dyn Fn(DVec2, f64) -> [f64; FLUID_COMPONENTS] + Send + Sync>;

/// 解析流体
pub struct PrescribedFluid {
    mesh: QuadMesh,
    dofs: DofHandler,
    solution: Vec<f64>,
    field: AnalyticFluid,
    body_force: DVec2,
    n_steps: u64,
    n_outputs: u64,
}

impl PrescribedFluid {
    /// `field(x, t)` 返回 (u, v, p)
    pub fn new<F>(mesh: QuadMesh, field: F) -> Self
    where
        F: Fn(DVec2, f64) -> [f64; FLUID_COMPONENTS] + Send + Sync + 'static,
    {
        let dofs = DofHandler::new(&mesh, FLUID_COMPONENTS);
        let mut fluid = Self {
            solution: vec![0.0; dofs.n_dofs()],
            mesh,
            dofs,
            field: Box::new(field),
            body_force: DVec2::ZERO,
            n_steps: 0,
            n_outputs: 0,
        };
        fluid.fill(0.0);
        fluid
    }

    /// 静止流体，压力恒为 `pressure`
    pub fn constant_pressure(mesh: QuadMesh, pressure: f64) -> Self {
        Self::new(mesh, move |_, _| [0.0, 0.0, pressure])
    }

    /// 上一步人工流体区域上的 ∫ 加速度 dx
    pub fn body_force(&self) -> DVec2 {
        self.body_force
    }

    pub fn n_steps(&self) -> u64 {
        self.n_steps
    }

    pub fn n_outputs(&self) -> u64 {
        self.n_outputs
    }

    fn fill(&mut self, t: f64) {
        let field = &self.field;
        for (node, chunk) in self.solution.chunks_exact_mut(FLUID_COMPONENTS).enumerate() {
            chunk.copy_from_slice(&field(self.mesh.node(node), t));
        }
    }

    fn integrate_body_force(&self, coupling: &FluidCouplingData<'_>) -> Result<DVec2, SolverError> {
        let data = coupling.quadrature_data;
        if data.n_cells() != self.mesh.n_cells() {
            return Err(SolverError::InvalidState(format!(
                "力缓存单元数 {} 与流体网格 {} 不符",
                data.n_cells(),
                self.mesh.n_cells()
            )));
        }
        let mut fe_values = FeValues::new(coupling.quadrature.clone());
        let mut force = DVec2::ZERO;
        for cell in data.artificial_cells() {
            fe_values.reinit(&self.mesh, cell)?;
            for (q, point) in data.cell(cell).iter().enumerate() {
                force += point.acceleration * fe_values.jxw(q);
            }
        }
        Ok(force)
    }
}

impl FluidSolver for PrescribedFluid {
    fn mesh(&self) -> &QuadMesh {
        &self.mesh
    }

    fn dof_handler(&self) -> &DofHandler {
        &self.dofs
    }

    fn solution(&self) -> &[f64] {
        &self.solution
    }

    fn run_one_step(&mut self, time: &Time, coupling: FluidCouplingData<'_>) -> Result<(), SolverError> {
        self.fill(time.current() + time.step_size());
        coupling
            .constraints
            .distribute(&mut self.solution)
            .map_err(|e| SolverError::InvalidState(e.to_string()))?;
        self.body_force = self.integrate_body_force(&coupling)?;
        self.n_steps += 1;
        debug!(
            n_constrained = coupling.constraints.len(),
            fx = self.body_force.x,
            fy = self.body_force.y,
            "参考流体推进"
        );
        Ok(())
    }

    fn output(&mut self, time: &Time) -> Result<(), SolverError> {
        self.n_outputs += 1;
        info!(step = time.timestep(), t = time.current(), "流体输出");
        Ok(())
    }
}

/// 刚体运动状态
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RigidMotion {
    pub displacement: DVec2,
    pub velocity: DVec2,
    pub acceleration: DVec2,
}

type MotionLaw = Box<dyn Fn(f64) -> RigidMotion + Send + Sync>;

/// 刚体运动的固体
pub struct PrescribedSolid {
    mesh: QuadMesh,
    dofs: DofHandler,
    displacement: Vec<f64>,
    velocity: Vec<f64>,
    acceleration: Vec<f64>,
    motion: MotionLaw,
    net_force: DVec2,
    n_steps: u64,
}

impl PrescribedSolid {
    /// 按 `motion(t)` 运动
    pub fn with_motion<F>(mesh: QuadMesh, motion: F) -> Self
    where
        F: Fn(f64) -> RigidMotion + Send + Sync + 'static,
    {
        let dofs = DofHandler::new(&mesh, SOLID_COMPONENTS);
        let n = dofs.n_dofs();
        let mut solid = Self {
            mesh,
            dofs,
            displacement: vec![0.0; n],
            velocity: vec![0.0; n],
            acceleration: vec![0.0; n],
            motion: Box::new(motion),
            net_force: DVec2::ZERO,
            n_steps: 0,
        };
        solid.apply((solid.motion)(0.0));
        solid
    }

    /// 静止
    pub fn at_rest(mesh: QuadMesh) -> Self {
        Self::with_motion(mesh, |_| RigidMotion::default())
    }

    /// 匀速平移
    pub fn translating(mesh: QuadMesh, velocity: DVec2) -> Self {
        Self::with_motion(mesh, move |t| RigidMotion {
            displacement: velocity * t,
            velocity,
            acceleration: DVec2::ZERO,
        })
    }

    /// 直接设定均匀位移（下一步推进时被运动规律覆盖）
    pub fn set_rigid_displacement(&mut self, displacement: DVec2) {
        fill_uniform(&mut self.displacement, displacement);
    }

    /// 上一步边界牵引力的合力
    pub fn net_traction_force(&self) -> DVec2 {
        self.net_force
    }

    pub fn n_steps(&self) -> u64 {
        self.n_steps
    }

    fn apply(&mut self, state: RigidMotion) {
        fill_uniform(&mut self.displacement, state.displacement);
        fill_uniform(&mut self.velocity, state.velocity);
        fill_uniform(&mut self.acceleration, state.acceleration);
    }

    /// 在参考构型上积分牵引力
    fn integrate_traction(&self, traction: &SolidTraction) -> Result<DVec2, SolverError> {
        let mut fe_face = FeFaceValues::new(FaceQuadrature::gauss(traction.n_q_points_per_face())?);
        let mut force = DVec2::ZERO;
        for (face, values) in traction.iter() {
            if face.cell >= self.mesh.n_cells() {
                return Err(SolverError::InvalidState(format!(
                    "牵引力面引用了不存在的单元 {}",
                    face.cell
                )));
            }
            fe_face.reinit(&self.mesh, face.cell, face.face)?;
            for (q, t) in values.iter().enumerate() {
                force += *t * fe_face.jxw(q);
            }
        }
        Ok(force)
    }
}

fn fill_uniform(field: &mut [f64], value: DVec2) {
    for chunk in field.chunks_exact_mut(SOLID_COMPONENTS) {
        chunk[0] = value.x;
        chunk[1] = value.y;
    }
}

impl SolidSolver for PrescribedSolid {
    fn mesh(&self) -> &QuadMesh {
        &self.mesh
    }

    fn mesh_mut(&mut self) -> &mut QuadMesh {
        &mut self.mesh
    }

    fn dof_handler(&self) -> &DofHandler {
        &self.dofs
    }

    fn displacement(&self) -> &[f64] {
        &self.displacement
    }

    fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    fn acceleration(&self) -> &[f64] {
        &self.acceleration
    }

    fn run_one_step(&mut self, time: &Time, traction: &SolidTraction) -> Result<(), SolverError> {
        self.net_force = self.integrate_traction(traction)?;
        let state = (self.motion)(time.current() + time.step_size());
        self.apply(state);
        self.n_steps += 1;
        debug!(
            fx = self.net_force.x,
            fy = self.net_force.y,
            dx = state.displacement.x,
            dy = state.displacement.y,
            "参考固体推进"
        );
        Ok(())
    }
}
