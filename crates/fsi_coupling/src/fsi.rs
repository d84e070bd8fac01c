// crates/fsi_coupling/src/fsi.rs

//! 耦合编排器
//!
//! 每个时间步按固定顺序执行（显式分区耦合，无子迭代）：
//!
//! 1. 固体网格前移到当前构型
//! 2. 更新指示场
//! 3. 计算固体边界牵引力（使用上一步的流体解）
//! 4. 固体网格恢复到参考构型
//! 5. 固体求解器推进
//! 6. 固体网格按新位移前移
//! 7. 计算流体边界条件与力缓存
//! 8. 流体求解器推进（此前固体网格已恢复）
//! 9. 时间推进，按周期触发输出与加密
//!
//! 任何失败都会中止运行，错误中带有失败的阶段。

use crate::cache::{DirichletConstraints, FluidQuadratureData, SolidTraction};
use crate::error::{CouplingPhase, CouplingResult, PhaseContext};
use crate::fluid_bc::{find_fluid_bc, ElasticMaterial, FluidBcSummary};
use crate::indicator::update_indicator;
use crate::motion::MovedSolid;
use crate::solid_bc::{find_solid_bc, FluidField, TractionSummary};
use crate::time::Time;
use crate::traits::{
    FluidCouplingData, FluidSolver, SolidFields, SolidSolver, FLUID_COMPONENTS, SOLID_COMPONENTS,
};
use fsi_config::FsiParameters;
use fsi_fem::{FaceQuadrature, FemError, Quadrature};
use fsi_mesh::{LocateTolerance, MeshLocator};
use glam::DVec2;
use serde::Serialize;
use tracing::{debug, info, info_span};

/// 单步报告
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepReport {
    /// 完成后的步数
    pub step: u64,
    /// 完成后的时间
    pub time: f64,
    /// 人工流体单元数
    pub artificial_cells: usize,
    /// 被约束的流体速度自由度数
    pub constrained_dofs: usize,
    /// 写入牵引力的固体边界面数
    pub traction_faces: usize,
    /// 不在本地流体网格中的牵引力积分点数
    pub missed_traction_points: usize,
    /// 牵引力合力
    pub net_traction: DVec2,
    /// 本步是否输出
    pub output: bool,
    /// 本步是否加密
    pub refined: bool,
}

/// 运行摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub steps: u64,
    pub final_time: f64,
    pub outputs: u64,
    pub refinements: u64,
    pub max_artificial_cells: usize,
    pub last_step: Option<StepReport>,
}

/// 耦合编排器
///
/// 借用两个求解器，持有时间控制器与全部耦合数据。
pub struct Fsi<'a, F: FluidSolver, S: SolidSolver> {
    fluid: &'a mut F,
    solid: &'a mut S,
    time: Time,
    quadrature: Quadrature,
    face_quadrature: FaceQuadrature,
    tolerance: LocateTolerance,
    viscosity: f64,
    material: ElasticMaterial,
    neumann_ids: Vec<u32>,
    fluid_data: FluidQuadratureData,
    constraints: DirichletConstraints,
    traction: SolidTraction,
}

impl<'a, F: FluidSolver, S: SolidSolver> Fsi<'a, F, S> {
    pub fn new(fluid: &'a mut F, solid: &'a mut S, params: &FsiParameters) -> CouplingResult<Self> {
        Self::setup(fluid, solid, params).phase(CouplingPhase::Setup)
    }

    fn setup(fluid: &'a mut F, solid: &'a mut S, params: &FsiParameters) -> CouplingResult<Self> {
        params.validate()?;
        let n_fluid = fluid.dof_handler().n_components();
        if n_fluid != FLUID_COMPONENTS {
            return Err(FemError::dimension_mismatch("fluid components", FLUID_COMPONENTS, n_fluid).into());
        }
        let n_solid = solid.dof_handler().n_components();
        if n_solid != SOLID_COMPONENTS {
            return Err(FemError::dimension_mismatch("solid components", SOLID_COMPONENTS, n_solid).into());
        }

        let n_q = params.coupling.quadrature_points;
        let quadrature = Quadrature::gauss(n_q)?;
        let face_quadrature = FaceQuadrature::gauss(n_q)?;
        let tolerance = LocateTolerance {
            inside_tol: params.coupling.inside_tolerance,
            boundary_tol: params.coupling.boundary_tolerance,
            ..LocateTolerance::STANDARD
        };

        info!(
            fluid_cells = fluid.mesh().n_cells(),
            solid_cells = solid.mesh().n_cells(),
            dt = params.time.time_step,
            end_time = params.time.end_time,
            "耦合初始化"
        );

        Ok(Self {
            fluid_data: FluidQuadratureData::new(fluid.mesh().n_cells(), &quadrature),
            constraints: DirichletConstraints::new(),
            traction: SolidTraction::new(face_quadrature.size()),
            fluid,
            solid,
            time: Time::from_config(&params.time),
            quadrature,
            face_quadrature,
            tolerance,
            viscosity: params.fluid.viscosity,
            material: ElasticMaterial::from_config(&params.solid),
            neumann_ids: params.solid.neumann_boundary_ids.clone(),
        })
    }

    // ===== 访问器 =====

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn fluid(&self) -> &F {
        &*self.fluid
    }

    pub fn solid(&self) -> &S {
        &*self.solid
    }

    /// 流体积分点数据（指示值与力缓存）
    pub fn fluid_data(&self) -> &FluidQuadratureData {
        &self.fluid_data
    }

    /// 每个流体单元的指示值
    pub fn indicator(&self) -> Vec<bool> {
        self.fluid_data.indicator()
    }

    pub fn constraints(&self) -> &DirichletConstraints {
        &self.constraints
    }

    pub fn traction(&self) -> &SolidTraction {
        &self.traction
    }

    // ===== 单独的耦合阶段 =====

    /// 固体前移后更新指示场，返回人工流体单元数
    pub fn update_indicator(&mut self) -> CouplingResult<usize> {
        self.sync_fluid_layout();
        let moved = MovedSolid::new(&mut *self.solid).phase(CouplingPhase::MoveSolid)?;
        let solid_locator = MeshLocator::with_tolerance(moved.mesh(), self.tolerance);
        update_indicator(self.fluid.mesh(), &solid_locator, &mut self.fluid_data)
            .phase(CouplingPhase::UpdateIndicator)
    }

    /// 固体前移后计算边界牵引力
    pub fn find_solid_bc(&mut self) -> CouplingResult<TractionSummary> {
        let moved = MovedSolid::new(&mut *self.solid).phase(CouplingPhase::MoveSolid)?;
        let fluid_locator = MeshLocator::with_tolerance(self.fluid.mesh(), self.tolerance);
        find_solid_bc(
            moved.mesh(),
            &self.neumann_ids,
            FluidField {
                locator: &fluid_locator,
                dofs: self.fluid.dof_handler(),
                solution: self.fluid.solution(),
                viscosity: self.viscosity,
            },
            &self.face_quadrature,
            &mut self.traction,
        )
        .phase(CouplingPhase::SolidTraction)
    }

    /// 固体前移后计算流体边界条件与力缓存（使用现有指示场）
    pub fn find_fluid_bc(&mut self) -> CouplingResult<FluidBcSummary> {
        self.sync_fluid_layout();
        let moved = MovedSolid::new(&mut *self.solid).phase(CouplingPhase::MoveSolid)?;
        let solid_locator = MeshLocator::with_tolerance(moved.mesh(), self.tolerance);
        find_fluid_bc(
            self.fluid.mesh(),
            self.fluid.dof_handler(),
            &self.quadrature,
            &solid_locator,
            SolidFields::from_solver(&*moved),
            self.material,
            &mut self.fluid_data,
            &mut self.constraints,
        )
        .phase(CouplingPhase::FluidBoundary)
    }

    /// 流体网格加密后重建积分点数据
    fn sync_fluid_layout(&mut self) {
        let n_cells = self.fluid.mesh().n_cells();
        if self.fluid_data.n_cells() != n_cells {
            debug!(n_cells, "流体网格变化，重建积分点数据");
            self.fluid_data.reset(n_cells);
        }
    }

    // ===== 时间步 =====

    /// 推进一个耦合时间步
    pub fn run_one_step(&mut self) -> CouplingResult<StepReport> {
        let span = info_span!("fsi_step", step = self.time.timestep() + 1);
        let _enter = span.enter();

        // 1-4: 当前构型上的指示场与牵引力，作用域结束时固体网格恢复
        let (artificial_cells, traction) = {
            self.sync_fluid_layout();
            let moved = MovedSolid::new(&mut *self.solid).phase(CouplingPhase::MoveSolid)?;
            let solid_locator = MeshLocator::with_tolerance(moved.mesh(), self.tolerance);
            let artificial_cells =
                update_indicator(self.fluid.mesh(), &solid_locator, &mut self.fluid_data)
                    .phase(CouplingPhase::UpdateIndicator)?;

            let fluid_locator = MeshLocator::with_tolerance(self.fluid.mesh(), self.tolerance);
            let traction = find_solid_bc(
                moved.mesh(),
                &self.neumann_ids,
                FluidField {
                    locator: &fluid_locator,
                    dofs: self.fluid.dof_handler(),
                    solution: self.fluid.solution(),
                    viscosity: self.viscosity,
                },
                &self.face_quadrature,
                &mut self.traction,
            )
            .phase(CouplingPhase::SolidTraction)?;
            (artificial_cells, traction)
        };

        // 5
        self.solid
            .run_one_step(&self.time, &self.traction)
            .phase(CouplingPhase::SolidStep)?;

        // 6-7: 推进后的固体构型上计算流体边界数据
        let fluid_bc = self.find_fluid_bc()?;

        // 8
        self.fluid
            .run_one_step(
                &self.time,
                FluidCouplingData {
                    constraints: &self.constraints,
                    quadrature_data: &self.fluid_data,
                    quadrature: &self.quadrature,
                },
            )
            .phase(CouplingPhase::FluidStep)?;

        // 9
        self.time.increment();
        let output = self.time.time_to_output();
        if output {
            self.fluid.output(&self.time).phase(CouplingPhase::Output)?;
            self.solid.output(&self.time).phase(CouplingPhase::Output)?;
        }
        let refined = self.time.time_to_refine();
        if refined {
            self.fluid.refine(&self.time).phase(CouplingPhase::Refinement)?;
            self.solid.refine(&self.time).phase(CouplingPhase::Refinement)?;
            self.sync_fluid_layout();
        }

        let report = StepReport {
            step: self.time.timestep(),
            time: self.time.current(),
            artificial_cells,
            constrained_dofs: fluid_bc.n_constrained_dofs,
            traction_faces: traction.n_faces,
            missed_traction_points: traction.n_missed,
            net_traction: traction.net_force,
            output,
            refined,
        };
        info!(
            t = report.time,
            artificial_cells = report.artificial_cells,
            constrained_dofs = report.constrained_dofs,
            fx = report.net_traction.x,
            fy = report.net_traction.y,
            "时间步完成"
        );
        Ok(report)
    }

    /// 运行到结束时间
    pub fn run(&mut self) -> CouplingResult<RunSummary> {
        let mut summary = RunSummary {
            steps: 0,
            final_time: self.time.current(),
            outputs: 0,
            refinements: 0,
            max_artificial_cells: 0,
            last_step: None,
        };

        while !self.time.is_finished() {
            let report = self.run_one_step()?;
            summary.steps += 1;
            summary.final_time = report.time;
            summary.outputs += u64::from(report.output);
            summary.refinements += u64::from(report.refined);
            summary.max_artificial_cells = summary.max_artificial_cells.max(report.artificial_cells);
            summary.last_step = Some(report);
        }

        info!(
            steps = summary.steps,
            final_time = summary.final_time,
            "模拟完成"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CouplingError;
    use crate::prescribed::{PrescribedFluid, PrescribedSolid};
    use fsi_mesh::RectMeshGenerator;

    fn params() -> FsiParameters {
        let mut params = FsiParameters::default();
        params.fluid.mesh.subdivisions = [10, 10];
        params
    }

    #[test]
    fn test_rejects_wrong_component_count() {
        struct ScalarSolid(PrescribedSolid, fsi_fem::DofHandler);
        impl SolidSolver for ScalarSolid {
            fn mesh(&self) -> &fsi_mesh::QuadMesh {
                self.0.mesh()
            }
            fn mesh_mut(&mut self) -> &mut fsi_mesh::QuadMesh {
                self.0.mesh_mut()
            }
            fn dof_handler(&self) -> &fsi_fem::DofHandler {
                &self.1
            }
            fn displacement(&self) -> &[f64] {
                self.0.displacement()
            }
            fn velocity(&self) -> &[f64] {
                self.0.velocity()
            }
            fn acceleration(&self) -> &[f64] {
                self.0.acceleration()
            }
            fn run_one_step(&mut self, time: &Time, traction: &SolidTraction) -> Result<(), crate::SolverError> {
                self.0.run_one_step(time, traction)
            }
        }

        let fluid_mesh = RectMeshGenerator::square(4, 1.0).build().unwrap();
        let solid_mesh = RectMeshGenerator::square(1, 0.2).build().unwrap();
        let mut fluid = PrescribedFluid::constant_pressure(fluid_mesh, 1.0);
        let dofs = fsi_fem::DofHandler::new(&solid_mesh, 1);
        let mut solid = ScalarSolid(PrescribedSolid::at_rest(solid_mesh), dofs);

        let err = Fsi::new(&mut fluid, &mut solid, &params()).err().unwrap();
        assert_eq!(err.phase(), Some(CouplingPhase::Setup));
        assert!(matches!(
            err.root(),
            CouplingError::Fem(FemError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let fluid_mesh = RectMeshGenerator::square(4, 1.0).build().unwrap();
        let solid_mesh = RectMeshGenerator::square(1, 0.2).build().unwrap();
        let mut fluid = PrescribedFluid::constant_pressure(fluid_mesh, 1.0);
        let mut solid = PrescribedSolid::at_rest(solid_mesh);
        let mut params = params();
        params.time.time_step = -1.0;
        let err = Fsi::new(&mut fluid, &mut solid, &params).err().unwrap();
        assert!(matches!(err.root(), CouplingError::Config(_)));
    }

    #[test]
    fn test_zero_end_time_runs_nothing() {
        let fluid_mesh = RectMeshGenerator::square(4, 1.0).build().unwrap();
        let solid_mesh = RectMeshGenerator::square(1, 0.2).build().unwrap();
        let mut fluid = PrescribedFluid::constant_pressure(fluid_mesh, 1.0);
        let mut solid = PrescribedSolid::at_rest(solid_mesh);
        let mut params = params();
        params.time.end_time = 0.0;

        let summary = Fsi::new(&mut fluid, &mut solid, &params).unwrap().run().unwrap();
        assert_eq!(summary.steps, 0);
        assert!(summary.last_step.is_none());
        assert_eq!(fluid.n_steps(), 0);
    }
}
