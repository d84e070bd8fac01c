//! 方块固体浸没在方形流体中的端到端场景
//!
//! 流体 [0,1]² 划分 10x10，固体 [0.4,0.6]² 划分 4x4。

use fsi_config::FsiParameters;
use fsi_coupling::{
    CouplingError, CouplingPhase, Fsi, FluidSolver, PrescribedFluid, PrescribedSolid,
    SolidSolver, SolidTraction, SolverError, Time, FLUID_COMPONENTS,
};
use fsi_fem::DofHandler;
use fsi_mesh::{QuadMesh, RectMeshGenerator};
use glam::DVec2;

const PRESSURE: f64 = 2.5;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn fluid_mesh() -> QuadMesh {
    RectMeshGenerator::square(10, 1.0).build().unwrap()
}

fn solid_mesh() -> QuadMesh {
    RectMeshGenerator::square(4, 0.2)
        .with_origin(0.4, 0.4)
        .build()
        .unwrap()
}

fn params() -> FsiParameters {
    let mut params = FsiParameters::default();
    params.time.end_time = 0.05;
    params.time.time_step = 0.01;
    params.fluid.mesh.subdivisions = [10, 10];
    params
}

fn covered_cells(indicator: &[bool]) -> Vec<usize> {
    indicator
        .iter()
        .enumerate()
        .filter_map(|(c, &covered)| covered.then_some(c))
        .collect()
}

#[test]
fn test_static_block_indicator() {
    init_tracing();
    let mut fluid = PrescribedFluid::constant_pressure(fluid_mesh(), PRESSURE);
    let mut solid = PrescribedSolid::at_rest(solid_mesh());
    let mut fsi = Fsi::new(&mut fluid, &mut solid, &params()).unwrap();

    let n = fsi.update_indicator().unwrap();
    assert_eq!(n, 4);
    assert_eq!(covered_cells(&fsi.indicator()), vec![44, 45, 54, 55]);

    // 同一单元所有积分点的指示值一致
    let data = fsi.fluid_data();
    for cell in 0..data.n_cells() {
        let points = data.cell(cell);
        assert!(points.iter().all(|p| p.indicator == points[0].indicator));
    }
}

#[test]
fn test_constant_pressure_traction() {
    init_tracing();
    let mut fluid = PrescribedFluid::constant_pressure(fluid_mesh(), PRESSURE);
    let mut solid = PrescribedSolid::at_rest(solid_mesh());
    let mut fsi = Fsi::new(&mut fluid, &mut solid, &params()).unwrap();

    let summary = fsi.find_solid_bc().unwrap();
    // 4x4 方块的边界有 16 个面
    assert_eq!(summary.n_faces, 16);
    assert_eq!(summary.n_missed, 0);
    // 均匀压力的合力为零
    assert!(summary.net_force.length() < 1e-12);

    let mesh = fsi.solid().mesh();
    for (face, values) in fsi.traction().iter() {
        let outward = mesh.face_center(face.cell, face.face) - mesh.cell_center(face.cell);
        for t in values {
            assert!((t.length() - PRESSURE).abs() < 1e-12);
            // t = -p n 指向固体内部
            assert!(t.dot(outward) < 0.0);
        }
    }
}

#[test]
fn test_traction_is_idempotent() {
    let mut fluid = PrescribedFluid::new(fluid_mesh(), |x, _| [x.y, -x.x, 1.0 + x.x]);
    let mut solid = PrescribedSolid::at_rest(solid_mesh());
    let mut fsi = Fsi::new(&mut fluid, &mut solid, &params()).unwrap();

    let first = fsi.find_solid_bc().unwrap();
    let traction: SolidTraction = fsi.traction().clone();
    let second = fsi.find_solid_bc().unwrap();
    assert_eq!(first, second);
    assert_eq!(&traction, fsi.traction());
}

#[test]
fn test_moved_block_and_back() {
    init_tracing();
    let mut fluid = PrescribedFluid::constant_pressure(fluid_mesh(), PRESSURE);
    let mut solid = PrescribedSolid::at_rest(solid_mesh());
    let reference = solid.mesh().nodes().to_vec();

    let initial = {
        let mut fsi = Fsi::new(&mut fluid, &mut solid, &params()).unwrap();
        fsi.update_indicator().unwrap();
        fsi.indicator()
    };

    solid.set_rigid_displacement(DVec2::new(0.1, 0.0));
    {
        let mut fsi = Fsi::new(&mut fluid, &mut solid, &params()).unwrap();
        fsi.update_indicator().unwrap();
        assert_eq!(covered_cells(&fsi.indicator()), vec![45, 46, 55, 56]);
    }
    // 网格回到参考构型
    for (p, q) in solid.mesh().nodes().iter().zip(&reference) {
        assert!(p.distance(*q) < 1e-14);
    }

    solid.set_rigid_displacement(DVec2::ZERO);
    let mut fsi = Fsi::new(&mut fluid, &mut solid, &params()).unwrap();
    fsi.update_indicator().unwrap();
    assert_eq!(fsi.indicator(), initial);
}

#[test]
fn test_full_run() {
    init_tracing();
    let mut fluid = PrescribedFluid::constant_pressure(fluid_mesh(), PRESSURE);
    let mut solid = PrescribedSolid::at_rest(solid_mesh());
    let mut params = params();
    params.time.output_interval = 0.02;

    let summary = Fsi::new(&mut fluid, &mut solid, &params).unwrap().run().unwrap();
    assert_eq!(summary.steps, 5);
    assert!((summary.final_time - 0.05).abs() < 1e-12);
    // 第 2、4 步输出
    assert_eq!(summary.outputs, 2);
    assert_eq!(summary.refinements, 0);
    assert_eq!(summary.max_artificial_cells, 4);

    let last = summary.last_step.unwrap();
    assert_eq!(last.step, 5);
    assert_eq!(last.constrained_dofs, 18);
    assert_eq!(last.traction_faces, 16);

    assert_eq!(fluid.n_steps(), 5);
    assert_eq!(fluid.n_outputs(), 2);
    assert_eq!(solid.n_steps(), 5);
    // 静止流体对静止方块的合力为零，人工区域加速度为零
    assert!(solid.net_traction_force().length() < 1e-12);
    assert!(fluid.body_force().length() < 1e-12);
}

#[test]
fn test_translating_block_constrains_velocity() {
    let velocity = DVec2::new(0.3, 0.0);
    let mut fluid = PrescribedFluid::constant_pressure(fluid_mesh(), PRESSURE);
    let mut solid = PrescribedSolid::translating(solid_mesh(), velocity);
    let dofs = DofHandler::new(&fluid_mesh(), FLUID_COMPONENTS);

    let mut fsi = Fsi::new(&mut fluid, &mut solid, &params()).unwrap();
    fsi.update_indicator().unwrap();
    let summary = fsi.find_fluid_bc().unwrap();
    assert_eq!(summary.n_artificial_cells, 4);
    assert_eq!(summary.n_constrained_dofs, 18);

    for (dof, value) in fsi.constraints().iter() {
        assert!(dof < dofs.n_dofs());
        match dof % FLUID_COMPONENTS {
            0 => assert!((value - velocity.x).abs() < 1e-12),
            1 => assert!(value.abs() < 1e-12),
            _ => panic!("压力自由度 {dof} 不应被约束"),
        }
    }

    // 推进后约束已写入流体解
    fsi.run_one_step().unwrap();
    let solution = fsi.fluid().solution();
    let (dof, value) = fsi.constraints().iter().next().unwrap();
    assert_eq!(solution[dof], value);
}

struct FailingSolid(PrescribedSolid);

impl SolidSolver for FailingSolid {
    fn mesh(&self) -> &QuadMesh {
        self.0.mesh()
    }

    fn mesh_mut(&mut self) -> &mut QuadMesh {
        self.0.mesh_mut()
    }

    fn dof_handler(&self) -> &DofHandler {
        self.0.dof_handler()
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

    fn run_one_step(&mut self, _time: &Time, _traction: &SolidTraction) -> Result<(), SolverError> {
        Err(SolverError::Divergence {
            message: "位移超过网格尺寸".into(),
        })
    }
}

#[test]
fn test_solid_failure_aborts_with_phase() {
    init_tracing();
    let mut fluid = PrescribedFluid::constant_pressure(fluid_mesh(), PRESSURE);
    let mut inner = PrescribedSolid::at_rest(solid_mesh());
    inner.set_rigid_displacement(DVec2::new(0.05, 0.05));
    let mut solid = FailingSolid(inner);
    let reference = solid.mesh().nodes().to_vec();

    let err = {
        let mut fsi = Fsi::new(&mut fluid, &mut solid, &params()).unwrap();
        let err = fsi.run().unwrap_err();
        assert_eq!(fsi.time().timestep(), 0);
        err
    };
    assert_eq!(err.phase(), Some(CouplingPhase::SolidStep));
    assert!(matches!(
        err.root(),
        CouplingError::Solver(SolverError::Divergence { .. })
    ));
    assert!(err.to_string().contains("solid_step"));

    for (p, q) in solid.mesh().nodes().iter().zip(&reference) {
        assert!(p.distance(*q) < 1e-14);
    }
    assert_eq!(fluid.n_steps(), 0);
}
