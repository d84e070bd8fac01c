// crates/fsi_fem/src/fe_values.rs

//! 有限元取值
//!
//! - [`PointValues`]: 单元内任意参考点处的形函数与物理梯度
//! - [`FeValues`]: 单元积分点上的取值与 JxW
//! - [`FeFaceValues`]: 面积分点上的取值、外法向与 JxW
//!
//! 物理梯度 `∇N = J^{-T} ∇̂N`。面上的外法向由 Nanson 公式给出：
//! `n ds = det(J) J^{-T} n̂ dŝ`。

use crate::dof_handler::DofHandler;
use crate::error::{check_len, FemError, FemResult};
use crate::quadrature::{FaceQuadrature, Quadrature};
use fsi_mesh::mapping::{self, REFERENCE_FACE_NORMALS};
use fsi_mesh::{QuadMesh, VERTICES_PER_CELL};
use glam::{DMat2, DVec2};

/// 单元内一个参考点处的取值
#[derive(Debug, Clone, Copy)]
pub struct PointValues {
    nodes: [usize; VERTICES_PER_CELL],
    shape: [f64; VERTICES_PER_CELL],
    gradients: [DVec2; VERTICES_PER_CELL],
    point: DVec2,
    det: f64,
    inverse_transpose: DMat2,
}

impl PointValues {
    /// 在单元 `cell` 的参考点 `xi` 处求值
    pub fn new(mesh: &QuadMesh, cell: usize, xi: DVec2) -> FemResult<Self> {
        let vertices = mesh.cell_vertices(cell);
        let jac = mapping::jacobian(&vertices, xi);
        let det = jac.determinant();
        if !(det > 0.0) {
            return Err(FemError::DegenerateCell { cell, det });
        }
        let inverse_transpose = jac.inverse().transpose();
        let gradients = mapping::shape_gradients(xi).map(|g| inverse_transpose * g);

        Ok(Self {
            nodes: mesh.cell_nodes(cell),
            shape: mapping::shape_values(xi),
            gradients,
            point: mapping::map_to_real(&vertices, xi),
            det,
            inverse_transpose,
        })
    }

    /// 物理坐标
    #[inline]
    pub fn point(&self) -> DVec2 {
        self.point
    }

    /// Jacobian 行列式
    #[inline]
    pub fn det(&self) -> f64 {
        self.det
    }

    /// 场值，写入 `out`（长度必须等于分量数）
    pub fn value(&self, dofs: &DofHandler, coefficients: &[f64], out: &mut [f64]) -> FemResult<()> {
        check_len("value components", dofs.n_components(), out.len())?;
        check_len("coefficient vector", dofs.n_dofs(), coefficients.len())?;
        out.fill(0.0);
        for (i, &node) in self.nodes.iter().enumerate() {
            let n = self.shape[i];
            for (c, o) in out.iter_mut().enumerate() {
                *o += n * coefficients[dofs.dof_index(node, c)];
            }
        }
        Ok(())
    }

    /// 场梯度，写入 `out`（长度必须等于分量数）
    pub fn gradient(&self, dofs: &DofHandler, coefficients: &[f64], out: &mut [DVec2]) -> FemResult<()> {
        check_len("gradient components", dofs.n_components(), out.len())?;
        check_len("coefficient vector", dofs.n_dofs(), coefficients.len())?;
        out.fill(DVec2::ZERO);
        for (i, &node) in self.nodes.iter().enumerate() {
            let g = self.gradients[i];
            for (c, o) in out.iter_mut().enumerate() {
                *o += g * coefficients[dofs.dof_index(node, c)];
            }
        }
        Ok(())
    }

    /// 将参考外法向映射到物理外法向，返回 (单位法向, 面积缩放因子)
    fn push_forward_normal(&self, reference_normal: DVec2) -> (DVec2, f64) {
        let n = self.inverse_transpose * reference_normal;
        let length = n.length();
        (n / length, self.det * length)
    }
}

/// 单元积分点上的取值
#[derive(Debug, Clone)]
pub struct FeValues {
    quadrature: Quadrature,
    values: Vec<PointValues>,
    jxw: Vec<f64>,
}

impl FeValues {
    pub fn new(quadrature: Quadrature) -> Self {
        let n = quadrature.size();
        Self {
            quadrature,
            values: Vec::with_capacity(n),
            jxw: Vec::with_capacity(n),
        }
    }

    /// 在单元 `cell` 上重新计算所有积分点
    pub fn reinit(&mut self, mesh: &QuadMesh, cell: usize) -> FemResult<()> {
        self.values.clear();
        self.jxw.clear();
        for q in 0..self.quadrature.size() {
            let pv = PointValues::new(mesh, cell, self.quadrature.point(q))?;
            self.jxw.push(pv.det() * self.quadrature.weight(q));
            self.values.push(pv);
        }
        Ok(())
    }

    #[inline]
    pub fn n_q_points(&self) -> usize {
        self.quadrature.size()
    }

    #[inline]
    pub fn quadrature_point(&self, q: usize) -> DVec2 {
        self.values[q].point()
    }

    #[inline]
    pub fn jxw(&self, q: usize) -> f64 {
        self.jxw[q]
    }

    #[inline]
    pub fn point_values(&self, q: usize) -> &PointValues {
        &self.values[q]
    }

    pub fn function_value(
        &self,
        dofs: &DofHandler,
        coefficients: &[f64],
        q: usize,
        out: &mut [f64],
    ) -> FemResult<()> {
        self.values[q].value(dofs, coefficients, out)
    }

    pub fn function_gradient(
        &self,
        dofs: &DofHandler,
        coefficients: &[f64],
        q: usize,
        out: &mut [DVec2],
    ) -> FemResult<()> {
        self.values[q].gradient(dofs, coefficients, out)
    }
}

/// 面积分点上的取值
#[derive(Debug, Clone)]
pub struct FeFaceValues {
    quadrature: FaceQuadrature,
    values: Vec<PointValues>,
    normals: Vec<DVec2>,
    jxw: Vec<f64>,
}

impl FeFaceValues {
    pub fn new(quadrature: FaceQuadrature) -> Self {
        let n = quadrature.size();
        Self {
            quadrature,
            values: Vec::with_capacity(n),
            normals: Vec::with_capacity(n),
            jxw: Vec::with_capacity(n),
        }
    }

    /// 在单元 `cell` 的局部面 `face` 上重新计算
    pub fn reinit(&mut self, mesh: &QuadMesh, cell: usize, face: usize) -> FemResult<()> {
        self.values.clear();
        self.normals.clear();
        self.jxw.clear();
        let reference_normal = REFERENCE_FACE_NORMALS[face];
        for q in 0..self.quadrature.size() {
            let xi = mapping::face_point(face, self.quadrature.point(q));
            let pv = PointValues::new(mesh, cell, xi)?;
            let (normal, scale) = pv.push_forward_normal(reference_normal);
            self.normals.push(normal);
            self.jxw.push(scale * self.quadrature.weight(q));
            self.values.push(pv);
        }
        Ok(())
    }

    #[inline]
    pub fn n_q_points(&self) -> usize {
        self.quadrature.size()
    }

    #[inline]
    pub fn quadrature_point(&self, q: usize) -> DVec2 {
        self.values[q].point()
    }

    /// 单位外法向
    #[inline]
    pub fn normal(&self, q: usize) -> DVec2 {
        self.normals[q]
    }

    #[inline]
    pub fn jxw(&self, q: usize) -> f64 {
        self.jxw[q]
    }

    #[inline]
    pub fn point_values(&self, q: usize) -> &PointValues {
        &self.values[q]
    }
}
