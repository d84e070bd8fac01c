// crates/fsi_coupling/src/cache.rs

//! 耦合数据
//!
//! - [`FluidQuadratureData`]: 流体积分点上的指示值与 FSI 力缓存
//! - [`DirichletConstraints`]: 人工流体区域上的速度约束
//! - [`SolidTraction`]: 固体 Neumann 边界积分点上的牵引力
//!
//! 这些数据由编排器持有，每步重建，并以引用的形式交给求解器。

use crate::error::{CouplingError, CouplingResult};
use fsi_fem::Quadrature;
use fsi_mesh::BoundaryFace;
use glam::{DMat2, DVec2};
use std::collections::BTreeMap;

/// 流体积分点上的耦合数据
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FsiPointData {
    /// 所在单元是否被固体覆盖
    pub indicator: bool,
    /// 固体加速度
    pub acceleration: DVec2,
    /// 固体应力
    pub stress: DMat2,
}

impl Default for FsiPointData {
    fn default() -> Self {
        Self {
            indicator: false,
            acceleration: DVec2::ZERO,
            stress: DMat2::ZERO,
        }
    }
}

impl FsiPointData {
    /// 清空力缓存，保留指示值
    #[inline]
    pub fn clear_force(&mut self) {
        self.acceleration = DVec2::ZERO;
        self.stress = DMat2::ZERO;
    }
}

/// 流体单元积分点数据，按单元连续存储
#[derive(Debug, Clone)]
pub struct FluidQuadratureData {
    n_q_points: usize,
    points: Vec<FsiPointData>,
}

impl FluidQuadratureData {
    pub fn new(n_cells: usize, quadrature: &Quadrature) -> Self {
        let n_q_points = quadrature.size();
        Self {
            n_q_points,
            points: vec![FsiPointData::default(); n_cells * n_q_points],
        }
    }

    /// 调整单元数（网格加密后），所有数据重置
    pub fn reset(&mut self, n_cells: usize) {
        self.points.clear();
        self.points
            .resize(n_cells * self.n_q_points, FsiPointData::default());
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.points.len() / self.n_q_points
    }

    #[inline]
    pub fn n_q_points_per_cell(&self) -> usize {
        self.n_q_points
    }

    #[inline]
    pub fn cell(&self, cell: usize) -> &[FsiPointData] {
        &self.points[cell * self.n_q_points..(cell + 1) * self.n_q_points]
    }

    #[inline]
    pub fn cell_mut(&mut self, cell: usize) -> &mut [FsiPointData] {
        &mut self.points[cell * self.n_q_points..(cell + 1) * self.n_q_points]
    }

    /// 全部积分点（按单元连续）
    #[inline]
    pub fn points_mut(&mut self) -> &mut [FsiPointData] {
        &mut self.points
    }

    /// 单元是否属于人工流体区域
    #[inline]
    pub fn is_artificial(&self, cell: usize) -> bool {
        self.points[cell * self.n_q_points].indicator
    }

    pub fn artificial_cells(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.n_cells()).filter(|&c| self.is_artificial(c))
    }

    pub fn n_artificial_cells(&self) -> usize {
        self.artificial_cells().count()
    }

    /// 检查每个单元内所有积分点的指示值一致
    pub fn verify_indicator(&self) -> CouplingResult<()> {
        for (cell, chunk) in self.points.chunks_exact(self.n_q_points).enumerate() {
            let first = chunk[0].indicator;
            if chunk.iter().any(|p| p.indicator != first) {
                return Err(CouplingError::InconsistentIndicator { cell });
            }
        }
        Ok(())
    }

    /// 每个单元的指示值
    pub fn indicator(&self) -> Vec<bool> {
        (0..self.n_cells()).map(|c| self.is_artificial(c)).collect()
    }
}

/// 流体速度自由度上的 Dirichlet 约束
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirichletConstraints {
    values: BTreeMap<usize, f64>,
}

impl DirichletConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// 添加约束；自由度已被约束时保留先写入的值并返回 `false`
    pub fn add(&mut self, dof: usize, value: f64) -> bool {
        match self.values.entry(dof) {
            std::collections::btree_map::Entry::Vacant(e) => {
                e.insert(value);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    #[inline]
    pub fn is_constrained(&self, dof: usize) -> bool {
        self.values.contains_key(&dof)
    }

    #[inline]
    pub fn get(&self, dof: usize) -> Option<f64> {
        self.values.get(&dof).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 按自由度升序遍历
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values.iter().map(|(&d, &v)| (d, v))
    }

    /// 将约束值写入解向量
    pub fn distribute(&self, solution: &mut [f64]) -> CouplingResult<()> {
        if let Some((&last, _)) = self.values.last_key_value() {
            if last >= solution.len() {
                return Err(CouplingError::Layout(format!(
                    "约束自由度 {last} 超出解向量长度 {}",
                    solution.len()
                )));
            }
        }
        for (&dof, &value) in &self.values {
            solution[dof] = value;
        }
        Ok(())
    }
}

/// 固体边界面上各积分点的牵引力
#[derive(Debug, Clone, PartialEq)]
pub struct SolidTraction {
    n_q_points: usize,
    faces: BTreeMap<BoundaryFace, Vec<DVec2>>,
}

impl SolidTraction {
    /// 每个面 `n_q_points` 个积分点
    pub fn new(n_q_points: usize) -> Self {
        Self {
            n_q_points,
            faces: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn n_q_points_per_face(&self) -> usize {
        self.n_q_points
    }

    pub fn clear(&mut self) {
        self.faces.clear();
    }

    pub fn insert(&mut self, face: BoundaryFace, values: Vec<DVec2>) -> CouplingResult<()> {
        if values.len() != self.n_q_points {
            return Err(CouplingError::Layout(format!(
                "面 ({}, {}) 的牵引力点数 {} 与积分点数 {} 不符",
                face.cell,
                face.face,
                values.len(),
                self.n_q_points
            )));
        }
        self.faces.insert(face, values);
        Ok(())
    }

    #[inline]
    pub fn face(&self, face: &BoundaryFace) -> Option<&[DVec2]> {
        self.faces.get(face).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BoundaryFace, &[DVec2])> + '_ {
        self.faces.iter().map(|(f, v)| (f, v.as_slice()))
    }

    #[inline]
    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadrature_data_layout() {
        let q = Quadrature::gauss(2).unwrap();
        let mut data = FluidQuadratureData::new(3, &q);
        assert_eq!(data.n_cells(), 3);
        assert_eq!(data.n_q_points_per_cell(), 4);

        for p in data.cell_mut(1) {
            p.indicator = true;
        }
        assert_eq!(data.indicator(), vec![false, true, false]);
        assert_eq!(data.artificial_cells().collect::<Vec<_>>(), vec![1]);
        assert!(data.verify_indicator().is_ok());

        data.cell_mut(2)[3].indicator = true;
        assert!(matches!(
            data.verify_indicator(),
            Err(CouplingError::InconsistentIndicator { cell: 2 })
        ));

        data.reset(5);
        assert_eq!(data.n_cells(), 5);
        assert_eq!(data.n_artificial_cells(), 0);
    }

    #[test]
    fn test_first_writer_wins() {
        let mut constraints = DirichletConstraints::new();
        assert!(constraints.add(4, 1.0));
        assert!(!constraints.add(4, 2.0));
        assert_eq!(constraints.get(4), Some(1.0));

        let mut solution = vec![0.0; 6];
        constraints.distribute(&mut solution).unwrap();
        assert_eq!(solution[4], 1.0);

        constraints.add(9, 0.5);
        assert!(constraints.distribute(&mut solution).is_err());
    }

    #[test]
    fn test_traction_point_count_checked() {
        let mut traction = SolidTraction::new(2);
        let face = BoundaryFace { cell: 0, face: 1 };
        assert!(traction.insert(face, vec![DVec2::X]).is_err());
        traction.insert(face, vec![DVec2::X, DVec2::Y]).unwrap();
        assert_eq!(traction.face(&face).unwrap()[1], DVec2::Y);
        assert_eq!(traction.n_faces(), 1);
    }
}
