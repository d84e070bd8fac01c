// crates/fsi_fem/src/interpolator.rs

//! 跨网格场采样
//!
//! [`GridInterpolator`] 在构造时定位一次点，之后可以对同一网格上
//! 的任意场重复求值或求梯度。
//!
//! 点落在网格外，或所在单元不属于本地分区时，采样结果为零。
//! 这与 "该点处场为零" 无法区分；需要区分时调用
//! [`GridInterpolator::is_available`]。

use crate::dof_handler::DofHandler;
use crate::error::{check_len, FemError, FemResult};
use crate::fe_values::PointValues;
use fsi_mesh::{distance_to_unit_cell, project_to_unit_cell, MeshLocator, PointLocation};
use glam::DVec2;

/// 单点场采样器
#[derive(Debug)]
pub struct GridInterpolator<'a> {
    locator: &'a MeshLocator<'a>,
    dofs: &'a DofHandler,
    point: DVec2,
    location: PointLocation,
}

impl<'a> GridInterpolator<'a> {
    /// 定位 `point` 并创建采样器
    pub fn new(locator: &'a MeshLocator<'a>, dofs: &'a DofHandler, point: DVec2) -> Self {
        let location = locator.locate(point);
        Self {
            locator,
            dofs,
            point,
            location,
        }
    }

    #[inline]
    pub fn point(&self) -> DVec2 {
        self.point
    }

    /// 定位结果
    #[inline]
    pub fn location(&self) -> PointLocation {
        self.location
    }

    /// 点在本地分区拥有的单元内
    pub fn is_available(&self) -> bool {
        self.owned_location().is_some()
    }

    fn owned_location(&self) -> Option<(usize, DVec2)> {
        match self.location {
            PointLocation::Found { cell, local } if self.locator.mesh().is_locally_owned(cell) => {
                Some((cell, local))
            }
            _ => None,
        }
    }

    fn point_values(&self, cell: usize, local: DVec2) -> FemResult<PointValues> {
        let distance = distance_to_unit_cell(local);
        if distance >= self.locator.tolerance().inside_tol {
            return Err(FemError::InconsistentLocation { cell, distance });
        }
        PointValues::new(self.locator.mesh(), cell, project_to_unit_cell(local))
    }

    fn check_field(&self, coefficients: &[f64]) -> FemResult<()> {
        self.dofs.check_compatible(self.locator.mesh(), coefficients)
    }

    /// 场值，写入 `value`（长度必须等于分量数）
    ///
    /// 点不可用时写入零。
    pub fn point_value(&self, coefficients: &[f64], value: &mut [f64]) -> FemResult<()> {
        check_len("value components", self.dofs.n_components(), value.len())?;
        self.check_field(coefficients)?;

        match self.owned_location() {
            Some((cell, local)) => self
                .point_values(cell, local)?
                .value(self.dofs, coefficients, value),
            None => {
                value.fill(0.0);
                Ok(())
            }
        }
    }

    /// 场梯度，写入 `gradient`（长度必须等于分量数）
    ///
    /// 点不可用时写入零。
    pub fn point_gradient(&self, coefficients: &[f64], gradient: &mut [DVec2]) -> FemResult<()> {
        check_len("gradient components", self.dofs.n_components(), gradient.len())?;
        self.check_field(coefficients)?;

        match self.owned_location() {
            Some((cell, local)) => self
                .point_values(cell, local)?
                .gradient(self.dofs, coefficients, gradient),
            None => {
                gradient.fill(DVec2::ZERO);
                Ok(())
            }
        }
    }
}
