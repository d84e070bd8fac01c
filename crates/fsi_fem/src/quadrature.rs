// crates/fsi_fem/src/quadrature.rs

//! Gauss 积分
//!
//! 参考区间为 `[0,1]`，单元积分为张量积形式。

use crate::error::{FemError, FemResult};
use glam::DVec2;

/// 一维 Gauss 点与权重（区间 [0,1]）
fn gauss_1d(n: usize) -> FemResult<(Vec<f64>, Vec<f64>)> {
    match n {
        1 => Ok((vec![0.5], vec![1.0])),
        2 => {
            let d = 0.5 / 3.0_f64.sqrt();
            Ok((vec![0.5 - d, 0.5 + d], vec![0.5, 0.5]))
        }
        3 => {
            let d = 0.5 * (0.6_f64).sqrt();
            Ok((
                vec![0.5 - d, 0.5, 0.5 + d],
                vec![5.0 / 18.0, 8.0 / 18.0, 5.0 / 18.0],
            ))
        }
        other => Err(FemError::UnsupportedQuadrature(other)),
    }
}

/// 单元积分公式
#[derive(Debug, Clone)]
pub struct Quadrature {
    points: Vec<DVec2>,
    weights: Vec<f64>,
}

impl Quadrature {
    /// 每个方向 `n` 点的张量积 Gauss 公式
    pub fn gauss(n: usize) -> FemResult<Self> {
        let (p, w) = gauss_1d(n)?;
        let mut points = Vec::with_capacity(n * n);
        let mut weights = Vec::with_capacity(n * n);
        for j in 0..n {
            for i in 0..n {
                points.push(DVec2::new(p[i], p[j]));
                weights.push(w[i] * w[j]);
            }
        }
        Ok(Self { points, weights })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn point(&self, q: usize) -> DVec2 {
        self.points[q]
    }

    #[inline]
    pub fn weight(&self, q: usize) -> f64 {
        self.weights[q]
    }
}

/// 面积分公式（面参数 s ∈ [0,1]）
#[derive(Debug, Clone)]
pub struct FaceQuadrature {
    points: Vec<f64>,
    weights: Vec<f64>,
}

impl FaceQuadrature {
    pub fn gauss(n: usize) -> FemResult<Self> {
        let (points, weights) = gauss_1d(n)?;
        Ok(Self { points, weights })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn point(&self, q: usize) -> f64 {
        self.points[q]
    }

    #[inline]
    pub fn weight(&self, q: usize) -> f64 {
        self.weights[q]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        for n in 1..=3 {
            let q = Quadrature::gauss(n).unwrap();
            assert_eq!(q.size(), n * n);
            let sum: f64 = (0..q.size()).map(|i| q.weight(i)).sum();
            assert!((sum - 1.0).abs() < 1e-14);
        }
    }

    #[test]
    fn test_polynomial_exactness() {
        // 3 点 Gauss 对 5 次多项式精确: ∫ x^5 dx = 1/6
        let q = FaceQuadrature::gauss(3).unwrap();
        let integral: f64 = (0..q.size()).map(|i| q.weight(i) * q.point(i).powi(5)).sum();
        assert!((integral - 1.0 / 6.0).abs() < 1e-14);

        // 2x2 Gauss: ∫∫ x^3 y^2 = 1/12
        let q = Quadrature::gauss(2).unwrap();
        let integral: f64 = (0..q.size())
            .map(|i| q.weight(i) * q.point(i).x.powi(3) * q.point(i).y.powi(2))
            .sum();
        assert!((integral - 1.0 / 12.0).abs() < 1e-14);
    }

    #[test]
    fn test_unsupported() {
        assert!(matches!(
            Quadrature::gauss(4),
            Err(FemError::UnsupportedQuadrature(4))
        ));
        assert!(FaceQuadrature::gauss(0).is_err());
    }
}
