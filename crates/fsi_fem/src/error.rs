// crates/fsi_fem/src/error.rs

//! 有限元层错误类型
//!
//! 点定位失败不是错误：采样器在该情况下返回零值。这里只收录
//! 调用约定被破坏或内部不变量失效的情况，它们都应中止当前操作。

use fsi_mesh::MeshError;
use thiserror::Error;

/// 有限元结果类型
pub type FemResult<T> = Result<T, FemError>;

/// 有限元错误
#[derive(Error, Debug)]
pub enum FemError {
    /// 容器尺寸与场的分量数/自由度数不一致（调用约定错误）
    #[error("维度不匹配: {what} 期望 {expected}, 实际 {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// 定位结果的参考坐标不在单位单元内（内部不变量失效）
    #[error("内部错误: 单元 {cell} 的参考坐标距单位单元 {distance:.3e}")]
    InconsistentLocation { cell: usize, distance: f64 },

    /// 单元 Jacobian 非正
    #[error("单元 {cell} 的 Jacobian 行列式非正: {det:.3e}")]
    DegenerateCell { cell: usize, det: f64 },

    /// 不支持的积分阶数
    #[error("不支持的 Gauss 积分点数: {0} (支持 1..=3)")]
    UnsupportedQuadrature(usize),

    /// 网格错误
    #[error("网格错误: {0}")]
    Mesh(#[from] MeshError),
}

impl FemError {
    pub fn dimension_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            what,
            expected,
            actual,
        }
    }
}

/// 校验容器长度
#[inline]
pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> FemResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(FemError::dimension_mismatch(what, expected, actual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_len() {
        assert!(check_len("value", 3, 3).is_ok());
        let err = check_len("value", 3, 2).unwrap_err();
        assert!(matches!(
            err,
            FemError::DimensionMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
        assert!(err.to_string().contains("value"));
    }
}
