// crates/fsi_mesh/src/error.rs

//! 网格处理错误类型
//!
//! 包含网格拓扑、单元退化、尺寸不匹配等错误定义。

use thiserror::Error;

/// 网格模块结果类型
pub type MeshResult<T> = Result<T, MeshError>;

/// 网格错误枚举
#[derive(Error, Debug)]
pub enum MeshError {
    /// 拓扑错误
    #[error("拓扑错误: {operation} 失败, {details}")]
    InvalidTopology {
        operation: &'static str,
        details: String,
    },

    /// 单元退化或顶点顺序错误（Jacobian 非正）
    #[error("单元 {cell_id} 退化: {metric} = {value:.3e}")]
    DegenerateCell {
        cell_id: usize,
        metric: &'static str,
        value: f64,
    },

    /// 元素数量不匹配
    #[error("元素不匹配: {context} 需要 {required} 个, 提供 {provided}")]
    ElementCountMismatch {
        required: usize,
        provided: usize,
        context: String,
    },

    /// 生成参数无效
    #[error("网格生成参数无效: {0}")]
    InvalidGeneration(String),
}

/// 便捷构造函数
impl MeshError {
    pub fn invalid_topology(operation: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidTopology {
            operation,
            details: details.into(),
        }
    }

    pub fn degenerate_cell(cell_id: usize, metric: &'static str, value: f64) -> Self {
        Self::DegenerateCell {
            cell_id,
            metric,
            value,
        }
    }

    pub fn element_count_mismatch(
        required: usize,
        provided: usize,
        context: impl Into<String>,
    ) -> Self {
        Self::ElementCountMismatch {
            required,
            provided,
            context: context.into(),
        }
    }
}
