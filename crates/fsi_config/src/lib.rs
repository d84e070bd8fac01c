// crates/fsi_config/src/lib.rs

//! ImmerFSI 配置层
//!
//! 运行参数在启动时从 JSON 读取一次，运行期间不再修改。
//!
//! # 模块概览
//!
//! - [`parameters`]: `FsiParameters` 及各分节
//! - [`error`]: 配置错误类型
//!
//! # 使用示例
//!
//! ```rust
//! use fsi_config::FsiParameters;
//!
//! let params = FsiParameters::from_json_str(r#"{ "time": { "end_time": 0.5 } }"#).unwrap();
//! assert_eq!(params.time.end_time, 0.5);
//! assert!(params.solid.lame_mu() > 0.0);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod parameters;

pub use error::ConfigError;
pub use parameters::{
    CouplingConfig, FluidConfig, FsiParameters, OutputConfig, RectangleSpec, SolidConfig,
    TimeConfig,
};
