// apps/fsi_cli/src/commands/mod.rs

//! 子命令

pub mod info;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use fsi_config::{FsiParameters, RectangleSpec};
use fsi_mesh::{QuadMesh, RectMeshGenerator};
use std::path::Path;
use tracing::info;

/// 读取配置文件，未指定时使用默认配置
pub(crate) fn load_parameters(path: Option<&Path>) -> Result<FsiParameters> {
    match path {
        Some(path) => {
            info!("读取配置: {}", path.display());
            FsiParameters::from_file(path)
                .with_context(|| format!("无法加载配置 {}", path.display()))
        }
        None => {
            info!("未指定配置文件，使用默认配置");
            Ok(FsiParameters::default())
        }
    }
}

/// 由矩形描述生成结构化网格
pub(crate) fn build_mesh(spec: &RectangleSpec, name: &str) -> Result<QuadMesh> {
    let [nx, ny] = spec.subdivisions;
    RectMeshGenerator::new(nx, ny, spec.size.x, spec.size.y)
        .with_origin(spec.origin.x, spec.origin.y)
        .build()
        .with_context(|| format!("无法生成{name}网格"))
}
