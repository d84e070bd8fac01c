// crates/fsi_config/src/parameters.rs

//! FsiParameters - 耦合运行参数
//!
//! 所有字段都有默认值，JSON 中缺省的键使用默认值。
//! 默认配置是单位方形流体域中心放置边长 0.2 的固体方块。

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// 耦合运行参数
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FsiParameters {
    /// 时间参数
    #[serde(default)]
    pub time: TimeConfig,

    /// 流体参数
    #[serde(default)]
    pub fluid: FluidConfig,

    /// 固体参数
    #[serde(default)]
    pub solid: SolidConfig,

    /// 耦合参数
    #[serde(default)]
    pub coupling: CouplingConfig,

    /// 输出参数
    #[serde(default)]
    pub output: OutputConfig,
}

/// 时间参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// 结束时间 [s]
    #[serde(default = "default_end_time")]
    pub end_time: f64,

    /// 时间步长 [s]
    #[serde(default = "default_time_step")]
    pub time_step: f64,

    /// 输出间隔 [s]
    #[serde(default = "default_output_interval")]
    pub output_interval: f64,

    /// 网格加密间隔 [s]
    #[serde(default = "default_refinement_interval")]
    pub refinement_interval: f64,
}

fn default_end_time() -> f64 { 0.1 }
fn default_time_step() -> f64 { 0.01 }
fn default_output_interval() -> f64 { 0.05 }
fn default_refinement_interval() -> f64 { 1.0 }

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            end_time: default_end_time(),
            time_step: default_time_step(),
            output_interval: default_output_interval(),
            refinement_interval: default_refinement_interval(),
        }
    }
}

/// 结构化矩形网格描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectangleSpec {
    /// 左下角坐标
    pub origin: DVec2,
    /// 长宽
    pub size: DVec2,
    /// x/y 方向单元数
    pub subdivisions: [usize; 2],
}

impl RectangleSpec {
    /// 右上角坐标
    pub fn upper(&self) -> DVec2 {
        self.origin + self.size
    }

    fn validate(&self, key: &str) -> Result<(), ConfigError> {
        if !(self.size.x > 0.0 && self.size.y > 0.0) {
            return Err(ConfigError::invalid(
                &format!("{key}.size"),
                format!("{:?}", self.size.to_array()),
                "长宽必须为正",
            ));
        }
        if self.subdivisions.contains(&0) {
            return Err(ConfigError::invalid(
                &format!("{key}.subdivisions"),
                format!("{:?}", self.subdivisions),
                "单元数必须为正",
            ));
        }
        Ok(())
    }
}

/// 流体参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluidConfig {
    /// 动力黏度 μ [Pa·s]
    #[serde(default = "default_viscosity")]
    pub viscosity: f64,

    /// 流体网格
    #[serde(default = "default_fluid_mesh")]
    pub mesh: RectangleSpec,

    /// 参考流体的恒定压力 [Pa]
    #[serde(default = "default_reference_pressure")]
    pub reference_pressure: f64,
}

fn default_viscosity() -> f64 { 1e-3 }
fn default_reference_pressure() -> f64 { 1.0 }
fn default_fluid_mesh() -> RectangleSpec {
    RectangleSpec {
        origin: DVec2::ZERO,
        size: DVec2::ONE,
        subdivisions: [20, 20],
    }
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            viscosity: default_viscosity(),
            mesh: default_fluid_mesh(),
            reference_pressure: default_reference_pressure(),
        }
    }
}

/// 固体参数（线弹性）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolidConfig {
    /// 杨氏模量 E [Pa]
    #[serde(default = "default_youngs_modulus")]
    pub youngs_modulus: f64,

    /// 泊松比 ν
    #[serde(default = "default_poissons_ratio")]
    pub poissons_ratio: f64,

    /// 固体网格
    #[serde(default = "default_solid_mesh")]
    pub mesh: RectangleSpec,

    /// 承受流体牵引力的边界 ID
    #[serde(default = "default_neumann_ids")]
    pub neumann_boundary_ids: Vec<u32>,

    /// 参考固体的刚体平移速度 [m/s]
    #[serde(default)]
    pub reference_velocity: DVec2,
}

fn default_youngs_modulus() -> f64 { 1e5 }
fn default_poissons_ratio() -> f64 { 0.3 }
fn default_neumann_ids() -> Vec<u32> { vec![0, 1, 2, 3] }
fn default_solid_mesh() -> RectangleSpec {
    RectangleSpec {
        origin: DVec2::splat(0.4),
        size: DVec2::splat(0.2),
        subdivisions: [4, 4],
    }
}

impl Default for SolidConfig {
    fn default() -> Self {
        Self {
            youngs_modulus: default_youngs_modulus(),
            poissons_ratio: default_poissons_ratio(),
            mesh: default_solid_mesh(),
            neumann_boundary_ids: default_neumann_ids(),
            reference_velocity: DVec2::ZERO,
        }
    }
}

impl SolidConfig {
    /// 第一 Lamé 参数 λ = Eν / ((1+ν)(1-2ν))（平面应变）
    pub fn lame_lambda(&self) -> f64 {
        let (e, nu) = (self.youngs_modulus, self.poissons_ratio);
        e * nu / ((1.0 + nu) * (1.0 - 2.0 * nu))
    }

    /// 剪切模量 μ = E / (2(1+ν))
    pub fn lame_mu(&self) -> f64 {
        self.youngs_modulus / (2.0 * (1.0 + self.poissons_ratio))
    }
}

/// 耦合参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingConfig {
    /// 单元内判定容差（参考坐标距单位单元的距离）
    #[serde(default = "default_inside_tolerance")]
    pub inside_tolerance: f64,

    /// 空间索引包围盒的相对外扩量
    #[serde(default = "default_boundary_tolerance")]
    pub boundary_tolerance: f64,

    /// 每个方向的 Gauss 点数 (1..=3)
    #[serde(default = "default_quadrature_points")]
    pub quadrature_points: usize,
}

fn default_inside_tolerance() -> f64 { 1e-10 }
fn default_boundary_tolerance() -> f64 { 1e-8 }
fn default_quadrature_points() -> usize { 2 }

impl Default for CouplingConfig {
    fn default() -> Self {
        Self {
            inside_tolerance: default_inside_tolerance(),
            boundary_tolerance: default_boundary_tolerance(),
            quadrature_points: default_quadrature_points(),
        }
    }
}

/// 输出参数
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// 运行摘要 JSON 文件
    #[serde(default)]
    pub summary_file: Option<PathBuf>,
}

impl FsiParameters {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// 从 JSON 字符串解析配置并验证
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let params: FsiParameters =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let time = &self.time;
        if !(time.time_step > 0.0) {
            return Err(ConfigError::invalid("time.time_step", time.time_step, "时间步长必须为正"));
        }
        if !(time.end_time >= 0.0) {
            return Err(ConfigError::invalid("time.end_time", time.end_time, "结束时间不能为负"));
        }
        if !(time.output_interval > 0.0) {
            return Err(ConfigError::invalid(
                "time.output_interval",
                time.output_interval,
                "输出间隔必须为正",
            ));
        }
        if !(time.refinement_interval > 0.0) {
            return Err(ConfigError::invalid(
                "time.refinement_interval",
                time.refinement_interval,
                "加密间隔必须为正",
            ));
        }

        if !(self.fluid.viscosity >= 0.0) {
            return Err(ConfigError::invalid("fluid.viscosity", self.fluid.viscosity, "黏度不能为负"));
        }
        self.fluid.mesh.validate("fluid.mesh")?;

        let solid = &self.solid;
        if !(solid.youngs_modulus > 0.0) {
            return Err(ConfigError::invalid(
                "solid.youngs_modulus",
                solid.youngs_modulus,
                "杨氏模量必须为正",
            ));
        }
        if !(solid.poissons_ratio > -1.0 && solid.poissons_ratio < 0.5) {
            return Err(ConfigError::invalid(
                "solid.poissons_ratio",
                solid.poissons_ratio,
                "泊松比必须在 (-1, 0.5) 范围内",
            ));
        }
        solid.mesh.validate("solid.mesh")?;

        let coupling = &self.coupling;
        if !(coupling.inside_tolerance > 0.0) {
            return Err(ConfigError::invalid(
                "coupling.inside_tolerance",
                coupling.inside_tolerance,
                "容差必须为正",
            ));
        }
        if !(coupling.boundary_tolerance >= 0.0) {
            return Err(ConfigError::invalid(
                "coupling.boundary_tolerance",
                coupling.boundary_tolerance,
                "容差不能为负",
            ));
        }
        if !(1..=3).contains(&coupling.quadrature_points) {
            return Err(ConfigError::invalid(
                "coupling.quadrature_points",
                coupling.quadrature_points,
                "Gauss 点数必须在 1..=3 范围内",
            ));
        }

        Ok(())
    }

    /// 合法但可疑的配置
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let time = &self.time;
        if time.time_step > time.end_time {
            warnings.push(format!(
                "时间步长 {} 大于结束时间 {}，只会运行一步",
                time.time_step, time.end_time
            ));
        }
        if time.output_interval < time.time_step {
            warnings.push("输出间隔小于时间步长，每步都会输出".to_string());
        }
        if self.solid.poissons_ratio > 0.49 {
            warnings.push(format!(
                "泊松比 {} 接近不可压缩极限",
                self.solid.poissons_ratio
            ));
        }
        if self.solid.neumann_boundary_ids.is_empty() {
            warnings.push("未指定牵引力边界，固体不受流体作用".to_string());
        }

        let (fluid_lo, fluid_hi) = (self.fluid.mesh.origin, self.fluid.mesh.upper());
        let (solid_lo, solid_hi) = (self.solid.mesh.origin, self.solid.mesh.upper());
        if solid_lo.cmplt(fluid_lo).any() || solid_hi.cmpgt(fluid_hi).any() {
            warnings.push("固体网格超出流体域".to_string());
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let params = FsiParameters::default();
        assert!(params.validate().is_ok());
        assert!(params.warnings().is_empty());
        assert_eq!(params.fluid.mesh.subdivisions, [20, 20]);
    }

    #[test]
    fn test_lame_parameters() {
        let solid = SolidConfig {
            youngs_modulus: 2.6,
            poissons_ratio: 0.3,
            ..Default::default()
        };
        assert!((solid.lame_mu() - 1.0).abs() < 1e-12);
        assert!((solid.lame_lambda() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_values() {
        let mut params = FsiParameters::default();
        params.time.time_step = 0.0;
        assert!(params.validate().is_err());

        let mut params = FsiParameters::default();
        params.solid.poissons_ratio = 0.5;
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("solid.poissons_ratio"));

        let mut params = FsiParameters::default();
        params.coupling.quadrature_points = 4;
        assert!(params.validate().is_err());

        let mut params = FsiParameters::default();
        params.fluid.mesh.subdivisions = [0, 3];
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params = FsiParameters::from_json_str(
            r#"{
                "fluid": { "viscosity": 0.5 },
                "solid": { "mesh": { "origin": [0.1, 0.2], "size": [0.3, 0.3], "subdivisions": [2, 3] } }
            }"#,
        )
        .unwrap();
        assert_eq!(params.fluid.viscosity, 0.5);
        assert_eq!(params.fluid.reference_pressure, 1.0);
        let json = serde_json::to_value(&params).unwrap();
        assert!(json["fluid"].get("density").is_none());
        assert!(json["solid"].get("density").is_none());
        assert_eq!(params.solid.mesh.subdivisions, [2, 3]);
        assert!((params.solid.mesh.upper() - DVec2::new(0.4, 0.5)).length() < 1e-12);
        assert_eq!(params.time.time_step, 0.01);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            FsiParameters::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_warnings() {
        let mut params = FsiParameters::default();
        params.solid.mesh.origin = DVec2::new(0.9, 0.4);
        params.time.output_interval = 0.001;
        let warnings = params.warnings();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_file_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("fsi.json");

        let mut params = FsiParameters::default();
        params.time.end_time = 0.25;
        params.solid.neumann_boundary_ids = vec![4];
        params.output.summary_file = Some(temp_dir.path().join("summary.json"));
        params.save_to_file(&path).unwrap();

        let loaded = FsiParameters::from_file(&path).unwrap();
        assert_eq!(loaded.time.end_time, 0.25);
        assert_eq!(loaded.solid.neumann_boundary_ids, vec![4]);
        assert_eq!(loaded.output.summary_file, params.output.summary_file);
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            FsiParameters::from_file(temp_dir.path().join("absent.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
