// crates/fsi_coupling/src/time.rs

//! 时间控制器
//!
//! 跟踪当前时间、步数与固定步长，并给出输出/加密的周期触发。
//! 触发规则：`k = floor(interval / dt)`，当 `timestep >= k` 且
//! `timestep % k == 0` 时触发；`k` 为 0（间隔小于步长）时每步触发。

use fsi_config::TimeConfig;
use serde::Serialize;

/// 判定到达结束时间的绝对容差
const END_TIME_TOLERANCE: f64 = 1e-12;

/// 区间/步长比值的取整容差，避免 0.3 / 0.1 = 2.9999... 被截断为 2
const RATIO_ROUNDING: f64 = 1e-9;

/// 时间控制器
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Time {
    end_time: f64,
    delta_t: f64,
    output_interval: f64,
    refinement_interval: f64,
    current: f64,
    timestep: u64,
}

impl Time {
    pub fn new(end_time: f64, delta_t: f64, output_interval: f64, refinement_interval: f64) -> Self {
        debug_assert!(delta_t > 0.0, "时间步长必须为正");
        Self {
            end_time,
            delta_t,
            output_interval,
            refinement_interval,
            current: 0.0,
            timestep: 0,
        }
    }

    pub fn from_config(config: &TimeConfig) -> Self {
        Self::new(
            config.end_time,
            config.time_step,
            config.output_interval,
            config.refinement_interval,
        )
    }

    /// 当前时间
    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    #[inline]
    pub fn end(&self) -> f64 {
        self.end_time
    }

    #[inline]
    pub fn step_size(&self) -> f64 {
        self.delta_t
    }

    /// 已完成的步数
    #[inline]
    pub fn timestep(&self) -> u64 {
        self.timestep
    }

    /// 推进一步
    pub fn increment(&mut self) {
        self.current += self.delta_t;
        self.timestep += 1;
    }

    /// 是否到达结束时间
    pub fn is_finished(&self) -> bool {
        self.end_time - self.current <= END_TIME_TOLERANCE
    }

    pub fn time_to_output(&self) -> bool {
        self.triggered(self.output_interval)
    }

    pub fn time_to_refine(&self) -> bool {
        self.triggered(self.refinement_interval)
    }

    fn triggered(&self, interval: f64) -> bool {
        let k = (interval / self.delta_t + RATIO_ROUNDING).floor() as u64;
        if k == 0 {
            return true;
        }
        self.timestep >= k && self.timestep % k == 0
    }
}
