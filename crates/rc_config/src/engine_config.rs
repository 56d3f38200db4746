// crates/rc_config/src/engine_config.rs

//! EngineConfig - 叠加引擎配置
//!
//! 包含物理常数、并行策略、失败处理模式和增量时间步选项，
//! 支持 JSON 文件读写。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::physical::PhysicalConstants;

/// 并行策略
///
/// - `Sequential`: 完全串行执行，适用于小规模问题
/// - `Parallel`: 按观测点并行，每个工作线程独占自己的输出行
/// - `Auto`: 根据观测点数量自动选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParallelStrategy {
    /// 串行执行
    Sequential,
    /// 按观测点并行
    Parallel,
    /// 自动选择（根据问题规模）
    #[default]
    Auto,
}

impl ParallelStrategy {
    /// 获取策略名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
            Self::Auto => "auto",
        }
    }

    /// 给定观测点数量时是否并行
    pub fn use_parallel(&self, n_points: usize, min_parallel_points: usize) -> bool {
        match self {
            Self::Sequential => false,
            Self::Parallel => true,
            Self::Auto => n_points >= min_parallel_points,
        }
    }
}

/// 失败处理模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// 第一个失败即中止整个计算
    #[default]
    Strict,
    /// 标记失败条目，返回其余已完成的结果
    Partial,
}

/// 叠加引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 物理常数
    #[serde(default)]
    pub physics: PhysicalConstants,

    /// 并行策略
    #[serde(default)]
    pub strategy: ParallelStrategy,

    /// 最小并行观测点数（Auto 策略下低于此值串行）
    #[serde(default = "default_min_parallel_points")]
    pub min_parallel_points: usize,

    /// 失败处理模式
    #[serde(default)]
    pub failure_mode: FailureMode,

    /// 时间序列增量累加：几何影响系数只算一次，逐步累加 ΔP 增量
    #[serde(default)]
    pub incremental: bool,

    /// 远场阈值：观测距离超过单元半对角线的该倍数时改用点源近似
    #[serde(default)]
    pub far_field_ratio: Option<f64>,
}

fn default_min_parallel_points() -> usize { 64 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            physics: PhysicalConstants::default(),
            strategy: ParallelStrategy::default(),
            min_parallel_points: default_min_parallel_points(),
            failure_mode: FailureMode::default(),
            incremental: false,
            far_field_ratio: None,
        }
    }
}

impl EngineConfig {
    /// 创建构建器
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;

        let config: EngineConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
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
        self.physics.validate()?;

        if let Some(ratio) = self.far_field_ratio {
            // 比值过小时点源近似误差不可控
            if !(ratio.is_finite() && ratio >= 2.0) {
                return Err(ConfigError::invalid(
                    "far_field_ratio",
                    ratio,
                    "远场阈值必须为不小于 2 的有限值",
                ));
            }
        }

        Ok(())
    }
}

/// 配置构建器
#[derive(Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// 物理常数
    pub fn physics(mut self, physics: PhysicalConstants) -> Self {
        self.config.physics = physics;
        self
    }

    /// 并行策略
    pub fn strategy(mut self, strategy: ParallelStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// 最小并行观测点数
    pub fn min_parallel_points(mut self, n: usize) -> Self {
        self.config.min_parallel_points = n;
        self
    }

    /// 失败处理模式
    pub fn failure_mode(mut self, mode: FailureMode) -> Self {
        self.config.failure_mode = mode;
        self
    }

    /// 增量时间步
    pub fn incremental(mut self, enable: bool) -> Self {
        self.config.incremental = enable;
        self
    }

    /// 远场点源阈值
    pub fn far_field_ratio(mut self, ratio: Option<f64>) -> Self {
        self.config.far_field_ratio = ratio;
        self
    }

    /// 构建并验证
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
