// crates/rc_config/src/lib.rs

//! ResComp Config Layer (Layer 2)
//!
//! 配置层，提供物理常数和叠加引擎配置。
//!
//! # 模块概览
//!
//! - [`physical`]: PhysicalConstants 弹性半空间参数
//! - [`engine_config`]: EngineConfig 引擎配置（并行策略、失败模式、增量时间步）
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 3: rc_physics    ─> uses EngineConfig, PhysicalConstants
//! Layer 2: rc_config     ─> PhysicalConstants, EngineConfig (本层)
//! Layer 1: rc_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine_config;
pub mod error;
pub mod physical;

/// 层级标识
pub const LAYER: u8 = 2;

// 重导出核心类型
pub use engine_config::{EngineConfig, EngineConfigBuilder, FailureMode, ParallelStrategy};
pub use error::ConfigError;
pub use physical::PhysicalConstants;
