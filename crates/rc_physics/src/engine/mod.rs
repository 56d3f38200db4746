// crates/rc_physics/src/engine/mod.rs

//! 叠加求值引擎
//!
//! - [`superposition`]: 观测点 × 单元 × 时间的叠加求和（位移或应力）
//! - [`parallel`]: 性能指标
//!
//! 并行策略与失败模式由 [`rc_config::EngineConfig`] 给出。

pub mod parallel;
pub mod superposition;

pub use parallel::EvaluationMetrics;
pub use superposition::{evaluate, evaluate_stress, SuperpositionEngine};
