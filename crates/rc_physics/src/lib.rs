// crates/rc_physics/src/lib.rs

//! 储层压实位移计算模块
//!
//! 由孔隙压力变化预测地表及地下位移和应力：把矩形压实单元的闭式解
//! （棱柱位势导数 + 自由地表镜像系统）在任意网格和观测点集合上叠加。
//!
//! - 几何 (geometry) - 观测点、单元、角点偏移
//! - 核函数 (kernel) - 棱柱位势导数、压实位移与应力组合
//! - 网格 (grid) - 已验证的单元序列与平面层构建
//! - 压力 (pressure) - 每个 (单元, 时间) 的 ΔP 提供者
//! - 引擎 (engine) - 叠加求和、并行、失败处理
//! - 结果场 (field) - (观测点, 时间) → 位移或应力
//! - 特殊函数 (special) - 椭圆积分
//! - 参考解 (reference) - Geertsma 圆盘储层
//!
//! # 坐标与符号约定
//!
//! z 为深度，向下为正，地表位于 z = 0（镜像平面可由 `basement_depth` 平移）。
//! ΔP > 0 为增压，ΔP < 0 为衰竭；uz > 0 表示向下（沉降）；应力以拉为正。
//!
//! # 示例
//!
//! ```
//! use glam::DVec3;
//! use rc_config::PhysicalConstants;
//! use rc_physics::{evaluate, Grid, UniformPressure};
//!
//! let grid = Grid::rectangular_layer(
//!     (-500.0, 500.0), (-500.0, 500.0), (10, 10), (1000.0, 1050.0), 1.0e-9,
//! ).unwrap();
//! let points = [DVec3::new(0.0, 0.0, 0.0)];
//! let field = evaluate(
//!     &grid, &points, &UniformPressure::new(-5.0e6), &[0], &PhysicalConstants::default(),
//! ).unwrap();
//! assert!(field.get(0, 0).unwrap().is_subsidence());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod field;
pub mod geometry;
pub mod grid;
pub mod kernel;
pub mod pressure;
pub mod reference;
pub mod special;

// 重导出常用类型
pub use engine::{evaluate, evaluate_stress, EvaluationMetrics, SuperpositionEngine};
pub use field::{
    DisplacementField, DisplacementVector, EvaluationFailure, Field, FieldValue,
    RadialDisplacement, StressField, TractionVector,
};
pub use geometry::{corner_offsets, mirrored_corner_offsets, Cell, CornerOffsets, Point3};
pub use grid::Grid;
pub use kernel::{prism_kernel, prism_kernel_dz, CompactionKernel, PrismKernel, Quantity};
pub use pressure::{FnPressure, PressureHistory, PressureProvider, StaticPressure, UniformPressure};
pub use reference::{GeertsmaDisk, GeertsmaStress};

/// 层级标识
pub const LAYER: u8 = 3;
