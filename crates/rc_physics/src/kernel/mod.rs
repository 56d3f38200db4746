// crates/rc_physics/src/kernel/mod.rs

//! 核函数模块
//!
//! - [`prism`]: 棱柱位势导数的角点交替和，纯几何
//! - [`compaction`]: 镜像系统组合，得到单个单元的位移与应力贡献

pub mod compaction;
pub mod prism;

pub use compaction::{CompactionKernel, Quantity};
pub use prism::{prism_kernel, prism_kernel_dz, PrismKernel};
