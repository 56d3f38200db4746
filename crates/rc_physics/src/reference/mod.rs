// crates/rc_physics/src/reference/mod.rs

//! 参考解析解，用于交叉验证棱柱叠加结果

pub mod geertsma;

pub use geertsma::{GeertsmaDisk, GeertsmaStress};
