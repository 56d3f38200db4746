// crates/rc_physics/src/special/mod.rs

//! 特殊函数

pub mod elliptic;

pub use elliptic::{carlson_rd, carlson_rf, ellipe, ellipeinc, ellipk, ellipkinc};
