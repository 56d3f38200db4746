// crates/rc_foundation/src/lib.rs

//! ResComp Foundation Layer
//!
//! 基础层，提供整个项目的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `RcError` 与定位信息 `EvalLocation`
//! - [`float`]: 有限性检查、Kahan 补偿求和
//! - [`validation`]: 运行时验证报告
//!
//! # 示例
//!
//! ```
//! use rc_foundation::prelude::*;
//!
//! fn half_extent(v: f64) -> RcResult<f64> {
//!     let v = ensure_finite("dx", v)?;
//!     if v <= 0.0 {
//!         return Err(RcError::invalid_geometry("dx 必须为正"));
//!     }
//!     Ok(v)
//! }
//!
//! assert!(half_extent(10.0).is_ok());
//! assert!(half_extent(0.0).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod float;
pub mod validation;

// 重导出常用类型
pub use error::{EvalLocation, RcError, RcResult};
pub use float::{KahanSum, KahanSum3};
pub use validation::{ValidationError, ValidationReport, ValidationWarning};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{EvalLocation, RcError, RcResult};
    pub use crate::float::{ensure_finite, ensure_finite3, KahanSum, KahanSum3};
    pub use crate::validation::{ValidationError, ValidationReport, ValidationWarning};
}
