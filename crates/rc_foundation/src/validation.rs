// crates/rc_foundation/src/validation.rs

//! 运行时验证工具
//!
//! 网格构建时逐单元收集问题，最后一次性报告全部非法单元，
//! 而不是在第一个错误处停下。
//!
//! # 示例
//!
//! ```
//! use rc_foundation::validation::{ValidationReport, ValidationError};
//!
//! let dz = -1.0f64;
//! let mut report = ValidationReport::new();
//! if dz <= 0.0 {
//!     report.add_error(ValidationError::NonPositive {
//!         field: "half_extent.z",
//!         cell_id: 0,
//!         value: dz,
//!     });
//! }
//! assert!(report.into_result().is_err());
//! ```

use std::fmt;

use crate::error::{RcError, RcResult};

/// 报告中最多展开的错误条数
const MAX_LISTED_ERRORS: usize = 8;

/// 逐单元收集的验证结果
///
/// 错误使网格构建失败；警告随结果返回，由调用方决定是否记录。
#[derive(Debug, Default)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// 空报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录错误
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// 记录警告
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// 已记录的错误
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// 已记录的警告
    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    /// 有错误时合并为一个几何错误（最多列出前几条），否则交出警告
    pub fn into_result(self) -> RcResult<Vec<ValidationWarning>> {
        if self.errors.is_empty() {
            return Ok(self.warnings);
        }
        let listed: Vec<String> = self
            .errors
            .iter()
            .take(MAX_LISTED_ERRORS)
            .map(ToString::to_string)
            .collect();
        let more = if self.errors.len() > MAX_LISTED_ERRORS {
            "; ..."
        } else {
            ""
        };
        Err(RcError::invalid_geometry(format!(
            "{} 个非法单元; {}{}",
            self.errors.len(),
            listed.join("; "),
            more
        )))
    }
}

/// 验证错误类型
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// 非有限值
    NonFinite {
        /// 字段名称
        field: &'static str,
        /// 所在单元 ID
        cell_id: usize,
        /// 非有限的数值
        value: f64,
    },
    /// 必须为正的量不为正
    NonPositive {
        /// 字段名称
        field: &'static str,
        /// 所在单元 ID
        cell_id: usize,
        /// 实际值
        value: f64,
    },
    /// 数据超出范围
    OutOfRange {
        /// 字段名称
        field: &'static str,
        /// 所在单元 ID
        cell_id: usize,
        /// 实际值
        value: f64,
        /// 下界
        min: f64,
        /// 上界
        max: f64,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite {
                field,
                cell_id,
                value,
            } => write!(f, "单元{}: 字段{}={} (非有限值)", cell_id, field, value),
            Self::NonPositive {
                field,
                cell_id,
                value,
            } => write!(f, "单元{}: 字段{}={} (必须为正)", cell_id, field, value),
            Self::OutOfRange {
                field,
                cell_id,
                value,
                min,
                max,
            } => write!(
                f,
                "单元{}: 字段{}={} 超出范围[{}, {}]",
                cell_id, field, value, min, max
            ),
        }
    }
}

/// 验证警告类型
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    /// 数值为零，对结果没有贡献
    ZeroValue {
        /// 字段名称
        field: &'static str,
        /// 所在单元 ID
        cell_id: usize,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroValue { field, cell_id } => {
                write!(f, "单元{}: 字段{}为零", cell_id, field)
            }
        }
    }
}
