// crates/rc_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `RcError` 枚举和 `RcResult` 类型别名，用于整个项目的错误处理。
//!
//! # 错误分类
//!
//! 1. **几何错误** (`InvalidGeometry`): 单元尺寸非正/非有限，网格构建失败。
//!    在网格构建阶段抛出，不可恢复。
//! 2. **数值域错误** (`Domain`): 非有限坐标或核函数无法处理的退化情况。
//!    携带出错的 (观测点, 单元, 时间) 索引。
//! 3. **缺失数据** (`MissingData`): 压力提供者无法给出某 (单元, 时间) 的 ΔP。
//!
//! 纯数值计算不存在瞬态错误，因此没有任何重试语义。
//!
//! # 示例
//!
//! ```
//! use rc_foundation::error::{RcError, RcResult};
//!
//! fn check_extent(dx: f64) -> RcResult<()> {
//!     if dx <= 0.0 {
//!         return Err(RcError::invalid_geometry("半宽必须为正"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_extent(-1.0).is_err());
//! ```

use std::fmt;
use thiserror::Error;

/// 统一结果类型
pub type RcResult<T> = Result<T, RcError>;

/// 计算位置：出错的 (观测点, 单元, 时间) 索引
///
/// 三个索引都是可选的，核函数层只知道几何，引擎层补全其余索引。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalLocation {
    /// 观测点索引
    pub point: Option<usize>,
    /// 单元索引
    pub cell: Option<usize>,
    /// 时间索引
    pub time: Option<usize>,
}

impl EvalLocation {
    /// 未定位
    pub const UNKNOWN: Self = Self {
        point: None,
        cell: None,
        time: None,
    };

    /// 完整定位
    pub fn new(point: usize, cell: usize, time: usize) -> Self {
        Self {
            point: Some(point),
            cell: Some(cell),
            time: Some(time),
        }
    }

    /// 合并定位信息，已有索引优先
    pub fn merge(self, other: Self) -> Self {
        Self {
            point: self.point.or(other.point),
            cell: self.cell.or(other.cell),
            time: self.time.or(other.time),
        }
    }
}

impl fmt::Display for EvalLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<usize>| v.map_or_else(|| "-".to_string(), |i| i.to_string());
        write!(
            f,
            "point={}, cell={}, time={}",
            show(self.point),
            show(self.cell),
            show(self.time)
        )
    }
}

/// ResComp 错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RcError {
    // ========================================================================
    // 输入验证错误
    // ========================================================================

    /// 无效几何（非正或非有限的单元尺寸、退化网格）
    #[error("无效几何: {message}")]
    InvalidGeometry {
        /// 具体错误信息
        message: String,
    },

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别描述
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界（长度）
        len: usize,
    },

    // ========================================================================
    // 计算错误
    // ========================================================================

    /// 数值域错误
    #[error("数值域错误: {message} ({location})")]
    Domain {
        /// 具体错误信息
        message: String,
        /// 出错位置
        location: EvalLocation,
    },

    /// 缺失压力数据
    #[error("缺失压力数据: cell={cell}, time={time}")]
    MissingData {
        /// 单元索引
        cell: usize,
        /// 时间索引
        time: usize,
    },

    /// 任务取消
    #[error("任务取消")]
    Cancelled,

    // ========================================================================
    // 配置错误
    // ========================================================================

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl RcError {
    /// 无效几何
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 索引越界
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }

    /// 数值域错误（未定位）
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain {
            message: message.into(),
            location: EvalLocation::UNKNOWN,
        }
    }

    /// 缺失数据
    pub fn missing_data(cell: usize, time: usize) -> Self {
        Self::MissingData { cell, time }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 为数值域错误补全定位信息，其他错误原样返回
    pub fn at(self, location: EvalLocation) -> Self {
        match self {
            Self::Domain {
                message,
                location: own,
            } => Self::Domain {
                message,
                location: own.merge(location),
            },
            other => other,
        }
    }

    /// 数值域错误的定位信息
    pub fn location(&self) -> Option<EvalLocation> {
        match self {
            Self::Domain { location, .. } => Some(*location),
            _ => None,
        }
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl RcError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> RcResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }

    /// 检查索引是否在范围内
    #[inline]
    pub fn check_index(index_type: &'static str, index: usize, len: usize) -> RcResult<()> {
        if index >= len {
            Err(Self::index_out_of_bounds(index_type, index, len))
        } else {
            Ok(())
        }
    }
}

// ========================================================================
// 测试
// ========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RcError::invalid_geometry("dx=-1");
        assert!(err.to_string().contains("无效几何"));
        assert!(err.to_string().contains("dx=-1"));
    }

    #[test]
    fn test_domain_location_merge() {
        let err = RcError::domain("NaN 坐标").at(EvalLocation {
            point: Some(3),
            cell: None,
            time: None,
        });
        let err = err.at(EvalLocation::new(7, 11, 2));
        let loc = err.location().unwrap();
        assert_eq!(loc.point, Some(3));
        assert_eq!(loc.cell, Some(11));
        assert_eq!(loc.time, Some(2));
        assert!(err.to_string().contains("point=3, cell=11, time=2"));
    }

    #[test]
    fn test_at_keeps_other_errors() {
        let err = RcError::missing_data(4, 1).at(EvalLocation::new(0, 0, 0));
        assert_eq!(err, RcError::MissingData { cell: 4, time: 1 });
        assert!(err.location().is_none());
    }

    #[test]
    fn test_unknown_location_display() {
        let err = RcError::domain("退化");
        assert!(err.to_string().contains("point=-, cell=-, time=-"));
    }

    #[test]
    fn test_check_size() {
        assert!(RcError::check_size("pressure", 10, 10).is_ok());
        assert!(RcError::check_size("pressure", 10, 5).is_err());
    }

    #[test]
    fn test_check_index() {
        assert!(RcError::check_index("Cell", 5, 10).is_ok());
        assert!(RcError::check_index("Cell", 10, 10).is_err());
    }
}
