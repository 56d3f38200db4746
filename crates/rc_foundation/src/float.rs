// crates/rc_foundation/src/float.rs

//! 浮点数工具和数值常量
//!
//! 提供有限性检查和 Kahan 补偿求和。
//!
//! # 示例
//!
//! ```
//! use rc_foundation::float::{KahanSum, ensure_finite};
//!
//! assert!(ensure_finite("dx", 1.0).is_ok());
//! assert!(ensure_finite("dx", f64::NAN).is_err());
//!
//! // 朴素求和得到 0.0
//! let total: KahanSum = [1e16, 1.0, 1.0, -1e16].into_iter().sum();
//! assert_eq!(total.value(), 2.0);
//! ```

use crate::error::{RcError, RcResult};

// ============================================================================
// 有限性检查
// ============================================================================

/// 检查单个值是否有限，失败时返回数值域错误
#[inline]
pub fn ensure_finite(name: &str, value: f64) -> RcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RcError::domain(format!("{} 非有限: {}", name, value)))
    }
}

/// 检查三元组是否全部有限
#[inline]
pub fn ensure_finite3(name: &str, values: [f64; 3]) -> RcResult<[f64; 3]> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(values)
    } else {
        Err(RcError::domain(format!("{} 非有限: {:?}", name, values)))
    }
}

// ============================================================================
// Kahan 求和算法
// ============================================================================

/// Kahan 求和器
///
/// 使用补偿项跟踪累加过程中丢失的低位精度。叠加引擎用它累加单元贡献，
/// 使结果对单元顺序的依赖降到舍入误差量级。
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanSum {
    /// 累加和
    sum: f64,
    /// 补偿项（低位精度损失）
    compensation: f64,
}

impl KahanSum {
    /// 创建新的 Kahan 求和器
    #[inline]
    pub fn new() -> Self {
        Self {
            sum: 0.0,
            compensation: 0.0,
        }
    }

    /// 添加一个值
    #[inline]
    pub fn add(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        // (t - sum) 是 y 的高位部分，减去 y 得到丢失的低位部分（取反存储）
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    /// 获取当前求和值
    #[inline]
    pub fn value(&self) -> f64 {
        self.sum
    }
}

impl std::iter::Sum<f64> for KahanSum {
    fn sum<I: Iterator<Item = f64>>(iter: I) -> Self {
        let mut kahan = KahanSum::new();
        for v in iter {
            kahan.add(v);
        }
        kahan
    }
}

/// 三分量 Kahan 求和器
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanSum3 {
    parts: [KahanSum; 3],
}

impl KahanSum3 {
    /// 创建零值求和器
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 累加一个三元组
    #[inline]
    pub fn add(&mut self, value: [f64; 3]) {
        for (part, v) in self.parts.iter_mut().zip(value) {
            part.add(v);
        }
    }

    /// 当前值
    #[inline]
    pub fn value(&self) -> [f64; 3] {
        [
            self.parts[0].value(),
            self.parts[1].value(),
            self.parts[2].value(),
        ]
    }
}

// ============================================================================
// 测试
// ============================================================================
