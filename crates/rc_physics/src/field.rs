// crates/rc_physics/src/field.rs

//! 结果场
//!
//! [`DisplacementVector`] 是全局坐标系下的三分量位移，uz > 0 表示向下（沉降）。
//! [`TractionVector`] 是水平面上的应力 (σxz, σyz, σzz)，拉为正。
//! [`Field`] 按 (观测点, 时间) 稠密存储，行主序：同一观测点的
//! 全部时间步连续存放，并行计算时每个工作线程独占自己的行。

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use glam::{DVec2, DVec3};
use rc_foundation::{RcError, RcResult};
use serde::{Deserialize, Serialize};

// ============================================================
// 位移向量
// ============================================================

/// 三分量位移 [m]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplacementVector {
    /// x 方向
    pub ux: f64,
    /// y 方向
    pub uy: f64,
    /// z 方向（向下为正）
    pub uz: f64,
}

/// 轴对称视图：径向和竖向分量
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RadialDisplacement {
    /// 径向分量，背离轴线为正
    pub ur: f64,
    /// 竖向分量，向下为正
    pub uz: f64,
}

impl DisplacementVector {
    /// 零位移
    pub const ZERO: Self = Self {
        ux: 0.0,
        uy: 0.0,
        uz: 0.0,
    };

    /// 创建
    #[inline]
    pub const fn new(ux: f64, uy: f64, uz: f64) -> Self {
        Self { ux, uy, uz }
    }

    /// 转为 glam 向量
    #[inline]
    pub fn to_vec3(self) -> DVec3 {
        DVec3::new(self.ux, self.uy, self.uz)
    }

    /// 水平分量
    #[inline]
    pub fn horizontal(&self) -> DVec2 {
        DVec2::new(self.ux, self.uy)
    }

    /// 模长
    #[inline]
    pub fn magnitude(&self) -> f64 {
        self.to_vec3().length()
    }

    /// 是否为沉降（向下）
    #[inline]
    pub fn is_subsidence(&self) -> bool {
        self.uz > 0.0
    }

    /// 是否为抬升（向上）
    #[inline]
    pub fn is_uplift(&self) -> bool {
        self.uz < 0.0
    }

    /// 相对竖直轴线的径向/竖向分解
    ///
    /// `position` 为观测点，`axis` 为轴线的水平位置。观测点位于轴线上时径向分量为 0。
    pub fn radial_from(&self, position: DVec3, axis: DVec2) -> RadialDisplacement {
        let offset = position.truncate() - axis;
        let r = offset.length();
        let ur = if r > 0.0 {
            self.horizontal().dot(offset) / r
        } else {
            0.0
        };
        RadialDisplacement { ur, uz: self.uz }
    }

    /// 所有分量有限
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.ux.is_finite() && self.uy.is_finite() && self.uz.is_finite()
    }
}

impl From<DVec3> for DisplacementVector {
    #[inline]
    fn from(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<[f64; 3]> for DisplacementVector {
    #[inline]
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl Add for DisplacementVector {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.ux + rhs.ux, self.uy + rhs.uy, self.uz + rhs.uz)
    }
}

impl AddAssign for DisplacementVector {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for DisplacementVector {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.ux - rhs.ux, self.uy - rhs.uy, self.uz - rhs.uz)
    }
}

impl Neg for DisplacementVector {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.ux, -self.uy, -self.uz)
    }
}

impl Mul<f64> for DisplacementVector {
    type Output = Self;
    #[inline]
    fn mul(self, s: f64) -> Self {
        Self::new(self.ux * s, self.uy * s, self.uz * s)
    }
}

// ============================================================
// 应力向量
// ============================================================

/// 水平面上的应力分量 [Pa]，拉为正
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TractionVector {
    /// σxz
    pub sxz: f64,
    /// σyz
    pub syz: f64,
    /// σzz
    pub szz: f64,
}

impl TractionVector {
    /// 零应力
    pub const ZERO: Self = Self {
        sxz: 0.0,
        syz: 0.0,
        szz: 0.0,
    };

    /// 创建
    #[inline]
    pub const fn new(sxz: f64, syz: f64, szz: f64) -> Self {
        Self { sxz, syz, szz }
    }

    /// 转为 glam 向量
    #[inline]
    pub fn to_vec3(self) -> DVec3 {
        DVec3::new(self.sxz, self.syz, self.szz)
    }

    /// 水平面上的剪应力大小
    #[inline]
    pub fn shear(&self) -> f64 {
        self.sxz.hypot(self.syz)
    }

    /// 所有分量有限
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.to_vec3().is_finite()
    }
}

impl From<DVec3> for TractionVector {
    #[inline]
    fn from(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<[f64; 3]> for TractionVector {
    #[inline]
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// 可存入 [`Field`] 的三分量值
pub trait FieldValue: Copy + Debug + Send + Sync + From<[f64; 3]> {
    /// 零值
    const ZERO: Self;

    /// 所有分量有限
    fn is_finite(&self) -> bool;
}

impl FieldValue for DisplacementVector {
    const ZERO: Self = DisplacementVector::ZERO;

    fn is_finite(&self) -> bool {
        DisplacementVector::is_finite(self)
    }
}

impl FieldValue for TractionVector {
    const ZERO: Self = TractionVector::ZERO;

    fn is_finite(&self) -> bool {
        TractionVector::is_finite(self)
    }
}

// ============================================================
// 失败记录
// ============================================================

/// 部分失败模式下记录的失败条目
///
/// `time` 是结果场中的列号 j（对应 `times[j]`）。
/// 提供者返回的 `MissingData` 原样保留，其中的 `time` 是提供者的时间步 `times[j]`。
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationFailure {
    /// 观测点索引
    pub point: usize,
    /// 结果场中的时间列
    pub time: usize,
    /// 出错单元（已知时）
    pub cell: Option<usize>,
    /// 错误
    pub error: RcError,
}

// ============================================================
// 结果场
// ============================================================

/// (观测点, 时间) → 值
#[derive(Debug, Clone)]
pub struct Field<T> {
    n_points: usize,
    n_times: usize,
    values: Vec<T>,
    valid: Vec<bool>,
    failures: Vec<EvaluationFailure>,
}

/// 位移场
pub type DisplacementField = Field<DisplacementVector>;

/// 应力场
pub type StressField = Field<TractionVector>;

impl<T: FieldValue> Field<T> {
    /// 全零、全部有效的结果场
    pub fn zeros(n_points: usize, n_times: usize) -> Self {
        let n = n_points * n_times;
        Self {
            n_points,
            n_times,
            values: vec![T::ZERO; n],
            valid: vec![true; n],
            failures: Vec::new(),
        }
    }

    /// 观测点数
    #[inline]
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// 时间步数
    #[inline]
    pub fn n_times(&self) -> usize {
        self.n_times
    }

    #[inline]
    fn index(&self, point: usize, time: usize) -> RcResult<usize> {
        RcError::check_index("point", point, self.n_points)?;
        RcError::check_index("time", time, self.n_times)?;
        Ok(point * self.n_times + time)
    }

    /// 读取值；失败条目返回 `None`
    pub fn get(&self, point: usize, time: usize) -> Option<T> {
        let idx = self.index(point, time).ok()?;
        self.valid[idx].then(|| self.values[idx])
    }

    /// 读取值，失败条目返回其错误
    pub fn try_get(&self, point: usize, time: usize) -> RcResult<T> {
        let idx = self.index(point, time)?;
        if self.valid[idx] {
            return Ok(self.values[idx]);
        }
        Err(self
            .failures
            .iter()
            .find(|f| f.point == point && f.time == time)
            .map(|f| f.error.clone())
            .unwrap_or_else(|| RcError::invalid_input(format!("条目 ({point}, {time}) 无效"))))
    }

    /// 条目是否有效
    pub fn is_valid(&self, point: usize, time: usize) -> bool {
        self.index(point, time).map(|i| self.valid[i]).unwrap_or(false)
    }

    /// 全部条目有效
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.valid.iter().all(|&v| v)
    }

    /// 失败条目
    pub fn failures(&self) -> &[EvaluationFailure] {
        &self.failures
    }

    /// 某观测点的时间序列（含失败条目，其值为 0）
    pub fn point_series(&self, point: usize) -> RcResult<&[T]> {
        RcError::check_index("point", point, self.n_points)?;
        let start = point * self.n_times;
        Ok(&self.values[start..start + self.n_times])
    }

    /// 某时间步所有观测点的值
    pub fn snapshot(&self, time: usize) -> RcResult<Vec<Option<T>>> {
        RcError::check_index("time", time, self.n_times)?;
        Ok((0..self.n_points).map(|p| self.get(p, time)).collect())
    }

    /// 行缓冲（引擎写入用）
    pub(crate) fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// 追加失败条目并把对应位置标为无效
    pub(crate) fn record_failures(&mut self, failures: Vec<EvaluationFailure>) {
        for f in &failures {
            if let Ok(idx) = self.index(f.point, f.time) {
                self.valid[idx] = false;
                self.values[idx] = T::ZERO;
            }
        }
        self.failures.extend(failures);
        self.failures.sort_by_key(|f| (f.point, f.time));
    }
}

impl Field<DisplacementVector> {
    /// 某时间步的最大沉降及其观测点
    pub fn max_subsidence(&self, time: usize) -> RcResult<Option<(usize, f64)>> {
        let snapshot = self.snapshot(time)?;
        Ok(snapshot
            .into_iter()
            .enumerate()
            .filter_map(|(i, u)| u.map(|u| (i, u.uz)))
            .fold(None, |best, (i, uz)| match best {
                Some((_, b)) if b >= uz => best,
                _ => Some((i, uz)),
            }))
    }
}

impl Field<TractionVector> {
    /// 某时间步的最大剪应力及其观测点
    pub fn max_shear(&self, time: usize) -> RcResult<Option<(usize, f64)>> {
        let snapshot = self.snapshot(time)?;
        Ok(snapshot
            .into_iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|s| (i, s.shear())))
            .fold(None, |best, (i, tau)| match best {
                Some((_, b)) if b >= tau => best,
                _ => Some((i, tau)),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_ops() {
        let a = DisplacementVector::new(1.0, 2.0, 3.0);
        let b = DisplacementVector::from([0.5, -1.0, 1.0]);
        assert_eq!(a + b, DisplacementVector::new(1.5, 1.0, 4.0));
        assert_eq!(a - b, DisplacementVector::new(0.5, 3.0, 2.0));
        assert_eq!(-a, DisplacementVector::new(-1.0, -2.0, -3.0));
        assert_eq!(a * 2.0, DisplacementVector::new(2.0, 4.0, 6.0));
        let mut c = a;
        c += b;
        assert_eq!(c, a + b);
        assert!((DisplacementVector::new(3.0, 4.0, 0.0).magnitude() - 5.0).abs() < 1e-15);
        assert!(a.is_subsidence());
        assert!((-a).is_uplift());
    }

    #[test]
    fn test_vector_serde() {
        let u = DisplacementVector::new(0.1, -0.2, 0.3);
        let json = serde_json::to_string(&u).unwrap();
        assert!(json.contains("\"uz\":0.3"));
        let back: DisplacementVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, u);
    }

    #[test]
    fn test_radial_view() {
        let u = DisplacementVector::new(-3.0, -4.0, 1.0);
        let r = u.radial_from(DVec3::new(3.0, 4.0, 0.0), DVec2::ZERO);
        assert!((r.ur + 5.0).abs() < 1e-12);
        assert_eq!(r.uz, 1.0);

        let on_axis = u.radial_from(DVec3::new(1.0, 1.0, 0.0), DVec2::new(1.0, 1.0));
        assert_eq!(on_axis.ur, 0.0);
    }

    #[test]
    fn test_field_access() {
        let mut field = DisplacementField::zeros(3, 2);
        assert!(field.is_complete());
        field.values_mut()[3] = DisplacementVector::new(0.0, 0.0, 0.25);
        assert_eq!(field.get(1, 1).unwrap().uz, 0.25);
        assert_eq!(field.point_series(1).unwrap().len(), 2);
        assert!(field.get(3, 0).is_none());
        assert!(field.try_get(0, 5).is_err());
        assert_eq!(field.max_subsidence(1).unwrap(), Some((1, 0.25)));
    }

    #[test]
    fn test_stress_field() {
        let mut field = StressField::zeros(2, 1);
        field.values_mut()[1] = TractionVector::new(3.0, -4.0, 1.0);
        assert_eq!(field.max_shear(0).unwrap(), Some((1, 5.0)));
        assert!(!TractionVector::new(f64::NAN, 0.0, 0.0).is_finite());
        assert_eq!(TractionVector::from([1.0, 2.0, 3.0]).to_vec3(), DVec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_record_failures() {
        let mut field = DisplacementField::zeros(2, 2);
        field.record_failures(vec![EvaluationFailure {
            point: 1,
            time: 0,
            cell: Some(4),
            error: RcError::domain("NaN"),
        }]);
        assert!(!field.is_complete());
        assert!(!field.is_valid(1, 0));
        assert!(field.get(1, 0).is_none());
        assert!(matches!(field.try_get(1, 0), Err(RcError::Domain { .. })));
        assert!(field.get(1, 1).is_some());
        assert_eq!(field.snapshot(0).unwrap(), vec![Some(DisplacementVector::ZERO), None]);
    }
}
