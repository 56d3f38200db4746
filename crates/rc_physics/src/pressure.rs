// crates/rc_physics/src/pressure.rs

//! 压力变化提供者
//!
//! 叠加引擎通过 [`PressureProvider`] 查询每个 (单元, 时间) 的 ΔP [Pa]，
//! 正值表示增压（膨胀），负值表示衰竭。数据不可用时返回 `MissingData`。
//!
//! 实现：
//! - [`UniformPressure`]: 所有单元同一 ΔP（可随时间变化）
//! - [`StaticPressure`]: 每个单元一个 ΔP，与时间无关
//! - [`PressureHistory`]: 稠密表 `[time][cell]`，NaN 表示缺失
//! - [`FnPressure`]: 闭包适配器

use rc_foundation::{RcError, RcResult};

/// 压力变化提供者
///
/// 查询是同步的；引擎在并行求值前一次性取出全部 ΔP。
pub trait PressureProvider: Send + Sync {
    /// 单元 `cell` 在时间步 `time` 的压力变化
    fn pressure_change(&self, cell: usize, time: usize) -> RcResult<f64>;
}

impl<T: PressureProvider + ?Sized> PressureProvider for Box<T> {
    fn pressure_change(&self, cell: usize, time: usize) -> RcResult<f64> {
        (**self).pressure_change(cell, time)
    }
}

// ============================================================
// 均匀压力
// ============================================================

/// 所有单元同一 ΔP
#[derive(Debug, Clone, PartialEq)]
pub struct UniformPressure {
    series: Vec<f64>,
}

impl UniformPressure {
    /// 与时间无关的常数 ΔP
    pub fn new(dp: f64) -> Self {
        Self { series: vec![dp] }
    }

    /// 随时间变化，`series[t]` 为时间步 t 的 ΔP
    pub fn series(series: Vec<f64>) -> Self {
        Self { series }
    }
}

impl PressureProvider for UniformPressure {
    fn pressure_change(&self, cell: usize, time: usize) -> RcResult<f64> {
        let value = match self.series.as_slice() {
            [single] => Some(*single),
            many => many.get(time).copied(),
        };
        value.ok_or_else(|| RcError::missing_data(cell, time))
    }
}

// ============================================================
// 静态压力
// ============================================================

/// 每个单元一个 ΔP，所有时间步相同
#[derive(Debug, Clone, PartialEq)]
pub struct StaticPressure {
    values: Vec<f64>,
}

impl StaticPressure {
    /// 创建
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// 单元数
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PressureProvider for StaticPressure {
    fn pressure_change(&self, cell: usize, time: usize) -> RcResult<f64> {
        self.values
            .get(cell)
            .copied()
            .ok_or_else(|| RcError::missing_data(cell, time))
    }
}

// ============================================================
// 压力历史
// ============================================================

/// 压力变化历史表
///
/// 按时间步存储，每行包含全部单元的 ΔP（相对初始状态的累计值）。
/// NaN 表示该条目缺失。
#[derive(Debug, Clone, PartialEq)]
pub struct PressureHistory {
    n_cells: usize,
    rows: Vec<Vec<f64>>,
}

impl PressureHistory {
    /// 空历史
    pub fn new(n_cells: usize) -> Self {
        Self {
            n_cells,
            rows: Vec::new(),
        }
    }

    /// 由行数据创建，每行长度必须等于单元数
    pub fn from_rows(n_cells: usize, rows: Vec<Vec<f64>>) -> RcResult<Self> {
        for row in &rows {
            RcError::check_size("pressure_row", n_cells, row.len())?;
        }
        Ok(Self { n_cells, rows })
    }

    /// 追加一个时间步
    pub fn push(&mut self, row: Vec<f64>) -> RcResult<()> {
        RcError::check_size("pressure_row", self.n_cells, row.len())?;
        self.rows.push(row);
        Ok(())
    }

    /// 单元数
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// 时间步数
    pub fn n_times(&self) -> usize {
        self.rows.len()
    }
}

impl PressureProvider for PressureHistory {
    fn pressure_change(&self, cell: usize, time: usize) -> RcResult<f64> {
        self.rows
            .get(time)
            .and_then(|row| row.get(cell))
            .copied()
            .filter(|v| !v.is_nan())
            .ok_or_else(|| RcError::missing_data(cell, time))
    }
}

// ============================================================
// 闭包适配器
// ============================================================

/// 用闭包提供 ΔP
pub struct FnPressure<F>
where
    F: Fn(usize, usize) -> RcResult<f64> + Send + Sync,
{
    func: F,
}

impl<F> FnPressure<F>
where
    F: Fn(usize, usize) -> RcResult<f64> + Send + Sync,
{
    /// 包装闭包 `(cell, time) -> ΔP`
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> PressureProvider for FnPressure<F>
where
    F: Fn(usize, usize) -> RcResult<f64> + Send + Sync,
{
    fn pressure_change(&self, cell: usize, time: usize) -> RcResult<f64> {
        (self.func)(cell, time)
    }
}

impl<F> std::fmt::Debug for FnPressure<F>
where
    F: Fn(usize, usize) -> RcResult<f64> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnPressure").finish_non_exhaustive()
    }
}
