// crates/rc_physics/src/engine/superposition.rs

//! 叠加引擎
//!
//! 对 观测点 × 单元 × 时间 求和，得到 [`DisplacementField`] 或 [`StressField`]。
//!
//! # 执行流程
//!
//! 1. 检查单元全部位于镜像平面以下，否则整体失败 (`InvalidGeometry`)
//! 2. 一次性取出全部 (单元, 时间) 的 ΔP；缺失数据按失败模式处理
//! 3. 按观测点划分输出行，每行独立计算（并行时每个工作线程独占自己的行）
//! 4. 每个 (观测点, 单元) 的影响系数只算一次，远场判定也只做一次
//! 5. 每个 (观测点, 时间) 的单元贡献用 Kahan 补偿求和，结果与单元顺序基本无关
//!
//! # 增量模式
//!
//! 逐时间步累加 ΔP 增量，而不是对每个时间步重新求和。
//! 结果与逐步全量计算在舍入误差内一致。
//!
//! # 失败处理
//!
//! - `Strict`: 第一个失败立即中止并返回该错误
//! - `Partial`: 失败条目标记为无效并记录到 [`Field::failures`]，其余结果保留
//!
//! 取消标志在每个观测点行开始前检查，置位后返回 `Cancelled`。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use glam::DVec3;
use log::{debug, trace, warn};
use rayon::prelude::*;
use rc_config::{EngineConfig, FailureMode, PhysicalConstants};
use rc_foundation::float::ensure_finite3;
use rc_foundation::{EvalLocation, KahanSum3, RcError, RcResult};

use super::parallel::EvaluationMetrics;
use crate::field::{
    DisplacementField, DisplacementVector, EvaluationFailure, Field, FieldValue, StressField,
    TractionVector,
};
use crate::geometry::{Cell, Point3};
use crate::grid::Grid;
use crate::kernel::{CompactionKernel, Quantity};
use crate::pressure::PressureProvider;

/// 部分失败模式下日志中逐条列出的失败数上限
const MAX_LOGGED_FAILURES: usize = 8;

// ============================================================
// 叠加引擎
// ============================================================

/// 叠加引擎
pub struct SuperpositionEngine {
    config: EngineConfig,
    kernel: CompactionKernel,
    cancel: Option<Arc<AtomicBool>>,
    metrics: EvaluationMetrics,
}

impl SuperpositionEngine {
    /// 由配置创建（配置先验证）
    pub fn new(config: EngineConfig) -> RcResult<Self> {
        config.validate()?;
        let kernel = CompactionKernel::new(&config.physics);
        Ok(Self {
            config,
            kernel,
            cancel: None,
            metrics: EvaluationMetrics::default(),
        })
    }

    /// 设置取消标志
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// 配置
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 压实核函数
    pub fn kernel(&self) -> &CompactionKernel {
        &self.kernel
    }

    /// 性能指标
    pub fn metrics(&self) -> &EvaluationMetrics {
        &self.metrics
    }

    /// 静态求值（单个时间步 0）
    pub fn evaluate_static<P>(
        &mut self,
        grid: &Grid,
        points: &[Point3],
        provider: &P,
    ) -> RcResult<DisplacementField>
    where
        P: PressureProvider + ?Sized,
    {
        self.evaluate(grid, points, provider, &[0])
    }

    /// 位移求值
    ///
    /// `times` 为向提供者查询的时间步；结果的第 j 个时间索引对应 `times[j]`。
    /// 错误定位信息和 [`EvaluationFailure::time`] 中的时间索引为结果中的索引 j，
    /// 提供者返回的 `MissingData` 保留提供者自己的时间步。
    pub fn evaluate<P>(
        &mut self,
        grid: &Grid,
        points: &[Point3],
        provider: &P,
        times: &[usize],
    ) -> RcResult<DisplacementField>
    where
        P: PressureProvider + ?Sized,
    {
        self.run::<DisplacementVector, P>(Quantity::Displacement, grid, points, provider, times)
    }

    /// 应力求值，时间步与失败处理同 [`evaluate`](Self::evaluate)
    pub fn evaluate_stress<P>(
        &mut self,
        grid: &Grid,
        points: &[Point3],
        provider: &P,
        times: &[usize],
    ) -> RcResult<StressField>
    where
        P: PressureProvider + ?Sized,
    {
        self.run::<TractionVector, P>(Quantity::Stress, grid, points, provider, times)
    }

    fn run<T, P>(
        &mut self,
        quantity: Quantity,
        grid: &Grid,
        points: &[Point3],
        provider: &P,
        times: &[usize],
    ) -> RcResult<Field<T>>
    where
        T: FieldValue,
        P: PressureProvider + ?Sized,
    {
        if times.is_empty() {
            return Err(RcError::invalid_input("至少需要一个时间步"));
        }
        for (i, cell) in grid.iter().enumerate() {
            self.kernel.check_cell(i, cell)?;
        }

        let start = Instant::now();
        let n_times = times.len();
        let use_parallel = self
            .config
            .strategy
            .use_parallel(points.len(), self.config.min_parallel_points);

        debug!(
            "叠加求值({}): {} 观测点 × {} 单元 × {} 时间步, 策略={}, 并行={}, 增量={}",
            quantity.name(),
            points.len(),
            grid.len(),
            n_times,
            self.config.strategy.name(),
            use_parallel,
            self.config.incremental
        );

        let (pressure, time_status) = self.gather_pressure(grid.len(), provider, times)?;

        let ctx = RowContext {
            kernel: &self.kernel,
            quantity,
            cells: grid.cells(),
            pressure: &pressure,
            time_status: &time_status,
            failure_mode: self.config.failure_mode,
            incremental: self.config.incremental,
            far_field_ratio: self.config.far_field_ratio,
            cancel: self.cancel.as_deref(),
        };

        let mut field = Field::<T>::zeros(points.len(), n_times);
        let outcomes: Vec<RowOutcome> = if use_parallel {
            field
                .values_mut()
                .par_chunks_mut(n_times)
                .enumerate()
                .map(|(pi, row)| ctx.row(pi, points[pi], row))
                .collect::<RcResult<Vec<_>>>()?
        } else {
            field
                .values_mut()
                .chunks_mut(n_times)
                .enumerate()
                .map(|(pi, row)| ctx.row(pi, points[pi], row))
                .collect::<RcResult<Vec<_>>>()?
        };

        let far_field: usize = outcomes.iter().map(|o| o.far_field).sum();
        let failures: Vec<EvaluationFailure> =
            outcomes.into_iter().flat_map(|o| o.failures).collect();

        if !failures.is_empty() {
            warn!("部分求值: {} 个条目失败", failures.len());
            for f in failures.iter().take(MAX_LOGGED_FAILURES) {
                warn!("  point={}, time={}: {}", f.point, f.time, f.error);
            }
        }

        let duration = start.elapsed();
        self.metrics
            .record(points.len() * grid.len(), use_parallel, duration);
        self.metrics.far_field_pairs += far_field;
        self.metrics.failed_entries += failures.len();
        debug!(
            "叠加求值完成: 耗时 {:?}, 点源近似 {}, 失败 {}",
            duration,
            far_field,
            failures.len()
        );

        field.record_failures(failures);
        Ok(field)
    }

    /// 一次性取出 ΔP 矩阵 `[time][cell]`
    ///
    /// 部分失败模式下，某时间步任一单元取值失败则整个时间步标记失败。
    fn gather_pressure<P>(
        &self,
        n_cells: usize,
        provider: &P,
        times: &[usize],
    ) -> RcResult<(Vec<Vec<f64>>, Vec<Option<RcError>>)>
    where
        P: PressureProvider + ?Sized,
    {
        let mut pressure = vec![vec![0.0; n_cells]; times.len()];
        let mut status: Vec<Option<RcError>> = vec![None; times.len()];

        for (j, &t) in times.iter().enumerate() {
            for ci in 0..n_cells {
                let dp = provider.pressure_change(ci, t).and_then(|v| {
                    if v.is_finite() {
                        Ok(v)
                    } else {
                        Err(RcError::domain(format!("ΔP 非有限: {}", v)).at(EvalLocation {
                            point: None,
                            cell: Some(ci),
                            time: Some(j),
                        }))
                    }
                });
                match dp {
                    Ok(v) => pressure[j][ci] = v,
                    Err(e) if self.config.failure_mode == FailureMode::Strict => return Err(e),
                    Err(e) => {
                        warn!("时间步 {} (t={}) 压力数据不可用: {}", j, t, e);
                        status[j] = Some(e);
                        break;
                    }
                }
            }
            trace!("时间步 {} (t={}) 压力就绪", j, t);
        }

        Ok((pressure, status))
    }
}

/// 以默认配置和给定物理常数求位移
pub fn evaluate<P>(
    grid: &Grid,
    points: &[Point3],
    provider: &P,
    times: &[usize],
    constants: &PhysicalConstants,
) -> RcResult<DisplacementField>
where
    P: PressureProvider + ?Sized,
{
    let config = EngineConfig::builder().physics(*constants).build()?;
    SuperpositionEngine::new(config)?.evaluate(grid, points, provider, times)
}

/// 以默认配置和给定物理常数求应力
pub fn evaluate_stress<P>(
    grid: &Grid,
    points: &[Point3],
    provider: &P,
    times: &[usize],
    constants: &PhysicalConstants,
) -> RcResult<StressField>
where
    P: PressureProvider + ?Sized,
{
    let config = EngineConfig::builder().physics(*constants).build()?;
    SuperpositionEngine::new(config)?.evaluate_stress(grid, points, provider, times)
}

// ============================================================
// 行计算
// ============================================================

#[derive(Debug, Default)]
struct RowOutcome {
    failures: Vec<EvaluationFailure>,
    far_field: usize,
}

/// 单个观测点行的只读上下文
struct RowContext<'a> {
    kernel: &'a CompactionKernel,
    quantity: Quantity,
    cells: &'a [Cell],
    pressure: &'a [Vec<f64>],
    time_status: &'a [Option<RcError>],
    failure_mode: FailureMode,
    incremental: bool,
    far_field_ratio: Option<f64>,
    cancel: Option<&'a AtomicBool>,
}

impl RowContext<'_> {
    fn row<T: FieldValue>(&self, pi: usize, point: Point3, out: &mut [T]) -> RcResult<RowOutcome> {
        if self.cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            return Err(RcError::Cancelled);
        }

        let mut outcome = RowOutcome::default();
        if let Err(e) = ensure_finite3("观测点", point.to_array()) {
            let e = e.at(EvalLocation {
                point: Some(pi),
                cell: None,
                time: None,
            });
            for j in 0..out.len() {
                self.fail(&mut outcome, pi, j, None, e.clone())?;
            }
            return Ok(outcome);
        }

        let influences = match self.influences(point, &mut outcome) {
            Ok(g) => g,
            Err((ci, e)) => {
                let e = e.at(EvalLocation {
                    point: Some(pi),
                    cell: Some(ci),
                    time: None,
                });
                for j in 0..out.len() {
                    match &self.time_status[j] {
                        Some(missing) => {
                            self.fail(&mut outcome, pi, j, failure_cell(missing), missing.clone())?
                        }
                        None => self.fail(&mut outcome, pi, j, Some(ci), e.clone())?,
                    }
                }
                return Ok(outcome);
            }
        };

        if self.incremental {
            self.row_incremental(pi, &influences, out, &mut outcome)?;
        } else {
            self.row_full(pi, &influences, out, &mut outcome)?;
        }
        Ok(outcome)
    }

    /// 每个单元的影响系数，超出远场阈值的单元使用点源近似
    ///
    /// 出错时返回出错单元的索引。
    fn influences(
        &self,
        point: Point3,
        outcome: &mut RowOutcome,
    ) -> Result<Vec<DVec3>, (usize, RcError)> {
        let mut influences = Vec::with_capacity(self.cells.len());
        for (ci, cell) in self.cells.iter().enumerate() {
            let far = self
                .far_field_ratio
                .is_some_and(|ratio| point.distance(cell.center) > ratio * cell.half_diagonal());
            let g = if far {
                outcome.far_field += 1;
                self.kernel
                    .point_source_influence_of(self.quantity, cell, point)
            } else {
                self.kernel.influence_of(self.quantity, cell, point)
            };
            influences.push(g.map_err(|e| (ci, e))?);
        }
        Ok(influences)
    }

    /// 逐时间步全量求和
    fn row_full<T: FieldValue>(
        &self,
        pi: usize,
        influences: &[DVec3],
        out: &mut [T],
        outcome: &mut RowOutcome,
    ) -> RcResult<()> {
        for (j, slot) in out.iter_mut().enumerate() {
            if let Some(e) = &self.time_status[j] {
                self.fail(outcome, pi, j, failure_cell(e), e.clone())?;
                continue;
            }

            let mut sum = KahanSum3::new();
            for (g, &dp) in influences.iter().zip(&self.pressure[j]) {
                sum.add((*g * dp).to_array());
            }
            self.store(outcome, pi, j, slot, sum.value())?;
        }
        Ok(())
    }

    /// 逐步累加相对上一个有效时间步的 ΔP 增量
    fn row_incremental<T: FieldValue>(
        &self,
        pi: usize,
        influences: &[DVec3],
        out: &mut [T],
        outcome: &mut RowOutcome,
    ) -> RcResult<()> {
        let mut acc = KahanSum3::new();
        let mut prev: Option<&[f64]> = None;
        for (j, slot) in out.iter_mut().enumerate() {
            if let Some(e) = &self.time_status[j] {
                self.fail(outcome, pi, j, failure_cell(e), e.clone())?;
                continue;
            }

            let current = self.pressure[j].as_slice();
            for (ci, g) in influences.iter().enumerate() {
                let delta = match prev {
                    Some(p) => current[ci] - p[ci],
                    None => current[ci],
                };
                if delta != 0.0 {
                    acc.add((*g * delta).to_array());
                }
            }
            prev = Some(current);
            self.store(outcome, pi, j, slot, acc.value())?;
        }
        Ok(())
    }

    fn store<T: FieldValue>(
        &self,
        outcome: &mut RowOutcome,
        pi: usize,
        j: usize,
        slot: &mut T,
        value: [f64; 3],
    ) -> RcResult<()> {
        let v = T::from(value);
        if v.is_finite() {
            *slot = v;
            Ok(())
        } else {
            let e = RcError::domain(format!("{}求和非有限: {:?}", self.quantity.name(), value))
                .at(EvalLocation {
                    point: Some(pi),
                    cell: None,
                    time: Some(j),
                });
            self.fail(outcome, pi, j, None, e)
        }
    }

    fn fail(
        &self,
        outcome: &mut RowOutcome,
        point: usize,
        time: usize,
        cell: Option<usize>,
        error: RcError,
    ) -> RcResult<()> {
        match self.failure_mode {
            FailureMode::Strict => Err(error),
            FailureMode::Partial => {
                outcome.failures.push(EvaluationFailure {
                    point,
                    time,
                    cell,
                    error,
                });
                Ok(())
            }
        }
    }
}

/// 错误中携带的单元索引
fn failure_cell(error: &RcError) -> Option<usize> {
    match error {
        RcError::MissingData { cell, .. } => Some(*cell),
        other => other.location().and_then(|l| l.cell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pressure::{FnPressure, StaticPressure, UniformPressure};
    use rc_config::ParallelStrategy;

    fn grid() -> Grid {
        Grid::rectangular_layer((-100.0, 100.0), (-50.0, 50.0), (4, 2), (1000.0, 1020.0), 1e-5)
            .unwrap()
    }

    fn engine(mode: FailureMode) -> SuperpositionEngine {
        SuperpositionEngine::new(
            EngineConfig::builder()
                .strategy(ParallelStrategy::Sequential)
                .failure_mode(mode)
                .build()
                .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_static_evaluation() {
        let points = [DVec3::ZERO, DVec3::new(300.0, 0.0, 0.0)];
        let field = engine(FailureMode::Strict)
            .evaluate_static(&grid(), &points, &UniformPressure::new(-1.0e6))
            .unwrap();
        assert!(field.is_complete());
        assert_eq!(field.n_times(), 1);
        let center = field.get(0, 0).unwrap();
        let side = field.get(1, 0).unwrap();
        assert!(center.uz > side.uz);
        assert!(side.ux < 0.0);
    }

    #[test]
    fn test_empty_times_rejected() {
        let result =
            engine(FailureMode::Strict).evaluate(&grid(), &[DVec3::ZERO], &UniformPressure::new(1.0), &[]);
        assert!(matches!(result, Err(RcError::InvalidInput { .. })));
    }

    #[test]
    fn test_cell_above_plane_rejected() {
        let grid = Grid::rectangular_layer((0.0, 1.0), (0.0, 1.0), (1, 1), (-5.0, 5.0), 1e-5).unwrap();
        let result =
            engine(FailureMode::Partial).evaluate_static(&grid, &[DVec3::ZERO], &UniformPressure::new(1.0));
        assert!(matches!(result, Err(RcError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_non_finite_pressure_is_domain_error() {
        let provider = FnPressure::new(|cell, _| Ok(if cell == 3 { f64::NAN } else { -1.0 }));
        let err = engine(FailureMode::Strict)
            .evaluate_static(&grid(), &[DVec3::ZERO], &provider)
            .unwrap_err();
        assert_eq!(err.location().and_then(|l| l.cell), Some(3));
    }

    #[test]
    fn test_non_finite_point_partial() {
        let points = [DVec3::ZERO, DVec3::new(f64::NAN, 0.0, 0.0)];
        let field = engine(FailureMode::Partial)
            .evaluate(&grid(), &points, &StaticPressure::new(vec![-1.0e6; 8]), &[0, 1])
            .unwrap();
        assert_eq!(field.failures().len(), 2);
        assert!(field.get(0, 1).is_some());
        assert!(field.get(1, 0).is_none());
        assert_eq!(field.failures()[0].error.location().unwrap().point, Some(1));
    }

    #[test]
    fn test_metrics_updated() {
        let mut engine = engine(FailureMode::Strict);
        engine
            .evaluate_static(&grid(), &[DVec3::ZERO; 3], &UniformPressure::new(-1.0))
            .unwrap();
        assert_eq!(engine.metrics().total_calls, 1);
        assert_eq!(engine.metrics().total_pairs, 24);
        assert_eq!(engine.metrics().sequential_calls, 1);
    }

    #[test]
    fn test_far_field_counted_once_per_pair() {
        for incremental in [false, true] {
            let config = EngineConfig::builder()
                .strategy(ParallelStrategy::Sequential)
                .incremental(incremental)
                .far_field_ratio(Some(2.0))
                .build()
                .unwrap();
            let mut engine = SuperpositionEngine::new(config).unwrap();
            let history = UniformPressure::series(vec![-1.0, -2.0, -3.0, -4.0]);
            let points = [DVec3::new(50_000.0, 0.0, 0.0), DVec3::new(0.0, 60_000.0, 0.0)];
            engine
                .evaluate(&grid(), &points, &history, &[0, 1, 2, 3])
                .unwrap();
            assert_eq!(engine.metrics().total_pairs, 16);
            assert_eq!(engine.metrics().far_field_pairs, 16);
        }
    }

    #[test]
    fn test_stress_evaluation() {
        let mut engine = engine(FailureMode::Strict);
        let points = [DVec3::ZERO, DVec3::new(0.0, 0.0, 500.0)];
        let field = engine
            .evaluate_stress(&grid(), &points, &UniformPressure::new(-1.0e6), &[0])
            .unwrap();
        assert!(field.is_complete());
        assert!(field.get(0, 0).unwrap().to_vec3().abs().max_element() < 1e-4);

        let s = field.get(1, 0).unwrap();
        let mut expected = DVec3::ZERO;
        for cell in grid().iter() {
            expected += engine.kernel().stress(cell, points[1], -1.0e6).unwrap().to_vec3();
        }
        assert!((s.to_vec3() - expected).length() < 1e-9 * expected.length());
        assert_eq!(engine.metrics().total_calls, 1);
    }

    #[test]
    fn test_free_function() {
        let field = evaluate(
            &grid(),
            &[DVec3::ZERO],
            &UniformPressure::new(-1.0e6),
            &[0],
            &PhysicalConstants::default(),
        )
        .unwrap();
        assert!(field.get(0, 0).unwrap().is_subsidence());

        let stress = evaluate_stress(
            &grid(),
            &[DVec3::new(30.0, 0.0, 800.0)],
            &UniformPressure::new(-1.0e6),
            &[0],
            &PhysicalConstants::default(),
        )
        .unwrap();
        assert!(stress.get(0, 0).unwrap().szz.abs() > 0.0);
    }

    #[test]
    fn test_failure_cell() {
        assert_eq!(failure_cell(&RcError::missing_data(4, 0)), Some(4));
        assert_eq!(failure_cell(&RcError::domain("x").at(EvalLocation::new(0, 2, 0))), Some(2));
        assert_eq!(failure_cell(&RcError::Cancelled), None);
    }
}
