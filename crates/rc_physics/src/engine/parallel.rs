// crates/rc_physics/src/engine/parallel.rs

//! 求值性能指标

use std::time::Duration;

// ============================================================
// 性能指标
// ============================================================

/// 性能指标
#[derive(Debug, Clone, Default)]
pub struct EvaluationMetrics {
    /// 总求值次数
    pub total_calls: usize,
    /// 并行求值次数
    pub parallel_calls: usize,
    /// 串行求值次数
    pub sequential_calls: usize,
    /// 总计算时间
    pub total_duration: Duration,
    /// 计算的 (观测点, 单元) 对总数
    pub total_pairs: usize,
    /// 使用点源近似的对数
    pub far_field_pairs: usize,
    /// 失败条目总数
    pub failed_entries: usize,
}

impl EvaluationMetrics {
    /// 记录一次求值
    pub fn record(&mut self, n_pairs: usize, is_parallel: bool, duration: Duration) {
        self.total_calls += 1;
        self.total_pairs += n_pairs;
        self.total_duration += duration;
        if is_parallel {
            self.parallel_calls += 1;
        } else {
            self.sequential_calls += 1;
        }
    }

    /// 重置指标
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 平均每对计算时间
    pub fn avg_time_per_pair(&self) -> Duration {
        if self.total_pairs > 0 {
            Duration::from_secs_f64(self.total_duration.as_secs_f64() / self.total_pairs as f64)
        } else {
            Duration::ZERO
        }
    }
}
