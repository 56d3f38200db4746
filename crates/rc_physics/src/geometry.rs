// crates/rc_physics/src/geometry.rs

//! 几何：观测点、矩形单元与角点偏移
//!
//! 坐标系固定为：地表 z = 0，z 轴向下为正（深度）。
//!
//! 单元是轴对齐的矩形棱柱，由中心和三个半宽描述。核函数需要的是
//! 单元各边界相对观测点的有符号偏移：
//!
//! ```text
//! ξ_i = x_i − x_p,  η_j = y_j − y_p,  ζ_k = z_k − z_p,   i, j, k ∈ {0, 1}
//! ```
//!
//! 索引 0 为上界、1 为下界，角点符号为 (−1)^(i+j+k)。

use glam::DVec3;
use rc_config::PhysicalConstants;
use serde::{Deserialize, Serialize};

use rc_foundation::float::ensure_finite3;
use rc_foundation::{RcResult, ValidationError, ValidationReport, ValidationWarning};

/// 三维点（x, y, z），z 向下为正
pub type Point3 = DVec3;

/// 单个压实单元
///
/// 创建后不可变；随时间变化的只有关联的压力变化。
/// 压实系数缺省时取弹性半空间的单轴压实系数 Cm(E, ν)，由核函数解析。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// 中心坐标 [m]
    pub center: Point3,
    /// 半宽 (dx, dy, dz) [m]，必须全部为正
    pub half_extents: DVec3,
    /// 压实系数 Cm [1/Pa]；`None` 表示由 E、ν 推出
    #[serde(default)]
    pub compaction_coefficient: Option<f64>,
}

impl Cell {
    /// 由中心、半宽和压实系数创建（不做验证，由网格统一验证）
    ///
    /// `compaction_coefficient` 可传 `f64` 或 `None`。
    pub fn new(
        center: Point3,
        half_extents: DVec3,
        compaction_coefficient: impl Into<Option<f64>>,
    ) -> Self {
        Self {
            center,
            half_extents,
            compaction_coefficient: compaction_coefficient.into(),
        }
    }

    /// 由边界创建：x ∈ [x1, x2]，y ∈ [y1, y2]，深度 ∈ [top, bottom]
    pub fn from_bounds(
        x: (f64, f64),
        y: (f64, f64),
        depth: (f64, f64),
        compaction_coefficient: impl Into<Option<f64>>,
    ) -> Self {
        let lower = DVec3::new(x.0, y.0, depth.0);
        let upper = DVec3::new(x.1, y.1, depth.1);
        Self::new(0.5 * (lower + upper), 0.5 * (upper - lower), compaction_coefficient)
    }

    /// 实际使用的压实系数：显式值优先，否则取单轴压实系数
    #[inline]
    pub fn resolved_compaction(&self, physics: &PhysicalConstants) -> f64 {
        self.compaction_coefficient
            .unwrap_or_else(|| physics.uniaxial_compaction())
    }

    /// 下界 (x1, y1, top)
    #[inline]
    pub fn lower(&self) -> DVec3 {
        self.center - self.half_extents
    }

    /// 上界 (x2, y2, bottom)
    #[inline]
    pub fn upper(&self) -> DVec3 {
        self.center + self.half_extents
    }

    /// 顶面深度
    #[inline]
    pub fn top(&self) -> f64 {
        self.center.z - self.half_extents.z
    }

    /// 底面深度
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.center.z + self.half_extents.z
    }

    /// 体积 [m³]
    #[inline]
    pub fn volume(&self) -> f64 {
        8.0 * self.half_extents.x * self.half_extents.y * self.half_extents.z
    }

    /// 半对角线长度
    #[inline]
    pub fn half_diagonal(&self) -> f64 {
        self.half_extents.length()
    }

    /// 关于深度 `plane` 的镜像单元
    pub fn mirrored(&self, plane: f64) -> Self {
        Self {
            center: DVec3::new(self.center.x, self.center.y, 2.0 * plane - self.center.z),
            ..*self
        }
    }

    /// 检查单元并把问题写入报告
    pub fn validate_into(&self, cell_id: usize, report: &mut ValidationReport) {
        let fields = [
            ("center.x", self.center.x),
            ("center.y", self.center.y),
            ("center.z", self.center.z),
            ("half_extent.x", self.half_extents.x),
            ("half_extent.y", self.half_extents.y),
            ("half_extent.z", self.half_extents.z),
        ];
        let explicit = self
            .compaction_coefficient
            .map(|cm| ("compaction_coefficient", cm));
        for (field, value) in fields.into_iter().chain(explicit) {
            if !value.is_finite() {
                report.add_error(ValidationError::NonFinite {
                    field,
                    cell_id,
                    value,
                });
            }
        }

        let extents = [
            ("half_extent.x", self.half_extents.x),
            ("half_extent.y", self.half_extents.y),
            ("half_extent.z", self.half_extents.z),
        ];
        for (field, value) in extents {
            if value.is_finite() && value <= 0.0 {
                report.add_error(ValidationError::NonPositive {
                    field,
                    cell_id,
                    value,
                });
            }
        }

        let Some(cm) = self.compaction_coefficient else {
            return;
        };
        if cm.is_finite() && cm < 0.0 {
            report.add_error(ValidationError::OutOfRange {
                field: "compaction_coefficient",
                cell_id,
                value: cm,
                min: 0.0,
                max: f64::MAX,
            });
        } else if cm == 0.0 {
            report.add_warning(ValidationWarning::ZeroValue {
                field: "compaction_coefficient",
                cell_id,
            });
        }
    }
}

/// 单元边界相对观测点的有符号偏移
///
/// 每个轴两个值：`[上界 − p, 下界 − p]`。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerOffsets {
    /// ξ = x − x_p
    pub x: [f64; 2],
    /// η = y − y_p
    pub y: [f64; 2],
    /// ζ = z − z_p
    pub z: [f64; 2],
}

impl CornerOffsets {
    /// 遍历 8 个角点，给出 (符号, ξ, η, ζ)
    pub fn corners(&self) -> impl Iterator<Item = (f64, f64, f64, f64)> + '_ {
        (0..8usize).map(move |n| {
            let (i, j, k) = (n >> 2, (n >> 1) & 1, n & 1);
            let sign = if (i + j + k) % 2 == 0 { 1.0 } else { -1.0 };
            (sign, self.x[i], self.y[j], self.z[k])
        })
    }
}

/// 单元相对观测点的角点偏移
///
/// 非有限输入返回数值域错误。
pub fn corner_offsets(cell: &Cell, point: Point3) -> RcResult<CornerOffsets> {
    ensure_finite3("观测点", point.to_array())?;
    ensure_finite3("单元中心", cell.center.to_array())?;
    ensure_finite3("单元半宽", cell.half_extents.to_array())?;

    let upper = cell.upper() - point;
    let lower = cell.lower() - point;
    Ok(CornerOffsets {
        x: [upper.x, lower.x],
        y: [upper.y, lower.y],
        z: [upper.z, lower.z],
    })
}

/// 镜像单元（关于深度 `plane` 反射）相对观测点的角点偏移
pub fn mirrored_corner_offsets(cell: &Cell, point: Point3, plane: f64) -> RcResult<CornerOffsets> {
    corner_offsets(&cell.mirrored(plane), point)
}
