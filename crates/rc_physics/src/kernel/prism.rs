// crates/rc_physics/src/kernel/prism.rs

//! 棱柱位势导数核函数
//!
//! 矩形棱柱引力位的一阶、二阶导数闭式解 (Nagy et al. 2000, 2002 勘误)。
//! 对每个角点求函数值，再按 (−1)^(i+j+k) 交替求和：
//!
//! ```text
//! Fx  = η ln(ζ+r) + ζ ln(η+r) − ξ atan(ηζ / ξr)
//! Fy  = ξ ln(ζ+r) + ζ ln(ξ+r) − η atan(ξζ / ηr)
//! Fz  = ξ ln(η+r) + η ln(ξ+r) − ζ atan(ξη / ζr)
//! Fxz = ln(η+r)
//! Fyz = ln(ξ+r)
//! Fzz = −atan(ξη / ζr)
//! ```
//!
//! 一阶导数之和等于 ∫ (p − s)/|p − s|³ dV，二阶导数之和等于引力位
//! Φ = ∫ 1/|p − s| dV 对观测点的混合导数 (Φxz, Φyz, Φzz)。
//!
//! 镜像系统的应力还需要二阶导数沿 z 的导数 ([`prism_kernel_dz`])：
//!
//! ```text
//! Fxzz = ηζ / (r (ξ² + ζ²))
//! Fyzz = ξζ / (r (η² + ζ²))
//! Fzzz = −(ξη / r) (1/(ξ² + ζ²) + 1/(η² + ζ²))
//! ```
//!
//! # 数值处理
//!
//! - `ln(a + r)` 在 a < 0 时改写为 `ln(b² + c²) − ln(r − a)`，避免相消
//! - 对数自变量非正时取极限值 0；系数为 0 时整项为 0，不产生 `0·∞`
//! - 反正切使用四象限 `atan2` 再按 ±π 折回 (−π/2, π/2]，分母为零时取 ±π/2 或 0。
//!   这样角点和在棱柱面的延伸平面上连续，只在棱柱自身的面上间断

use std::f64::consts::FRAC_PI_2;
use std::f64::consts::PI;

use glam::DVec3;
use rc_foundation::{RcError, RcResult};

use crate::geometry::CornerOffsets;

/// 棱柱核函数值：三个一阶导数和三个混合二阶导数
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrismKernel {
    /// Fx
    pub x: f64,
    /// Fy
    pub y: f64,
    /// Fz
    pub z: f64,
    /// Fxz
    pub xz: f64,
    /// Fyz
    pub yz: f64,
    /// Fzz
    pub zz: f64,
}

impl PrismKernel {
    /// 一阶导数 (Fx, Fy, Fz)
    #[inline]
    pub fn first(&self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    /// 混合二阶导数 (Fxz, Fyz, Fzz)
    #[inline]
    pub fn second(&self) -> DVec3 {
        DVec3::new(self.xz, self.yz, self.zz)
    }

    fn is_finite(&self) -> bool {
        self.first().is_finite() && self.second().is_finite()
    }
}

/// 计算角点交替和
///
/// 输入非有限时返回数值域错误；退化位置（角点、棱边、面上）
/// 给出有限的解析极限。
pub fn prism_kernel(offsets: &CornerOffsets) -> RcResult<PrismKernel> {
    let all = offsets.x.iter().chain(&offsets.y).chain(&offsets.z);
    if !all.clone().all(|v| v.is_finite()) {
        return Err(RcError::domain(format!("角点偏移非有限: {:?}", offsets)));
    }

    let mut k = PrismKernel::default();
    for (sign, xi, eta, zeta) in offsets.corners() {
        let t = corner_terms(xi, eta, zeta);
        k.x += sign * t[0];
        k.y += sign * t[1];
        k.z += sign * t[2];
        k.xz += sign * t[3];
        k.yz += sign * t[4];
        k.zz += sign * t[5];
    }

    if !k.is_finite() {
        return Err(RcError::domain(format!(
            "核函数结果非有限: {:?} (offsets={:?})",
            k, offsets
        )));
    }
    Ok(k)
}

/// 混合二阶导数沿 z 的导数 (Fxzz, Fyzz, Fzzz)
///
/// 在棱柱的棱边上发散，棱边处取 0；调用方只在镜像棱柱外部使用。
pub fn prism_kernel_dz(offsets: &CornerOffsets) -> RcResult<DVec3> {
    let mut sum = DVec3::ZERO;
    for (sign, xi, eta, zeta) in offsets.corners() {
        sum += sign * corner_dz_terms(xi, eta, zeta);
    }
    if !sum.is_finite() {
        return Err(RcError::domain(format!("三阶导数非有限: offsets={:?}", offsets)));
    }
    Ok(sum)
}

#[inline]
fn corner_dz_terms(x: f64, y: f64, z: f64) -> DVec3 {
    let (x2, y2, z2) = (x * x, y * y, z * z);
    let r = (x2 + y2 + z2).sqrt();
    if r == 0.0 {
        return DVec3::ZERO;
    }
    let inv_xz = if x2 + z2 > 0.0 { 1.0 / (x2 + z2) } else { 0.0 };
    let inv_yz = if y2 + z2 > 0.0 { 1.0 / (y2 + z2) } else { 0.0 };
    DVec3::new(
        y * z * inv_xz / r,
        x * z * inv_yz / r,
        -(x * y / r) * (inv_xz + inv_yz),
    )
}

/// 单个角点的六个函数值
#[inline]
fn corner_terms(x: f64, y: f64, z: f64) -> [f64; 6] {
    let (x2, y2, z2) = (x * x, y * y, z * z);
    let r = (x2 + y2 + z2).sqrt();

    let fx = scaled_ln(y, z, r, x2 + y2) + scaled_ln(z, y, r, x2 + z2)
        - scaled_atan(x, y * z, x * r);
    let fy = scaled_ln(x, z, r, x2 + y2) + scaled_ln(z, x, r, y2 + z2)
        - scaled_atan(y, x * z, y * r);
    let fz = scaled_ln(x, y, r, x2 + z2) + scaled_ln(y, x, r, y2 + z2)
        - scaled_atan(z, x * y, z * r);

    [
        fx,
        fy,
        fz,
        ln_term(y, r, x2 + z2),
        ln_term(x, r, y2 + z2),
        -modified_atan(x * y, z * r),
    ]
}

/// 稳定的 ln(a + r)
///
/// `perp2` 为另外两个分量的平方和，即 r² − a²。
#[inline]
pub(crate) fn ln_term(a: f64, r: f64, perp2: f64) -> f64 {
    if a >= 0.0 {
        let s = a + r;
        if s > 0.0 {
            s.ln()
        } else {
            0.0
        }
    } else {
        // ln(a + r) = ln((r² − a²) / (r − a))
        let num = if perp2 > 0.0 { perp2.ln() } else { 0.0 };
        num - (r - a).ln()
    }
}

/// 折回 (−π/2, π/2] 的反正切，等价于主值 atan(y/x)
#[inline]
pub(crate) fn modified_atan(y: f64, x: f64) -> f64 {
    if x == 0.0 {
        return if y > 0.0 {
            FRAC_PI_2
        } else if y < 0.0 {
            -FRAC_PI_2
        } else {
            0.0
        };
    }
    let t = y.atan2(x);
    if t > FRAC_PI_2 {
        t - PI
    } else if t <= -FRAC_PI_2 {
        t + PI
    } else {
        t
    }
}

#[inline]
fn scaled_ln(coeff: f64, a: f64, r: f64, perp2: f64) -> f64 {
    if coeff == 0.0 {
        0.0
    } else {
        coeff * ln_term(a, r, perp2)
    }
}

#[inline]
fn scaled_atan(coeff: f64, y: f64, x: f64) -> f64 {
    if coeff == 0.0 {
        0.0
    } else {
        coeff * modified_atan(y, x)
    }
}
