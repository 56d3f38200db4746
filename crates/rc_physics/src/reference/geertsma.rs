// crates/rc_physics/src/reference/geertsma.rs

//! Geertsma 圆盘储层解析解
//!
//! 半径 R、厚度 H、中心深度 c 的圆盘储层在均匀半空间中产生的位移
//! (Geertsma 1973; Fjær et al. 2008, 附录 D.5)。只在储层外部有效。
//!
//! 记 A = Cm·R·H·ΔP/2，f = 3 − 4ν，z 为观测深度，r 为到圆盘轴线的水平距离：
//!
//! ```text
//! ur = A [ I1(|z−c|) + f I1(z+c) − 2z I2(z+c) ]
//! uz = A [ sgn(z−c) I3(|z−c|) − f I3(z+c) − 2z I4(z+c) ]
//! ```
//!
//! 应力（G 为剪切模量，B = G·Cm·R·H·ΔP，L 为 ur 括号内的量）：
//!
//! ```text
//! σrr = −B [ I4(|z−c|) + 3 I4(z+c) − 2z I6(z+c) − L/r ]
//! σθθ = −B [ 4ν I4(z+c) + L/r ]
//! σzz =  B [ −I4(|z−c|) + I4(z+c) + 2z I6(z+c) ]
//! ```
//!
//! I1..I4、I6 为 Lipschitz-Hankel 型贝塞尔积分，用椭圆积分和 Heuman Lambda 函数表示。
//! ur 以背离轴线为正，uz 以向下为正，应力以拉为正，与棱柱引擎一致，可直接用于交叉验证。

use std::f64::consts::PI;

use glam::{DVec2, DVec3};
use rc_config::PhysicalConstants;
use rc_foundation::{RcError, RcResult};

use crate::field::{DisplacementVector, RadialDisplacement};
use crate::geometry::{Cell, Point3};
use crate::special::{ellipe, ellipeinc, ellipk, ellipkinc};

/// r/R 小于该值时使用轴线极限
const AXIS_TOLERANCE: f64 = 1.0e-9;

// ============================================================
// 圆盘储层
// ============================================================

/// 圆盘储层
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeertsmaDisk {
    /// 中心 (x, y, 深度)
    pub center: Point3,
    /// 半径 [m]
    pub radius: f64,
    /// 厚度 [m]
    pub thickness: f64,
    /// 压实系数 [1/Pa]
    pub compaction_coefficient: f64,
}

/// 圆盘储层的轴对称应力 [Pa]，拉为正
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeertsmaStress {
    /// σrr
    pub radial: f64,
    /// σθθ
    pub tangential: f64,
    /// σzz
    pub vertical: f64,
}

impl GeertsmaDisk {
    /// 创建并验证
    pub fn new(center: Point3, radius: f64, thickness: f64, compaction_coefficient: f64) -> RcResult<Self> {
        if !center.is_finite() {
            return Err(RcError::invalid_geometry(format!("圆盘中心非有限: {:?}", center)));
        }
        for (name, v) in [("radius", radius), ("thickness", thickness)] {
            if !(v.is_finite() && v > 0.0) {
                return Err(RcError::invalid_geometry(format!("圆盘 {} 必须为正: {}", name, v)));
            }
        }
        if !(compaction_coefficient.is_finite() && compaction_coefficient >= 0.0) {
            return Err(RcError::invalid_geometry(format!(
                "压实系数必须为非负有限值: {}",
                compaction_coefficient
            )));
        }
        Ok(Self {
            center,
            radius,
            thickness,
            compaction_coefficient,
        })
    }

    /// 与棱柱单元等面积、等厚度、等压实系数的圆盘
    pub fn equivalent_to(cell: &Cell, physics: &PhysicalConstants) -> RcResult<Self> {
        let area = 4.0 * cell.half_extents.x * cell.half_extents.y;
        Self::new(
            cell.center,
            (area / PI).sqrt(),
            2.0 * cell.half_extents.z,
            cell.resolved_compaction(physics),
        )
    }

    /// 观测点是否位于储层内部（含边界）
    pub fn contains(&self, point: Point3) -> bool {
        let r = (point.truncate() - self.center.truncate()).length();
        (point.z - self.center.z).abs() <= 0.5 * self.thickness && r <= self.radius
    }

    /// 压力变化 `dp` 下的径向/竖向位移
    pub fn radial_displacement(
        &self,
        point: Point3,
        dp: f64,
        physics: &PhysicalConstants,
    ) -> RcResult<RadialDisplacement> {
        let (z, c, r) = self.local_coordinates(point, dp, physics)?;
        let big_r = self.radius;
        let f = physics.image_factor();
        let q_real = (z - c).abs();
        let q_image = z + c;
        let sign = if z > c {
            1.0
        } else if z < c {
            -1.0
        } else {
            0.0
        };

        let amplitude = 0.5 * self.compaction_coefficient * big_r * self.thickness * dp;
        let ur = amplitude
            * (bessel_i1(q_real, r, big_r)? + f * bessel_i1(q_image, r, big_r)?
                - 2.0 * z * bessel_i2(q_image, r, big_r)?);
        let real_i3 = if sign == 0.0 {
            0.0
        } else {
            bessel_i3(q_real, r, big_r)?
        };
        let uz = amplitude
            * (sign * real_i3 - f * bessel_i3(q_image, r, big_r)?
                - 2.0 * z * bessel_i4(q_image, r, big_r)?);

        if !(ur.is_finite() && uz.is_finite()) {
            return Err(RcError::domain(format!("圆盘位移非有限: point={:?}", point)));
        }
        Ok(RadialDisplacement { ur, uz })
    }

    /// 压力变化 `dp` 下的轴对称应力
    pub fn stress(
        &self,
        point: Point3,
        dp: f64,
        physics: &PhysicalConstants,
    ) -> RcResult<GeertsmaStress> {
        let (z, c, r) = self.local_coordinates(point, dp, physics)?;
        let big_r = self.radius;
        let nu = physics.poisson_ratio;
        let q_real = (z - c).abs();
        let q_image = z + c;

        // L/r，轴线上取极限
        let lateral = if on_axis(r, big_r) {
            let half = |q: f64| 0.5 * big_r / (q * q + big_r * big_r).powf(1.5);
            half(q_real) + physics.image_factor() * half(q_image)
                - 3.0 * z * q_image * big_r / (q_image * q_image + big_r * big_r).powf(2.5)
        } else {
            (bessel_i1(q_real, r, big_r)? + physics.image_factor() * bessel_i1(q_image, r, big_r)?
                - 2.0 * z * bessel_i2(q_image, r, big_r)?)
                / r
        };
        let i4_real = bessel_i4(q_real, r, big_r)?;
        let i4_image = bessel_i4(q_image, r, big_r)?;
        let i6_image = bessel_i6(q_image, r, big_r)?;

        let b = physics.shear_modulus() * self.compaction_coefficient * big_r * self.thickness * dp;
        let stress = GeertsmaStress {
            radial: -b * (i4_real + 3.0 * i4_image - 2.0 * z * i6_image - lateral),
            tangential: -b * (4.0 * nu * i4_image + lateral),
            vertical: b * (-i4_real + i4_image + 2.0 * z * i6_image),
        };
        if !(stress.radial.is_finite() && stress.tangential.is_finite() && stress.vertical.is_finite())
        {
            return Err(RcError::domain(format!("圆盘应力非有限: point={:?}", point)));
        }
        Ok(stress)
    }

    /// 检查输入并给出 (观测深度, 圆盘中心深度, 水平距离)，深度相对镜像平面
    fn local_coordinates(
        &self,
        point: Point3,
        dp: f64,
        physics: &PhysicalConstants,
    ) -> RcResult<(f64, f64, f64)> {
        if !point.is_finite() || !dp.is_finite() {
            return Err(RcError::domain(format!("非有限输入: point={:?}, ΔP={}", point, dp)));
        }
        if self.contains(point) {
            return Err(RcError::domain(format!("观测点 {:?} 位于圆盘储层内部", point)));
        }

        let plane = physics.basement_depth;
        let z = point.z - plane;
        let c = self.center.z - plane;
        if c - 0.5 * self.thickness < 0.0 {
            return Err(RcError::invalid_geometry("圆盘储层高于镜像平面"));
        }
        let r = (point.truncate() - self.center.truncate()).length();
        Ok((z, c, r))
    }

    /// 压力变化 `dp` 下的全局坐标位移
    pub fn displacement(
        &self,
        point: Point3,
        dp: f64,
        physics: &PhysicalConstants,
    ) -> RcResult<DisplacementVector> {
        let radial = self.radial_displacement(point, dp, physics)?;
        let offset: DVec2 = point.truncate() - self.center.truncate();
        let r = offset.length();
        let horizontal = if r > 0.0 {
            offset * (radial.ur / r)
        } else {
            DVec2::ZERO
        };
        Ok(DisplacementVector::from(DVec3::new(
            horizontal.x,
            horizontal.y,
            radial.uz,
        )))
    }
}

// ============================================================
// 贝塞尔积分
// ============================================================

#[inline]
fn modulus(q: f64, r: f64, big_r: f64) -> f64 {
    4.0 * big_r * r / (q * q + (r + big_r).powi(2))
}

#[inline]
fn on_axis(r: f64, big_r: f64) -> bool {
    r <= AXIS_TOLERANCE * big_r
}

/// I1 = ∫ J1(kR) J1(kr) e^(−kq) dk
pub fn bessel_i1(q: f64, r: f64, big_r: f64) -> RcResult<f64> {
    if on_axis(r, big_r) {
        return Ok(0.0);
    }
    let m = modulus(q, r, big_r);
    let (k, e) = (ellipk(m)?, ellipe(m)?);
    Ok(2.0 * ((1.0 - 0.5 * m) * k - e) / (PI * (m * r * big_r).sqrt()))
}

/// I2 = ∫ k J1(kR) J1(kr) e^(−kq) dk
pub fn bessel_i2(q: f64, r: f64, big_r: f64) -> RcResult<f64> {
    if on_axis(r, big_r) {
        return Ok(0.0);
    }
    let m = modulus(q, r, big_r);
    let (k, e) = (ellipk(m)?, ellipe(m)?);
    Ok(q * m.sqrt() * ((1.0 - 0.5 * m) * e / (1.0 - m) - k)
        / (2.0 * PI * (r * big_r).sqrt().powi(3)))
}

/// I3 = ∫ J1(kR) J0(kr) e^(−kq) dk
pub fn bessel_i3(q: f64, r: f64, big_r: f64) -> RcResult<f64> {
    if on_axis(r, big_r) {
        return Ok((1.0 - q / (q * q + big_r * big_r).sqrt()) / big_r);
    }
    let m = modulus(q, r, big_r);
    let k0 = ellipk(m)?;
    let lambda = heuman_lambda(q, r, big_r, m, k0)?;
    let step = heaviside(r - big_r) - heaviside(big_r - r);
    Ok(-q * m.sqrt() * k0 / (2.0 * PI * big_r * (r * big_r).sqrt())
        + step * lambda / (2.0 * big_r)
        + heaviside(big_r - r) / big_r)
}

/// I4 = ∫ k J1(kR) J0(kr) e^(−kq) dk
pub fn bessel_i4(q: f64, r: f64, big_r: f64) -> RcResult<f64> {
    if on_axis(r, big_r) {
        return Ok(big_r / (q * q + big_r * big_r).powf(1.5));
    }
    let m = modulus(q, r, big_r);
    let (k, e) = (ellipk(m)?, ellipe(m)?);
    let root = (r * big_r).sqrt();
    Ok(m.sqrt().powi(3) * (big_r * big_r - r * r - q * q) * e
        / (8.0 * PI * root.powi(3) * big_r * (1.0 - m))
        + m.sqrt() * k / (2.0 * PI * big_r * root))
}

/// I6 = ∫ k² J1(kR) J0(kr) e^(−kq) dk
pub fn bessel_i6(q: f64, r: f64, big_r: f64) -> RcResult<f64> {
    if on_axis(r, big_r) {
        return Ok(3.0 * q * big_r / (q * q + big_r * big_r).powf(2.5));
    }
    let m = modulus(q, r, big_r);
    let (k, e) = (ellipk(m)?, ellipe(m)?);
    let root = (r * big_r).sqrt();
    let inner = 3.0 * e
        + m * (big_r * big_r - r * r - q * q) * ((1.0 - 0.5 * m) * e / (1.0 - m) - 0.25 * k)
            / (r * big_r);
    Ok(q * m.sqrt().powi(3) * inner / (8.0 * PI * root.powi(3) * big_r * (1.0 - m)))
}

/// Heuman Lambda 函数 Λ0(β|1−m)
fn heuman_lambda(q: f64, r: f64, big_r: f64, m: f64, k0: f64) -> RcResult<f64> {
    let mc = 1.0 - m;
    let beta = (q / (q * q + (big_r - r).powi(2)).sqrt()).asin();
    let k1 = ellipk(mc)?;
    let e1 = ellipe(mc)?;
    let k2 = ellipkinc(beta, mc)?;
    let e2 = ellipeinc(beta, mc)?;
    // Jacobi Zeta
    let zeta = e2 - e1 * k2 / k1;
    Ok(k2 / k1 + 2.0 * k0 * zeta / PI)
}

/// 单位阶跃函数，H(0) = 1/2
#[inline]
fn heaviside(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        0.0
    } else {
        0.5
    }
}
