// crates/rc_physics/src/special/elliptic.rs

//! 椭圆积分
//!
//! 以 Carlson 对称形式 R_F、R_D 为基础，通过倍乘迭代求值 (Carlson 1995)。
//! 参数约定与 Abramowitz & Stegun 一致，使用参数 m = k²：
//!
//! ```text
//! K(m)   = R_F(0, 1−m, 1)
//! E(m)   = R_F(0, 1−m, 1) − (m/3) R_D(0, 1−m, 1)
//! F(φ|m) = sinφ R_F(cos²φ, 1 − m sin²φ, 1)
//! E(φ|m) = F(φ|m) − (m/3) sin³φ R_D(cos²φ, 1 − m sin²φ, 1)
//! ```

use rc_foundation::{RcError, RcResult};

/// 倍乘迭代收敛阈值（相对偏差）
const CONVERGENCE: f64 = 1.0e-4;

/// 最大迭代次数
const MAX_ITERATIONS: usize = 200;

/// Carlson 第一类对称积分 R_F(x, y, z)
///
/// 要求 x, y, z ≥ 0 且至多一个为 0。
pub fn carlson_rf(x: f64, y: f64, z: f64) -> RcResult<f64> {
    check_args("R_F", [x, y, z])?;

    let (mut x, mut y, mut z) = (x, y, z);
    for _ in 0..MAX_ITERATIONS {
        let (sx, sy, sz) = (x.sqrt(), y.sqrt(), z.sqrt());
        let lambda = sx * (sy + sz) + sy * sz;
        x = 0.25 * (x + lambda);
        y = 0.25 * (y + lambda);
        z = 0.25 * (z + lambda);

        let a = (x + y + z) / 3.0;
        let (dx, dy, dz) = ((a - x) / a, (a - y) / a, (a - z) / a);
        if dx.abs().max(dy.abs()).max(dz.abs()) < CONVERGENCE {
            let e2 = dx * dy - dz * dz;
            let e3 = dx * dy * dz;
            return Ok((1.0 + (e2 / 24.0 - 0.1 - 3.0 / 44.0 * e3) * e2 + e3 / 14.0) / a.sqrt());
        }
    }
    Err(RcError::domain("R_F 迭代未收敛"))
}

/// Carlson 第二类对称积分 R_D(x, y, z)
///
/// 要求 x, y ≥ 0 且至多一个为 0，z > 0。
pub fn carlson_rd(x: f64, y: f64, z: f64) -> RcResult<f64> {
    check_args("R_D", [x, y, z])?;
    if z <= 0.0 {
        return Err(RcError::domain(format!("R_D 要求 z > 0: z={}", z)));
    }

    const C1: f64 = 3.0 / 14.0;
    const C2: f64 = 1.0 / 6.0;
    const C3: f64 = 9.0 / 22.0;
    const C4: f64 = 3.0 / 26.0;
    const C5: f64 = 0.25 * C3;
    const C6: f64 = 1.5 * C4;

    let (mut x, mut y, mut z) = (x, y, z);
    let mut sum = 0.0;
    let mut fac = 1.0;
    for _ in 0..MAX_ITERATIONS {
        let (sx, sy, sz) = (x.sqrt(), y.sqrt(), z.sqrt());
        let lambda = sx * (sy + sz) + sy * sz;
        sum += fac / (sz * (z + lambda));
        fac *= 0.25;
        x = 0.25 * (x + lambda);
        y = 0.25 * (y + lambda);
        z = 0.25 * (z + lambda);

        let a = 0.2 * (x + y + 3.0 * z);
        let (dx, dy, dz) = ((a - x) / a, (a - y) / a, (a - z) / a);
        if dx.abs().max(dy.abs()).max(dz.abs()) < CONVERGENCE {
            let ea = dx * dy;
            let eb = dz * dz;
            let ec = ea - eb;
            let ed = ea - 6.0 * eb;
            let ee = ed + ec + ec;
            let series = 1.0
                + ed * (-C1 + C5 * ed - C6 * dz * ee)
                + dz * (C2 * ee + dz * (-C3 * ec + dz * C4 * ea));
            return Ok(3.0 * sum + fac * series / (a * a.sqrt()));
        }
    }
    Err(RcError::domain("R_D 迭代未收敛"))
}

/// 第一类完全椭圆积分 K(m)，m < 1
pub fn ellipk(m: f64) -> RcResult<f64> {
    if !(m < 1.0) {
        return Err(RcError::domain(format!("K(m) 要求 m < 1: m={}", m)));
    }
    carlson_rf(0.0, 1.0 - m, 1.0)
}

/// 第二类完全椭圆积分 E(m)，m ≤ 1
pub fn ellipe(m: f64) -> RcResult<f64> {
    if m == 1.0 {
        return Ok(1.0);
    }
    if !(m < 1.0) {
        return Err(RcError::domain(format!("E(m) 要求 m ≤ 1: m={}", m)));
    }
    let y = 1.0 - m;
    Ok(carlson_rf(0.0, y, 1.0)? - m / 3.0 * carlson_rd(0.0, y, 1.0)?)
}

/// 第一类不完全椭圆积分 F(φ|m)
pub fn ellipkinc(phi: f64, m: f64) -> RcResult<f64> {
    let (s, c) = phi.sin_cos();
    if s == 0.0 {
        return Ok(0.0);
    }
    let y = 1.0 - m * s * s;
    Ok(s * carlson_rf(c * c, y, 1.0)?)
}

/// 第二类不完全椭圆积分 E(φ|m)
pub fn ellipeinc(phi: f64, m: f64) -> RcResult<f64> {
    let (s, c) = phi.sin_cos();
    if s == 0.0 {
        return Ok(0.0);
    }
    let (x, y) = (c * c, 1.0 - m * s * s);
    Ok(s * carlson_rf(x, y, 1.0)? - m / 3.0 * s.powi(3) * carlson_rd(x, y, 1.0)?)
}

fn check_args(name: &str, args: [f64; 3]) -> RcResult<()> {
    if args.iter().any(|v| !(v.is_finite() && *v >= 0.0)) {
        return Err(RcError::domain(format!("{} 参数必须为非负有限值: {:?}", name, args)));
    }
    if args.iter().filter(|v| **v == 0.0).count() > 1 {
        return Err(RcError::domain(format!("{} 至多允许一个参数为 0: {:?}", name, args)));
    }
    Ok(())
}
