// crates/rc_physics/tests/prism_kernel.rs

//! 棱柱核函数测试
//! 验证对称性、面延伸平面上的连续性、面上的跳变以及与数值积分的一致性

use std::f64::consts::PI;

use glam::DVec3;
use rc_physics::{corner_offsets, prism_kernel, Cell, PrismKernel};

fn kernel_at(cell: &Cell, p: DVec3) -> PrismKernel {
    prism_kernel(&corner_offsets(cell, p).unwrap()).unwrap()
}

fn cube() -> Cell {
    Cell::from_bounds((-10.0, 10.0), (-10.0, 10.0), (-10.0, 10.0), 1.0)
}

/// 中点法数值积分 ∫ (p − s)/|p − s|³ dV
fn midpoint_integral(cell: &Cell, p: DVec3, n: usize) -> DVec3 {
    let lo = cell.lower();
    let step = (cell.upper() - lo) / n as f64;
    let dv = step.x * step.y * step.z;
    let mut sum = DVec3::ZERO;
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let s = lo + step * DVec3::new(i as f64 + 0.5, j as f64 + 0.5, k as f64 + 0.5);
                let d = p - s;
                sum += d / d.length().powi(3) * dv;
            }
        }
    }
    sum
}

/// 上下对称点的竖向分量等值反号
#[test]
fn test_mirror_symmetry() {
    let cell = cube();
    let above = kernel_at(&cell, DVec3::new(0.0, 0.0, -100.0));
    let below = kernel_at(&cell, DVec3::new(0.0, 0.0, 100.0));
    assert!((above.z + below.z).abs() < 1e-12);
    assert!((below.z - 0.799_907_219_450_7).abs() < 1e-9);
    assert!((above.zz - below.zz).abs() < 1e-12);
}

/// 水平方向对称
#[test]
fn test_horizontal_symmetry() {
    let cell = Cell::from_bounds((-20.0, 20.0), (-5.0, 5.0), (100.0, 130.0), 1.0);
    let left = kernel_at(&cell, DVec3::new(-60.0, 15.0, 0.0));
    let right = kernel_at(&cell, DVec3::new(60.0, 15.0, 0.0));
    assert!((left.x + right.x).abs() < 1e-12);
    assert!((left.y - right.y).abs() < 1e-12);
    assert!((left.z - right.z).abs() < 1e-12);
}

/// 棱柱外部跨越面的延伸平面时连续
#[test]
fn test_continuity_across_extended_planes() {
    let cell = cube();
    let d = 1e-9;
    let samples = [
        (DVec3::new(50.0, 80.0, 10.0 - d), DVec3::new(50.0, 80.0, 10.0 + d)),
        (DVec3::new(10.0 - d, 40.0, -30.0), DVec3::new(10.0 + d, 40.0, -30.0)),
        (DVec3::new(-25.0, -10.0 - d, 3.0), DVec3::new(-25.0, -10.0 + d, 3.0)),
    ];
    for (a, b) in samples {
        let ka = kernel_at(&cell, a);
        let kb = kernel_at(&cell, b);
        assert!((ka.first() - kb.first()).length() < 1e-8, "first jump at {:?}", a);
        assert!((ka.second() - kb.second()).length() < 1e-8, "second jump at {:?}", a);
    }
}

/// 跨越棱柱自身的顶面时 Fzz 跳变 4π，一阶导数连续
#[test]
fn test_jump_across_own_face() {
    let cell = cube();
    let d = 1e-9;
    for (x, y) in [(0.0, 0.0), (3.0, -4.0)] {
        let inside = kernel_at(&cell, DVec3::new(x, y, 10.0 - d));
        let outside = kernel_at(&cell, DVec3::new(x, y, 10.0 + d));
        assert!((outside.zz - inside.zz - 4.0 * PI).abs() < 1e-6);
        assert!((outside.first() - inside.first()).length() < 1e-6);
    }
}

/// 角点、棱边、面上的值有限
#[test]
fn test_degenerate_positions_finite() {
    let cell = cube();
    let positions = [
        DVec3::new(10.0, 10.0, 10.0),
        DVec3::new(-10.0, -10.0, -10.0),
        DVec3::new(10.0, 10.0, 0.0),
        DVec3::new(10.0, 0.0, 0.0),
        DVec3::new(10.0, 10.0, 50.0),
        DVec3::new(0.0, 0.0, 0.0),
    ];
    for p in positions {
        let k = kernel_at(&cell, p);
        assert!(k.first().is_finite() && k.second().is_finite(), "non-finite at {:?}", p);
    }
}

/// 外部点与数值积分一致
#[test]
fn test_matches_numeric_integration_outside() {
    let cell = Cell::from_bounds((-50.0, 50.0), (-30.0, 70.0), (1000.0, 1040.0), 1.0);
    let p = DVec3::new(200.0, -100.0, 0.0);
    let k = kernel_at(&cell, p).first();
    let n = midpoint_integral(&cell, p, 40);
    assert!((k - n).length() / k.length() < 1e-5);
}

/// 内部点与数值积分一致（被积函数奇异，容差放宽）
#[test]
fn test_matches_numeric_integration_inside() {
    let cell = Cell::from_bounds((-50.0, 50.0), (-30.0, 70.0), (1000.0, 1040.0), 1.0);
    let p = DVec3::new(10.0, 5.0, 1010.0);
    let k = kernel_at(&cell, p).first();
    let n = midpoint_integral(&cell, p, 40);
    assert!((k - n).length() / k.length() < 1e-3);
}
