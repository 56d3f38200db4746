// crates/rc_physics/tests/scenarios.rs

//! 物理场景测试
//! 单个衰竭单元的沉降盆、相邻单元的对称性、远场点源极限、Geertsma 圆盘交叉验证（位移与应力）

use glam::{DVec2, DVec3};
use rc_config::{EngineConfig, ParallelStrategy, PhysicalConstants};
use rc_physics::{
    evaluate, evaluate_stress, Cell, CompactionKernel, GeertsmaDisk, Grid, PressureHistory,
    StaticPressure, SuperpositionEngine, UniformPressure,
};

fn physics() -> PhysicalConstants {
    PhysicalConstants::new(1.0e9, 0.25)
}

/// 半宽 (50, 50, 10)、中心深度 2000 m 的衰竭单元
fn deep_cell(x: (f64, f64)) -> Cell {
    Cell::from_bounds(x, (-50.0, 50.0), (1990.0, 2010.0), 1.0e-5)
}

/// 单元正上方沉降，随水平偏移单调减小
#[test]
fn test_single_cell_subsidence_bowl() {
    let grid = Grid::new(vec![deep_cell((-50.0, 50.0))]).unwrap();
    let offsets: Vec<f64> = (0..=50).map(|i| 10.0 * i as f64).collect();
    let points: Vec<DVec3> = offsets.iter().map(|&x| DVec3::new(x, 0.0, 0.0)).collect();

    let field = evaluate(&grid, &points, &UniformPressure::new(-5.0e6), &[0], &physics()).unwrap();

    let uz: Vec<f64> = (0..points.len()).map(|p| field.get(p, 0).unwrap().uz).collect();
    assert!((uz[0] - 0.59647).abs() < 1e-4);
    assert!((uz[5] - 0.59592).abs() < 1e-4);
    assert!((uz[10] - 0.59425).abs() < 1e-4);
    assert!((uz[50] - 0.54469).abs() < 1e-4);
    for w in uz.windows(2) {
        assert!(w[1] < w[0], "subsidence must decrease with offset");
    }

    // 地表向储层方向收缩
    for p in 1..points.len() {
        assert!(field.get(p, 0).unwrap().ux < 0.0);
    }
    let ux500 = field.get(50, 0).unwrap().ux;
    assert!((ux500 + 0.1361).abs() < 1e-3);
}

/// 沉降盆在水平面上径向对称
#[test]
fn test_radial_view_symmetry() {
    let grid = Grid::new(vec![deep_cell((-50.0, 50.0))]).unwrap();
    let points = [DVec3::new(300.0, 0.0, 0.0), DVec3::new(0.0, -300.0, 0.0)];
    let field = evaluate(&grid, &points, &UniformPressure::new(-5.0e6), &[0], &physics()).unwrap();

    let a = field.get(0, 0).unwrap().radial_from(points[0], DVec2::ZERO);
    let b = field.get(1, 0).unwrap().radial_from(points[1], DVec2::ZERO);
    assert!((a.ur - b.ur).abs() < 1e-12);
    assert!((a.uz - b.uz).abs() < 1e-12);
    assert!(a.ur < 0.0);
}

/// 相邻单元：等值反号 ΔP 时竖向抵消、水平相加；同号时水平抵消、竖向相加
#[test]
fn test_two_adjacent_cells() {
    let grid = Grid::new(vec![deep_cell((-100.0, 0.0)), deep_cell((0.0, 100.0))]).unwrap();
    let points = [DVec3::ZERO];

    let opposite = StaticPressure::new(vec![-5.0e6, 5.0e6]);
    let u = evaluate(&grid, &points, &opposite, &[0], &physics())
        .unwrap()
        .get(0, 0)
        .unwrap();
    assert!(u.uz.abs() < 1e-9);
    assert!((u.ux + 0.029_778).abs() < 1e-5);
    assert!(u.uy.abs() < 1e-12);

    let equal = StaticPressure::new(vec![-5.0e6, -5.0e6]);
    let single = evaluate(
        &Grid::new(vec![deep_cell((-100.0, 0.0))]).unwrap(),
        &points,
        &UniformPressure::new(-5.0e6),
        &[0],
        &physics(),
    )
    .unwrap()
    .get(0, 0)
    .unwrap();
    let u = evaluate(&grid, &points, &equal, &[0], &physics())
        .unwrap()
        .get(0, 0)
        .unwrap();
    assert!(u.ux.abs() < 1e-12);
    assert!((u.uz - 2.0 * single.uz).abs() < 1e-12);
    assert!(u.uz > 0.0);
}

/// 远场趋近点源（压实核）解，并按 1/r² 衰减
#[test]
fn test_far_field_point_source_limit() {
    let kernel = CompactionKernel::new(&physics());
    let cell = deep_cell((-50.0, 50.0));
    for p in [
        DVec3::new(10_000.0, 0.0, 0.0),
        DVec3::new(6_000.0, 8_000.0, 0.0),
        DVec3::new(3_000.0, 4_000.0, 2_500.0),
    ] {
        let prism = kernel.influence(&cell, p).unwrap();
        let point = kernel.point_source_influence(&cell, p).unwrap();
        assert!((prism - point).length() / point.length() < 1e-4);
    }

    let near = kernel.influence(&cell, DVec3::new(10_000.0, 0.0, 0.0)).unwrap();
    let far = kernel.influence(&cell, DVec3::new(20_000.0, 0.0, 0.0)).unwrap();
    assert!(far.length() < 0.3 * near.length());
}

/// 等面积方形棱柱与 Geertsma 圆盘解一致
#[test]
fn test_geertsma_disk_cross_check() {
    let physics = physics();
    let cell = Cell::from_bounds((-5.0, 5.0), (-5.0, 5.0), (200.0, 210.0), 1.0e-5);
    let disk = GeertsmaDisk::equivalent_to(&cell, &physics).unwrap();
    let kernel = CompactionKernel::new(&physics);

    for p in [
        DVec3::new(3.0, 4.0, 0.0),
        DVec3::new(30.0, 40.0, 0.0),
        DVec3::new(30.0, 40.0, 100.0),
        DVec3::new(30.0, 40.0, 300.0),
    ] {
        let prism = kernel.displacement(&cell, p, -10.0).unwrap();
        let reference = disk.displacement(p, -10.0, &physics).unwrap();
        let prism_r = prism.radial_from(p, DVec2::ZERO);
        let disk_r = disk.radial_displacement(p, -10.0, &physics).unwrap();

        assert!((prism.uz - reference.uz).abs() / reference.uz.abs() < 1e-2, "uz at {:?}", p);
        assert!((prism_r.ur - disk_r.ur).abs() / disk_r.ur.abs() < 1e-2, "ur at {:?}", p);
        assert!((reference.horizontal().length() - disk_r.ur.abs()).abs() < 1e-15);
    }
}

/// 等面积方形棱柱的竖向应力与 Geertsma 圆盘解一致，地表无牵引力
#[test]
fn test_geertsma_stress_cross_check() {
    let physics = physics();
    let cell = Cell::from_bounds((-5.0, 5.0), (-5.0, 5.0), (200.0, 210.0), 1.0e-5);
    let disk = GeertsmaDisk::equivalent_to(&cell, &physics).unwrap();
    let grid = Grid::new(vec![cell]).unwrap();

    let points = [
        DVec3::new(30.0, 40.0, 100.0),
        DVec3::new(30.0, 40.0, 300.0),
        DVec3::new(3.0, 4.0, 100.0),
        DVec3::new(30.0, 40.0, 0.0),
    ];
    let field = evaluate_stress(&grid, &points, &UniformPressure::new(-10.0), &[0], &physics).unwrap();

    for (i, &p) in points.iter().enumerate().take(3) {
        let prism = field.get(i, 0).unwrap();
        let reference = disk.stress(p, -10.0, &physics).unwrap();
        assert!(
            (prism.szz - reference.vertical).abs() / reference.vertical.abs() < 1e-2,
            "szz at {:?}: {} vs {}",
            p,
            prism.szz,
            reference.vertical
        );
    }
    assert!((field.get(0, 0).unwrap().szz - 4.66396).abs() < 1e-4);

    let surface = field.get(3, 0).unwrap();
    assert!(surface.to_vec3().abs().max_element() < 1e-9);
    assert_eq!(disk.stress(points[3], -10.0, &physics).unwrap().vertical, 0.0);
}

/// 衰竭逐步加深时沉降随时间单调增加
#[test]
fn test_history_subsidence_grows() {
    let grid =
        Grid::rectangular_layer((-1000.0, 1000.0), (-1000.0, 1000.0), (8, 8), (2000.0, 2050.0), 5e-10)
            .unwrap();
    let mut history = PressureHistory::new(grid.len());
    for t in 0..6 {
        history.push(vec![-2.0e6 * t as f64; grid.len()]).unwrap();
    }
    let config = EngineConfig::builder()
        .physics(physics())
        .strategy(ParallelStrategy::Auto)
        .incremental(true)
        .build()
        .unwrap();
    let points = [DVec3::ZERO, DVec3::new(1500.0, 0.0, 0.0)];
    let field = SuperpositionEngine::new(config)
        .unwrap()
        .evaluate(&grid, &points, &history, &[0, 1, 2, 3, 4, 5])
        .unwrap();

    let series = field.point_series(0).unwrap();
    assert_eq!(series[0].uz, 0.0);
    for w in series.windows(2) {
        assert!(w[1].uz > w[0].uz);
    }
    // 线性：第 5 步是第 1 步的 5 倍
    assert!((series[5].uz - 5.0 * series[1].uz).abs() < 1e-9 * series[5].uz);
    assert_eq!(field.max_subsidence(5).unwrap().map(|(p, _)| p), Some(0));
}

/// 镜像平面整体平移时结果不变
#[test]
fn test_basement_depth_translation() {
    let shift = 400.0;
    let base = Grid::new(vec![deep_cell((-50.0, 50.0))]).unwrap();
    let moved = Grid::new(vec![Cell::from_bounds(
        (-50.0, 50.0),
        (-50.0, 50.0),
        (1990.0 + shift, 2010.0 + shift),
        1.0e-5,
    )])
    .unwrap();
    let dp = UniformPressure::new(-5.0e6);

    let a = evaluate(&base, &[DVec3::new(200.0, 0.0, 0.0)], &dp, &[0], &physics())
        .unwrap()
        .get(0, 0)
        .unwrap();
    let b = evaluate(
        &moved,
        &[DVec3::new(200.0, 0.0, shift)],
        &dp,
        &[0],
        &physics().with_basement_depth(shift),
    )
    .unwrap()
    .get(0, 0)
    .unwrap();
    assert!((a - b).magnitude() < 1e-9 * a.magnitude());
}

/// 未给出压实系数的单元取 Cm(E, ν)，E 加倍时位移减半
#[test]
fn test_elastic_modulus_scaling() {
    let grid =
        Grid::rectangular_layer((-100.0, 100.0), (-100.0, 100.0), (2, 2), (990.0, 1010.0), None)
            .unwrap();
    let points = [DVec3::ZERO, DVec3::new(250.0, -80.0, 0.0)];
    let dp = UniformPressure::new(-1.0e6);

    let soft = evaluate(&grid, &points, &dp, &[0], &PhysicalConstants::new(1.0e9, 0.25)).unwrap();
    let stiff = evaluate(&grid, &points, &dp, &[0], &PhysicalConstants::new(2.0e9, 0.25)).unwrap();
    for p in 0..points.len() {
        let a = soft.get(p, 0).unwrap();
        let b = stiff.get(p, 0).unwrap();
        assert!(a.is_subsidence());
        assert!((a - b * 2.0).magnitude() < 1e-12 * a.magnitude());
    }

    // 显式 Cm 的网格不受 E 影响
    let explicit =
        Grid::rectangular_layer((-100.0, 100.0), (-100.0, 100.0), (2, 2), (990.0, 1010.0), 1.0e-9)
            .unwrap();
    let a = evaluate(&explicit, &points, &dp, &[0], &PhysicalConstants::new(1.0e9, 0.25)).unwrap();
    let b = evaluate(&explicit, &points, &dp, &[0], &PhysicalConstants::new(2.0e9, 0.25)).unwrap();
    assert_eq!(a.get(1, 0), b.get(1, 0));
}
