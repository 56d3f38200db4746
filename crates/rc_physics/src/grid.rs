// crates/rc_physics/src/grid.rs

//! 单元网格
//!
//! 有序、已验证、不可变的单元序列。构建一次，之后可用任意压力变化反复求值。
//! 单元间是否重叠不做检查。

use glam::{DVec2, DVec3};
use log::warn;
use rc_foundation::{KahanSum, RcError, RcResult, ValidationReport};

use crate::geometry::{Cell, Point3};

/// 单元网格
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cells: Vec<Cell>,
}

impl Grid {
    /// 由单元列表创建并验证
    ///
    /// 任何单元的尺寸非正、坐标非有限或压实系数为负/非有限时返回 `InvalidGeometry`；
    /// 空网格同样是错误。压实系数为 0 的单元只记录警告。
    pub fn new(cells: Vec<Cell>) -> RcResult<Self> {
        if cells.is_empty() {
            return Err(RcError::invalid_geometry("网格不包含任何单元"));
        }

        let mut report = ValidationReport::new();
        for (i, cell) in cells.iter().enumerate() {
            cell.validate_into(i, &mut report);
        }
        for w in report.into_result()? {
            warn!("网格验证警告: {}", w);
        }

        Ok(Self { cells })
    }

    /// 由 (中心, 半宽, 压实系数) 三元组创建
    pub fn from_tuples<I>(tuples: I) -> RcResult<Self>
    where
        I: IntoIterator<Item = (Point3, DVec3, f64)>,
    {
        Self::new(
            tuples
                .into_iter()
                .map(|(c, h, cm)| Cell::new(c, h, cm))
                .collect(),
        )
    }

    /// 矩形平面层：把 `x × y` 区域均分为 `shape = (nx, ny)` 个单元
    ///
    /// 单元按 y 行、x 列的顺序排列。压实系数传 `None` 时各单元取单轴压实系数。
    pub fn rectangular_layer(
        x: (f64, f64),
        y: (f64, f64),
        shape: (usize, usize),
        depth: (f64, f64),
        compaction_coefficient: impl Into<Option<f64>>,
    ) -> RcResult<Self> {
        check_layer_args(x, y, shape, depth)?;
        let compaction_coefficient: Option<f64> = compaction_coefficient.into();
        let (nx, ny) = shape;
        let dx = (x.1 - x.0) / nx as f64;
        let dy = (y.1 - y.0) / ny as f64;

        let mut cells = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            let y0 = y.0 + j as f64 * dy;
            for i in 0..nx {
                let x0 = x.0 + i as f64 * dx;
                cells.push(Cell::from_bounds(
                    (x0, x0 + dx),
                    (y0, y0 + dy),
                    depth,
                    compaction_coefficient,
                ));
            }
        }
        Self::new(cells)
    }

    /// 圆形平面层：在外接正方形上划分 `shape` 网格，保留中心落在圆内的单元
    pub fn circular_layer(
        center: DVec2,
        radius: f64,
        shape: (usize, usize),
        depth: (f64, f64),
        compaction_coefficient: impl Into<Option<f64>>,
    ) -> RcResult<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(RcError::invalid_geometry(format!("半径必须为正: {}", radius)));
        }
        let compaction_coefficient: Option<f64> = compaction_coefficient.into();
        let square = Self::rectangular_layer(
            (center.x - radius, center.x + radius),
            (center.y - radius, center.y + radius),
            shape,
            depth,
            compaction_coefficient,
        )?;
        let cells: Vec<Cell> = square
            .cells
            .into_iter()
            .filter(|c| (c.center.truncate() - center).length() <= radius)
            .collect();
        Self::new(cells)
    }

    /// 单元数
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// 是否为空（验证后恒为 false）
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 全部单元
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// 迭代器
    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    /// 按索引获取单元
    pub fn get(&self, index: usize) -> RcResult<&Cell> {
        RcError::check_index("cell", index, self.cells.len())?;
        Ok(&self.cells[index])
    }

    /// 包围盒 (最小角, 最大角)
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        self.cells.iter().fold(
            (DVec3::splat(f64::INFINITY), DVec3::splat(f64::NEG_INFINITY)),
            |(lo, hi), c| (lo.min(c.lower()), hi.max(c.upper())),
        )
    }

    /// 总体积 [m³]
    pub fn total_volume(&self) -> f64 {
        self.cells.iter().map(Cell::volume).sum::<KahanSum>().value()
    }
}

impl<'a> IntoIterator for &'a Grid {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

fn check_layer_args(
    x: (f64, f64),
    y: (f64, f64),
    shape: (usize, usize),
    depth: (f64, f64),
) -> RcResult<()> {
    if !(x.1 > x.0) || !(y.1 > y.0) {
        return Err(RcError::invalid_geometry(format!(
            "区域上界必须大于下界: x={:?}, y={:?}",
            x, y
        )));
    }
    if !(depth.1 > depth.0) {
        return Err(RcError::invalid_geometry(format!(
            "底面深度必须大于顶面深度（z 向下）: {:?}",
            depth
        )));
    }
    if shape.0 == 0 || shape.1 == 0 {
        return Err(RcError::invalid_geometry(format!("划分数必须为正: {:?}", shape)));
    }
    Ok(())
}
