// crates/rc_physics/src/kernel/compaction.rs

//! 压实核函数
//!
//! 把棱柱核函数换算为单个压实单元在观测点处的位移与应力贡献。
//! 无限空间解（实单元）加上关于镜像平面反射的"第二系统"，
//! 使平面上的法向和切向应力为零 (Geertsma 1973; Tempone et al. 2010)。
//!
//! 记 A = Cm·ΔP/(4π)，ν 为泊松比，h = z_p − b（观测点在镜像平面以下的深度）：
//!
//! ```text
//! ux = A [ Fx(实) + (3−4ν) Fx(镜) − 2h Fxz(镜) ]
//! uy = A [ Fy(实) + (3−4ν) Fy(镜) − 2h Fyz(镜) ]
//! uz = A [ Fz(实) − (3−4ν) Fz(镜) − 2h Fzz(镜) ]
//! ```
//!
//! 水平面上的应力分量（拉为正），G = E/(2(1+ν))：
//!
//! ```text
//! σxz = 2G·A [ −Fxz(实) − Fxz(镜) − 2h ∂zFxz(镜) ]
//! σyz = 2G·A [ −Fyz(实) − Fyz(镜) − 2h ∂zFyz(镜) ]
//! σzz = 2G·A [ −Fzz(实) + Fzz(镜) − 2h ∂zFzz(镜) ]
//! ```
//!
//! 在镜像平面上三个分量恒为零。单元内部的 σzz 按同一公式给出，不扣除本征应变。
//!
//! 未显式给出压实系数的单元取单轴压实系数 Cm(E, ν)。
//! 括号内只依赖几何和 ν，因此 [`CompactionKernel::influence`] 给出单位 ΔP 的贡献，
//! 新的压力变化只需重新缩放。

use std::f64::consts::PI;

use glam::DVec3;
use rc_config::PhysicalConstants;
use rc_foundation::{RcError, RcResult};

use super::prism::{prism_kernel, prism_kernel_dz};
use crate::field::{DisplacementVector, TractionVector};
use crate::geometry::{corner_offsets, mirrored_corner_offsets, Cell, Point3};

/// 求值的物理量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// 位移 (ux, uy, uz) [m]
    Displacement,
    /// 水平面上的应力 (σxz, σyz, σzz) [Pa]
    Stress,
}

impl Quantity {
    /// 名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Displacement => "位移",
            Self::Stress => "应力",
        }
    }
}

/// 压实核函数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompactionKernel {
    /// 3 − 4ν
    image_factor: f64,
    /// 镜像平面深度
    plane: f64,
    /// 单轴压实系数 Cm(E, ν)
    default_compaction: f64,
    /// 剪切模量 G
    shear_modulus: f64,
}

impl CompactionKernel {
    /// 由物理常数创建
    pub fn new(physics: &PhysicalConstants) -> Self {
        Self {
            image_factor: physics.image_factor(),
            plane: physics.basement_depth,
            default_compaction: physics.uniaxial_compaction(),
            shear_modulus: physics.shear_modulus(),
        }
    }

    /// 镜像系数 3 − 4ν
    pub fn image_factor(&self) -> f64 {
        self.image_factor
    }

    /// 镜像平面深度
    pub fn plane(&self) -> f64 {
        self.plane
    }

    /// 单元实际使用的压实系数
    #[inline]
    pub fn compaction_of(&self, cell: &Cell) -> f64 {
        cell.compaction_coefficient.unwrap_or(self.default_compaction)
    }

    /// 检查单元位于镜像平面以下（顶面可与平面重合）
    pub fn check_cell(&self, index: usize, cell: &Cell) -> RcResult<()> {
        if cell.top() < self.plane {
            return Err(RcError::invalid_geometry(format!(
                "单元{} 顶面 z={} 高于镜像平面 z={}",
                index,
                cell.top(),
                self.plane
            )));
        }
        Ok(())
    }

    /// 按物理量选择棱柱解
    pub fn influence_of(&self, quantity: Quantity, cell: &Cell, point: Point3) -> RcResult<DVec3> {
        match quantity {
            Quantity::Displacement => self.influence(cell, point),
            Quantity::Stress => self.stress_influence(cell, point),
        }
    }

    /// 按物理量选择点源解
    pub fn point_source_influence_of(
        &self,
        quantity: Quantity,
        cell: &Cell,
        point: Point3,
    ) -> RcResult<DVec3> {
        match quantity {
            Quantity::Displacement => self.point_source_influence(cell, point),
            Quantity::Stress => self.point_source_stress_influence(cell, point),
        }
    }

    /// 单位压力变化下的位移贡献 [m/Pa]
    pub fn influence(&self, cell: &Cell, point: Point3) -> RcResult<DVec3> {
        let cm = self.compaction_of(cell);
        if cm == 0.0 {
            return Ok(DVec3::ZERO);
        }

        let real = prism_kernel(&corner_offsets(cell, point)?)?;
        let image = prism_kernel(&mirrored_corner_offsets(cell, point, self.plane)?)?;

        let f = self.image_factor;
        let two_h = 2.0 * (point.z - self.plane);
        let bracket = DVec3::new(
            real.x + f * image.x - two_h * image.xz,
            real.y + f * image.y - two_h * image.yz,
            real.z - f * image.z - two_h * image.zz,
        );
        Ok(bracket * (cm / (4.0 * PI)))
    }

    /// 单位压力变化下的应力贡献 (σxz, σyz, σzz) [Pa/Pa]
    pub fn stress_influence(&self, cell: &Cell, point: Point3) -> RcResult<DVec3> {
        let cm = self.compaction_of(cell);
        if cm == 0.0 {
            return Ok(DVec3::ZERO);
        }

        let real = prism_kernel(&corner_offsets(cell, point)?)?;
        let mirrored = mirrored_corner_offsets(cell, point, self.plane)?;
        let image = prism_kernel(&mirrored)?;
        let image_dz = prism_kernel_dz(&mirrored)?;

        let two_h = 2.0 * (point.z - self.plane);
        let bracket = DVec3::new(
            -real.xz - image.xz - two_h * image_dz.x,
            -real.yz - image.yz - two_h * image_dz.y,
            -real.zz + image.zz - two_h * image_dz.z,
        );
        Ok(bracket * (2.0 * self.shear_modulus * cm / (4.0 * PI)))
    }

    /// 点源（压实核）近似下单位压力变化的位移贡献
    ///
    /// 单元体积集中于中心，远场时与 [`influence`](Self::influence) 一致。
    pub fn point_source_influence(&self, cell: &Cell, point: Point3) -> RcResult<DVec3> {
        let d = point - cell.center;
        let h = point.z - self.plane;
        let c = cell.center.z - self.plane;
        let horizontal2 = d.x * d.x + d.y * d.y;
        let rho1 = (horizontal2 + (h - c).powi(2)).sqrt();
        let rho2 = (horizontal2 + (h + c).powi(2)).sqrt();
        if rho1 == 0.0 {
            return Err(RcError::domain("观测点与点源重合"));
        }

        let f = self.image_factor;
        let (inv1, inv2) = (rho1.powi(-3), rho2.powi(-3));
        let inv2_5 = rho2.powi(-5);
        let lateral = inv1 + f * inv2 - 6.0 * h * (h + c) * inv2_5;
        let vertical = (h - c) * inv1 - f * (h + c) * inv2
            + 2.0 * h * (inv2 - 3.0 * (h + c).powi(2) * inv2_5);

        let scale = self.compaction_of(cell) * cell.volume() / (4.0 * PI);
        let u = DVec3::new(d.x * lateral, d.y * lateral, vertical) * scale;
        if !u.is_finite() {
            return Err(RcError::domain("点源影响系数非有限"));
        }
        Ok(u)
    }

    /// 点源近似下单位压力变化的应力贡献
    pub fn point_source_stress_influence(&self, cell: &Cell, point: Point3) -> RcResult<DVec3> {
        let d = point - cell.center;
        let h = point.z - self.plane;
        let c = cell.center.z - self.plane;
        let (z1, z2) = (h - c, h + c);
        let horizontal2 = d.x * d.x + d.y * d.y;
        let rho1 = (horizontal2 + z1 * z1).sqrt();
        let rho2 = (horizontal2 + z2 * z2).sqrt();
        if rho1 == 0.0 {
            return Err(RcError::domain("观测点与点源重合"));
        }

        // 实源 φ = 1/ρ1 与镜像源 ψ = 1/ρ2 的二阶、三阶导数
        let (inv1_3, inv1_5) = (rho1.powi(-3), rho1.powi(-5));
        let (inv2_3, inv2_5, inv2_7) = (rho2.powi(-3), rho2.powi(-5), rho2.powi(-7));
        let phi = DVec3::new(
            3.0 * d.x * z1 * inv1_5,
            3.0 * d.y * z1 * inv1_5,
            3.0 * z1 * z1 * inv1_5 - inv1_3,
        );
        let psi = DVec3::new(
            3.0 * d.x * z2 * inv2_5,
            3.0 * d.y * z2 * inv2_5,
            3.0 * z2 * z2 * inv2_5 - inv2_3,
        );
        let lateral_dz = 3.0 * inv2_5 - 15.0 * z2 * z2 * inv2_7;
        let psi_dz = DVec3::new(
            d.x * lateral_dz,
            d.y * lateral_dz,
            9.0 * z2 * inv2_5 - 15.0 * z2.powi(3) * inv2_7,
        );

        let two_h = 2.0 * h;
        let bracket = DVec3::new(
            -phi.x - psi.x - two_h * psi_dz.x,
            -phi.y - psi.y - two_h * psi_dz.y,
            -phi.z + psi.z - two_h * psi_dz.z,
        );
        let scale = 2.0 * self.shear_modulus * self.compaction_of(cell) * cell.volume() / (4.0 * PI);
        let s = bracket * scale;
        if !s.is_finite() {
            return Err(RcError::domain("点源应力系数非有限"));
        }
        Ok(s)
    }

    /// 压力变化 `dp` 下的位移贡献
    pub fn displacement(&self, cell: &Cell, point: Point3, dp: f64) -> RcResult<DisplacementVector> {
        let dp = rc_foundation::float::ensure_finite("ΔP", dp)?;
        Ok(DisplacementVector::from(self.influence(cell, point)? * dp))
    }

    /// 压力变化 `dp` 下的应力贡献
    pub fn stress(&self, cell: &Cell, point: Point3, dp: f64) -> RcResult<TractionVector> {
        let dp = rc_foundation::float::ensure_finite("ΔP", dp)?;
        Ok(TractionVector::from(self.stress_influence(cell, point)? * dp))
    }
}
