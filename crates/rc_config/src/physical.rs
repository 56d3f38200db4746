// crates/rc_config/src/physical.rs

//! 物理常数配置
//!
//! 均匀、半无限、横向均一的弹性半空间参数。
//!
//! - `elastic_modulus`: 杨氏模量 E [Pa]。未显式给出压实系数的单元取单轴压实系数 Cm(E, ν)，
//!   因此 E 决定这些单元的位移量级；应力还经剪切模量 G 与 E 成正比
//! - `poisson_ratio`: 泊松比 ν，决定镜像系统的耦合系数 (3 − 4ν)
//! - `basement_depth`: 镜像平面的深度 [m]，0 表示自由地表位于 z = 0

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 物理常数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// 杨氏模量 [Pa]
    #[serde(default = "default_elastic_modulus")]
    pub elastic_modulus: f64,

    /// 泊松比 [-]
    #[serde(default = "default_poisson_ratio")]
    pub poisson_ratio: f64,

    /// 镜像平面深度 [m]（z 向下为正）
    #[serde(default)]
    pub basement_depth: f64,
}

fn default_elastic_modulus() -> f64 { 1.0e9 }
fn default_poisson_ratio() -> f64 { 0.25 }

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            elastic_modulus: default_elastic_modulus(),
            poisson_ratio: default_poisson_ratio(),
            basement_depth: 0.0,
        }
    }
}

impl PhysicalConstants {
    /// 以 E、ν 创建，镜像平面位于地表
    pub fn new(elastic_modulus: f64, poisson_ratio: f64) -> Self {
        Self {
            elastic_modulus,
            poisson_ratio,
            basement_depth: 0.0,
        }
    }

    /// 设置镜像平面深度
    pub fn with_basement_depth(mut self, depth: f64) -> Self {
        self.basement_depth = depth;
        self
    }

    /// 单轴压实系数 Cm = (1+ν)(1−2ν) / (E(1−ν)) [1/Pa]
    ///
    /// 单元未显式给出压实系数时使用此值。
    pub fn uniaxial_compaction(&self) -> f64 {
        let nu = self.poisson_ratio;
        (1.0 + nu) * (1.0 - 2.0 * nu) / (self.elastic_modulus * (1.0 - nu))
    }

    /// 剪切模量 G = E / (2(1+ν)) [Pa]
    #[inline]
    pub fn shear_modulus(&self) -> f64 {
        self.elastic_modulus / (2.0 * (1.0 + self.poisson_ratio))
    }

    /// 镜像系统系数 3 − 4ν
    #[inline]
    pub fn image_factor(&self) -> f64 {
        3.0 - 4.0 * self.poisson_ratio
    }

    /// 验证参数有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.elastic_modulus.is_finite() && self.elastic_modulus > 0.0) {
            return Err(ConfigError::invalid(
                "physics.elastic_modulus",
                self.elastic_modulus,
                "杨氏模量必须为正的有限值",
            ));
        }
        // ν = 0.5 时 Cm = 0，ν ≤ -1 不满足热力学稳定性
        if !(self.poisson_ratio > -1.0 && self.poisson_ratio < 0.5) {
            return Err(ConfigError::invalid(
                "physics.poisson_ratio",
                self.poisson_ratio,
                "泊松比必须在 (-1, 0.5) 内",
            ));
        }
        if !self.basement_depth.is_finite() {
            return Err(ConfigError::invalid(
                "physics.basement_depth",
                self.basement_depth,
                "镜像平面深度必须有限",
            ));
        }
        Ok(())
    }
}
