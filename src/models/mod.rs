//! # 数据模型模块
//!
//! 定义激发态、轨道跃迁和单位换算。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `filter.rs`, `spectrum/`, `export/` 和 `commands/` 使用
//! - 子模块: excited_state, units

pub mod excited_state;
pub mod units;

pub use excited_state::{
    assign_energy_ranks, Direction, ExcitedState, MoTransition, Orbital, Spin,
};
