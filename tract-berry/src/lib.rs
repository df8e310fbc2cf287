#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 提供弥散 MRI 纤维束 (tractogram) 的递归聚类与 tractometry 采样算法.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 该 crate 不负责纤维束文件 (TrackVis, VTK 等) 的读写, 调用方应自行构造
//!   [`FiberBundle`]. 标量体数据可通过 nifti 文件加载.
//! 2. 对于调用方给出的非法输入, 程序返回 [`TractError`] 而不会 panic.
//!   `debug_assert!` 只用于检查内部不变量.
//!
//! # 开发计划
//!
//! ### 纤维与纤维束 ✅
//!
//! 纤维是有序的三维折线, 至少包含两个点. 纤维束支持按弧长重采样,
//! 子集提取, 逐点着色等操作.
//!
//! 实现位于 `tract-berry/src/fiber`.
//!
//! ### 距离度量 ✅
//!
//! 所有度量都同时比较正向与反向两种点对应关系, 取较小者并报告是否翻转.
//! 每个度量带有一个缩放系数, 以便多个度量相加.
//!
//! 实现位于 `tract-berry/src/metric`.
//!
//! ### 多尺度递归聚类 ✅
//!
//! 在一组严格递增的距离阈值上由细到粗逐层聚类, 维护运行均值形式的中心线,
//! 合并重复簇, 并可按掩膜重叠率过滤输出.
//!
//! 实现位于 `tract-berry/src/cluster`.
//!
//! ### Tractometry ✅
//!
//! 1. 静态重采样模式: 以点索引作为沿纤维的位置 (bin).
//! 2. 最近中心线点模式: 先聚类出若干中心线, 再把每个纤维点分配到最近的中心线点.
//!
//! 实现位于 `tract-berry/src/tractometry`.
//!
//! ### 标量体与掩膜 ✅
//!
//! 轴对齐几何 (原点 + 体素间距) 下的三线性插值与体素占用测试.
//! 越界采样返回 `None`, 由调用方视为缺失数据.
//!
//! 实现位于 `tract-berry/src/volume`.

/// 物理空间中的三维点 (单位: 毫米).
pub type Point3 = [f64; 3];

/// 8-bit RGB 颜色.
pub type Rgb = [u8; 3];

/// 三维体素索引, 以 `(z, y, x)` 顺序访问.
pub type Idx3d = (usize, usize, usize);

mod error;

pub use error::{ErrorKind, TractError, TractResult};

pub mod consts;

pub mod fiber;

pub use fiber::FiberBundle;

pub mod volume;

pub use volume::{GridAttr, MaskVolume, Sampler, ScalarVolume};

pub mod metric;

pub mod cluster;

pub use cluster::{Cluster, TractClusteringFilter};

pub mod tractometry;

pub use tractometry::Tractometry;

pub mod prelude;
