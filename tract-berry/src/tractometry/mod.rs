//! Tractometry: 沿纤维束采样标量体, 按沿纤维的位置 (bin) 汇总.
//!
//! 提供两种模式:
//!
//! 1. [`Tractometry::static_resampling`]: 所有纤维重采样到相同点数, 点索引即 bin.
//!   输出为 `N x F` 矩阵.
//! 2. [`Tractometry::nearest_centroid_point`]: 先对纤维束聚类得到若干中心线,
//!   再把每个纤维点分配到最近的中心线点, 该点的索引即 bin. 输出为参差的逐 bin 样本列表.
//!
//! 两种模式都不修改输入的纤维束与标量体, 着色结果写在返回的纤维束副本上.

mod nearest;
mod resampled;

pub use nearest::{CentroidProfile, PointAssignment};
pub use resampled::StaticProfile;

use crate::consts::{
    DEFAULT_CLUSTER_SIZE, DEFAULT_MAX_CENTROIDS, DEFAULT_NUM_POINTS, FLIP_PROBE_POSITION,
    FLIP_PROBE_THRESHOLD, MIN_FIBER_POINTS, RETRY_ATTEMPTS, RETRY_GROWTH,
};
use crate::fiber::point_distance_squared;
use crate::volume::Sampler;
use crate::{FiberBundle, Point3, TractError, TractResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 中心线个数收敛循环的参数.
///
/// 第 `k` 次尝试 (从 0 开始) 的聚类距离为 `cluster_size * (1 + growth)^k`, 即每次在上一次的基础上增长.
/// 只有最后一次尝试会强制限制簇个数. 循环结束时仍未收敛不算错误.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RetryPolicy {
    /// 最大尝试次数, 至少为 1.
    pub max_attempts: u32,

    /// 每次尝试相对上一次的聚类距离增长比例.
    pub growth: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_ATTEMPTS,
            growth: RETRY_GROWTH,
        }
    }
}

/// 分区方向探测.
///
/// 在参考纤维上相对位置 `position` 处采样标量体, 若值大于 `threshold`,
/// 则整体反转 bin 编号. 适用于起点区域标签值较小的分区标签体.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlipProbe {
    /// 探测阈值.
    pub threshold: f64,

    /// 探测点在参考纤维上的相对位置, 取值范围 `[0, 1]`.
    pub position: f64,
}

impl FlipProbe {
    /// 分区标签体约定: 在参考纤维中点探测, 阈值 1.5.
    pub const fn label_convention() -> Self {
        Self {
            threshold: FLIP_PROBE_THRESHOLD,
            position: FLIP_PROBE_POSITION,
        }
    }

    /// 是否需要反转 bin 编号. 探测点越界时不反转.
    pub fn detect<S: Sampler>(&self, volume: &S, reference: &[Point3]) -> bool {
        let Some(last) = reference.len().checked_sub(1) else {
            return false;
        };
        let index = ((last as f64 * self.position).floor() as usize).min(last);
        volume
            .interpolate(&reference[index])
            .is_some_and(|v| v > self.threshold)
    }
}

/// Tractometry 参数.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tractometry {
    /// 每根纤维的重采样点数, 即 bin 个数.
    num_points: usize,

    /// 最近中心线点模式下最多使用的中心线个数.
    max_centroids: usize,

    /// 最近中心线点模式下的初始聚类距离 (单位: 毫米).
    cluster_size: f64,

    retry: RetryPolicy,

    /// 为 `None` 时不做方向探测.
    flip_probe: Option<FlipProbe>,
}

impl Default for Tractometry {
    fn default() -> Self {
        Self {
            num_points: DEFAULT_NUM_POINTS,
            max_centroids: DEFAULT_MAX_CENTROIDS,
            cluster_size: DEFAULT_CLUSTER_SIZE,
            retry: RetryPolicy::default(),
            flip_probe: None,
        }
    }
}

impl Tractometry {
    /// 以默认参数初始化.
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定 bin 个数.
    pub fn with_num_points(mut self, num_points: usize) -> Self {
        self.num_points = num_points;
        self
    }

    /// 指定最大中心线个数.
    pub fn with_max_centroids(mut self, max_centroids: usize) -> Self {
        self.max_centroids = max_centroids;
        self
    }

    /// 指定初始聚类距离.
    pub fn with_cluster_size(mut self, cluster_size: f64) -> Self {
        self.cluster_size = cluster_size;
        self
    }

    /// 指定收敛循环参数.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// 指定分区方向探测.
    pub fn with_flip_probe(mut self, flip_probe: Option<FlipProbe>) -> Self {
        self.flip_probe = flip_probe;
        self
    }

    /// bin 个数.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// 最大中心线个数.
    #[inline]
    pub fn max_centroids(&self) -> usize {
        self.max_centroids
    }

    /// 初始聚类距离.
    #[inline]
    pub fn cluster_size(&self) -> f64 {
        self.cluster_size
    }

    /// 收敛循环参数.
    #[inline]
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// 分区方向探测.
    #[inline]
    pub fn flip_probe(&self) -> Option<FlipProbe> {
        self.flip_probe
    }

    fn validate(&self) -> TractResult<()> {
        if self.num_points < MIN_FIBER_POINTS {
            return Err(TractError::TooFewPoints(self.num_points, MIN_FIBER_POINTS));
        }
        if self.max_centroids == 0 {
            return Err(TractError::InvalidParameter("max_centroids"));
        }
        if !self.cluster_size.is_finite() || self.cluster_size <= 0.0 {
            return Err(TractError::InvalidParameter("cluster_size"));
        }
        if self.retry.max_attempts == 0 {
            return Err(TractError::InvalidParameter("max_attempts"));
        }
        if !self.retry.growth.is_finite() || self.retry.growth < 0.0 {
            return Err(TractError::InvalidParameter("growth"));
        }
        if let Some(p) = self.flip_probe {
            if !(0.0..=1.0).contains(&p.position) || p.threshold.is_nan() {
                return Err(TractError::InvalidParameter("flip_probe"));
            }
        }
        Ok(())
    }

    /// 是否整体反转 bin 编号.
    fn flip_parcellation<S: Sampler>(&self, volume: &S, reference: &[Point3]) -> bool {
        self.flip_probe
            .is_some_and(|p| p.detect(volume, reference))
    }

    /// 取 `ref_fib` 的第一根纤维, 重采样到 bin 个数. `ref_fib` 为空时返回 `Err`.
    fn external_reference(&self, ref_fib: &FiberBundle) -> TractResult<Vec<Point3>> {
        let first = ref_fib.get(0).ok_or(TractError::EmptyBundle)?;
        Ok(crate::fiber::resample_polyline(first, self.num_points))
    }

    /// 方向校正后的 bin 编号.
    #[inline]
    fn bin_of(&self, position: usize, flip_parcellation: bool) -> usize {
        if flip_parcellation {
            self.num_points - 1 - position
        } else {
            position
        }
    }
}

/// 判断 `fiber` 是否需要反向才能与 `reference` 逐点对应.
///
/// 比较正向与反向两种对应下逐点距离平方之和, 反向严格更小时返回 `true`.
/// `reference` 为空时返回 `Err(TractError::EmptyBundle)`,
/// 两者点数不同时返回 `Err(TractError::PointCountMismatch)`.
pub fn flip(reference: &[Point3], fiber: &[Point3]) -> TractResult<bool> {
    if reference.is_empty() {
        return Err(TractError::EmptyBundle);
    }
    if reference.len() != fiber.len() {
        return Err(TractError::PointCountMismatch(reference.len(), fiber.len()));
    }
    let direct: f64 = reference
        .iter()
        .zip(fiber)
        .map(|(a, b)| point_distance_squared(a, b))
        .sum();
    let reversed: f64 = reference
        .iter()
        .zip(fiber.iter().rev())
        .map(|(a, b)| point_distance_squared(a, b))
        .sum();
    Ok(reversed < direct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::{Geometry, ScalarVolume};

    #[test]
    fn test_flip() {
        let a = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let b = [[2.0, 0.1, 0.0], [1.0, 0.1, 0.0], [0.0, 0.1, 0.0]];
        assert!(flip(&a, &b).unwrap());
        assert!(!flip(&a, &a).unwrap());
        assert_eq!(flip(&[], &a).unwrap_err(), TractError::EmptyBundle);
        assert_eq!(
            flip(&a, &b[..2]).unwrap_err(),
            TractError::PointCountMismatch(3, 2)
        );
    }

    #[test]
    fn test_flip_probe() {
        // 值等于 x 坐标.
        let vol = ScalarVolume::from_fn(Geometry::unit((1, 1, 10)), |p| p[0] as f32);
        let probe = FlipProbe::label_convention();

        // 中点 x = 2.
        let low: Vec<Point3> = (0..5).map(|i| [i as f64, 0.0, 0.0]).collect();
        assert!(probe.detect(&vol, &low));

        // 中点 x = 1.
        let high: Vec<Point3> = (0..5).map(|i| [i as f64 * 0.5, 0.0, 0.0]).collect();
        assert!(!probe.detect(&vol, &high));

        assert!(!probe.detect(&vol, &[]));
    }

    #[test]
    fn test_validate() {
        assert!(Tractometry::new().validate().is_ok());
        assert_eq!(
            Tractometry::new().with_num_points(1).validate().unwrap_err(),
            TractError::TooFewPoints(1, 2)
        );
        assert_eq!(
            Tractometry::new()
                .with_max_centroids(0)
                .validate()
                .unwrap_err(),
            TractError::InvalidParameter("max_centroids")
        );
        let retry = RetryPolicy {
            max_attempts: 0,
            growth: 0.2,
        };
        assert!(Tractometry::new().with_retry(retry).validate().is_err());
        let probe = FlipProbe {
            threshold: 1.5,
            position: 2.0,
        };
        assert!(Tractometry::new()
            .with_flip_probe(Some(probe))
            .validate()
            .is_err());
    }
}
