use super::{columns, oriented_pointwise, DistanceMetric};
use crate::volume::Sampler;
use ndarray::{ArrayView1, ArrayView2};
use std::sync::Arc;

/// 沿两根纤维采样标量体, 逐点取值之差的绝对值的平均值.
///
/// 任一侧越界的点对不参与平均. 没有可用点对时距离为 0.
#[derive(Debug)]
pub struct ScalarMap<S> {
    volume: Arc<S>,
    scale: f64,
}

impl<S: Sampler> ScalarMap<S> {
    /// 以缩放系数 1 初始化.
    #[inline]
    pub fn new(volume: Arc<S>) -> Self {
        Self::with_scale(volume, 1.0)
    }

    /// 以给定缩放系数初始化.
    #[inline]
    pub fn with_scale(volume: Arc<S>, scale: f64) -> Self {
        Self { volume, scale }
    }

    #[inline]
    fn sample(&self, c: ArrayView1<f64>) -> Option<f64> {
        self.volume.interpolate(&[c[0], c[1], c[2]])
    }
}

impl<S: Sampler> DistanceMetric for ScalarMap<S> {
    fn name(&self) -> &'static str {
        "scalar-map"
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn raw_distance(&self, s: ArrayView2<f64>, t: ArrayView2<f64>) -> (f64, bool) {
        let (_, flipped) = oriented_pointwise(s, t);
        let (mut sum, mut count) = (0.0, 0usize);
        for (a, b) in columns(s, false).zip(columns(t, flipped)) {
            if let (Some(va), Some(vb)) = (self.sample(a), self.sample(b)) {
                sum += (va - vb).abs();
                count += 1;
            }
        }
        match count {
            0 => (0.0, flipped),
            n => (sum / n as f64, flipped),
        }
    }
}
