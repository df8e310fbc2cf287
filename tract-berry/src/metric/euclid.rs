//! 基于逐点欧几里得距离的度量.

use super::{oriented_pointwise, DistanceMetric};
use ndarray::ArrayView2;

macro_rules! impl_scaled {
    ($metric: ident) => {
        impl $metric {
            /// 以缩放系数 1 初始化.
            #[inline]
            pub fn new() -> Self {
                Self { scale: 1.0 }
            }

            /// 以给定缩放系数初始化.
            #[inline]
            pub fn with_scale(scale: f64) -> Self {
                Self { scale }
            }
        }

        impl Default for $metric {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

pub(super) use impl_scaled;

/// 逐点距离的平均值.
#[derive(Copy, Clone, Debug)]
pub struct EuclideanMean {
    scale: f64,
}

/// 逐点距离的最大值.
#[derive(Copy, Clone, Debug)]
pub struct EuclideanMax {
    scale: f64,
}

/// 逐点距离的 (总体) 标准差. 对平移不敏感, 主要刻画形状差异.
#[derive(Copy, Clone, Debug)]
pub struct EuclideanStd {
    scale: f64,
}

impl_scaled!(EuclideanMean);
impl_scaled!(EuclideanMax);
impl_scaled!(EuclideanStd);

impl DistanceMetric for EuclideanMean {
    fn name(&self) -> &'static str {
        "euclidean-mean"
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn raw_distance(&self, s: ArrayView2<f64>, t: ArrayView2<f64>) -> (f64, bool) {
        let (d, flipped) = oriented_pointwise(s, t);
        (d.iter().sum::<f64>() / d.len() as f64, flipped)
    }
}

impl DistanceMetric for EuclideanMax {
    fn name(&self) -> &'static str {
        "euclidean-max"
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn raw_distance(&self, s: ArrayView2<f64>, t: ArrayView2<f64>) -> (f64, bool) {
        let (d, flipped) = oriented_pointwise(s, t);
        (d.into_iter().fold(0.0, f64::max), flipped)
    }
}

impl DistanceMetric for EuclideanStd {
    fn name(&self) -> &'static str {
        "euclidean-std"
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn raw_distance(&self, s: ArrayView2<f64>, t: ArrayView2<f64>) -> (f64, bool) {
        let (d, flipped) = oriented_pointwise(s, t);
        let n = d.len() as f64;
        let mean = d.iter().sum::<f64>() / n;
        let var = d.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        (var.sqrt(), flipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiber::to_matrix;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_euclid_values() {
        let a = to_matrix(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        // 逐点距离 1, 2, 3.
        let b = to_matrix(&[[0.0, 1.0, 0.0], [1.0, 2.0, 0.0], [2.0, 3.0, 0.0]]);

        let (d, _) = EuclideanMean::new().raw_distance(a.view(), b.view());
        assert!(f64_eq(d, 2.0));
        let (d, _) = EuclideanMax::new().raw_distance(a.view(), b.view());
        assert!(f64_eq(d, 3.0));
        let (d, _) = EuclideanStd::new().raw_distance(a.view(), b.view());
        assert!(f64_eq(d, (2.0f64 / 3.0).sqrt()));

        let (d, _) = EuclideanMean::with_scale(0.5)
            .calculate_distance(a.view(), b.view())
            .unwrap();
        assert!(f64_eq(d, 1.0));
    }

    #[test]
    fn test_std_translation_invariant() {
        let a = to_matrix(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        let b = to_matrix(&[[0.0, 5.0, 0.0], [1.0, 5.0, 0.0], [2.0, 5.0, 0.0]]);
        let (d, _) = EuclideanStd::new().raw_distance(a.view(), b.view());
        assert!(f64_eq(d, 0.0));
        let (d, _) = EuclideanMean::new().raw_distance(a.view(), b.view());
        assert!(f64_eq(d, 5.0));
    }
}
