//! 基于纤维形状 (而非位置) 的度量.

use super::euclid::impl_scaled;
use super::{columns, oriented_pointwise, DistanceMetric};
use itertools::Itertools;
use ndarray::{ArrayView1, ArrayView2};

/// 两根纤维长度之差的绝对值.
#[derive(Copy, Clone, Debug)]
pub struct Length {
    scale: f64,
}

/// 相邻线段夹角 (单位: 度) 之差的绝对值的平均值.
#[derive(Copy, Clone, Debug)]
pub struct InnerAngles {
    scale: f64,
}

impl_scaled!(Length);
impl_scaled!(InnerAngles);

#[inline]
fn segment(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> [f64; 3] {
    [b[0] - a[0], b[1] - a[1], b[2] - a[2]]
}

#[inline]
fn norm(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// 矩阵表示的折线长度.
fn matrix_length(m: ArrayView2<f64>) -> f64 {
    columns(m, false)
        .tuple_windows()
        .map(|(a, b)| norm(&segment(&a, &b)))
        .sum()
}

/// 按 `flip` 给定方向, 计算相邻线段夹角序列. 零长度线段的夹角记为 0.
fn inner_angles(m: ArrayView2<f64>, flip: bool) -> Vec<f64> {
    columns(m, flip)
        .tuple_windows()
        .map(|(a, b, c)| {
            let (u, v) = (segment(&a, &b), segment(&b, &c));
            let (nu, nv) = (norm(&u), norm(&v));
            if nu == 0.0 || nv == 0.0 {
                return 0.0;
            }
            let cos = (u[0] * v[0] + u[1] * v[1] + u[2] * v[2]) / (nu * nv);
            cos.clamp(-1.0, 1.0).acos().to_degrees()
        })
        .collect()
}

impl DistanceMetric for Length {
    fn name(&self) -> &'static str {
        "length"
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn raw_distance(&self, s: ArrayView2<f64>, t: ArrayView2<f64>) -> (f64, bool) {
        let (_, flipped) = oriented_pointwise(s, t);
        ((matrix_length(s) - matrix_length(t)).abs(), flipped)
    }
}

impl DistanceMetric for InnerAngles {
    fn name(&self) -> &'static str {
        "inner-angles"
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn raw_distance(&self, s: ArrayView2<f64>, t: ArrayView2<f64>) -> (f64, bool) {
        let (_, flipped) = oriented_pointwise(s, t);
        let a = inner_angles(s, false);
        let b = inner_angles(t, flipped);
        if a.is_empty() {
            return (0.0, flipped);
        }
        let d = a.iter().zip(&b).map(|(x, y)| (x - y).abs()).sum::<f64>() / a.len() as f64;
        (d, flipped)
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
    fn test_length() {
        let a = to_matrix(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        let b = to_matrix(&[[0.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 6.0, 0.0]]);
        let (d, _) = Length::new().raw_distance(a.view(), b.view());
        assert!(f64_eq(d, 4.0));
    }

    #[test]
    fn test_inner_angles() {
        // 直线与直角折线.
        let a = to_matrix(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        let b = to_matrix(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]);
        let (d, _) = InnerAngles::new().raw_distance(a.view(), b.view());
        assert!(f64_eq(d, 90.0));

        // 两点纤维没有夹角.
        let c = to_matrix(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        let (d, _) = InnerAngles::new().raw_distance(c.view(), c.view());
        assert!(f64_eq(d, 0.0));
    }
}
