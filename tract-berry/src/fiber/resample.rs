//! 纤维按弧长重采样, 以及纤维与 `3 x N` 矩阵之间的转换.

use crate::Point3;
use itertools::Itertools;
use ndarray::{Array2, ArrayView2, Axis};

/// 两点之间的欧几里得距离.
#[inline]
pub fn point_distance(a: &Point3, b: &Point3) -> f64 {
    point_distance_squared(a, b).sqrt()
}

/// 两点之间欧几里得距离的平方.
#[inline]
pub fn point_distance_squared(a: &Point3, b: &Point3) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

/// 计算折线长度.
pub fn polyline_length(points: &[Point3]) -> f64 {
    points
        .iter()
        .tuple_windows()
        .map(|(a, b)| point_distance(a, b))
        .sum()
}

/// 在 `a` 与 `b` 之间以比例 `t` 线性插值.
#[inline]
fn lerp_point(a: &Point3, b: &Point3, t: f64) -> Point3 {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// 按弧长将折线 `points` 均匀重采样为 `n` 个点. 首尾两点保持不变.
///
/// 长度为 0 的折线 (所有点重合) 会得到 `n` 个相同的点.
///
/// # 注意
///
/// 调用方需保证 `points.len() >= 2` 且 `n >= 2`.
pub fn resample_polyline(points: &[Point3], n: usize) -> Vec<Point3> {
    debug_assert!(points.len() >= 2 && n >= 2);

    // 累计弧长, `cum[i]` 为第 i 个点处的弧长.
    let mut cum = Vec::with_capacity(points.len());
    cum.push(0.0);
    for (a, b) in points.iter().tuple_windows() {
        let last = *cum.last().unwrap_or(&0.0);
        cum.push(last + point_distance(a, b));
    }
    let total = cum[cum.len() - 1];
    if total <= 0.0 {
        return vec![points[0]; n];
    }

    let mut ans = Vec::with_capacity(n);
    let mut seg = 0usize;
    for k in 0..n {
        let target = total * k as f64 / (n - 1) as f64;
        while seg + 2 < points.len() && cum[seg + 1] < target {
            seg += 1;
        }
        let seg_len = cum[seg + 1] - cum[seg];
        let t = if seg_len > 0.0 {
            ((target - cum[seg]) / seg_len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        ans.push(lerp_point(&points[seg], &points[seg + 1], t));
    }
    // 消除累计误差.
    ans[n - 1] = points[points.len() - 1];
    ans
}

/// 将纤维转换为 `3 x N` 矩阵, 每列一个点.
pub fn to_matrix(points: &[Point3]) -> Array2<f64> {
    Array2::from_shape_fn((3, points.len()), |(r, c)| points[c][r])
}

/// 将 `3 x N` 矩阵转换回点序列.
pub fn from_matrix(m: ArrayView2<f64>) -> Vec<Point3> {
    debug_assert_eq!(m.nrows(), 3);
    m.axis_iter(Axis(1))
        .map(|col| [col[0], col[1], col[2]])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// 四分之一圆弧, 半径为 `r`.
    fn arc(r: f64, n: usize) -> Vec<Point3> {
        (0..n)
            .map(|i| {
                let t = std::f64::consts::FRAC_PI_2 * i as f64 / (n - 1) as f64;
                [r * t.cos(), r * t.sin(), 0.0]
            })
            .collect()
    }

    #[test]
    fn test_resample_straight_line_is_uniform() {
        let line = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [10.0, 0.0, 0.0]];
        let out = resample_polyline(&line, 11);
        assert_eq!(out.len(), 11);
        for (i, p) in out.iter().enumerate() {
            assert!(f64_eq(p[0], i as f64));
            assert!(f64_eq(p[1], 0.0));
        }
    }

    #[test]
    fn test_resample_keeps_endpoints() {
        let c = arc(5.0, 7);
        let out = resample_polyline(&c, 30);
        assert_eq!(out[0], c[0]);
        assert_eq!(out[29], c[6]);
    }

    #[test]
    fn test_resample_round_trip_length() {
        let c = arc(20.0, 20);
        let len = polyline_length(&c);
        let up = resample_polyline(&c, 50);
        let back = resample_polyline(&up, 20);
        assert_eq!(back.len(), 20);
        let len2 = polyline_length(&back);
        assert!((len - len2).abs() / len < 0.01, "{len} vs {len2}");
    }

    #[test]
    fn test_resample_degenerate() {
        // 两点重合, 长度为 0.
        let p = vec![[1.0, 2.0, 3.0], [1.0, 2.0, 3.0]];
        let out = resample_polyline(&p, 4);
        assert!(out.iter().all(|q| *q == [1.0, 2.0, 3.0]));

        // 中间存在重复点.
        let p = vec![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let out = resample_polyline(&p, 3);
        assert!(f64_eq(out[1][0], 1.0));
    }

    #[test]
    fn test_matrix_conversion() {
        let p = vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let m = to_matrix(&p);
        assert_eq!(m.shape(), &[3, 2]);
        assert_eq!(m[(2, 1)], 6.0);
        assert_eq!(from_matrix(m.view()), p);
    }
}
