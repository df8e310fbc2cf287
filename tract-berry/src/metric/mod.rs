//! 纤维距离度量.
//!
//! 每个度量比较两个形状一致的 `3 x N` 矩阵 (两根重采样后的纤维, 或纤维与中心线).
//! 纤维方向是任意的, 因此度量需同时尝试正向与反向两种点对应关系,
//! 返回较小的距离并报告是否选择了反向.

mod euclid;
mod scalar_map;
mod shape;

pub use euclid::{EuclideanMax, EuclideanMean, EuclideanStd};
pub use scalar_map::ScalarMap;
pub use shape::{InnerAngles, Length};

use crate::{TractError, TractResult};
use either::Either;
use ndarray::{s, ArrayView1, ArrayView2, Axis};

/// 距离度量.
pub trait DistanceMetric {
    /// 度量名称, 仅用于日志.
    fn name(&self) -> &'static str;

    /// 作用于原始距离的乘性缩放系数.
    fn scale(&self) -> f64;

    /// 计算未缩放的距离, 以及是否选择了反向对应.
    ///
    /// 调用方保证 `s` 与 `t` 形状一致, 都为 `3 x N` 且 `N >= 1`.
    fn raw_distance(&self, s: ArrayView2<f64>, t: ArrayView2<f64>) -> (f64, bool);

    /// 计算缩放后的距离, 以及是否选择了反向对应.
    ///
    /// 如果 `s` 与 `t` 形状不一致或不是 `3 x N` 矩阵, 则返回 `Err`.
    fn calculate_distance(
        &self,
        s: ArrayView2<f64>,
        t: ArrayView2<f64>,
    ) -> TractResult<(f64, bool)> {
        check_shapes(s, t)?;
        let (d, flipped) = self.raw_distance(s, t);
        Ok((d * self.scale(), flipped))
    }
}

/// 一组度量.
pub type Metrics = Vec<Box<dyn DistanceMetric>>;

/// 检查两个矩阵是否形状一致且为 `3 x N` (`N >= 1`).
#[inline]
pub(crate) fn check_shapes(s: ArrayView2<f64>, t: ArrayView2<f64>) -> TractResult<()> {
    if s.dim() != t.dim() || s.nrows() != 3 || s.ncols() == 0 {
        return Err(TractError::ShapeMismatch(s.dim(), t.dim()));
    }
    Ok(())
}

/// 多个度量的缩放距离之和. 方向以第一个度量为准.
///
/// `metrics` 为空时返回 `Err(TractError::NoMetric)`.
pub fn combined_distance(
    metrics: &[Box<dyn DistanceMetric>],
    s: ArrayView2<f64>,
    t: ArrayView2<f64>,
) -> TractResult<(f64, bool)> {
    let (first, rest) = metrics.split_first().ok_or(TractError::NoMetric)?;
    let (mut d, flipped) = first.calculate_distance(s, t)?;
    for m in rest {
        d += m.calculate_distance(s, t)?.0;
    }
    Ok((d, flipped))
}

/// 按列迭代矩阵, `flip` 为 `true` 时从最后一列开始.
#[inline]
pub(crate) fn columns<'a>(
    m: ArrayView2<'a, f64>,
    flip: bool,
) -> impl Iterator<Item = ArrayView1<'a, f64>> {
    let it = m.reversed_axes().into_outer_iter();
    if flip {
        Either::Right(it.rev())
    } else {
        Either::Left(it)
    }
}

/// 获得列顺序反转的视图.
#[inline]
pub fn flipped(m: ArrayView2<f64>) -> ArrayView2<f64> {
    m.slice_move(s![.., ..;-1])
}

/// 逐点欧几里得距离, `flip` 为 `true` 时 `t` 反向对应.
pub(crate) fn pointwise(s: ArrayView2<f64>, t: ArrayView2<f64>, flip: bool) -> Vec<f64> {
    columns(s, false)
        .zip(columns(t, flip))
        .map(|(a, b)| {
            a.iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y).powi(2))
                .sum::<f64>()
                .sqrt()
        })
        .collect()
}

/// 逐点欧几里得距离, 以及是否选择了反向对应. 哪个方向的距离之和更小就选哪个.
pub(crate) fn oriented_pointwise(s: ArrayView2<f64>, t: ArrayView2<f64>) -> (Vec<f64>, bool) {
    let direct = pointwise(s, t, false);
    let reversed = pointwise(s, t, true);
    if direct.iter().sum::<f64>() > reversed.iter().sum::<f64>() {
        (reversed, true)
    } else {
        (direct, false)
    }
}
