//! 纤维束数据结构.
//!
//! 纤维是有序的三维折线, 纤维束是纤维的集合. 每个纤维点附带一个颜色,
//! 仅用于可视化反馈.

mod resample;

pub use resample::{
    from_matrix, point_distance, point_distance_squared, polyline_length, resample_polyline,
    to_matrix,
};

use crate::consts::palette::WHITE;
use crate::consts::MIN_FIBER_POINTS;
use crate::{Point3, Rgb, TractError, TractResult};
use ndarray::{Array2, ArrayView2};

/// 纤维束. 每根纤维至少包含两个点.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawFiberBundle"))]
pub struct FiberBundle {
    fibers: Vec<Vec<Point3>>,

    /// 与 `fibers` 形状完全一致.
    colors: Vec<Vec<Rgb>>,
}

/// 反序列化时的未校验形式, 校验后才转换为纤维束.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawFiberBundle {
    fibers: Vec<Vec<Point3>>,
    colors: Vec<Vec<Rgb>>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawFiberBundle> for FiberBundle {
    type Error = TractError;

    fn try_from(raw: RawFiberBundle) -> TractResult<Self> {
        let mut ans = Self::new(raw.fibers)?;
        let count = ans.fibers.len().max(raw.colors.len());
        if let Some(i) = (0..count)
            .find(|&i| ans.fibers.get(i).map(Vec::len) != raw.colors.get(i).map(Vec::len))
        {
            return Err(TractError::ColorMismatch(i));
        }
        ans.colors = raw.colors;
        Ok(ans)
    }
}

impl FiberBundle {
    /// 由一组折线构建纤维束. 所有点初始颜色为白色.
    ///
    /// 如果某根纤维不足两个点, 则返回 `Err(TractError::MalformedFiber)`.
    pub fn new(fibers: Vec<Vec<Point3>>) -> TractResult<Self> {
        if let Some((i, f)) = fibers
            .iter()
            .enumerate()
            .find(|(_, f)| f.len() < MIN_FIBER_POINTS)
        {
            return Err(TractError::MalformedFiber(i, f.len()));
        }
        let colors = fibers.iter().map(|f| vec![WHITE; f.len()]).collect();
        Ok(Self { fibers, colors })
    }

    /// 由一组 `3 x N` 矩阵构建纤维束.
    pub fn from_matrices<'a, I>(matrices: I) -> TractResult<Self>
    where
        I: IntoIterator<Item = ArrayView2<'a, f64>>,
    {
        Self::new(matrices.into_iter().map(from_matrix).collect())
    }

    /// 空纤维束.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// 纤维个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    /// 是否不含任何纤维.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// 获取第 `index` 根纤维. 越界时 panic.
    #[inline]
    pub fn fiber(&self, index: usize) -> &[Point3] {
        &self.fibers[index]
    }

    /// 获取第 `index` 根纤维. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&[Point3]> {
        self.fibers.get(index).map(Vec::as_slice)
    }

    /// 按顺序迭代所有纤维.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[Point3]> {
        self.fibers.iter().map(Vec::as_slice)
    }

    /// 获取第 `index` 根纤维的逐点颜色. 越界时 panic.
    #[inline]
    pub fn colors(&self, index: usize) -> &[Rgb] {
        &self.colors[index]
    }

    /// 第 `index` 根纤维的点数. 越界时 panic.
    #[inline]
    pub fn num_points_of(&self, index: usize) -> usize {
        self.fibers[index].len()
    }

    /// 每根纤维的点数.
    pub fn point_counts(&self) -> Vec<usize> {
        self.fibers.iter().map(Vec::len).collect()
    }

    /// 全部纤维点数之和.
    pub fn total_points(&self) -> usize {
        self.fibers.iter().map(Vec::len).sum()
    }

    /// 第 `index` 根纤维的长度 (单位: 毫米). 越界时 panic.
    #[inline]
    pub fn fiber_length(&self, index: usize) -> f64 {
        polyline_length(&self.fibers[index])
    }

    /// 所有纤维的长度.
    pub fn fiber_lengths(&self) -> Vec<f64> {
        self.fibers.iter().map(|f| polyline_length(f)).collect()
    }

    /// 是否每根纤维都恰好有 `n` 个点. 空纤维束视为满足.
    #[inline]
    pub fn is_resampled_to(&self, n: usize) -> bool {
        self.fibers.iter().all(|f| f.len() == n)
    }

    /// 检查重采样点数.
    #[inline]
    fn check_num_points(n: usize) -> TractResult<()> {
        if n < MIN_FIBER_POINTS {
            Err(TractError::TooFewPoints(n, MIN_FIBER_POINTS))
        } else {
            Ok(())
        }
    }

    /// 就地按弧长将每根纤维重采样为 `n` 个点.
    ///
    /// 如果所有纤维已经是 `n` 个点, 则不做任何事并返回 `Ok(false)`.
    /// 否则**全部**纤维都会被重采样 (以保持索引对应关系), 颜色重置为白色, 返回 `Ok(true)`.
    pub fn resample_to_num_points(&mut self, n: usize) -> TractResult<bool> {
        Self::check_num_points(n)?;
        if self.is_resampled_to(n) {
            return Ok(false);
        }
        for f in self.fibers.iter_mut() {
            *f = resample_polyline(f, n);
        }
        self.reset_colors();
        Ok(true)
    }

    /// 获得每根纤维都重采样为 `n` 个点的深拷贝. 不修改 `self`.
    pub fn resampled(&self, n: usize) -> TractResult<Self> {
        let mut ans = self.clone();
        ans.resample_to_num_points(n)?;
        Ok(ans)
    }

    /// 将每根纤维转换为 `3 x n` 矩阵.
    ///
    /// 如果存在点数不为 `n` 的纤维, 则返回 `Err(TractError::PointCountMismatch)`.
    pub fn to_matrices(&self, n: usize) -> TractResult<Vec<Array2<f64>>> {
        if let Some(f) = self.fibers.iter().find(|f| f.len() != n) {
            return Err(TractError::PointCountMismatch(n, f.len()));
        }
        Ok(self.fibers.iter().map(|f| to_matrix(f)).collect())
    }

    /// 提取由 `indices` 给出的纤维组成的新纤维束, 保持颜色. 越界时 panic.
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            fibers: indices.iter().map(|&i| self.fibers[i].clone()).collect(),
            colors: indices.iter().map(|&i| self.colors[i].clone()).collect(),
        }
    }

    /// 为单个纤维点着色. 越界时返回 `false`.
    pub fn color_point(&mut self, fiber: usize, point: usize, rgb: Rgb) -> bool {
        match self.colors.get_mut(fiber).and_then(|c| c.get_mut(point)) {
            Some(c) => {
                *c = rgb;
                true
            }
            None => false,
        }
    }

    /// 将所有点重置为白色.
    pub fn reset_colors(&mut self) {
        self.colors = self.fibers.iter().map(|f| vec![WHITE; f.len()]).collect();
    }

    /// 包围盒 `(min, max)`. 空纤维束返回 `None`.
    pub fn bounding_box(&self) -> Option<(Point3, Point3)> {
        let mut it = self.fibers.iter().flatten();
        let first = *it.next()?;
        Some(it.fold((first, first), |(mut lo, mut hi), p| {
            for d in 0..3 {
                lo[d] = lo[d].min(p[d]);
                hi[d] = hi[d].max(p[d]);
            }
            (lo, hi)
        }))
    }

    /// 包围盒对角线长度 (单位: 毫米). 空纤维束为 0.
    pub fn diagonal_length(&self) -> f64 {
        self.bounding_box()
            .map_or(0.0, |(lo, hi)| point_distance(&lo, &hi))
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};
    }
}

/// 并发操作部分
#[cfg(feature = "rayon")]
impl FiberBundle {
    /// 借助 `rayon`, 并行地完成 [`FiberBundle::resample_to_num_points`].
    pub fn par_resample_to_num_points(&mut self, n: usize) -> TractResult<bool> {
        Self::check_num_points(n)?;
        if self.is_resampled_to(n) {
            return Ok(false);
        }
        self.fibers
            .par_iter_mut()
            .for_each(|f| *f = resample_polyline(f, n));
        self.reset_colors();
        Ok(true)
    }
}
