//! 纤维束多尺度递归聚类.
//!
//! 在严格递增的距离阶梯上由细到粗逐层聚类. 每一层:
//!
//! 1. 将待分配纤维贪心地分配到最近的簇 (多度量距离之和不超过本层阈值),
//!   否则以该纤维为种子新建簇;
//! 2. 舍弃过小的簇, 并只保留最大的若干个簇. 非最后一层时, 被舍弃簇的纤维回到待分配池,
//!   在下一层 (更粗的阈值) 继续参与聚类; 最后一层时, 它们被计入丢弃;
//! 3. 合并中心线彼此足够接近的重复簇.
//!
//! 存活的簇作为已知簇进入下一层, 仍可吸收新的纤维.

mod filter;
mod level;

pub use filter::TractClusteringFilter;

use crate::metric::flipped;
use ndarray::{Array2, ArrayView2};
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 纤维簇.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cluster {
    /// 中心线 (`3 x N`), 为方向校正后成员矩阵的运行均值.
    h: Array2<f64>,

    /// 成员纤维在输入纤维束中的索引, 按加入顺序排列.
    indices: Vec<usize>,

    /// 成员个数.
    n: usize,

    /// 单成员簇的来源纤维索引.
    f_id: Option<usize>,
}

impl Cluster {
    /// 以单根纤维 `index` (矩阵为 `m`) 为种子新建簇.
    pub(crate) fn seed(index: usize, m: ArrayView2<f64>) -> Self {
        Self {
            h: m.to_owned(),
            indices: vec![index],
            n: 1,
            f_id: Some(index),
        }
    }

    /// 以外部给定的中心线新建空簇.
    pub(crate) fn known(centroid: Array2<f64>) -> Self {
        Self {
            h: centroid,
            indices: vec![],
            n: 0,
            f_id: None,
        }
    }

    /// 加入纤维 `index`, 并更新中心线运行均值. `flip` 为 `true` 时 `m` 先反向.
    pub(crate) fn add(&mut self, index: usize, m: ArrayView2<f64>, flip: bool) {
        self.push_member(index);
        let m = if flip { flipped(m) } else { m };
        let w = 1.0 / self.n as f64;
        self.h.zip_mut_with(&m, |h, t| *h += (t - *h) * w);
    }

    /// 只记录成员, 不更新中心线. 用于外部给定的固定中心线.
    pub(crate) fn push_member(&mut self, index: usize) {
        self.indices.push(index);
        self.n += 1;
        self.f_id = match self.n {
            1 => Some(index),
            _ => None,
        };
    }

    /// 并入另一个簇. 中心线按成员个数加权平均, `flip` 为 `true` 时 `other` 的中心线先反向.
    pub(crate) fn absorb(&mut self, other: Cluster, flip: bool) {
        let total = self.n + other.n;
        if total == 0 {
            return;
        }
        let w = other.n as f64 / total as f64;
        let h = if flip {
            flipped(other.h.view())
        } else {
            other.h.view()
        };
        self.h.zip_mut_with(&h, |a, b| *a += (b - *a) * w);
        self.indices.extend(other.indices);
        self.n = total;
        self.f_id = None;
    }

    /// 中心线.
    #[inline]
    pub fn centroid(&self) -> ArrayView2<f64> {
        self.h.view()
    }

    /// 成员纤维索引.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// 成员个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    /// 是否没有成员.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// 单成员簇的来源纤维索引.
    #[inline]
    pub fn f_id(&self) -> Option<usize> {
        self.f_id
    }

    /// 消费自我, 获得成员纤维索引.
    #[inline]
    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    /// 按成员个数降序比较. 个数相同时, 最小成员索引较小者在前.
    pub fn cmp_by_size_desc(a: &Self, b: &Self) -> Ordering {
        b.n.cmp(&a.n)
            .then_with(|| a.indices.iter().min().cmp(&b.indices.iter().min()))
    }
}

#[cfg(test)]
mod tests {
    use super::Cluster;
    use crate::fiber::to_matrix;
    use crate::metric::flipped;
    use std::cmp::Ordering;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_running_mean() {
        let a = to_matrix(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        let b = to_matrix(&[[0.0, 2.0, 0.0], [2.0, 2.0, 0.0]]);
        let mut c = Cluster::seed(3, a.view());
        assert_eq!(c.f_id(), Some(3));

        // 反向加入的纤维先被翻转.
        c.add(7, flipped(b.view()), true);
        assert_eq!(c.len(), 2);
        assert_eq!(c.indices(), &[3, 7]);
        assert_eq!(c.f_id(), None);
        assert!(f64_eq(c.centroid()[(1, 0)], 1.0));
        assert!(f64_eq(c.centroid()[(0, 1)], 2.0));
    }

    #[test]
    fn test_absorb() {
        let a = to_matrix(&[[0.0, 0.0, 0.0], [3.0, 0.0, 0.0]]);
        let b = to_matrix(&[[0.0, 3.0, 0.0], [3.0, 3.0, 0.0]]);
        let mut x = Cluster::seed(0, a.view());
        x.add(1, a.view(), false);
        let y = Cluster::seed(2, b.view());
        x.absorb(y, false);
        assert_eq!(x.len(), 3);
        assert!(f64_eq(x.centroid()[(1, 0)], 1.0));
        assert_eq!(x.into_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_known_cluster_is_fixed() {
        let a = to_matrix(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        let mut k = Cluster::known(a.clone());
        assert!(k.is_empty());
        k.push_member(4);
        k.push_member(5);
        assert_eq!(k.len(), 2);
        assert_eq!(k.centroid(), a.view());
    }

    #[test]
    fn test_cmp_by_size_desc() {
        let a = to_matrix(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        let mut big = Cluster::seed(5, a.view());
        big.add(6, a.view(), false);
        let small = Cluster::seed(1, a.view());
        let small2 = Cluster::seed(0, a.view());
        assert_eq!(Cluster::cmp_by_size_desc(&big, &small), Ordering::Less);
        assert_eq!(Cluster::cmp_by_size_desc(&small2, &small), Ordering::Less);
    }
}
