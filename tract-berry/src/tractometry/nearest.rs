use super::{flip, Tractometry};
use crate::consts::palette::parcel_color;
use crate::fiber::point_distance_squared;
use crate::metric::EuclideanMean;
use crate::volume::Sampler;
use crate::{FiberBundle, Point3, TractClusteringFilter, TractError, TractResult};
use log::{debug, info, warn};
use ordered_float::OrderedFloat;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 单个纤维点的分配结果.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointAssignment {
    /// 最近中心线的下标.
    pub centroid: usize,

    /// 方向校正后的 bin 编号.
    pub bin: usize,
}

/// 最近中心线点模式的结果.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CentroidProfile {
    /// 每个 bin 收集到的全部有效采样值. 越界采样被跳过.
    pub bins: Vec<Vec<f64>>,

    /// 方向已对齐参考纤维的中心线.
    pub centroids: FiberBundle,

    /// 与输入纤维束逐点对应的分配结果.
    pub assignments: Vec<Vec<PointAssignment>>,

    /// 输入纤维束 (未重采样) 按 bin 着色后的副本.
    pub bundle: FiberBundle,

    /// 中心线收敛循环实际使用的尝试次数.
    pub attempts: u32,

    /// 是否整体反转了 bin 编号.
    pub flip_parcellation: bool,
}

impl CentroidProfile {
    /// 逐 bin 平均值曲线, 空 bin 为 `NaN`.
    pub fn mean_profile(&self) -> Vec<f64> {
        self.bins
            .iter()
            .map(|b| match b.len() {
                0 => f64::NAN,
                n => b.iter().sum::<f64>() / n as f64,
            })
            .collect()
    }
}

impl Tractometry {
    /// 在逐渐增大的聚类距离上聚类, 直到中心线个数落在 `[1, max_centroids]` 内.
    ///
    /// 最后一次尝试强制限制簇个数. 返回中心线与尝试次数.
    fn find_centroids(&self, working: &FiberBundle) -> TractResult<(FiberBundle, u32)> {
        let mut filter = TractClusteringFilter::new();
        filter.set_tractogram(working.clone());
        filter.set_num_points(self.num_points);
        filter.set_metrics(vec![Box::new(EuclideanMean::new())]);
        filter.set_min_cluster_size(1);

        let attempts = self.retry.max_attempts;
        let mut attempt = 0;
        let mut size = self.cluster_size;
        loop {
            let last = attempt + 1 == attempts;
            filter.set_distances(vec![size]);
            filter.set_merge_duplicate_threshold(Some(size));
            filter.set_max_clusters(last.then_some(self.max_centroids));
            filter.update()?;

            let count = filter.out_centroids().len();
            debug!("Attempt {attempt}: cluster size {size:.2} mm, {count} centroids");
            if (1..=self.max_centroids).contains(&count) || last {
                if count > self.max_centroids || count == 0 {
                    warn!("Centroid count {count} did not converge to [1, {}]", self.max_centroids);
                }
                let centroids = filter.out_centroids().clone();
                if centroids.is_empty() {
                    return Err(TractError::EmptyBundle);
                }
                return Ok((centroids, attempt + 1));
            }
            attempt += 1;
            size *= 1.0 + self.retry.growth;
        }
    }

    /// 最近中心线点 tractometry.
    ///
    /// 先在纤维束的重采样副本上聚类出至多 `max_centroids` 条中心线,
    /// 中心线方向对齐参考纤维 (`ref_fib` 的第一根纤维, 未给出时为第一条中心线).
    /// 然后对输入纤维束的每个原始点, 找到所有中心线上的最近点,
    /// 该点的索引即 bin, 并把该点的采样值加入对应 bin.
    ///
    /// # 错误
    ///
    /// 1. 参数非法时返回配置错误.
    /// 2. `bundle` 或给出的 `ref_fib` 为空时返回 `Err(TractError::EmptyBundle)`.
    pub fn nearest_centroid_point<S: Sampler>(
        &self,
        volume: &S,
        bundle: &FiberBundle,
        ref_fib: Option<&FiberBundle>,
    ) -> TractResult<CentroidProfile> {
        self.validate()?;
        if bundle.is_empty() {
            return Err(TractError::EmptyBundle);
        }

        let n = self.num_points;
        let working = bundle.resampled(n)?;
        let (centroids, attempts) = self.find_centroids(&working)?;
        info!("{} centroids after {attempts} attempt(s)", centroids.len());

        let reference = match ref_fib {
            Some(r) => self.external_reference(r)?,
            None => centroids.fiber(0).to_vec(),
        };
        let flip_parcellation = self.flip_parcellation(volume, &reference);

        let mut oriented: Vec<Vec<Point3>> = Vec::with_capacity(centroids.len());
        for c in centroids.iter() {
            let mut c = c.to_vec();
            if flip(&reference, &c)? {
                c.reverse();
            }
            oriented.push(c);
        }

        let mut bins = vec![vec![]; n];
        let mut assignments = Vec::with_capacity(bundle.len());
        let mut colored = bundle.clone();
        for (i, fiber) in bundle.iter().enumerate() {
            let mut row = Vec::with_capacity(fiber.len());
            for (j, p) in fiber.iter().enumerate() {
                let a = nearest_point(&oriented, p, |k| self.bin_of(k, flip_parcellation));
                if let Some(v) = volume.interpolate(p) {
                    bins[a.bin].push(v);
                }
                colored.color_point(i, j, parcel_color(a.bin));
                row.push(a);
            }
            assignments.push(row);
        }

        Ok(CentroidProfile {
            bins,
            centroids: FiberBundle::new(oriented)?,
            assignments,
            bundle: colored,
            attempts,
            flip_parcellation,
        })
    }
}

/// 所有中心线上与 `p` 最近的点. `bin_of` 把点索引映射为 bin 编号.
fn nearest_point<F>(centroids: &[Vec<Point3>], p: &Point3, bin_of: F) -> PointAssignment
where
    F: Fn(usize) -> usize,
{
    let (centroid, k) = centroids
        .iter()
        .enumerate()
        .flat_map(|(c, pts)| pts.iter().enumerate().map(move |(k, q)| (c, k, q)))
        .min_by_key(|&(_, _, q)| OrderedFloat(point_distance_squared(p, q)))
        .map_or((0, 0), |(c, k, _)| (c, k));
    PointAssignment {
        centroid,
        bin: bin_of(k),
    }
}
