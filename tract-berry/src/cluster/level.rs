//! 单层聚类的各个步骤. 簇集合按值传入, 按值返回.

use super::Cluster;
use crate::metric::{combined_distance, DistanceMetric};
use crate::TractResult;
use ndarray::Array2;
use ordered_float::NotNan;

/// 单层参数.
pub(super) struct LevelParams<'a> {
    pub(super) metrics: &'a [Box<dyn DistanceMetric>],
    pub(super) distance: f64,
    pub(super) min_cluster_size: usize,
    pub(super) max_clusters: Option<usize>,
    pub(super) merge_threshold: Option<f64>,
    pub(super) last: bool,
}

/// 单层结果.
#[derive(Debug, Default)]
pub(super) struct LevelOutcome {
    /// 存活的簇, 按成员个数降序.
    pub(super) clusters: Vec<Cluster>,

    /// 回到待分配池的纤维 (最后一层时为空).
    pub(super) released: Vec<usize>,

    /// 被丢弃的纤维 (仅最后一层).
    pub(super) discarded: Vec<usize>,
}

/// 找到与 `m` 距离最近的簇, 返回其下标, 距离与方向.
fn nearest(
    clusters: &[Cluster],
    m: &Array2<f64>,
    metrics: &[Box<dyn DistanceMetric>],
) -> TractResult<Option<(usize, f64, bool)>> {
    let mut best: Option<(usize, NotNan<f64>, bool)> = None;
    for (k, c) in clusters.iter().enumerate() {
        let (d, flip) = combined_distance(metrics, c.centroid(), m.view())?;
        // NaN 距离永远不匹配.
        let Ok(d) = NotNan::new(d) else { continue };
        if best.map_or(true, |(_, bd, _)| d < bd) {
            best = Some((k, d, flip));
        }
    }
    Ok(best.map(|(k, d, flip)| (k, d.into_inner(), flip)))
}

/// 贪心分配. 按 `pool` 顺序, 每根纤维并入距离不超过 `distance` 的最近簇,
/// 否则以它为种子新建簇. `carried` 为上一层存活的簇.
pub(super) fn assign(
    matrices: &[Array2<f64>],
    pool: &[usize],
    carried: Vec<Cluster>,
    metrics: &[Box<dyn DistanceMetric>],
    distance: f64,
) -> TractResult<Vec<Cluster>> {
    let mut clusters = carried;
    for &i in pool {
        let m = &matrices[i];
        match nearest(&clusters, m, metrics)? {
            Some((k, d, flip)) if d <= distance => clusters[k].add(i, m.view(), flip),
            _ => clusters.push(Cluster::seed(i, m.view())),
        }
    }
    Ok(clusters)
}

/// 将每根纤维分配到距离不超过 `distance` 的最近固定簇. 返回未匹配的纤维.
pub(super) fn assign_known(
    matrices: &[Array2<f64>],
    clusters: &mut [Cluster],
    metrics: &[Box<dyn DistanceMetric>],
    distance: f64,
) -> TractResult<Vec<usize>> {
    let mut unmatched = vec![];
    for (i, m) in matrices.iter().enumerate() {
        match nearest(clusters, m, metrics)? {
            Some((k, d, _)) if d <= distance => clusters[k].push_member(i),
            _ => unmatched.push(i),
        }
    }
    Ok(unmatched)
}

/// 舍弃成员少于 `min_cluster_size` 的簇, 并只保留最大的 `max_clusters` 个簇.
///
/// 返回按成员个数降序排列的存活簇, 以及被舍弃簇的全部纤维.
pub(super) fn prune(
    mut clusters: Vec<Cluster>,
    min_cluster_size: usize,
    max_clusters: Option<usize>,
) -> (Vec<Cluster>, Vec<usize>) {
    clusters.sort_by(Cluster::cmp_by_size_desc);
    let limit = max_clusters.unwrap_or(usize::MAX);
    let mut kept = Vec::with_capacity(clusters.len().min(limit));
    let mut rejected = vec![];
    for c in clusters {
        if c.is_empty() {
            continue;
        }
        if c.len() >= min_cluster_size && kept.len() < limit {
            kept.push(c);
        } else {
            rejected.extend(c.into_indices());
        }
    }
    (kept, rejected)
}

/// 反复合并中心线距离不超过 `threshold` 的簇对, 直到不再有可合并的簇.
pub(super) fn merge_duplicates(
    mut clusters: Vec<Cluster>,
    metrics: &[Box<dyn DistanceMetric>],
    threshold: f64,
) -> TractResult<Vec<Cluster>> {
    'restart: loop {
        for i in 0..clusters.len() {
            for j in (i + 1)..clusters.len() {
                let (d, flip) =
                    combined_distance(metrics, clusters[i].centroid(), clusters[j].centroid())?;
                if d <= threshold {
                    let other = clusters.remove(j);
                    clusters[i].absorb(other, flip);
                    continue 'restart;
                }
            }
        }
        break;
    }
    clusters.sort_by(Cluster::cmp_by_size_desc);
    Ok(clusters)
}

/// 执行一层聚类.
pub(super) fn cluster_level(
    matrices: &[Array2<f64>],
    pool: &[usize],
    carried: Vec<Cluster>,
    params: &LevelParams,
) -> TractResult<LevelOutcome> {
    let clusters = assign(matrices, pool, carried, params.metrics, params.distance)?;
    let (mut clusters, rejected) =
        prune(clusters, params.min_cluster_size, params.max_clusters);
    if let Some(threshold) = params.merge_threshold {
        clusters = merge_duplicates(clusters, params.metrics, threshold)?;
    }

    let outcome = if params.last {
        LevelOutcome {
            clusters,
            released: vec![],
            discarded: rejected,
        }
    } else {
        LevelOutcome {
            clusters,
            released: rejected,
            discarded: vec![],
        }
    };
    Ok(outcome)
}
