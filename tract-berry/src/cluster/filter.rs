use super::level::{self, LevelParams};
use super::Cluster;
use crate::consts::{DEFAULT_CLUSTER_SIZE, DEFAULT_NUM_POINTS, MIN_FIBER_POINTS};
use crate::metric::{DistanceMetric, EuclideanMean, Metrics};
use crate::{FiberBundle, MaskVolume, TractError, TractResult};
use log::{debug, info, warn};
use ndarray::Array2;

/// 多尺度递归聚类过滤器.
///
/// 用法: 依次调用各个 `set_*` 方法完成配置, 再调用 [`TractClusteringFilter::update`],
/// 最后通过 `out_*` 方法读取结果. 每次 `update` 都会清空上一次的结果.
///
/// # 输出
///
/// 输出簇按成员个数降序排列 (使用外部中心线时保持输入顺序). 对于每根输入纤维,
/// 它要么恰好出现在一个输出簇中, 要么被计入丢弃, 二者必居其一.
pub struct TractClusteringFilter {
    tractogram: FiberBundle,
    in_centroids: Option<FiberBundle>,
    distances: Vec<f64>,
    metrics: Metrics,
    num_points: usize,
    min_cluster_size: usize,
    max_clusters: Option<usize>,
    merge_duplicate_threshold: Option<f64>,
    filter_mask: Option<MaskVolume>,
    overlap_threshold: f64,
    do_resampling: bool,

    out_clusters: Vec<Cluster>,
    out_centroids: FiberBundle,
    out_tractograms: Vec<FiberBundle>,
    discarded: Vec<usize>,
    filtered_clusters: Vec<Cluster>,
    level_clusters: Vec<Vec<Cluster>>,
}

impl Default for TractClusteringFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TractClusteringFilter {
    /// 以默认配置初始化: 单层阶梯 `[DEFAULT_CLUSTER_SIZE]`, 度量 [`EuclideanMean`],
    /// 重采样到 `DEFAULT_NUM_POINTS` 个点, 最小簇大小 1, 不限簇个数, 不合并, 不过滤.
    pub fn new() -> Self {
        Self {
            tractogram: FiberBundle::empty(),
            in_centroids: None,
            distances: vec![DEFAULT_CLUSTER_SIZE],
            metrics: vec![Box::new(EuclideanMean::new())],
            num_points: DEFAULT_NUM_POINTS,
            min_cluster_size: 1,
            max_clusters: None,
            merge_duplicate_threshold: None,
            filter_mask: None,
            overlap_threshold: 0.0,
            do_resampling: true,
            out_clusters: vec![],
            out_centroids: FiberBundle::empty(),
            out_tractograms: vec![],
            discarded: vec![],
            filtered_clusters: vec![],
            level_clusters: vec![],
        }
    }

    /// 设置待聚类的纤维束.
    pub fn set_tractogram(&mut self, tractogram: FiberBundle) {
        self.tractogram = tractogram;
    }

    /// 设置外部中心线. 设置后不再发现新簇, 只把纤维匹配到这些中心线上.
    pub fn set_in_centroids(&mut self, centroids: Option<FiberBundle>) {
        self.in_centroids = centroids;
    }

    /// 设置严格递增的距离阶梯 (单位与度量一致).
    pub fn set_distances(&mut self, distances: Vec<f64>) {
        self.distances = distances;
    }

    /// 设置距离度量. 总距离为各度量缩放距离之和.
    pub fn set_metrics(&mut self, metrics: Metrics) {
        self.metrics = metrics;
    }

    /// 追加一个距离度量.
    pub fn add_metric<M: DistanceMetric + 'static>(&mut self, metric: M) {
        self.metrics.push(Box::new(metric));
    }

    /// 设置重采样点数.
    pub fn set_num_points(&mut self, num_points: usize) {
        self.num_points = num_points;
    }

    /// 设置最小簇大小. 0 与 1 等价.
    pub fn set_min_cluster_size(&mut self, min_cluster_size: usize) {
        self.min_cluster_size = min_cluster_size;
    }

    /// 设置每层最多保留的簇个数. `None` 代表不限.
    pub fn set_max_clusters(&mut self, max_clusters: Option<usize>) {
        self.max_clusters = max_clusters;
    }

    /// 设置重复簇合并阈值.
    ///
    /// `None` 代表不合并; `Some(0.0)` 代表使用最细距离的一半.
    pub fn set_merge_duplicate_threshold(&mut self, threshold: Option<f64>) {
        self.merge_duplicate_threshold = threshold;
    }

    /// 设置过滤掩膜. 成员点落在掩膜内的比例低于重叠阈值的簇不会输出.
    pub fn set_filter_mask(&mut self, mask: Option<MaskVolume>) {
        self.filter_mask = mask;
    }

    /// 设置掩膜重叠阈值, 取值范围 `[0, 1]`.
    pub fn set_overlap_threshold(&mut self, threshold: f64) {
        self.overlap_threshold = threshold;
    }

    /// 点数不一致时是否重采样. 为 `false` 且点数不一致时, `update` 返回错误.
    pub fn set_do_resampling(&mut self, do_resampling: bool) {
        self.do_resampling = do_resampling;
    }

    /// 输出簇.
    pub fn out_clusters(&self) -> &[Cluster] {
        &self.out_clusters
    }

    /// 输出簇的中心线, 每个簇一根纤维.
    pub fn out_centroids(&self) -> &FiberBundle {
        &self.out_centroids
    }

    /// 每个输出簇的原始成员纤维.
    pub fn out_tractograms(&self) -> &[FiberBundle] {
        &self.out_tractograms
    }

    /// 每个输出簇的成员纤维索引.
    pub fn out_fiber_indices(&self) -> Vec<Vec<usize>> {
        self.out_clusters
            .iter()
            .map(|c| c.indices().to_vec())
            .collect()
    }

    /// 被丢弃的纤维个数.
    pub fn discarded_clusters(&self) -> usize {
        self.discarded.len()
    }

    /// 被丢弃的纤维索引, 升序.
    pub fn discarded_fiber_indices(&self) -> &[usize] {
        &self.discarded
    }

    /// 因掩膜重叠率不足而没有输出的簇. 它们的纤维同时计入丢弃.
    pub fn filtered_clusters(&self) -> &[Cluster] {
        &self.filtered_clusters
    }

    /// 每层结束时存活的簇 (合并之后, 掩膜过滤之前), 由细到粗.
    ///
    /// 使用外部中心线时只有一层.
    pub fn level_clusters(&self) -> &[Vec<Cluster>] {
        &self.level_clusters
    }

    /// 每层结束时存活的簇个数.
    pub fn level_cluster_counts(&self) -> Vec<usize> {
        self.level_clusters.iter().map(Vec::len).collect()
    }

    fn clear_outputs(&mut self) {
        self.out_clusters.clear();
        self.out_centroids = FiberBundle::empty();
        self.out_tractograms.clear();
        self.discarded.clear();
        self.filtered_clusters.clear();
        self.level_clusters.clear();
    }

    fn validate(&self) -> TractResult<()> {
        if self.distances.is_empty() {
            return Err(TractError::EmptyDistances);
        }
        let mut prev = 0.0;
        for (i, &d) in self.distances.iter().enumerate() {
            if !d.is_finite() || d <= prev {
                return Err(TractError::InvalidDistances(i));
            }
            prev = d;
        }
        if self.metrics.is_empty() {
            return Err(TractError::NoMetric);
        }
        if self.num_points < MIN_FIBER_POINTS {
            return Err(TractError::TooFewPoints(self.num_points, MIN_FIBER_POINTS));
        }
        if !(0.0..=1.0).contains(&self.overlap_threshold) {
            return Err(TractError::InvalidParameter("overlap_threshold"));
        }
        if let Some(t) = self.merge_duplicate_threshold {
            if !t.is_finite() || t < 0.0 {
                return Err(TractError::InvalidParameter("merge_duplicate_threshold"));
            }
        }
        if self.max_clusters == Some(0) {
            return Err(TractError::InvalidParameter("max_clusters"));
        }
        Ok(())
    }

    /// 实际使用的合并阈值.
    fn merge_threshold(&self) -> Option<f64> {
        let d0 = self.distances[0];
        match self.merge_duplicate_threshold {
            None => None,
            Some(t) if t == 0.0 => Some(d0 * 0.5),
            Some(t) => {
                if t > d0 {
                    warn!("Merge threshold {t} exceeds finest distance {d0}");
                }
                Some(t)
            }
        }
    }

    /// 得到点数为 `num_points` 的纤维矩阵.
    fn matrices_of(&self, bundle: &FiberBundle) -> TractResult<Vec<Array2<f64>>> {
        if bundle.is_resampled_to(self.num_points) || !self.do_resampling {
            return bundle.to_matrices(self.num_points);
        }
        debug!("Resampling {} fibers to {} points", bundle.len(), self.num_points);
        bundle.resampled(self.num_points)?.to_matrices(self.num_points)
    }

    /// 执行聚类.
    ///
    /// 配置非法时立即返回 `Err`, 并且不产生任何输出.
    /// 纤维束为空时返回 `Ok`, 输出为空.
    pub fn update(&mut self) -> TractResult<()> {
        self.clear_outputs();
        self.validate()?;
        if self.tractogram.is_empty() {
            info!("Empty tractogram, nothing to cluster");
            return Ok(());
        }

        let matrices = self.matrices_of(&self.tractogram)?;
        let merge_threshold = self.merge_threshold();
        info!(
            "Clustering {} fibers, distances {:?}, {} metric(s)",
            matrices.len(),
            self.distances,
            self.metrics.len()
        );

        let known = match &self.in_centroids {
            Some(centroids) => Some(self.matrices_of(centroids)?),
            None => None,
        };
        let (clusters, discarded) = match known {
            Some(centroids) => self.match_known(&matrices, centroids)?,
            None => self.run_ladder(&matrices, merge_threshold)?,
        };
        self.discarded = discarded;
        self.collect_outputs(clusters)?;
        self.discarded.sort_unstable();

        info!(
            "{} clusters, {} discarded fibers, {} clusters filtered by mask",
            self.out_clusters.len(),
            self.discarded.len(),
            self.filtered_clusters.len()
        );
        Ok(())
    }

    /// 逐层聚类, 返回最后一层的存活簇与丢弃的纤维.
    fn run_ladder(
        &mut self,
        matrices: &[Array2<f64>],
        merge_threshold: Option<f64>,
    ) -> TractResult<(Vec<Cluster>, Vec<usize>)> {
        let mut pool: Vec<usize> = (0..matrices.len()).collect();
        let mut clusters = vec![];
        let mut discarded = vec![];
        let levels = self.distances.len();
        for (l, &distance) in self.distances.iter().enumerate() {
            let params = LevelParams {
                metrics: &self.metrics,
                distance,
                min_cluster_size: self.min_cluster_size,
                max_clusters: self.max_clusters,
                merge_threshold,
                last: l + 1 == levels,
            };
            let outcome = level::cluster_level(matrices, &pool, clusters, &params)?;
            debug!(
                "Level {l} (distance {distance}): {} pooled, {} clusters, {} released",
                pool.len(),
                outcome.clusters.len(),
                outcome.released.len()
            );
            self.level_clusters.push(outcome.clusters.clone());
            clusters = outcome.clusters;
            pool = outcome.released;
            discarded.extend(outcome.discarded);
        }
        debug_assert!(pool.is_empty());
        Ok((clusters, discarded))
    }

    /// 把纤维匹配到外部中心线上. 输出簇保持中心线的输入顺序.
    fn match_known(
        &mut self,
        matrices: &[Array2<f64>],
        centroids: Vec<Array2<f64>>,
    ) -> TractResult<(Vec<Cluster>, Vec<usize>)> {
        let mut clusters: Vec<Cluster> = centroids.into_iter().map(Cluster::known).collect();
        let mut discarded =
            level::assign_known(matrices, &mut clusters, &self.metrics, self.distances[0])?;

        // 按大小筛选后恢复输入顺序.
        let mut ranked: Vec<(usize, Cluster)> = clusters.into_iter().enumerate().collect();
        ranked.sort_by(|(_, a), (_, b)| Cluster::cmp_by_size_desc(a, b));
        let limit = self.max_clusters.unwrap_or(usize::MAX);
        let mut kept = vec![];
        for (i, c) in ranked {
            if c.is_empty() {
                continue;
            }
            if c.len() >= self.min_cluster_size && kept.len() < limit {
                kept.push((i, c));
            } else {
                discarded.extend(c.into_indices());
            }
        }
        kept.sort_by_key(|(i, _)| *i);
        let kept: Vec<Cluster> = kept.into_iter().map(|(_, c)| c).collect();
        self.level_clusters.push(kept.clone());
        Ok((kept, discarded))
    }

    /// 按掩膜过滤并生成输出.
    fn collect_outputs(&mut self, clusters: Vec<Cluster>) -> TractResult<()> {
        let mut centroids = vec![];
        for c in clusters {
            if !self.passes_mask(&c) {
                self.discarded.extend_from_slice(c.indices());
                self.filtered_clusters.push(c);
                continue;
            }
            centroids.push(c.centroid().to_owned());
            self.out_tractograms.push(self.tractogram.subset(c.indices()));
            self.out_clusters.push(c);
        }
        self.out_centroids = FiberBundle::from_matrices(centroids.iter().map(|m| m.view()))?;
        Ok(())
    }

    /// 簇成员点落在掩膜内的比例是否达到重叠阈值. 未设置掩膜时总是通过.
    fn passes_mask(&self, c: &Cluster) -> bool {
        let Some(ref mask) = self.filter_mask else {
            return true;
        };
        let points = c
            .indices()
            .iter()
            .flat_map(|&i| self.tractogram.fiber(i).iter());
        mask.overlap(points)
            .is_some_and(|o| o >= self.overlap_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{EuclideanMax, Length};
    use crate::volume::Geometry;
    use crate::{ErrorKind, Point3};
    use ndarray::Array3;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// 沿 x 轴的直线纤维, 起点为 `(0, y, z)`.
    fn line(y: f64, z: f64, n: usize, reversed: bool) -> Vec<Point3> {
        let mut f: Vec<Point3> = (0..n).map(|i| [i as f64, y, z]).collect();
        if reversed {
            f.reverse();
        }
        f
    }

    fn identical(count: usize) -> FiberBundle {
        FiberBundle::new((0..count).map(|_| line(0.0, 0.0, 20, false)).collect()).unwrap()
    }

    /// 若干组平行直线, 组间相距 30, 组内相距 0.1, 奇数纤维反向.
    fn groups(sizes: &[usize]) -> FiberBundle {
        let mut fibers = vec![];
        for (g, &size) in sizes.iter().enumerate() {
            for k in 0..size {
                let y = g as f64 * 30.0 + k as f64 * 0.1;
                fibers.push(line(y, 0.0, 15, fibers.len() % 2 == 1));
            }
        }
        FiberBundle::new(fibers).unwrap()
    }

    fn init_logger() {
        let _ = simple_logger::init_with_level(log::Level::Debug);
    }

    fn assert_partition(filter: &TractClusteringFilter, total: usize) {
        let mut seen = vec![0usize; total];
        for c in filter.out_fiber_indices() {
            for i in c {
                seen[i] += 1;
            }
        }
        for &i in filter.discarded_fiber_indices() {
            seen[i] += 1;
        }
        assert!(seen.iter().all(|&s| s == 1), "{seen:?}");
    }

    #[test]
    fn test_identical_fibers() {
        let mut filter = TractClusteringFilter::new();
        filter.set_tractogram(identical(10));
        filter.set_distances(vec![5.0, 10.0]);
        filter.set_min_cluster_size(1);
        filter.update().unwrap();

        assert_eq!(filter.out_clusters().len(), 1);
        assert_eq!(filter.out_clusters()[0].len(), 10);
        assert_eq!(filter.discarded_clusters(), 0);
        assert_eq!(filter.out_centroids().len(), 1);
        assert_eq!(filter.out_centroids().num_points_of(0), DEFAULT_NUM_POINTS);
        // 输出原始纤维, 而非重采样结果.
        assert_eq!(filter.out_tractograms()[0].len(), 10);
        assert_eq!(filter.out_tractograms()[0].num_points_of(0), 20);
        assert_partition(&filter, 10);
    }

    #[test]
    fn test_undersized_cluster_discarded() {
        let mut filter = TractClusteringFilter::new();
        filter.set_tractogram(identical(10));
        filter.set_distances(vec![5.0, 10.0]);
        filter.set_min_cluster_size(11);
        filter.update().unwrap();

        assert!(filter.out_clusters().is_empty());
        assert!(filter.out_centroids().is_empty());
        assert_eq!(filter.discarded_clusters(), 10);
        assert_partition(&filter, 10);
    }

    #[test]
    fn test_groups_and_partition() {
        init_logger();
        let bundle = groups(&[6, 4, 1]);
        let mut filter = TractClusteringFilter::new();
        filter.set_tractogram(bundle);
        filter.set_distances(vec![2.0, 5.0]);
        filter.set_min_cluster_size(2);
        filter.update().unwrap();

        let sizes: Vec<usize> = filter.out_clusters().iter().map(Cluster::len).collect();
        assert_eq!(sizes, vec![6, 4]);
        assert_eq!(filter.discarded_fiber_indices(), &[10]);
        assert_eq!(filter.level_cluster_counts(), vec![2, 2]);
        assert_partition(&filter, 11);

        // 反向纤维不影响中心线方向: 中心线 y 坐标约为组均值.
        let c = filter.out_centroids().fiber(0);
        assert!((c[0][1] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_released_fibers_join_coarser_level() {
        // 两根纤维相距 3: 细层各自成簇且过小, 粗层合为一簇.
        let bundle = FiberBundle::new(vec![line(0.0, 0.0, 10, false), line(3.0, 0.0, 10, false)])
            .unwrap();
        let mut filter = TractClusteringFilter::new();
        filter.set_tractogram(bundle);
        filter.set_distances(vec![1.0, 4.0]);
        filter.set_min_cluster_size(2);
        filter.update().unwrap();

        assert_eq!(filter.level_cluster_counts(), vec![0, 1]);
        assert_eq!(filter.out_fiber_indices(), vec![vec![0, 1]]);
        assert_eq!(filter.discarded_clusters(), 0);
    }

    #[test]
    fn test_deterministic() {
        let mut filter = TractClusteringFilter::new();
        filter.set_tractogram(groups(&[5, 3, 3, 1]));
        filter.set_distances(vec![1.0, 3.0, 40.0]);
        filter.update().unwrap();
        let indices = filter.out_fiber_indices();
        let centroids = filter.out_centroids().clone();

        filter.update().unwrap();
        assert_eq!(filter.out_fiber_indices(), indices);
        assert_eq!(filter.out_centroids(), &centroids);
    }

    #[test]
    fn test_min_cluster_size_monotone() {
        let bundle = groups(&[1, 2, 3, 5, 8]);
        let mut last = usize::MAX;
        for min in 1..10 {
            let mut filter = TractClusteringFilter::new();
            filter.set_tractogram(bundle.clone());
            filter.set_distances(vec![2.0, 6.0]);
            filter.set_min_cluster_size(min);
            filter.update().unwrap();
            let count = filter.out_clusters().len();
            assert!(count <= last, "min {min}: {count} > {last}");
            assert_partition(&filter, bundle.len());
            last = count;
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn test_max_clusters() {
        let mut filter = TractClusteringFilter::new();
        filter.set_tractogram(groups(&[3, 5, 2]));
        filter.set_distances(vec![2.0]);
        filter.set_max_clusters(Some(2));
        filter.update().unwrap();

        let sizes: Vec<usize> = filter.out_clusters().iter().map(Cluster::len).collect();
        assert_eq!(sizes, vec![5, 3]);
        assert_eq!(filter.discarded_fiber_indices(), &[8, 9]);
    }

    #[test]
    fn test_max_clusters_released_to_coarser_level() {
        init_logger();
        // 5 根纤维位于 y = 0 ~ 0.4, 2 根位于 y = 5.0 和 5.1.
        let mut fibers: Vec<_> = (0..5)
            .map(|k| line(k as f64 * 0.1, 0.0, 15, false))
            .collect();
        fibers.push(line(5.0, 0.0, 15, false));
        fibers.push(line(5.1, 0.0, 15, false));
        let bundle = FiberBundle::new(fibers).unwrap();

        // 单层时超出个数上限的簇直接丢弃.
        let mut filter = TractClusteringFilter::new();
        filter.set_tractogram(bundle);
        filter.set_distances(vec![2.0]);
        filter.set_max_clusters(Some(1));
        filter.update().unwrap();
        assert_eq!(filter.out_fiber_indices(), vec![vec![0, 1, 2, 3, 4]]);
        assert_eq!(filter.discarded_fiber_indices(), &[5, 6]);

        // 两层时它们回到待分配池, 在粗层并入存活的簇.
        filter.set_distances(vec![2.0, 8.0]);
        filter.update().unwrap();
        assert_eq!(filter.level_cluster_counts(), vec![1, 1]);
        assert_eq!(filter.level_clusters()[0][0].indices(), &[0, 1, 2, 3, 4]);
        assert_eq!(filter.out_fiber_indices(), vec![vec![0, 1, 2, 3, 4, 5, 6]]);
        assert_eq!(filter.discarded_clusters(), 0);
        assert_partition(&filter, 7);

        // 中心线为全部成员的均值.
        let c = filter.out_centroids().fiber(0);
        assert!(c.iter().all(|p| f64_eq(p[1], 11.1 / 7.0)));
    }

    #[test]
    fn test_merge_duplicates() {
        init_logger();
        // 两组相距 3. 单层距离 1 时各自成簇, 合并阈值 4 时合为一簇.
        let fibers = vec![
            line(0.0, 0.0, 10, false),
            line(3.0, 0.0, 10, true),
            line(0.0, 0.0, 10, false),
            line(3.0, 0.0, 10, false),
        ];
        let bundle = FiberBundle::new(fibers).unwrap();

        let mut filter = TractClusteringFilter::new();
        filter.set_tractogram(bundle.clone());
        filter.set_distances(vec![1.0]);
        filter.update().unwrap();
        assert_eq!(filter.out_clusters().len(), 2);

        filter.set_merge_duplicate_threshold(Some(4.0));
        filter.update().unwrap();
        assert_eq!(filter.out_clusters().len(), 1);
        let c = filter.out_centroids().fiber(0);
        assert!(c.iter().all(|p| f64_eq(p[1], 1.5)));

        // 0 代表最细距离的一半, 不足以合并.
        filter.set_merge_duplicate_threshold(Some(0.0));
        filter.update().unwrap();
        assert_eq!(filter.out_clusters().len(), 2);
    }

    #[test]
    fn test_in_centroids() {
        let bundle = groups(&[3, 2, 1]);
        let centroids = FiberBundle::new(vec![
            line(30.0, 0.0, 15, false),
            line(0.0, 0.0, 15, true),
            line(90.0, 0.0, 15, false),
        ])
        .unwrap();

        let mut filter = TractClusteringFilter::new();
        filter.set_tractogram(bundle);
        filter.set_in_centroids(Some(centroids));
        filter.set_distances(vec![1.0]);
        filter.update().unwrap();

        // 保持输入顺序, 空簇不输出; 第 3 组没有中心线, 被丢弃.
        assert_eq!(filter.out_fiber_indices(), vec![vec![3, 4], vec![0, 1, 2]]);
        assert_eq!(filter.discarded_fiber_indices(), &[5]);
        let c = filter.out_centroids().fiber(0);
        assert!(f64_eq(c[0][1], 30.0));
    }

    #[test]
    fn test_filter_mask() {
        // 掩膜只覆盖 y < 5 的区域.
        let geometry = Geometry::new((1, 64, 16), [1.0, 1.0, 1.0], [0.0, 0.0, 0.0]).unwrap();
        let data = Array3::from_shape_fn((1, 64, 16), |(_, y, _)| u8::from(y < 5));
        let mask = MaskVolume::from_array(data, geometry).unwrap();

        let mut filter = TractClusteringFilter::new();
        filter.set_tractogram(groups(&[2, 3]));
        filter.set_distances(vec![2.0]);
        filter.set_filter_mask(Some(mask));
        filter.set_overlap_threshold(0.9);
        filter.update().unwrap();

        assert_eq!(filter.out_fiber_indices(), vec![vec![0, 1]]);
        assert_eq!(filter.filtered_clusters().len(), 1);
        assert_eq!(filter.discarded_fiber_indices(), &[2, 3, 4]);
        assert_partition(&filter, 5);
    }

    #[test]
    fn test_multiple_metrics() {
        let mut filter = TractClusteringFilter::new();
        filter.set_tractogram(groups(&[3, 3]));
        filter.set_metrics(vec![Box::new(EuclideanMax::new())]);
        filter.add_metric(Length::with_scale(0.5));
        filter.set_distances(vec![2.0]);
        filter.update().unwrap();
        assert_eq!(filter.out_clusters().len(), 2);
    }

    #[test]
    fn test_empty_tractogram() {
        let mut filter = TractClusteringFilter::new();
        filter.update().unwrap();
        assert!(filter.out_clusters().is_empty());
        assert!(filter.out_centroids().is_empty());
        assert_eq!(filter.discarded_clusters(), 0);
    }

    #[test]
    fn test_configuration_errors() {
        let mut filter = TractClusteringFilter::new();
        filter.set_tractogram(identical(3));

        filter.set_distances(vec![]);
        assert_eq!(filter.update().unwrap_err(), TractError::EmptyDistances);
        filter.set_distances(vec![5.0, 5.0]);
        assert_eq!(filter.update().unwrap_err(), TractError::InvalidDistances(1));
        filter.set_distances(vec![0.0]);
        assert_eq!(filter.update().unwrap_err(), TractError::InvalidDistances(0));
        filter.set_distances(vec![5.0]);

        filter.set_metrics(vec![]);
        assert_eq!(filter.update().unwrap_err(), TractError::NoMetric);
        filter.set_metrics(vec![Box::new(EuclideanMean::new())]);

        filter.set_num_points(1);
        let err = filter.update().unwrap_err();
        assert_eq!(err, TractError::TooFewPoints(1, 2));
        assert_eq!(err.kind(), ErrorKind::Configuration);
        filter.set_num_points(DEFAULT_NUM_POINTS);

        filter.set_do_resampling(false);
        assert_eq!(
            filter.update().unwrap_err(),
            TractError::PointCountMismatch(DEFAULT_NUM_POINTS, 20)
        );
        assert!(filter.out_clusters().is_empty());

        filter.set_num_points(20);
        filter.update().unwrap();
        assert_eq!(filter.out_clusters().len(), 1);
    }
}
