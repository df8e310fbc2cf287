//! 聚类运行统计.

use std::time::{Duration, Instant};

/// ablation/benchmark 计时器.
///
/// 支持多段计时并累加.
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器. 初始化时会视为已经开始计时.
    #[inline]
    fn new() -> Self {
        Self {
            consumed: Duration::ZERO,
            since: Instant::now(),
        }
    }

    /// 开始计时.
    #[inline]
    fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束计时, 并将这一区间的时间累加. 返回本轮计时时长.
    #[inline]
    fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    /// 累计时间 (以微秒为单位).
    #[inline]
    fn total_us(&self) -> u64 {
        self.consumed.as_micros() as u64
    }
}

/// 一组聚类配置的运行统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 运行次数.
    runs: u64,

    /// 聚类本身花费的总时间.
    cluster_time: AccTimer,

    /// 整个任务花费的总时间.
    real_time: AccTimer,

    /// 最耗时的一次聚类.
    most: Option<Duration>,

    /// 最后一次运行的输出簇个数.
    clusters: usize,

    /// 最后一次运行丢弃的纤维个数.
    discarded: usize,

    /// 最后一次运行每层存活的簇个数.
    levels: Vec<usize>,

    /// 出错的运行次数.
    failed: u64,
}

impl Profile {
    /// 初始化.
    #[inline]
    pub fn new() -> Self {
        Self {
            runs: 0,
            cluster_time: AccTimer::new(),
            real_time: AccTimer::new(),
            most: None,
            clusters: 0,
            discarded: 0,
            levels: vec![],
            failed: 0,
        }
    }

    /// 开始一次聚类计时.
    #[inline]
    pub fn run_start(&mut self) {
        self.runs += 1;
        self.cluster_time.start();
    }

    /// 结束一次聚类计时.
    #[inline]
    pub fn run_elapsed(&mut self) {
        let d = self.cluster_time.elapsed();
        self.most = Some(self.most.map_or(d, |m| m.max(d)));
    }

    /// 记录一次运行结果.
    pub fn record(&mut self, clusters: usize, discarded: usize, levels: &[usize]) {
        self.clusters = clusters;
        self.discarded = discarded;
        self.levels = levels.to_vec();
    }

    /// 记录一次出错的运行.
    #[inline]
    pub fn count_failed(&mut self) {
        self.failed += 1;
    }

    /// 结束全部计时.
    #[inline]
    pub fn finish(mut self) -> Self {
        self.real_time.elapsed();
        self
    }

    #[inline]
    pub fn runs(&self) -> u64 {
        self.runs
    }

    #[inline]
    pub fn failed(&self) -> u64 {
        self.failed
    }

    #[inline]
    pub fn clusters(&self) -> usize {
        self.clusters
    }

    #[inline]
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    #[inline]
    pub fn levels(&self) -> &[usize] {
        &self.levels
    }

    /// 以微秒为单位获得聚类总时间.
    #[inline]
    pub fn cluster_time_us(&self) -> u64 {
        self.cluster_time.total_us()
    }

    /// 以微秒为单位获得任务总时间.
    #[inline]
    pub fn real_time_us(&self) -> u64 {
        self.real_time.total_us()
    }

    /// 以微秒为单位获得平均每次聚类的时间.
    pub fn avg_cluster_time_us(&self) -> Option<f64> {
        match self.runs {
            0 => None,
            runs => Some(self.cluster_time_us() as f64 / runs as f64),
        }
    }

    /// 最耗时的一次聚类. 没有运行时返回 `None`.
    #[inline]
    pub fn most_time_consuming(&self) -> Option<Duration> {
        self.most
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}
