//! 程序运行函数.

use crate::profile::Profile;
use crate::result::AblationResult;
use log::{error, info};
use std::thread;
use tract_berry::prelude::*;
use utils::phantom::{self, PhantomSpec};

/// 每组配置重复聚类的次数.
const REPEAT: usize = 5;

/// 一组聚类配置.
#[derive(Copy, Clone)]
struct LadderConfig {
    name: &'static str,
    distances: &'static [f64],
    metrics: fn() -> Metrics,
    min_cluster_size: usize,
}

fn mean() -> Metrics {
    vec![Box::new(EuclideanMean::new())]
}

fn mean_length() -> Metrics {
    vec![Box::new(EuclideanMean::new()), Box::new(Length::with_scale(0.2))]
}

fn max_angles() -> Metrics {
    vec![
        Box::new(EuclideanMax::new()),
        Box::new(InnerAngles::with_scale(0.1)),
    ]
}

const CONFIGS: [LadderConfig; 4] = [
    LadderConfig {
        name: "single-10",
        distances: &[10.0],
        metrics: mean,
        min_cluster_size: 1,
    },
    LadderConfig {
        name: "ladder-2-5-10",
        distances: &[2.0, 5.0, 10.0],
        metrics: mean,
        min_cluster_size: 10,
    },
    LadderConfig {
        name: "mean+length",
        distances: &[5.0, 10.0],
        metrics: mean_length,
        min_cluster_size: 10,
    },
    LadderConfig {
        name: "max+angles",
        distances: &[5.0, 10.0, 20.0],
        metrics: max_angles,
        min_cluster_size: 10,
    },
];

/// 以 `config` 重复聚类 `bundle`.
fn run_config(config: LadderConfig, bundle: &FiberBundle) -> Profile {
    let mut profile = Profile::new();
    let mut filter = TractClusteringFilter::new();
    filter.set_tractogram(bundle.clone());
    filter.set_distances(config.distances.to_vec());
    filter.set_metrics((config.metrics)());
    filter.set_min_cluster_size(config.min_cluster_size);
    filter.set_merge_duplicate_threshold(Some(0.0));

    for _ in 0..REPEAT {
        profile.run_start();
        let r = filter.update();
        profile.run_elapsed();
        match r {
            Ok(()) => profile.record(
                filter.out_clusters().len(),
                filter.discarded_clusters(),
                &filter.level_cluster_counts(),
            ),
            Err(e) => {
                error!("{}: {e}", config.name);
                profile.count_failed();
            }
        }
    }
    profile.finish()
}

/// 在分区标签体上运行带方向探测的静态 tractometry.
fn report_label_parcellation(spec: &PhantomSpec, bundle: &FiberBundle) {
    let labels = phantom::label_volume(spec.geometry(), spec.split_x(0.5));
    let tm = Tractometry::new()
        .with_num_points(20)
        .with_flip_probe(Some(FlipProbe::label_convention()));
    match tm.static_resampling(&labels, bundle, None) {
        Ok(p) => info!(
            "Label parcellation flipped: {}, profile: {:?}",
            p.flip_parcellation,
            p.mean_profile()
        ),
        Err(e) => error!("Label tractometry failed: {e}"),
    }
}

/// 在合成纤维束上运行静态 tractometry, 并将 `N x F` 采样矩阵写入 `.npy` 文件.
fn export_static_profile(spec: &PhantomSpec, bundle: &FiberBundle) {
    let volume = phantom::gradient_volume(spec.geometry());
    let tm = Tractometry::new().with_num_points(20);
    let profile = match tm.static_resampling(&volume, bundle, None) {
        Ok(p) => p,
        Err(e) => {
            error!("Static tractometry failed: {e}");
            return;
        }
    };
    info!("Static mean profile: {:?}", profile.mean_profile());

    let Some(path) = utils::loader::output_file_with("static_profile.npy") else {
        error!("Cannot determine output directory");
        return;
    };
    if let Some(dir) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            error!("Cannot create {}: {e}", dir.display());
            return;
        }
    }
    match ndarray_npy::write_npy(&path, &profile.values) {
        Ok(()) => info!("Static profile written to {}", path.display()),
        Err(e) => error!("Writing {} failed: {e}", path.display()),
    }
}

/// 实际运行.
pub fn run() -> AblationResult {
    let spec = PhantomSpec::default();
    let bundle = spec.bundle().expect("Phantom generation error");
    info!(
        "Running ablation studies on {} fibers with {} threads...",
        bundle.len(),
        utils::cpus().min(CONFIGS.len())
    );

    let result = thread::scope(|s| {
        let bundle = &bundle;
        let handles = CONFIGS.map(|c| s.spawn(move || run_config(c, bundle)));
        CONFIGS
            .iter()
            .map(|c| c.name)
            .zip(
                handles
                    .into_iter()
                    .map(|th| th.join().expect("Thread joining error")),
            )
            .collect()
    });

    report_label_parcellation(&spec, &bundle);
    export_static_profile(&spec, &bundle);
    result
}
