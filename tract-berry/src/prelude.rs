//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx3d, Point3, Rgb};
pub use crate::{ErrorKind, TractError, TractResult};

pub use crate::fiber::{resample_polyline, FiberBundle};
pub use crate::volume::{Geometry, GridAttr, MaskVolume, OpenVolumeError, Sampler, ScalarVolume};

pub use crate::metric::{
    combined_distance, DistanceMetric, EuclideanMax, EuclideanMean, EuclideanStd, InnerAngles,
    Length, Metrics, ScalarMap,
};

pub use crate::cluster::{Cluster, TractClusteringFilter};

pub use crate::tractometry::{
    flip, CentroidProfile, FlipProbe, PointAssignment, RetryPolicy, StaticProfile, Tractometry,
};

pub use crate::consts::palette::parcel_color;
pub use crate::consts::{DEFAULT_CLUSTER_SIZE, DEFAULT_MAX_CENTROIDS, DEFAULT_NUM_POINTS};
