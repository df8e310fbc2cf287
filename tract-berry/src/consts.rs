//! 通用常量.

use crate::Rgb;

/// 默认的纤维重采样点数.
pub const DEFAULT_NUM_POINTS: usize = 12;

/// 纤维至少需要的点数.
pub const MIN_FIBER_POINTS: usize = 2;

/// 默认的 tractometry 最大中心线个数.
pub const DEFAULT_MAX_CENTROIDS: usize = 1;

/// 默认的 tractometry 聚类距离 (单位: 毫米).
pub const DEFAULT_CLUSTER_SIZE: f64 = 10.0;

/// 中心线个数收敛循环的默认最大尝试次数.
pub const RETRY_ATTEMPTS: u32 = 30;

/// 中心线个数收敛循环中, 每次尝试在初始聚类距离基础上增长的比例.
pub const RETRY_GROWTH: f64 = 0.2;

/// 分区标签体约定下的翻转探测阈值: 探测点标签值大于它时, 整体翻转分区方向.
pub const FLIP_PROBE_THRESHOLD: f64 = 1.5;

/// 翻转探测点在参考纤维上的相对位置.
pub const FLIP_PROBE_POSITION: f64 = 0.5;

/// 分区 (bin) 着色调色板.
pub mod palette {
    use super::Rgb;

    /// 分类调色板. bin 数量超过调色板长度时循环使用.
    pub const CATEGORICAL: [Rgb; 12] = [
        [166, 206, 227],
        [31, 120, 180],
        [178, 223, 138],
        [51, 160, 44],
        [251, 154, 153],
        [227, 26, 28],
        [253, 191, 111],
        [255, 127, 0],
        [202, 178, 214],
        [106, 61, 154],
        [255, 255, 153],
        [177, 89, 40],
    ];

    /// 未着色纤维点的默认颜色.
    pub const WHITE: Rgb = [255, 255, 255];

    /// 获得第 `bin` 个分区的颜色.
    #[inline]
    pub const fn parcel_color(bin: usize) -> Rgb {
        CATEGORICAL[bin % CATEGORICAL.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::palette::*;

    #[test]
    fn test_parcel_color_cycles() {
        assert_eq!(parcel_color(0), CATEGORICAL[0]);
        assert_eq!(parcel_color(12), CATEGORICAL[0]);
        assert_eq!(parcel_color(13), CATEGORICAL[1]);
        assert_ne!(parcel_color(0), parcel_color(1));
    }
}
