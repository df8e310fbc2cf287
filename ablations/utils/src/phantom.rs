//! 合成纤维束与标量体, 代替真实数据集.
//!
//! 所有扰动都由索引决定, 相同参数总是生成相同的数据.

use std::f64::consts::PI;
use tract_berry::prelude::*;

/// 合成纤维束参数.
#[derive(Copy, Clone, Debug)]
pub struct PhantomSpec {
    /// 纤维组个数.
    pub groups: usize,

    /// 每组纤维个数.
    pub fibers_per_group: usize,

    /// 每根纤维的点数 (各组略有不同).
    pub points: usize,

    /// 纤维沿 x 轴的长度 (单位: 毫米).
    pub length: f64,

    /// 相邻组在 y 方向的间距 (单位: 毫米).
    pub separation: f64,

    /// 组内扰动幅度 (单位: 毫米).
    pub jitter: f64,
}

impl Default for PhantomSpec {
    fn default() -> Self {
        Self {
            groups: 4,
            fibers_per_group: 50,
            points: 40,
            length: 60.0,
            separation: 15.0,
            jitter: 1.5,
        }
    }
}

impl PhantomSpec {
    /// 第 `g` 组第 `k` 根纤维. 奇数纤维反向.
    fn fiber(&self, g: usize, k: usize) -> Vec<Point3> {
        let n = self.points + g % 3;
        let seed = (g * self.fibers_per_group + k) as f64;
        let dy = self.jitter * (seed * 12.9898).sin();
        let dz = self.jitter * (seed * 78.233).cos();
        let bend = 5.0 + g as f64;
        let mut f: Vec<Point3> = (0..n)
            .map(|i| {
                let t = i as f64 / (n - 1) as f64;
                [
                    10.0 + t * self.length,
                    10.0 + g as f64 * self.separation + dy,
                    10.0 + bend * (PI * t).sin() + dz,
                ]
            })
            .collect();
        if k % 2 == 1 {
            f.reverse();
        }
        f
    }

    /// 生成纤维束. 纤维按组依次排列.
    pub fn bundle(&self) -> TractResult<FiberBundle> {
        let fibers = (0..self.groups)
            .flat_map(|g| (0..self.fibers_per_group).map(move |k| (g, k)))
            .map(|(g, k)| self.fiber(g, k))
            .collect();
        FiberBundle::new(fibers)
    }

    /// 纤维上相对位置 `t` 处的 x 坐标.
    pub fn split_x(&self, t: f64) -> f64 {
        10.0 + t * self.length
    }

    /// 覆盖全部纤维的 1 毫米各向同性网格.
    pub fn geometry(&self) -> Geometry {
        let x = (self.length + 20.0).ceil() as usize;
        let y = (self.groups as f64 * self.separation + 20.0).ceil() as usize;
        let z = (self.jitter * 2.0 + self.groups as f64 + 30.0).ceil() as usize;
        Geometry::unit((z, y, x))
    }
}

/// 值等于 x 坐标的梯度体.
pub fn gradient_volume(geometry: Geometry) -> ScalarVolume {
    ScalarVolume::from_fn(geometry, |p| p[0] as f32)
}

/// 分区标签体: 前半段 (x 较小) 为 1, 后半段为 2.
pub fn label_volume(geometry: Geometry, split_x: f64) -> ScalarVolume {
    ScalarVolume::from_fn(geometry, |p| if p[0] < split_x { 1.0 } else { 2.0 })
}

#[cfg(test)]
mod tests {
    use super::PhantomSpec;
    use tract_berry::prelude::*;

    #[test]
    fn test_label_volume_drives_flip_probe() {
        let spec = PhantomSpec::default();
        let bundle = spec.bundle().unwrap();
        let tm = Tractometry::new()
            .with_num_points(20)
            .with_flip_probe(Some(FlipProbe::label_convention()));

        let early = super::label_volume(spec.geometry(), spec.split_x(0.75));
        assert_eq!(early.interpolate(&[20.0, 20.0, 12.0]), Some(1.0));
        assert_eq!(early.interpolate(&[65.0, 20.0, 12.0]), Some(2.0));
        let p = tm.static_resampling(&early, &bundle, None).unwrap();
        assert!(!p.flip_parcellation);

        // 中点落在标签 2 区域时整体反转.
        let late = super::label_volume(spec.geometry(), spec.split_x(0.25));
        let p = tm.static_resampling(&late, &bundle, None).unwrap();
        assert!(p.flip_parcellation);
    }

    #[test]
    fn test_phantom_inside_geometry() {
        let spec = PhantomSpec::default();
        let bundle = spec.bundle().unwrap();
        assert_eq!(bundle.len(), spec.groups * spec.fibers_per_group);
        assert_eq!(bundle, spec.bundle().unwrap());

        let vol = super::gradient_volume(spec.geometry());
        assert!(bundle
            .iter()
            .flatten()
            .all(|p| vol.interpolate(p).is_some()));
    }
}
