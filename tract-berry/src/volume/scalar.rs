use super::{Geometry, GridAttr, OpenVolumeError, Sampler};
use crate::{Idx3d, Point3, TractError, TractResult};
use ndarray::{Array3, ArrayView3, Ix3};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};
use num::Float;
use std::ops::Index;
use std::path::Path;

/// 线性插值.
#[inline]
fn lerp<T: Float>(a: T, b: T, t: T) -> T {
    a + (b - a) * t
}

/// 标量体, 例如 FA 图或分区标签图. 体素值以 `f32` 保存.
///
/// 该结构对 tractometry 只读.
#[derive(Debug, Clone)]
pub struct ScalarVolume {
    geometry: Geometry,
    data: Array3<f32>,
}

impl GridAttr for ScalarVolume {
    #[inline]
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }
}

impl Index<Idx3d> for ScalarVolume {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl ScalarVolume {
    /// 打开 nii 文件格式的标量体. `path` 为 nii 文件的本地路径.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, OpenVolumeError> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let geometry =
            Geometry::from_header(obj.header()).map_err(OpenVolumeError::InvalidGeometry)?;

        let data = obj.into_volume().into_ndarray::<f32>()?;
        let ndim = data.ndim();
        let data = data
            .into_dimensionality::<Ix3>()
            .map_err(|_| OpenVolumeError::NotThreeDimensional(ndim))?;

        // [W, H, z] -> [z, H, W].
        let data = data
            .permuted_axes([2, 1, 0])
            .as_standard_layout()
            .into_owned();
        Self::from_array(data, geometry).map_err(OpenVolumeError::InvalidGeometry)
    }

    /// 由 `(z, y, x)` 顺序组织的数据直接创建标量体.
    ///
    /// 如果 `data` 形状与 `geometry` 不一致, 则返回 `Err`.
    pub fn from_array(data: Array3<f32>, geometry: Geometry) -> TractResult<Self> {
        if data.dim() != geometry.shape {
            return Err(TractError::InvalidParameter("shape"));
        }
        Ok(Self { geometry, data })
    }

    /// 以函数 `f(x, y, z)` 在每个体素中心的物理坐标处取值, 构建标量体.
    pub fn from_fn<F>(geometry: Geometry, f: F) -> Self
    where
        F: Fn(Point3) -> f32,
    {
        let data = Array3::from_shape_fn(geometry.shape, |(z, y, x)| {
            f([
                geometry.origin[0] + x as f64 * geometry.spacing[0],
                geometry.origin[1] + y as f64 * geometry.spacing[1],
                geometry.origin[2] + z as f64 * geometry.spacing[2],
            ])
        });
        Self { geometry, data }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// 三线性插值. 连续索引 `ci` 以 `(x, y, z)` 顺序给出, 且已确认位于图像区域内.
    fn trilinear(&self, ci: &[f64; 3]) -> f64 {
        let (nz, ny, nx) = self.shape();
        let clamp = |c: f64, n: usize| c.max(0.0).min((n - 1) as f64);
        let (x, y, z) = (clamp(ci[0], nx), clamp(ci[1], ny), clamp(ci[2], nz));

        let (x0, y0, z0) = (x.floor() as usize, y.floor() as usize, z.floor() as usize);
        let (x1, y1, z1) = ((x0 + 1).min(nx - 1), (y0 + 1).min(ny - 1), (z0 + 1).min(nz - 1));
        let (xd, yd, zd) = (x - x0 as f64, y - y0 as f64, z - z0 as f64);

        let v = |z: usize, y: usize, x: usize| self.data[(z, y, x)] as f64;

        let c00 = lerp(v(z0, y0, x0), v(z0, y0, x1), xd);
        let c10 = lerp(v(z0, y1, x0), v(z0, y1, x1), xd);
        let c01 = lerp(v(z1, y0, x0), v(z1, y0, x1), xd);
        let c11 = lerp(v(z1, y1, x0), v(z1, y1, x1), xd);

        let c0 = lerp(c00, c10, yd);
        let c1 = lerp(c01, c11, yd);
        lerp(c0, c1, zd)
    }
}

impl Sampler for ScalarVolume {
    fn interpolate(&self, p: &Point3) -> Option<f64> {
        let ci = self.continuous_index(p);
        if self.size() == 0 || !self.is_inside(&ci) {
            return None;
        }
        Some(self.trilinear(&ci))
    }
}
