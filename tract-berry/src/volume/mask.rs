use super::{Geometry, GridAttr, OpenVolumeError};
use crate::{Idx3d, Point3, TractError, TractResult};
use ndarray::{Array3, Ix3};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};
use std::ops::Index;
use std::path::Path;

/// 二值掩膜. 非零体素视为占用.
#[derive(Debug, Clone)]
pub struct MaskVolume {
    geometry: Geometry,
    data: Array3<u8>,
}

impl GridAttr for MaskVolume {
    #[inline]
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }
}

impl Index<Idx3d> for MaskVolume {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl MaskVolume {
    /// 打开 nii 文件格式的掩膜. `path` 为 nii 文件的本地路径.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, OpenVolumeError> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let geometry =
            Geometry::from_header(obj.header()).map_err(OpenVolumeError::InvalidGeometry)?;

        let data = obj.into_volume().into_ndarray::<u8>()?;
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

    /// 由 `(z, y, x)` 顺序组织的数据直接创建掩膜.
    ///
    /// 如果 `data` 形状与 `geometry` 不一致, 则返回 `Err`.
    pub fn from_array(data: Array3<u8>, geometry: Geometry) -> TractResult<Self> {
        if data.dim() != geometry.shape {
            return Err(TractError::InvalidParameter("shape"));
        }
        Ok(Self { geometry, data })
    }

    /// 物理坐标 `p` 所在体素是否被占用. 越界视为未占用.
    #[inline]
    pub fn is_occupied(&self, p: &Point3) -> bool {
        self.voxel_index(p).is_some_and(|idx| self.data[idx] != 0)
    }

    /// 计算 `points` 中落在占用体素内的比例. `points` 为空时返回 `None`.
    pub fn overlap<'a, I>(&self, points: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'a Point3>,
    {
        let (mut inside, mut total) = (0usize, 0usize);
        for p in points {
            total += 1;
            if self.is_occupied(p) {
                inside += 1;
            }
        }
        (total != 0).then(|| inside as f64 / total as f64)
    }

    /// 被占用的体素个数.
    pub fn occupied_count(&self) -> usize {
        self.data.iter().filter(|v| **v != 0).count()
    }
}
