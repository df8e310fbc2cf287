//! 规则网格三维体数据: 标量体 (插值采样) 与二值掩膜 (占用测试).
//!
//! 体素数据一律以 `(z, y, x)` 顺序保存, 物理坐标一律以 `(x, y, z)` 顺序给出.
//! 几何信息仅包含原点与体素间距 (轴对齐), 不处理方向余弦.

use crate::{Idx3d, Point3, TractError, TractResult};
use nifti::NiftiHeader;

mod mask;
mod scalar;

pub use mask::MaskVolume;
pub use scalar::ScalarVolume;

/// 打开 nifti 体数据错误.
#[derive(Debug)]
pub enum OpenVolumeError {
    /// nifti 读取或解码错误.
    Nifti(nifti::NiftiError),

    /// 体数据不是三维的. 参数为实际维数.
    NotThreeDimensional(usize),

    /// header 中的几何信息非法.
    InvalidGeometry(TractError),
}

impl From<nifti::NiftiError> for OpenVolumeError {
    #[inline]
    fn from(e: nifti::NiftiError) -> Self {
        Self::Nifti(e)
    }
}

/// 轴对齐的网格几何.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometry {
    /// `(z, y, x)` 方向体素个数.
    shape: Idx3d,

    /// `(x, y, z)` 方向体素间距 (单位: 毫米).
    spacing: [f64; 3],

    /// 索引 `(0, 0, 0)` 体素中心的物理坐标.
    origin: Point3,
}

impl Geometry {
    /// 构建几何. 体素间距必须为正有限数, 否则返回 `Err`.
    pub fn new(shape: Idx3d, spacing: [f64; 3], origin: Point3) -> TractResult<Self> {
        if !spacing.iter().all(|s| s.is_finite() && *s > 0.0) {
            return Err(TractError::InvalidParameter("spacing"));
        }
        if !origin.iter().all(|o| o.is_finite()) {
            return Err(TractError::InvalidParameter("origin"));
        }
        Ok(Self {
            shape,
            spacing,
            origin,
        })
    }

    /// 单位间距, 原点位于 `(0, 0, 0)` 的几何.
    #[inline]
    pub fn unit(shape: Idx3d) -> Self {
        Self {
            shape,
            spacing: [1.0; 3],
            origin: [0.0; 3],
        }
    }

    /// 从 nifti header 读取几何. 原点取 `qoffset_*`, 间距取 `pixdim[1..4]`.
    pub fn from_header(h: &NiftiHeader) -> TractResult<Self> {
        // [W, H, z] -> (z, H, W)
        let [_, w, hh, z, ..] = h.dim;
        let [_, sx, sy, sz, ..] = h.pixdim;
        Self::new(
            (z as usize, hh as usize, w as usize),
            [sx as f64, sy as f64, sz as f64],
            [h.quatern_x as f64, h.quatern_y as f64, h.quatern_z as f64],
        )
    }
}

/// 网格体数据的共用属性和部分通用操作.
pub trait GridAttr {
    /// 获取几何信息.
    fn geometry(&self) -> &Geometry;

    /// 获取数据形状大小 `(z, y, x)`.
    #[inline]
    fn shape(&self) -> Idx3d {
        self.geometry().shape
    }

    /// 获取数据体素个数.
    #[inline]
    fn size(&self) -> usize {
        let (z, y, x) = self.shape();
        z * y * x
    }

    /// 获取 `(x, y, z)` 方向体素间距, 以毫米为单位.
    #[inline]
    fn spacing(&self) -> [f64; 3] {
        self.geometry().spacing
    }

    /// 获取原点物理坐标.
    #[inline]
    fn origin(&self) -> Point3 {
        self.geometry().origin
    }

    /// 获取体素的实际体积值, 以立方毫米为单位.
    #[inline]
    fn voxel(&self) -> f64 {
        self.spacing().iter().product()
    }

    /// 体素间距在三个维度上是否是各向同的?
    #[inline]
    fn is_isotropic(&self) -> bool {
        let [x, y, z] = self.spacing();
        x == y && x == z
    }

    /// 检查索引是否合法.
    #[inline]
    fn check(&self, (z0, y0, x0): &Idx3d) -> bool {
        let (z, y, x) = self.shape();
        *z0 < z && *y0 < y && *x0 < x
    }

    /// 物理坐标 -> `(x, y, z)` 连续索引.
    #[inline]
    fn continuous_index(&self, p: &Point3) -> [f64; 3] {
        let g = self.geometry();
        [
            (p[0] - g.origin[0]) / g.spacing[0],
            (p[1] - g.origin[1]) / g.spacing[1],
            (p[2] - g.origin[2]) / g.spacing[2],
        ]
    }

    /// `(z, y, x)` 体素索引 -> 体素中心物理坐标.
    #[inline]
    fn physical_point(&self, (z, y, x): Idx3d) -> Point3 {
        let g = self.geometry();
        [
            g.origin[0] + x as f64 * g.spacing[0],
            g.origin[1] + y as f64 * g.spacing[1],
            g.origin[2] + z as f64 * g.spacing[2],
        ]
    }

    /// 连续索引是否位于图像区域内. 与 ITK 一致, 图像区域向外扩展半个体素.
    #[inline]
    fn is_inside(&self, ci: &[f64; 3]) -> bool {
        let (z, y, x) = self.shape();
        [x, y, z]
            .iter()
            .zip(ci)
            .all(|(&len, &c)| c.is_finite() && c >= -0.5 && c < len as f64 - 0.5)
    }

    /// 物理坐标所在 (最近) 体素的 `(z, y, x)` 索引. 越界时返回 `None`.
    #[inline]
    fn voxel_index(&self, p: &Point3) -> Option<Idx3d> {
        let ci = self.continuous_index(p);
        if !self.is_inside(&ci) {
            return None;
        }
        let [x, y, z] = ci.map(|c| c.round().max(0.0) as usize);
        let idx = (z, y, x);
        self.check(&idx).then_some(idx)
    }
}

/// 标量体采样器.
pub trait Sampler {
    /// 在物理坐标 `p` 处线性插值.
    ///
    /// `p` 位于图像区域外时返回 `None`, 调用方应视为缺失数据.
    fn interpolate(&self, p: &Point3) -> Option<f64>;
}
