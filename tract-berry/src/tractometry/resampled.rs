use super::{flip, Tractometry};
use crate::consts::palette::parcel_color;
use crate::volume::Sampler;
use crate::{FiberBundle, TractError, TractResult};
use log::debug;
use ndarray::Array2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 静态重采样模式的结果.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StaticProfile {
    /// `N x F` 采样值, 每行一个 bin, 每列一根纤维. 越界采样为 `NaN`.
    pub values: Array2<f64>,

    /// 重采样后并按 bin 着色的纤维束副本.
    pub bundle: FiberBundle,

    /// 是否整体反转了 bin 编号.
    pub flip_parcellation: bool,
}

impl StaticProfile {
    /// 第 `bin` 个位置上所有有效采样值的平均值. 没有有效值时返回 `None`.
    pub fn bin_mean(&self, bin: usize) -> Option<f64> {
        let (sum, n) = self
            .values
            .row(bin)
            .iter()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        (n != 0).then(|| sum / n as f64)
    }

    /// 逐 bin 平均值曲线, 没有有效值的 bin 为 `NaN`.
    pub fn mean_profile(&self) -> Vec<f64> {
        (0..self.values.nrows())
            .map(|b| self.bin_mean(b).unwrap_or(f64::NAN))
            .collect()
    }
}

impl Tractometry {
    /// 静态重采样 tractometry.
    ///
    /// 纤维束 (的副本) 被重采样到 bin 个数, 每根纤维按参考纤维确定方向后,
    /// 第 `j` 个点的采样值落入第 `j` 个 bin. 参考纤维为 `ref_fib` 的第一根纤维,
    /// 未给出时为纤维束的第一根纤维.
    ///
    /// # 错误
    ///
    /// 1. 参数非法时返回配置错误.
    /// 2. `bundle` 或给出的 `ref_fib` 为空时返回 `Err(TractError::EmptyBundle)`.
    pub fn static_resampling<S: Sampler>(
        &self,
        volume: &S,
        bundle: &FiberBundle,
        ref_fib: Option<&FiberBundle>,
    ) -> TractResult<StaticProfile> {
        self.validate()?;
        if bundle.is_empty() {
            return Err(TractError::EmptyBundle);
        }

        let n = self.num_points;
        let mut working = bundle.resampled(n)?;
        let reference = match ref_fib {
            Some(r) => self.external_reference(r)?,
            None => working.fiber(0).to_vec(),
        };
        let flip_parcellation = self.flip_parcellation(volume, &reference);
        debug!(
            "Static tractometry over {} fibers, {n} bins, flip parcellation: {flip_parcellation}",
            working.len()
        );

        let mut values = Array2::from_elem((n, working.len()), f64::NAN);
        for i in 0..working.len() {
            let fiber = working.fiber(i).to_vec();
            let reversed = flip(&reference, &fiber)?;
            for (j, p) in fiber.iter().enumerate() {
                let position = if reversed { n - 1 - j } else { j };
                let bin = self.bin_of(position, flip_parcellation);
                if let Some(v) = volume.interpolate(p) {
                    values[(bin, i)] = v;
                }
                working.color_point(i, j, parcel_color(bin));
            }
        }

        Ok(StaticProfile {
            values,
            bundle: working,
            flip_parcellation,
        })
    }
}
