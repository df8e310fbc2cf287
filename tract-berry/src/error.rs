//! 运行时错误.

use std::fmt;

/// 错误大类.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// 参数配置非法. 整个操作立即中止, 不产生部分输出.
    Configuration,

    /// 输入数据为空或几何形态非法.
    EmptyInput,
}

/// 聚类或 tractometry 的运行时错误.
#[derive(Debug, Clone, PartialEq)]
pub enum TractError {
    /// 距离阶梯为空.
    EmptyDistances,

    /// 距离阶梯不是严格递增的正有限数列. 参数为第一个不合法值的位置.
    InvalidDistances(usize),

    /// 没有设置任何距离度量.
    NoMetric,

    /// 重采样点数不足.
    ///
    /// 第一个参数代表给定点数, 第二个参数代表最少点数.
    TooFewPoints(usize, usize),

    /// 点数不一致, 且无法通过重采样解决.
    ///
    /// 第一个参数代表期望点数, 第二个参数代表实际点数.
    PointCountMismatch(usize, usize),

    /// 参与比较的两个矩阵形状不同.
    ShapeMismatch((usize, usize), (usize, usize)),

    /// 其它非法参数. 参数为参数名.
    InvalidParameter(&'static str),

    /// 需要非空输入的地方得到了空纤维束.
    EmptyBundle,

    /// 纤维点数不足两个.
    ///
    /// 第一个参数代表纤维索引, 第二个参数代表点数.
    MalformedFiber(usize, usize),

    /// 颜色与纤维点的形状不一致. 参数为第一根不一致的纤维索引.
    ColorMismatch(usize),
}

impl TractError {
    /// 该错误所属的大类.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyBundle | Self::MalformedFiber(..) | Self::ColorMismatch(_) => {
                ErrorKind::EmptyInput
            }
            _ => ErrorKind::Configuration,
        }
    }

    /// 是否是配置错误.
    #[inline]
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind(), ErrorKind::Configuration)
    }
}

impl fmt::Display for TractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDistances => write!(f, "distance ladder is empty"),
            Self::InvalidDistances(i) => write!(
                f,
                "distance ladder must be strictly increasing and positive (position {i})"
            ),
            Self::NoMetric => write!(f, "no distance metric selected"),
            Self::TooFewPoints(n, min) => {
                write!(f, "{n} resampling points requested, at least {min} required")
            }
            Self::PointCountMismatch(expected, found) => {
                write!(f, "expected {expected} points per fiber, found {found}")
            }
            Self::ShapeMismatch(a, b) => write!(f, "matrix shapes differ: {a:?} vs {b:?}"),
            Self::InvalidParameter(name) => write!(f, "invalid parameter `{name}`"),
            Self::EmptyBundle => write!(f, "fiber bundle is empty"),
            Self::MalformedFiber(i, n) => {
                write!(f, "fiber {i} has {n} point(s), at least 2 required")
            }
            Self::ColorMismatch(i) => write!(f, "colors of fiber {i} do not match its points"),
        }
    }
}

impl std::error::Error for TractError {}

/// 聚类 / tractometry 计算结果.
pub type TractResult<T> = Result<T, TractError>;
