use serde::{Deserialize, Serialize};

/// 矩形边界框 - 用于表示R-tree中的最小边界矩形(MBR)
///
/// `D` 为固定维度，默认二维。约定每个轴上 `min[i] <= max[i]`，
/// 违反约定的输入不做运行时检查。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle<const D: usize = 2> {
    #[serde(with = "coords")]
    pub min: [f64; D],
    #[serde(with = "coords")]
    pub max: [f64; D],
}

impl<const D: usize> Default for Rectangle<D> {
    fn default() -> Self {
        Rectangle {
            min: [0.0; D],
            max: [0.0; D],
        }
    }
}

/// 数值相等判断：`!(a < b || a > b)`
#[inline]
pub(crate) fn nums_equal(a: f64, b: f64) -> bool {
    !(a < b || a > b)
}

impl<const D: usize> Rectangle<D> {
    /// 创建新的矩形
    pub fn new(min: [f64; D], max: [f64; D]) -> Self {
        Rectangle { min, max }
    }

    /// 创建一个点矩形（max = min）
    pub fn from_point(point: [f64; D]) -> Self {
        Rectangle {
            min: point,
            max: point,
        }
    }

    /// 由一对坐标构造矩形，`max` 为 `None` 时退化为点矩形
    pub fn from_bounds(min: [f64; D], max: Option<[f64; D]>) -> Self {
        Rectangle {
            min,
            max: max.unwrap_or(min),
        }
    }

    /// 原地扩展为自身与 `other` 的并集
    pub fn expand(&mut self, other: &Rectangle<D>) {
        for i in 0..D {
            if other.min[i] < self.min[i] {
                self.min[i] = other.min[i];
            }
            if other.max[i] > self.max[i] {
                self.max[i] = other.max[i];
            }
        }
    }

    /// 计算两个矩形的并集MBR
    pub fn union(&self, other: &Rectangle<D>) -> Rectangle<D> {
        let mut rect = *self;
        rect.expand(other);
        rect
    }

    /// 计算矩形面积（各轴跨度之积）
    ///
    /// 只作为相对代价使用，退化矩形的面积没有实际意义。
    pub fn area(&self) -> f64 {
        (0..D).map(|i| self.max[i] - self.min[i]).product()
    }

    /// 不修改输入，计算两个矩形并集的面积
    pub fn unioned_area(&self, other: &Rectangle<D>) -> f64 {
        (0..D)
            .map(|i| self.max[i].max(other.max[i]) - self.min[i].min(other.min[i]))
            .product()
    }

    /// 计算扩大到包含另一个矩形所需的面积增量
    pub fn enlargement(&self, other: &Rectangle<D>) -> f64 {
        self.unioned_area(other) - self.area()
    }

    /// 判断当前矩形是否包含另一个矩形（闭区间）
    pub fn contains(&self, other: &Rectangle<D>) -> bool {
        (0..D).all(|i| other.min[i] >= self.min[i] && other.max[i] <= self.max[i])
    }

    /// 判断两个矩形是否相交（闭区间，共享边界也算相交）
    pub fn intersects(&self, other: &Rectangle<D>) -> bool {
        (0..D).all(|i| other.min[i] <= self.max[i] && other.max[i] >= self.min[i])
    }

    /// 判断任一轴上的 min 或 max 是否与 `other` 对应坐标相等
    ///
    /// 删除时用于判断被删条目是否贴着节点边界，从而决定是否需要收缩。
    pub fn on_edge(&self, other: &Rectangle<D>) -> bool {
        (0..D).any(|i| {
            nums_equal(self.min[i], other.min[i]) || nums_equal(self.max[i], other.max[i])
        })
    }

    /// 逐轴相等比较
    pub fn equals(&self, other: &Rectangle<D>) -> bool {
        (0..D).all(|i| {
            nums_equal(self.min[i], other.min[i]) && nums_equal(self.max[i], other.max[i])
        })
    }

    /// 返回跨度最大的轴，跨度相同时取编号较小的轴
    pub fn largest_axis(&self) -> usize {
        let mut axis = 0;
        let mut longest = self.max[0] - self.min[0];
        for i in 1..D {
            let length = self.max[i] - self.min[i];
            if length > longest {
                longest = length;
                axis = i;
            }
        }
        axis
    }

    /// 计算矩形中心点
    pub fn center(&self) -> [f64; D] {
        std::array::from_fn(|i| (self.min[i] + self.max[i]) / 2.0)
    }

    /// 判断矩形是否为点
    pub fn is_point(&self) -> bool {
        (0..D).all(|i| nums_equal(self.min[i], self.max[i]))
    }
}

/// 定长坐标数组的序列化，serde 不为任意长度的数组提供实现
mod coords {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer, const D: usize>(
        values: &[f64; D],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter())
    }

    pub(super) fn deserialize<'de, De: Deserializer<'de>, const D: usize>(
        deserializer: De,
    ) -> Result<[f64; D], De::Error> {
        let values = Vec::<f64>::deserialize(deserializer)?;
        let len = values.len();
        values
            .try_into()
            .map_err(|_| De::Error::invalid_length(len, &"one coordinate per dimension"))
    }
}
