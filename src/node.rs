use crate::rectangle::Rectangle;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// R-tree节点类型
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// 叶子节点：矩形与用户数据成对存储
    #[display(fmt = "leaf")]
    Leaf,
    /// 分支节点：矩形与子节点成对存储
    #[display(fmt = "branch")]
    Branch,
}

/// 叶子条目：数据的矩形和数据本身
///
/// 数据按值存储，树不会解引用或释放数据指向的任何东西。
#[derive(Debug, Clone, PartialEq)]
pub struct LeafEntry<T, const D: usize = 2> {
    pub rect: Rectangle<D>,
    pub data: T,
}

/// 分支条目：子节点的MBR和独占的子节点
#[derive(Debug, Clone)]
pub struct BranchEntry<T, const D: usize = 2> {
    /// 子节点所有条目的紧致MBR
    pub rect: Rectangle<D>,
    pub child: Box<Node<T, D>>,
}

/// 两种条目共享的MBR访问
pub trait HasMbr<const D: usize> {
    fn mbr(&self) -> &Rectangle<D>;
}

impl<T, const D: usize> HasMbr<D> for LeafEntry<T, D> {
    fn mbr(&self) -> &Rectangle<D> {
        &self.rect
    }
}

impl<T, const D: usize> HasMbr<D> for BranchEntry<T, D> {
    fn mbr(&self) -> &Rectangle<D> {
        &self.rect
    }
}

/// R-tree节点
///
/// 节点内条目始终按第0轴的最小坐标升序排列，插入定位和变更后的重排都依赖这个顺序。
/// 条目数不超过树配置的 `max_entries`。
#[derive(Debug, Clone)]
pub enum Node<T, const D: usize = 2> {
    Leaf(Vec<LeafEntry<T, D>>),
    Branch(Vec<BranchEntry<T, D>>),
}

impl<T, const D: usize> Node<T, D> {
    /// 节点类型
    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Leaf(_) => NodeType::Leaf,
            Node::Branch(_) => NodeType::Branch,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// 节点中已占用的条目数
    pub fn len(&self) -> usize {
        match self {
            Node::Leaf(entries) => entries.len(),
            Node::Branch(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 从所有条目重新计算节点的MBR，空节点返回 `None`
    pub fn calc_rect(&self) -> Option<Rectangle<D>> {
        match self {
            Node::Leaf(entries) => mbr_of(entries),
            Node::Branch(entries) => mbr_of(entries),
        }
    }

    /// 按第0轴最小坐标重新排序所有条目
    pub fn sort(&mut self) {
        match self {
            Node::Leaf(entries) => sort_by_axis_min(entries, 0),
            Node::Branch(entries) => sort_by_axis_min(entries, 0),
        }
    }
}

/// 计算一组条目的最小边界矩形
pub fn mbr_of<const D: usize, E: HasMbr<D>>(entries: &[E]) -> Option<Rectangle<D>> {
    let (first, rest) = entries.split_first()?;
    let mut rect = *first.mbr();
    for entry in rest {
        rect.expand(entry.mbr());
    }
    Some(rect)
}

/// 在有序条目中查找新矩形的插入位置：第一个 `min[0]` 不小于 `key` 的下标
pub(crate) fn insertion_index<const D: usize, E: HasMbr<D>>(entries: &[E], key: f64) -> usize {
    entries
        .iter()
        .position(|entry| !(entry.mbr().min[0] < key))
        .unwrap_or(entries.len())
}

/// 按指定轴的最小坐标升序排序
pub(crate) fn sort_by_axis_min<const D: usize, E: HasMbr<D>>(entries: &mut [E], axis: usize) {
    entries.sort_by(|a, b| a.mbr().min[axis].total_cmp(&b.mbr().min[axis]));
}

/// 按指定轴的最大坐标升序排序
pub(crate) fn sort_by_axis_max<const D: usize, E: HasMbr<D>>(entries: &mut [E], axis: usize) {
    entries.sort_by(|a, b| a.mbr().max[axis].total_cmp(&b.mbr().max[axis]));
}

/// 条目的 `min[0]` 变小后向左冒泡，恢复有序，返回新下标
pub(crate) fn order_to_left<const D: usize, E: HasMbr<D>>(
    entries: &mut [E],
    mut index: usize,
) -> usize {
    while index > 0 && entries[index].mbr().min[0] < entries[index - 1].mbr().min[0] {
        entries.swap(index, index - 1);
        index -= 1;
    }
    index
}

/// 条目的 `min[0]` 变大后向右冒泡，恢复有序，返回新下标
pub(crate) fn order_to_right<const D: usize, E: HasMbr<D>>(
    entries: &mut [E],
    mut index: usize,
) -> usize {
    while index + 1 < entries.len()
        && entries[index + 1].mbr().min[0] < entries[index].mbr().min[0]
    {
        entries.swap(index + 1, index);
        index += 1;
    }
    index
}
