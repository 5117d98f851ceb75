use crate::allocator::NodeAllocator;
use crate::node::{BranchEntry, Node, mbr_of, order_to_right};
use crate::rectangle::Rectangle;
use crate::rtree::{RTree, release_node};
use tracing::{debug, trace};

/// 递归删除返回给上一层的信号
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Removal {
    /// 找到并删除了目标条目
    pub removed: bool,
    /// 该节点在父节点中缓存的矩形已经收缩并被重新计算
    pub shrunk: bool,
}

/// 删除操作相关算法
impl<T, const D: usize, A: NodeAllocator> RTree<T, D, A> {
    /// 删除第一个矩形被查询矩形包含、且数据与 `data` 相等的条目
    ///
    /// `max` 为 `None` 时按点矩形查询。没有匹配时什么也不做并返回 `false`。
    pub fn delete(&mut self, min: [f64; D], max: Option<[f64; D]>, data: &T) -> bool
    where
        T: PartialEq,
    {
        self.delete_with(min, max, data, |a, b| a == b)
    }

    /// 同 [`RTree::delete`]，用自定义比较函数判断数据是否相等
    pub fn delete_with<F>(&mut self, min: [f64; D], max: Option<[f64; D]>, data: &T, eq: F) -> bool
    where
        F: FnMut(&T, &T) -> bool,
    {
        self.delete_rect_with(&Rectangle::from_bounds(min, max), data, eq)
    }

    /// 以查询矩形删除
    pub fn delete_rect_with<F>(&mut self, query: &Rectangle<D>, data: &T, mut eq: F) -> bool
    where
        F: FnMut(&T, &T) -> bool,
    {
        let Some(root) = self.root.as_mut() else {
            return false;
        };

        let removal = delete_node(&mut self.allocator, &mut self.rect, root, query, data, &mut eq);
        if !removal.removed {
            return false;
        }

        self.count -= 1;
        if self.count == 0 {
            self.clear();
            return true;
        }

        // 根节点只剩一个子节点时用子节点替换根节点，可能连续发生多次
        while let Some(root) = self.root.as_mut() {
            let Node::Branch(entries) = &mut **root else {
                break;
            };
            if entries.len() != 1 {
                break;
            }
            let Some(BranchEntry { child, .. }) = entries.pop() else {
                break;
            };
            let old = std::mem::replace(root, child);
            release_node(&mut self.allocator, *old);
            self.height -= 1;
            debug!(height = self.height, "root collapsed");
        }

        if removal.shrunk
            && let Some(rect) = self.root.as_ref().and_then(|root| root.calc_rect())
        {
            self.rect = rect;
        }
        true
    }
}

/// 递归删除
///
/// `node_rect` 是父节点为 `node` 缓存的矩形，收缩时在这里原地重新计算。
pub(crate) fn delete_node<T, const D: usize, A, F>(
    allocator: &mut A,
    node_rect: &mut Rectangle<D>,
    node: &mut Node<T, D>,
    query: &Rectangle<D>,
    data: &T,
    eq: &mut F,
) -> Removal
where
    A: NodeAllocator,
    F: FnMut(&T, &T) -> bool,
{
    match node {
        Node::Leaf(entries) => {
            let Some(index) = entries
                .iter()
                .position(|entry| query.contains(&entry.rect) && eq(&entry.data, data))
            else {
                return Removal::default();
            };
            let removed = entries.remove(index);
            trace!(index, remaining = entries.len(), "leaf entry removed");

            // 被删条目贴着节点边界时，节点矩形可能需要收缩
            let shrunk = removed.rect.on_edge(node_rect);
            if shrunk && let Some(rect) = mbr_of(entries) {
                *node_rect = rect;
            }
            Removal {
                removed: true,
                shrunk,
            }
        }
        Node::Branch(entries) => {
            for i in 0..entries.len() {
                if !entries[i].rect.contains(query) {
                    continue;
                }
                let prior = entries[i].rect;
                let child_removal = {
                    let BranchEntry { rect, child } = &mut entries[i];
                    delete_node(allocator, rect, child, query, data, eq)
                };
                if !child_removal.removed {
                    continue;
                }

                // 子节点被删空：释放并从本节点移除
                if entries[i].child.is_empty() {
                    let BranchEntry { child, .. } = entries.remove(i);
                    release_node(allocator, *child);
                    if let Some(rect) = mbr_of(entries) {
                        *node_rect = rect;
                    }
                    return Removal {
                        removed: true,
                        shrunk: true,
                    };
                }

                let mut shrunk = child_removal.shrunk;
                if shrunk {
                    shrunk = !entries[i].rect.equals(&prior);
                    if shrunk && let Some(rect) = mbr_of(entries) {
                        *node_rect = rect;
                    }
                    order_to_right(entries, i);
                }
                return Removal {
                    removed: true,
                    shrunk,
                };
            }
            Removal::default()
        }
    }
}
