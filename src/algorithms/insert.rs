use super::choose::choose_subtree;
use super::split::split_node;
use crate::allocator::NodeAllocator;
use crate::config::RTreeConfig;
use crate::error::{AllocError, Result};
use crate::node::{
    BranchEntry, LeafEntry, Node, insertion_index, order_to_left, order_to_right,
    sort_by_axis_min,
};
use crate::rectangle::Rectangle;
use crate::rtree::RTree;
use tracing::{debug, trace, warn};

/// 递归插入返回给上一层的信号
pub(crate) enum Insertion<T> {
    /// 目标节点已满，需要由调用者分裂后重试；数据原样交还
    Split(T),
    /// 已插入，`grown` 表示该节点在父节点中缓存的矩形是否需要扩大
    Inserted { grown: bool },
}

/// 插入操作相关算法
impl<T, const D: usize, A: NodeAllocator> RTree<T, D, A> {
    /// 插入新的数据条目
    ///
    /// `max` 为 `None` 时插入点矩形（max = min）。只有节点分配失败时返回错误，
    /// 此时树保持在失败前最后一个一致的状态，条目数不变。
    pub fn insert(&mut self, min: [f64; D], max: Option<[f64; D]>, data: T) -> Result<()> {
        self.insert_rect(Rectangle::from_bounds(min, max), data)
    }

    /// 以矩形插入数据条目
    pub fn insert_rect(&mut self, rect: Rectangle<D>, data: T) -> Result<()> {
        let result = self.try_insert(rect, data);
        if let Err(e) = &result {
            warn!(error = %e, count = self.count, "rtree insert failed");
        }
        result
    }

    fn try_insert(&mut self, rect: Rectangle<D>, mut data: T) -> Result<()> {
        let max_entries = self.config.max_entries;
        let root = match &mut self.root {
            Some(root) => root,
            slot @ None => {
                let entries = self.allocator.allocate(max_entries)?;
                self.rect = rect;
                slot.insert(Box::new(Node::Leaf(entries)))
            }
        };

        loop {
            match insert_node(&mut self.allocator, &self.config, &self.rect, root, &rect, data)? {
                Insertion::Split(returned) => {
                    // 根节点已满：分裂根节点并创建新的分支根，树长高一层
                    let mut entries = self.allocator.allocate(max_entries)?;
                    let split = split_node(&mut self.allocator, max_entries, &self.rect, root);
                    let right = match split {
                        Ok(right) => right,
                        Err(e) => {
                            self.allocator.release(entries);
                            return Err(e.into());
                        }
                    };
                    let left = std::mem::replace(&mut **root, Node::Leaf(Vec::new()));
                    entries.push(BranchEntry {
                        rect: left.calc_rect().unwrap_or_default(),
                        child: Box::new(left),
                    });
                    entries.push(BranchEntry {
                        rect: right.calc_rect().unwrap_or_default(),
                        child: Box::new(right),
                    });
                    sort_by_axis_min(&mut entries, 0);
                    **root = Node::Branch(entries);
                    self.height += 1;
                    debug!(height = self.height, "root split, tree grew");
                    data = returned;
                }
                Insertion::Inserted { grown } => {
                    if grown {
                        self.rect.expand(&rect);
                        root.sort();
                    }
                    self.count += 1;
                    return Ok(());
                }
            }
        }
    }
}

/// 递归插入 - 在 `node` 下放置 `rect`
///
/// `node_rect` 是父节点为 `node` 缓存的矩形（根节点为整棵树的矩形）。
pub(crate) fn insert_node<T, const D: usize, A: NodeAllocator>(
    allocator: &mut A,
    config: &RTreeConfig,
    node_rect: &Rectangle<D>,
    node: &mut Node<T, D>,
    rect: &Rectangle<D>,
    mut data: T,
) -> std::result::Result<Insertion<T>, AllocError> {
    loop {
        let entries = match node {
            Node::Leaf(entries) => {
                if entries.len() >= config.max_entries {
                    return Ok(Insertion::Split(data));
                }
                let index = insertion_index(entries, rect.min[0]);
                entries.insert(index, LeafEntry { rect: *rect, data });
                trace!(index, count = entries.len(), "leaf insert");
                return Ok(Insertion::Inserted {
                    grown: !node_rect.contains(rect),
                });
            }
            Node::Branch(entries) => entries,
        };

        let index = choose_subtree(entries, rect, config.chooser);
        let outcome = {
            let BranchEntry { rect: child_rect, child } = &mut entries[index];
            insert_node(allocator, config, child_rect, child, rect, data)?
        };

        match outcome {
            Insertion::Split(returned) => {
                if entries.len() >= config.max_entries {
                    // 本节点也放不下新的兄弟节点，交给上一层先分裂本节点
                    return Ok(Insertion::Split(returned));
                }
                let right = {
                    let BranchEntry { rect: child_rect, child } = &mut entries[index];
                    let right = split_node(allocator, config.max_entries, child_rect, child)?;
                    *child_rect = child.calc_rect().unwrap_or_default();
                    right
                };
                entries.insert(
                    index + 1,
                    BranchEntry {
                        rect: right.calc_rect().unwrap_or_default(),
                        child: Box::new(right),
                    },
                );
                if entries[index].rect.min[0] > entries[index + 1].rect.min[0] {
                    entries.swap(index, index + 1);
                }
                order_to_right(entries, index + 1);
                // 子树已经改变，从当前节点重试
                data = returned;
            }
            Insertion::Inserted { grown: true } => {
                entries[index].rect.expand(rect);
                order_to_left(entries, index);
                return Ok(Insertion::Inserted {
                    grown: !node_rect.contains(rect),
                });
            }
            Insertion::Inserted { grown: false } => {
                return Ok(Insertion::Inserted { grown: false });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::BoundedAllocator;
    use crate::error::RTreeError;

    fn small_tree() -> RTree<u32> {
        RTree::with_config(RTreeConfig::with_max_entries(4))
    }

    #[test]
    fn test_insert_basic() {
        let mut rtree = small_tree();
        assert!(rtree.is_empty());

        rtree.insert([0.0, 0.0], Some([10.0, 10.0]), 1).unwrap();
        assert_eq!(rtree.count(), 1);
        assert_eq!(rtree.height(), 0);
        assert_eq!(rtree.bounds(), Some(Rectangle::new([0.0, 0.0], [10.0, 10.0])));

        rtree.insert([5.0, 5.0], Some([15.0, 15.0]), 2).unwrap();
        rtree.insert([20.0, 20.0], Some([30.0, 30.0]), 3).unwrap();
        assert_eq!(rtree.count(), 3);
        assert_eq!(rtree.bounds(), Some(Rectangle::new([0.0, 0.0], [30.0, 30.0])));
        rtree.check_invariants().unwrap();
    }

    #[test]
    fn test_insert_point_rectangle() {
        let mut rtree = small_tree();
        rtree.insert([3.0, 4.0], None, 9).unwrap();
        let found: Vec<_> = rtree.search([3.0, 4.0], None).collect();
        assert_eq!(found.len(), 1);
        assert!(found[0].0.is_point());
        assert_eq!(*found[0].1, 9);
    }

    #[test]
    fn test_leaf_entries_stay_sorted() {
        let mut rtree = small_tree();
        for (i, x) in [5.0, 1.0, 3.0, 2.0].into_iter().enumerate() {
            rtree.insert([x, 0.0], None, i as u32).unwrap();
        }
        match rtree.root().unwrap() {
            Node::Leaf(entries) => {
                let xs: Vec<f64> = entries.iter().map(|e| e.rect.min[0]).collect();
                assert_eq!(xs, vec![1.0, 2.0, 3.0, 5.0]);
            }
            Node::Branch(_) => panic!("expected a single leaf root"),
        }
    }

    #[test]
    fn test_root_split_grows_height() {
        let mut rtree = small_tree();
        for i in 0..4 {
            rtree.insert([i as f64, 0.0], None, i).unwrap();
        }
        assert_eq!(rtree.height(), 0);

        // 第五个条目触发根节点分裂
        rtree.insert([4.0, 0.0], None, 4).unwrap();
        assert_eq!(rtree.height(), 1);
        assert_eq!(rtree.count(), 5);
        assert!(!rtree.root().unwrap().is_leaf());
        rtree.check_invariants().unwrap();
    }

    #[test]
    fn test_multi_level_growth() {
        let mut rtree = small_tree();
        for i in 0..200u32 {
            let x = (i % 20) as f64 * 3.0;
            let y = (i / 20) as f64 * 3.0;
            rtree.insert([x, y], Some([x + 1.0, y + 1.0]), i).unwrap();
        }
        assert_eq!(rtree.count(), 200);
        assert!(rtree.height() >= 3);
        rtree.check_invariants().unwrap();
        assert_eq!(rtree.iter().count(), 200);
    }

    #[test]
    fn test_insert_fails_without_root_storage() {
        let mut rtree: RTree<u32, 2, BoundedAllocator> =
            RTree::with_allocator(RTreeConfig::with_max_entries(4), BoundedAllocator::new(0));
        let err = rtree.insert([0.0, 0.0], None, 1).unwrap_err();
        assert!(matches!(err, RTreeError::Alloc(AllocError::BudgetExhausted { limit: 0 })));
        assert!(rtree.is_empty());
        assert_eq!(rtree.count(), 0);
    }

    #[test]
    fn test_insert_failure_during_split_keeps_tree_consistent() {
        // 只允许一个节点：根叶子满了以后无法分裂
        let mut rtree: RTree<u32, 2, BoundedAllocator> =
            RTree::with_allocator(RTreeConfig::with_max_entries(4), BoundedAllocator::new(1));
        for i in 0..4 {
            rtree.insert([i as f64, i as f64], None, i).unwrap();
        }
        assert!(rtree.insert([9.0, 9.0], None, 9).is_err());
        assert_eq!(rtree.count(), 4);
        assert_eq!(rtree.height(), 0);
        assert_eq!(rtree.allocator().live(), 1);
        rtree.check_invariants().unwrap();
        assert_eq!(rtree.search([9.0, 9.0], None).count(), 0);
    }

    #[test]
    fn test_insert_failure_on_new_root_sibling_releases_root() {
        // 新根申请成功，但分裂出的兄弟节点申请失败：新根必须被归还
        let mut rtree: RTree<u32, 2, BoundedAllocator> =
            RTree::with_allocator(RTreeConfig::with_max_entries(4), BoundedAllocator::new(2));
        for i in 0..4 {
            rtree.insert([i as f64, 0.0], None, i).unwrap();
        }
        assert!(rtree.insert([4.0, 0.0], None, 4).is_err());
        assert_eq!(rtree.allocator().live(), 1);
        assert_eq!(rtree.count(), 4);
        rtree.check_invariants().unwrap();
    }

    #[test]
    fn test_insert_after_failure_recovers() {
        let mut rtree: RTree<u32, 2, BoundedAllocator> =
            RTree::with_allocator(RTreeConfig::with_max_entries(4), BoundedAllocator::new(1));
        for i in 0..4 {
            rtree.insert([i as f64, 0.0], None, i).unwrap();
        }
        assert!(rtree.insert([4.0, 0.0], None, 4).is_err());

        rtree.allocator.set_limit(100);
        rtree.insert([4.0, 0.0], None, 4).unwrap();
        assert_eq!(rtree.count(), 5);
        assert_eq!(rtree.height(), 1);
        rtree.check_invariants().unwrap();
    }
}
