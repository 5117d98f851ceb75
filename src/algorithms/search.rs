use crate::allocator::NodeAllocator;
use crate::node::{BranchEntry, LeafEntry, Node};
use crate::rectangle::Rectangle;
use crate::rtree::RTree;
use std::iter::FusedIterator;
use std::slice;

/// 范围查询迭代器
///
/// 深度优先地惰性遍历所有与查询矩形相交的叶子条目。提前停止迭代就是取消查询，
/// 剩余的节点不会被访问。每次调用 [`RTree::search`] 都从根节点重新开始。
pub struct SearchIter<'a, T, const D: usize = 2> {
    query: Rectangle<D>,
    /// 尚未访问完的分支节点
    stack: Vec<slice::Iter<'a, BranchEntry<T, D>>>,
    /// 当前叶子节点中尚未访问的条目
    leaf: slice::Iter<'a, LeafEntry<T, D>>,
}

impl<'a, T, const D: usize> SearchIter<'a, T, D> {
    fn new(root: Option<&'a Node<T, D>>, query: Rectangle<D>) -> Self {
        let mut iter = SearchIter {
            query,
            stack: Vec::new(),
            leaf: slice::Iter::default(),
        };
        if let Some(root) = root {
            iter.descend(root);
        }
        iter
    }

    fn descend(&mut self, node: &'a Node<T, D>) {
        match node {
            Node::Leaf(entries) => self.leaf = entries.iter(),
            Node::Branch(entries) => self.stack.push(entries.iter()),
        }
    }
}

impl<'a, T, const D: usize> Iterator for SearchIter<'a, T, D> {
    type Item = (&'a Rectangle<D>, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let query = self.query;
        loop {
            if let Some(entry) = self.leaf.find(|entry| entry.rect.intersects(&query)) {
                return Some((&entry.rect, &entry.data));
            }
            let branch = self.stack.last_mut()?;
            match branch.find(|entry| entry.rect.intersects(&query)) {
                Some(entry) => self.descend(&entry.child),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl<T, const D: usize> FusedIterator for SearchIter<'_, T, D> {}

/// 搜索操作相关算法
impl<T, const D: usize, A: NodeAllocator> RTree<T, D, A> {
    /// 搜索与查询矩形相交的所有条目
    ///
    /// `max` 为 `None` 时按点查询。
    pub fn search(&self, min: [f64; D], max: Option<[f64; D]>) -> SearchIter<'_, T, D> {
        self.search_rect(&Rectangle::from_bounds(min, max))
    }

    /// 以矩形进行搜索
    pub fn search_rect(&self, query: &Rectangle<D>) -> SearchIter<'_, T, D> {
        let root = self
            .root
            .as_deref()
            .filter(|_| self.rect.intersects(query));
        SearchIter::new(root, *query)
    }

    /// 回调形式的搜索：对每个相交条目调用 `f`，`f` 返回 `false` 时立即停止
    pub fn search_with<F>(&self, min: [f64; D], max: Option<[f64; D]>, mut f: F)
    where
        F: FnMut(&Rectangle<D>, &T) -> bool,
    {
        for (rect, data) in self.search(min, max) {
            if !f(rect, data) {
                break;
            }
        }
    }

    /// 遍历所有条目
    pub fn iter(&self) -> impl Iterator<Item = (&Rectangle<D>, &T)> + '_ {
        let query = Rectangle::new([f64::NEG_INFINITY; D], [f64::INFINITY; D]);
        SearchIter::new(self.root.as_deref(), query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RTreeConfig;

    fn sample_tree() -> RTree<u32> {
        let mut rtree = RTree::with_config(RTreeConfig::with_max_entries(4));
        rtree.insert([0.0, 0.0], Some([10.0, 10.0]), 1).unwrap();
        rtree.insert([5.0, 5.0], Some([15.0, 15.0]), 2).unwrap();
        rtree.insert([20.0, 20.0], Some([30.0, 30.0]), 3).unwrap();
        rtree
    }

    fn ids<'a>(iter: impl Iterator<Item = (&'a Rectangle, &'a u32)>) -> Vec<u32> {
        let mut ids: Vec<u32> = iter.map(|(_, data)| *data).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_search_intersecting() {
        let rtree = sample_tree();
        assert_eq!(ids(rtree.search([8.0, 8.0], Some([12.0, 12.0]))), vec![1, 2]);
        assert_eq!(ids(rtree.search([50.0, 50.0], Some([60.0, 60.0]))), Vec::<u32>::new());
        // 共享边界也算相交
        assert_eq!(ids(rtree.search([30.0, 30.0], None)), vec![3]);
    }

    #[test]
    fn test_search_empty_tree() {
        let rtree: RTree<u32> = RTree::new();
        assert_eq!(rtree.search([0.0, 0.0], Some([1.0, 1.0])).count(), 0);
        assert_eq!(rtree.iter().count(), 0);
    }

    #[test]
    fn test_search_reports_stored_rectangles() {
        let rtree = sample_tree();
        let found: Vec<_> = rtree.search([25.0, 25.0], None).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(*found[0].0, Rectangle::new([20.0, 20.0], [30.0, 30.0]));
    }

    #[test]
    fn test_search_with_early_stop() {
        let mut rtree = RTree::with_config(RTreeConfig::with_max_entries(4));
        for i in 0..100u32 {
            rtree.insert([i as f64, 0.0], None, i).unwrap();
        }

        let mut visited = 0;
        rtree.search_with([0.0, -1.0], Some([100.0, 1.0]), |_, _| {
            visited += 1;
            visited < 5
        });
        assert_eq!(visited, 5);

        let mut all = 0;
        rtree.search_with([0.0, -1.0], Some([100.0, 1.0]), |_, _| {
            all += 1;
            true
        });
        assert_eq!(all, 100);
    }

    #[test]
    fn test_search_iterator_is_lazy_and_restartable() {
        let mut rtree = RTree::with_config(RTreeConfig::with_max_entries(4));
        for i in 0..50u32 {
            rtree.insert([i as f64, i as f64], None, i).unwrap();
        }
        let first_three: Vec<u32> = rtree
            .search([0.0, 0.0], Some([49.0, 49.0]))
            .take(3)
            .map(|(_, d)| *d)
            .collect();
        assert_eq!(first_three.len(), 3);

        // 新的查询从根节点重新开始
        assert_eq!(rtree.search([0.0, 0.0], Some([49.0, 49.0])).count(), 50);
        assert_eq!(rtree.search([10.0, 10.0], Some([19.5, 19.5])).count(), 10);
    }

    #[test]
    fn test_iter_visits_everything() {
        let rtree = sample_tree();
        assert_eq!(ids(rtree.iter()), vec![1, 2, 3]);
    }
}
