use crate::allocator::{DefaultAllocator, NodeAllocator};
use crate::config::RTreeConfig;
use crate::error::ConfigError;
use crate::node::{BranchEntry, Node};
use crate::rectangle::Rectangle;
use tracing::debug;

/// R-tree主结构
///
/// 树是所有操作的唯一入口，控制流和所有权都严格自上而下：节点从不引用树本身。
/// 单线程使用，没有内部锁；在搜索回调中修改树由借用检查器禁止。
pub struct RTree<T, const D: usize = 2, A: NodeAllocator = DefaultAllocator> {
    /// 根节点，当且仅当 `count == 0` 时为空
    pub(crate) root: Option<Box<Node<T, D>>>,
    /// 整棵树的边界矩形，树为空时无意义
    pub(crate) rect: Rectangle<D>,
    /// 条目总数
    pub(crate) count: usize,
    /// 根到叶子的边数
    pub(crate) height: usize,
    pub(crate) config: RTreeConfig,
    pub(crate) allocator: A,
}

impl<T, const D: usize> RTree<T, D, DefaultAllocator> {
    /// 使用默认配置创建R-tree（M=64, m=7）
    pub fn new() -> Self {
        Self::with_config(RTreeConfig::default())
    }

    /// 使用指定配置创建R-tree
    ///
    /// # Panics
    /// 配置未通过 [`RTreeConfig::validate`] 时 panic。
    pub fn with_config(config: RTreeConfig) -> Self {
        Self::with_allocator(config, DefaultAllocator)
    }
}

impl<T, const D: usize> Default for RTree<T, D, DefaultAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const D: usize, A: NodeAllocator> RTree<T, D, A> {
    /// 使用指定配置和分配策略创建R-tree
    ///
    /// # Panics
    /// 配置未通过 [`RTreeConfig::validate`] 时 panic。
    pub fn with_allocator(config: RTreeConfig, allocator: A) -> Self {
        match Self::try_with_allocator(config, allocator) {
            Ok(rtree) => rtree,
            Err(e) => panic!("{}", e),
        }
    }

    /// 同 [`RTree::with_allocator`]，配置无效时返回错误而不是 panic
    pub fn try_with_allocator(config: RTreeConfig, allocator: A) -> Result<Self, ConfigError> {
        config.validate()?;
        if D == 0 {
            return Err(ConfigError::Invalid(
                "rectangles need at least one dimension".to_string(),
            ));
        }
        Ok(RTree {
            root: None,
            rect: Rectangle::default(),
            count: 0,
            height: 0,
            config,
            allocator,
        })
    }

    /// 当前存储的条目数
    pub fn count(&self) -> usize {
        self.count
    }

    /// 同 [`RTree::count`]
    pub fn len(&self) -> usize {
        self.count
    }

    /// 检查R-tree是否为空
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// 根到叶子的边数，只有一个叶子根时为 0
    pub fn height(&self) -> usize {
        self.height
    }

    /// 整棵树的边界矩形，空树返回 `None`
    pub fn bounds(&self) -> Option<Rectangle<D>> {
        self.root.as_ref().map(|_| self.rect)
    }

    pub fn config(&self) -> &RTreeConfig {
        &self.config
    }

    pub fn max_entries(&self) -> usize {
        self.config.max_entries
    }

    pub fn min_entries(&self) -> usize {
        self.config.min_entries()
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// 根节点（只读），用于检查树结构
    pub fn root(&self) -> Option<&Node<T, D>> {
        self.root.as_deref()
    }

    /// 释放所有节点，树回到空状态；条目数据本身随节点一起被丢弃
    pub fn clear(&mut self) {
        if let Some(root) = self.root.take() {
            debug!(count = self.count, height = self.height, "clearing rtree");
            release_node(&mut self.allocator, *root);
        }
        self.rect = Rectangle::default();
        self.count = 0;
        self.height = 0;
    }
}

impl<T, const D: usize, A: NodeAllocator> Drop for RTree<T, D, A> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: std::fmt::Debug, const D: usize, A: NodeAllocator> std::fmt::Debug for RTree<T, D, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RTree")
            .field("count", &self.count)
            .field("height", &self.height)
            .field("rect", &self.bounds())
            .field("config", &self.config)
            .field("root", &self.root)
            .finish()
    }
}

/// 自上而下把一个节点及其所有子孙的存储归还给分配器
pub(crate) fn release_node<T, const D: usize, A: NodeAllocator>(
    allocator: &mut A,
    node: Node<T, D>,
) {
    match node {
        Node::Leaf(entries) => allocator.release(entries),
        Node::Branch(mut entries) => {
            for BranchEntry { child, .. } in entries.drain(..) {
                release_node(allocator, *child);
            }
            allocator.release(entries);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::BoundedAllocator;

    #[test]
    fn test_rtree_creation() {
        let rtree: RTree<u32> = RTree::new();
        assert_eq!(rtree.max_entries(), 64);
        assert_eq!(rtree.min_entries(), 7);
        assert!(rtree.is_empty());
        assert_eq!(rtree.count(), 0);
        assert_eq!(rtree.height(), 0);
        assert_eq!(rtree.bounds(), None);
    }

    #[test]
    #[should_panic(expected = "max_entries must be at least 4")]
    fn test_rtree_rejects_invalid_config() {
        let _rtree: RTree<u32> = RTree::with_config(RTreeConfig::with_max_entries(2));
    }

    #[test]
    fn test_rtree_clear_releases_nodes() {
        let mut rtree: RTree<u32, 2, BoundedAllocator> =
            RTree::with_allocator(RTreeConfig::with_max_entries(4), BoundedAllocator::new(1000));
        for i in 0..50 {
            let x = i as f64;
            rtree.insert([x, x], None, i).unwrap();
        }
        assert!(rtree.allocator().live() > 1);
        assert!(rtree.height() > 0);

        rtree.clear();
        assert_eq!(rtree.allocator().live(), 0);
        assert!(rtree.is_empty());
        assert_eq!(rtree.count(), 0);
        assert_eq!(rtree.height(), 0);

        // 清空后仍可继续使用
        rtree.insert([1.0, 1.0], None, 7).unwrap();
        assert_eq!(rtree.count(), 1);
    }
}
