use crate::allocator::NodeAllocator;
use crate::config::ChooserPolicy;
use crate::error::InvariantViolation;
use crate::node::{HasMbr, Node, NodeType};
use crate::rectangle::Rectangle;
use crate::rtree::RTree;
use serde::Serialize;
use std::fmt::{self, Write};
use tracing::debug;

/// 用于JSON序列化的简化树结构
#[derive(Debug, Serialize)]
pub struct TreeVisualization<'a, T, const D: usize> {
    /// 根节点（如果存在）
    pub root: Option<NodeVisualization<'a, T, D>>,
    /// 树的配置参数
    pub config: TreeConfig,
    pub count: usize,
    pub height: usize,
}

/// 用于JSON序列化的树配置
#[derive(Debug, Serialize)]
pub struct TreeConfig {
    pub max_entries: usize,
    pub min_entries: usize,
    pub chooser: ChooserPolicy,
}

/// 用于JSON序列化的节点结构
#[derive(Debug, Serialize)]
pub struct NodeVisualization<'a, T, const D: usize> {
    /// 父节点为该节点缓存的矩形
    pub mbr: Rectangle<D>,
    pub node_type: NodeType,
    /// 节点层级，叶子为 0
    pub level: usize,
    /// 数据条目（仅叶子节点）
    pub data_entries: Vec<DataEntry<'a, T, D>>,
    /// 子节点（仅分支节点）
    pub child_nodes: Vec<NodeVisualization<'a, T, D>>,
}

/// 用于JSON序列化的数据条目
#[derive(Debug, Serialize)]
pub struct DataEntry<'a, T, const D: usize> {
    pub mbr: Rectangle<D>,
    pub data: &'a T,
}

/// R-tree调试功能实现
impl<T, const D: usize, A: NodeAllocator> RTree<T, D, A> {
    /// 检查整棵树的结构不变式
    ///
    /// 依次检查：所有叶子深度相同且等于树高、缓存矩形是包含全部条目的最小矩形、
    /// 条目按第 0 轴最小值有序、节点不超过 M 个条目、非根节点非空、
    /// 分支根至少两个子节点、条目数与 `count` 一致。
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let Some(root) = self.root.as_deref() else {
            if self.count != 0 || self.height != 0 {
                return Err(InvariantViolation::EmptyTreeState {
                    count: self.count,
                    height: self.height,
                });
            }
            return Ok(());
        };

        if let Node::Branch(entries) = root
            && entries.len() < 2
        {
            return Err(InvariantViolation::SingleChildRoot);
        }

        let actual = self.check_node(root, &self.rect, 0, true)?;
        if actual != self.count {
            return Err(InvariantViolation::CountMismatch {
                stored: self.count,
                actual,
            });
        }
        Ok(())
    }

    /// 递归检查单个节点，返回子树中的叶子条目数
    fn check_node(
        &self,
        node: &Node<T, D>,
        cached: &Rectangle<D>,
        depth: usize,
        is_root: bool,
    ) -> Result<usize, InvariantViolation> {
        let len = node.len();
        if len == 0 && !is_root {
            return Err(InvariantViolation::EmptyNode { depth });
        }
        if len > self.config.max_entries {
            return Err(InvariantViolation::Overfull {
                depth,
                len,
                max: self.config.max_entries,
            });
        }
        match node.calc_rect() {
            Some(rect) if !rect.equals(cached) => {
                return Err(InvariantViolation::LooseMbr { depth });
            }
            _ => {}
        }

        match node {
            Node::Leaf(entries) => {
                if depth != self.height {
                    return Err(InvariantViolation::UnbalancedLeaf {
                        depth,
                        height: self.height,
                    });
                }
                check_sorted(entries, depth)?;
                Ok(entries.len())
            }
            Node::Branch(entries) => {
                check_sorted(entries, depth)?;
                let mut total = 0;
                for entry in entries {
                    total += self.check_node(&entry.child, &entry.rect, depth + 1, false)?;
                }
                Ok(total)
            }
        }
    }

    /// 以缩进文本形式输出完整的树结构
    pub fn dump_structure(&self) -> String
    where
        T: fmt::Debug,
    {
        let mut out = String::new();
        // 写入 String 不会失败
        let _ = self.write_structure(&mut out);
        debug!(count = self.count, height = self.height, "dumped rtree structure");
        out
    }

    fn write_structure(&self, out: &mut String) -> fmt::Result
    where
        T: fmt::Debug,
    {
        writeln!(out, "=== R-tree Structure ===")?;
        match self.root.as_deref() {
            Some(root) => {
                writeln!(out, "count={} height={}", self.count, self.height)?;
                write_node(out, root, &self.rect, self.height, 0, "")?;
            }
            None => writeln!(out, "Empty tree (no root)")?,
        }
        writeln!(out, "=== End ===")
    }

    /// 导出树结构为JSON格式，用于可视化
    pub fn export_to_json(&self) -> Result<String, serde_json::Error>
    where
        T: Serialize,
    {
        let visualization = TreeVisualization {
            root: self
                .root
                .as_deref()
                .map(|root| visualize_node(root, self.rect, self.height)),
            config: TreeConfig {
                max_entries: self.config.max_entries,
                min_entries: self.config.min_entries(),
                chooser: self.config.chooser,
            },
            count: self.count,
            height: self.height,
        };
        serde_json::to_string_pretty(&visualization)
    }
}

fn check_sorted<const D: usize, E: HasMbr<D>>(
    entries: &[E],
    depth: usize,
) -> Result<(), InvariantViolation> {
    if entries
        .windows(2)
        .any(|pair| pair[0].mbr().min[0] > pair[1].mbr().min[0])
    {
        return Err(InvariantViolation::Unsorted { depth });
    }
    Ok(())
}

fn write_node<T: fmt::Debug, const D: usize>(
    out: &mut String,
    node: &Node<T, D>,
    rect: &Rectangle<D>,
    level: usize,
    depth: usize,
    path: &str,
) -> fmt::Result {
    let indent = "  ".repeat(depth);
    writeln!(
        out,
        "{}Node{} (level={}, type={}, mbr={:?}..{:?}, {} entries)",
        indent,
        path,
        level,
        node.node_type(),
        rect.min,
        rect.max,
        node.len()
    )?;
    if node.is_empty() {
        writeln!(out, "{}  EMPTY NODE", indent)?;
    }
    if let Some(actual) = node.calc_rect()
        && !actual.equals(rect)
    {
        writeln!(out, "{}  LOOSE MBR, actual {:?}..{:?}", indent, actual.min, actual.max)?;
    }

    match node {
        Node::Leaf(entries) => {
            for (i, entry) in entries.iter().enumerate() {
                writeln!(
                    out,
                    "{}  [{}] Data: {:?} at {:?}..{:?}",
                    indent, i, entry.data, entry.rect.min, entry.rect.max
                )?;
            }
        }
        Node::Branch(entries) => {
            for (i, entry) in entries.iter().enumerate() {
                let child_path = format!("{}[{}]", path, i);
                write_node(
                    out,
                    &entry.child,
                    &entry.rect,
                    level.saturating_sub(1),
                    depth + 1,
                    &child_path,
                )?;
            }
        }
    }
    Ok(())
}

/// 递归创建节点的可视化结构
fn visualize_node<T, const D: usize>(
    node: &Node<T, D>,
    rect: Rectangle<D>,
    level: usize,
) -> NodeVisualization<'_, T, D> {
    let mut data_entries = Vec::new();
    let mut child_nodes = Vec::new();

    match node {
        Node::Leaf(entries) => {
            data_entries.extend(entries.iter().map(|entry| DataEntry {
                mbr: entry.rect,
                data: &entry.data,
            }));
        }
        Node::Branch(entries) => {
            child_nodes.extend(
                entries
                    .iter()
                    .map(|entry| visualize_node(&entry.child, entry.rect, level.saturating_sub(1))),
            );
        }
    }

    NodeVisualization {
        mbr: rect,
        node_type: node.node_type(),
        level,
        data_entries,
        child_nodes,
    }
}
