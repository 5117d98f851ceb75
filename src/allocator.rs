//! 节点存储的分配策略
//!
//! 树在创建时注入一个 [`NodeAllocator`]，之后所有节点（根节点、分裂出的兄弟节点、
//! 新根）的条目存储都从它申请，被删除或折叠的节点也都归还给它。

use crate::error::AllocError;

/// 可插拔的节点分配策略
///
/// 策略只负责节点的条目存储（`Vec`）。把子节点挂到父节点上的 `Box<Node>`
/// 外壳直接用全局分配器创建，不经过这里，也不能以失败返回的方式报告内存不足。
pub trait NodeAllocator {
    /// 为一个新节点申请能容纳 `capacity` 个条目的存储
    fn allocate<E>(&mut self, capacity: usize) -> Result<Vec<E>, AllocError>;

    /// 归还一个节点的存储，调用时条目已被取走或即将随之销毁
    fn release<E>(&mut self, entries: Vec<E>) {
        drop(entries);
    }
}

/// 默认分配器：使用平台分配器，通过 `try_reserve_exact` 检测分配失败而不是直接中止
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAllocator;

impl NodeAllocator for DefaultAllocator {
    fn allocate<E>(&mut self, capacity: usize) -> Result<Vec<E>, AllocError> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(capacity)?;
        Ok(entries)
    }
}

/// 限制存活节点数量的分配器
///
/// 超过上限的申请返回 [`AllocError::BudgetExhausted`]，用于给索引设置内存上限。
#[derive(Debug, Clone)]
pub struct BoundedAllocator {
    limit: usize,
    live: usize,
}

impl BoundedAllocator {
    pub fn new(limit: usize) -> Self {
        BoundedAllocator { limit, live: 0 }
    }

    /// 当前存活的节点数
    pub fn live(&self) -> usize {
        self.live
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// 调整上限，已存活的节点不受影响
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }
}

impl NodeAllocator for BoundedAllocator {
    fn allocate<E>(&mut self, capacity: usize) -> Result<Vec<E>, AllocError> {
        if self.live >= self.limit {
            return Err(AllocError::BudgetExhausted { limit: self.limit });
        }
        let entries = DefaultAllocator.allocate(capacity)?;
        self.live += 1;
        Ok(entries)
    }

    fn release<E>(&mut self, entries: Vec<E>) {
        self.live = self.live.saturating_sub(1);
        drop(entries);
    }
}
