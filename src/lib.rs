//! # R-tree 空间索引数据结构
//!
//! 内存中的 R-tree，把任意维度的轴对齐矩形映射到用户数据，支持插入、
//! 范围查询和删除。
//!
//! ## 主要特性
//!
//! - 维度由常量泛型 `D` 决定，默认二维
//! - 节点内条目按第 0 轴最小坐标有序，插入和查询依赖这个顺序
//! - 最长轴贴边分裂（largest-axis edge-snap）
//! - 三种子树选择策略，见 [`ChooserPolicy`]
//! - 节点存储通过 [`NodeAllocator`] 申请，分配失败时树保持一致
//! - 查询返回惰性迭代器，提前停止即取消
//!
//! ## 使用示例
//!
//! ```rust
//! use rtree::{RTree, Rectangle};
//!
//! let mut rtree: RTree<&str> = RTree::new();
//! rtree.insert([-79.38, 43.65], None, "Toronto").unwrap();
//! rtree.insert([139.69, 35.69], None, "Tokyo").unwrap();
//!
//! // 北半球西侧
//! let found: Vec<_> = rtree
//!     .search([-180.0, 0.0], Some([0.0, 90.0]))
//!     .map(|(_, city)| *city)
//!     .collect();
//! assert_eq!(found, vec!["Toronto"]);
//!
//! assert!(rtree.delete([139.69, 35.69], None, &"Tokyo"));
//! assert_eq!(rtree.count(), 1);
//! assert_eq!(rtree.bounds(), Some(Rectangle::from_point([-79.38, 43.65])));
//! ```
//!
//! ### 自定义配置
//! ```rust
//! use rtree::{ChooserPolicy, RTree, RTreeConfig};
//!
//! let config = RTreeConfig::with_max_entries(16).chooser(ChooserPolicy::FastSmallest);
//! let mut rtree: RTree<u32, 3> = RTree::with_config(config);
//! rtree.insert([0.0, 0.0, 0.0], Some([1.0, 1.0, 1.0]), 7).unwrap();
//! assert_eq!(rtree.search([0.5, 0.5, 0.5], None).count(), 1);
//! ```

pub mod algorithms;
pub mod allocator;
pub mod config;
pub mod error;
pub mod geo_interop;
pub mod node;
pub mod rectangle;
pub mod rtree;

// 重新导出主要的公共接口
pub use algorithms::debug::{DataEntry, NodeVisualization, TreeConfig, TreeVisualization};
pub use algorithms::search::SearchIter;
pub use allocator::{BoundedAllocator, DefaultAllocator, NodeAllocator};
pub use config::{ChooserPolicy, RTreeConfig};
pub use error::{AllocError, ConfigError, InvariantViolation, RTreeError, Result};
pub use node::{BranchEntry, LeafEntry, Node, NodeType};
pub use rectangle::Rectangle;
pub use rtree::RTree;
