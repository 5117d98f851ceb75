use std::collections::TryReserveError;

/// 节点分配失败
#[derive(Debug, thiserror::Error)]
pub enum AllocError {
    #[error("Failed to reserve node storage: {0}")]
    Reserve(#[from] TryReserveError),
    #[error("Node budget of {limit} nodes exhausted")]
    BudgetExhausted { limit: usize },
}

/// 配置加载与校验错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// R-tree 操作错误
#[derive(Debug, thiserror::Error)]
pub enum RTreeError {
    #[error("Node allocation failed: {0}")]
    Alloc(#[from] AllocError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, RTreeError>;

/// 结构检查发现的不变式破坏
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("Leaf at depth {depth} but tree height is {height}")]
    UnbalancedLeaf { depth: usize, height: usize },
    #[error("Cached rectangle at depth {depth} is not the tight bound of its node")]
    LooseMbr { depth: usize },
    #[error("Entries at depth {depth} are not ordered by axis 0 minimum")]
    Unsorted { depth: usize },
    #[error("Node at depth {depth} holds {len} entries, more than {max}")]
    Overfull { depth: usize, len: usize, max: usize },
    #[error("Non-root node at depth {depth} is empty")]
    EmptyNode { depth: usize },
    #[error("Root branch has a single child")]
    SingleChildRoot,
    #[error("Tree stores count {stored} but holds {actual} entries")]
    CountMismatch { stored: usize, actual: usize },
    #[error("Empty tree has count {count} and height {height}")]
    EmptyTreeState { count: usize, height: usize },
}
