use crate::error::ConfigError;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 选择子树时的快速包含策略
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChooserPolicy {
    /// 关闭快速选择，只使用最小扩大面积
    #[display(fmt = "disabled")]
    Disabled,
    /// 在所有已包含新矩形的子节点中选面积最小的
    #[display(fmt = "fast-smallest")]
    FastSmallest,
    /// 直接选第一个已包含新矩形的子节点
    #[default]
    #[display(fmt = "fast-first")]
    FastFirst,
}

/// R-tree 配置
///
/// 在树创建时确定，树的整个生命周期内不变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RTreeConfig {
    /// 每个节点的最大条目数
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// 最小占用率（百分比）
    #[serde(default = "default_min_entries_percentage")]
    pub min_entries_percentage: usize,

    /// 子树选择策略
    #[serde(default)]
    pub chooser: ChooserPolicy,
}

// ============================================================================
// 默认值函数
// ============================================================================

fn default_max_entries() -> usize {
    64
}

fn default_min_entries_percentage() -> usize {
    10
}

impl Default for RTreeConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            min_entries_percentage: default_min_entries_percentage(),
            chooser: ChooserPolicy::default(),
        }
    }
}

impl RTreeConfig {
    /// 指定最大条目数，其余使用默认值
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Self::default()
        }
    }

    /// 设置子树选择策略
    pub fn chooser(mut self, chooser: ChooserPolicy) -> Self {
        self.chooser = chooser;
        self
    }

    /// 非根节点应有的最小条目数：`max_entries * 百分比 / 100 + 1`
    ///
    /// 删除不会对低于该值的节点做再平衡，这个值只用于检查和报告。
    pub fn min_entries(&self) -> usize {
        self.max_entries * self.min_entries_percentage / 100 + 1
    }

    /// 从文件加载配置
    ///
    /// 配置加载顺序（优先级从低到高）：
    /// 1. 内嵌的 default.toml
    /// 2. 用户配置文件（可选，不存在不报错）
    /// 3. 环境变量（RTREE__ 前缀，例如 `RTREE__MAX_ENTRIES=32`）
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(
                config::File::from(path.as_ref())
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("RTREE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: RTreeConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// 验证配置
    ///
    /// 分裂需要两侧各至少两个条目，所以 `max_entries` 不能小于 4。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries < 4 {
            return Err(ConfigError::Invalid(format!(
                "max_entries must be at least 4, got {}",
                self.max_entries
            )));
        }
        if self.min_entries_percentage > 50 {
            return Err(ConfigError::Invalid(format!(
                "min_entries_percentage must be at most 50, got {}",
                self.min_entries_percentage
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RTreeConfig::default();
        assert_eq!(config.max_entries, 64);
        assert_eq!(config.min_entries_percentage, 10);
        assert_eq!(config.min_entries(), 7);
        assert_eq!(config.chooser, ChooserPolicy::FastFirst);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = RTreeConfig::with_max_entries(3);
        assert!(config.validate().is_err());

        config.max_entries = 4;
        assert!(config.validate().is_ok());

        config.min_entries_percentage = 80;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_min_entries() {
        assert_eq!(RTreeConfig::with_max_entries(4).min_entries(), 1);
        assert_eq!(RTreeConfig::with_max_entries(16).min_entries(), 2);
        assert_eq!(RTreeConfig::with_max_entries(100).min_entries(), 11);
    }

    #[test]
    fn test_chooser_policy_display() {
        assert_eq!(ChooserPolicy::Disabled.to_string(), "disabled");
        assert_eq!(ChooserPolicy::FastSmallest.to_string(), "fast-smallest");
        assert_eq!(ChooserPolicy::FastFirst.to_string(), "fast-first");
    }

    #[test]
    fn test_save_and_load() {
        use tempfile::NamedTempFile;

        let config = RTreeConfig::with_max_entries(16).chooser(ChooserPolicy::FastSmallest);
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();
        let saved = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(saved.contains("chooser = \"fast-smallest\""));

        let loaded = RTreeConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = RTreeConfig::from_file(dir.path().join("missing.toml")).unwrap();
        assert_eq!(loaded, RTreeConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rtree.toml");
        std::fs::write(&path, "max_entries = 2\n").unwrap();
        assert!(matches!(
            RTreeConfig::from_file(&path),
            Err(ConfigError::Invalid(_))
        ));
    }
}
