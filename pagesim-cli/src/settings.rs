//! 配置文件加载与命令行覆盖
//!
//! 优先级：命令行参数 > 配置文件 > 默认值。

use std::fs;
use std::path::{Path, PathBuf};

use pagesim_core::{ReplacementPolicyKind, SimConfig};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// 从 TOML 文件读取配置，缺省字段使用默认值
pub fn load_config(path: &Path) -> Result<SimConfig, SettingsError> {
    let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// 命令行上显式给出的参数
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub page_size: Option<u64>,
    pub num_tlb_entries: Option<usize>,
    pub num_frames: Option<usize>,
    pub replacement_policy: Option<ReplacementPolicyKind>,
    pub va_bits: Option<u32>,
    pub enforce_va_bound: bool,
}

impl Overrides {
    pub fn apply(&self, mut config: SimConfig) -> SimConfig {
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(entries) = self.num_tlb_entries {
            config.num_tlb_entries = entries;
        }
        if let Some(frames) = self.num_frames {
            config.num_frames = frames;
        }
        if let Some(policy) = self.replacement_policy {
            config.replacement_policy = policy;
        }
        if let Some(va_bits) = self.va_bits {
            config.va_bits = va_bits;
        }
        config.enforce_va_bound |= self.enforce_va_bound;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "page_size = 4\nnum_frames = 2\nreplacement_policy = \"SecondChance\"").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.page_size, 4);
        assert_eq!(config.num_frames, 2);
        assert_eq!(config.replacement_policy, ReplacementPolicyKind::SecondChance);
        assert_eq!(config.num_tlb_entries, SimConfig::default().num_tlb_entries);
    }

    #[test]
    fn test_load_config_errors() {
        let err = load_config(Path::new("/nonexistent/pagesim.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "page_size = \"big\"").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "num_pages = 4").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let base = SimConfig {
            page_size: 4,
            num_frames: 2,
            ..Default::default()
        };
        let overrides = Overrides {
            num_frames: Some(8),
            replacement_policy: Some(ReplacementPolicyKind::SecondChance),
            enforce_va_bound: true,
            ..Default::default()
        };
        let config = overrides.apply(base);
        assert_eq!(config.page_size, 4);
        assert_eq!(config.num_frames, 8);
        assert_eq!(config.replacement_policy, ReplacementPolicyKind::SecondChance);
        assert!(config.enforce_va_bound);
    }
}
