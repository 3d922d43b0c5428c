//! 模拟器配置
//!
//! [`SimConfig`] 可以直接构造，也可以从 TOML 配置文件反序列化；
//! [`SimConfig::validate`] 只执行一次结构性检查，并给出派生的 [`Geometry`]。

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 默认虚拟地址位宽
pub const DEFAULT_VA_BITS: u32 = 32;
/// 默认页大小：4KB
pub const DEFAULT_PAGE_SIZE: u64 = 4096;
/// 默认 TLB 条目数
pub const DEFAULT_TLB_ENTRIES: usize = 16;
/// 默认物理帧数
pub const DEFAULT_FRAMES: usize = 64;

/// 物理内存侧的页面替换策略（TLB 始终使用 LRU）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReplacementPolicyKind {
    /// 精确 LRU
    #[default]
    Lru,
    /// 时钟 / 二次机会
    SecondChance,
}

impl ReplacementPolicyKind {
    /// 策略的规范名称
    pub fn name(self) -> &'static str {
        match self {
            ReplacementPolicyKind::Lru => "LRU",
            ReplacementPolicyKind::SecondChance => "SecondChance",
        }
    }
}

impl fmt::Display for ReplacementPolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReplacementPolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(ReplacementPolicyKind::Lru),
            "secondchance" | "second-chance" | "second_chance" | "clock" => {
                Ok(ReplacementPolicyKind::SecondChance)
            }
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

impl TryFrom<String> for ReplacementPolicyKind {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReplacementPolicyKind> for String {
    fn from(kind: ReplacementPolicyKind) -> Self {
        kind.name().to_string()
    }
}

/// 模拟器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// 页大小（字节），必须是 2 的幂
    pub page_size: u64,
    /// TLB 条目数（全相联），必须是 2 的幂
    pub num_tlb_entries: usize,
    /// 物理帧数，必须是 2 的幂
    pub num_frames: usize,
    /// 页面替换策略
    pub replacement_policy: ReplacementPolicyKind,
    /// 虚拟地址位宽
    pub va_bits: u32,
    /// 是否拒绝超出 `2^va_bits` 的地址
    pub enforce_va_bound: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            num_tlb_entries: DEFAULT_TLB_ENTRIES,
            num_frames: DEFAULT_FRAMES,
            replacement_policy: ReplacementPolicyKind::Lru,
            va_bits: DEFAULT_VA_BITS,
            enforce_va_bound: false,
        }
    }
}

/// 校验通过后的派生几何参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Geometry {
    pub page_size: u64,
    pub va_bits: u32,
    /// `log2(page_size)`
    pub offset_bits: u32,
    /// `va_bits - offset_bits`
    pub vpn_bits: u32,
    pub offset_mask: u64,
    pub tlb_entries: NonZeroUsize,
    pub frames: NonZeroUsize,
    /// 物理内存总量（字节）
    pub ram_bytes: u64,
    /// TLB 覆盖范围（字节）
    pub tlb_reach_bytes: u64,
}

impl Geometry {
    /// 地址空间上界（不含）；`va_bits == 64` 时没有可表示的上界
    pub fn address_limit(&self) -> Option<u64> {
        1u64.checked_shl(self.va_bits)
    }
}

fn check_power_of_two(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value.is_power_of_two() {
        Ok(())
    } else {
        Err(ConfigError::NotPowerOfTwo { field, value })
    }
}

fn non_zero(field: &'static str, value: usize) -> Result<NonZeroUsize, ConfigError> {
    NonZeroUsize::new(value).ok_or(ConfigError::NonPositive { field })
}

impl SimConfig {
    /// 结构性校验，失败时不产生任何实例
    pub fn validate(&self) -> Result<Geometry, ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::NonPositive { field: "page_size" });
        }
        let tlb_entries = non_zero("num_tlb_entries", self.num_tlb_entries)?;
        let frames = non_zero("num_frames", self.num_frames)?;
        if self.va_bits == 0 {
            return Err(ConfigError::NonPositive { field: "va_bits" });
        }
        if self.va_bits > u64::BITS {
            return Err(ConfigError::AddressWidthTooLarge(self.va_bits));
        }

        check_power_of_two("page_size", self.page_size)?;
        check_power_of_two("num_tlb_entries", self.num_tlb_entries as u64)?;
        check_power_of_two("num_frames", self.num_frames as u64)?;

        let address_space = 1u128 << self.va_bits;
        if u128::from(self.page_size) > address_space {
            return Err(ConfigError::PageExceedsAddressSpace {
                page_size: self.page_size,
                va_bits: self.va_bits,
            });
        }

        let offset_bits = self.page_size.trailing_zeros();
        if self.va_bits <= offset_bits {
            return Err(ConfigError::NoPageNumberBits {
                va_bits: self.va_bits,
                offset_bits,
            });
        }

        Ok(Geometry {
            page_size: self.page_size,
            va_bits: self.va_bits,
            offset_bits,
            vpn_bits: self.va_bits - offset_bits,
            offset_mask: self.page_size - 1,
            tlb_entries,
            frames,
            ram_bytes: (self.num_frames as u64).saturating_mul(self.page_size),
            tlb_reach_bytes: (self.num_tlb_entries as u64).saturating_mul(self.page_size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimConfig {
        SimConfig {
            page_size: 4,
            num_tlb_entries: 2,
            num_frames: 2,
            replacement_policy: ReplacementPolicyKind::Lru,
            va_bits: 8,
            enforce_va_bound: false,
        }
    }

    #[test]
    fn test_default_geometry() {
        let geometry = SimConfig::default().validate().unwrap();
        assert_eq!(geometry.offset_bits, 12);
        assert_eq!(geometry.vpn_bits, 20);
        assert_eq!(geometry.offset_mask, 0xfff);
        assert_eq!(geometry.ram_bytes, 64 * 4096);
        assert_eq!(geometry.tlb_reach_bytes, 16 * 4096);
        assert_eq!(geometry.address_limit(), Some(1 << 32));
    }

    #[test]
    fn test_small_geometry() {
        let geometry = small_config().validate().unwrap();
        assert_eq!(geometry.offset_bits, 2);
        assert_eq!(geometry.vpn_bits, 6);
        assert_eq!(geometry.frames.get(), 2);
        assert_eq!(geometry.tlb_entries.get(), 2);
    }

    #[test]
    fn test_zero_parameters_rejected() {
        let cases: [(fn(&mut SimConfig), &str); 4] = [
            (|c| c.page_size = 0, "page_size"),
            (|c| c.num_tlb_entries = 0, "num_tlb_entries"),
            (|c| c.num_frames = 0, "num_frames"),
            (|c| c.va_bits = 0, "va_bits"),
        ];
        for (mutate, field) in cases {
            let mut config = small_config();
            mutate(&mut config);
            assert_eq!(config.validate(), Err(ConfigError::NonPositive { field }));
        }
    }

    #[test]
    fn test_non_power_of_two_rejected() {
        let mut config = small_config();
        config.page_size = 6;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPowerOfTwo {
                field: "page_size",
                value: 6
            })
        );

        let mut config = small_config();
        config.num_tlb_entries = 3;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPowerOfTwo {
                field: "num_tlb_entries",
                ..
            })
        ));

        let mut config = small_config();
        config.num_frames = 12;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPowerOfTwo {
                field: "num_frames",
                ..
            })
        ));
    }

    #[test]
    fn test_page_larger_than_address_space() {
        let mut config = small_config();
        config.page_size = 512;
        assert_eq!(
            config.validate(),
            Err(ConfigError::PageExceedsAddressSpace {
                page_size: 512,
                va_bits: 8
            })
        );
    }

    #[test]
    fn test_no_room_for_page_number() {
        let mut config = small_config();
        config.page_size = 256;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NoPageNumberBits {
                va_bits: 8,
                offset_bits: 8
            })
        );
    }

    #[test]
    fn test_va_bits_too_wide() {
        let mut config = small_config();
        config.va_bits = 65;
        assert_eq!(config.validate(), Err(ConfigError::AddressWidthTooLarge(65)));
    }

    #[test]
    fn test_full_width_address_space() {
        let mut config = small_config();
        config.va_bits = 64;
        let geometry = config.validate().unwrap();
        assert_eq!(geometry.vpn_bits, 62);
        assert_eq!(geometry.address_limit(), None);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("LRU".parse(), Ok(ReplacementPolicyKind::Lru));
        assert_eq!("lru".parse(), Ok(ReplacementPolicyKind::Lru));
        assert_eq!(
            "SecondChance".parse(),
            Ok(ReplacementPolicyKind::SecondChance)
        );
        assert_eq!("clock".parse(), Ok(ReplacementPolicyKind::SecondChance));
        assert_eq!(
            "FIFO".parse::<ReplacementPolicyKind>(),
            Err(ConfigError::UnknownPolicy("FIFO".to_string()))
        );
        assert_eq!(ReplacementPolicyKind::SecondChance.to_string(), "SecondChance");
    }

    #[test]
    fn test_config_from_toml() {
        let config: SimConfig = toml::from_str(
            r#"
            page_size = 4
            num_tlb_entries = 2
            num_frames = 2
            replacement_policy = "SecondChance"
            va_bits = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.replacement_policy, ReplacementPolicyKind::SecondChance);
        assert_eq!(config.page_size, 4);
        assert!(!config.enforce_va_bound);
    }

    #[test]
    fn test_config_from_partial_toml_uses_defaults() {
        let config: SimConfig = toml::from_str("num_frames = 128").unwrap();
        assert_eq!(config.num_frames, 128);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.va_bits, DEFAULT_VA_BITS);
    }

    #[test]
    fn test_config_rejects_unknown_policy_in_toml() {
        let result: Result<SimConfig, _> = toml::from_str(r#"replacement_policy = "FIFO""#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("unknown replacement policy"));
    }
}
