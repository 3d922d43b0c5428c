//! # pagesim-core - 分页模拟器核心库
//!
//! 提供分页模拟器的基础类型定义、配置校验和地址拆分。
//!
//! ## 主要组件
//!
//! - **类型定义**: [`VirtAddr`], [`Vpn`], [`Pfn`] 地址与编号类型
//! - **配置**: [`SimConfig`] 及其校验结果 [`Geometry`]
//! - **替换策略选择**: [`ReplacementPolicyKind`]
//! - **地址拆分**: [`AddressTranslator`] 将虚拟地址拆为 (页号, 页内偏移)
//! - **错误类型**: [`ConfigError`], [`InputError`], [`InvariantViolation`]
//!
//! ## 示例
//!
//! ```rust
//! use pagesim_core::{AddressTranslator, ReplacementPolicyKind, SimConfig, VirtAddr, Vpn};
//!
//! let config = SimConfig {
//!     page_size: 4,
//!     num_tlb_entries: 2,
//!     num_frames: 2,
//!     replacement_policy: ReplacementPolicyKind::Lru,
//!     va_bits: 8,
//!     ..Default::default()
//! };
//! let geometry = config.validate().unwrap();
//! let translator = AddressTranslator::new(&geometry, false);
//! assert_eq!(translator.translate(VirtAddr(9)).unwrap(), (Vpn(2), 1));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod error;
pub mod translate;

pub use config::{Geometry, ReplacementPolicyKind, SimConfig};
pub use error::{ConfigError, InputError, InvariantViolation};
pub use translate::AddressTranslator;

// ============================================================================
// 基础类型定义
// ============================================================================

/// 虚拟地址
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VirtAddr(pub u64);

/// 虚拟页号（VPN）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Vpn(pub u64);

/// 物理帧号，取值范围 `[0, num_frames)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pfn(pub usize);

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::Display for Vpn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for Pfn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for VirtAddr {
    fn from(value: u64) -> Self {
        VirtAddr(value)
    }
}

impl TryFrom<i64> for VirtAddr {
    type Error = InputError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map(VirtAddr)
            .map_err(|_| InputError::Negative(value.to_string()))
    }
}

/// 解析十进制地址，允许首尾空白
impl FromStr for VirtAddr {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InputError::NotAnInteger(text.to_string()));
        }
        if negative {
            // "-0"
            if digits.bytes().all(|b| b == b'0') {
                return Ok(VirtAddr(0));
            }
            return Err(InputError::Negative(text.to_string()));
        }
        digits
            .parse::<u64>()
            .map(VirtAddr)
            .map_err(|_| InputError::TooWide(text.to_string()))
    }
}
