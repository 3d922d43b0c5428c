//! 分页模拟器的统一错误类型
//!
//! 两类可恢复错误：构造期的 [`ConfigError`] 与逐次访问的 [`InputError`]。
//! 流水线内部的不变量破坏不属于可恢复错误，直接 panic；
//! [`InvariantViolation`] 仅用于诊断性的一致性检查。

use thiserror::Error;

/// 配置错误（构造期，致命，不会产生半成品实例）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },

    #[error("{field} must be a power of two, got {value}")]
    NotPowerOfTwo { field: &'static str, value: u64 },

    #[error("va_bits {0} exceeds the 64-bit address width")]
    AddressWidthTooLarge(u32),

    #[error("page_size {page_size} exceeds the virtual address space (2^{va_bits} bytes)")]
    PageExceedsAddressSpace { page_size: u64, va_bits: u32 },

    #[error(
        "va_bits ({va_bits}) must be greater than log2(page_size) ({offset_bits}) to leave at least one page-number bit"
    )]
    NoPageNumberBits { va_bits: u32, offset_bits: u32 },

    #[error("unknown replacement policy '{0}', expected 'LRU' or 'SecondChance'")]
    UnknownPolicy(String),
}

/// 输入错误（逐次访问）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("virtual address must be non-negative, got {0}")]
    Negative(String),

    #[error("virtual address must be a decimal integer, got '{0}'")]
    NotAnInteger(String),

    #[error("virtual address {0} does not fit in 64 bits")]
    TooWide(String),

    #[error("virtual address {address:#x} is outside the {va_bits}-bit address space")]
    OutOfRange { address: u64, va_bits: u32 },
}

/// 一致性检查发现的不变量破坏
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invariant violated: {0}")]
pub struct InvariantViolation(pub String);
