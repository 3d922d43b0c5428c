//! 虚拟地址拆分：VA -> (页号, 页内偏移)

use crate::config::Geometry;
use crate::error::InputError;
use crate::{VirtAddr, Vpn};

/// 地址拆分器
#[derive(Debug, Clone, Copy)]
pub struct AddressTranslator {
    offset_bits: u32,
    offset_mask: u64,
    va_bits: u32,
    /// 为 `Some` 时拒绝不小于该值的地址
    limit: Option<u64>,
}

impl AddressTranslator {
    pub fn new(geometry: &Geometry, enforce_va_bound: bool) -> Self {
        Self {
            offset_bits: geometry.offset_bits,
            offset_mask: geometry.offset_mask,
            va_bits: geometry.va_bits,
            limit: if enforce_va_bound {
                geometry.address_limit()
            } else {
                None
            },
        }
    }

    /// 拆分地址
    ///
    /// 未开启上界检查时，超出 `2^va_bits` 的地址只会得到一个较大的页号。
    pub fn translate(&self, addr: VirtAddr) -> Result<(Vpn, u64), InputError> {
        if let Some(limit) = self.limit
            && addr.0 >= limit
        {
            return Err(InputError::OutOfRange {
                address: addr.0,
                va_bits: self.va_bits,
            });
        }
        Ok((Vpn(addr.0 >> self.offset_bits), addr.0 & self.offset_mask))
    }

    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }
}
