//! 单级页表：驻留页 -> 物理帧
//!
//! 页表是"某页是否驻留"的唯一事实来源。

use std::collections::HashMap;

use pagesim_core::{Pfn, Vpn};

#[derive(Debug, Default)]
pub struct PageTable {
    entries: HashMap<Vpn, Pfn>,
}

impl PageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn lookup(&self, vpn: Vpn) -> Option<Pfn> {
        self.entries.get(&vpn).copied()
    }

    /// 建立映射，返回旧映射（正常流程中应为 `None`）
    pub fn map(&mut self, vpn: Vpn, pfn: Pfn) -> Option<Pfn> {
        self.entries.insert(vpn, pfn)
    }

    pub fn unmap(&mut self, vpn: Vpn) -> Option<Pfn> {
        self.entries.remove(&vpn)
    }

    pub fn is_resident(&self, vpn: Vpn) -> bool {
        self.entries.contains_key(&vpn)
    }

    /// 所有映射，按页号排序
    pub fn entries(&self) -> Vec<(Vpn, Pfn)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(&vpn, &pfn)| (vpn, pfn)).collect();
        entries.sort_unstable();
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
