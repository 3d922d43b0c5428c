//! 访问统计与诊断快照

use pagesim_core::{Pfn, Vpn};
use serde::Serialize;

/// 访问计数器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    pub tlb_hits: u64,
    pub tlb_misses: u64,
    pub page_faults: u64,
    /// 因缺页而换出的页数
    pub page_evictions: u64,
    /// TLB 容量不足挤出的条目数
    pub tlb_evictions: u64,
}

impl SimStats {
    /// 已处理的访问数
    pub fn accesses(&self) -> u64 {
        self.tlb_hits + self.tlb_misses
    }

    pub fn tlb_hit_rate(&self) -> f64 {
        ratio(self.tlb_hits, self.accesses())
    }

    pub fn fault_rate(&self) -> f64 {
        ratio(self.page_faults, self.accesses())
    }
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// 时钟策略的内部状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockSnapshot {
    pub hand: usize,
    pub reference_bits: Vec<bool>,
}

/// 某一时刻的表内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemorySnapshot {
    /// TLB 条目，从最久未使用到最近使用
    pub tlb: Vec<(Vpn, Pfn)>,
    /// 页表条目，按页号排序
    pub page_table: Vec<(Vpn, Pfn)>,
    /// 每个帧的驻留页
    pub frames: Vec<Option<Vpn>>,
    /// LRU 策略下的驻留页顺序（旧到新）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lru_order: Option<Vec<Vpn>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock: Option<ClockSnapshot>,
}

impl MemorySnapshot {
    pub fn is_resident(&self, vpn: Vpn) -> bool {
        self.page_table.iter().any(|&(page, _)| page == vpn)
    }
}
