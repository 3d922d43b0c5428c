//! 软件 TLB (Translation Lookaside Buffer)
//!
//! 全相联、容量固定，始终使用精确 LRU 替换，与物理内存侧的策略无关。
//! TLB 只是页表的缓存，从不作为驻留信息的来源。

use std::num::NonZeroUsize;

use lru::LruCache;
use pagesim_core::{Pfn, Vpn};
use serde::Serialize;

/// TLB 统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TlbStats {
    pub hits: u64,
    pub misses: u64,
    /// 因容量不足被挤出的条目数
    pub evictions: u64,
    /// 因页面换出而失效的条目数
    pub invalidations: u64,
}

impl TlbStats {
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.lookups();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// 翻译缓存
pub struct TranslationCache {
    /// VPN -> PFN，按最近使用顺序排列
    entries: LruCache<Vpn, Pfn>,
    stats: TlbStats,
}

impl TranslationCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            stats: TlbStats::default(),
        }
    }

    /// 查找翻译；命中时提升为最近使用。命中/未命中计数只在这里修改。
    pub fn lookup(&mut self, vpn: Vpn) -> Option<Pfn> {
        match self.entries.get(&vpn) {
            Some(&pfn) => {
                self.stats.hits += 1;
                Some(pfn)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// 只读查找，不影响顺序与计数
    pub fn peek(&self, vpn: Vpn) -> Option<Pfn> {
        self.entries.peek(&vpn).copied()
    }

    /// 插入或更新翻译
    ///
    /// 已存在的页号只更新帧号与顺序；否则在满时淘汰最久未使用的一项。
    /// 返回被淘汰的条目（如果有）。
    pub fn insert(&mut self, vpn: Vpn, pfn: Pfn) -> Option<(Vpn, Pfn)> {
        match self.entries.push(vpn, pfn) {
            Some((old_vpn, _)) if old_vpn == vpn => None,
            Some(evicted) => {
                self.stats.evictions += 1;
                log::debug!("TLB evicted vpn {} (pfn {})", evicted.0, evicted.1);
                Some(evicted)
            }
            None => None,
        }
    }

    /// 使某页的翻译失效；不存在时什么都不做
    pub fn invalidate(&mut self, vpn: Vpn) -> Option<Pfn> {
        let removed = self.entries.pop(&vpn);
        if removed.is_some() {
            self.stats.invalidations += 1;
        }
        removed
    }

    /// 当前条目，从最久未使用到最近使用
    pub fn entries(&self) -> Vec<(Vpn, Pfn)> {
        self.entries.iter().rev().map(|(&vpn, &pfn)| (vpn, pfn)).collect()
    }

    pub fn stats(&self) -> &TlbStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}
