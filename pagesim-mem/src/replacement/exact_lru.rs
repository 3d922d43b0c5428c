//! 精确 LRU 替换

use lru::LruCache;
use pagesim_core::{Pfn, Vpn};

use super::PageReplacer;
use crate::frame::FramePool;

/// 按最近使用顺序记录所有驻留页
pub struct LruReplacer {
    /// 驻留页 -> 所在帧，无容量上限（驻留页数受帧池约束）
    order: LruCache<Vpn, Pfn>,
}

impl LruReplacer {
    pub fn new() -> Self {
        Self {
            order: LruCache::unbounded(),
        }
    }

    /// 驻留页及其帧，从最久未使用到最近使用
    pub fn entries(&self) -> Vec<(Vpn, Pfn)> {
        self.order.iter().rev().map(|(&vpn, &pfn)| (vpn, pfn)).collect()
    }

    pub fn order(&self) -> Vec<Vpn> {
        self.entries().into_iter().map(|(vpn, _)| vpn).collect()
    }
}

impl Default for LruReplacer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageReplacer for LruReplacer {
    fn admit(&mut self, vpn: Vpn, pfn: Pfn) {
        self.touch(vpn, pfn);
    }

    fn touch(&mut self, vpn: Vpn, pfn: Pfn) {
        self.order.push(vpn, pfn);
    }

    fn select_victim(&mut self, _frames: &FramePool) -> (Vpn, Pfn) {
        match self.order.pop_lru() {
            Some(victim) => victim,
            None => {
                log::error!("LRU victim requested with no resident pages");
                panic!("LRU victim requested with no resident pages");
            }
        }
    }

    fn forget(&mut self, vpn: Vpn, _pfn: Pfn) {
        // select_victim 已经弹出了受害页，这里只处理直接换出的情况
        self.order.pop(&vpn);
    }

    fn tracked(&self) -> usize {
        self.order.len()
    }
}
