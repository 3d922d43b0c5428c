//! 物理帧池

use std::collections::BTreeSet;
use std::num::NonZeroUsize;

use pagesim_core::{Pfn, Vpn};

/// 固定数量的物理帧及空闲集合
///
/// 空闲帧按编号从小到大分配，保证模拟结果可复现。
pub struct FramePool {
    /// 每个帧当前驻留的页
    slots: Vec<Option<Vpn>>,
    free: BTreeSet<Pfn>,
}

impl FramePool {
    pub fn new(frames: NonZeroUsize) -> Self {
        Self {
            slots: vec![None; frames.get()],
            free: (0..frames.get()).map(Pfn).collect(),
        }
    }

    /// 取出一个空闲帧
    pub fn acquire_free(&mut self) -> Option<Pfn> {
        self.free.pop_first()
    }

    /// 记录已取出帧的驻留页
    pub fn occupy(&mut self, pfn: Pfn, vpn: Vpn) {
        debug_assert!(!self.free.contains(&pfn), "frame {pfn} is still free");
        self.slots[pfn.0] = Some(vpn);
    }

    /// 清空帧并放回空闲集合
    ///
    /// 调用前驻留页必须已从页表、TLB 和替换状态中摘除。
    pub fn release(&mut self, pfn: Pfn) -> Option<Vpn> {
        let previous = self.slots[pfn.0].take();
        self.free.insert(pfn);
        previous
    }

    pub fn occupant(&self, pfn: Pfn) -> Option<Vpn> {
        self.slots.get(pfn.0).copied().flatten()
    }

    pub fn is_free(&self, pfn: Pfn) -> bool {
        self.free.contains(&pfn)
    }

    pub fn slots(&self) -> &[Option<Vpn>] {
        &self.slots
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
