//! 时钟（二次机会）替换

use std::num::NonZeroUsize;

use pagesim_core::{Pfn, Vpn};

use super::PageReplacer;
use crate::frame::FramePool;

/// 每帧一个引用位加一个循环扫描指针
pub struct ClockReplacer {
    reference_bits: Vec<bool>,
    /// 帧是否已登记；与帧池的占用情况保持一致
    tracked: Vec<bool>,
    hand: usize,
}

impl ClockReplacer {
    pub fn new(frames: NonZeroUsize) -> Self {
        Self {
            reference_bits: vec![false; frames.get()],
            tracked: vec![false; frames.get()],
            hand: 0,
        }
    }

    /// 扫描指针当前位置
    pub fn hand(&self) -> usize {
        self.hand
    }

    pub fn reference_bits(&self) -> &[bool] {
        &self.reference_bits
    }

    pub fn reference_bit(&self, pfn: Pfn) -> bool {
        self.reference_bits[pfn.0]
    }

    pub fn is_tracked(&self, pfn: Pfn) -> bool {
        self.tracked[pfn.0]
    }

    fn advance(&mut self) {
        self.hand += 1;
        if self.hand == self.reference_bits.len() {
            self.hand = 0;
        }
    }
}

impl PageReplacer for ClockReplacer {
    /// 新装入的页引用位为 0，只有再次被访问才获得第二次机会
    fn admit(&mut self, _vpn: Vpn, pfn: Pfn) {
        self.tracked[pfn.0] = true;
        self.reference_bits[pfn.0] = false;
    }

    fn touch(&mut self, _vpn: Vpn, pfn: Pfn) {
        self.reference_bits[pfn.0] = true;
    }

    fn select_victim(&mut self, frames: &FramePool) -> (Vpn, Pfn) {
        // 帧全部占用时，第一圈清掉所有引用位，第二圈必然找到受害页
        let scan_limit = 2 * self.reference_bits.len();
        for _ in 0..scan_limit {
            let pfn = Pfn(self.hand);
            let Some(vpn) = frames.occupant(pfn) else {
                self.advance();
                continue;
            };
            if self.reference_bits[pfn.0] {
                self.reference_bits[pfn.0] = false;
                self.advance();
            } else {
                self.advance();
                return (vpn, pfn);
            }
        }

        log::error!(
            "clock scan exceeded {} steps (hand {}, {} occupied frames)",
            scan_limit,
            self.hand,
            frames.occupied_count()
        );
        panic!("clock victim scan did not terminate; frame bookkeeping is inconsistent");
    }

    fn forget(&mut self, _vpn: Vpn, pfn: Pfn) {
        self.tracked[pfn.0] = false;
        self.reference_bits[pfn.0] = false;
    }

    fn tracked(&self) -> usize {
        self.tracked.iter().filter(|&&t| t).count()
    }
}
