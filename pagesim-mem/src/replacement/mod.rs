//! 页面替换策略
//!
//! 策略在构造时选定一次，之后通过 [`Replacer`] 枚举分发，调用方不再按名称分支。

mod clock;
mod exact_lru;

pub use self::clock::ClockReplacer;
pub use self::exact_lru::LruReplacer;

use std::num::NonZeroUsize;

use pagesim_core::{Pfn, ReplacementPolicyKind, Vpn};

use crate::frame::FramePool;

/// 替换策略的公共接口
pub trait PageReplacer {
    /// 登记一个刚装入的页
    fn admit(&mut self, vpn: Vpn, pfn: Pfn);

    /// 标记页被访问
    fn touch(&mut self, vpn: Vpn, pfn: Pfn);

    /// 选出要换出的页，不修改页表/TLB/帧池
    ///
    /// # Panics
    ///
    /// 没有任何驻留页时调用属于不变量破坏。
    fn select_victim(&mut self, frames: &FramePool) -> (Vpn, Pfn);

    /// 丢弃被换出页的附加状态
    fn forget(&mut self, vpn: Vpn, pfn: Pfn);

    /// 持有附加状态的页数
    fn tracked(&self) -> usize;
}

/// 替换策略
pub enum Replacer {
    Lru(LruReplacer),
    Clock(ClockReplacer),
}

impl Replacer {
    pub fn new(kind: ReplacementPolicyKind, frames: NonZeroUsize) -> Self {
        match kind {
            ReplacementPolicyKind::Lru => Replacer::Lru(LruReplacer::new()),
            ReplacementPolicyKind::SecondChance => Replacer::Clock(ClockReplacer::new(frames)),
        }
    }

    pub fn kind(&self) -> ReplacementPolicyKind {
        match self {
            Replacer::Lru(_) => ReplacementPolicyKind::Lru,
            Replacer::Clock(_) => ReplacementPolicyKind::SecondChance,
        }
    }

    fn inner(&self) -> &dyn PageReplacer {
        match self {
            Replacer::Lru(lru) => lru,
            Replacer::Clock(clock) => clock,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn PageReplacer {
        match self {
            Replacer::Lru(lru) => lru,
            Replacer::Clock(clock) => clock,
        }
    }
}

impl PageReplacer for Replacer {
    fn admit(&mut self, vpn: Vpn, pfn: Pfn) {
        self.inner_mut().admit(vpn, pfn);
    }

    fn touch(&mut self, vpn: Vpn, pfn: Pfn) {
        self.inner_mut().touch(vpn, pfn);
    }

    fn select_victim(&mut self, frames: &FramePool) -> (Vpn, Pfn) {
        self.inner_mut().select_victim(frames)
    }

    fn forget(&mut self, vpn: Vpn, pfn: Pfn) {
        self.inner_mut().forget(vpn, pfn);
    }

    fn tracked(&self) -> usize {
        self.inner().tracked()
    }
}
