//! 访问协调器
//!
//! 每次访问按 TLB -> 页表 -> 缺页处理 的顺序走完整条流水线，
//! 并保证 TLB、页表、帧池与替换状态在访问前后始终一致。

use pagesim_core::{
    AddressTranslator, ConfigError, Geometry, InputError, InvariantViolation, Pfn,
    ReplacementPolicyKind, SimConfig, VirtAddr, Vpn,
};

use crate::frame::FramePool;
use crate::page_table::PageTable;
use crate::replacement::{PageReplacer, Replacer};
use crate::stats::{ClockSnapshot, MemorySnapshot, SimStats};
use crate::tlb::TranslationCache;

/// 单次访问的结果，三种情况互斥且完备
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// TLB 命中
    TlbHit { vpn: Vpn, pfn: Pfn },
    /// TLB 未命中，但页已驻留
    TlbMissResident { vpn: Vpn, pfn: Pfn },
    /// 缺页；`evicted` 为被换出的页
    PageFault {
        vpn: Vpn,
        pfn: Pfn,
        evicted: Option<Vpn>,
    },
}

impl AccessOutcome {
    pub fn vpn(&self) -> Vpn {
        match *self {
            AccessOutcome::TlbHit { vpn, .. }
            | AccessOutcome::TlbMissResident { vpn, .. }
            | AccessOutcome::PageFault { vpn, .. } => vpn,
        }
    }

    pub fn pfn(&self) -> Pfn {
        match *self {
            AccessOutcome::TlbHit { pfn, .. }
            | AccessOutcome::TlbMissResident { pfn, .. }
            | AccessOutcome::PageFault { pfn, .. } => pfn,
        }
    }

    pub fn is_tlb_hit(&self) -> bool {
        matches!(self, AccessOutcome::TlbHit { .. })
    }

    pub fn is_page_fault(&self) -> bool {
        matches!(self, AccessOutcome::PageFault { .. })
    }
}

/// 虚拟内存模拟器
pub struct MemorySimulator {
    config: SimConfig,
    geometry: Geometry,
    translator: AddressTranslator,
    tlb: TranslationCache,
    page_table: PageTable,
    frames: FramePool,
    replacer: Replacer,
    accesses: u64,
    page_faults: u64,
    page_evictions: u64,
}

impl MemorySimulator {
    /// 校验配置并创建模拟器；配置无效时不产生实例
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        let geometry = config.validate()?;
        log::debug!(
            "creating simulator: policy={}, page_size={}, offset_bits={}, vpn_bits={}, tlb_entries={}, frames={}",
            config.replacement_policy,
            geometry.page_size,
            geometry.offset_bits,
            geometry.vpn_bits,
            geometry.tlb_entries,
            geometry.frames
        );

        Ok(Self {
            translator: AddressTranslator::new(&geometry, config.enforce_va_bound),
            tlb: TranslationCache::new(geometry.tlb_entries),
            page_table: PageTable::with_capacity(geometry.frames.get()),
            frames: FramePool::new(geometry.frames),
            replacer: Replacer::new(config.replacement_policy, geometry.frames),
            config,
            geometry,
            accesses: 0,
            page_faults: 0,
            page_evictions: 0,
        })
    }

    /// 模拟一次访问
    ///
    /// 地址无效时返回错误，且不修改任何状态。
    pub fn access(&mut self, addr: VirtAddr) -> Result<AccessOutcome, InputError> {
        let (vpn, _offset) = self.translator.translate(addr)?;
        self.accesses += 1;

        // 1. TLB
        if let Some(pfn) = self.tlb.lookup(vpn) {
            self.replacer.touch(vpn, pfn);
            log::trace!("{addr}: TLB hit, vpn {vpn} -> pfn {pfn}");
            return Ok(AccessOutcome::TlbHit { vpn, pfn });
        }

        // 2. 页表
        if let Some(pfn) = self.page_table.lookup(vpn) {
            self.tlb.insert(vpn, pfn);
            self.replacer.touch(vpn, pfn);
            log::trace!("{addr}: TLB miss, vpn {vpn} resident in pfn {pfn}");
            return Ok(AccessOutcome::TlbMissResident { vpn, pfn });
        }

        // 3. 缺页
        Ok(self.handle_page_fault(vpn))
    }

    /// 依次模拟多次访问，遇到第一个无效地址即停止
    pub fn access_all<I>(&mut self, addrs: I) -> Result<(), InputError>
    where
        I: IntoIterator<Item = VirtAddr>,
    {
        for addr in addrs {
            self.access(addr)?;
        }
        Ok(())
    }

    fn handle_page_fault(&mut self, vpn: Vpn) -> AccessOutcome {
        self.page_faults += 1;

        let (pfn, evicted) = match self.frames.acquire_free() {
            Some(pfn) => (pfn, None),
            None => {
                let victim = self.evict_one();
                let Some(pfn) = self.frames.acquire_free() else {
                    log::error!("no free frame after evicting vpn {victim}");
                    panic!("frame pool still empty after eviction");
                };
                (pfn, Some(victim))
            }
        };

        self.frames.occupy(pfn, vpn);
        let previous = self.page_table.map(vpn, pfn);
        debug_assert!(previous.is_none(), "vpn {vpn} was already mapped");
        self.replacer.admit(vpn, pfn);
        self.tlb.insert(vpn, pfn);

        log::debug!("page fault: vpn {vpn} loaded into pfn {pfn} (evicted {evicted:?})");
        AccessOutcome::PageFault { vpn, pfn, evicted }
    }

    /// 选出受害页并从所有结构中摘除，最后才释放帧
    fn evict_one(&mut self) -> Vpn {
        let (victim, pfn) = self.replacer.select_victim(&self.frames);
        self.page_table.unmap(victim);
        self.tlb.invalidate(victim);
        self.replacer.forget(victim, pfn);
        self.frames.release(pfn);
        self.page_evictions += 1;
        log::debug!("evicted vpn {victim} from pfn {pfn}");
        victim
    }

    pub fn stats(&self) -> SimStats {
        let tlb = self.tlb.stats();
        SimStats {
            tlb_hits: tlb.hits,
            tlb_misses: tlb.misses,
            page_faults: self.page_faults,
            page_evictions: self.page_evictions,
            tlb_evictions: tlb.evictions,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn policy(&self) -> ReplacementPolicyKind {
        self.replacer.kind()
    }

    pub fn tlb(&self) -> &TranslationCache {
        &self.tlb
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub fn frames(&self) -> &FramePool {
        &self.frames
    }

    pub fn replacer(&self) -> &Replacer {
        &self.replacer
    }

    /// 当前各表内容，供诊断输出
    pub fn snapshot(&self) -> MemorySnapshot {
        let (lru_order, clock) = match &self.replacer {
            Replacer::Lru(lru) => (Some(lru.order()), None),
            Replacer::Clock(clock) => (
                None,
                Some(ClockSnapshot {
                    hand: clock.hand(),
                    reference_bits: clock.reference_bits().to_vec(),
                }),
            ),
        };
        MemorySnapshot {
            tlb: self.tlb.entries(),
            page_table: self.page_table.entries(),
            frames: self.frames.slots().to_vec(),
            lru_order,
            clock,
        }
    }

    /// 检查 TLB、页表、帧池、替换状态与计数器之间的一致性
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let violation = |msg: String| Err(InvariantViolation(msg));

        for (vpn, pfn) in self.tlb.entries() {
            if self.page_table.lookup(vpn) != Some(pfn) {
                return violation(format!(
                    "TLB maps vpn {vpn} -> pfn {pfn} but page table has {:?}",
                    self.page_table.lookup(vpn)
                ));
            }
        }

        for (vpn, pfn) in self.page_table.entries() {
            if self.frames.occupant(pfn) != Some(vpn) {
                return violation(format!(
                    "page table maps vpn {vpn} -> pfn {pfn} but frame holds {:?}",
                    self.frames.occupant(pfn)
                ));
            }
        }

        let occupied = self.frames.occupied_count();
        for (index, slot) in self.frames.slots().iter().enumerate() {
            let pfn = Pfn(index);
            match *slot {
                Some(vpn) if self.page_table.lookup(vpn) != Some(pfn) => {
                    return violation(format!("frame {pfn} holds vpn {vpn} missing from page table"));
                }
                Some(_) if self.frames.is_free(pfn) => {
                    return violation(format!("occupied frame {pfn} is in the free set"));
                }
                None if !self.frames.is_free(pfn) => {
                    return violation(format!("empty frame {pfn} is not in the free set"));
                }
                _ => {}
            }
        }

        if self.frames.free_count() + occupied != self.frames.capacity() {
            return violation(format!(
                "{} free + {occupied} occupied frames != {}",
                self.frames.free_count(),
                self.frames.capacity()
            ));
        }
        if self.page_table.len() != occupied {
            return violation(format!(
                "{} page table entries but {occupied} occupied frames",
                self.page_table.len()
            ));
        }

        if self.replacer.tracked() != occupied {
            return violation(format!(
                "replacement state tracks {} pages but {occupied} frames are occupied",
                self.replacer.tracked()
            ));
        }
        match &self.replacer {
            Replacer::Lru(lru) => {
                for (vpn, pfn) in lru.entries() {
                    if self.page_table.lookup(vpn) != Some(pfn) {
                        return violation(format!("LRU order holds non-resident vpn {vpn}"));
                    }
                }
            }
            Replacer::Clock(clock) => {
                for (index, slot) in self.frames.slots().iter().enumerate() {
                    let pfn = Pfn(index);
                    if slot.is_some() != clock.is_tracked(pfn) {
                        return violation(format!("clock tracking disagrees with frame {pfn}"));
                    }
                    if slot.is_none() && clock.reference_bit(pfn) {
                        return violation(format!("free frame {pfn} has its reference bit set"));
                    }
                }
            }
        }

        let stats = self.stats();
        if stats.accesses() != self.accesses {
            return violation(format!(
                "{} hits + misses but {} accesses",
                stats.accesses(),
                self.accesses
            ));
        }
        if stats.page_faults > stats.tlb_misses {
            return violation(format!(
                "{} page faults exceed {} TLB misses",
                stats.page_faults, stats.tlb_misses
            ));
        }

        Ok(())
    }
}
