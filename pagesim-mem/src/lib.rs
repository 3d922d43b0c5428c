//! pagesim-mem: 分页内存模拟
//!
//! 包含软件 TLB、单级页表、物理帧池、两种页面替换策略（精确 LRU 与时钟/二次机会）
//! 以及串起它们的访问协调器 [`MemorySimulator`]。
//!
//! ```rust
//! use pagesim_core::{ReplacementPolicyKind, SimConfig, VirtAddr};
//! use pagesim_mem::MemorySimulator;
//!
//! let mut sim = MemorySimulator::new(SimConfig {
//!     page_size: 4,
//!     num_tlb_entries: 2,
//!     num_frames: 2,
//!     replacement_policy: ReplacementPolicyKind::Lru,
//!     va_bits: 8,
//!     ..Default::default()
//! })
//! .unwrap();
//! sim.access(VirtAddr(0)).unwrap();
//! sim.access(VirtAddr(0)).unwrap();
//! assert_eq!(sim.stats().tlb_hits, 1);
//! assert_eq!(sim.stats().page_faults, 1);
//! ```

pub mod frame;
pub mod page_table;
pub mod replacement;
pub mod simulator;
pub mod stats;
pub mod tlb;

pub use frame::FramePool;
pub use page_table::PageTable;
pub use replacement::{ClockReplacer, LruReplacer, PageReplacer, Replacer};
pub use simulator::{AccessOutcome, MemorySimulator};
pub use stats::{ClockSnapshot, MemorySnapshot, SimStats};
pub use tlb::{TlbStats, TranslationCache};
