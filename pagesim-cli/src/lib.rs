//! # pagesim-cli
//!
//! 分页模拟器命令行工具：读取访问序列、回放并输出统计报告。

pub mod cli;
pub mod report;
pub mod settings;
pub mod trace;

pub use cli::{RunOutput, command, execute, resolve_config};
pub use settings::{Overrides, SettingsError, load_config};
pub use trace::{TraceError, TraceReader, TraceRecord, read_trace, replay};
