//! 命令行定义与执行流程

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use log::info;
use pagesim_core::{ReplacementPolicyKind, SimConfig};
use pagesim_mem::MemorySimulator;

use crate::report::{self, ReportLanguage};
use crate::settings::{self, Overrides};
use crate::trace::{self, TraceReader};

/// 一次运行的输出
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub text: String,
    /// `--expect` 不一致时的首处差异
    pub mismatch: Option<String>,
}

pub fn command() -> Command {
    Command::new("pagesim")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Replay a memory access trace through a TLB + page table simulator")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML config file (fields of SimConfig)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("page-size")
                .short('p')
                .long("page-size")
                .value_name("BYTES")
                .help("Page size in bytes [default: 4096]")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("tlb-entries")
                .short('t')
                .long("tlb-entries")
                .value_name("N")
                .help("Number of TLB entries [default: 16]")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("frames")
                .short('f')
                .long("frames")
                .value_name("N")
                .help("Number of physical frames [default: 64]")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("policy")
                .short('r')
                .long("policy")
                .value_name("POLICY")
                .help("Replacement policy: LRU or SecondChance [default: LRU]"),
        )
        .arg(
            Arg::new("va-bits")
                .short('b')
                .long("va-bits")
                .value_name("BITS")
                .help("Virtual address width [default: 32]")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("strict-addresses")
                .long("strict-addresses")
                .help("Reject addresses >= 2^va_bits")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .help("Report format")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            Arg::new("labels")
                .long("labels")
                .value_name("LANG")
                .help("Language of the text report labels (pt matches the saida_*.in files)")
                .value_parser(["en", "pt"])
                .default_value("en"),
        )
        .arg(
            Arg::new("dump")
                .long("dump")
                .help("Also print TLB, page table and frames")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("expect")
                .long("expect")
                .value_name("FILE")
                .help("Compare the report with FILE; exit 1 on mismatch")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("trace")
                .value_name("TRACE")
                .help("Trace file, one decimal address per line")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
}

/// 合并配置文件与命令行参数
pub fn resolve_config(matches: &ArgMatches) -> Result<SimConfig> {
    let base = match matches.get_one::<PathBuf>("config") {
        Some(path) => settings::load_config(path)?,
        None => SimConfig::default(),
    };

    let replacement_policy = matches
        .get_one::<String>("policy")
        .map(|name| name.parse::<ReplacementPolicyKind>())
        .transpose()?;

    let overrides = Overrides {
        page_size: matches.get_one::<u64>("page-size").copied(),
        num_tlb_entries: matches.get_one::<usize>("tlb-entries").copied(),
        num_frames: matches.get_one::<usize>("frames").copied(),
        replacement_policy,
        va_bits: matches.get_one::<u32>("va-bits").copied(),
        enforce_va_bound: matches.get_flag("strict-addresses"),
    };
    Ok(overrides.apply(base))
}

fn read_expected(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read expected output {}", path.display()))
}

pub fn execute(matches: &ArgMatches) -> Result<RunOutput> {
    let config = resolve_config(matches)?;
    let mut sim = MemorySimulator::new(config).context("invalid simulator configuration")?;

    let trace_path = matches
        .get_one::<PathBuf>("trace")
        .context("missing trace file argument")?;
    info!(
        "replaying {} with {} policy",
        trace_path.display(),
        sim.policy()
    );

    let reader = TraceReader::open(trace_path)
        .with_context(|| format!("failed to open trace {}", trace_path.display()))?;
    let count = trace::replay(&mut sim, reader)
        .with_context(|| format!("failed to replay trace {}", trace_path.display()))?;

    let stats = sim.stats();
    info!(
        "replayed {count} accesses: {} TLB hits, {} page faults",
        stats.tlb_hits, stats.page_faults
    );

    let dump = matches.get_flag("dump");
    let text = match matches.get_one::<String>("format").map(String::as_str) {
        Some("json") => report::render_json(&sim, dump).context("failed to encode JSON report")?,
        _ => {
            let language = matches
                .get_one::<String>("labels")
                .and_then(|code| ReportLanguage::from_code(code))
                .unwrap_or_default();
            let mut text = report::render_statistics(sim.config(), &stats, language);
            if dump {
                text.push_str(&report::render_tables(&sim.snapshot()));
            }
            text
        }
    };

    let mismatch = match matches.get_one::<PathBuf>("expect") {
        Some(path) => report::compare_with_expected(&text, &read_expected(path)?),
        None => None,
    };

    Ok(RunOutput { text, mismatch })
}
