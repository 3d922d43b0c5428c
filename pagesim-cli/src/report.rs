//! 统计报告输出

use std::fmt::Write as _;

use pagesim_core::{Geometry, SimConfig};
use pagesim_mem::{MemorySimulator, MemorySnapshot, SimStats};
use serde::Serialize;

const WIDTH: usize = 60;

/// 千位分隔：1234567 -> "1,234,567"
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// 文本报告的标签语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportLanguage {
    #[default]
    English,
    /// 与葡萄牙语期望输出文件（`saida_*.in`）逐字一致
    Portuguese,
}

struct Labels {
    title: &'static str,
    policy: &'static str,
    page_size: &'static str,
    tlb_entries: &'static str,
    frames: &'static str,
}

impl ReportLanguage {
    /// 命令行取值：`en` / `pt`
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(ReportLanguage::English),
            "pt" | "pt-br" | "portuguese" => Some(ReportLanguage::Portuguese),
            _ => None,
        }
    }

    fn labels(self) -> Labels {
        match self {
            ReportLanguage::English => Labels {
                title: "MEMORY SIMULATOR - Access Statistics",
                policy: "Replacement Policy",
                page_size: "Page Size",
                tlb_entries: "TLB Entries",
                frames: "Frame Count",
            },
            ReportLanguage::Portuguese => Labels {
                title: "SIMULADOR DE MEMÓRIA - Estatísticas de Acesso",
                policy: "Política de Substituição",
                page_size: "Tamanho da Página",
                tlb_entries: "Entradas na TLB",
                frames: "Número de Frames",
            },
        }
    }
}

fn row(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "{:<28}{}", format!("{label}:"), value);
}

/// 文本统计报告；标签列按字符数对齐
pub fn render_statistics(
    config: &SimConfig,
    stats: &SimStats,
    language: ReportLanguage,
) -> String {
    let labels = language.labels();
    let heavy = "=".repeat(WIDTH);
    let light = "-".repeat(WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "{}", labels.title);
    let _ = writeln!(out, "{heavy}");
    row(&mut out, labels.policy, config.replacement_policy);
    row(&mut out, labels.page_size, format!("{} bytes", config.page_size));
    row(&mut out, labels.tlb_entries, config.num_tlb_entries);
    row(&mut out, labels.frames, config.num_frames);
    let _ = writeln!(out, "{light}");
    row(&mut out, "TLB Hits", format_thousands(stats.tlb_hits));
    row(&mut out, "TLB Misses", format_thousands(stats.tlb_misses));
    row(&mut out, "Page Faults", format_thousands(stats.page_faults));
    let _ = writeln!(out, "{heavy}");
    out
}

/// TLB / 页表 / 帧的文本转储
pub fn render_tables(snapshot: &MemorySnapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "TLB (oldest -> newest):");
    for (vpn, pfn) in &snapshot.tlb {
        let _ = writeln!(out, "  vpn {vpn:>8} -> pfn {pfn}");
    }
    let _ = writeln!(out, "Page table:");
    for (vpn, pfn) in &snapshot.page_table {
        let _ = writeln!(out, "  vpn {vpn:>8} -> pfn {pfn}");
    }
    let _ = writeln!(out, "Frames:");
    for (index, slot) in snapshot.frames.iter().enumerate() {
        match slot {
            Some(vpn) => {
                let _ = writeln!(out, "  [{index:>4}] vpn {vpn}");
            }
            None => {
                let _ = writeln!(out, "  [{index:>4}] <empty>");
            }
        }
    }
    if let Some(order) = &snapshot.lru_order {
        let pages: Vec<String> = order.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "LRU order (oldest -> newest): {}", pages.join(" "));
    }
    if let Some(clock) = &snapshot.clock {
        let bits: String = clock
            .reference_bits
            .iter()
            .map(|&bit| if bit { '1' } else { '0' })
            .collect();
        let _ = writeln!(out, "Clock hand: {}, reference bits: {bits}", clock.hand);
    }
    out
}

#[derive(Debug, Serialize)]
struct Rates {
    tlb_hit_rate: f64,
    fault_rate: f64,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    config: &'a SimConfig,
    geometry: &'a Geometry,
    stats: SimStats,
    rates: Rates,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<MemorySnapshot>,
}

/// JSON 报告
pub fn render_json(sim: &MemorySimulator, include_snapshot: bool) -> serde_json::Result<String> {
    let stats = sim.stats();
    let report = JsonReport {
        config: sim.config(),
        geometry: sim.geometry(),
        stats,
        rates: Rates {
            tlb_hit_rate: stats.tlb_hit_rate(),
            fault_rate: stats.fault_rate(),
        },
        snapshot: include_snapshot.then(|| sim.snapshot()),
    };
    serde_json::to_string_pretty(&report)
}

/// 与期望输出逐行比较（忽略行尾空白和末尾空行），返回第一处差异
pub fn compare_with_expected(actual: &str, expected: &str) -> Option<String> {
    let normalize = |text: &str| -> Vec<String> {
        let mut lines: Vec<String> = text.lines().map(|line| line.trim_end().to_string()).collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        lines
    };
    let actual = normalize(actual);
    let expected = normalize(expected);

    let max = actual.len().max(expected.len());
    for index in 0..max {
        let got = actual.get(index).map(String::as_str);
        let want = expected.get(index).map(String::as_str);
        if got != want {
            return Some(format!(
                "line {}: expected {:?}, got {:?}",
                index + 1,
                want.unwrap_or("<end of output>"),
                got.unwrap_or("<end of output>")
            ));
        }
    }
    None
}
