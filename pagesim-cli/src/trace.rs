//! 访问序列（trace）读取
//!
//! 每行一个十进制非负整数；空行和以 `#` 开头的行被忽略。

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use pagesim_core::{InputError, VirtAddr};
use pagesim_mem::MemorySimulator;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("failed to read trace: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: failed to read: {source}")]
    Read { line: usize, source: std::io::Error },

    #[error("line {line}: {source}")]
    Input { line: usize, source: InputError },
}

/// 一条访问记录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    /// 从 1 开始的行号
    pub line: usize,
    pub addr: VirtAddr,
}

pub struct TraceReader<R> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl TraceReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, TraceError> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceRecord, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = self.lines.next()?;
            self.line += 1;
            let text = match next {
                Ok(text) => text,
                Err(source) => {
                    return Some(Err(TraceError::Read {
                        line: self.line,
                        source,
                    }));
                }
            };

            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let line = self.line;
            return Some(
                trimmed
                    .parse::<VirtAddr>()
                    .map(|addr| TraceRecord { line, addr })
                    .map_err(|source| TraceError::Input { line, source }),
            );
        }
    }
}

/// 一次性读出整个文件中的地址
pub fn read_trace(path: &Path) -> Result<Vec<VirtAddr>, TraceError> {
    TraceReader::open(path)?
        .map(|record| record.map(|record| record.addr))
        .collect()
}

/// 把整条 trace 喂给模拟器，返回处理的访问数
pub fn replay<R: BufRead>(
    sim: &mut MemorySimulator,
    reader: TraceReader<R>,
) -> Result<u64, TraceError> {
    let mut count = 0;
    for record in reader {
        let record = record?;
        sim.access(record.addr).map_err(|source| TraceError::Input {
            line: record.line,
            source,
        })?;
        count += 1;
    }
    log::debug!("replayed {count} accesses");
    Ok(count)
}
