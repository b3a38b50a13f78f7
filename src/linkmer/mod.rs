//! Linkmer 选择
//!
//! 一条 read 只有在一个密码子的 3 个基因组位置上都给出 A/C/G/T 碱基调用时，
//! 才算作该密码子的 linkmer。只覆盖 1~2 个位置、在窗口内有缺失/模糊碱基、
//! 或在窗口内部带插入的 read 整条排除，不贡献部分投票。

pub mod bam;

use std::collections::HashMap;

use crate::codon::extract::CodonWindow;
use crate::codon::CodonId;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Base(u8),
    /// 缺失或跳过的参考位置
    Gap,
}

/// 一条比对 read 在参考上的投影：`calls[i]` 对应位置 `start + i`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadSpan {
    pub name: String,
    pub start: u64,
    pub calls: Vec<Call>,
    /// 其后紧跟插入碱基的参考位置（升序）
    pub insertions: Vec<u64>,
}

impl ReadSpan {
    /// Build a span from a gapped string, `-` marking deletions.
    pub fn from_aligned(name: &str, start: u64, aligned: &[u8]) -> Self {
        let calls = aligned
            .iter()
            .map(|&b| if b == b'-' { Call::Gap } else { Call::Base(b.to_ascii_uppercase()) })
            .collect();
        Self { name: name.to_string(), start, calls, insertions: Vec::new() }
    }

    /// 右开区间终点
    #[inline]
    pub fn end(&self) -> u64 {
        self.start + self.calls.len() as u64
    }

    #[inline]
    pub fn call_at(&self, pos: u64) -> Option<Call> {
        if pos < self.start {
            return None;
        }
        self.calls.get((pos - self.start) as usize).copied()
    }

    /// Whether inserted bases follow any position in `[from, to)`.
    pub fn has_insertion_in(&self, from: u64, to: u64) -> bool {
        let i = self.insertions.partition_point(|&p| p < from);
        self.insertions.get(i).map_or(false, |&p| p < to)
    }

    pub fn overlaps(&self, start: u64, end_inclusive: u64) -> bool {
        self.start <= end_inclusive && self.end() > start
    }
}

/// 比对数据来源：给定 contig 和闭区间 `[start, end]`，返回与之重叠的 read。
pub trait ReadSpanProvider {
    fn read_spans(&mut self, contig: &str, start: u64, end: u64) -> Result<Vec<ReadSpan>>;
}

/// 内存中的 read 集合，测试和小数据集使用。
#[derive(Debug, Default, Clone)]
pub struct MemoryReadSpans {
    by_contig: HashMap<String, Vec<ReadSpan>>,
}

impl MemoryReadSpans {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, contig: &str, span: ReadSpan) {
        self.by_contig.entry(contig.to_string()).or_default().push(span);
    }
}

impl ReadSpanProvider for MemoryReadSpans {
    fn read_spans(&mut self, contig: &str, start: u64, end: u64) -> Result<Vec<ReadSpan>> {
        Ok(self
            .by_contig
            .get(contig)
            .map(|spans| spans.iter().filter(|s| s.overlaps(start, end)).cloned().collect())
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Linkmer<'a> {
    pub span: &'a ReadSpan,
    /// 编码方向解码后的密码子
    pub codon: CodonId,
}

/// Decode the codon a read carries across `window`, if it is a linkmer for it.
pub fn linkmer_codon(window: &CodonWindow, span: &ReadSpan) -> Option<CodonId> {
    let [p0, p1, p2] = window.positions();
    let mut genomic = [0u8; 3];
    for (slot, pos) in genomic.iter_mut().zip([p0, p1, p2]) {
        match span.call_at(pos)? {
            Call::Base(b) => *slot = b,
            Call::Gap => return None,
        }
    }
    if span.has_insertion_in(p0, p2) {
        return None;
    }
    CodonId::from_bases(window.to_coding(genomic)).ok()
}

/// 从候选 read 中挑出完整覆盖 `window` 的 linkmer。顺序不影响结果。
pub fn select_linkmers<'a>(window: &CodonWindow, spans: &'a [ReadSpan]) -> Vec<Linkmer<'a>> {
    spans
        .iter()
        .filter_map(|span| linkmer_codon(window, span).map(|codon| Linkmer { span, codon }))
        .collect()
}
