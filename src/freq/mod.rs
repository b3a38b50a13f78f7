//! 频率统计
//!
//! 两种互斥的运行模式：
//!
//! - **直接序列模式**：每个基因一行，按参考序列上的密码子出现次数计数
//! - **linkmer 模式**：单个基因，每个密码子位置一行，只统计完整覆盖该位置的 reads，
//!   并记录覆盖度；零覆盖位置同样输出

pub mod normalize;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::codon::extract::{extract_codons, Codon};
use crate::codon::Alphabet;
use crate::error::{FreqError, Result};
use crate::gene::{GeneCall, Strand};
use crate::io::fasta::ContigStore;
use crate::linkmer::{select_linkmers, ReadSpanProvider};

/// 行标识：决定表头前缀列和每行对应的字段
pub trait RowKey {
    fn header() -> &'static [&'static str];
    fn fields(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneKey {
    pub gene_id: u64,
}

impl RowKey for GeneKey {
    fn header() -> &'static [&'static str] {
        &["gene_callers_id"]
    }

    fn fields(&self) -> Vec<String> {
        vec![self.gene_id.to_string()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodonKey {
    pub order: usize,
    pub contig: String,
    pub start: u64,
    pub stop: u64,
    pub strand: Strand,
    /// 参考密码子或氨基酸（随字母表），无法解析时为 `None`
    pub reference: Option<String>,
    pub coverage: u32,
}

impl RowKey for CodonKey {
    fn header() -> &'static [&'static str] {
        &["codon_order_in_gene", "contig_name", "start", "stop", "direction", "reference", "coverage"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.order.to_string(),
            self.contig.clone(),
            self.start.to_string(),
            self.stop.to_string(),
            self.strand.as_str().to_string(),
            self.reference.clone().unwrap_or_else(|| "NA".to_string()),
            self.coverage.to_string(),
        ]
    }
}

/// 一行频率：`values` 以字母表索引为下标
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyRow<K> {
    pub key: K,
    pub values: Vec<f64>,
}

impl<K> FrequencyRow<K> {
    pub fn new(key: K, alphabet: Alphabet) -> Self {
        Self { key, values: vec![0.0; alphabet.len()] }
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable<K> {
    pub alphabet: Alphabet,
    pub rows: Vec<FrequencyRow<K>>,
}

impl<K: RowKey> FrequencyTable<K> {
    pub fn header(&self) -> Vec<String> {
        K::header()
            .iter()
            .map(|s| s.to_string())
            .chain(self.alphabet.labels())
            .collect()
    }
}

impl<K> FrequencyTable<K> {
    /// Value of `label` in `row`, for callers that think in codon / amino acid names.
    pub fn value(&self, row: usize, label: &str) -> Option<f64> {
        let col = self.alphabet.labels().iter().position(|l| l == label)?;
        self.rows.get(row).map(|r| r.values[col])
    }
}

/// 直接序列模式中被跳过的基因数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipSummary {
    pub partial: usize,
    pub malformed: usize,
    /// 所有密码子都含模糊碱基
    pub empty: usize,
}

impl SkipSummary {
    pub fn total(&self) -> usize {
        self.partial + self.malformed + self.empty
    }

    /// 有基因被跳过时的摘要，`n_genes` 为所选基因总数
    pub fn describe(&self, n_genes: usize) -> Option<String> {
        if self.total() == 0 {
            return None;
        }
        Some(format!(
            "skipped {} of {} genes ({} partial, {} malformed, {} without resolvable codons)",
            self.total(),
            n_genes,
            self.partial,
            self.malformed,
            self.empty
        ))
    }
}

#[derive(Debug)]
pub struct DirectFrequencies {
    pub table: FrequencyTable<GeneKey>,
    pub skipped: SkipSummary,
}

enum GeneOutcome {
    Row(FrequencyRow<GeneKey>),
    Partial,
    Malformed,
    Empty,
}

fn count_gene(gene: &GeneCall, contigs: &ContigStore, alphabet: Alphabet) -> Result<GeneOutcome> {
    if gene.partial {
        debug!("gene {}: partial, skipped", gene.id);
        return Ok(GeneOutcome::Partial);
    }
    let seq = contigs
        .get(&gene.contig)
        .ok_or_else(|| FreqError::MissingContig(gene.contig.clone()))?;

    let codons = match extract_codons(gene, seq) {
        Ok(c) => c,
        Err(FreqError::MalformedGene { gene_id, reason }) => {
            warn!("gene {}: {}, skipped", gene_id, reason);
            return Ok(GeneOutcome::Malformed);
        }
        Err(e) => return Err(e),
    };

    let mut row = FrequencyRow::new(GeneKey { gene_id: gene.id }, alphabet);
    let mut n = 0usize;
    for codon in codons.iter().filter_map(|c| c.reference) {
        row.values[alphabet.slot(codon)] += 1.0;
        n += 1;
    }
    if n == 0 {
        debug!("gene {}: no resolvable codons", gene.id);
        return Ok(GeneOutcome::Empty);
    }
    if n < codons.len() {
        debug!("gene {}: {} of {} codons unresolved", gene.id, codons.len() - n, codons.len());
    }
    Ok(GeneOutcome::Row(row))
}

/// 直接序列模式：每个基因一行，行顺序为基因 id 升序。
///
/// partial / 结构异常 / 无可解析密码子的基因被跳过并计入 [`SkipSummary`]；
/// 全部跳过时返回 `NoData`。`threads > 1` 时在 rayon 线程池中并行统计。
pub fn direct_frequencies(
    genes: &[GeneCall],
    contigs: &ContigStore,
    alphabet: Alphabet,
    threads: usize,
) -> Result<DirectFrequencies> {
    let mut ordered: Vec<&GeneCall> = genes.iter().collect();
    ordered.sort_by_key(|g| g.id);

    let outcomes: Vec<GeneOutcome> = if threads > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| FreqError::config(format!("cannot build thread pool: {}", e)))?;
        pool.install(|| {
            ordered
                .par_iter()
                .map(|g| count_gene(g, contigs, alphabet))
                .collect::<Result<Vec<_>>>()
        })?
    } else {
        ordered
            .iter()
            .map(|g| count_gene(g, contigs, alphabet))
            .collect::<Result<Vec<_>>>()?
    };

    let mut rows = Vec::new();
    let mut skipped = SkipSummary::default();
    for outcome in outcomes {
        match outcome {
            GeneOutcome::Row(r) => rows.push(r),
            GeneOutcome::Partial => skipped.partial += 1,
            GeneOutcome::Malformed => skipped.malformed += 1,
            GeneOutcome::Empty => skipped.empty += 1,
        }
    }

    if let Some(msg) = skipped.describe(genes.len()) {
        warn!("{}", msg);
    }
    if rows.is_empty() {
        return Err(FreqError::NoData(format!(
            "none of the {} selected genes produced any residues",
            genes.len()
        )));
    }

    Ok(DirectFrequencies { table: FrequencyTable { alphabet, rows }, skipped })
}

fn codon_key(gene: &GeneCall, codon: &Codon, alphabet: Alphabet) -> CodonKey {
    CodonKey {
        order: codon.order(),
        contig: gene.contig.clone(),
        start: codon.window.start,
        stop: codon.window.stop(),
        strand: gene.strand,
        reference: codon.reference.map(|c| alphabet.label(c)),
        coverage: 0,
    }
}

/// linkmer 模式：对唯一的基因逐个密码子查询 reads，每个位置一行。
///
/// 多于一个基因返回 `UnsupportedMultiGene`；partial 或结构异常的基因直接失败。
pub fn linkmer_frequencies<P>(
    genes: &[GeneCall],
    contigs: &ContigStore,
    provider: &mut P,
    alphabet: Alphabet,
) -> Result<FrequencyTable<CodonKey>>
where
    P: ReadSpanProvider + ?Sized,
{
    let gene = match genes {
        [g] => g,
        [] => return Err(FreqError::NoData("no gene selected".to_string())),
        _ => return Err(FreqError::UnsupportedMultiGene(genes.len())),
    };
    let seq = contigs
        .get(&gene.contig)
        .ok_or_else(|| FreqError::MissingContig(gene.contig.clone()))?;
    let codons = extract_codons(gene, seq)?;
    if codons.is_empty() {
        return Err(FreqError::NoData(format!("gene {} has no codons", gene.id)));
    }

    let mut rows = Vec::with_capacity(codons.len());
    let mut uncovered = 0usize;
    for codon in &codons {
        let [first, _, last] = codon.window.positions();
        let spans = provider.read_spans(&gene.contig, first, last)?;
        let linkmers = select_linkmers(&codon.window, &spans);

        let mut key = codon_key(gene, codon, alphabet);
        key.coverage = linkmers.len() as u32;
        let mut row = FrequencyRow::new(key, alphabet);
        for l in &linkmers {
            row.values[alphabet.slot(l.codon)] += 1.0;
        }
        if linkmers.is_empty() {
            uncovered += 1;
        }
        rows.push(row);
    }

    info!(
        "gene {}: {} codon positions, {} without linkmer coverage",
        gene.id,
        rows.len(),
        uncovered
    );
    if uncovered == rows.len() {
        warn!("gene {}: no read spans all three bases of any codon", gene.id);
    }
    Ok(FrequencyTable { alphabet, rows })
}
