//! 从输入文件到输出表的完整流程

use std::io::Write;
use std::path::Path;

use log::info;

use crate::codon::extract::extract_codons;
use crate::config::{FreqConfig, ReadSource};
use crate::error::{FreqError, Result};
use crate::freq::{self, normalize::normalize, CodonKey, DirectFrequencies, FrequencyTable};
use crate::io::fasta::ContigStore;
use crate::io::gene_calls::GeneCalls;
use crate::io::table;
use crate::linkmer::bam::BamReadSpans;
use crate::linkmer::ReadSpanProvider;

/// 直接序列模式：选择基因、计数、归一化
pub fn frequencies_from_sequence(
    cfg: &FreqConfig,
    contigs: &ContigStore,
    calls: &GeneCalls,
) -> Result<DirectFrequencies> {
    cfg.validate()?;
    let genes = calls.select(&cfg.genes)?;
    let mut res = freq::direct_frequencies(&genes, contigs, cfg.alphabet, cfg.threads)?;
    normalize(&mut res.table, cfg.normalization)?;
    Ok(res)
}

/// linkmer 模式：reads 来自任意 [`ReadSpanProvider`]
pub fn frequencies_from_reads<P>(
    cfg: &FreqConfig,
    contigs: &ContigStore,
    calls: &GeneCalls,
    provider: &mut P,
) -> Result<FrequencyTable<CodonKey>>
where
    P: ReadSpanProvider + ?Sized,
{
    cfg.validate()?;
    let genes = calls.select(&cfg.genes)?;
    let mut table = freq::linkmer_frequencies(&genes, contigs, provider, cfg.alphabet)?;
    normalize(&mut table, cfg.normalization)?;
    Ok(table)
}

/// Validate, load inputs, compute, then write the table to `out`.
/// Nothing is written when any step fails.
pub fn run<W: Write + ?Sized>(cfg: &FreqConfig, contigs_path: &Path, gene_calls_path: &Path, out: &mut W) -> Result<()> {
    cfg.validate()?;
    let contigs = ContigStore::from_path(contigs_path)?;
    let calls = GeneCalls::from_path(gene_calls_path)?;
    info!("{} contigs, {} gene calls", contigs.len(), calls.len());

    match &cfg.reads {
        ReadSource::Absent => {
            let res = frequencies_from_sequence(cfg, &contigs, &calls)?;
            info!("{} genes reported, {} skipped", res.table.rows.len(), res.skipped.total());
            table::write_table(&res.table, out)
        }
        ReadSource::Bam(path) => {
            // gene count and gene structure are checked before the BAM is touched
            let genes = calls.select(&cfg.genes)?;
            match genes.as_slice() {
                [gene] => {
                    let seq = contigs
                        .get(&gene.contig)
                        .ok_or_else(|| FreqError::MissingContig(gene.contig.clone()))?;
                    gene.check_complete(seq.len())?;
                }
                [] => return Err(FreqError::NoData("no gene selected".to_string())),
                _ => return Err(FreqError::UnsupportedMultiGene(genes.len())),
            }
            let mut reads = BamReadSpans::open(path)?;
            let t = frequencies_from_reads(cfg, &contigs, &calls, &mut reads)?;
            info!("{} codon positions reported", t.rows.len());
            table::write_table(&t, out)
        }
    }
}

/// Run `produce` into memory and create `path` only once it succeeded,
/// so a failed run leaves no output file behind.
pub fn write_when_done<F>(path: &Path, produce: F) -> Result<()>
where
    F: FnOnce(&mut Vec<u8>) -> Result<()>,
{
    let mut buf = Vec::new();
    produce(&mut buf)?;
    std::fs::write(path, buf)?;
    Ok(())
}

/// List the reference codon windows of one gene.
pub fn list_codons<W: Write + ?Sized>(contigs_path: &Path, gene_calls_path: &Path, gene_id: u64, out: &mut W) -> Result<()> {
    let contigs = ContigStore::from_path(contigs_path)?;
    let calls = GeneCalls::from_path(gene_calls_path)?;
    let gene = calls.get(gene_id).ok_or(FreqError::UnknownGene(gene_id))?;
    let seq = contigs
        .get(&gene.contig)
        .ok_or_else(|| FreqError::MissingContig(gene.contig.clone()))?;
    let codons = extract_codons(gene, seq)?;
    table::write_codons(gene, &codons, out)
}
