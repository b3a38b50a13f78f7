use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use codon_linkmers::codon::Alphabet;
use codon_linkmers::config::{FreqConfig, GeneSelector, Normalization, ReadSource};
use codon_linkmers::error::FreqError;
use codon_linkmers::pipeline;

const CONTIGS: &str = ">contig_1 test\nGGGGGGGGGGATGCGTTAACC\nGGGGGG\n>contig_2\nATGAAATTTGGGCCCTAG\n";

const GENE_CALLS: &str = "gene_callers_id\tcontig\tstart\tstop\tdirection\tpartial\n\
                          0\tcontig_1\t10\t19\tf\t0\n\
                          1\tcontig_2\t0\t18\tf\t0\n\
                          2\tcontig_2\t0\t18\tr\t1\n\
                          3\tcontig_1\t0\t10\tf\t0\n";

fn temp_with(content: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("temp file");
    f.write_all(content.as_bytes()).expect("write temp file");
    f
}

fn run_to_string(cfg: &FreqConfig) -> Result<String, FreqError> {
    let contigs = temp_with(CONTIGS);
    let calls = temp_with(GENE_CALLS);
    let mut out = Vec::new();
    pipeline::run(cfg, contigs.path(), calls.path(), &mut out)?;
    Ok(String::from_utf8(out).expect("utf8 output"))
}

fn column(header: &str, name: &str) -> usize {
    header.split('\t').position(|h| h == name).expect("column present")
}

#[test]
fn amino_acid_frequencies_for_all_genes() {
    let cfg = FreqConfig { alphabet: Alphabet::AminoAcid, ..FreqConfig::default() };
    let text = run_to_string(&cfg).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    // gene 2 is partial, gene 3 is not a multiple of 3
    assert_eq!(lines.len(), 3);
    let header = lines[0];
    let met = column(header, "Met");
    let arg = column(header, "Arg");
    let stop = column(header, "STOP");

    let g0: Vec<&str> = lines[1].split('\t').collect();
    assert_eq!(g0[0], "0");
    assert_eq!((g0[met], g0[arg], g0[stop]), ("1", "1", "1"));

    let g1: Vec<&str> = lines[2].split('\t').collect();
    assert_eq!(g1[0], "1");
    let total: u32 = g1[1..].iter().map(|v| v.parse::<u32>().unwrap()).sum();
    assert_eq!(total, 6);
}

#[test]
fn percent_normalized_codons_for_one_gene() {
    let cfg = FreqConfig {
        normalization: Normalization::Percent,
        genes: GeneSelector::Single(1),
        ..FreqConfig::default()
    };
    let text = run_to_string(&cfg).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    let atg = column(lines[0], "ATG");
    let fields: Vec<&str> = lines[1].split('\t').collect();
    assert_eq!(fields[atg], "16.667");
    let sum: f64 = fields[1..].iter().map(|v| v.parse::<f64>().unwrap()).sum();
    assert!((sum - 100.0).abs() <= 0.001 * 64.0);
}

#[test]
fn only_partial_gene_selected_is_no_data() {
    let cfg = FreqConfig { genes: GeneSelector::Single(2), ..FreqConfig::default() };
    assert!(matches!(run_to_string(&cfg), Err(FreqError::NoData(_))));
}

#[test]
fn contradictory_options_fail_before_reading_inputs() {
    let cfg = FreqConfig {
        alphabet: Alphabet::AminoAcid,
        normalization: Normalization::PerAminoAcid,
        ..FreqConfig::default()
    };
    let mut out = Vec::new();
    let err = pipeline::run(&cfg, Path::new("/nonexistent/contigs.fa"), Path::new("/nonexistent/calls.tsv"), &mut out)
        .unwrap_err();
    assert!(matches!(err, FreqError::Configuration(_)));
    assert!(out.is_empty());
}

#[test]
fn bam_mode_with_missing_file_fails() {
    let cfg = FreqConfig {
        genes: GeneSelector::Single(0),
        reads: ReadSource::Bam("/nonexistent/reads.bam".into()),
        ..FreqConfig::default()
    };
    assert!(matches!(run_to_string(&cfg), Err(FreqError::Bam(_))));
}

#[test]
fn bam_mode_rejects_all_genes() {
    let cfg = FreqConfig { reads: ReadSource::Bam("/nonexistent/reads.bam".into()), ..FreqConfig::default() };
    let err = run_to_string(&cfg).unwrap_err();
    // gene count is checked before the BAM is opened
    assert!(matches!(err, FreqError::UnsupportedMultiGene(4)));
}

#[test]
fn codon_listing_for_reverse_gene() {
    let contigs = temp_with(CONTIGS);
    let calls = temp_with(
        "gene_callers_id\tcontig\tstart\tstop\tdirection\tpartial\n5\tcontig_2\t0\t18\tr\t0\n",
    );
    let mut out = Vec::new();
    pipeline::list_codons(contigs.path(), calls.path(), 5, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 7);
    // revcomp(ATGAAATTTGGGCCCTAG) = CTAGGGCCCAAATTTCAT
    assert_eq!(lines[1], "0\tcontig_2\t15\t18\tr\tCTA\tLeu");
    assert_eq!(lines[6], "5\tcontig_2\t0\t3\tr\tCAT\tHis");
}

#[test]
fn bam_mode_partial_gene_fails_before_opening_reads() {
    let cfg = FreqConfig {
        genes: GeneSelector::Single(2),
        reads: ReadSource::Bam("/nonexistent/reads.bam".into()),
        ..FreqConfig::default()
    };
    let err = run_to_string(&cfg).unwrap_err();
    assert!(matches!(err, FreqError::MalformedGene { gene_id: 2, .. }));
}

#[test]
fn failed_run_leaves_no_output_file() {
    let contigs = temp_with(CONTIGS);
    let calls = temp_with(GENE_CALLS);
    let dir = tempfile::tempdir().expect("temp dir");

    let no_data = FreqConfig { genes: GeneSelector::Single(2), ..FreqConfig::default() };
    let failed = dir.path().join("failed.tsv");
    let err = pipeline::write_when_done(&failed, |buf| pipeline::run(&no_data, contigs.path(), calls.path(), buf))
        .unwrap_err();
    assert!(matches!(err, FreqError::NoData(_)));
    assert!(!failed.exists());

    let ok = FreqConfig { genes: GeneSelector::Single(0), ..FreqConfig::default() };
    let written = dir.path().join("gene0.tsv");
    pipeline::write_when_done(&written, |buf| pipeline::run(&ok, contigs.path(), calls.path(), buf)).unwrap();
    let text = std::fs::read_to_string(&written).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.starts_with("gene_callers_id\tAAA"));
}
