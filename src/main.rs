use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use codon_linkmers::codon::Alphabet;
use codon_linkmers::config::{FreqConfig, GeneSelector, Normalization, ReadSource};
use codon_linkmers::pipeline;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(
    name = "codon-linkmers",
    author,
    version,
    about = "Per-codon codon / amino acid frequencies from reference genes or linkmer reads",
    arg_required_else_help = true
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbosity: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Codon or amino acid frequencies, per gene or per codon position (with --bam)
    Freq {
        /// Contig sequences (FASTA)
        #[arg(short = 'c', long = "contigs")]
        contigs: PathBuf,
        /// Gene calls (TAB: gene_callers_id, contig, start, stop, direction, partial)
        #[arg(short = 'g', long = "gene-calls")]
        gene_calls: PathBuf,
        /// Gene to report; repeat for several, omit for all genes
        #[arg(long = "gene-id")]
        gene_ids: Vec<u64>,
        /// Indexed BAM; switches to per-codon linkmer frequencies of a single gene
        #[arg(short = 'b', long = "bam")]
        bam: Option<PathBuf>,
        /// Report amino acids instead of codons
        #[arg(long = "return-aa")]
        return_aa: bool,
        /// Divide each row by its total (x100)
        #[arg(long = "percent-normalize")]
        percent_normalize: bool,
        /// Divide each codon by the total of its synonymous codons (x100)
        #[arg(long = "per-aa-normalize")]
        per_aa_normalize: bool,
        /// Output TAB file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
    },
    /// List the reference codons of one gene
    Codons {
        #[arg(short = 'c', long = "contigs")]
        contigs: PathBuf,
        #[arg(short = 'g', long = "gene-calls")]
        gene_calls: PathBuf,
        #[arg(long = "gene-id")]
        gene_id: u64,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_secs()
        .init();
}

/// Write to `path` only after `produce` succeeded, or stream to stdout.
fn emit<F>(path: Option<&Path>, produce: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> codon_linkmers::error::Result<()>,
{
    match path {
        Some(p) => pipeline::write_when_done(p, |buf| produce(buf))
            .with_context(|| format!("cannot produce output '{}'", p.display())),
        None => {
            let mut w = std::io::BufWriter::new(std::io::stdout().lock());
            produce(&mut w)?;
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity);
    log::info!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Freq {
            contigs,
            gene_calls,
            gene_ids,
            bam,
            return_aa,
            percent_normalize,
            per_aa_normalize,
            out,
            threads,
        } => {
            let cfg = FreqConfig {
                alphabet: if return_aa { Alphabet::AminoAcid } else { Alphabet::Codon },
                normalization: Normalization::from_flags(percent_normalize, per_aa_normalize)?,
                genes: GeneSelector::from_ids(gene_ids),
                reads: bam.map_or(ReadSource::Absent, ReadSource::Bam),
                threads,
            };
            // reject contradictory options before touching any input
            cfg.validate()?;
            log::debug!("configuration: {:?}", cfg);
            emit(out.as_deref(), |w| pipeline::run(&cfg, &contigs, &gene_calls, w))?;
        }
        Commands::Codons { contigs, gene_calls, gene_id, out } => {
            emit(out.as_deref(), |w| pipeline::list_codons(&contigs, &gene_calls, gene_id, w))?;
        }
    }
    Ok(())
}
