use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::codon::Alphabet;
use crate::error::{FreqError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    #[default]
    None,
    /// 每行除以行总和 ×100
    Percent,
    /// 每个同义密码子组内除以组总和 ×100
    PerAminoAcid,
}

impl Normalization {
    /// Combine the two independent switches the CLI exposes.
    pub fn from_flags(percent: bool, per_amino_acid: bool) -> Result<Self> {
        match (percent, per_amino_acid) {
            (true, true) => Err(FreqError::config(
                "percent normalization and per-amino-acid normalization are mutually exclusive",
            )),
            (true, false) => Ok(Normalization::Percent),
            (false, true) => Ok(Normalization::PerAminoAcid),
            (false, false) => Ok(Normalization::None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneSelector {
    #[default]
    All,
    Single(u64),
    List(Vec<u64>),
}

impl GeneSelector {
    pub fn from_ids(mut ids: Vec<u64>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        match ids.len() {
            0 => GeneSelector::All,
            1 => GeneSelector::Single(ids[0]),
            _ => GeneSelector::List(ids),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadSource {
    #[default]
    Absent,
    Bam(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreqConfig {
    pub alphabet: Alphabet,
    pub normalization: Normalization,
    pub genes: GeneSelector,
    pub reads: ReadSource,
    pub threads: usize,
}

impl Default for FreqConfig {
    fn default() -> Self {
        Self {
            alphabet: Alphabet::Codon,
            normalization: Normalization::None,
            genes: GeneSelector::All,
            reads: ReadSource::Absent,
            threads: 1,
        }
    }
}

impl FreqConfig {
    /// 在读取任何数据之前检查选项组合。
    ///
    /// `all` 在 BAM 模式下要等基因表加载后才知道数量，由聚合阶段再报
    /// `UnsupportedMultiGene`。
    pub fn validate(&self) -> Result<()> {
        if self.normalization == Normalization::PerAminoAcid && self.alphabet == Alphabet::AminoAcid {
            return Err(FreqError::config(
                "per-amino-acid normalization only applies to codon frequencies, not amino acid frequencies",
            ));
        }
        if let (ReadSource::Bam(path), GeneSelector::List(ids)) = (&self.reads, &self.genes) {
            return Err(FreqError::config(format!(
                "read-derived frequencies from '{}' need exactly one gene, got {}",
                path.display(),
                ids.len()
            )));
        }
        if self.threads == 0 {
            return Err(FreqError::config("threads must be at least 1"));
        }
        Ok(())
    }

    pub fn is_linkmer_mode(&self) -> bool {
        matches!(self.reads, ReadSource::Bam(_))
    }
}
