use serde::{Deserialize, Serialize};

use crate::error::{FreqError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "f")]
    Forward,
    #[serde(rename = "r")]
    Reverse,
}

impl Strand {
    pub fn as_str(self) -> &'static str {
        match self {
            Strand::Forward => "f",
            Strand::Reverse => "r",
        }
    }
}

/// 基因调用：0-based 半开区间 `[start, stop)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneCall {
    pub id: u64,
    pub contig: String,
    pub start: u64,
    pub stop: u64,
    pub strand: Strand,
    pub partial: bool,
}

impl GeneCall {
    pub fn len(&self) -> u64 {
        self.stop.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn n_codons(&self) -> usize {
        (self.len() / 3) as usize
    }

    /// Structural checks shared by both modes. `contig_len` bounds the span.
    pub fn check_complete(&self, contig_len: usize) -> Result<()> {
        if self.partial {
            return Err(FreqError::malformed(self.id, "gene call is partial"));
        }
        if self.stop < self.start {
            return Err(FreqError::malformed(
                self.id,
                format!("stop {} precedes start {}", self.stop, self.start),
            ));
        }
        if self.len() % 3 != 0 {
            return Err(FreqError::malformed(
                self.id,
                format!("span length {} is not a multiple of 3", self.len()),
            ));
        }
        if self.stop as usize > contig_len {
            return Err(FreqError::malformed(
                self.id,
                format!("stop {} is past the end of contig '{}' ({} bp)", self.stop, self.contig, contig_len),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gene(start: u64, stop: u64, partial: bool) -> GeneCall {
        GeneCall { id: 7, contig: "c1".into(), start, stop, strand: Strand::Forward, partial }
    }

    #[test]
    fn complete_gene_passes() {
        assert!(gene(0, 9, false).check_complete(20).is_ok());
        assert_eq!(gene(0, 9, false).n_codons(), 3);
    }

    #[test]
    fn rejects_partial_frame_and_bounds() {
        assert!(matches!(gene(0, 9, true).check_complete(20), Err(FreqError::MalformedGene { gene_id: 7, .. })));
        assert!(gene(0, 10, false).check_complete(20).is_err());
        assert!(gene(12, 24, false).check_complete(20).is_err());
        assert!(gene(9, 3, false).check_complete(20).is_err());
    }
}
