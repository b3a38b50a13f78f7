use log::trace;

use super::{AminoAcid, CodonId};
use crate::error::Result;
use crate::gene::{GeneCall, Strand};
use crate::util::dna;

/// 一个密码子在基因组上占据的 3 个连续位置 `[start, start + 3)`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodonWindow {
    /// 在基因翻译序列中的 0-based 序号
    pub order: usize,
    /// 窗口最左端（基因组坐标最小）的位置
    pub start: u64,
    pub strand: Strand,
}

impl CodonWindow {
    #[inline]
    pub fn stop(&self) -> u64 {
        self.start + 3
    }

    /// Genomic positions, ascending.
    #[inline]
    pub fn positions(&self) -> [u64; 3] {
        [self.start, self.start + 1, self.start + 2]
    }

    /// 将按基因组顺序读到的 3 个碱基转换为编码方向；反向链需反向互补。
    /// 参考序列与 reads 都经由这里解码，保证读框一致。
    #[inline]
    pub fn to_coding(&self, genomic: [u8; 3]) -> [u8; 3] {
        match self.strand {
            Strand::Forward => genomic,
            Strand::Reverse => dna::revcomp3(genomic),
        }
    }
}

/// 按翻译顺序产生密码子窗口，隐藏正/反链的下标运算。
#[derive(Debug, Clone)]
pub struct CodonWindows {
    start: u64,
    stop: u64,
    strand: Strand,
    next: usize,
    n: usize,
}

impl Iterator for CodonWindows {
    type Item = CodonWindow;

    fn next(&mut self) -> Option<CodonWindow> {
        if self.next >= self.n {
            return None;
        }
        let order = self.next;
        self.next += 1;
        let offset = 3 * order as u64;
        let start = match self.strand {
            Strand::Forward => self.start + offset,
            Strand::Reverse => self.stop - offset - 3,
        };
        Some(CodonWindow { order, start, strand: self.strand })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.n - self.next;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for CodonWindows {}

/// Windows of a gene that already passed [`GeneCall::check_complete`].
pub fn codon_windows(gene: &GeneCall) -> CodonWindows {
    CodonWindows {
        start: gene.start,
        stop: gene.stop,
        strand: gene.strand,
        next: 0,
        n: gene.n_codons(),
    }
}

/// 参考序列上的一个密码子
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codon {
    pub window: CodonWindow,
    /// 编码方向的 3 个碱基
    pub bases: [u8; 3],
    /// 含模糊碱基时为 `None`
    pub reference: Option<CodonId>,
}

impl Codon {
    #[inline]
    pub fn order(&self) -> usize {
        self.window.order
    }

    pub fn amino_acid(&self) -> Option<AminoAcid> {
        self.reference.map(CodonId::amino_acid)
    }
}

/// 把基因切分为按翻译顺序排列的密码子。
///
/// 基因为 partial、长度不是 3 的倍数或越过 contig 末端时返回 `MalformedGene`。
/// 含模糊碱基的密码子仍然保留窗口，只是 `reference` 为空。
pub fn extract_codons(gene: &GeneCall, contig_seq: &[u8]) -> Result<Vec<Codon>> {
    gene.check_complete(contig_seq.len())?;

    let mut codons = Vec::with_capacity(gene.n_codons());
    for window in codon_windows(gene) {
        let s = window.start as usize;
        let genomic = [contig_seq[s], contig_seq[s + 1], contig_seq[s + 2]];
        let bases = window.to_coding(genomic);
        let reference = match CodonId::from_bases(bases) {
            Ok(c) => Some(c),
            Err(e) => {
                trace!("gene {} codon {}: {}", gene.id, window.order, e);
                None
            }
        };
        codons.push(Codon { window, bases, reference });
    }
    Ok(codons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FreqError;

    fn gene(start: u64, stop: u64, strand: Strand) -> GeneCall {
        GeneCall { id: 1, contig: "c".into(), start, stop, strand, partial: false }
    }

    fn names(codons: &[Codon]) -> Vec<String> {
        codons.iter().map(|c| c.amino_acid().map(|a| a.to_string()).unwrap_or_default()).collect()
    }

    #[test]
    fn forward_gene_atg_cgt_taa() {
        let mut contig = b"GGGGGGGGGG".to_vec();
        contig.extend_from_slice(b"ATGCGTTAACC");
        let codons = extract_codons(&gene(10, 19, Strand::Forward), &contig).unwrap();
        assert_eq!(codons.len(), 3);
        let strs: Vec<String> = codons.iter().map(|c| c.reference.unwrap().to_string()).collect();
        assert_eq!(strs, vec!["ATG", "CGT", "TAA"]);
        assert_eq!(names(&codons), vec!["Met", "Arg", "STOP"]);
        assert_eq!(codons.iter().map(Codon::order).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(codons[1].window.start, 13);
    }

    #[test]
    fn windows_are_contiguous_and_non_overlapping() {
        for strand in [Strand::Forward, Strand::Reverse] {
            let g = gene(4, 34, strand);
            let mut starts: Vec<u64> = codon_windows(&g).map(|w| w.start).collect();
            assert_eq!(starts.len(), 10);
            starts.sort_unstable();
            for (i, s) in starts.iter().enumerate() {
                assert_eq!(*s, 4 + 3 * i as u64);
            }
        }
    }

    #[test]
    fn reverse_equals_forward_on_revcomp() {
        let seq = b"ATGAAACCCGGGTTTTAG".to_vec();
        let rc = dna::revcomp(&seq);
        let len = seq.len() as u64;
        let rev = extract_codons(&gene(0, len, Strand::Reverse), &seq).unwrap();
        let fwd = extract_codons(&gene(0, len, Strand::Forward), &rc).unwrap();
        let rev_bases: Vec<[u8; 3]> = rev.iter().map(|c| c.bases).collect();
        let fwd_bases: Vec<[u8; 3]> = fwd.iter().map(|c| c.bases).collect();
        assert_eq!(rev_bases, fwd_bases);
        // 反向链的第 0 个密码子位于基因最右端
        assert_eq!(rev[0].window.start, len - 3);
    }

    #[test]
    fn ambiguous_codon_keeps_window() {
        let codons = extract_codons(&gene(0, 9, Strand::Forward), b"ATGNNNTAA").unwrap();
        assert_eq!(codons.len(), 3);
        assert!(codons[1].reference.is_none());
        assert!(codons[2].reference.is_some());
    }

    #[test]
    fn malformed_and_partial_fail() {
        let seq = b"ATGCGTTAAC";
        assert!(matches!(
            extract_codons(&gene(0, 10, Strand::Forward), seq),
            Err(FreqError::MalformedGene { .. })
        ));
        let mut g = gene(0, 9, Strand::Forward);
        g.partial = true;
        assert!(matches!(extract_codons(&g, seq), Err(FreqError::MalformedGene { .. })));
    }
}
