use std::path::Path;

use log::debug;
use rust_htslib::bam::{self, record::Cigar, Read, Record};

use super::{Call, ReadSpan, ReadSpanProvider};
use crate::error::{FreqError, Result};

/// 基于已建索引 BAM 的 read 来源
pub struct BamReadSpans {
    reader: bam::IndexedReader,
    record: Record,
}

impl BamReadSpans {
    pub fn open(path: &Path) -> Result<Self> {
        let reader = bam::IndexedReader::from_path(path)
            .map_err(|e| FreqError::Bam(format!("cannot open indexed BAM '{}': {}", path.display(), e)))?;
        Ok(Self { reader, record: Record::new() })
    }
}

impl ReadSpanProvider for BamReadSpans {
    fn read_spans(&mut self, contig: &str, start: u64, end: u64) -> Result<Vec<ReadSpan>> {
        self.reader
            .fetch((contig, start as i64, end as i64 + 1))
            .map_err(|e| FreqError::Bam(format!("fetch {}:{}-{} failed: {}", contig, start, end, e)))?;

        let mut spans = Vec::new();
        let mut skipped = 0usize;
        while let Some(res) = self.reader.read(&mut self.record) {
            res.map_err(|e| FreqError::Bam(format!("reading {}: {}", contig, e)))?;
            let rec = &self.record;
            if rec.is_unmapped() || rec.is_secondary() || rec.is_supplementary() {
                skipped += 1;
                continue;
            }
            spans.push(span_from_record(rec));
        }
        if skipped > 0 {
            debug!("{}:{}-{}: ignored {} unmapped/secondary/supplementary records", contig, start, end, skipped);
        }
        Ok(spans)
    }
}

/// 沿 CIGAR 把一条比对记录投影到参考坐标上。
pub fn span_from_record(rec: &Record) -> ReadSpan {
    let seq = rec.seq().as_bytes();
    let start = rec.pos().max(0) as u64;
    let mut calls: Vec<Call> = Vec::with_capacity(seq.len());
    let mut insertions = Vec::new();
    let mut qpos = 0usize;

    for op in rec.cigar().iter() {
        match *op {
            Cigar::Match(l) | Cigar::Equal(l) | Cigar::Diff(l) => {
                for _ in 0..l {
                    let b = seq.get(qpos).copied().unwrap_or(b'N');
                    calls.push(Call::Base(b.to_ascii_uppercase()));
                    qpos += 1;
                }
            }
            Cigar::Del(l) | Cigar::RefSkip(l) => {
                calls.extend(std::iter::repeat(Call::Gap).take(l as usize));
            }
            Cigar::Ins(l) => {
                // leading insertions sit before the first reference base
                if !calls.is_empty() {
                    insertions.push(start + calls.len() as u64 - 1);
                }
                qpos += l as usize;
            }
            Cigar::SoftClip(l) => qpos += l as usize,
            Cigar::HardClip(_) | Cigar::Pad(_) => {}
        }
    }

    ReadSpan {
        name: String::from_utf8_lossy(rec.qname()).into_owned(),
        start,
        calls,
        insertions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_htslib::bam::record::CigarString;

    fn create_record(bases: &[u8], pos: i64, cigar: Vec<Cigar>) -> Record {
        let mut rec = Record::new();
        let qual = vec![40; bases.len()];
        rec.set(b"read1", Some(&CigarString(cigar)), bases, &qual);
        rec.set_pos(pos);
        rec
    }

    fn placed_record(name: &[u8], pos: i64, flags: u16, cigar: Option<Vec<Cigar>>) -> Record {
        let bases = b"ACGTAC";
        let mut rec = Record::new();
        let cigar = cigar.map(CigarString);
        rec.set(name, cigar.as_ref(), bases, &[40; 6]);
        rec.set_tid(0);
        rec.set_pos(pos);
        rec.set_mtid(-1);
        rec.set_mpos(-1);
        rec.set_mapq(60);
        rec.set_flags(flags);
        rec
    }

    #[test]
    fn fetch_window_skips_non_primary_and_respects_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reads.bam");

        let mut header = bam::Header::new();
        let mut sq = bam::header::HeaderRecord::new(b"SQ");
        sq.push_tag(b"SN", "c1");
        sq.push_tag(b"LN", 100);
        header.push_record(&sq);

        let m6 = || Some(vec![Cigar::Match(6)]);
        // coordinate-sorted
        let records = vec![
            placed_record(b"primary", 8, 0, m6()),
            placed_record(b"secondary", 9, 0x100, m6()),
            placed_record(b"supplementary", 9, 0x800, m6()),
            placed_record(b"unmapped", 10, 0x4, None),
            placed_record(b"last_base", 12, 0, m6()),
            placed_record(b"after_window", 13, 0, m6()),
        ];
        {
            let mut writer = bam::Writer::from_path(&path, &header, bam::Format::Bam).unwrap();
            for rec in &records {
                writer.write(rec).unwrap();
            }
        }
        bam::index::build(&path, None, bam::index::Type::Bai, 1).unwrap();

        let mut reads = BamReadSpans::open(&path).unwrap();
        let mut names: Vec<String> = reads.read_spans("c1", 10, 12).unwrap().into_iter().map(|s| s.name).collect();
        names.sort();
        assert_eq!(names, vec!["last_base", "primary"]);
    }

    #[test]
    fn open_missing_bam_is_bam_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(BamReadSpans::open(&dir.path().join("none.bam")), Err(FreqError::Bam(_))));
    }

    #[test]
    fn match_deletion_and_softclip() {
        let rec = create_record(
            b"NNACGTTT",
            100,
            vec![Cigar::SoftClip(2), Cigar::Match(3), Cigar::Del(2), Cigar::Match(3)],
        );
        let span = span_from_record(&rec);
        assert_eq!(span.name, "read1");
        assert_eq!(span.start, 100);
        assert_eq!(span.end(), 108);
        assert_eq!(span.call_at(100), Some(Call::Base(b'A')));
        assert_eq!(span.call_at(103), Some(Call::Gap));
        assert_eq!(span.call_at(104), Some(Call::Gap));
        assert_eq!(span.call_at(105), Some(Call::Base(b'T')));
        assert!(span.insertions.is_empty());
    }

    #[test]
    fn insertion_is_recorded_after_its_anchor() {
        let rec = create_record(b"ACGGGT", 10, vec![Cigar::Match(2), Cigar::Ins(2), Cigar::Match(2)]);
        let span = span_from_record(&rec);
        assert_eq!(span.insertions, vec![11]);
        assert_eq!(span.calls.len(), 4);
        assert_eq!(span.call_at(12), Some(Call::Base(b'G')));
        assert_eq!(span.call_at(13), Some(Call::Base(b'T')));
    }
}
