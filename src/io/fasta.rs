use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use log::debug;

use crate::error::{FreqError, Result};
use crate::util::dna;

#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub id: String,
    pub seq: Vec<u8>,
}

pub struct FastaReader<R: BufRead> {
    reader: R,
    buf: String,
    line_no: usize,
    done: bool,
    peek_header: Option<String>,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_no: 0,
            done: false,
            peek_header: None,
        }
    }

    fn read_line(&mut self) -> Result<usize> {
        self.buf.clear();
        let n = self.reader.read_line(&mut self.buf)?;
        if n > 0 {
            self.line_no += 1;
        }
        Ok(n)
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        if self.done {
            return Ok(None);
        }

        // Find header line
        let header = if let Some(h) = self.peek_header.take() {
            h
        } else {
            loop {
                if self.read_line()? == 0 {
                    self.done = true;
                    return Ok(None);
                }
                if let Some(h) = self.buf.strip_prefix('>') {
                    break h.trim().to_string();
                }
                if !self.buf.trim().is_empty() {
                    return Err(FreqError::parse(self.line_no, "sequence data before the first '>' header"));
                }
            }
        };

        // contig name is the first word of the header
        let id = header.split_whitespace().next().unwrap_or("").to_string();
        if id.is_empty() {
            return Err(FreqError::parse(self.line_no, "empty FASTA header"));
        }

        let mut raw: Vec<u8> = Vec::new();
        loop {
            if self.read_line()? == 0 {
                self.done = true;
                break;
            }
            if let Some(h) = self.buf.strip_prefix('>') {
                self.peek_header = Some(h.trim().to_string());
                break;
            }
            raw.extend(self.buf.bytes().filter(|b| !b.is_ascii_whitespace()));
        }

        Ok(Some(FastaRecord { id, seq: dna::normalize_seq(&raw) }))
    }
}

/// contig 名称 → 大写规范化序列
#[derive(Debug, Default, Clone)]
pub struct ContigStore {
    seqs: HashMap<String, Vec<u8>>,
}

impl ContigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, seq: Vec<u8>) {
        self.seqs.insert(name.to_string(), seq);
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.seqs.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut reader = FastaReader::new(reader);
        let mut store = Self::new();
        while let Some(rec) = reader.next_record()? {
            if store.seqs.contains_key(&rec.id) {
                return Err(FreqError::parse(reader.line_no, format!("duplicate contig '{}'", rec.id)));
            }
            store.seqs.insert(rec.id, rec.seq);
        }
        Ok(store)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let fh = std::fs::File::open(path)?;
        let store = Self::from_reader(std::io::BufReader::new(fh))?;
        debug!("loaded {} contigs from {}", store.len(), path.display());
        Ok(store)
    }
}
