use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::config::GeneSelector;
use crate::error::{FreqError, Result};
use crate::gene::{GeneCall, Strand};

/// One line of the TAB gene-calls file; unknown columns are ignored.
#[derive(Debug, Deserialize)]
struct GeneCallRecord {
    gene_callers_id: u64,
    contig: String,
    start: u64,
    stop: u64,
    direction: Strand,
    partial: u8,
}

/// 按 id 排序的基因调用表
#[derive(Debug, Default, Clone)]
pub struct GeneCalls {
    by_id: BTreeMap<u64, GeneCall>,
}

impl GeneCalls {
    pub fn from_calls(calls: impl IntoIterator<Item = GeneCall>) -> Self {
        Self { by_id: calls.into_iter().map(|g| (g.id, g)).collect() }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().delimiter(b'\t').from_reader(reader);
        let mut by_id = BTreeMap::new();
        for (i, rec) in rdr.deserialize::<GeneCallRecord>().enumerate() {
            // header is line 1
            let line = i + 2;
            let rec = rec.map_err(|e| {
                let line = e.position().map_or(line, |p| p.line() as usize);
                FreqError::parse(line, e.to_string())
            })?;
            let partial = match rec.partial {
                0 => false,
                1 => true,
                other => return Err(FreqError::parse(line, format!("partial must be 0 or 1, got {}", other))),
            };
            let call = GeneCall {
                id: rec.gene_callers_id,
                contig: rec.contig,
                start: rec.start,
                stop: rec.stop,
                strand: rec.direction,
                partial,
            };
            if by_id.insert(call.id, call).is_some() {
                return Err(FreqError::parse(line, format!("duplicate gene_callers_id {}", rec.gene_callers_id)));
            }
        }
        Ok(Self { by_id })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let fh = std::fs::File::open(path)?;
        let calls = Self::from_reader(std::io::BufReader::new(fh))?;
        debug!("loaded {} gene calls from {}", calls.len(), path.display());
        Ok(calls)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&GeneCall> {
        self.by_id.get(&id)
    }

    /// 按选择器取出基因，id 升序；未知 id 返回 `UnknownGene`。
    pub fn select(&self, selector: &GeneSelector) -> Result<Vec<GeneCall>> {
        let pick = |id: u64| self.get(id).cloned().ok_or(FreqError::UnknownGene(id));
        match selector {
            GeneSelector::All => Ok(self.by_id.values().cloned().collect()),
            GeneSelector::Single(id) => Ok(vec![pick(*id)?]),
            GeneSelector::List(ids) => {
                let mut genes = ids.iter().map(|&id| pick(id)).collect::<Result<Vec<_>>>()?;
                genes.sort_by_key(|g| g.id);
                Ok(genes)
            }
        }
    }
}
