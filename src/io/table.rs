use std::io::Write;

use crate::codon::extract::Codon;
use crate::error::Result;
use crate::freq::{FrequencyTable, RowKey};
use crate::gene::GeneCall;

/// Raw counts print as integers, normalized values with at most 3 decimals.
fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as u64)
    } else {
        format!("{}", v)
    }
}

pub fn write_table<K: RowKey, W: Write + ?Sized>(table: &FrequencyTable<K>, out: &mut W) -> Result<()> {
    writeln!(out, "{}", table.header().join("\t"))?;
    for row in &table.rows {
        let mut fields = row.key.fields();
        fields.extend(row.values.iter().map(|&v| format_value(v)));
        writeln!(out, "{}", fields.join("\t"))?;
    }
    out.flush()?;
    Ok(())
}

/// 逐行列出一个基因的参考密码子
pub fn write_codons<W: Write + ?Sized>(gene: &GeneCall, codons: &[Codon], out: &mut W) -> Result<()> {
    writeln!(out, "codon_order_in_gene\tcontig_name\tstart\tstop\tdirection\tcodon\tamino_acid")?;
    for c in codons {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            c.order(),
            gene.contig,
            c.window.start,
            c.window.stop(),
            gene.strand.as_str(),
            String::from_utf8_lossy(&c.bases),
            c.amino_acid().map_or("NA", |a| a.name()),
        )?;
    }
    out.flush()?;
    Ok(())
}
