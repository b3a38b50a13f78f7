use crate::codon::{Alphabet, CodonId, N_AMINO_ACIDS};
use crate::config::Normalization;
use crate::error::{FreqError, Result};

use super::FrequencyTable;

#[inline]
fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// 行内百分比；总和为 0 的行保持不变
pub fn percent_row(values: &mut [f64]) {
    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return;
    }
    for v in values.iter_mut() {
        *v = round3(*v * 100.0 / total);
    }
}

/// 同义密码子组内百分比；`values` 必须以 [`CodonId`] 为下标。
pub fn per_amino_acid_row(values: &mut [f64]) {
    let mut group_totals = [0.0f64; N_AMINO_ACIDS];
    for codon in CodonId::all() {
        group_totals[codon.amino_acid().index()] += values[codon.index()];
    }
    for codon in CodonId::all() {
        let total = group_totals[codon.amino_acid().index()];
        if total != 0.0 {
            let v = &mut values[codon.index()];
            *v = round3(*v * 100.0 / total);
        }
    }
}

pub fn normalize<K>(table: &mut FrequencyTable<K>, mode: Normalization) -> Result<()> {
    match mode {
        Normalization::None => {}
        Normalization::Percent => {
            for row in &mut table.rows {
                percent_row(&mut row.values);
            }
        }
        Normalization::PerAminoAcid => {
            if table.alphabet != Alphabet::Codon {
                return Err(FreqError::InvalidMode(
                    "per-amino-acid normalization needs codon frequencies".to_string(),
                ));
            }
            for row in &mut table.rows {
                per_amino_acid_row(&mut row.values);
            }
        }
    }
    Ok(())
}
