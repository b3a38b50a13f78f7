//! 密码子与氨基酸的封闭字母表
//!
//! - [`CodonId`]：64 个密码子，编码为 `first*16 + second*4 + third`（A=0, C=1, G=2, T=3），
//!   因此索引顺序即字典序 `AAA … TTT`
//! - [`AminoAcid`]：20 种氨基酸 + STOP，按三字母缩写排序
//! - [`Alphabet`]：一次运行内固定的输出字母表
//!
//! 频率表以字母表索引作为稠密向量下标，不使用字符串键。

pub mod extract;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FreqError, Result};
use crate::util::dna;

pub const N_CODONS: usize = 64;
pub const N_AMINO_ACIDS: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CodonId(u8);

impl CodonId {
    /// 三个碱基必须都是 A/C/G/T（U 视作 T），否则返回 `UnresolvedCodon`。
    pub fn from_bases(bases: [u8; 3]) -> Result<Self> {
        match (dna::base_index(bases[0]), dna::base_index(bases[1]), dna::base_index(bases[2])) {
            (Some(a), Some(b), Some(c)) => Ok(CodonId(a * 16 + b * 4 + c)),
            _ => Err(FreqError::UnresolvedCodon(String::from_utf8_lossy(&bases).into_owned())),
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        if i < N_CODONS { Some(CodonId(i as u8)) } else { None }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn bases(self) -> [u8; 3] {
        [
            dna::index_base(self.0 >> 4),
            dna::index_base((self.0 >> 2) & 3),
            dna::index_base(self.0 & 3),
        ]
    }

    #[inline]
    pub fn amino_acid(self) -> AminoAcid {
        STANDARD_CODE[self.index()]
    }

    pub fn all() -> impl Iterator<Item = CodonId> {
        (0..N_CODONS as u8).map(CodonId)
    }
}

impl fmt::Display for CodonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.bases();
        write!(f, "{}{}{}", b[0] as char, b[1] as char, b[2] as char)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AminoAcid {
    Ala,
    Arg,
    Asn,
    Asp,
    Cys,
    Gln,
    Glu,
    Gly,
    His,
    Ile,
    Leu,
    Lys,
    Met,
    Phe,
    Pro,
    Ser,
    Thr,
    Trp,
    Tyr,
    Val,
    Stop,
}

impl AminoAcid {
    pub const ALL: [AminoAcid; N_AMINO_ACIDS] = [
        AminoAcid::Ala,
        AminoAcid::Arg,
        AminoAcid::Asn,
        AminoAcid::Asp,
        AminoAcid::Cys,
        AminoAcid::Gln,
        AminoAcid::Glu,
        AminoAcid::Gly,
        AminoAcid::His,
        AminoAcid::Ile,
        AminoAcid::Leu,
        AminoAcid::Lys,
        AminoAcid::Met,
        AminoAcid::Phe,
        AminoAcid::Pro,
        AminoAcid::Ser,
        AminoAcid::Thr,
        AminoAcid::Trp,
        AminoAcid::Tyr,
        AminoAcid::Val,
        AminoAcid::Stop,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            AminoAcid::Ala => "Ala",
            AminoAcid::Arg => "Arg",
            AminoAcid::Asn => "Asn",
            AminoAcid::Asp => "Asp",
            AminoAcid::Cys => "Cys",
            AminoAcid::Gln => "Gln",
            AminoAcid::Glu => "Glu",
            AminoAcid::Gly => "Gly",
            AminoAcid::His => "His",
            AminoAcid::Ile => "Ile",
            AminoAcid::Leu => "Leu",
            AminoAcid::Lys => "Lys",
            AminoAcid::Met => "Met",
            AminoAcid::Phe => "Phe",
            AminoAcid::Pro => "Pro",
            AminoAcid::Ser => "Ser",
            AminoAcid::Thr => "Thr",
            AminoAcid::Trp => "Trp",
            AminoAcid::Tyr => "Tyr",
            AminoAcid::Val => "Val",
            AminoAcid::Stop => "STOP",
        }
    }

    /// 同义密码子组
    pub fn codons(self) -> impl Iterator<Item = CodonId> {
        CodonId::all().filter(move |c| c.amino_acid() == self)
    }

    const fn from_one_letter(b: u8) -> AminoAcid {
        match b {
            b'A' => AminoAcid::Ala,
            b'R' => AminoAcid::Arg,
            b'N' => AminoAcid::Asn,
            b'D' => AminoAcid::Asp,
            b'C' => AminoAcid::Cys,
            b'Q' => AminoAcid::Gln,
            b'E' => AminoAcid::Glu,
            b'G' => AminoAcid::Gly,
            b'H' => AminoAcid::His,
            b'I' => AminoAcid::Ile,
            b'L' => AminoAcid::Leu,
            b'K' => AminoAcid::Lys,
            b'M' => AminoAcid::Met,
            b'F' => AminoAcid::Phe,
            b'P' => AminoAcid::Pro,
            b'S' => AminoAcid::Ser,
            b'T' => AminoAcid::Thr,
            b'W' => AminoAcid::Trp,
            b'Y' => AminoAcid::Tyr,
            b'V' => AminoAcid::Val,
            _ => AminoAcid::Stop,
        }
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// NCBI translation table 1, indexed by CodonId
#[rustfmt::skip]
const STANDARD_CODE_LETTERS: &[u8; N_CODONS] =
    b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSS*CWCLFLF";

const fn build_standard_code() -> [AminoAcid; N_CODONS] {
    let mut table = [AminoAcid::Stop; N_CODONS];
    let mut i = 0;
    while i < N_CODONS {
        table[i] = AminoAcid::from_one_letter(STANDARD_CODE_LETTERS[i]);
        i += 1;
    }
    table
}

pub const STANDARD_CODE: [AminoAcid; N_CODONS] = build_standard_code();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alphabet {
    #[default]
    Codon,
    AminoAcid,
}

impl Alphabet {
    pub fn len(self) -> usize {
        match self {
            Alphabet::Codon => N_CODONS,
            Alphabet::AminoAcid => N_AMINO_ACIDS,
        }
    }

    pub fn is_empty(self) -> bool {
        false
    }

    /// 表头中字母表部分的列名，顺序固定
    pub fn labels(self) -> Vec<String> {
        match self {
            Alphabet::Codon => CodonId::all().map(|c| c.to_string()).collect(),
            Alphabet::AminoAcid => AminoAcid::ALL.iter().map(|a| a.name().to_string()).collect(),
        }
    }

    /// 密码子在本字母表中的列索引
    #[inline]
    pub fn slot(self, codon: CodonId) -> usize {
        match self {
            Alphabet::Codon => codon.index(),
            Alphabet::AminoAcid => codon.amino_acid().index(),
        }
    }

    pub fn label(self, codon: CodonId) -> String {
        match self {
            Alphabet::Codon => codon.to_string(),
            Alphabet::AminoAcid => codon.amino_acid().name().to_string(),
        }
    }
}
