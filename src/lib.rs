//! # codon-linkmers
//!
//! 计算基因每个密码子位置上的密码子 / 氨基酸频率分布。
//!
//! 两种模式：
//!
//! - **直接序列模式**：只用参考序列，每个基因一行，统计该基因中各密码子出现的次数
//! - **linkmer 模式**：使用比对到参考上的 reads，每个密码子位置一行；只有完整覆盖该
//!   密码子全部 3 个碱基的 read（linkmer）才参与计数，避免逐碱基 pileup 混淆读框
//!
//! 结果可以按行做百分比归一化，或按同义密码子组归一化（二者互斥）。
//!
//! ## 快速示例
//!
//! ```rust
//! use codon_linkmers::codon::Alphabet;
//! use codon_linkmers::freq;
//! use codon_linkmers::gene::{GeneCall, Strand};
//! use codon_linkmers::io::fasta::ContigStore;
//! use codon_linkmers::linkmer::{MemoryReadSpans, ReadSpan};
//!
//! let mut contigs = ContigStore::new();
//! contigs.insert("c1", b"GGATGCGTTAAGG".to_vec());
//! let gene = GeneCall { id: 1, contig: "c1".into(), start: 2, stop: 11, strand: Strand::Forward, partial: false };
//!
//! let mut reads = MemoryReadSpans::new();
//! reads.add("c1", ReadSpan::from_aligned("r1", 0, b"GGATGCGT"));
//!
//! let table = freq::linkmer_frequencies(&[gene], &contigs, &mut reads, Alphabet::AminoAcid).unwrap();
//! assert_eq!(table.value(0, "Met"), Some(1.0));
//! assert_eq!(table.rows[2].key.coverage, 0);
//! ```
//!
//! ## 模块说明
//!
//! - [`codon`] — 密码子 / 氨基酸字母表、标准遗传密码、密码子窗口提取
//! - [`linkmer`] — read 投影、linkmer 筛选、BAM 数据源
//! - [`freq`] — 频率统计与归一化
//! - [`io`] — FASTA、基因调用表读取与 TAB 输出
//! - [`pipeline`] — 端到端流程
//! - [`util`] — DNA 规范化 / 反向互补等工具函数

pub mod codon;
pub mod config;
pub mod error;
pub mod freq;
pub mod gene;
pub mod io;
pub mod linkmer;
pub mod pipeline;
pub mod util;
