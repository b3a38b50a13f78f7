//! 错误类型
//!
//! 所有库函数返回 [`Result`]；二进制入口在顶层转换为 `anyhow::Error`。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FreqError {
    /// 选项组合互相矛盾，在读取任何数据之前检出
    #[error("configuration error: {0}")]
    Configuration(String),

    /// 基因长度不是 3 的倍数、坐标越界，或在需要完整基因的模式下遇到 partial 基因
    #[error("malformed gene {gene_id}: {reason}")]
    MalformedGene { gene_id: u64, reason: String },

    #[error("no data: {0}")]
    NoData(String),

    /// 含模糊碱基的密码子，只在局部被排除
    #[error("unresolved codon '{0}'")]
    UnresolvedCodon(String),

    #[error("read-derived frequencies support exactly one gene, {0} were requested")]
    UnsupportedMultiGene(usize),

    #[error("invalid mode: {0}")]
    InvalidMode(String),

    #[error("gene {0} is not in the gene calls")]
    UnknownGene(u64),

    #[error("contig '{0}' has no sequence")]
    MissingContig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("BAM error: {0}")]
    Bam(String),
}

pub type Result<T> = std::result::Result<T, FreqError>;

impl FreqError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn malformed(gene_id: u64, reason: impl Into<String>) -> Self {
        Self::MalformedGene { gene_id, reason: reason.into() }
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse { line, message: message.into() }
    }
}
