pub mod fasta;
pub mod gene_calls;
pub mod table;
