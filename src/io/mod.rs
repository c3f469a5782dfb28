pub(crate) mod biom;
pub(crate) mod reader;
pub(crate) mod writer;

pub use biom::parse_biom_json;
pub use reader::{
    read_16s_table, read_m2f, read_otutable, read_seqabun, read_taxatable, read_tsv_table,
};
pub use writer::{make_output_dir, write_table, write_table_file, write_taxatable};
