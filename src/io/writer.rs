use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::table::AbundanceTable;
use crate::taxonomy::{TaxonomicLevel, TaxonomyTable};

fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Write a table as TSV, index name in the first header cell
pub fn write_table<W: Write>(table: &AbundanceTable, mut writer: W) -> Result<()> {
    write!(writer, "{}", table.index_name().unwrap_or_default())?;
    for column in table.columns() {
        write!(writer, "\t{}", column)?;
    }
    writeln!(writer)?;

    for (label, values) in table.iter_rows() {
        write!(writer, "{}", label)?;
        for value in values {
            write!(writer, "\t{}", format_value(*value))?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_table_file<P: AsRef<Path>>(table: &AbundanceTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    write_table(table, BufWriter::new(file))
        .with_context(|| format!("Failed to write table: {}", path.display()))?;
    info!(
        "Wrote {}x{} table to {}",
        table.n_rows(),
        table.n_columns(),
        path.display()
    );
    Ok(())
}

/// Write the seven-level taxonomy table with confidences
pub fn write_taxatable<W: Write>(table: &TaxonomyTable, mut writer: W) -> Result<()> {
    write!(writer, "id")?;
    for level in TaxonomicLevel::ALL {
        write!(writer, "\t{}", level)?;
    }
    writeln!(writer, "\tConfidence")?;

    for entry in table.iter() {
        write!(writer, "{}", entry.id)?;
        for (_, name) in entry.record.iter() {
            write!(writer, "\t{}", name)?;
        }
        let confidence = entry.confidence.map(format_value).unwrap_or_default();
        writeln!(writer, "\t{}", confidence)?;
    }
    writer.flush()?;
    Ok(())
}

/// Create an output directory if it does not exist and return its absolute
/// path. With `strict`, an existing directory is an error.
pub fn make_output_dir<P: AsRef<Path>>(path: P, strict: bool) -> Result<PathBuf> {
    let path = path.as_ref();
    if path.is_dir() {
        if strict {
            anyhow::bail!("Directory '{}' already exists", path.display());
        }
    } else {
        fs::create_dir_all(path).with_context(|| {
            format!(
                "Could not create directory '{}'. Are permissions set correctly?",
                path.display()
            )
        })?;
    }
    fs::canonicalize(path).with_context(|| format!("Failed to resolve {}", path.display()))
}
