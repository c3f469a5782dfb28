use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use super::biom::{parse_biom_json, HDF5_MAGIC};
use crate::error::CmnetError;
use crate::model::CopyNumberReference;
use crate::table::AbundanceTable;
use crate::taxonomy::{Dialect, TaxonomyTable};

const NA_TOKENS: [&str; 7] = ["", "NA", "NaN", "nan", "N/A", "null", "NULL"];

/// Parse a numeric cell, mapping NA tokens to NaN
pub(crate) fn parse_value(token: &str) -> crate::error::Result<f64> {
    let token = token.trim();
    if NA_TOKENS.contains(&token) {
        return Ok(f64::NAN);
    }
    token
        .parse()
        .map_err(|_| CmnetError::InvalidTable(format!("cannot parse '{}' as a number", token)))
}

/// Parse tab-separated text: header row of column labels, first column of
/// row labels. The first header cell names the index.
pub(crate) fn parse_tsv_table(content: &str) -> crate::error::Result<AbundanceTable> {
    let mut lines = content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| CmnetError::InvalidTable("table has no header".to_string()))?;
    let mut header_fields = header.split('\t');
    let index_name = header_fields.next().unwrap_or_default().trim().to_string();
    let columns: Vec<String> = header_fields.map(|c| c.trim().to_string()).collect();

    let mut rows = Vec::new();
    let mut data = Vec::new();
    for line in lines {
        let mut fields = line.split('\t');
        let label = fields.next().unwrap_or_default().trim().to_string();
        let values = fields
            .map(parse_value)
            .collect::<crate::error::Result<Vec<f64>>>()?;
        rows.push(label);
        data.push(values);
    }

    let table = AbundanceTable::new(rows, columns, data)?;
    Ok(if index_name.is_empty() {
        table
    } else {
        table.with_index_name(index_name)
    })
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Read a tab-separated table (labels in the first row and column)
pub fn read_tsv_table<P: AsRef<Path>>(path: P) -> Result<AbundanceTable> {
    let path = path.as_ref();
    let table = parse_tsv_table(&read_text(path)?)
        .with_context(|| format!("Failed to parse table: {}", path.display()))?;
    debug!(
        "Read {}x{} table from {}",
        table.n_rows(),
        table.n_columns(),
        path.display()
    );
    Ok(table)
}

/// Read an OTU table in TSV format (OTUs as rows, samples as columns).
///
/// Tables exported by `biom convert` start with a `# Constructed from biom
/// file` line, which is skipped.
pub fn read_otutable<P: AsRef<Path>>(path: P) -> Result<AbundanceTable> {
    let path = path.as_ref();
    let content = read_text(path)?;
    parse_otutable(&content).with_context(|| format!("Failed to parse OTU table: {}", path.display()))
}

fn parse_otutable(content: &str) -> crate::error::Result<AbundanceTable> {
    let body = match content.strip_prefix("# ") {
        Some(rest) => rest.split_once('\n').map(|(_, body)| body).unwrap_or_default(),
        None => content,
    };
    parse_tsv_table(body)
}

/// Read a mothur `shared` file and return it with OTUs as rows
fn parse_mothur_shared(content: &str) -> crate::error::Result<AbundanceTable> {
    let mut lines = content
        .lines()
        .map(|line| line.trim_end_matches(['\r', '\t']))
        .filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| CmnetError::InvalidTable("shared file has no header".to_string()))?;
    let otus: Vec<String> = header.split('\t').skip(3).map(str::to_string).collect();

    let mut samples = Vec::new();
    let mut data = Vec::new();
    for line in lines {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            return Err(CmnetError::InvalidTable(format!(
                "shared file line has {} fields: '{}'",
                fields.len(),
                line
            )));
        }
        samples.push(fields[1].to_string());
        data.push(
            fields[3..]
                .iter()
                .map(|v| parse_value(v))
                .collect::<crate::error::Result<Vec<f64>>>()?,
        );
    }

    Ok(AbundanceTable::new(samples, otus, data)?.transpose())
}

fn is_mothur_header(line: &str) -> bool {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    fields.len() >= 4 && fields[0] == "label" && fields[1] == "Group" && fields[2] == "numOtus"
}

/// Read a sequence abundance table in BIOM (JSON), mothur shared or TSV
/// format, returning OTUs as rows and samples as columns.
pub fn read_seqabun<P: AsRef<Path>>(path: P) -> Result<AbundanceTable> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;

    if bytes.starts_with(HDF5_MAGIC) {
        return Err(CmnetError::UnsupportedFormat(format!(
            "{} is an HDF5 (BIOM 2.x) table; convert it with `biom convert --to-json`",
            path.display()
        ))
        .into());
    }

    let content = String::from_utf8(bytes)
        .with_context(|| format!("File is not valid UTF-8: {}", path.display()))?;
    let is_biom = path.extension().is_some_and(|ext| ext == "biom")
        || content.trim_start().starts_with('{');
    let first_line = content.lines().next().unwrap_or_default();

    let parsed = if is_biom {
        info!("Reading {} as BIOM", path.display());
        parse_biom_json(&content)
    } else if is_mothur_header(first_line) {
        info!("Reading {} as mothur shared file", path.display());
        parse_mothur_shared(&content)
    } else {
        info!("Reading {} as TSV", path.display());
        parse_otutable(&content)
    };
    let table = parsed
        .with_context(|| format!("Failed to parse abundance table: {}", path.display()))?;

    info!(
        "Loaded {} OTUs across {} samples",
        table.n_rows(),
        table.n_columns()
    );
    Ok(table)
}

/// Read a QIIME taxonomy table (`Feature ID`, `Taxon`, `Confidence`).
///
/// `dialect = None` detects the lineage notation per row.
pub fn read_taxatable<P: AsRef<Path>>(path: P, dialect: Option<Dialect>) -> Result<TaxonomyTable> {
    let path = path.as_ref();
    let content = read_text(path)?;
    let mut lines = content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty());

    let header: Vec<&str> = lines
        .next()
        .with_context(|| format!("Taxonomy file is empty: {}", path.display()))?
        .split('\t')
        .map(str::trim)
        .collect();
    let taxon_col = header
        .iter()
        .position(|h| h.eq_ignore_ascii_case("taxon"))
        .with_context(|| format!("No 'Taxon' column in {}", path.display()))?;
    let confidence_col = header
        .iter()
        .position(|h| h.eq_ignore_ascii_case("confidence"));

    let mut table = TaxonomyTable::new();
    for line in lines {
        // QIIME 1 files may carry comment lines between records
        if line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let id = fields[0].trim();
        let lineage = fields.get(taxon_col).copied().unwrap_or_default();
        let push = |table: &mut TaxonomyTable| -> crate::error::Result<()> {
            let confidence = match confidence_col.and_then(|c| fields.get(c)) {
                Some(value) => Some(parse_value(value)?).filter(|v| !v.is_nan()),
                None => None,
            };
            table.push_lineage(id, lineage, confidence, dialect)
        };
        push(&mut table)
            .with_context(|| format!("Failed to parse taxonomy of '{}' in {}", id, path.display()))?;
    }

    let unresolved = table.iter().filter(|e| e.record.is_unresolved()).count();
    info!("Loaded taxonomy for {} entities", table.len());
    if unresolved > 0 {
        warn!("{} entities have no kingdom-level assignment", unresolved);
    }
    Ok(table)
}

/// Read 16S copy numbers (model id and one numeric column)
pub fn read_16s_table<P: AsRef<Path>>(path: P) -> Result<CopyNumberReference> {
    let path = path.as_ref();
    let table = read_tsv_table(path)?;
    if table.n_columns() == 0 {
        anyhow::bail!("Copy number table has no value column: {}", path.display());
    }

    let reference = CopyNumberReference::new(
        table
            .iter_rows()
            .map(|(model, values)| (model.to_string(), values[0])),
    );
    info!("Loaded 16S copy numbers for {} models", reference.len());
    Ok(reference)
}

/// Read a model-to-function contribution matrix. NA cells stay NaN.
pub fn read_m2f<P: AsRef<Path>>(path: P) -> Result<AbundanceTable> {
    let path = path.as_ref();
    let table = read_tsv_table(path)?;
    info!(
        "Loaded contributions of {} models to {} functions",
        table.n_rows(),
        table.n_columns()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::TaxonomicLevel;
    use pretty_assertions::assert_eq;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, content: &str) -> Result<std::path::PathBuf> {
        let path = dir.join(name);
        let mut file = File::create(&path)?;
        write!(file, "{}", content)?;
        Ok(path)
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("2.5").unwrap(), 2.5);
        assert!(parse_value("NA").unwrap().is_nan());
        assert!(parse_value("").unwrap().is_nan());
        assert!(parse_value("abc").is_err());
    }

    #[test]
    fn test_read_otutable_skips_biom_comment() -> Result<()> {
        let dir = tempdir()?;
        let path = write_file(
            dir.path(),
            "otu.tsv",
            "# Constructed from biom file\n#OTU ID\tS1\tS2\notu1\t1\t2\notu2\t3\t4\n",
        )?;

        let table = read_otutable(&path)?;
        assert_eq!(table.index_name(), Some("#OTU ID"));
        assert_eq!(table.columns(), &["S1".to_string(), "S2".to_string()][..]);
        assert_eq!(table.row("otu2"), Some(&[3.0, 4.0][..]));
        Ok(())
    }

    #[test]
    fn test_read_seqabun_mothur_shared() -> Result<()> {
        let dir = tempdir()?;
        let path = write_file(
            dir.path(),
            "final.shared",
            "label\tGroup\tnumOtus\tOtu001\tOtu002\n\
             0.03\tA\t2\t5\t0\n\
             0.03\tB\t2\t1\t7\n",
        )?;

        let table = read_seqabun(&path)?;
        assert_eq!(table.rows(), &["Otu001".to_string(), "Otu002".to_string()][..]);
        assert_eq!(table.row("Otu001"), Some(&[5.0, 1.0][..]));
        assert_eq!(table.row("Otu002"), Some(&[0.0, 7.0][..]));
        Ok(())
    }

    #[test]
    fn test_read_seqabun_biom_and_tsv() -> Result<()> {
        let dir = tempdir()?;
        let biom = write_file(
            dir.path(),
            "table.biom",
            r#"{"matrix_type": "sparse", "shape": [1, 1],
                "rows": [{"id": "otu1"}], "columns": [{"id": "S1"}],
                "data": [[0, 0, 4]]}"#,
        )?;
        assert_eq!(read_seqabun(&biom)?.get("otu1", "S1"), Some(4.0));

        let tsv = write_file(dir.path(), "table.tsv", "id\tS1\notu1\t9\n")?;
        assert_eq!(read_seqabun(&tsv)?.get("otu1", "S1"), Some(9.0));
        Ok(())
    }

    #[test]
    fn test_read_seqabun_rejects_hdf5() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("table.biom");
        let mut bytes = HDF5_MAGIC.to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        fs::write(&path, bytes)?;

        let err = read_seqabun(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CmnetError>(),
            Some(CmnetError::UnsupportedFormat(_))
        ));
        Ok(())
    }

    #[test]
    fn test_read_taxatable() -> Result<()> {
        let dir = tempdir()?;
        let path = write_file(
            dir.path(),
            "taxonomy.tsv",
            "Feature ID\tTaxon\tConfidence\n\
             otu1\tk__Bacteria; p__Firmicutes; g__Foo; s__bar\t0.99\n\
             otu2\tUnassigned\t0.7\n",
        )?;

        let table = read_taxatable(&path, Some(Dialect::GreenGenes))?;
        assert_eq!(table.len(), 2);
        let otu1 = table.get("otu1").unwrap();
        assert_eq!(otu1.record.get(TaxonomicLevel::Species), "Foo_bar");
        assert_eq!(otu1.confidence, Some(0.99));
        assert!(table.get("otu2").unwrap().record.is_unresolved());
        Ok(())
    }

    #[test]
    fn test_read_taxatable_names_failing_entity() -> Result<()> {
        let dir = tempdir()?;
        let path = write_file(
            dir.path(),
            "taxonomy.tsv",
            "Feature ID\tTaxon\notu7\tk__Bacteria; z__Oops\n",
        )?;

        let err = read_taxatable(&path, None).unwrap_err();
        assert!(format!("{:#}", err).contains("otu7"));
        assert!(err.root_cause().to_string().contains("z"));
        Ok(())
    }

    #[test]
    fn test_read_taxatable_bad_confidence_names_entity() -> Result<()> {
        let dir = tempdir()?;
        let path = write_file(
            dir.path(),
            "taxonomy.tsv",
            "Feature ID\tTaxon\tConfidence\notu1\tk__Bacteria\t0.9\notu5\tk__Bacteria\thigh\n",
        )?;

        let err = read_taxatable(&path, None).unwrap_err();
        assert!(format!("{:#}", err).contains("'otu5'"));
        assert!(matches!(
            err.root_cause().downcast_ref::<CmnetError>(),
            Some(CmnetError::InvalidTable(_))
        ));
        Ok(())
    }

    #[test]
    fn test_read_16s_table_fills_and_clips() -> Result<()> {
        let dir = tempdir()?;
        let path = write_file(
            dir.path(),
            "16s.tsv",
            "model\t16s_rrna\nFoo\t4\nBar\tNA\nBaz\t0.2\n",
        )?;

        let reference = read_16s_table(&path)?;
        assert_eq!(reference.get("Foo"), 4.0);
        assert_eq!(reference.get("Bar"), 1.0);
        assert_eq!(reference.get("Baz"), 1.0);
        Ok(())
    }

    #[test]
    fn test_read_m2f_keeps_na() -> Result<()> {
        let dir = tempdir()?;
        let path = write_file(dir.path(), "m2f.tsv", "model\tR1\tR2\nFoo\t1\tNA\n")?;

        let table = read_m2f(&path)?;
        assert_eq!(table.get("Foo", "R1"), Some(1.0));
        assert!(table.get("Foo", "R2").unwrap().is_nan());
        Ok(())
    }
}
