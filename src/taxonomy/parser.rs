use super::types::{Dialect, TaxonomicLevel, TaxonomyRecord};
use crate::error::{CmnetError, Result};

/// Parse a lineage string written in the given dialect
pub fn parse(s: &str, dialect: Dialect) -> Result<TaxonomyRecord> {
    match dialect {
        Dialect::GreenGenes => parse_greengenes(s),
        Dialect::Rdp => parse_rdp(s),
    }
}

/// Parse a GreenGenes lineage (`k__Bacteria; p__Firmicutes; ...; s__bar`).
///
/// Strings that do not start with the kingdom marker belong to unidentified
/// OTUs and come back fully unresolved. Bracketed names (`[Name]`) lose their
/// brackets, and a resolved species is prefixed with its genus since
/// GreenGenes only stores the epithet.
pub fn parse_greengenes(s: &str) -> Result<TaxonomyRecord> {
    let s = s.trim();
    if !s.starts_with("k__") {
        return Ok(TaxonomyRecord::unresolved());
    }

    let tokens: Vec<&str> = s.split("; ").collect();
    if tokens.len() > TaxonomicLevel::ALL.len() {
        return Err(CmnetError::malformed(
            s,
            format!("{} levels, GreenGenes has at most 7", tokens.len()),
        ));
    }

    let mut levels: [String; 7] = Default::default();
    for token in tokens {
        let (abbr, name) = split_token(s, token)?;
        let level = greengenes_level(abbr)
            .ok_or_else(|| CmnetError::malformed(s, format!("unknown level '{}'", abbr)))?;

        let name = match name.strip_prefix('[').and_then(|n| n.strip_suffix(']')) {
            Some(inner) => inner,
            None => name,
        };
        levels[level.index()] = name.to_string();
    }

    let genus = TaxonomicLevel::Genus.index();
    let species = TaxonomicLevel::Species.index();
    if !levels[genus].is_empty() && !levels[species].is_empty() {
        levels[species] = format!("{}_{}", levels[genus], levels[species]);
    }

    Ok(TaxonomyRecord::from_levels(levels))
}

/// Parse an RDP/SILVA lineage (`D_0__Bacteria;D_1__Firmicutes;...`).
///
/// An `Ambiguous_taxa` token stops parsing; the remaining levels stay empty.
pub fn parse_rdp(s: &str) -> Result<TaxonomyRecord> {
    let s = s.trim();
    let mut levels: [String; 7] = Default::default();

    for token in s.split(';') {
        if token == "Ambiguous_taxa" {
            break;
        }
        let (key, name) = split_token(s, token)?;
        let level = rdp_level(key)
            .ok_or_else(|| CmnetError::malformed(s, format!("unknown level '{}'", key)))?;
        levels[level.index()] = name.to_string();
    }

    Ok(TaxonomyRecord::from_levels(levels))
}

fn split_token<'a>(input: &str, token: &'a str) -> Result<(&'a str, &'a str)> {
    match token.split_once("__") {
        Some((key, name)) if !name.contains("__") => Ok((key, name)),
        Some(_) => Err(CmnetError::malformed(
            input,
            format!("token '{}' has more than one '__' separator", token),
        )),
        None => Err(CmnetError::malformed(
            input,
            format!("token '{}' has no '__' separator", token),
        )),
    }
}

fn greengenes_level(abbr: &str) -> Option<TaxonomicLevel> {
    let level = match abbr {
        "k" => TaxonomicLevel::Kingdom,
        "p" => TaxonomicLevel::Phylum,
        "c" => TaxonomicLevel::Class,
        "o" => TaxonomicLevel::Order,
        "f" => TaxonomicLevel::Family,
        "g" => TaxonomicLevel::Genus,
        "s" => TaxonomicLevel::Species,
        _ => return None,
    };
    Some(level)
}

fn rdp_level(key: &str) -> Option<TaxonomicLevel> {
    let level = match key {
        "D_0" => TaxonomicLevel::Kingdom,
        "D_1" => TaxonomicLevel::Phylum,
        "D_2" => TaxonomicLevel::Class,
        "D_3" => TaxonomicLevel::Order,
        "D_4" => TaxonomicLevel::Family,
        "D_5" => TaxonomicLevel::Genus,
        "D_6" => TaxonomicLevel::Species,
        _ => return None,
    };
    Some(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn levels(record: &TaxonomyRecord) -> Vec<&str> {
        record.iter().map(|(_, name)| name).collect()
    }

    #[test]
    fn test_greengenes_full_lineage() {
        let record = parse_greengenes(
            "k__Bacteria; p__Firmicutes; c__Clostridia; o__Clostridiales; \
             f__Lachnospiraceae; g__Foo; s__bar",
        )
        .unwrap();

        assert_eq!(
            levels(&record),
            vec![
                "Bacteria",
                "Firmicutes",
                "Clostridia",
                "Clostridiales",
                "Lachnospiraceae",
                "Foo",
                "Foo_bar",
            ]
        );
    }

    #[test]
    fn test_greengenes_partial_lineage() {
        let record =
            parse_greengenes("k__Bacteria; p__Bacteroidetes; c__Bacteroidia; o__; f__; g__; s__")
                .unwrap();

        assert_eq!(record.get(TaxonomicLevel::Class), "Bacteroidia");
        assert_eq!(record.get(TaxonomicLevel::Order), "");
        assert_eq!(record.get(TaxonomicLevel::Species), "");
        assert_eq!(record.iter().count(), 7);
    }

    #[test]
    fn test_greengenes_species_without_genus() {
        let record = parse_greengenes("k__Bacteria; g__; s__bar").unwrap();
        assert_eq!(record.get(TaxonomicLevel::Species), "bar");
    }

    #[test]
    fn test_greengenes_strips_brackets() {
        let record = parse_greengenes(
            "k__Bacteria; p__Firmicutes; c__Clostridia; o__Clostridiales; f__[Mogibacteriaceae]",
        )
        .unwrap();
        assert_eq!(record.get(TaxonomicLevel::Family), "Mogibacteriaceae");
    }

    #[test]
    fn test_greengenes_unidentified() {
        assert!(parse_greengenes("k__").unwrap().is_unresolved());
        assert!(parse_greengenes("Unassigned").unwrap().is_unresolved());
        assert!(parse_greengenes("").unwrap().is_unresolved());
    }

    #[test]
    fn test_greengenes_too_many_levels() {
        let result = parse_greengenes("k__A; p__B; c__C; o__D; f__E; g__F; s__G; t__H");
        assert!(matches!(
            result,
            Err(CmnetError::MalformedTaxonomyString { .. })
        ));
    }

    #[test]
    fn test_greengenes_unknown_abbreviation() {
        let result = parse_greengenes("k__Bacteria; x__Firmicutes");
        assert!(matches!(
            result,
            Err(CmnetError::MalformedTaxonomyString { .. })
        ));
    }

    #[test]
    fn test_greengenes_wrong_delimiter() {
        // Without the space every level collapses into one token
        let result = parse_greengenes("k__Bacteria;p__Firmicutes");
        assert!(result.is_err());
    }

    #[test]
    fn test_rdp_full_lineage() {
        let record = parse_rdp(
            "D_0__Bacteria;D_1__Epsilonbacteraeota;D_2__Campylobacteria;D_3__Campylobacterales;\
             D_4__Thiovulaceae;D_5__Sulfuricurvum;D_6__Sulfuricurvum sp. EW1",
        )
        .unwrap();

        assert_eq!(record.get(TaxonomicLevel::Kingdom), "Bacteria");
        assert_eq!(record.get(TaxonomicLevel::Genus), "Sulfuricurvum");
        assert_eq!(record.get(TaxonomicLevel::Species), "Sulfuricurvum sp. EW1");
    }

    #[test]
    fn test_rdp_ambiguous_taxa() {
        let record =
            parse_rdp("D_0__Bacteria;D_1__Firmicutes;Ambiguous_taxa;D_3__Clostridiales").unwrap();

        assert_eq!(
            levels(&record),
            vec!["Bacteria", "Firmicutes", "", "", "", "", ""]
        );
    }

    #[test]
    fn test_rdp_unknown_index() {
        assert!(matches!(
            parse_rdp("D_0__Bacteria;D_7__Strain"),
            Err(CmnetError::MalformedTaxonomyString { .. })
        ));
        assert!(parse_rdp("D_0__Bacteria;X_1__Firmicutes").is_err());
    }

    #[test]
    fn test_rdp_index_must_be_exact() {
        for lineage in ["D_0__Bacteria;D_+1__Firmicutes", "D_0__Bacteria;D_01__Firmicutes"] {
            assert!(matches!(
                parse_rdp(lineage),
                Err(CmnetError::MalformedTaxonomyString { .. })
            ));
        }
    }

    #[test]
    fn test_parse_dispatches_on_dialect() {
        let gg = parse("k__Bacteria; g__Foo; s__bar", Dialect::GreenGenes).unwrap();
        assert_eq!(gg.get(TaxonomicLevel::Species), "Foo_bar");

        let rdp = parse("D_0__Bacteria;D_5__Foo;D_6__bar", Dialect::Rdp).unwrap();
        assert_eq!(rdp.get(TaxonomicLevel::Species), "bar");
    }
}
