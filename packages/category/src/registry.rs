//! Embedded taxonomy definitions.
//!
//! The default taxonomy is compiled into the binary via `include_str!`.
//! Replacing it at runtime goes through [`load_file`], which applies the
//! same validation.

use std::path::Path;

use helpline_category_models::CategoryTaxonomy;

use crate::TaxonomyError;

/// Embedded taxonomy used when no file is configured.
const DEFAULT_TAXONOMY: (&str, &str) = ("default", include_str!("../taxonomies/default.toml"));

/// Returns the embedded default taxonomy.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse. It is a compile-time
/// constant, so a failure is a development error caught by the tests.
#[must_use]
pub fn default_taxonomy() -> CategoryTaxonomy {
    let (name, toml_str) = DEFAULT_TAXONOMY;
    parse(name, toml_str)
        .unwrap_or_else(|e| panic!("Failed to parse embedded taxonomy '{name}': {e}"))
}

/// Parses a taxonomy from TOML text.
///
/// # Errors
///
/// Returns [`TaxonomyError::Parse`] if the text is not valid TOML or the
/// label lists are invalid (empty major list, duplicates, reserved label).
pub fn parse(name: &str, toml_str: &str) -> Result<CategoryTaxonomy, TaxonomyError> {
    toml::de::from_str(toml_str).map_err(|source| TaxonomyError::Parse {
        name: name.to_string(),
        source,
    })
}

/// Reads and parses a taxonomy TOML file.
///
/// # Errors
///
/// Returns [`TaxonomyError`] if the file cannot be read or parsed.
pub fn load_file(path: &Path) -> Result<CategoryTaxonomy, TaxonomyError> {
    let text = std::fs::read_to_string(path)?;
    let taxonomy = parse(&path.display().to_string(), &text)?;
    log::info!(
        "Loaded taxonomy from {} ({} major, {} minor)",
        path.display(),
        taxonomy.major().len(),
        taxonomy.minor().len()
    );
    Ok(taxonomy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_taxonomy_parses() {
        let taxonomy = default_taxonomy();
        assert!(!taxonomy.major().is_empty());
        assert!(taxonomy.group_of("Eviction").is_some());
    }

    #[test]
    fn minor_list_is_optional() {
        let taxonomy = parse("inline", r#"major = ["Housing", "Food"]"#).unwrap();
        assert!(taxonomy.minor().is_empty());
    }

    #[test]
    fn rejects_overlapping_groups() {
        let err = parse(
            "inline",
            "major = [\"Housing\", \"Food\"]\nminor = [\"Housing\"]",
        )
        .unwrap_err();
        assert!(
            err.to_string().contains("Housing"),
            "error should name the duplicate label: {err}"
        );
    }

    #[test]
    fn load_file_reports_missing_file() {
        let path = std::env::temp_dir().join("helpline_taxonomy_does_not_exist.toml");
        assert!(matches!(load_file(&path), Err(TaxonomyError::Io(_))));
    }
}
