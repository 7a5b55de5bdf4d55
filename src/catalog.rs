//! Dictionary catalog: single source of truth for the supported dictionaries.
//!
//! Each variant is one Lingea language-pair dictionary, carrying its code,
//! display flag and lookup URL prefix. The catalog is defined once at process
//! start and never mutated; declaration order drives the selection keyboard.

use std::sync::OnceLock;

use anyhow::{bail, Result};

/// Configuration for one supported dictionary.
#[derive(Debug, Clone)]
pub struct VariantConfig {
    /// Short identifier, e.g. "EN-SK". Unique across the catalog.
    pub code: &'static str,

    /// Flag glyph of the source language, shown next to the code.
    pub flag: &'static str,

    /// Lookup URL prefix; the percent-encoded word is appended to it.
    pub base_url: &'static str,

    /// Whether this is the fallback dictionary (exactly one should be true)
    pub is_default: bool,
}

/// Global dictionary catalog singleton.
pub struct DictionaryCatalog {
    variants: Vec<VariantConfig>,
}

static CATALOG: OnceLock<DictionaryCatalog> = OnceLock::new();

impl DictionaryCatalog {
    /// Get the global catalog instance, initializing it on first access.
    pub fn get() -> &'static DictionaryCatalog {
        CATALOG.get_or_init(|| DictionaryCatalog {
            variants: default_variants(),
        })
    }

    /// Look up a variant by its code. Matching is exact and case-sensitive.
    pub fn by_code(&self, code: &str) -> Option<&VariantConfig> {
        self.variants.iter().find(|v| v.code == code)
    }

    /// All variants, in declaration order.
    pub fn list(&self) -> &[VariantConfig] {
        &self.variants
    }

    /// The designated fallback variant, used whenever a stored choice is
    /// absent or unrecognized.
    ///
    /// # Panics
    /// Panics if the catalog does not contain exactly one default variant
    /// (this indicates a configuration error).
    pub fn default_variant(&self) -> &VariantConfig {
        let defaults: Vec<_> = self.variants.iter().filter(|v| v.is_default).collect();

        match defaults.len() {
            0 => panic!("No default dictionary found in catalog"),
            1 => defaults[0],
            _ => panic!("Multiple default dictionaries found in catalog"),
        }
    }
}

/// A validated dictionary handle.
///
/// Cheap to copy and guaranteed to resolve in the catalog, so the rest of the
/// code can pass dictionaries around without re-checking codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dictionary {
    code: &'static str,
}

impl Dictionary {
    /// Create a Dictionary from a variant code string.
    pub fn from_code(code: &str) -> Result<Dictionary> {
        match DictionaryCatalog::get().by_code(code) {
            // Use the static str from the catalog
            Some(config) => Ok(Dictionary { code: config.code }),
            None => bail!("Unknown dictionary code: '{}'", code),
        }
    }

    /// The catalog's fallback dictionary.
    pub fn default() -> Dictionary {
        let config = DictionaryCatalog::get().default_variant();
        Dictionary { code: config.code }
    }

    /// All dictionaries, in catalog order.
    pub fn all() -> Vec<Dictionary> {
        DictionaryCatalog::get()
            .list()
            .iter()
            .map(|config| Dictionary { code: config.code })
            .collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn flag(&self) -> &'static str {
        self.config().flag
    }

    pub fn base_url(&self) -> &'static str {
        self.config().base_url
    }

    /// Full catalog entry for this dictionary.
    ///
    /// # Panics
    /// Panics if the code is not found in the catalog. This should never
    /// happen if the Dictionary was constructed properly (via `from_code`,
    /// `default` or `all`).
    pub fn config(&self) -> &'static VariantConfig {
        DictionaryCatalog::get()
            .by_code(self.code)
            .expect("Dictionary code should always be valid")
    }
}

/// The supported Lingea dictionaries.
fn default_variants() -> Vec<VariantConfig> {
    vec![
        VariantConfig {
            code: "RU-SK",
            flag: "\u{1F1F7}\u{1F1FA}",
            base_url: "https://slovniky.lingea.sk/rusko-slovensky/",
            is_default: false,
        },
        VariantConfig {
            code: "EN-SK",
            flag: "\u{1F1EC}\u{1F1E7}",
            base_url: "https://slovniky.lingea.sk/anglicko-slovensky/",
            is_default: true,
        },
        VariantConfig {
            code: "UA-SK",
            flag: "\u{1F1FA}\u{1F1E6}",
            base_url: "https://slovniky.lingea.sk/ukrajinsko-slovensky/",
            is_default: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Catalog Tests ====================

    #[test]
    fn test_catalog_get_returns_singleton() {
        let catalog1 = DictionaryCatalog::get();
        let catalog2 = DictionaryCatalog::get();

        assert!(std::ptr::eq(catalog1, catalog2));
    }

    #[test]
    fn test_list_order_matches_declaration() {
        let codes: Vec<_> = DictionaryCatalog::get()
            .list()
            .iter()
            .map(|v| v.code)
            .collect();

        assert_eq!(codes, vec!["RU-SK", "EN-SK", "UA-SK"]);
    }

    #[test]
    fn test_codes_are_unique() {
        let catalog = DictionaryCatalog::get();
        let mut codes: Vec<_> = catalog.list().iter().map(|v| v.code).collect();
        codes.sort();
        codes.dedup();

        assert_eq!(codes.len(), catalog.list().len());
    }

    #[test]
    fn test_by_code_found() {
        let config = DictionaryCatalog::get().by_code("RU-SK");

        assert!(config.is_some());
        let config = config.unwrap();
        assert_eq!(config.code, "RU-SK");
        assert!(config.base_url.ends_with("rusko-slovensky/"));
        assert!(!config.is_default);
    }

    #[test]
    fn test_by_code_is_case_sensitive() {
        assert!(DictionaryCatalog::get().by_code("ru-sk").is_none());
        assert!(DictionaryCatalog::get().by_code("RU-SK").is_some());
    }

    #[test]
    fn test_by_code_exact_match_only() {
        // Underscore instead of dash must not match
        assert!(DictionaryCatalog::get().by_code("RU_SK").is_none());
    }

    #[test]
    fn test_exactly_one_default() {
        let defaults = DictionaryCatalog::get()
            .list()
            .iter()
            .filter(|v| v.is_default)
            .count();

        assert_eq!(defaults, 1);
    }

    // ==================== Dictionary Handle Tests ====================

    #[test]
    fn test_default_is_en_sk() {
        let dict = Dictionary::default();
        assert_eq!(dict.code(), "EN-SK");
    }

    #[test]
    fn test_from_code_valid() {
        let dict = Dictionary::from_code("UA-SK").expect("Should succeed");
        assert_eq!(dict.code(), "UA-SK");
        assert_eq!(dict.flag(), "\u{1F1FA}\u{1F1E6}");
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Dictionary::from_code("EN-CZ");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Dictionary::from_code("").is_err());
    }

    #[test]
    fn test_all_covers_catalog_in_order() {
        let all = Dictionary::all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].code(), "RU-SK");
        assert_eq!(all[1].code(), "EN-SK");
        assert_eq!(all[2].code(), "UA-SK");
    }

    #[test]
    fn test_dictionary_equality() {
        let a = Dictionary::default();
        let b = Dictionary::from_code("EN-SK").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Dictionary::from_code("RU-SK").unwrap());
    }

    #[test]
    fn test_dictionary_copy() {
        let a = Dictionary::default();
        let b = a;
        assert_eq!(a, b);
    }

    #[test]
    fn test_base_url_is_lookup_prefix() {
        let dict = Dictionary::from_code("EN-SK").unwrap();
        assert!(dict.base_url().starts_with("https://slovniky.lingea.sk/"));
        assert!(dict.base_url().ends_with('/'));
    }
}
