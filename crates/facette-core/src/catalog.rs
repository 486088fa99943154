//! Product catalog.
//!
//! The recommender only reads `id`, `title` and `description`; the remaining
//! fields are carried through for display. A default storefront catalog is
//! embedded at compile time from `contrib/catalog.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

const BUILTIN_CATALOG: &str = include_str!("../../../contrib/catalog.toml");

static BUILTIN: OnceLock<Catalog> = OnceLock::new();

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("cannot read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bad catalog TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("bad catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate product id {0}")]
    DuplicateId(u64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: u32,
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductRating {
    pub rating: f32,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Price in the currency's minor unit.
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub rating: ProductRating,
    #[serde(default, alias = "availableSizes")]
    pub sizes: Vec<String>,
    #[serde(default, alias = "defaultSize")]
    pub default_size: Option<String>,
}

impl Product {
    /// True if the lowercased title and description contain any of the keywords.
    pub fn matches_any(&self, keywords: &[&str]) -> bool {
        let haystack = format!("{} {}", self.title, self.description).to_lowercase();
        keywords.iter().any(|k| haystack.contains(&k.to_lowercase()))
    }
}

/// `[[product]]` tables of a TOML catalog file.
#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    product: Vec<Product>,
}

/// Read-only product mapping keyed by id. Iteration is in ascending id order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: BTreeMap<u64, Product>,
}

impl Catalog {
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for product in products {
            let id = product.id;
            if map.insert(id, product).is_some() {
                return Err(CatalogError::DuplicateId(id));
            }
        }
        Ok(Self { products: map })
    }

    pub fn from_toml_str(src: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(src)?;
        Self::from_products(file.product)
    }

    /// Parse a JSON array of products.
    pub fn from_json_str(src: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(src)?;
        Self::from_products(products)
    }

    /// Load a catalog file; `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let src = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&src)?,
            _ => Self::from_toml_str(&src)?,
        };
        tracing::info!(path = %path.display(), products = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// The embedded default catalog.
    pub fn builtin() -> &'static Catalog {
        BUILTIN.get_or_init(|| match Self::from_toml_str(BUILTIN_CATALOG) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "embedded catalog is invalid; using an empty catalog");
                Catalog::default()
            }
        })
    }

    pub fn get(&self, id: u64) -> Option<&Product> {
        self.products.get(&id)
    }

    /// Products in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 12);
        let first = catalog.iter().next().unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.title, "Avène cicalfate");
        assert_eq!(catalog.get(12).unwrap().currency, "TND");
    }

    #[test]
    fn test_iteration_is_id_ordered() {
        let catalog = Catalog::from_json_str(
            r#"[{"id": 9, "title": "c"}, {"id": 2, "title": "a"}, {"id": 5, "title": "b"}]"#,
        )
        .unwrap();
        let ids: Vec<u64> = catalog.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn test_json_accepts_storefront_field_names() {
        let catalog = Catalog::from_json_str(
            r#"[{"id": 1, "title": "t", "description": "d", "availableSizes": ["50ml"], "defaultSize": "50ml"}]"#,
        )
        .unwrap();
        let p = catalog.get(1).unwrap();
        assert_eq!(p.sizes, vec!["50ml".to_string()]);
        assert_eq!(p.default_size.as_deref(), Some("50ml"));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = Catalog::from_json_str(r#"[{"id": 1, "title": "a"}, {"id": 1, "title": "b"}]"#)
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(1)));
    }

    #[test]
    fn test_matches_any_is_case_insensitive() {
        let catalog = Catalog::builtin();
        let sun = catalog.get(12).unwrap();
        assert!(sun.matches_any(&["spf"]));
        assert!(sun.matches_any(&["SOLAIRE"]));
        assert!(!sun.matches_any(&["bavoir", "gobelet"]));
        assert!(!sun.matches_any(&[]));
    }
}
