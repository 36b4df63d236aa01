use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

/// Maximum number of suggestions returned for one keystroke.
pub const SUGGESTION_LIMIT: usize = 7;

/// One brand and the products it ships, in dataset order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductEntry {
    pub brand: String,
    pub products: Vec<String>,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("category {category:?} is not a list of brand entries: {message}")]
    Category { category: String, message: String },
}

/// Nested `category -> [brand entry]` dataset the catalog is built from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductDataset {
    categories: Vec<(String, Vec<ProductEntry>)>,
}

impl ProductDataset {
    pub fn new(categories: Vec<(String, Vec<ProductEntry>)>) -> Self {
        Self { categories }
    }

    /// Parse `{"Smartphones": [{"brand": "Apple", "products": ["IPhone 15"]}], ...}`,
    /// keeping categories in document order.
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut categories = Vec::with_capacity(raw.len());
        for (category, value) in raw {
            let entries: Vec<ProductEntry> =
                serde_json::from_value(value).map_err(|err| DatasetError::Category {
                    category: category.clone(),
                    message: err.to_string(),
                })?;
            categories.push((category, entries));
        }
        Ok(Self { categories })
    }

    pub fn entries(&self) -> impl Iterator<Item = &ProductEntry> {
        self.categories.iter().flat_map(|(_, entries)| entries.iter())
    }
}

/// Flattened `"{brand} {product}"` names used for autocomplete.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    names: Vec<String>,
    folded: Vec<String>,
}

impl Catalog {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<String> for Catalog {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let names: Vec<String> = iter.into_iter().collect();
        let folded = names.iter().map(|name| name.to_lowercase()).collect();
        Self { names, folded }
    }
}

/// Flatten a dataset into catalog order. Duplicates are kept.
pub fn build_catalog<'a, I>(entries: I) -> Catalog
where
    I: IntoIterator<Item = &'a ProductEntry>,
{
    entries
        .into_iter()
        .flat_map(|entry| {
            entry
                .products
                .iter()
                .map(move |product| format!("{} {}", entry.brand, product))
        })
        .collect()
}

/// Case-insensitive substring match over the catalog, first
/// [`SUGGESTION_LIMIT`] hits in catalog order. Empty input yields nothing.
pub fn suggest(input: &str, catalog: &Catalog) -> Vec<String> {
    if input.is_empty() {
        return Vec::new();
    }
    let needle = input.to_lowercase();
    catalog
        .folded
        .iter()
        .zip(&catalog.names)
        .filter(|(folded, _)| folded.contains(&needle))
        .map(|(_, name)| name.clone())
        .take(SUGGESTION_LIMIT)
        .collect()
}

/// Keystroke-driven suggestion lookup over a shared catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AutocompleteEngine {
    catalog: Arc<Catalog>,
}

impl AutocompleteEngine {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    pub fn from_dataset(dataset: &ProductDataset) -> Self {
        Self::new(build_catalog(dataset.entries()))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn suggest(&self, input: &str) -> Vec<String> {
        suggest(input, &self.catalog)
    }
}
