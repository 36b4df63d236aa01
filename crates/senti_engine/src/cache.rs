//! Summary artifacts cached per product.
//!
//! Entries are keyed by the normalized product name, so an artifact stored
//! for one product can never be served for another. The orchestrator
//! invalidates the previous and the new product before every analyze request.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use senti_core::ResultsEnvelope;
use senti_logging::{senti_debug, senti_error, senti_info, senti_warn};
use serde::{Deserialize, Serialize};

use crate::persist::{write_atomically, PersistError};

pub type SharedCache = Arc<Mutex<ArtifactCache>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    GoogleSummary,
    CommentSummary,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::GoogleSummary, ArtifactKind::CommentSummary];

    /// Storage key used by display components.
    pub fn key(self) -> &'static str {
        match self {
            ArtifactKind::GoogleSummary => "googleSummary",
            ArtifactKind::CommentSummary => "commentSummary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
struct ProductArtifacts {
    #[serde(default)]
    google_summary: Option<String>,
    #[serde(default)]
    comment_summary: Option<String>,
}

impl ProductArtifacts {
    fn slot(&mut self, kind: ArtifactKind) -> &mut Option<String> {
        match kind {
            ArtifactKind::GoogleSummary => &mut self.google_summary,
            ArtifactKind::CommentSummary => &mut self.comment_summary,
        }
    }

    fn get(&self, kind: ArtifactKind) -> Option<&str> {
        match kind {
            ArtifactKind::GoogleSummary => self.google_summary.as_deref(),
            ArtifactKind::CommentSummary => self.comment_summary.as_deref(),
        }
    }

    fn is_empty(&self) -> bool {
        self.google_summary.is_none() && self.comment_summary.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedCache {
    products: BTreeMap<String, ProductArtifacts>,
}

#[derive(Debug, Default)]
pub struct ArtifactCache {
    products: BTreeMap<String, ProductArtifacts>,
    file: Option<PathBuf>,
}

/// Cache key for a product: trimmed, case-folded.
pub fn product_key(product: &str) -> String {
    product.trim().to_lowercase()
}

impl ArtifactCache {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Cache backed by a RON file. A missing or unreadable file starts empty.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let products = match load(&path) {
            Ok(products) => products,
            Err(err) => {
                senti_warn!("Failed to load artifact cache from {:?}: {}", path, err);
                BTreeMap::new()
            }
        };
        Self {
            products,
            file: Some(path),
        }
    }

    pub fn shared(self) -> SharedCache {
        Arc::new(Mutex::new(self))
    }

    pub fn get(&self, product: &str, kind: ArtifactKind) -> Option<&str> {
        self.products
            .get(&product_key(product))
            .and_then(|artifacts| artifacts.get(kind))
    }

    pub fn put(&mut self, product: &str, kind: ArtifactKind, value: impl Into<String>) {
        *self
            .products
            .entry(product_key(product))
            .or_default()
            .slot(kind) = Some(value.into());
        self.save();
    }

    /// Drop both artifacts of `product`. Returns whether anything was removed.
    pub fn invalidate(&mut self, product: &str) -> bool {
        let removed = self.products.remove(&product_key(product)).is_some();
        if removed {
            senti_debug!("Invalidated cached artifacts for {:?}", product);
            self.save();
        }
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.products.values().all(ProductArtifacts::is_empty)
    }

    /// Record the summaries carried by a ready results body.
    pub fn store_from_results(&mut self, product: &str, envelope: &ResultsEnvelope) {
        let mut stored = false;
        let entry = self.products.entry(product_key(product)).or_default();
        for (kind, value) in [
            (ArtifactKind::GoogleSummary, &envelope.google_summary),
            (ArtifactKind::CommentSummary, &envelope.comment_summary),
        ] {
            if let Some(value) = value {
                *entry.slot(kind) = Some(value.clone());
                stored = true;
            }
        }
        if stored {
            senti_info!("Cached summaries for {:?}", product);
            self.save();
        } else if entry.is_empty() {
            self.products.remove(&product_key(product));
        }
    }

    fn save(&self) {
        let Some(path) = self.file.as_deref() else {
            return;
        };
        let state = PersistedCache {
            products: self
                .products
                .iter()
                .filter(|(_, artifacts)| !artifacts.is_empty())
                .map(|(key, artifacts)| (key.clone(), artifacts.clone()))
                .collect(),
        };
        let content = match ron::ser::to_string_pretty(&state, ron::ser::PrettyConfig::new()) {
            Ok(text) => text,
            Err(err) => {
                senti_error!("Failed to serialize artifact cache: {}", err);
                return;
            }
        };
        if let Err(err) = write_atomically(path, &content) {
            senti_error!("Failed to write artifact cache to {:?}: {}", path, err);
        }
    }
}

fn load(path: &Path) -> Result<BTreeMap<String, ProductArtifacts>, PersistError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(err) => return Err(err.into()),
    };
    let state: PersistedCache =
        ron::from_str(&content).map_err(|err| PersistError::Format(err.to_string()))?;
    Ok(state.products)
}
