//! Route document loading.

use std::path::Path;

use crate::mock::Document;
use crate::server::Error;

/// Decoder for one route document format.
pub trait Adapter: Send + Sync {
    /// Whether this adapter handles documents with extension `ext`.
    fn is_match(&self, ext: &str) -> bool;

    fn load(&self, data: &str) -> Result<Document, Error>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonAdapter;

impl Adapter for JsonAdapter {
    fn is_match(&self, ext: &str) -> bool {
        ext.get(..4).is_some_and(|prefix| prefix.eq_ignore_ascii_case("json"))
    }

    fn load(&self, data: &str) -> Result<Document, Error> {
        Ok(serde_json::from_str(data)?)
    }
}

/// Adapters in lookup order.
#[derive(Default)]
pub struct Registry {
    stack: Vec<Box<dyn Adapter>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every bundled adapter.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.add(JsonAdapter);
        registry
    }

    pub fn add<A: Adapter + 'static>(&mut self, adapter: A) {
        self.stack.push(Box::new(adapter));
    }

    /// First adapter matching `ext`.
    pub fn get(&self, ext: &str) -> Option<&dyn Adapter> {
        self.stack
            .iter()
            .find(|adapter| adapter.is_match(ext))
            .map(|adapter| adapter.as_ref())
    }

    /// Read and decode the document at `path`, choosing the adapter by file
    /// extension.
    pub async fn load_path(&self, path: &Path) -> Result<Document, Error> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let adapter = self
            .get(ext)
            .ok_or_else(|| Error::NoAdapter(path.display().to_string()))?;
        let data = tokio::fs::read_to_string(path).await?;
        adapter.load(&data)
    }
}

/// Load a route document using the bundled adapters.
pub async fn load_document(path: impl AsRef<Path>) -> Result<Document, Error> {
    Registry::with_defaults().load_path(path.as_ref()).await
}
