//! Product lookup tool.
//!
//! Defines the `ProductSearch` contract and an in-memory catalog with
//! keyword-overlap relevance scoring. An unmatched query returns an empty
//! list, never an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// A catalog entry returned by product search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: f64,
    /// Currency code the price is quoted in, e.g. "RM".
    pub currency: String,
    pub category: String,
}

/// Product lookup capability.
#[async_trait]
pub trait ProductSearch: Send + Sync {
    /// Search the catalog for products matching `query`.
    ///
    /// May return an empty list; must not fail for unmatched queries.
    async fn search(&self, query: &str) -> Result<Vec<Product>, ToolError>;
}

/// In-memory catalog backed by a fixed product list.
///
/// Relevance is the number of query tokens appearing in the product name or
/// category, case-insensitive. Results are ordered by descending overlap,
/// then by name for a stable order.
pub struct InMemoryCatalog {
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    fn score(product: &Product, tokens: &[String]) -> usize {
        let haystack = format!("{} {}", product.name, product.category).to_lowercase();
        tokens.iter().filter(|t| haystack.contains(t.as_str())).count()
    }
}

#[async_trait]
impl ProductSearch for InMemoryCatalog {
    async fn search(&self, query: &str) -> Result<Vec<Product>, ToolError> {
        let tokens: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(|t| t.to_string())
            .collect();

        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, &Product)> = self
            .products
            .iter()
            .map(|p| (Self::score(p, &tokens), p))
            .filter(|(s, _)| *s > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.name.cmp(&b.1.name)));

        tracing::debug!(query = %query, hits = scored.len(), "Product search");
        Ok(scored.into_iter().map(|(_, p)| p.clone()).collect())
    }
}
