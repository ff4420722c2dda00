//! Outlet directory tool.
//!
//! Defines the `OutletDirectory` contract and an in-memory directory.
//! Filters narrow sequentially: the city filter is applied to the full set
//! first, the service filter then narrows within that already-narrowed
//! subset. Neither filter is ever re-applied to the unfiltered universe.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// A physical outlet record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outlet {
    pub name: String,
    pub city: String,
    /// Services offered, e.g. "drive-thru", "dine-in", "delivery".
    pub services: Vec<String>,
    pub address: String,
    pub hours: String,
}

/// Optional, independently combinable outlet filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutletFilters {
    pub city: Option<String>,
    pub service: Option<String>,
}

impl OutletFilters {
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.service.is_none()
    }
}

/// Result of an outlet search.
///
/// `city_candidates` is the size of the set after the city narrowing alone,
/// so a caller can report a partial count when the final set is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutletMatches {
    pub outlets: Vec<Outlet>,
    pub city_candidates: usize,
}

/// Outlet lookup capability.
#[async_trait]
pub trait OutletDirectory: Send + Sync {
    /// Search outlets, narrowing by city first, then by service within the
    /// city-narrowed subset.
    async fn search(&self, filters: &OutletFilters) -> Result<OutletMatches, ToolError>;
}

/// In-memory outlet directory backed by a fixed outlet list.
pub struct InMemoryOutlets {
    outlets: Vec<Outlet>,
}

impl InMemoryOutlets {
    pub fn new(outlets: Vec<Outlet>) -> Self {
        Self { outlets }
    }
}

#[async_trait]
impl OutletDirectory for InMemoryOutlets {
    async fn search(&self, filters: &OutletFilters) -> Result<OutletMatches, ToolError> {
        // City narrows the candidate set first.
        let city_narrowed: Vec<&Outlet> = match &filters.city {
            Some(city) => {
                let needle = city.to_lowercase();
                self.outlets
                    .iter()
                    .filter(|o| o.city.to_lowercase() == needle)
                    .collect()
            }
            None => self.outlets.iter().collect(),
        };
        let city_candidates = city_narrowed.len();

        // Service narrows again within that subset.
        let matched: Vec<Outlet> = match &filters.service {
            Some(service) => {
                let needle = service.to_lowercase();
                city_narrowed
                    .into_iter()
                    .filter(|o| o.services.iter().any(|s| s.to_lowercase() == needle))
                    .cloned()
                    .collect()
            }
            None => city_narrowed.into_iter().cloned().collect(),
        };

        tracing::debug!(
            city = filters.city.as_deref().unwrap_or("-"),
            service = filters.service.as_deref().unwrap_or("-"),
            city_candidates,
            hits = matched.len(),
            "Outlet search"
        );

        Ok(OutletMatches {
            outlets: matched,
            city_candidates,
        })
    }
}
