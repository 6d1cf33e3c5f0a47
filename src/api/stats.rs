//! Statistics endpoints

use super::types::{CategoryStat, Dataset, SummaryStats};
use crate::error::Result;
use crate::http::{AuthenticatedClient, PendingRequest};

/// `/stats/*` endpoints
#[derive(Debug, Clone, Copy)]
pub struct StatsApi<'a> {
    client: &'a AuthenticatedClient,
}

impl<'a> StatsApi<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Platform-wide counters
    ///
    /// # Errors
    ///
    /// Returns the client error for a failed request or undecodable body.
    pub async fn summary(&self) -> Result<SummaryStats> {
        self.client
            .request_json(PendingRequest::get("/stats/summary"))
            .await
    }

    /// Most viewed datasets; the server picks the count when `limit` is `None`
    ///
    /// # Errors
    ///
    /// Returns the client error for a failed request or undecodable body.
    pub async fn top_viewed(&self, limit: Option<u32>) -> Result<Vec<Dataset>> {
        self.client
            .request_json(PendingRequest::get("/stats/top-viewed").query_opt("limit", limit))
            .await
    }

    /// Most downloaded datasets; the server picks the count when `limit` is `None`
    ///
    /// # Errors
    ///
    /// Returns the client error for a failed request or undecodable body.
    pub async fn top_downloaded(&self, limit: Option<u32>) -> Result<Vec<Dataset>> {
        self.client
            .request_json(PendingRequest::get("/stats/top-downloaded").query_opt("limit", limit))
            .await
    }

    /// Dataset count per category
    ///
    /// # Errors
    ///
    /// Returns the client error for a failed request or undecodable body.
    pub async fn by_category(&self) -> Result<Vec<CategoryStat>> {
        self.client
            .request_json(PendingRequest::get("/stats/by-category"))
            .await
    }
}
