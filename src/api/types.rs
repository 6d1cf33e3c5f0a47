//! Wire types for the LDX Insight API

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::session::TokenPair;

/// Credentials for login and registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account name
    pub username: String,
    /// Plain-text password
    pub password: String,
}

impl LoginRequest {
    /// Create a credential pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Registration takes the same fields as login
pub type RegisterRequest = LoginRequest;

/// Tokens returned by login and registration
pub type AuthResponse = TokenPair;

/// A published open dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Dataset identifier
    pub id: String,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Free-text summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Category name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Publishing organization or portal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Location of the underlying data file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
    /// Keywords
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Number of recorded views
    #[serde(default)]
    pub view_count: u64,
    /// Number of recorded downloads
    #[serde(default)]
    pub download_count: u64,
    /// Creation timestamp as sent by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp as sent by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Search and paging parameters for the dataset listing
///
/// ```
/// use ldx_insight_client::api::DatasetQuery;
///
/// let query = DatasetQuery::builder()
///     .keyword("rice")
///     .page(1)
///     .build();
/// assert_eq!(
///     query.to_query(),
///     vec![("keyword".to_string(), "rice".to_string()), ("page".to_string(), "1".to_string())]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
#[builder(
    builder_method(doc = "Create a new builder for DatasetQuery"),
    builder_type(doc = "Builder for DatasetQuery", vis = "pub"),
    build_method(doc = "Build the DatasetQuery")
)]
pub struct DatasetQuery {
    /// Matches title or description, case-insensitive
    #[builder(default, setter(strip_option, into))]
    pub keyword: Option<String>,

    /// Exact category, case-insensitive
    #[builder(default, setter(strip_option, into))]
    pub category: Option<String>,

    /// Zero-based page index
    #[builder(default, setter(strip_option))]
    pub page: Option<u32>,

    /// Page size
    #[builder(default, setter(strip_option))]
    pub size: Option<u32>,

    /// Sort expression, e.g. `viewCount,desc`
    #[builder(default, setter(strip_option, into))]
    pub sort: Option<String>,
}

impl DatasetQuery {
    /// Query parameters in request order, omitting unset fields
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let pairs = [
            ("keyword", self.keyword.clone()),
            ("category", self.category.clone()),
            ("page", self.page.map(|page| page.to_string())),
            ("size", self.size.map(|size| size.to_string())),
            ("sort", self.sort.clone()),
        ];
        pairs
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key.to_string(), value)))
            .collect()
    }
}

/// One page of a paged listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetPage {
    /// Datasets on this page
    #[serde(default)]
    pub content: Vec<Dataset>,
    /// Total matching datasets
    #[serde(default)]
    pub total_elements: u64,
    /// Total number of pages
    #[serde(default)]
    pub total_pages: u32,
    /// Zero-based page index
    #[serde(default)]
    pub number: u32,
    /// Requested page size
    #[serde(default)]
    pub size: u32,
}

impl DatasetPage {
    /// Whether a following page exists
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.number.saturating_add(1) < self.total_pages
    }
}

/// Platform-wide counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    /// Published datasets
    #[serde(default)]
    pub total_datasets: u64,
    /// Views across all datasets
    #[serde(default)]
    pub total_views: u64,
    /// Downloads across all datasets
    #[serde(default)]
    pub total_downloads: u64,
    /// Distinct categories
    #[serde(default)]
    pub total_categories: u64,
}

/// Dataset count for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStat {
    /// Category name
    #[serde(alias = "name")]
    pub category: String,
    /// Number of datasets in the category
    #[serde(alias = "total", alias = "datasetCount")]
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_tolerates_sparse_payload() {
        let dataset: Dataset = serde_json::from_str(r#"{"id":"d1","viewCount":7}"#).unwrap();
        assert_eq!(dataset.id, "d1");
        assert_eq!(dataset.view_count, 7);
        assert_eq!(dataset.download_count, 0);
        assert!(dataset.tags.is_empty());
    }

    #[test]
    fn test_dataset_page_from_spring_page() {
        let page: DatasetPage = serde_json::from_str(
            r#"{
                "content": [{"id": "d1", "title": "Rice yield"}],
                "totalElements": 21,
                "totalPages": 3,
                "number": 1,
                "size": 10,
                "pageable": {"pageNumber": 1}
            }"#,
        )
        .unwrap();
        assert_eq!(page.content[0].title, "Rice yield");
        assert_eq!(page.total_elements, 21);
        assert!(page.has_next());
    }

    #[test]
    fn test_last_page_index_does_not_overflow() {
        let page: DatasetPage =
            serde_json::from_str(r#"{"content":[],"totalPages":4294967295,"number":4294967295}"#)
                .unwrap();
        assert!(!page.has_next());
    }

    #[test]
    fn test_empty_query_has_no_params() {
        assert!(DatasetQuery::default().to_query().is_empty());
    }

    #[test]
    fn test_category_stat_aliases() {
        let stat: CategoryStat =
            serde_json::from_str(r#"{"name":"health","total":4}"#).unwrap();
        assert_eq!(stat.category, "health");
        assert_eq!(stat.count, 4);
    }

    #[test]
    fn test_login_request_shape() {
        let body = serde_json::to_value(LoginRequest::new("alice", "secret")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"username": "alice", "password": "secret"})
        );
    }
}
