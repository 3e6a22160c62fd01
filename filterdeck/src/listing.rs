//! List endpoint contract and the table state that drives it.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

use crate::errors::FilterError;
use crate::filters::{QueryObject, prune_empty};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Body sent to a resource's list endpoint.
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRequest {
    pub page: u64,
    pub limit: u64,
    pub sort: String,
    #[cfg_attr(feature = "utoipa", schema(value_type = Object))]
    pub filters: Map<String, Value>,
}

impl ListRequest {
    /// Split a query into sort and (pruned) filters for the given page.
    pub fn from_query(query: &QueryObject, page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            sort: query.sort().to_string(),
            filters: prune_empty(query.constraints()),
        }
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Page of documents returned by a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub docs: Vec<T>,
    pub page: u64,
    pub limit: u64,
    #[serde(rename = "totalDocs")]
    pub total_docs: u64,
}

impl<T> ListResponse<T> {
    #[inline]
    pub fn has_more(&self) -> bool {
        self.page.saturating_mul(self.limit) < self.total_docs
    }

    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total_docs.div_ceil(self.limit)
    }
}

/// Source of list pages, typically an HTTP client for one resource.
#[allow(async_fn_in_trait)]
pub trait ListSource {
    type Item;

    async fn fetch(&self, request: &ListRequest) -> Result<ListResponse<Self::Item>, FilterError>;
}

/// Serves already-fetched documents page by page. Filters are passed through untouched and
/// not evaluated.
#[derive(Debug, Clone, Default)]
pub struct StaticPages<T> {
    docs: Vec<T>,
}

impl<T> StaticPages<T> {
    pub fn new(docs: Vec<T>) -> Self {
        Self { docs }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl<T: DeserializeOwned> StaticPages<T> {
    /// Accepts either a bare JSON array or a list response object with `docs`.
    pub fn from_json(raw: Value) -> Result<Self, FilterError> {
        let docs = match raw {
            Value::Array(_) => serde_json::from_value(raw)?,
            Value::Object(mut map) => match map.remove("docs") {
                Some(docs) => serde_json::from_value(docs)?,
                None => return Err(FilterError::invalid_config("expected an array or an object with 'docs'")),
            },
            _ => return Err(FilterError::invalid_config("expected an array or an object with 'docs'")),
        };
        Ok(Self::new(docs))
    }
}

impl<T: Clone> ListSource for StaticPages<T> {
    type Item = T;

    async fn fetch(&self, request: &ListRequest) -> Result<ListResponse<T>, FilterError> {
        let start = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(request.limit).unwrap_or(usize::MAX);
        let docs = self.docs.iter().skip(start).take(limit).cloned().collect();
        Ok(ListResponse {
            docs,
            page: request.page,
            limit: request.limit,
            total_docs: self.docs.len() as u64,
        })
    }
}

/// Pagination and filter state of one resource table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    page: u64,
    limit: u64,
    max_limit: u64,
    query: QueryObject,
}

impl Default for TableState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl TableState {
    pub fn new(limit: u64) -> Self {
        Self::with_max(limit, MAX_PAGE_SIZE)
    }

    pub fn with_max(limit: u64, max_limit: u64) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            page: DEFAULT_PAGE,
            limit: limit.clamp(1, max_limit),
            max_limit,
            query: QueryObject::new(),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn query(&self) -> &QueryObject {
        &self.query
    }

    /// Replace the applied filters. The result set changes, so paging restarts.
    pub fn apply(&mut self, query: QueryObject) {
        self.query = query;
        self.page = DEFAULT_PAGE;
    }

    /// Drop all field constraints, keeping the sort.
    pub fn clear_filters(&mut self) {
        let sort = self.query.sort().to_string();
        self.apply(QueryObject::new().with_sort(sort));
    }

    pub fn set_page(&mut self, page: u64) {
        self.page = page.max(1);
    }

    pub fn set_page_size(&mut self, limit: u64) {
        self.limit = limit.clamp(1, self.max_limit);
        self.page = DEFAULT_PAGE;
    }

    /// Update from a received page; steps back when the current page fell off the end
    /// (e.g. after deleting the last row on it).
    pub fn sync<T>(&mut self, response: &ListResponse<T>) {
        let last = response.total_pages().max(1);
        if self.page > last {
            self.page = last;
        }
    }

    pub fn request(&self) -> ListRequest {
        ListRequest::from_query(&self.query, self.page, self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_with_sort_split_out() {
        let query = QueryObject::new()
            .with_sort("-createdAt")
            .with("status", json!({"$in": [1]}))
            .with("title", json!({"$in": []}));
        let request = ListRequest::from_query(&query, 2, 20);
        assert_eq!(
            serde_json::to_value(&request).expect("serializable"),
            json!({"page": 2, "limit": 20, "sort": "-createdAt", "filters": {"status": {"$in": [1]}}})
        );
        assert_eq!(request.offset(), 20);
    }

    #[test]
    fn response_reads_total_docs() {
        let response: ListResponse<Value> =
            serde_json::from_value(json!({"docs": [{}, {}], "page": 1, "limit": 2, "totalDocs": 5}))
                .expect("response parses");
        assert!(response.has_more());
        assert_eq!(response.total_pages(), 3);
    }

    #[test]
    fn huge_pages_saturate_instead_of_overflowing() {
        let mut table = TableState::new(10);
        table.set_page(u64::MAX / 2);
        assert_eq!(table.request().offset(), u64::MAX);

        let response: ListResponse<Value> =
            serde_json::from_value(json!({"docs": [], "page": u64::MAX, "limit": 2, "totalDocs": 1}))
                .expect("response parses");
        assert!(!response.has_more());
    }

    #[test]
    fn applying_filters_resets_paging() {
        let mut table = TableState::default();
        table.set_page(4);
        table.apply(QueryObject::new().with("featured", json!(true)));
        assert_eq!(table.page(), 1);

        table.set_page(3);
        table.clear_filters();
        assert_eq!(table.page(), 1);
        assert!(table.query().is_unconstrained());
    }

    #[test]
    fn page_size_is_clamped() {
        let mut table = TableState::new(500);
        assert_eq!(table.limit(), MAX_PAGE_SIZE);
        table.set_page_size(0);
        assert_eq!(table.limit(), 1);
    }

    #[test]
    fn sync_steps_back_past_the_last_page() {
        let mut table = TableState::new(10);
        table.set_page(5);
        let response: ListResponse<Value> = ListResponse {
            docs: Vec::new(),
            page: 5,
            limit: 10,
            total_docs: 21,
        };
        table.sync(&response);
        assert_eq!(table.page(), 3);
    }

    #[tokio::test]
    async fn static_pages_slice_by_request() {
        let source = StaticPages::new((1..=7).collect::<Vec<u32>>());
        let page = source
            .fetch(&ListRequest::from_query(&QueryObject::new(), 2, 3))
            .await
            .expect("fetch succeeds");
        assert_eq!(page.docs, [4, 5, 6]);
        assert_eq!(page.total_docs, 7);

        let past_end = source
            .fetch(&ListRequest::from_query(&QueryObject::new(), 4, 3))
            .await
            .expect("fetch succeeds");
        assert!(past_end.docs.is_empty());
    }
}
