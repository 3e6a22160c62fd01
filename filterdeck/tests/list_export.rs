//! Table state, list requests and bulk export against a recording list source.

use serde_json::{Value, json};
use std::sync::Mutex;

use filterdeck::export::{CsvExport, ExportSummary, export_csv, json_columns};
use filterdeck::filters::{FormValue, FormValues};
use filterdeck::listing::{ListRequest, ListResponse, ListSource};
use filterdeck::{AppConfig, FilterError, RowFormatError};

/// Records every request and fails on a configured page.
struct RecordingSource {
    docs: Vec<Value>,
    fail_on_page: Option<u64>,
    /// Page number echoed back instead of the requested one.
    reported_page: Option<u64>,
    requests: Mutex<Vec<ListRequest>>,
}

impl RecordingSource {
    fn new(count: usize) -> Self {
        Self {
            docs: (1..=count).map(|i| json!({"title": format!("Webinar {i}"), "fee": i * 10})).collect(),
            fail_on_page: None,
            reported_page: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<ListRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl ListSource for RecordingSource {
    type Item = Value;

    async fn fetch(&self, request: &ListRequest) -> Result<ListResponse<Value>, FilterError> {
        self.requests.lock().expect("lock").push(request.clone());
        if self.fail_on_page == Some(request.page) {
            return Err(FilterError::fetch("503 Service Unavailable"));
        }
        let start = request.offset() as usize;
        Ok(ListResponse {
            docs: self.docs.iter().skip(start).take(request.limit as usize).cloned().collect(),
            page: self.reported_page.unwrap_or(request.page),
            limit: request.limit,
            total_docs: self.docs.len() as u64,
        })
    }
}

#[tokio::test]
async fn table_state_sends_compiled_filters() {
    let config = AppConfig::builtin().expect("bundled config parses");
    let webinars = config.resource("webinars").expect("webinars configured");
    let mut table = config.table_state();
    table.set_page(3);

    let form = FormValues::new()
        .with("title", FormValue::text("rust"))
        .with("mode", FormValue::Many(Vec::new()))
        .with_sort("-fee");
    table.apply(webinars.compile(&form));

    let source = RecordingSource::new(25);
    let response = source.fetch(&table.request()).await.expect("fetch succeeds");
    table.sync(&response);

    let sent = &source.requests()[0];
    assert_eq!(sent.page, 1);
    assert_eq!(sent.limit, 10);
    assert_eq!(sent.sort, "-fee");
    assert_eq!(Value::Object(sent.filters.clone()), json!({"title": {"$regex": "rust", "$options": "i"}}));
    assert!(response.has_more());
}

#[tokio::test]
async fn export_pages_through_everything_with_current_filters() {
    let config = AppConfig::builtin().expect("bundled config parses");
    let webinars = config.resource("webinars").expect("webinars configured");
    let query = webinars.compile(&FormValues::new().with("isPaid", FormValue::Bool(true)).with_sort("-fee"));

    let source = RecordingSource::new(5);
    let export = CsvExport::new("webinars", ["Title", "Fee"]).with_batch_size(2);
    let columns = ["title", "fee"];
    let mut out = Vec::new();

    let summary = export_csv(&source, &query, &export, json_columns(&columns[..]), &mut out)
        .await
        .expect("export succeeds");

    assert_eq!(summary, ExportSummary { rows: 5, failed_rows: 0, pages: 3 });
    let requests = source.requests();
    assert_eq!(requests.iter().map(|r| r.page).collect::<Vec<_>>(), [1, 2, 3]);
    assert!(requests.iter().all(|r| r.sort == "-fee" && r.filters.get("isPaid") == Some(&json!(true))));

    let csv = String::from_utf8(out).expect("utf8");
    assert!(csv.starts_with("Title,Fee\nWebinar 1,10\n"));
    assert_eq!(csv.lines().count(), 6);
}

#[tokio::test]
async fn failing_formatter_degrades_to_placeholder_rows() {
    let source = RecordingSource::new(3);
    let export = CsvExport::new("webinars", ["Title"]).with_placeholder("ERROR");
    let mut out = Vec::new();

    let summary = export_csv(
        &source,
        &Default::default(),
        &export,
        |doc: &Value| match doc["fee"].as_u64() {
            Some(20) => Err(RowFormatError::new("fee 20 is not exportable")),
            _ => Ok(vec![doc["title"].as_str().unwrap_or_default().to_string()]),
        },
        &mut out,
    )
    .await
    .expect("export succeeds");

    assert_eq!(summary.failed_rows, 1);
    assert_eq!(String::from_utf8(out).expect("utf8"), "Title\nWebinar 1\nERROR\nWebinar 3\n");
}

#[tokio::test]
async fn fetch_errors_abort_the_export() {
    let mut source = RecordingSource::new(5);
    source.fail_on_page = Some(2);
    let export = CsvExport::new("webinars", ["Title"]).with_batch_size(2);
    let columns = ["title"];

    let result = export_csv(&source, &Default::default(), &export, json_columns(&columns[..]), std::io::sink()).await;
    assert!(matches!(result, Err(FilterError::Fetch { .. })));
    assert_eq!(source.requests().len(), 2);
}

#[tokio::test]
async fn export_stops_even_when_backend_misreports_the_page() {
    let mut source = RecordingSource::new(3);
    source.reported_page = Some(1);
    let export = CsvExport::new("webinars", ["Title"]).with_batch_size(2);
    let columns = ["title"];
    let mut out = Vec::new();

    let summary = export_csv(&source, &Default::default(), &export, json_columns(&columns[..]), &mut out)
        .await
        .expect("export succeeds");

    assert_eq!(summary, ExportSummary { rows: 3, failed_rows: 0, pages: 2 });
    assert_eq!(source.requests().iter().map(|r| r.page).collect::<Vec<_>>(), [1, 2]);
    assert_eq!(String::from_utf8(out).expect("utf8"), "Title\nWebinar 1\nWebinar 2\nWebinar 3\n");
}

#[tokio::test]
async fn full_last_page_ends_without_an_extra_request() {
    let source = RecordingSource::new(4);
    let export = CsvExport::new("webinars", ["Title"]).with_batch_size(2);
    let columns = ["title"];

    let summary = export_csv(&source, &Default::default(), &export, json_columns(&columns[..]), std::io::sink())
        .await
        .expect("export succeeds");

    assert_eq!(summary, ExportSummary { rows: 4, failed_rows: 0, pages: 2 });
    assert_eq!(source.requests().len(), 2);
}

#[tokio::test]
async fn empty_result_writes_only_the_header() {
    let source = RecordingSource::new(0);
    let export = CsvExport::new("webinars", ["Title", "Fee"]);
    let columns = ["title", "fee"];
    let mut out = Vec::new();

    let summary = export_csv(&source, &Default::default(), &export, json_columns(&columns[..]), &mut out)
        .await
        .expect("export succeeds");

    assert_eq!(summary, ExportSummary { rows: 0, failed_rows: 0, pages: 1 });
    assert_eq!(String::from_utf8(out).expect("utf8"), "Title,Fee\n");
}
