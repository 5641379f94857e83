use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::filter::filter_records;
use crate::render::{initials, render_page, PageContext, ViewMode, ViewSettings};
use crate::server::{self, AppState, PageQuery};
use crate::source::{parse_dataset, Record, RecordSource, SourceError};

const ROSTER: &str = r#"[
  {"group": "IS-235.1", "index": 1, "fio": "Ivan Petrov"},
  {"group": "IS-235.1", "index": 2, "fio": "Anna Orlova"},
  {"group": "IS-235.2", "index": 3, "fio": "Pavel Ivanov"},
  {"group": "PM-101", "index": "4", "fio": "Olga Smirnova"},
  {"index": 5}
]"#;

fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_opt(9, 7, 2)
        .unwrap()
}

fn records() -> Vec<Record> {
    parse_dataset(ROSTER).unwrap().records().to_vec()
}

fn render(mode: ViewMode, records: &[Record], query: &str) -> String {
    let settings = ViewSettings::default();
    render_page(
        mode,
        &PageContext {
            records,
            query,
            generated_at: fixed_time(),
            settings: &settings,
        },
    )
}

fn is_subsequence(sub: &[&Record], all: &[Record]) -> bool {
    let mut it = all.iter();
    sub.iter().all(|s| it.any(|r| std::ptr::eq(r, *s)))
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("rosterview-{}-{name}", std::process::id()))
}

#[test]
fn filter_is_an_ordered_subsequence() {
    let all = records();
    for q in ["", "ivan", "IS-235", "o", "zzz", "235.2"] {
        let out = filter_records(&all, q);
        assert!(is_subsequence(&out, &all), "query {q:?}");
    }
}

#[test]
fn empty_query_is_identity() {
    let all = records();
    let out: Vec<Record> = filter_records(&all, "").into_iter().cloned().collect();
    assert_eq!(out, all);
}

#[test]
fn filter_ignores_case() {
    let all = records();
    assert_eq!(filter_records(&all, "ivan"), filter_records(&all, "IVAN"));
    assert_eq!(filter_records(&all, "ivan").len(), 2);
}

#[test]
fn filter_matches_fio_or_group() {
    let all = records();
    let by_group = filter_records(&all, "pm-101");
    assert_eq!(by_group.len(), 1);
    assert_eq!(by_group[0].fio_or_empty(), "Olga Smirnova");

    let by_name = filter_records(&all, "orlova");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].group_or_empty(), "IS-235.1");
}

#[test]
fn no_matches_is_empty_not_error() {
    assert!(filter_records(&records(), "nobody").is_empty());
}

#[test]
fn initials_examples() {
    assert_eq!(initials(Some("Ivan Petrov")), "IP");
    assert_eq!(initials(Some("")), "?");
    assert_eq!(initials(None), "?");
}

#[test]
fn script_in_data_is_escaped() {
    let payload = vec![Record::new(
        Some("\"><img src=x>"),
        Some("1"),
        Some("<script>alert(1)</script>"),
    )];
    for mode in [ViewMode::Normal, ViewMode::Export] {
        let html = render(mode, &payload, "");
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("\"><img"));
        assert!(html.contains("&quot;&gt;&lt;img src=x&gt;"));
    }
}

#[test]
fn query_is_escaped_in_form_and_banner() {
    let all = records();
    let query = "\"><script>x</script>";
    let html = render(ViewMode::Normal, &all, query);
    assert!(!html.contains(query));
    assert!(html.contains(r#"value="&quot;&gt;&lt;script&gt;x&lt;/script&gt;""#));
}

#[test]
fn loader_reports_missing_file() {
    let source = RecordSource::FilePath(temp_path("does-not-exist.json"));
    let err = source.load().unwrap_err();
    assert!(matches!(err, SourceError::Unavailable { .. }));
    assert_eq!(err.public_message(), "data source not found");
}

#[test]
fn loader_reports_malformed_content() {
    for text in ["{not valid json", "{}", "\"text\"", "null"] {
        let err = RecordSource::Inline(text.to_string()).load().unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }), "{text:?}");
    }
}

#[test]
fn loader_rejects_invalid_utf8_file() {
    let path = temp_path("latin1.json");
    std::fs::write(&path, b"[{\"fio\": \"\xff\xfe\"}]").unwrap();
    let err = RecordSource::FilePath(path.clone()).load().unwrap_err();
    assert!(matches!(err, SourceError::Malformed { .. }));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn loader_reads_file_in_order() {
    let path = temp_path("roster.json");
    std::fs::write(&path, ROSTER).unwrap();
    let ds = RecordSource::FilePath(path.clone()).load().unwrap();
    let names: Vec<&str> = ds.records().iter().map(Record::fio_or_empty).collect();
    assert_eq!(
        names,
        vec!["Ivan Petrov", "Anna Orlova", "Pavel Ivanov", "Olga Smirnova", ""]
    );
    let _ = std::fs::remove_file(&path);
}

#[test]
fn export_has_no_form_and_no_initials() {
    let all = records();
    let html = render(ViewMode::Export, &all, "ivan");
    assert!(!html.contains("<form"));
    assert!(!html.contains(r#"name="search""#));
    assert!(!html.contains("student-avatar"));
    assert!(!html.contains("<th>Initials</th>"));
    assert!(html.contains("window.print()"));
    assert!(html.contains("}, 1000);"));
    assert!(html.contains("05.03.2024 09:07:02"));
}

#[test]
fn normal_has_form_and_initials() {
    let all = records();
    let html = render(ViewMode::Normal, &all, "");
    assert!(html.contains("<form"));
    assert!(html.contains(r#"name="search""#));
    assert!(html.contains("<th>Initials</th>"));
    assert!(html.contains(r#"<div class="student-avatar" title="Ivan Petrov">IP</div>"#));
    assert!(html.contains(r#"<div class="student-avatar" title="">?</div>"#));
    assert!(html.contains(r#"href="?export=pdf""#));
    assert!(html.contains("05.03.2024 09:07"));
    assert!(!html.contains("Reset search"));
}

#[test]
fn empty_states_differ_by_query() {
    let without_query = render(ViewMode::Normal, &[], "");
    let with_query = render(ViewMode::Normal, &[], "nobody");
    assert!(without_query.contains("Check the data source file"));
    assert!(!without_query.contains("Try a different search query"));
    assert!(with_query.contains("Try a different search query"));
    assert!(!with_query.contains("Check the data source file"));
    assert!(with_query.contains("Reset search"));
}

#[test]
fn record_count_matches_rendered_rows() {
    let all = records();
    let row_re = Regex::new(r#"<tr class="(highlight)?">"#).unwrap();
    let total_re = Regex::new(r"Total students: <strong>(\d+)</strong>").unwrap();
    for q in ["", "ivan", "IS-235.1", "nobody"] {
        let shown: Vec<Record> = filter_records(&all, q).into_iter().cloned().collect();
        let html = render(ViewMode::Normal, &shown, q);
        let rows = row_re.find_iter(&html).count();
        let total: usize = total_re.captures(&html).unwrap()[1].parse().unwrap();
        assert_eq!(rows, shown.len(), "query {q:?}");
        assert_eq!(total, rows, "query {q:?}");
    }
}

#[test]
fn search_banner_echoes_query_and_count() {
    let all = records();
    let shown: Vec<Record> = filter_records(&all, "ivan").into_iter().cloned().collect();
    let html = render(ViewMode::Normal, &shown, "ivan");
    assert!(html.contains(r#"Students found: <strong>2</strong> for query: "<strong>ivan</strong>""#));
    assert!(html.contains("Distinct groups: <strong>2</strong>"));
}

#[test]
fn build_page_runs_the_whole_pipeline() {
    let source = RecordSource::Inline(ROSTER.to_string());
    let query = PageQuery {
        search: Some("IS-235.1".to_string()),
        export: Some("pdf".to_string()),
    };
    let page =
        server::build_page(&source, &query, &ViewSettings::default(), fixed_time()).unwrap();
    assert_eq!(page.mode, ViewMode::Export);
    assert_eq!(page.loaded, 5);
    assert_eq!(page.shown, 2);
    assert!(page.html.contains("Total students: <strong>2</strong>"));
}

#[test]
fn settings_are_escaped() {
    let settings = ViewSettings {
        title: "<b>Roster</b>".to_string(),
        subtitle: "A & B".to_string(),
        stylesheet_href: "x\".css".to_string(),
    };
    let html = render_page(
        ViewMode::Normal,
        &PageContext {
            records: &[],
            query: "",
            generated_at: fixed_time(),
            settings: &settings,
        },
    );
    assert!(html.contains("&lt;b&gt;Roster&lt;/b&gt;"));
    assert!(html.contains("A &amp; B"));
    assert!(html.contains(r#"href="x&quot;.css""#));
}

async fn spawn_server(source: RecordSource, stylesheet: Option<PathBuf>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::new(source, ViewSettings::default(), stylesheet);
    tokio::spawn(server::serve(listener, state, std::future::pending()));
    format!("http://{addr}")
}

#[tokio::test]
async fn http_serves_normal_and_export_pages() {
    let base = spawn_server(RecordSource::Inline(ROSTER.to_string()), None).await;

    let resp = reqwest::get(format!("{base}/?search=ORLOVA")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let body = resp.text().await.unwrap();
    assert!(body.contains("Anna Orlova"));
    assert!(!body.contains("Ivan Petrov</td>"));
    assert!(body.contains(r#"value="ORLOVA""#));

    let body = reqwest::get(format!("{base}/?export=pdf"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("print-mode"));
    assert!(!body.contains("<form"));
}

#[test]
fn repeated_parameters_keep_the_last_value() {
    let params = [
        ("search".to_string(), "a".to_string()),
        ("search".to_string(), "ivan".to_string()),
        ("export".to_string(), "pdf".to_string()),
    ]
    .into_iter()
    .collect();
    let query = PageQuery::from_params(params);
    assert_eq!(query.search.as_deref(), Some("ivan"));
    assert_eq!(query.mode(), ViewMode::Export);
}

#[tokio::test]
async fn http_repeated_search_uses_last_value() {
    let base = spawn_server(RecordSource::Inline(ROSTER.to_string()), None).await;
    let resp = reqwest::get(format!("{base}/?search=a&search=ivan"))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Ivan Petrov</td>"));
    assert!(body.contains("Pavel Ivanov</td>"));
    assert!(!body.contains("Anna Orlova</td>"));
    assert!(body.contains(r#"value="ivan""#));

    let body = reqwest::get(format!("{base}/?export=x&export=pdf"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("print-mode"));
}

#[tokio::test]
async fn http_repeated_parameters_still_report_loader_failure() {
    let base = spawn_server(RecordSource::Inline("{}".to_string()), None).await;
    let resp = reqwest::get(format!("{base}/?search=a&search=b"))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 500);
    assert_eq!(resp.text().await.unwrap(), "malformed data source");
}

#[tokio::test]
async fn http_reports_loader_failures_as_plain_500() {
    let base = spawn_server(RecordSource::FilePath(temp_path("absent.json")), None).await;
    let resp = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 500);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));
    let body = resp.text().await.unwrap();
    assert_eq!(body, "data source not found");

    let base = spawn_server(RecordSource::Inline("{}".to_string()), None).await;
    let resp = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 500);
    assert_eq!(resp.text().await.unwrap(), "malformed data source");
}

#[tokio::test]
async fn http_serves_stylesheet_and_404s() {
    let base = spawn_server(RecordSource::Inline("[]".to_string()), None).await;
    let resp = reqwest::get(format!("{base}/style.css")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert!(resp.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/css"));
    assert!(resp.text().await.unwrap().contains(".student-avatar"));

    let resp = reqwest::get(format!("{base}/missing")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let base = spawn_server(
        RecordSource::Inline("[]".to_string()),
        Some(temp_path("absent.css")),
    )
    .await;
    let resp = reqwest::get(format!("{base}/style.css")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn http_rereads_source_on_every_request() {
    let path = temp_path("live.json");
    std::fs::write(&path, r#"[{"fio": "First Person"}]"#).unwrap();
    let base = spawn_server(RecordSource::FilePath(path.clone()), None).await;

    let body = reqwest::get(format!("{base}/")).await.unwrap().text().await.unwrap();
    assert!(body.contains("First Person"));

    std::fs::write(&path, r#"[{"fio": "Second Person"}]"#).unwrap();
    let body = reqwest::get(format!("{base}/")).await.unwrap().text().await.unwrap();
    assert!(body.contains("Second Person"));
    assert!(!body.contains("First Person"));
    let _ = std::fs::remove_file(&path);
}
