// tests/staging_append.rs
use chrono::NaiveDate;
use holdup::crawl::types::RawArticle;
use holdup::staging::StagingStore;
use holdup::store::StorageError;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn art(url: &str) -> RawArticle {
    RawArticle {
        source_api: "alpaca".into(),
        ticker: "AAPL".into(),
        title: format!("article {url}"),
        content: "body".into(),
        url: url.into(),
        published_at: "2024-05-01T10:00:00Z".into(),
        source_name: "Example".into(),
    }
}

#[test]
fn absent_file_loads_as_empty_day() {
    let tmp = tempfile::tempdir().unwrap();
    let staging = StagingStore::new(tmp.path().join("staging"));
    assert!(staging.load(day()).unwrap().is_empty());
}

#[test]
fn appends_accumulate_in_order_and_report_totals() {
    let tmp = tempfile::tempdir().unwrap();
    let staging = StagingStore::new(tmp.path().join("staging"));

    let total = staging.append(&[art("https://example.com/1")], day()).unwrap();
    assert_eq!(total, 1);
    let total = staging.append(&[art("https://example.com/2")], day()).unwrap();
    assert_eq!(total, 2);

    let loaded = staging.load(day()).unwrap();
    let urls: Vec<&str> = loaded.iter().map(|a| a.url.as_str()).collect();
    assert_eq!(urls, vec!["https://example.com/1", "https://example.com/2"]);
}

#[test]
fn appending_nothing_is_a_no_op_with_correct_total() {
    let tmp = tempfile::tempdir().unwrap();
    let staging = StagingStore::new(tmp.path().join("staging"));

    staging.append(&[art("https://example.com/1")], day()).unwrap();
    let total = staging.append(&[], day()).unwrap();
    assert_eq!(total, 1);
}

#[test]
fn dates_are_partitioned_into_separate_files() {
    let tmp = tempfile::tempdir().unwrap();
    let staging = StagingStore::new(tmp.path().join("staging"));
    let other_day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();

    staging.append(&[art("https://example.com/1")], day()).unwrap();
    staging.append(&[art("https://example.com/2")], other_day).unwrap();

    assert_eq!(staging.load(day()).unwrap().len(), 1);
    assert_eq!(staging.load(other_day).unwrap().len(), 1);
    assert!(staging.file_path(day()).ends_with("2024-05-01.json"));
}

#[test]
fn corrupt_file_is_an_error_not_an_empty_day() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("staging");
    let staging = StagingStore::new(&dir);

    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(staging.file_path(day()), "not json at all").unwrap();

    assert!(matches!(
        staging.load(day()),
        Err(StorageError::Malformed { .. })
    ));
    // Appending must not silently clobber the unreadable file either.
    assert!(staging.append(&[art("https://example.com/1")], day()).is_err());
}
