// tests/catalog_pipeline.rs
use chrono::NaiveDate;
use holdup::catalog::{build_catalog, process_catalog, CatalogStore};
use holdup::crawl::types::RawArticle;
use holdup::staging::StagingStore;
use holdup::store::StorageError;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn art(ticker: &str, url: &str, published_at: &str) -> RawArticle {
    RawArticle {
        source_api: "alpaca".into(),
        ticker: ticker.into(),
        title: format!("{ticker} news"),
        content: "body".into(),
        url: url.into(),
        published_at: published_at.into(),
        source_name: "Example".into(),
    }
}

#[test]
fn rebuilding_from_the_same_staging_yields_identical_output() {
    let tmp = tempfile::tempdir().unwrap();
    let staging = StagingStore::new(tmp.path().join("staging"));
    staging
        .append(
            &[
                art("AAPL", "https://example.com/a", "2024-05-01T09:00:00Z"),
                art("MSFT", "https://example.com/b", "2024-05-01T10:00:00Z"),
                art("AAPL", "https://example.com/a", "2024-05-01T11:00:00Z"),
            ],
            day(),
        )
        .unwrap();

    let first = build_catalog(&staging, day()).unwrap();
    let second = build_catalog(&staging, day()).unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn empty_staging_builds_an_empty_catalog_and_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let staging = StagingStore::new(tmp.path().join("staging"));
    let catalog_store = CatalogStore::new(tmp.path().join("catalog"));

    let catalog = process_catalog(&staging, &catalog_store, day()).unwrap();
    assert!(catalog.is_empty());
    assert!(!catalog_store.file_path(day()).exists());
}

#[test]
fn empty_rebuild_leaves_the_prior_artifact_untouched() {
    let tmp = tempfile::tempdir().unwrap();
    let staging = StagingStore::new(tmp.path().join("staging"));
    let catalog_store = CatalogStore::new(tmp.path().join("catalog"));

    // Day one produced a catalog.
    staging
        .append(&[art("AAPL", "https://example.com/a", "2024-05-01T09:00:00Z")], day())
        .unwrap();
    process_catalog(&staging, &catalog_store, day()).unwrap();
    let saved = std::fs::read_to_string(catalog_store.file_path(day())).unwrap();

    // A later run against a date with no staging must not overwrite it.
    let empty_day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
    process_catalog(&staging, &catalog_store, empty_day).unwrap();
    assert_eq!(
        std::fs::read_to_string(catalog_store.file_path(day())).unwrap(),
        saved
    );
    assert!(!catalog_store.file_path(empty_day).exists());
}

#[test]
fn processing_saves_and_the_saved_catalog_round_trips() {
    let tmp = tempfile::tempdir().unwrap();
    let staging = StagingStore::new(tmp.path().join("staging"));
    let catalog_store = CatalogStore::new(tmp.path().join("catalog"));

    staging
        .append(
            &[
                art("AAPL", "https://example.com/a", "2024-05-01T09:00:00Z"),
                art("AAPL", "https://example.com/b", "2024-05-01T12:00:00Z"),
                art("MSFT", "https://example.com/c", "2024-05-01T10:00:00Z"),
            ],
            day(),
        )
        .unwrap();

    let built = process_catalog(&staging, &catalog_store, day()).unwrap();
    let loaded = catalog_store.load(day()).unwrap();
    assert_eq!(built, loaded);

    // Same keys, same per-key order, field values verbatim.
    assert_eq!(loaded.keys().collect::<Vec<_>>(), vec!["AAPL", "MSFT"]);
    assert_eq!(loaded["AAPL"][0].url, "https://example.com/b");
    assert_eq!(loaded["AAPL"][1].url, "https://example.com/a");
    assert_eq!(loaded["AAPL"][0].published_at, "2024-05-01T12:00:00Z");
}

#[test]
fn loading_an_absent_catalog_is_an_empty_catalog() {
    let tmp = tempfile::tempdir().unwrap();
    let catalog_store = CatalogStore::new(tmp.path().join("catalog"));
    assert!(catalog_store.load(day()).unwrap().is_empty());
}

#[test]
fn corrupt_catalog_file_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("catalog");
    let catalog_store = CatalogStore::new(&dir);

    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(catalog_store.file_path(day()), "{ definitely broken").unwrap();

    assert!(matches!(
        catalog_store.load(day()),
        Err(StorageError::Malformed { .. })
    ));
}

#[test]
fn corrupt_staging_fails_the_build_instead_of_losing_data() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("staging");
    let staging = StagingStore::new(&dir);

    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(staging.file_path(day()), "[{\"broken\": ").unwrap();

    assert!(build_catalog(&staging, day()).is_err());
}
