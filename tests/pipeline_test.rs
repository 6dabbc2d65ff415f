//! Two-stage pipeline integration tests
//!
//! Covers persist-stage failure isolation, the extract/persist/query
//! round-trip, and a full job run against a mock marketplace.

use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use adsift::crawler::{persist_batch, IngestionOrchestrator, PageFetcher, PaginationWalker, SearchUrlBuilder};
use adsift::error::{Error, StoreError};
use adsift::models::{Advertisement, IngestRequest, WalkOutcome};
use adsift::parser::{ListingPageParser, RecordExtractor};
use adsift::storage::{AdvertStore, SqliteAdvertStore, StoredAdvertisement};

/// Store wrapper that rejects the nth create, counting from 1
struct FlakyStore {
    inner: SqliteAdvertStore,
    fail_on: usize,
    seen: Mutex<usize>,
}

impl FlakyStore {
    fn new(fail_on: usize) -> Self {
        Self {
            inner: SqliteAdvertStore::in_memory().unwrap(),
            fail_on,
            seen: Mutex::new(0),
        }
    }
}

impl AdvertStore for FlakyStore {
    fn begin(&self) -> Result<(), StoreError> {
        self.inner.begin()
    }

    fn create(&self, advert: &Advertisement) -> Result<(), StoreError> {
        let mut seen = self.seen.lock().unwrap();
        *seen += 1;
        if *seen == self.fail_on {
            return Err(StoreError::Rejected("simulated write failure".to_string()));
        }
        self.inner.create(advert)
    }

    fn commit(&self) -> Result<(), StoreError> {
        self.inner.commit()
    }

    fn adverts_for(
        &self,
        query: &str,
        from: chrono::DateTime<Utc>,
        to: chrono::DateTime<Utc>,
    ) -> Result<Vec<StoredAdvertisement>, StoreError> {
        self.inner.adverts_for(query, from, to)
    }

    fn distinct_queries(&self) -> Result<Vec<String>, StoreError> {
        self.inner.distinct_queries()
    }

    fn count(&self) -> Result<usize, StoreError> {
        self.inner.count()
    }
}

fn advert(title: &str) -> Advertisement {
    Advertisement {
        title: title.to_string(),
        url: format!("https://market.example.com/d/ad/{title}.html"),
        price: 1500,
        place: "Kyiv".to_string(),
        date_added: Utc::now(),
        query: "macbook".to_string(),
        tag: "Electronics".to_string(),
    }
}

fn outcome_with(records: Vec<Advertisement>) -> WalkOutcome {
    WalkOutcome {
        cards_seen: records.len(),
        tag: "Electronics".to_string(),
        pages_visited: 1,
        records,
        card_failures: 0,
        stopped_early: false,
    }
}

/// One failing record does not roll back the rest of the batch
#[test]
fn test_persist_isolation() {
    let store = FlakyStore::new(3);
    let records: Vec<_> = (1..=5).map(|n| advert(&format!("ad-{n}"))).collect();
    let request = IngestRequest::new("macbook");

    let report = persist_batch(&store, &request, outcome_with(records));

    assert_eq!(report.extracted, 5);
    assert_eq!(report.persisted, 4);
    assert_eq!(report.persist_failures, 1);

    // The commit still happened for the surviving records
    assert_eq!(store.count().unwrap(), 4);
}

/// An empty batch produces an empty report and touches no unit of work
#[test]
fn test_persist_empty_batch() {
    let store = SqliteAdvertStore::in_memory().unwrap();
    let request = IngestRequest::new("macbook");

    let report = persist_batch(&store, &request, outcome_with(Vec::new()));

    assert_eq!(report.extracted, 0);
    assert_eq!(report.persisted, 0);
    assert_eq!(report.persist_failures, 0);
    assert_eq!(store.count().unwrap(), 0);
}

/// A record extracted from real markup survives persistence and query-back
/// unchanged in its normalizable fields
#[test]
fn test_extract_persist_query_roundtrip() {
    let html = std::fs::read_to_string("tests/fixtures/html/listing_page.html").unwrap();
    let page = ListingPageParser::new().parse(&html).unwrap();

    let extractor = RecordExtractor::new(Url::parse("https://market.example.com").unwrap());
    let mut record = extractor.extract(&page.cards[0]).unwrap();
    record.query = "macbook".to_string();
    record.tag = "Electronics".to_string();

    let store = SqliteAdvertStore::in_memory().unwrap();
    let request = IngestRequest::new("macbook");
    let report = persist_batch(&store, &request, outcome_with(vec![record.clone()]));
    assert_eq!(report.persisted, 1);

    let from = Utc::now() - chrono::Duration::days(7);
    let to = Utc::now() + chrono::Duration::days(1);
    let found = store.adverts_for("macbook", from, to).unwrap();

    assert_eq!(found.len(), 1);
    let stored = &found[0].advertisement;
    assert_eq!(stored.title, record.title);
    assert_eq!(stored.price, record.price);
    assert_eq!(stored.place, record.place);
    assert_eq!(stored.url, record.url);
    assert_eq!(stored.query, record.query);
    assert_eq!(stored.tag, record.tag);
}

/// Full job run against a mock marketplace
#[tokio::test]
async fn test_orchestrator_end_to_end() {
    let server = MockServer::start().await;

    let category_page = r#"<!DOCTYPE html><html><body><ul>
        <li class="css-szrfjb"><a href="/elektronika/q-macbook/">Electronics<span>42</span></a></li>
        <li class="css-szrfjb"><a href="/moda/q-macbook/">Fashion<span>3</span></a></li>
    </ul></body></html>"#;

    let listing_page = r#"<!DOCTYPE html><html><body>
        <div data-cy="l-card"><a class="css-rc5s2u" href="/d/ad/macbook-pro.html">
            <div class="css-u2ayx9"><h6>MacBook Pro</h6><p>45 000 UAH</p></div>
            <div class="css-odp1qd"><p>Kyiv - Today</p></div>
        </a></div>
        <div data-cy="l-card"><a class="css-rc5s2u" href="/d/ad/macbook-air.html">
            <div class="css-u2ayx9"><h6>MacBook Air</h6><p>Free</p></div>
            <div class="css-odp1qd"><p>Lviv - Yesterday</p></div>
        </a></div>
    </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/q-macbook/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(category_page))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/elektronika/q-macbook/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page))
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(Duration::from_secs(5)).unwrap();
    let urls = SearchUrlBuilder::new("http", &server.address().to_string()).unwrap();
    let orchestrator = IngestionOrchestrator::with_walker(PaginationWalker::with_parts(fetcher, urls));

    let store = SqliteAdvertStore::in_memory().unwrap();
    let request = IngestRequest::new("macbook");

    let report = orchestrator.run(&request, &store).await.unwrap();

    assert_eq!(report.tag, "Electronics");
    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.extracted, 2);
    assert_eq!(report.persisted, 2);
    assert_eq!(report.persist_failures, 0);
    assert_eq!(store.count().unwrap(), 2);

    // The zero-price record is queryable by its query but filtered by "all"
    let from = Utc::now() - chrono::Duration::days(7);
    let to = Utc::now() + chrono::Duration::days(1);
    assert_eq!(store.adverts_for("macbook", from, to).unwrap().len(), 2);
    assert_eq!(store.adverts_for("all", from, to).unwrap().len(), 1);
}

/// An invalid submission is rejected before anything is fetched or persisted
#[tokio::test]
async fn test_orchestrator_rejects_invalid_job() {
    let fetcher = PageFetcher::new(Duration::from_secs(5)).unwrap();
    let urls = SearchUrlBuilder::new("http", "127.0.0.1:9").unwrap();
    let orchestrator = IngestionOrchestrator::with_walker(PaginationWalker::with_parts(fetcher, urls));

    let store = SqliteAdvertStore::in_memory().unwrap();
    let request = IngestRequest::new("   ");

    let result = orchestrator.run(&request, &store).await;

    assert!(matches!(result, Err(Error::InvalidJob(_))));
    assert_eq!(store.count().unwrap(), 0);
}

/// A fetch-stage failure persists nothing
#[tokio::test]
async fn test_fetch_failure_persists_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/q-macbook/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(Duration::from_secs(5)).unwrap();
    let urls = SearchUrlBuilder::new("http", &server.address().to_string()).unwrap();
    let orchestrator = IngestionOrchestrator::with_walker(PaginationWalker::with_parts(fetcher, urls));

    let store = SqliteAdvertStore::in_memory().unwrap();
    let request = IngestRequest::new("macbook");

    let result = orchestrator.run(&request, &store).await;

    assert!(result.is_err());
    assert_eq!(store.count().unwrap(), 0);
}
