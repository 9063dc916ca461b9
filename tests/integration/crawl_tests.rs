//! End-to-end crawl tests
//!
//! These tests use wiremock to stand in for the catalog API and run the
//! full pipeline: city binding, listing walk, detail fetch and export.

use alkoteka_catalog::config::{
    Config, CrawlerConfig, InputConfig, OutputConfig, SiteConfig, UserAgentConfig,
    DEFAULT_CITY_UUID,
};
use alkoteka_catalog::crawler::Coordinator;
use alkoteka_catalog::output::{OutputError, OutputHandler, OutputResult};
use alkoteka_catalog::{CatalogError, ProductRecord};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API: &str = "/web-api/v1";

/// Creates a test configuration pointed at the mock server
fn create_test_config(base_url: &str, seed_path: &Path, items_path: &Path) -> Config {
    Config {
        site: SiteConfig {
            base_url: format!("{}{}/", base_url, API),
            city_uuid: DEFAULT_CITY_UUID.parse().expect("valid uuid"),
        },
        crawler: CrawlerConfig {
            per_page: 4,
            max_pages: 1,
            download_delay: 0,
            max_concurrent_requests: 4,
            request_timeout: 5,
            max_retries: 0,
            retry_delay: 10,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
            override_value: None,
        },
        input: InputConfig {
            seed_path: seed_path.display().to_string(),
        },
        output: OutputConfig {
            items_path: items_path.display().to_string(),
            store_empty: false,
        },
    }
}

struct Workspace {
    _dir: TempDir,
    seeds: PathBuf,
    items: PathBuf,
}

fn workspace(seed_lines: &[&str]) -> Workspace {
    let dir = TempDir::new().expect("temp dir");
    let seeds = dir.path().join("start_urls.txt");
    let items = dir.path().join("result.json");
    std::fs::write(&seeds, seed_lines.join("\n")).expect("write seeds");
    Workspace {
        _dir: dir,
        seeds,
        items,
    }
}

fn read_feed(path: &Path) -> Vec<Value> {
    let content = std::fs::read_to_string(path).expect("feed written");
    serde_json::from_str(&content).expect("feed is a JSON array")
}

async fn mount_city(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("{}/city", API)))
        .and(query_param("city_uuid", DEFAULT_CITY_UUID))
        .respond_with(ResponseTemplate::new(status).set_body_string("{}"))
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer, slug: &str, page: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("{}/product", API)))
        .and(query_param("city_uuid", DEFAULT_CITY_UUID))
        .and(query_param("root_category_slug", slug))
        .and(query_param("page", page.to_string().as_str()))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, slug: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("{}/product/{}", API, slug)))
        .and(query_param("city_uuid", DEFAULT_CITY_UUID))
        .respond_with(response)
        .mount(server)
        .await;
}

fn listing(entries: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "results": entries }))
}

fn detail(vendor_code: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "results": {
            "vendor_code": vendor_code,
            "text_blocks": [{"title": "Описание", "content": "<br>Чистый вкус<br>"}],
            "description_blocks": [{"title": "Бренд", "values": [{"name": "Акме"}]}]
        }
    }))
}

async fn requests_to(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}

#[tokio::test]
async fn test_full_crawl_single_product() {
    let server = MockServer::start().await;
    let ws = workspace(&["https://alkoteka.com/catalog/vodka"]);

    mount_city(&server, 200).await;
    mount_listing(
        &server,
        "vodka",
        1,
        listing(json!([{
            "slug": "abc123",
            "name": "Водка Тестовая",
            "category": {"name": "Водка", "parent": {"name": "Крепкий алкоголь"}},
            "price": 800,
            "prev_price": 1000,
            "available": true,
            "quantity_total": 5,
            "image_url": "https://alkoteka.com/img/abc123.png",
            "action_labels": [{"title": "Скидка"}],
            "filter_labels": [{"filter": "obem", "title": "0.5 Л"}]
        }])),
    )
    .await;
    mount_detail(&server, "abc123", detail("VC-1")).await;

    let config = create_test_config(&server.uri(), &ws.seeds, &ws.items);
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Crawl failed");

    assert_eq!(stats.categories_requested, 1);
    assert_eq!(stats.details_requested, 1);
    assert_eq!(stats.records_emitted, 1);

    let feed = read_feed(&ws.items);
    assert_eq!(feed.len(), 1);

    let item = &feed[0];
    assert_eq!(item["RPC"], json!("VC-1"));
    assert_eq!(item["variants"], json!(1));
    assert_eq!(item["assets"]["set_images"], json!([""]));
    assert_eq!(item["title"], json!("Водка Тестовая, 0.5 Л"));
    assert_eq!(item["brand"], json!("Акме"));
    assert_eq!(item["section"], json!(["Крепкий алкоголь", "Водка"]));
    assert_eq!(item["price_data"]["current"], json!(800));
    assert_eq!(item["price_data"]["original"], json!(1000));
    assert_eq!(item["price_data"]["sale_tag"], json!("Скидка 20%"));
    assert_eq!(item["stock"]["count"], json!(5));
    assert_eq!(item["metadata"]["__description"], json!("Чистый вкус"));
    assert!(item["url"]
        .as_str()
        .expect("url is a string")
        .contains("/web-api/v1/product/abc123?city_uuid="));
    assert!(item["timestamp"].as_i64().expect("timestamp") > 0);
}

#[tokio::test]
async fn test_city_binding_failure_stops_run() {
    let server = MockServer::start().await;
    let ws = workspace(&["https://alkoteka.com/catalog/vodka"]);

    mount_city(&server, 500).await;
    mount_listing(&server, "vodka", 1, listing(json!([{"slug": "abc123"}]))).await;

    let config = create_test_config(&server.uri(), &ws.seeds, &ws.items);
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let result = coordinator.run().await;

    assert!(matches!(
        result,
        Err(CatalogError::LocalityRejected { status: 500, .. })
    ));
    assert_eq!(requests_to(&server, "/web-api/v1/product").await, 0);
    assert!(!ws.items.exists());
}

#[tokio::test]
async fn test_malformed_listing_does_not_stop_other_categories() {
    let server = MockServer::start().await;
    let ws = workspace(&[
        "https://alkoteka.com/catalog/vodka",
        "",
        "   ",
        "https://alkoteka.com/catalog/vino",
    ]);

    mount_city(&server, 200).await;
    mount_listing(
        &server,
        "vodka",
        1,
        ResponseTemplate::new(200).set_body_string("<html>oops</html>"),
    )
    .await;
    mount_listing(&server, "vino", 1, listing(json!([{"slug": "wine-1", "name": "Вино"}]))).await;
    mount_detail(&server, "wine-1", detail("VC-WINE")).await;

    let config = create_test_config(&server.uri(), &ws.seeds, &ws.items);
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Crawl failed");

    // Blank seed lines never become requests
    assert_eq!(stats.categories_requested, 2);
    assert_eq!(requests_to(&server, "/web-api/v1/product").await, 2);
    assert_eq!(stats.listing_failures, 1);

    let feed = read_feed(&ws.items);
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["RPC"], json!("VC-WINE"));
}

#[tokio::test]
async fn test_entries_without_slug_are_skipped() {
    let server = MockServer::start().await;
    let ws = workspace(&["https://alkoteka.com/catalog/rom"]);

    mount_city(&server, 200).await;
    mount_listing(
        &server,
        "rom",
        1,
        listing(json!([
            {"slug": "rum-1", "name": "Ром 1"},
            {"slug": "", "name": "Ром без слага"},
            {"slug": "rum-2", "name": "Ром 2"}
        ])),
    )
    .await;
    mount_detail(&server, "rum-1", detail("VC-R1")).await;
    mount_detail(&server, "rum-2", detail("VC-R2")).await;

    let config = create_test_config(&server.uri(), &ws.seeds, &ws.items);
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Crawl failed");

    assert_eq!(stats.details_requested, 2);
    assert_eq!(stats.summaries_skipped, 1);

    let mut codes: Vec<String> = read_feed(&ws.items)
        .iter()
        .map(|item| item["RPC"].as_str().unwrap_or_default().to_string())
        .collect();
    codes.sort();
    assert_eq!(codes, vec!["VC-R1", "VC-R2"]);
}

#[tokio::test]
async fn test_empty_category_produces_no_output() {
    let server = MockServer::start().await;
    let ws = workspace(&["https://alkoteka.com/catalog/sake"]);

    mount_city(&server, 200).await;
    mount_listing(&server, "sake", 1, listing(json!([]))).await;

    let config = create_test_config(&server.uri(), &ws.seeds, &ws.items);
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Crawl failed");

    assert_eq!(stats.empty_listings, 1);
    assert_eq!(stats.records_emitted, 0);
    assert!(!ws.items.exists());
}

#[tokio::test]
async fn test_missing_seed_file_ends_walk() {
    let server = MockServer::start().await;
    let ws = workspace(&[]);
    std::fs::remove_file(&ws.seeds).expect("remove seeds");

    mount_city(&server, 200).await;

    let config = create_test_config(&server.uri(), &ws.seeds, &ws.items);
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Missing seeds are not fatal");

    assert_eq!(stats.categories_requested, 0);
    assert_eq!(stats.records_emitted, 0);
    assert_eq!(requests_to(&server, "/web-api/v1/city").await, 1);
    assert!(!ws.items.exists());
}

#[tokio::test]
async fn test_detail_failure_skips_only_that_product() {
    let server = MockServer::start().await;
    let ws = workspace(&["https://alkoteka.com/catalog/gin"]);

    mount_city(&server, 200).await;
    mount_listing(
        &server,
        "gin",
        1,
        listing(json!([{"slug": "gin-ok"}, {"slug": "gin-gone"}])),
    )
    .await;
    mount_detail(&server, "gin-ok", detail("VC-GIN")).await;
    mount_detail(&server, "gin-gone", ResponseTemplate::new(404)).await;

    let config = create_test_config(&server.uri(), &ws.seeds, &ws.items);
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Crawl failed");

    assert_eq!(stats.detail_failures, 1);
    assert_eq!(stats.records_emitted, 1);
    assert_eq!(read_feed(&ws.items)[0]["RPC"], json!("VC-GIN"));
}

#[tokio::test]
async fn test_pagination_follows_full_pages() {
    let server = MockServer::start().await;
    let ws = workspace(&["https://alkoteka.com/catalog/viski"]);

    mount_city(&server, 200).await;
    mount_listing(&server, "viski", 1, listing(json!([{"slug": "w1"}, {"slug": "w2"}]))).await;
    mount_listing(&server, "viski", 2, listing(json!([{"slug": "w3"}]))).await;
    mount_detail(&server, "w1", detail("VC-W1")).await;
    mount_detail(&server, "w2", detail("VC-W2")).await;
    mount_detail(&server, "w3", detail("VC-W3")).await;

    let mut config = create_test_config(&server.uri(), &ws.seeds, &ws.items);
    config.crawler.per_page = 2;
    config.crawler.max_pages = 5;

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Crawl failed");

    // Page 2 is short, so page 3 is never requested
    assert_eq!(stats.listing_pages_fetched, 2);
    assert_eq!(requests_to(&server, "/web-api/v1/product").await, 2);
    assert_eq!(stats.records_emitted, 3);
    assert_eq!(read_feed(&ws.items).len(), 3);
}

#[tokio::test]
async fn test_single_page_by_default() {
    let server = MockServer::start().await;
    let ws = workspace(&["https://alkoteka.com/catalog/vodka"]);

    mount_city(&server, 200).await;
    mount_listing(
        &server,
        "vodka",
        1,
        listing(json!([{"slug": "v1"}, {"slug": "v2"}, {"slug": "v3"}, {"slug": "v4"}])),
    )
    .await;
    for slug in ["v1", "v2", "v3", "v4"] {
        mount_detail(&server, slug, detail(slug)).await;
    }

    let config = create_test_config(&server.uri(), &ws.seeds, &ws.items);
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Crawl failed");

    assert_eq!(stats.listing_pages_fetched, 1);
    assert_eq!(stats.records_emitted, 4);
}

/// Sink whose disk is always full
#[derive(Default)]
struct FullDiskOutput {
    attempts: u64,
}

impl OutputHandler for FullDiskOutput {
    fn write_record(&mut self, _record: &ProductRecord) -> OutputResult<()> {
        self.attempts += 1;
        Err(OutputError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "no space left on device",
        )))
    }

    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }

    fn records_written(&self) -> u64 {
        0
    }
}

#[tokio::test]
async fn test_export_failure_stops_pipeline() {
    let server = MockServer::start().await;
    let ws = workspace(&[
        "https://alkoteka.com/catalog/vodka",
        "https://alkoteka.com/catalog/vino",
    ]);
    let slugs = ["p1", "p2", "p3", "p4", "p5", "p6", "p7", "p8"];

    mount_city(&server, 200).await;
    let entries: Vec<Value> = slugs.iter().map(|slug| json!({ "slug": slug })).collect();
    mount_listing(&server, "vodka", 1, listing(json!(entries))).await;
    mount_listing(&server, "vodka", 2, listing(json!(entries))).await;
    mount_listing(&server, "vino", 1, listing(json!(entries))).await;
    for slug in slugs {
        mount_detail(&server, slug, detail(slug)).await;
    }

    let mut config = create_test_config(&server.uri(), &ws.seeds, &ws.items);
    config.crawler.per_page = slugs.len() as u32;
    config.crawler.max_pages = 2;
    config.crawler.max_concurrent_requests = 1;
    config.crawler.download_delay = 150;

    let mut coordinator = Coordinator::with_output(config, Box::new(FullDiskOutput::default()))
        .expect("Failed to create coordinator");
    let result = coordinator.run().await;

    assert!(matches!(result, Err(CatalogError::Output(OutputError::Io(_)))));

    // The first record fails to export; nothing queued behind it is fetched
    let detail_requests: usize = {
        let mut total = 0;
        for slug in slugs {
            total += requests_to(&server, &format!("/web-api/v1/product/{}", slug)).await;
        }
        total
    };
    assert!(
        detail_requests <= 2,
        "{} detail requests after the export failed",
        detail_requests
    );
}
