//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use async_trait::async_trait;
use recipe_harvester::config::{Config, CrawlerConfig};
use recipe_harvester::crawler::crawl;
use recipe_harvester::images::ImageDownloader;
use recipe_harvester::sites::{Classification, KwestiaSmaku, Site, SiteRegistry};
use recipe_harvester::storage::{open_storage, FrontierStore, StorageResult};
use recipe_harvester::{JobStatus, Recipe};
use reqwest::Client;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITE_ID: &str = "mock-recipes";

/// Serves kwestiasmaku.com-style pages from the mock server's host
struct MockRecipeSite;

#[async_trait]
impl Site for MockRecipeSite {
    fn name(&self) -> &str {
        SITE_ID
    }

    fn domain(&self) -> &str {
        "127.0.0.1"
    }

    async fn classify(&self, client: &Client, url: &str) -> Classification {
        KwestiaSmaku.classify(client, url).await
    }
}

fn registry() -> SiteRegistry {
    let mut sites = SiteRegistry::empty();
    sites.register(Arc::new(MockRecipeSite));
    sites
}

/// Creates a test configuration with short polling
fn create_test_config() -> Config {
    Config {
        crawler: CrawlerConfig {
            concurrency: 2,
            poll_interval_ms: 10,
            idle_threshold: 10,
            request_timeout_secs: 5,
        },
        ..Config::default()
    }
}

fn recipe_page(name: &str, image_url: &str) -> String {
    format!(
        r#"<html><body>
        <h1 class="page-header">{name}</h1>
        <div class="group-skladniki">
            <div class="field-name-field-ilosc-porcji">4 porcje</div>
            <div class="field-name-field-skladniki"><ul><li>1 jajko</li></ul></div>
        </div>
        <div class="group-przepis">
            <div class="field-name-field-przygotowanie"><ol><li>Ugotować.</li></ol></div>
        </div>
        <div class="view-content"><img src="{image_url}"></div>
        </body></html>"#
    )
}

async fn mount_html(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_seed_discovery_then_recipe() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_html(
        &server,
        "/",
        r##"<html><body>
            <a href="/r1">Recipe</a>
            <a href="https://other.test/c">Elsewhere</a>
            <a href="#frag">Top</a>
        </body></html>"##
            .to_string(),
    )
    .await;
    mount_html(
        &server,
        "/r1",
        recipe_page("Jajecznica", &format!("{}/img/r1.jpg", base_url)),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let db = dir.path().join("crawl.db");
    let seed = format!("{}/", base_url);

    let report = crawl(&create_test_config(), &registry(), &seed, &db)
        .await
        .expect("crawl failed");

    assert_eq!(report.documents_saved, 1);
    assert_eq!(report.pages_harvested, 1);
    assert_eq!(report.urls_discovered, 1);

    let store = open_storage(&db).unwrap();
    assert_eq!(store.count_jobs(SITE_ID).unwrap(), 2);
    assert_eq!(store.count_by_status(SITE_ID, JobStatus::Done).unwrap(), 2);
    assert_eq!(
        store.status_of(&format!("{}/r1", base_url)).unwrap(),
        Some(JobStatus::Done)
    );

    let documents: Vec<_> = store
        .all_documents(SITE_ID)
        .unwrap()
        .collect::<StorageResult<_>>()
        .unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].source_url, format!("{}/r1", base_url));

    let recipe: Recipe = documents[0].decode().unwrap();
    assert_eq!(recipe.name, "Jajecznica");
    assert_eq!(recipe.portions, 4);
    assert_eq!(recipe.steps, vec!["Ugotować."]);
}

#[tokio::test]
async fn test_interrupted_crawl_resumes() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_html(
        &server,
        "/",
        r#"<a href="/r1">1</a><a href="/r2">2</a>"#.to_string(),
    )
    .await;
    mount_html(&server, "/r1", recipe_page("Barszcz", "/img/1.png")).await;
    mount_html(&server, "/r2", recipe_page("Uszka", "/img/2.png")).await;

    let dir = TempDir::new().unwrap();
    let db = dir.path().join("crawl.db");
    let seed = format!("{}/", base_url);

    // A previous run discovered both recipes and died while fetching /r1
    {
        let mut store = open_storage(&db).unwrap();
        store.seed(SITE_ID, &seed).unwrap();
        store.claim(SITE_ID, 1).unwrap();
        store
            .record_discovery(
                SITE_ID,
                &seed,
                &[format!("{}/r1", base_url), format!("{}/r2", base_url)],
            )
            .unwrap();
        store.claim(SITE_ID, 1).unwrap();
        assert_eq!(
            store.count_by_status(SITE_ID, JobStatus::InProgress).unwrap(),
            1
        );
    }

    let report = crawl(&create_test_config(), &registry(), &seed, &db)
        .await
        .expect("crawl failed");

    assert_eq!(report.documents_saved, 2);
    assert_eq!(report.pages_harvested, 0);

    let store = open_storage(&db).unwrap();
    assert_eq!(store.count_by_status(SITE_ID, JobStatus::Done).unwrap(), 3);
    assert_eq!(store.count_documents(SITE_ID).unwrap(), 2);
}

#[tokio::test]
async fn test_missing_pages_are_harvested_not_fatal() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_html(
        &server,
        "/",
        r#"<a href="/gone">Gone</a><a href="/r1">R1</a>"#.to_string(),
    )
    .await;
    mount_html(&server, "/r1", recipe_page("Pierogi", "/img/p.jpg")).await;
    // Anything else is a 404

    let dir = TempDir::new().unwrap();
    let db = dir.path().join("crawl.db");

    let report = crawl(
        &create_test_config(),
        &registry(),
        &format!("{}/", base_url),
        &db,
    )
    .await
    .expect("crawl failed");

    assert_eq!(report.documents_saved, 1);
    assert_eq!(report.pages_harvested, 2);

    let store = open_storage(&db).unwrap();
    assert_eq!(
        store.status_of(&format!("{}/gone", base_url)).unwrap(),
        Some(JobStatus::Done)
    );
}

#[tokio::test]
async fn test_unknown_site_is_rejected_before_crawling() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("crawl.db");

    let result = crawl(
        &create_test_config(),
        &registry(),
        "https://unknown.test/",
        &db,
    )
    .await;

    assert!(result.is_err());
    assert!(!db.exists());
}

#[tokio::test]
async fn test_crawl_then_fetch_images() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_html(
        &server,
        "/",
        recipe_page("Sernik", &format!("{}/img/sernik.jpg", base_url)),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/img/sernik.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xffu8, 0xd8, 0xff]))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let db = dir.path().join("crawl.db");
    crawl(
        &create_test_config(),
        &registry(),
        &format!("{}/", base_url),
        &db,
    )
    .await
    .expect("crawl failed");

    let store = open_storage(&db).unwrap();
    let images = dir.path().join("images");
    let report = ImageDownloader::new(Client::new(), &images)
        .download_all(&store, &registry())
        .await
        .unwrap();

    assert_eq!(report.recipes, 1);
    assert_eq!(report.downloaded, 1);

    let document_dirs: Vec<_> = std::fs::read_dir(&images).unwrap().collect();
    assert_eq!(document_dirs.len(), 1);
}
