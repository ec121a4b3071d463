//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use serde_json::{json, Value};
use std::time::Duration;
use trulia_scraper::config::{Config, ListingKind};
use trulia_scraper::crawler::{crawl, Coordinator};
use trulia_scraper::output::MemorySink;
use trulia_scraper::{ListingRecord, PaginationParseError, ScrapeError};
use wiremock::matchers::{body_partial_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing every site URL at the mock server
fn create_test_config(server: &MockServer, kind: ListingKind) -> Config {
    let base_url = server.uri();
    let mut config = Config::default();

    config.crawler.listing_kind = kind;
    config.crawler.max_concurrent_requests = 4;
    config.crawler.download_delay_ms = 0; // No spacing needed against a local server
    config.http.max_retries = 0;
    config.http.retry_delay_ms = 0;
    config.http.timeout_secs = 5;
    config.site.detail_link_pattern = format!("^{}/p/", regex::escape(&base_url));
    config.site.agent_endpoint = format!("{}/graphql", base_url);
    config.site.base_url = base_url;

    config
}

fn index_page(caption: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<li><a href="{}">Home</a></li>"#, link))
        .collect();
    format!(
        r#"<html><body>
        <ul>{}</ul>
        <a href="/about">About</a>
        <div data-testid="pagination-caption">{}</div>
        </body></html>"#,
        anchors, caption
    )
}

fn detail_page(payload: &Value, extra: &str) -> String {
    format!(
        r#"<html><head>
        <script id="__NEXT_DATA__" type="application/json">{}</script>
        </head><body>{}</body></html>"#,
        payload, extra
    )
}

fn for_sale_payload(street: &str, token: &str) -> Value {
    json!({
        "props": {
            "authHeaders": { "x-csrf-token": token },
            "homeDetails": {
                "location": {
                    "streetAddress": street,
                    "city": "Oakland",
                    "stateCode": "CA",
                    "neighborhoodName": "Rockridge",
                    "coordinates": { "latitude": 37.84, "longitude": -122.25 }
                },
                "price": { "price": 1100000 },
                "description": { "value": "Craftsman bungalow." },
                "floorSpace": { "formattedDimension": "1,640 sqft" },
                "bedrooms": { "formattedValue": "3 Beds" },
                "bathrooms": { "formattedValue": "2 Baths" },
                "taxes": null,
                "features": {
                    "attributes": [
                        { "formattedName": "Lot Size", "formattedValue": "4,000 sqft" },
                        { "formattedValue": "$671/sqft" },
                        { "formattedValue": "Built in 1924" }
                    ]
                },
                "priceHistory": [
                    { "formattedDate": "06/01/2023", "event": "Listed For Sale",
                      "price": { "formattedPrice": "$1,100,000" } },
                    { "formattedDate": "05/01/2019", "event": "Sold",
                      "price": { "formattedPrice": "$850,000" } }
                ]
            }
        }
    })
}

fn sold_payload(street: &str) -> Value {
    json!({
        "props": {
            "authHeaders": { "x-csrf-token": "sold-token" },
            "homeDetails": {
                "location": { "streetAddress": street, "city": "Oakland", "stateCode": "CA" },
                "price": { "price": 975000 },
                "taxes": {
                    "highlightedAssessments": {
                        "year": 2022,
                        "taxValue": { "formattedPrice": "$11,870" },
                        "totalAssessment": { "formattedPrice": "$910,000" },
                        "assessments": [
                            { "type": "Land", "amount": { "formattedPrice": "$500,000" } },
                            { "type": "Improvements", "amount": { "formattedPrice": "$410,000" } }
                        ]
                    }
                }
            }
        }
    })
}

fn agent_response(broker: bool) -> Value {
    let mut provider = json!({
        "agent": { "name": "Dana Reyes", "phone": "(510) 555-0134" }
    });
    if broker {
        provider["broker"] = json!({ "name": "Bayside Realty", "phone": "(510) 555-0100" });
    }
    json!({ "data": { "homeDetailsByUrl": { "url": "/p/ca/oakland/1", "provider": provider } } })
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

async fn mount_index(server: &MockServer, route: &str, caption: &str, links: &[&str]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(index_page(caption, links)))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn run_crawl(config: Config, state: &str, city: &str) -> (MemorySink, trulia_scraper::output::CrawlStats) {
    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let mut sink = MemorySink::new();
    let stats = coordinator
        .run(state, city, &mut sink)
        .await
        .expect("Crawl failed");
    (sink, stats)
}

fn sorted_records(sink: MemorySink) -> Vec<ListingRecord> {
    let mut records = sink.into_records();
    records.sort_by(|a, b| a.url.cmp(&b.url));
    records
}

#[tokio::test]
async fn test_every_index_page_is_fetched_once() {
    let server = MockServer::start().await;

    mount_index(&server, "/CA/Oakland/", "Showing 1-30 of 97 homes", &[]).await;
    for n in 1..=4 {
        let own = format!("/p/ca/oakland/{}", n);
        mount_index(
            &server,
            &format!("/CA/Oakland/{}_p/", n),
            "Showing 1-30 of 97 homes",
            &[own.as_str(), "/p/ca/oakland/shared"],
        )
        .await;
    }

    // A link listed on several index pages is processed once
    mount_detail(
        &server,
        "/p/ca/oakland/shared",
        detail_page(&for_sale_payload("5 Shared Way", "tok-s"), ""),
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/p/ca/oakland/\d+$"))
        .respond_with(html(detail_page(&for_sale_payload("1 Main St", "tok-n"), "")))
        .expect(4)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(agent_response(true)))
        .expect(5)
        .mount(&server)
        .await;

    let config = create_test_config(&server, ListingKind::ForSale);
    let (sink, stats) = run_crawl(config, "CA", "Oakland").await;

    assert_eq!(stats.total_results, 97);
    assert_eq!(stats.index_pages, 4);
    assert_eq!(stats.index_pages_fetched, 4);
    assert_eq!(stats.index_pages_failed, 0);
    assert_eq!(stats.detail_links_discovered, 5);
    assert_eq!(stats.records_emitted, 5);
    assert_eq!(stats.agent_lookups_ok, 5);
    assert_eq!(sink.len(), 5);

    let records = sorted_records(sink);
    let urls: Vec<String> = records.iter().map(|r| r.url.clone()).collect();
    let base = server.uri();
    assert_eq!(
        urls,
        vec![
            format!("{}/p/ca/oakland/1", base),
            format!("{}/p/ca/oakland/2", base),
            format!("{}/p/ca/oakland/3", base),
            format!("{}/p/ca/oakland/4", base),
            format!("{}/p/ca/oakland/shared", base),
        ]
    );
}

#[tokio::test]
async fn test_for_sale_listing_gets_agent_fields() {
    let server = MockServer::start().await;
    let detail_url = format!("{}/p/ca/oakland/1", server.uri());

    mount_index(&server, "/CA/Oakland/", "Showing 1-1 of 1 homes", &[]).await;
    mount_index(&server, "/CA/Oakland/1_p/", "Showing 1-1 of 1 homes", &["/p/ca/oakland/1"]).await;
    mount_detail(
        &server,
        "/p/ca/oakland/1",
        detail_page(
            &for_sale_payload("1 Main St", "tok-1"),
            "<div>MLS/Source ID: 40912345</div>",
        ),
    )
    .await;

    // The slow agent response must still be merged before the record leaves
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("x-csrf-token", "tok-1"))
        .and(body_partial_json(json!({
            "operationName": "GetAgentContact",
            "variables": { "url": detail_url }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(agent_response(true))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, ListingKind::ForSale);
    let (sink, stats) = run_crawl(config, "CA", "Oakland").await;

    assert_eq!(stats.records_emitted, 1);
    assert_eq!(stats.agent_lookups_ok, 1);

    let record = &sink.records()[0];
    assert_eq!(record.url, detail_url);
    assert_eq!(record.address, "1 Main St");
    assert_eq!(record.city, "Oakland");
    assert_eq!(record.neighborhood, "Rockridge");
    assert_eq!(record.mls, "40912345");
    assert_eq!(record.price, "1100000");
    assert_eq!(record.area, "1640 sqft");
    assert_eq!(record.lot_size, "4,000 sqft");
    assert_eq!(record.price_per_square_foot, "$671");
    assert_eq!(record.year_built, "1924");
    assert_eq!(record.property_tax, "");

    assert_eq!(record.price_history.len(), 2);
    assert_eq!(record.price_history[0].event, "Sold");
    assert_eq!(record.price_history[1].event, "Listed For Sale");

    assert_eq!(record.agent_name, "Dana Reyes");
    assert_eq!(record.agent_phone_num, "(510) 555-0134");
    assert_eq!(record.listing_agency, "Bayside Realty");
    assert_eq!(record.listing_agency_phone, "(510) 555-0100");
}

#[tokio::test]
async fn test_agent_response_without_broker() {
    let server = MockServer::start().await;

    mount_index(&server, "/CA/Oakland/", "Showing 1-1 of 1 homes", &[]).await;
    mount_index(&server, "/CA/Oakland/1_p/", "Showing 1-1 of 1 homes", &["/p/ca/oakland/1"]).await;
    mount_detail(
        &server,
        "/p/ca/oakland/1",
        detail_page(&for_sale_payload("1 Main St", "tok-1"), ""),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(agent_response(false)))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, ListingKind::ForSale);
    let (sink, _stats) = run_crawl(config, "CA", "Oakland").await;

    let record = &sink.records()[0];
    assert_eq!(record.agent_name, "Dana Reyes");
    assert_eq!(record.agent_phone_num, "(510) 555-0134");
    assert_eq!(record.listing_agency, "");
    assert_eq!(record.listing_agency_phone, "");
}

#[tokio::test]
async fn test_failed_agent_lookup_still_emits_record() {
    let server = MockServer::start().await;

    mount_index(&server, "/CA/Oakland/", "Showing 1-2 of 2 homes", &[]).await;
    mount_index(
        &server,
        "/CA/Oakland/1_p/",
        "Showing 1-2 of 2 homes",
        &["/p/ca/oakland/1", "/p/ca/oakland/2"],
    )
    .await;
    mount_detail(
        &server,
        "/p/ca/oakland/1",
        detail_page(&for_sale_payload("1 Main St", "tok-1"), ""),
    )
    .await;
    mount_detail(
        &server,
        "/p/ca/oakland/2",
        detail_page(&for_sale_payload("2 Oak Ave", "tok-2"), ""),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("x-csrf-token", "tok-1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("x-csrf-token", "tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, ListingKind::ForSale);
    let (sink, stats) = run_crawl(config, "CA", "Oakland").await;

    assert_eq!(stats.records_emitted, 2);
    assert_eq!(stats.agent_lookups_failed, 2);
    assert_eq!(stats.listings_dropped, 0);

    for record in sink.records() {
        assert!(!record.address.is_empty());
        assert_eq!(record.agent_name, "");
        assert_eq!(record.agent_phone_num, "");
        assert_eq!(record.listing_agency, "");
        assert_eq!(record.listing_agency_phone, "");
    }
}

#[tokio::test]
async fn test_sold_crawl_skips_agent_lookup() {
    let server = MockServer::start().await;

    mount_index(&server, "/sold/Oakland,CA/", "Showing 1-1 of 1 homes", &[]).await;
    mount_index(
        &server,
        "/sold/Oakland,CA/1_p/",
        "Showing 1-1 of 1 homes",
        &["/p/ca/oakland/9"],
    )
    .await;
    mount_detail(&server, "/p/ca/oakland/9", detail_page(&sold_payload("9 Elm St"), "")).await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(agent_response(true)))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, ListingKind::Sold);
    let (sink, stats) = run_crawl(config, "CA", "Oakland").await;

    assert_eq!(stats.records_emitted, 1);
    assert_eq!(stats.agent_lookups_skipped, 1);

    let record = &sink.records()[0];
    assert_eq!(record.address, "9 Elm St");
    assert_eq!(record.property_tax, "$11,870");
    assert_eq!(record.property_tax_assessment_year, "2022");
    assert_eq!(record.property_tax_assessment_land, "$500,000");
    assert_eq!(record.property_tax_assessment_improvements, "$410,000");
    assert_eq!(record.property_tax_assessment_total, "$910,000");
    assert_eq!(record.agent_name, "");
    assert!(record.price_history.is_empty());
}

#[tokio::test]
async fn test_missing_caption_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/CA/Oakland/"))
        .respond_with(html("<html><body>No homes found</body></html>".to_string()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"_p/$"))
        .respond_with(html(index_page("", &[])))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, ListingKind::ForSale);
    let coordinator = Coordinator::new(config).unwrap();
    let mut sink = MemorySink::new();

    let result = coordinator.run("CA", "Oakland", &mut sink).await;
    assert!(matches!(
        result,
        Err(ScrapeError::Pagination(PaginationParseError::MissingCaption))
    ));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_zero_results_crawl_is_empty() {
    let server = MockServer::start().await;

    mount_index(&server, "/CA/Oakland/", "0 results", &[]).await;

    let config = create_test_config(&server, ListingKind::ForSale);
    let (sink, stats) = run_crawl(config, "CA", "Oakland").await;

    assert_eq!(stats.index_pages, 0);
    assert_eq!(stats.records_emitted, 0);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_listing_without_payload_is_dropped() {
    let server = MockServer::start().await;

    mount_index(&server, "/CA/Oakland/", "Showing 1-3 of 3 homes", &[]).await;
    mount_index(
        &server,
        "/CA/Oakland/1_p/",
        "Showing 1-3 of 3 homes",
        &["/p/ca/oakland/1", "/p/ca/oakland/2", "/p/ca/oakland/3"],
    )
    .await;
    mount_detail(
        &server,
        "/p/ca/oakland/1",
        detail_page(&for_sale_payload("1 Main St", ""), ""),
    )
    .await;
    mount_detail(
        &server,
        "/p/ca/oakland/2",
        "<html><body>Access denied</body></html>".to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/p/ca/oakland/3"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, ListingKind::ForSale);
    let (sink, stats) = run_crawl(config, "CA", "Oakland").await;

    assert_eq!(stats.detail_links_discovered, 3);
    assert_eq!(stats.listings_dropped, 2);
    assert_eq!(stats.records_emitted, 1);
    // An empty token means there is no agent stage for the listing
    assert_eq!(stats.agent_lookups_skipped, 1);
    assert_eq!(sink.records()[0].address, "1 Main St");
}

#[tokio::test]
async fn test_failed_index_page_does_not_stop_crawl() {
    let server = MockServer::start().await;

    mount_index(&server, "/CA/Oakland/", "Showing 1-30 of 45 homes", &[]).await;
    mount_index(&server, "/CA/Oakland/1_p/", "Showing 1-30 of 45 homes", &["/p/ca/oakland/1"]).await;
    Mock::given(method("GET"))
        .and(path("/CA/Oakland/2_p/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    mount_detail(
        &server,
        "/p/ca/oakland/1",
        detail_page(&for_sale_payload("1 Main St", ""), ""),
    )
    .await;

    let config = create_test_config(&server, ListingKind::ForSale);
    let (sink, stats) = run_crawl(config, "CA", "Oakland").await;

    assert_eq!(stats.index_pages, 2);
    assert_eq!(stats.index_pages_fetched, 1);
    assert_eq!(stats.index_pages_failed, 1);
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn test_malformed_price_history_keeps_record() {
    let server = MockServer::start().await;

    let mut payload = for_sale_payload("1 Main St", "");
    payload["props"]["homeDetails"]["priceHistory"][0]["formattedDate"] = json!("sometime in June");

    mount_index(&server, "/CA/Oakland/", "Showing 1-1 of 1 homes", &[]).await;
    mount_index(&server, "/CA/Oakland/1_p/", "Showing 1-1 of 1 homes", &["/p/ca/oakland/1"]).await;
    mount_detail(&server, "/p/ca/oakland/1", detail_page(&payload, "")).await;

    let config = create_test_config(&server, ListingKind::ForSale);
    let (sink, stats) = run_crawl(config, "CA", "Oakland").await;

    assert_eq!(stats.records_emitted, 1);
    assert_eq!(stats.history_parse_failures, 1);

    let record = &sink.records()[0];
    assert_eq!(record.address, "1 Main St");
    assert_eq!(record.year_built, "1924");
    assert!(record.price_history.is_empty());
}

#[tokio::test]
async fn test_max_listings_caps_spawned_listings() {
    let server = MockServer::start().await;

    mount_index(&server, "/CA/Oakland/", "Showing 1-3 of 3 homes", &[]).await;
    mount_index(
        &server,
        "/CA/Oakland/1_p/",
        "Showing 1-3 of 3 homes",
        &["/p/ca/oakland/1", "/p/ca/oakland/2", "/p/ca/oakland/3"],
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/p/ca/oakland/\d+$"))
        .respond_with(html(detail_page(&for_sale_payload("1 Main St", ""), "")))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, ListingKind::ForSale);
    config.crawler.max_listings = 2;
    let (sink, stats) = run_crawl(config, "CA", "Oakland").await;

    assert_eq!(stats.detail_links_discovered, 2);
    assert_eq!(sink.len(), 2);
}

#[tokio::test]
async fn test_crawl_writes_csv() {
    let server = MockServer::start().await;

    mount_index(&server, "/CA/Oakland/", "Showing 1-1 of 1 homes", &[]).await;
    mount_index(&server, "/CA/Oakland/1_p/", "Showing 1-1 of 1 homes", &["/p/ca/oakland/1"]).await;
    mount_detail(
        &server,
        "/p/ca/oakland/1",
        detail_page(&for_sale_payload("1 Main St", ""), ""),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out").join("oakland.csv");

    let mut config = create_test_config(&server, ListingKind::ForSale);
    config.output.fields = vec!["address".to_string(), "city".to_string(), "agent_name".to_string()];

    let stats = crawl(config, "CA", "Oakland", &output).await.unwrap();
    assert_eq!(stats.records_emitted, 1);

    let contents = std::fs::read_to_string(&output).unwrap();
    assert_eq!(contents, "address,city,agent_name\n1 Main St,Oakland,\n");
}

#[tokio::test]
async fn test_failed_crawl_removes_output_file() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/CA/Oakland/"))
        .respond_with(html("<html><body>No homes found</body></html>".to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("data").join("oakland.csv");

    let config = create_test_config(&server, ListingKind::ForSale);
    let result = crawl(config, "CA", "Oakland", &output).await;

    assert!(matches!(
        result,
        Err(ScrapeError::Pagination(PaginationParseError::MissingCaption))
    ));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_transient_page_errors_are_retried() {
    let server = MockServer::start().await;

    mount_index(&server, "/CA/Oakland/", "Showing 1-1 of 1 homes", &[]).await;

    // Mounted first so they answer the first request only
    Mock::given(method("GET"))
        .and(path("/CA/Oakland/1_p/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/ca/oakland/1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    mount_index(&server, "/CA/Oakland/1_p/", "Showing 1-1 of 1 homes", &["/p/ca/oakland/1"]).await;
    mount_detail(
        &server,
        "/p/ca/oakland/1",
        detail_page(&for_sale_payload("1 Main St", ""), ""),
    )
    .await;

    let mut config = create_test_config(&server, ListingKind::ForSale);
    config.http.max_retries = 1;
    let (sink, stats) = run_crawl(config, "CA", "Oakland").await;

    assert_eq!(stats.index_pages_fetched, 1);
    assert_eq!(stats.index_pages_failed, 0);
    assert_eq!(stats.listings_dropped, 0);
    assert_eq!(stats.records_emitted, 1);
    assert_eq!(sink.records()[0].address, "1 Main St");
}

#[tokio::test]
async fn test_agent_lookup_retry_resends_body() {
    let server = MockServer::start().await;
    let detail_url = format!("{}/p/ca/oakland/1", server.uri());
    let expected_body = json!({
        "operationName": "GetAgentContact",
        "variables": { "url": detail_url }
    });

    mount_index(&server, "/CA/Oakland/", "Showing 1-1 of 1 homes", &[]).await;
    mount_index(&server, "/CA/Oakland/1_p/", "Showing 1-1 of 1 homes", &["/p/ca/oakland/1"]).await;
    mount_detail(
        &server,
        "/p/ca/oakland/1",
        detail_page(&for_sale_payload("1 Main St", "tok-1"), ""),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("x-csrf-token", "tok-1"))
        .and(body_partial_json(expected_body.clone()))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    // The retried request must carry the same token and body
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("x-csrf-token", "tok-1"))
        .and(body_partial_json(expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(agent_response(true)))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, ListingKind::ForSale);
    config.http.max_retries = 1;
    let (sink, stats) = run_crawl(config, "CA", "Oakland").await;

    assert_eq!(stats.agent_lookups_ok, 1);
    assert_eq!(stats.agent_lookups_failed, 0);

    let record = &sink.records()[0];
    assert_eq!(record.agent_name, "Dana Reyes");
    assert_eq!(record.agent_phone_num, "(510) 555-0134");
    assert_eq!(record.listing_agency, "Bayside Realty");
    assert_eq!(record.listing_agency_phone, "(510) 555-0100");
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;

    mount_index(&server, "/CA/Oakland/", "Showing 1-1 of 1 homes", &[]).await;
    mount_index(&server, "/CA/Oakland/1_p/", "Showing 1-1 of 1 homes", &["/p/ca/oakland/1"]).await;
    Mock::given(method("GET"))
        .and(path("/p/ca/oakland/1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, ListingKind::ForSale);
    config.http.max_retries = 3;
    let (sink, stats) = run_crawl(config, "CA", "Oakland").await;

    assert_eq!(stats.listings_dropped, 1);
    assert_eq!(stats.records_emitted, 0);
    assert!(sink.is_empty());
}
