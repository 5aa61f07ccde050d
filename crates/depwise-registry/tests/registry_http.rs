//! Registry client behavior against a mock HTTP registry.

use depwise_registry::{RegistryClient, RegistryOptions, SearchOptions};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> RegistryClient {
    RegistryClient::new(RegistryOptions {
        registry_url: server.uri(),
        ..Default::default()
    })
    .unwrap()
}

fn react_document() -> serde_json::Value {
    json!({
        "name": "react",
        "description": "React is a JavaScript library for building user interfaces.",
        "dist-tags": { "latest": "18.2.0", "next": "19.0.0-rc.0" },
        "license": "MIT",
        "versions": {
            "17.0.2": { "version": "17.0.2" },
            "18.2.0": { "version": "18.2.0" },
            "18.10.0-canary": { "version": "18.10.0-canary" },
            "19.0.0-rc.0": { "version": "19.0.0-rc.0" }
        }
    })
}

#[tokio::test]
async fn test_get_package_caches_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/react"))
        .respond_with(ResponseTemplate::new(200).set_body_json(react_document()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.get_package("react").await.unwrap();
    let second = client.get_package("react").await.unwrap();

    assert_eq!(first.name, "react");
    assert_eq!(first, second);
    assert_eq!(client.get_latest_version("react").await.as_deref(), Some("18.2.0"));
}

#[tokio::test]
async fn test_not_found_and_bad_body_degrade_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.get_package("missing").await.is_none());
    assert!(client.get_package("broken").await.is_none());
    assert!(client.get_versions("missing").await.is_empty());
}

#[tokio::test]
async fn test_unreachable_registry_degrades_to_none() {
    let client = RegistryClient::new(RegistryOptions {
        registry_url: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_secs(2),
        ..Default::default()
    })
    .unwrap();

    assert!(client.get_package("react").await.is_none());
    assert!(client.search("react", &SearchOptions::default()).await.is_empty());
}

#[tokio::test]
async fn test_offline_mode_skips_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(react_document()))
        .expect(0)
        .mount(&server)
        .await;

    let client = RegistryClient::new(RegistryOptions {
        registry_url: server.uri(),
        offline: true,
        ..Default::default()
    })
    .unwrap();

    assert!(client.get_package("react").await.is_none());
    assert!(client.search("react", &SearchOptions::default()).await.is_empty());
}

#[tokio::test]
async fn test_offline_mode_still_serves_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/react"))
        .respond_with(ResponseTemplate::new(200).set_body_json(react_document()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.get_package("react").await.is_some());

    client.set_offline(true);
    assert!(client.get_package("react").await.is_some());

    client.clear_cache();
    assert!(client.get_package("react").await.is_none());
}

#[tokio::test]
async fn test_cache_entries_expire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/react"))
        .respond_with(ResponseTemplate::new(200).set_body_json(react_document()))
        .expect(2)
        .mount(&server)
        .await;

    let client = RegistryClient::new(RegistryOptions {
        registry_url: server.uri(),
        cache_ttl: Duration::from_millis(20),
        ..Default::default()
    })
    .unwrap();

    assert!(client.get_package("react").await.is_some());
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(client.get_package("react").await.is_some());
}

#[tokio::test]
async fn test_get_versions_sorted_descending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/react"))
        .respond_with(ResponseTemplate::new(200).set_body_json(react_document()))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(
        client.get_versions("react").await,
        vec!["19.0.0-rc.0", "18.10.0-canary", "18.2.0", "17.0.2"]
    );
}

#[tokio::test]
async fn test_search_maps_results_and_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/-/v1/search"))
        .and(query_param("text", "date"))
        .and(query_param("size", "5"))
        .and(query_param("from", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objects": [
                {
                    "package": {
                        "name": "date-fns",
                        "version": "3.6.0",
                        "description": "Modern JavaScript date utility library",
                        "keywords": ["date", "time"],
                        "author": { "name": "Sasha Koss" },
                        "links": { "npm": "https://www.npmjs.com/package/date-fns" }
                    }
                },
                { "package": { "name": "dayjs", "version": "1.11.10", "author": "iamkun" } }
            ],
            "total": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let options = SearchOptions {
        limit: 5,
        offset: 10,
    };
    let results = client.search("date", &options).await;
    let cached = client.search("date", &options).await;

    assert_eq!(results, cached);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].name, "date-fns");
    assert_eq!(results[0].author.as_deref(), Some("Sasha Koss"));
    assert_eq!(
        results[0].links.as_ref().and_then(|l| l.npm.as_deref()),
        Some("https://www.npmjs.com/package/date-fns")
    );
    assert_eq!(results[1].author.as_deref(), Some("iamkun"));
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_fetch_live_scoped_package() {
    let client = RegistryClient::new(RegistryOptions::default()).unwrap();
    let pkg = client.get_package("@types/node").await.unwrap();
    assert_eq!(pkg.name, "@types/node");
    assert!(pkg.latest_version().is_some());
}
