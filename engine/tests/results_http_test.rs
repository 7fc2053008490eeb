//! Results page against a remote document server

use eduguide_engine::pages::{PageController, PageQuery, ResultsPage, ResultsView};
use eduguide_engine::source::{HttpResultSource, ResultSource};
use sdk::errors::{AppError, AppErrorExt};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn document() -> serde_json::Value {
    json!({
        "user_profile": {
            "location": "Siem Reap",
            "max_budget": 1200,
            "core_field": "ធុរកិច្ច",
            "career_goal": "អ្នកគ្រប់គ្រង",
            "english_proficiency": 6
        },
        "recommendations": [
            {"university": {"id": 16, "name_en": "Build Bright University", "location": "Siem Reap"}, "total_score": 64.6},
            {"university": {"id": 35, "name_km": "សាកលវិទ្យាល័យអង្គរ"}, "total_score": 130.0}
        ],
        "timestamp": "2026-03-01T10:00:00+00:00"
    })
}

#[tokio::test]
async fn test_fetch_renders_cards_in_received_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/result_abc123.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(document()))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpResultSource::new(format!("{}/data/", server.uri()));
    let mut page = ResultsPage::new(PageQuery::parse("id=abc123&bot=edu_bot"), "unused");
    page.load_from_query(&source).await.unwrap();

    let ResultsView::Ready(loaded) = page.view() else {
        panic!("expected a loaded document");
    };
    assert!(loaded.result_id.is_none());

    let html = page.render();
    let first = html.find("Build Bright University").unwrap();
    let second = html.find("សាកលវិទ្យាល័យអង្គរ").unwrap();
    assert!(first < second);
    assert!(html.contains(r#"<div class="percentage">65%</div>"#));
    assert!(html.contains(r#"<div class="percentage">100%</div>"#));
    assert!(html.contains("$1200 / year"));
}

#[tokio::test]
async fn test_missing_document_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = HttpResultSource::new(server.uri());
    let result = source.fetch("gone").await;
    assert!(matches!(result, Err(AppError::ResultNotFound(id)) if id == "gone"));
}

#[tokio::test]
async fn test_malformed_document_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let source = HttpResultSource::new(server.uri());
    assert!(matches!(
        source.fetch("abc").await,
        Err(AppError::ResultNotFound(_))
    ));
}

#[tokio::test]
async fn test_empty_document_shows_placeholders() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"recommendations": null})))
        .mount(&server)
        .await;

    let source = HttpResultSource::new(server.uri());
    let mut page = ResultsPage::new(PageQuery::parse("id=empty"), "edu_bot");
    page.load_from_query(&source).await.unwrap();

    let html = page.render();
    assert!(html.contains("Profile information not available."));
    assert!(html.contains("No recommendations found based on your profile."));
}

#[tokio::test]
async fn test_partial_profile_still_shows_recommendations() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_profile": {"location": "Phnom Penh", "max_budget": 1000},
            "recommendations": [
                {"university": {"id": 10, "name_en": "Institute of Technology of Cambodia"}, "total_score": 70}
            ]
        })))
        .mount(&server)
        .await;

    let source = HttpResultSource::new(server.uri());
    let mut page = ResultsPage::new(PageQuery::parse("id=old_doc"), "edu_bot");
    page.load_from_query(&source).await.unwrap();

    let html = page.render();
    assert!(html.contains("Institute of Technology of Cambodia"));
    assert!(html.contains(r#"<div class="percentage">70%</div>"#));
    assert!(html.contains("$1000 / year"));
    assert!(html.contains(r#"<span class="label">Field of Study:</span><span>N/A</span>"#));
    assert!(html.contains(r#"<span class="label">English Proficiency:</span><span>N/A</span>"#));
}

#[tokio::test]
async fn test_unreachable_server_renders_like_not_found() {
    // Bind and drop a listener so the port refuses connections
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let source = HttpResultSource::new(uri);
    let mut page = ResultsPage::new(PageQuery::parse("id=abc"), "edu_bot");
    let error = page.load_from_query(&source).await.unwrap_err();
    assert!(matches!(error, AppError::Network(_)));

    let not_found = AppError::ResultNotFound("abc".to_string());
    assert_eq!(
        page.view(),
        &ResultsView::Failed(not_found.user_hint().to_string())
    );
    assert!(page.render().contains("https://t.me/edu_bot"));
}

#[tokio::test]
async fn test_invalid_id_never_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(document()))
        .expect(0)
        .mount(&server)
        .await;

    let source = HttpResultSource::new(server.uri());
    assert!(matches!(
        source.fetch("../secret").await,
        Err(AppError::ResultNotFound(_))
    ));
}
