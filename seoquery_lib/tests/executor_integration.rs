use std::sync::Arc;

use seoquery_lib::seoquery_api::{Client, Credentials};
use seoquery_lib::types::SearchIntent;
use seoquery_lib::{
    BacklinkMode, Connective, FilterSession, FilterState, Locale, OrderBy, PatternClause,
    QueryExecutor, Range, RequestGeneration, ResultsView, SeoQueryError, SortDirection,
};
use serde_json::json;
use wiremock::matchers::{basic_auth, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("../seoquery_api/tests/fixtures/{}", name)).unwrap()
}

fn executor(server: &MockServer) -> QueryExecutor {
    let client =
        Client::with_base_url(&server.uri(), Credentials::new("login", "secret")).unwrap();
    QueryExecutor::new(client, Locale::default())
}

async fn mount(server: &MockServer, endpoint: &str, fixture: &str) {
    Mock::given(method("POST"))
        .and(path(endpoint))
        .and(basic_auth("login", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture(fixture)))
        .mount(server)
        .await;
}

async fn sent_task(server: &MockServer) -> serde_json::Value {
    let requests = server.received_requests().await.unwrap();
    let last = requests.last().expect("a request was sent");
    let body: serde_json::Value = serde_json::from_slice(&last.body).unwrap();
    assert_eq!(body.as_array().map(|a| a.len()), Some(1));
    body[0].clone()
}

#[tokio::test]
async fn empty_state_sends_no_filters_key() {
    let server = MockServer::start().await;
    mount(&server, "/v3/dataforseo_labs/google/keyword_ideas/live", "keyword_ideas.json").await;

    let mut session = FilterSession::default();
    let request = session.apply().unwrap();
    let fetched = executor(&server)
        .keyword_ideas(&["Running Shoes".to_string()], &request)
        .await
        .unwrap();

    assert_eq!(fetched.rows.len(), 2);
    assert_eq!(fetched.total_count, 250);

    let task = sent_task(&server).await;
    assert!(task.get("filters").is_none());
    assert_eq!(task["keywords"], json!(["running shoes"]));
    assert_eq!(task["location_code"], 2840);
    assert_eq!(task["language_code"], "en");
    assert_eq!(task["order_by"], json!(["keyword_info.search_volume,desc"]));
    assert_eq!(task["offset"], 0);
    assert_eq!(task["limit"], 100);
}

#[tokio::test]
async fn third_page_of_250_uses_offset_200() {
    let server = MockServer::start().await;
    mount(&server, "/v3/dataforseo_labs/google/keyword_ideas/live", "keyword_ideas.json").await;

    let mut session = FilterSession::default();
    let request = session.set_page(3);
    let fetched = executor(&server)
        .keyword_ideas(&["running shoes".to_string()], &request)
        .await
        .unwrap();

    let task = sent_task(&server).await;
    assert_eq!(task["offset"], 200);

    let pagination = fetched.pagination();
    assert_eq!(pagination.total_pages(), 3);
    assert_eq!(pagination.offset(), 200);
    assert!(!pagination.has_next());
}

#[tokio::test]
async fn volume_range_and_intent_compile_flat() {
    let server = MockServer::start().await;
    mount(&server, "/v3/dataforseo_labs/google/keyword_ideas/live", "keyword_ideas.json").await;

    let mut session = FilterSession::default();
    session.edit(|f| {
        f.volume = Range::new(Some(100), Some(500));
        f.intent = Some(SearchIntent::Commercial);
    });
    let request = session.apply().unwrap();
    executor(&server)
        .keyword_ideas(&["running shoes".to_string()], &request)
        .await
        .unwrap();

    let task = sent_task(&server).await;
    assert_eq!(
        task["filters"],
        json!([
            ["keyword_info.search_volume", ">=", 100],
            "and",
            ["keyword_info.search_volume", "<=", 500],
            "and",
            ["search_intent_info.main_intent", "=", "commercial"]
        ])
    );
}

#[tokio::test]
async fn ranked_keywords_normalizes_target_and_maps_rows() {
    let server = MockServer::start().await;
    mount(&server, "/v3/dataforseo_labs/google/ranked_keywords/live", "ranked_keywords.json").await;

    let mut session = FilterSession::default();
    session.edit(|f| {
        f.url_patterns = vec![
            PatternClause::contains("%/blog/%"),
            PatternClause::contains("%/news/%").joined_by(Connective::Or),
            PatternClause::excludes("%amp%"),
        ];
    });
    session.apply().unwrap();
    let request = session.set_sort(OrderBy::new("position", SortDirection::Asc));

    let fetched = executor(&server)
        .ranked_keywords("https://www.Example.com/", &request)
        .await
        .unwrap();
    assert_eq!(fetched.total_count, 1834);
    assert_eq!(fetched.rows[0].keyword, "example domain");
    assert_eq!(fetched.rows[0].position, Some(1));

    let task = sent_task(&server).await;
    assert_eq!(task["target"], "example.com");
    assert_eq!(task["order_by"], json!(["ranked_serp_element.serp_item.rank_group,asc"]));
    let url = "ranked_serp_element.serp_item.relative_url";
    assert_eq!(
        task["filters"],
        json!([
            [[url, "like", "%/blog/%"], "or", [url, "like", "%/news/%"]],
            "and",
            [url, "not_like", "%amp%"]
        ])
    );
}

#[tokio::test]
async fn keyword_gap_sends_both_targets() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/v3/dataforseo_labs/google/domain_intersection/live",
        "domain_intersection.json",
    )
    .await;

    let request = FilterSession::default().apply().unwrap();
    let fetched = executor(&server)
        .keyword_gap("competitor.com", "http://mysite.com/", false, &request)
        .await
        .unwrap();
    assert_eq!(fetched.rows.len(), 2);
    assert_eq!(fetched.rows[0].second_position, None);

    let task = sent_task(&server).await;
    assert_eq!(task["target1"], "competitor.com");
    assert_eq!(task["target2"], "mysite.com");
    assert_eq!(task["intersections"], false);
}

#[tokio::test]
async fn keyword_gap_rejects_same_domain_without_request() {
    let server = MockServer::start().await;
    let request = FilterSession::default().apply().unwrap();
    let err = executor(&server)
        .keyword_gap("example.com", "https://www.example.com", true, &request)
        .await
        .unwrap_err();
    assert!(matches!(err, SeoQueryError::InvalidInput(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn backlinks_without_locale() {
    let server = MockServer::start().await;
    mount(&server, "/v3/backlinks/backlinks/live", "backlinks.json").await;

    let mut session = FilterSession::default();
    session.edit(|f| {
        f.dofollow = Some(true);
        f.domain_rank = Range::new(Some(100), None);
    });
    let request = session.apply().unwrap();
    let fetched = executor(&server)
        .backlinks("example.com", BacklinkMode::OnePerDomain, &request)
        .await
        .unwrap();
    assert_eq!(fetched.total_count, 315);
    assert_eq!(fetched.rows[0].anchor.as_deref(), Some("Example, \"the\" site"));

    let task = sent_task(&server).await;
    assert!(task.get("location_code").is_none());
    assert_eq!(task["mode"], "one_per_domain");
    assert_eq!(
        task["filters"],
        json!([["domain_from_rank", ">=", 100], "and", ["dofollow", "=", true]])
    );
}

#[tokio::test]
async fn unsupported_filter_fails_before_request() {
    let server = MockServer::start().await;
    let mut session = FilterSession::default();
    session.edit(|f| f.volume = Range::new(Some(10), None));
    let request = session.apply().unwrap();

    let err = executor(&server)
        .backlinks("example.com", BacklinkMode::AsIs, &request)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("volume"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn too_many_clauses_fails_before_request() {
    let server = MockServer::start().await;
    let mut session = FilterSession::default();
    session.edit(|f| {
        f.keyword_patterns = (0..9).map(|i| PatternClause::contains(&format!("%k{}%", i))).collect();
    });
    let request = session.apply().unwrap();

    let err = executor(&server)
        .keyword_ideas(&["coffee".to_string()], &request)
        .await
        .unwrap_err();
    assert!(matches!(err, SeoQueryError::InvalidInput(_)));
    assert!(err.to_string().contains("at most 8"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn task_error_surfaces_task_message() {
    let server = MockServer::start().await;
    mount(&server, "/v3/dataforseo_labs/google/keyword_ideas/live", "task_error.json").await;

    let request = FilterSession::default().apply().unwrap();
    let err = executor(&server)
        .keyword_ideas(&["coffee".to_string()], &request)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid Field: 'filters'."));
}

#[tokio::test]
async fn http_error_surfaces_envelope_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status_code": 40100,
            "status_message": "You are not authorized to access this resource.",
            "tasks": []
        })))
        .mount(&server)
        .await;

    let request = FilterSession::default().apply().unwrap();
    let err = executor(&server)
        .ranked_keywords("example.com", &request)
        .await
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("You are not authorized to access this resource."));
}

#[tokio::test]
async fn http_error_with_null_tasks_surfaces_envelope_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"status_code":40100,"status_message":"You are not authorized to access this resource.","tasks":null}"#,
        ))
        .mount(&server)
        .await;

    let request = FilterSession::default().apply().unwrap();
    let err = executor(&server)
        .backlinks("example.com", BacklinkMode::AsIs, &request)
        .await
        .unwrap_err();
    assert!(matches!(err, SeoQueryError::Api(_)));
    assert!(err
        .to_string()
        .contains("You are not authorized to access this resource."));
}

#[tokio::test]
async fn stale_response_is_discarded() {
    let server = MockServer::start().await;
    mount(&server, "/v3/dataforseo_labs/google/keyword_ideas/live", "keyword_ideas.json").await;
    let exec = executor(&server);
    let generations = Arc::new(RequestGeneration::new());
    let mut session = FilterSession::new(Arc::clone(&generations));
    let mut view = ResultsView::new(Arc::clone(&generations));
    let seeds = vec!["running shoes".to_string()];

    let first = session.apply().unwrap();
    let second = session.set_page(2);

    let late = exec.keyword_ideas(&seeds, &first).await.unwrap();
    let fresh = exec.keyword_ideas(&seeds, &second).await.unwrap();

    assert!(view.accept(fresh));
    assert!(!view.accept(late));
    assert_eq!(view.generation(), second.generation);
    assert_eq!(view.pagination().page, 2);
}

#[tokio::test]
async fn inverted_range_is_rejected_at_apply() {
    let mut session = FilterSession::default();
    session.edit(|f| f.volume = Range::new(Some(500), Some(100)));
    assert!(session.apply().is_err());
    assert_eq!(session.active(), &FilterState::default());
}
