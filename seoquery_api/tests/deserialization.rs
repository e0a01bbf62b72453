use seoquery_api::types::{
    ApiResponse, BacklinkItem, DomainIntersectionItem, KeywordData, RankedKeywordItem,
    SearchIntent,
};

#[test]
fn deserialize_keyword_ideas_fixture() {
    let fixture = include_str!("fixtures/keyword_ideas.json");
    let resp: ApiResponse<KeywordData> = serde_json::from_str(fixture).unwrap();

    assert_eq!(resp.status_code, 20000);
    let result = &resp.tasks[0].result.as_ref().unwrap()[0];
    assert_eq!(result.total_count, 250);
    let items = result.items.as_ref().unwrap();
    assert_eq!(items[0].cpc(), Some(1.42));
    assert_eq!(items[0].keyword_difficulty(), Some(71));
    assert_eq!(items[0].main_intent(), Some(SearchIntent::Commercial));
    assert_eq!(
        items[0]
            .keyword_info
            .as_ref()
            .unwrap()
            .monthly_searches
            .as_ref()
            .unwrap()
            .len(),
        2
    );
    assert_eq!(items[1].cpc(), None);
    assert_eq!(items[1].main_intent(), None);
}

#[test]
fn deserialize_ranked_keywords_fixture() {
    let fixture = include_str!("fixtures/ranked_keywords.json");
    let resp: ApiResponse<RankedKeywordItem> = serde_json::from_str(fixture).unwrap();

    let items = resp.tasks[0].result.as_ref().unwrap()[0]
        .items
        .as_ref()
        .unwrap();
    let serp = &items[0].ranked_serp_element.serp_item;
    assert_eq!(serp.item_type.as_deref(), Some("organic"));
    assert_eq!(serp.url.as_deref(), Some("https://example.com/"));
    assert_eq!(
        items[0].keyword_data.main_intent(),
        Some(SearchIntent::Navigational)
    );
}

#[test]
fn deserialize_domain_intersection_fixture() {
    let fixture = include_str!("fixtures/domain_intersection.json");
    let resp: ApiResponse<DomainIntersectionItem> = serde_json::from_str(fixture).unwrap();

    let items = resp.tasks[0].result.as_ref().unwrap()[0]
        .items
        .as_ref()
        .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(
        items[1]
            .second_domain_serp_element
            .as_ref()
            .unwrap()
            .rank_group,
        Some(15)
    );
    assert_eq!(items[1].keyword_data.location_code, None);
}

#[test]
fn deserialize_backlinks_fixture() {
    let fixture = include_str!("fixtures/backlinks.json");
    let resp: ApiResponse<BacklinkItem> = serde_json::from_str(fixture).unwrap();

    let item = &resp.tasks[0].result.as_ref().unwrap()[0]
        .items
        .as_ref()
        .unwrap()[0];
    assert_eq!(item.domain_from, "blog.referrer.net");
    assert_eq!(item.anchor.as_deref(), Some("Example, \"the\" site"));
    assert_eq!(item.domain_from_rank, Some(388));
    assert!(!item.is_lost);
}

#[test]
fn deserialize_task_error_fixture() {
    let fixture = include_str!("fixtures/task_error.json");
    let resp: ApiResponse<KeywordData> = serde_json::from_str(fixture).unwrap();

    assert_eq!(resp.tasks_error, 1);
    assert_eq!(resp.tasks[0].status_code, 40501);
    assert!(resp.tasks[0].result.is_none());
}

#[test]
fn null_tasks_default_to_empty() {
    let resp: ApiResponse<KeywordData> = serde_json::from_str(
        r#"{"status_code":40100,"status_message":"You are not authorized.","tasks":null}"#,
    )
    .unwrap();
    assert_eq!(resp.status_code, 40100);
    assert!(resp.tasks.is_empty());
}

#[test]
fn missing_tasks_default_to_empty() {
    let resp: ApiResponse<KeywordData> = serde_json::from_str(
        r#"{"status_code":50000,"status_message":"Internal Error."}"#,
    )
    .unwrap();
    assert!(resp.tasks.is_empty());
}

#[test]
fn error_message_from_envelope_with_null_tasks() {
    let body = r#"{"status_code":40100,"status_message":"You are not authorized to access this resource.","tasks":null}"#;
    assert_eq!(
        seoquery_api::extract_error_message(body).as_deref(),
        Some("You are not authorized to access this resource.")
    );
}
