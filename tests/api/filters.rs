use crate::helpers::spawn_app;
use crate::helpers::TestApp;

async fn seed_three(app: &TestApp) -> Vec<i64> {
    let mut ids = Vec::new();
    for payload in [
        serde_json::json!({
            "title": "flask route",
            "code": "@app.route('/')",
            "language": "python",
            "tags": ["flask", "web"],
        }),
        serde_json::json!({
            "title": "list comprehension",
            "code": "[x for x in y]",
            "language": "python",
            "tags": ["beginner"],
        }),
        serde_json::json!({
            "title": "actix route",
            "code": "web::get().to(hello)",
            "language": "rust",
            "tags": ["web"],
        }),
    ] {
        let resp = app.post_snippet(&payload, Some(&app.api_key.token)).await;
        assert_eq!(resp.status().as_u16(), 201);
        let body: serde_json::Value = resp.json().await.unwrap();
        ids.push(body["id"].as_i64().unwrap());
    }
    ids
}

fn listed_ids(body: &serde_json::Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn list_is_newest_first() {
    let app = spawn_app().await;
    let ids = seed_three(&app).await;

    let body: serde_json::Value = app.get("/api/snippets").await.json().await.unwrap();
    let listed = listed_ids(&body);
    let expected: Vec<i64> = ids.into_iter().rev().collect();
    assert_eq!(listed, expected);
}

#[tokio::test]
async fn language_filter_is_case_insensitive() {
    let app = spawn_app().await;
    let ids = seed_three(&app).await;

    for query in ["python", "Python", "PYTHON"] {
        let body: serde_json::Value = app
            .get(&format!("/api/snippets?language={query}"))
            .await
            .json()
            .await
            .unwrap();
        assert_eq!(listed_ids(&body), vec![ids[1], ids[0]], "{query}");
    }
}

#[tokio::test]
async fn tag_filter_matches_linked_snippets() {
    let app = spawn_app().await;
    let ids = seed_three(&app).await;

    let body: serde_json::Value = app
        .get("/api/snippets?tag=Web")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(listed_ids(&body), vec![ids[2], ids[0]]);
}

#[tokio::test]
async fn filters_combine_with_and() {
    let app = spawn_app().await;
    let ids = seed_three(&app).await;

    let body: serde_json::Value = app
        .get("/api/snippets?language=python&tag=web")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(listed_ids(&body), vec![ids[0]]);
}

#[tokio::test]
async fn unknown_filters_yield_empty_lists() {
    let app = spawn_app().await;
    seed_three(&app).await;

    for query in ["?language=cobol", "?tag=nonexistent"] {
        let body: serde_json::Value = app
            .get(&format!("/api/snippets{query}"))
            .await
            .json()
            .await
            .unwrap();
        assert_eq!(body.as_array().unwrap().len(), 0, "{query}");
    }
}

#[tokio::test]
async fn languages_are_distinct_and_sorted() {
    let app = spawn_app().await;
    seed_three(&app).await;

    let body: serde_json::Value = app.get("/api/languages").await.json().await.unwrap();
    assert_eq!(body, serde_json::json!(["python", "rust"]));
}

#[tokio::test]
async fn tags_come_with_snippet_counts() {
    let app = spawn_app().await;
    let ids = seed_three(&app).await;

    let body: serde_json::Value = app.get("/api/tags").await.json().await.unwrap();
    let counts: Vec<(String, i64)> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| {
            (
                t["name"].as_str().unwrap().to_string(),
                t["snippet_count"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        counts,
        vec![
            ("beginner".to_string(), 1),
            ("flask".to_string(), 1),
            ("web".to_string(), 2),
        ]
    );

    // deleting a snippet decrements counts but never deletes the tag itself
    app.delete_snippet(ids[2], Some(&app.api_key.token)).await;
    let body: serde_json::Value = app.get("/api/tags").await.json().await.unwrap();
    let web = body
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "web")
        .unwrap();
    assert_eq!(web["snippet_count"], 1);
}
