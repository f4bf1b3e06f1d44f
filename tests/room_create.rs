mod support;

async fn create_room(client: &reqwest::Client, base_url: &str, room_id: &str) -> reqwest::Response {
    client
        .post(format!("{base_url}/rooms"))
        .json(&serde_json::json!({ "room_id": room_id }))
        .send()
        .await
        .expect("request should succeed")
}

#[tokio::test]
async fn when_room_is_created_then_its_id_is_echoed() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();
    let room_id = format!("test-{}", uuid::Uuid::new_v4());

    let res = create_room(&client, base_url, &room_id).await;
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.expect("json body");
    assert_eq!(body["room_id"], room_id.as_str());
}

#[tokio::test]
async fn when_room_id_is_taken_then_create_conflicts() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();
    let room_id = format!("dup-{}", uuid::Uuid::new_v4());

    let first = create_room(&client, base_url, &room_id).await;
    assert_eq!(first.status(), reqwest::StatusCode::CREATED);

    let second = create_room(&client, base_url, &room_id).await;
    assert_eq!(second.status(), reqwest::StatusCode::CONFLICT);
    let body: serde_json::Value = second.json().await.expect("json body");
    assert_eq!(body["error"], "room already exists");
}

#[tokio::test]
async fn when_room_id_is_blank_then_create_is_rejected() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();

    let res = create_room(&client, base_url, "   ").await;
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn when_room_is_deleted_then_a_second_delete_is_not_found() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();
    let room_id = format!("gone-{}", uuid::Uuid::new_v4());

    let created = create_room(&client, base_url, &room_id).await;
    assert_eq!(created.status(), reqwest::StatusCode::CREATED);

    let deleted = client
        .delete(format!("{base_url}/rooms/{room_id}"))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(deleted.status(), reqwest::StatusCode::NO_CONTENT);

    let again = client
        .delete(format!("{base_url}/rooms/{room_id}"))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(again.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn when_default_room_is_deleted_then_it_conflicts() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();

    let res = client
        .delete(format!("{base_url}/rooms/main"))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(res.status(), reqwest::StatusCode::CONFLICT);
}
