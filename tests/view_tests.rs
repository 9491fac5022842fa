use std::{sync::Arc, time::Duration};

use serde_json::json;
use techtalk_client::{
    config::Config,
    error::ErrorDisplay,
    models::post::Rating,
    services::{MemorySessionStore, ToggleOutcome},
    state::AppState,
    views::FollowListKind,
};
use wiremock::{
    matchers::{body_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn logged_in_app(server: &MockServer) -> AppState {
    let session = Arc::new(MemorySessionStore::with_tokens("acc", "ref"));
    AppState::with_session(Config::for_base_url(&server.uri()), session).unwrap()
}

fn post_json(likes: i64, liked: bool, disliked: bool, rating_id: Option<i64>) -> serde_json::Value {
    json!({
        "id": 1,
        "title": "Hello world",
        "content": "First post",
        "author": "ana",
        "created_at": "2024-08-01T09:00:00Z",
        "likes_count": likes,
        "dislikes_count": if disliked { 1 } else { 0 },
        "favorites_count": 0,
        "comments_count": 0,
        "liked": liked,
        "disliked": disliked,
        "favorited": false,
        "rating_id": rating_id
    })
}

fn notification_json(id: i64, read: bool) -> serde_json::Value {
    json!({
        "id": id,
        "user": "bo",
        "type": "like",
        "timestamp": "2024-08-01T09:00:00Z",
        "read": read
    })
}

async fn mount_feed(server: &MockServer, first: serde_json::Value, then: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([first])))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([then])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_like_is_optimistic_and_reverts_on_failure() {
    let server = MockServer::start().await;
    mount_feed(&server, post_json(5, false, false, None), post_json(5, false, false, None)).await;
    Mock::given(method("POST"))
        .and(path("/ratings"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"message": "Rating failed"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = logged_in_app(&server);
    let feed = app.feed_view();
    feed.load().await.unwrap();
    assert_eq!(feed.state().get(1).unwrap().likes_count, 5);

    let pending = {
        let feed = feed.clone();
        tokio::spawn(async move { feed.like(1).await })
    };

    let mut seen_optimistic = false;
    for _ in 0..100 {
        let post = feed.state().get(1).unwrap();
        if post.likes_count == 6 && post.liked() {
            seen_optimistic = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(seen_optimistic);

    let outcome = pending.await.unwrap();
    assert_eq!(outcome, ToggleOutcome::Reverted(ErrorDisplay::Inline("Rating failed".into())));
    let post = feed.state().get(1).unwrap();
    assert_eq!(post.likes_count, 5);
    assert_eq!(post.rating, Rating::None);
    assert_eq!(feed.state().error(), Some(ErrorDisplay::Inline("Rating failed".into())));
}

#[tokio::test]
async fn test_like_success_adopts_server_state() {
    let server = MockServer::start().await;
    mount_feed(&server, post_json(5, false, false, None), post_json(6, true, false, Some(9))).await;
    Mock::given(method("POST"))
        .and(path("/ratings"))
        .and(body_json(json!({"post_id": 1, "status": "like"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let app = logged_in_app(&server);
    let feed = app.feed_view();
    feed.load().await.unwrap();

    assert_eq!(feed.like(1).await, ToggleOutcome::Applied);
    let post = feed.state().get(1).unwrap();
    assert_eq!(post.likes_count, 6);
    assert!(post.liked());
    assert_eq!(post.rating_id, Some(9));
    assert!(feed.state().error().is_none());
}

#[tokio::test]
async fn test_dislike_replaces_existing_like() {
    let server = MockServer::start().await;
    mount_feed(&server, post_json(6, true, false, Some(9)), post_json(5, false, true, Some(10))).await;
    Mock::given(method("DELETE"))
        .and(path("/posts/1/ratings/9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ratings"))
        .and(body_json(json!({"post_id": 1, "status": "dislike"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let app = logged_in_app(&server);
    let feed = app.feed_view();
    feed.load().await.unwrap();

    assert_eq!(feed.dislike(1).await, ToggleOutcome::Applied);
    let post = feed.state().get(1).unwrap();
    assert_eq!(post.rating, Rating::Disliked);
    assert_eq!(post.likes_count, 5);
    assert_eq!(post.dislikes_count, 1);
}

#[tokio::test]
async fn test_blank_comment_is_rejected_without_request() {
    let server = MockServer::start().await;
    mount_feed(&server, post_json(0, false, false, None), post_json(0, false, false, None)).await;
    Mock::given(method("POST"))
        .and(path("/posts/1/comments"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let app = logged_in_app(&server);
    let feed = app.feed_view();
    feed.load().await.unwrap();

    let display = feed.submit_comment(1, "   \n\t").await.unwrap_err();
    assert_eq!(display, ErrorDisplay::Validation("Comment cannot be empty.".into()));
    assert_eq!(feed.state().get(1).unwrap().comments_count, 0);
}

#[tokio::test]
async fn test_comment_is_appended_after_success() {
    let server = MockServer::start().await;
    mount_feed(&server, post_json(0, false, false, None), post_json(0, false, false, None)).await;
    Mock::given(method("POST"))
        .and(path("/posts/1/comments"))
        .and(body_json(json!({"content": "Nice post"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let app = logged_in_app(&server);
    let feed = app.feed_view();
    feed.load().await.unwrap();

    feed.submit_comment(1, "  Nice post ").await.unwrap();
    let post = feed.state().get(1).unwrap();
    assert_eq!(post.comments_count, 1);
    assert_eq!(post.comments.last().map(|c| c.content.as_str()), Some("Nice post"));
}

#[tokio::test]
async fn test_short_notification_page_ends_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notifications"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            notification_json(1, false),
            notification_json(2, true),
            notification_json(3, false)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let app = logged_in_app(&server);
    let view = app.notifications_view();

    assert!(view.load_more().await.unwrap());
    assert_eq!(view.state().len(), 3);
    assert!(!view.has_more());
    assert_eq!(view.unread_count(), 2);

    // 没有更多时不再请求
    assert!(!view.load_more().await.unwrap());
}

#[tokio::test]
async fn test_mark_notification_read() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notifications"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([notification_json(4, false)])),
        )
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/notifications/4"))
        .and(body_json(json!({"read": true})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let app = logged_in_app(&server);
    let view = app.notifications_view();
    view.load_more().await.unwrap();

    let before = view.state().items();
    view.mark_read(4).await.unwrap();
    assert!(view.state().get(4).unwrap().read);
    assert!(!before[0].read);
    assert_eq!(view.unread_count(), 0);
}

#[tokio::test]
async fn test_follow_toggle_on_followers_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/myfollowers"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 7, "username": "ferris"}])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/follow"))
        .and(body_json(json!({"followed_user_id": 7})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/myfollowing"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 7, "username": "ferris"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = logged_in_app(&server);
    let view = app.follow_list_view(FollowListKind::Followers);
    assert!(view.load_more().await.unwrap());
    assert!(!view.has_more());
    assert!(!view.state().get(7).unwrap().following);

    assert_eq!(view.toggle_follow(7).await, ToggleOutcome::Applied);
    let entry = view.state().get(7).unwrap();
    assert!(entry.following);
    assert_eq!(entry.followers_count, 1);
}

#[tokio::test]
async fn test_inbox_open_and_blank_reply() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "sender": "bo",
            "subject": null,
            "body": "hi",
            "timestamp": "2024-08-01T09:00:00Z",
            "read": false
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me/conversations/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "sender": "bo",
            "content": "hi",
            "timestamp": "2024-08-01T09:00:00Z"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/messages/1/reply"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let app = logged_in_app(&server);
    let inbox = app.inbox_view();
    inbox.load().await.unwrap();
    assert_eq!(inbox.state().get(1).unwrap().subject_or_default(), "No Subject");

    inbox.open(1).await.unwrap();
    assert!(inbox.state().get(1).unwrap().read);
    assert_eq!(inbox.thread().len(), 1);

    let display = inbox.reply("  ").await.unwrap_err();
    assert!(matches!(display, ErrorDisplay::Validation(_)));

    inbox.mark_unread(1);
    assert!(!inbox.state().get(1).unwrap().read);
    assert!(inbox.selected().is_none());
}

#[tokio::test]
async fn test_response_after_leaving_view_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([post_json(1, false, false, None)]))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let app = logged_in_app(&server);
    let feed = app.feed_view();
    let pending = {
        let feed = feed.clone();
        tokio::spawn(async move { feed.load().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    feed.leave();

    assert!(pending.await.unwrap().is_ok());
    assert!(feed.state().is_empty());
}

#[tokio::test]
async fn test_failed_rating_switch_follows_server_state() {
    let server = MockServer::start().await;
    // 删除成功后服务端已没有评价
    mount_feed(&server, post_json(6, true, false, Some(9)), post_json(5, false, false, None)).await;
    Mock::given(method("DELETE"))
        .and(path("/posts/1/ratings/9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ratings"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let app = logged_in_app(&server);
    let feed = app.feed_view();
    feed.load().await.unwrap();

    let outcome = feed.dislike(1).await;
    assert!(matches!(outcome, ToggleOutcome::Reverted(ErrorDisplay::Inline(_))));
    let post = feed.state().get(1).unwrap();
    assert_eq!(post.rating, Rating::None);
    assert_eq!(post.likes_count, 5);
    assert_eq!(post.dislikes_count, 0);
    assert_eq!(post.rating_id, None);
    assert!(feed.state().error().is_some());
}

#[tokio::test]
async fn test_failed_rating_switch_without_refetch_clears_rating() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([post_json(6, true, false, Some(9))])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/posts/1/ratings/9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ratings"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let app = logged_in_app(&server);
    let feed = app.feed_view();
    feed.load().await.unwrap();

    assert!(matches!(feed.dislike(1).await, ToggleOutcome::Reverted(_)));
    let post = feed.state().get(1).unwrap();
    assert_eq!(post.rating, Rating::None);
    assert_eq!(post.likes_count, 5);
    assert_eq!(post.dislikes_count, 0);
    assert_eq!(post.rating_id, None);
}

#[tokio::test]
async fn test_unlike_looks_up_missing_rating_id() {
    let server = MockServer::start().await;
    // 加载时没有评价 id，查询时拿到 9，删除后为未评价
    for body in [
        post_json(6, true, false, None),
        post_json(6, true, false, Some(9)),
    ] {
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([body])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([post_json(5, false, false, None)])),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/posts/1/ratings/9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let app = logged_in_app(&server);
    let feed = app.feed_view();
    feed.load().await.unwrap();
    assert_eq!(feed.state().get(1).unwrap().rating_id, None);

    assert_eq!(feed.like(1).await, ToggleOutcome::Applied);
    let post = feed.state().get(1).unwrap();
    assert_eq!(post.rating, Rating::None);
    assert_eq!(post.likes_count, 5);
}

#[tokio::test]
async fn test_overlapping_load_more_requests_each_page_once() {
    let server = MockServer::start().await;
    for page in 1..=3i64 {
        let items: Vec<_> = (0..10)
            .map(|i| notification_json(page * 100 + i, false))
            .collect();
        Mock::given(method("GET"))
            .and(path("/notifications"))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(items)))
            .expect(if page == 3 { 0 } else { 1 })
            .mount(&server)
            .await;
    }

    let app = logged_in_app(&server);
    let view = app.notifications_view();

    let (first, second) = tokio::join!(view.load_more(), view.load_more());
    assert!(first.unwrap());
    assert!(!second.unwrap());

    assert!(view.load_more().await.unwrap());
    assert_eq!(view.state().len(), 20);
    let ids: Vec<i64> = view.state().items().iter().map(|n| n.id).collect();
    assert!(ids.contains(&100) && ids.contains(&200));
    assert!(view.has_more());
}

#[tokio::test]
async fn test_overlapping_follow_pages_are_not_skipped() {
    let server = MockServer::start().await;
    for page in 1..=2i64 {
        let users: Vec<_> = (0..10)
            .map(|i| json!({"id": page * 100 + i, "username": format!("user{}", page * 100 + i)}))
            .collect();
        Mock::given(method("GET"))
            .and(path("/myfollowing"))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(users)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let app = logged_in_app(&server);
    let view = app.follow_list_view(FollowListKind::Following);

    let (first, second) = tokio::join!(view.load_more(), view.load_more());
    assert!(first.unwrap() ^ second.unwrap());
    assert!(view.load_more().await.unwrap());
    assert_eq!(view.state().len(), 20);
}
