//! Admin operations over the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use blog_core::admin::{ChangeListQuery, DateDrillDown, ListFilter, PostAdminService, PostForm};
use blog_core::domain::{PostStatus, User};
use blog_core::error::DomainError;
use blog_core::ports::{BaseRepository, PostRepository, UserRepository};
use blog_infra::InMemoryStore;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
}

async fn setup() -> (InMemoryStore, PostAdminService, User) {
    let store = InMemoryStore::new();
    let author = store
        .users()
        .insert(User::new("u1".to_string(), "u1@example.com".to_string()))
        .await
        .unwrap();
    let service = PostAdminService::new(Arc::new(store.posts()), Arc::new(store.users()));
    (store, service, author)
}

fn form(author: &User, title: &str, publish: DateTime<Utc>) -> PostForm {
    PostForm {
        title: title.to_string(),
        author_id: author.id,
        body: "World".to_string(),
        publish: Some(publish),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_defaults_to_draft_and_suggests_slug() {
    let (_store, service, author) = setup().await;

    let post = service.create(form(&author, "Hello", at(2024, 1, 1))).await.unwrap();

    assert_eq!(post.slug, "hello");
    assert_eq!(post.status, PostStatus::Draft);
    assert_eq!(post.created, post.updated);
    assert_eq!(service.get(post.id).await.unwrap(), post);
}

#[tokio::test]
async fn test_slug_unique_for_publish_date() {
    let (_store, service, author) = setup().await;
    service.create(form(&author, "Hello", at(2024, 1, 1))).await.unwrap();

    let same_day = service.create(form(&author, "Hello", at(2024, 1, 1))).await;
    assert!(matches!(same_day, Err(DomainError::Duplicate(_))));

    let next_day = service.create(form(&author, "Hello", at(2024, 1, 2))).await;
    assert!(next_day.is_ok());
}

#[tokio::test]
async fn test_update_can_keep_its_own_slug() {
    let (_store, service, author) = setup().await;
    let post = service.create(form(&author, "Hello", at(2024, 1, 1))).await.unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;

    let mut edit = form(&author, "Hello", at(2024, 1, 1));
    edit.slug = post.slug.clone();
    edit.status = Some(PostStatus::Published);
    let updated = service.update(post.id, edit).await.unwrap();

    assert_eq!(updated.status, PostStatus::Published);
    assert_eq!(updated.created, post.created);
    assert!(updated.updated > post.updated);
}

#[tokio::test]
async fn test_status_may_move_back_to_draft() {
    let (_store, service, author) = setup().await;
    let mut published = form(&author, "Hello", at(2024, 1, 1));
    published.status = Some(PostStatus::Published);
    let post = service.create(published).await.unwrap();

    let mut draft = form(&author, "Hello", at(2024, 1, 1));
    draft.status = Some(PostStatus::Draft);
    let updated = service.update(post.id, draft).await.unwrap();

    assert_eq!(updated.status, PostStatus::Draft);
}

#[tokio::test]
async fn test_unknown_author_rejected() {
    let (_store, service, _author) = setup().await;
    let mut bad = form(&User::new("x".into(), "x@example.com".into()), "Hello", at(2024, 1, 1));
    bad.author_id = Uuid::new_v4();

    let result = service.create(bad).await;
    assert!(matches!(result, Err(DomainError::Validation(msg)) if msg.starts_with("author")));
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let (_store, service, author) = setup().await;

    let mut no_body = form(&author, "Hello", at(2024, 1, 1));
    no_body.body = "  ".to_string();
    assert!(matches!(service.create(no_body).await, Err(DomainError::Validation(_))));

    let untitled = form(&author, "", at(2024, 1, 1));
    assert!(matches!(service.create(untitled).await, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_delete_and_protected_author() {
    let (store, service, author) = setup().await;
    let post = service.create(form(&author, "Hello", at(2024, 1, 1))).await.unwrap();

    let users = store.users();
    let blocked = users.delete(author.id).await;
    assert!(blocked.is_err());
    assert!(users.find_by_username("u1").await.unwrap().is_some());

    service.delete(post.id).await.unwrap();
    assert!(matches!(
        service.get(post.id).await,
        Err(DomainError::NotFound { entity_type: "Post", .. })
    ));
    assert!(matches!(
        service.delete(post.id).await,
        Err(DomainError::NotFound { .. })
    ));

    users.delete(author.id).await.unwrap();
}

#[tokio::test]
async fn test_change_list_search_filter_and_drill_down() {
    let (_store, service, author) = setup().await;
    let other = service
        .create(form(&author, "Async Rust in practice", at(2024, 2, 10)))
        .await
        .unwrap();
    service.create(form(&author, "Gardening", at(2024, 2, 11))).await.unwrap();
    let mut published = form(&author, "Rust ownership", at(2023, 5, 1));
    published.status = Some(PostStatus::Published);
    service.create(published).await.unwrap();

    let found = service
        .change_list(&ChangeListQuery::new().search("rust"))
        .await
        .unwrap();
    let titles: Vec<&str> = found.items.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["Async Rust in practice", "Rust ownership"]);

    let february = service
        .change_list(&ChangeListQuery::new().drill_down(DateDrillDown::month(2024, 2)))
        .await
        .unwrap();
    assert_eq!(february.total, 2);

    let by_author = service
        .change_list(
            &ChangeListQuery::new()
                .filter(ListFilter::Author(author.id))
                .filter(ListFilter::Status(PostStatus::Draft))
                .search("async"),
        )
        .await
        .unwrap();
    assert_eq!(by_author.items.len(), 1);
    assert_eq!(by_author.items[0].id, other.id);

    let invalid = service.change_list(&ChangeListQuery::new().page(0, 10)).await;
    assert!(matches!(invalid, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_change_list_rejects_out_of_range_page() {
    let (store, service, author) = setup().await;
    service.create(form(&author, "Hello", at(2024, 1, 1))).await.unwrap();

    let mut query = ChangeListQuery::new();
    query.page = u64::MAX;
    let result = service.change_list(&query).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));

    let direct = store.posts().change_list(&query).await;
    assert!(direct.is_err());
}

#[tokio::test]
async fn test_lookup_author() {
    let (_store, service, author) = setup().await;
    assert_eq!(service.lookup_author(author.id).await.unwrap().username, "u1");
    assert!(service.lookup_author(Uuid::new_v4()).await.is_err());
}
