use secure_api::domain::entities::{NewUser, ROLE_ADMIN, ROLE_USER, UserPatch};
use secure_api::domain::repositories::UserRepository;
use secure_api::error::AppError;
use secure_api::infrastructure::persistence::PgUserRepository;
use sqlx::PgPool;
use std::sync::Arc;

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        age: 30,
        roles: vec![ROLE_USER.to_string()],
    }
}

#[sqlx::test]
async fn test_create_and_find_user(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));

    let result = repo.create(new_user("alice", "alice@example.com")).await;

    assert!(result.is_ok());
    let user = result.unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.roles, vec![ROLE_USER.to_string()]);
    assert!(user.is_active);
    assert!(user.last_login_at.is_none());

    let by_id = repo.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "alice@example.com");
    let by_name = repo.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(by_name.id, user.id);
    let by_email = repo.find_by_email("alice@example.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, user.id);
    assert!(repo.find_by_username("bob").await.unwrap().is_none());
}

#[sqlx::test]
async fn test_duplicate_username_is_conflict(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));
    repo.create(new_user("alice", "alice@example.com")).await.unwrap();

    let result = repo.create(new_user("alice", "other@example.com")).await;

    match result {
        Err(AppError::Conflict { details, .. }) => {
            assert_eq!(details, serde_json::json!({}));
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[sqlx::test]
async fn test_duplicate_email_is_conflict(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));
    repo.create(new_user("alice", "shared@example.com")).await.unwrap();

    let result = repo.create(new_user("bob", "shared@example.com")).await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
async fn test_list_and_count_skip_inactive(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));
    let alice = repo.create(new_user("alice", "alice@example.com")).await.unwrap();
    repo.create(new_user("bob", "bob@example.com")).await.unwrap();
    repo.create(new_user("carol", "carol@example.com")).await.unwrap();

    repo.soft_delete(alice.id).await.unwrap();

    assert_eq!(repo.count().await.unwrap(), 2);
    let page = repo.list(0, 1).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].username, "bob");
    let rest = repo.list(1, 10).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].username, "carol");
}

#[sqlx::test]
async fn test_search_matches_username_and_email(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));
    repo.create(new_user("alice", "alice@corp.example")).await.unwrap();
    repo.create(new_user("bob", "bob@home.example")).await.unwrap();
    repo.create(new_user("alicia", "al@home.example")).await.unwrap();

    let by_name = repo.search("ALI", 10).await.unwrap();
    let names: Vec<_> = by_name.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "alicia"]);

    let by_email = repo.search("home", 10).await.unwrap();
    assert_eq!(by_email.len(), 2);

    let limited = repo.search("example", 1).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[sqlx::test]
async fn test_search_treats_like_metacharacters_literally(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));
    repo.create(new_user("john_doe", "john@example.com")).await.unwrap();
    repo.create(new_user("johnxdoe", "johnx@example.com")).await.unwrap();

    let underscore = repo.search("n_d", 10).await.unwrap();
    assert_eq!(underscore.len(), 1);
    assert_eq!(underscore[0].username, "john_doe");

    assert!(repo.search("%", 10).await.unwrap().is_empty());
}

#[sqlx::test]
async fn test_update_keeps_unset_fields(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));
    let user = repo.create(new_user("alice", "alice@example.com")).await.unwrap();

    let patch = UserPatch {
        age: Some(41),
        ..Default::default()
    };
    let updated = repo.update(user.id, patch).await.unwrap().unwrap();

    assert_eq!(updated.age, 41);
    assert_eq!(updated.username, "alice");
    assert_eq!(updated.email, "alice@example.com");
    assert!(updated.updated_at >= user.updated_at);

    let patch = UserPatch {
        email: Some("new@example.com".to_string()),
        ..Default::default()
    };
    let updated = repo.update(user.id, patch).await.unwrap().unwrap();
    assert_eq!(updated.email, "new@example.com");
    assert_eq!(updated.age, 41);
}

#[sqlx::test]
async fn test_update_unknown_user_returns_none(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));

    let result = repo.update(9999, UserPatch::default()).await.unwrap();

    assert!(result.is_none());
}

#[sqlx::test]
async fn test_set_roles_and_password(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));
    let user = repo.create(new_user("alice", "alice@example.com")).await.unwrap();

    let roles = vec![ROLE_USER.to_string(), ROLE_ADMIN.to_string()];
    let promoted = repo.set_roles(user.id, roles.clone()).await.unwrap().unwrap();
    assert_eq!(promoted.roles, roles);

    assert!(repo.set_password_hash(user.id, "new-hash").await.unwrap());
    let reloaded = repo.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.password_hash, "new-hash");

    assert!(!repo.set_password_hash(9999, "new-hash").await.unwrap());
}

#[sqlx::test]
async fn test_touch_last_login(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));
    let user = repo.create(new_user("alice", "alice@example.com")).await.unwrap();

    repo.touch_last_login(user.id).await.unwrap();

    let reloaded = repo.find_by_id(user.id).await.unwrap().unwrap();
    assert!(reloaded.last_login_at.is_some());
}

#[sqlx::test]
async fn test_soft_delete_hides_user(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));
    let user = repo.create(new_user("alice", "alice@example.com")).await.unwrap();

    assert!(repo.soft_delete(user.id).await.unwrap());
    assert!(repo.find_by_id(user.id).await.unwrap().is_none());
    assert!(repo.find_by_username("alice").await.unwrap().is_none());
    assert!(repo.update(user.id, UserPatch::default()).await.unwrap().is_none());

    assert!(!repo.soft_delete(user.id).await.unwrap());
}

#[sqlx::test]
async fn test_health_check(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));

    assert!(repo.health_check().await.is_ok());
}
