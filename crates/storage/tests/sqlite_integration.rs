use quiz_core::model::{AuthToken, User, UserId};
use quiz_core::time::fixed_now;
use storage::repository::{AuthStore, StoredAuth};
use storage::sqlite::SqliteRepository;

fn stored(token: &str, name: Option<&str>) -> StoredAuth {
    StoredAuth {
        token: AuthToken::new(token),
        user: User {
            id: UserId::new("65541f2a9c0e"),
            username: "ada".into(),
            email: "ada@example.com".into(),
            name: name.map(str::to_owned),
        },
        saved_at: fixed_now(),
    }
}

#[tokio::test]
async fn sqlite_remembers_login_across_reads() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_auth_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.load_auth().await.expect("load").is_none());

    let auth = stored("jwt-1", Some("Ada Lovelace"));
    repo.save_auth(&auth).await.expect("save");

    let loaded = repo.load_auth().await.expect("load").expect("row");
    assert_eq!(loaded, auth);
    assert_eq!(loaded.user.display_name(), "Ada Lovelace");
}

#[tokio::test]
async fn sqlite_keeps_a_single_auth_row() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_auth_single?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.save_auth(&stored("jwt-1", None)).await.expect("save");
    repo.save_auth(&stored("jwt-2", None)).await.expect("save");

    let loaded = repo.load_auth().await.expect("load").expect("row");
    assert_eq!(loaded.token.expose(), "jwt-2");

    let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM auth_session")
        .fetch_one(repo.pool())
        .await
        .expect("count");
    assert_eq!(rows, 1);

    repo.clear_auth().await.expect("clear");
    assert!(repo.load_auth().await.expect("load").is_none());
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_auth_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    let (versions,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .expect("count");
    assert_eq!(versions, 1);
}
