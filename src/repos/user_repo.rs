/*
 * Responsibility
 * - users テーブル向け SQLx 操作 (liveness re-check 用の参照のみ)
 * - UserStore trait で Authorizer から切り離す (テストは in-memory 実装)
 * - DB エラーは RepoError で返し、意味付けは呼び出し側で行う
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;
use crate::services::auth::{Role, Subject};

/// Current state of a user as seen by the authorizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Active and not soft-deleted.
    pub fn is_live(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }

    pub fn subject(&self) -> Subject {
        Subject {
            id: self.id.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

/// Authoritative user lookup.
///
/// Implementations must return current state; callers rely on it to catch
/// deactivation that happened after a token was issued.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<UserRecord>>;

    // Reachability probe (for /health).
    async fn ping(&self) -> RepoResult<()>;
}

// "deletedAt" may be `timestamp(3)` without time zone; cast so it decodes as DateTime<Utc>.
const FIND_USER_BY_ID: &str = r#"
    SELECT "id", "email", "role"::text AS "role", "isActive",
           "deletedAt"::timestamptz AS "deletedAt"
    FROM users
    WHERE "id" = $1
"#;

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    email: String,
    role: String,
    #[sqlx(rename = "isActive")]
    is_active: bool,
    #[sqlx(rename = "deletedAt")]
    deleted_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            role: Role::from(row.role),
            is_active: row.is_active,
            deleted_at: row.deleted_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(FIND_USER_BY_ID)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(UserRecord::from))
    }

    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(is_active: bool, deleted_at: Option<DateTime<Utc>>) -> UserRecord {
        UserRecord {
            id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            role: Role::from("member"),
            is_active,
            deleted_at,
        }
    }

    #[test]
    fn liveness_requires_active_and_not_deleted() {
        assert!(record(true, None).is_live());
        assert!(!record(false, None).is_live());
        assert!(!record(true, Some(Utc::now())).is_live());
        assert!(!record(false, Some(Utc::now())).is_live());
    }

    #[test]
    fn subject_projects_identity_fields() {
        let s = record(true, None).subject();

        assert_eq!(s.id, "u1");
        assert_eq!(s.email, "u1@example.com");
        assert_eq!(s.role, Role::from("member"));
    }

    #[test]
    fn deleted_at_is_read_as_timestamptz() {
        assert!(FIND_USER_BY_ID.contains(r#""deletedAt"::timestamptz AS "deletedAt""#));
    }
}
