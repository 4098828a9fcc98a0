/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証と liveness re-check は middleware/services 側の責務
 * - 値は token の claims ではなく、リクエスト時に取得した user record から作る
 */
use crate::repos::UserRecord;
use crate::services::auth::Role;

/// 認証済みのリクエストに付与されるコンテキスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

impl From<UserRecord> for AuthCtx {
    fn from(user: UserRecord) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}
