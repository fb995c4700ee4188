/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 * - 所有者 / 可視性の判定 (public OR owner) もここに置く
 *
 * Notes
 * - token の検証ロジックは middleware/services 側の責務
 * - ここは「型（契約）」として固定化する
 */
use uuid::Uuid;

use crate::services::auth::Claims;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `user_id` は token の `userid` claim (users."userId" の文字列表現)
/// - `roles` は token の role 一覧。判定には使わず運ぶだけ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: String,
    pub roles: Vec<String>,
}

impl AuthCtx {
    pub fn new(user_id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles,
        }
    }

    pub fn user_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.user_id).ok()
    }

    pub fn is_owner(&self, owner_id: &str) -> bool {
        self.user_id == owner_id
    }
}

impl From<Claims> for AuthCtx {
    fn from(claims: Claims) -> Self {
        Self::new(claims.userid, claims.roles)
    }
}

/// A record is visible when it is public or the caller owns it.
pub fn can_view(viewer: Option<&AuthCtx>, owner_id: &str, public: bool) -> bool {
    public || viewer.is_some_and(|ctx| ctx.is_owner(owner_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(id: &str) -> AuthCtx {
        AuthCtx::new(id, vec!["user".to_string()])
    }

    #[test]
    fn public_records_are_visible_to_everyone() {
        assert!(can_view(None, "u1", true));
        assert!(can_view(Some(&ctx("u2")), "u1", true));
    }

    #[test]
    fn private_records_are_owner_only() {
        assert!(can_view(Some(&ctx("u1")), "u1", false));
        assert!(!can_view(Some(&ctx("u2")), "u1", false));
        assert!(!can_view(None, "u1", false));
    }

    #[test]
    fn user_uuid_parses_only_uuids() {
        let id = Uuid::new_v4();
        assert_eq!(ctx(&id.to_string()).user_uuid(), Some(id));
        assert_eq!(ctx("u1").user_uuid(), None);
    }
}
