//! Cache keys, TTLs and invalidation helpers.
//!
//! Keys here are relative; [`CacheStore`] adds the configured prefix.

use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

use crate::CacheStore;

pub const LOGIN_TTL: Duration = Duration::from_secs(3600);
pub const SESSION_TTL: Duration = Duration::from_secs(86_400);
pub const USER_TTL: Duration = Duration::from_secs(1800);
pub const RESET_TOKEN_TTL: Duration = Duration::from_secs(3600);

fn build_key(parts: &[&str]) -> String {
    parts.join(":")
}

/// Credentials looked up on login, keyed by normalized email.
pub mod logins {
    use super::*;

    pub fn by_email(email: &str) -> String {
        build_key(&["login", &email.trim().to_lowercase()])
    }
}

pub mod sessions {
    use super::*;

    pub fn by_user(user_id: Uuid) -> String {
        build_key(&["session", &user_id.to_string()])
    }
}

pub mod users {
    use super::*;

    pub fn by_id(user_id: Uuid) -> String {
        build_key(&["user", &user_id.to_string()])
    }
}

/// Reset-token records. The raw token never appears in a key.
pub mod reset_tokens {
    use super::*;

    pub fn by_token(token: &str) -> String {
        let digest = hex::encode(Sha256::digest(token.as_bytes()));
        build_key(&["reset", &digest])
    }
}

/// Best-effort invalidation; failures are logged with `warn!`.
pub mod invalidate {
    use super::*;

    pub async fn login(cache: &CacheStore, email: &str) {
        if let Err(e) = cache.invalidate(&logins::by_email(email)).await {
            warn!(error = %e, "Failed to invalidate login cache");
        }
    }

    pub async fn user(cache: &CacheStore, user_id: Uuid) {
        if let Err(e) = cache.invalidate(&users::by_id(user_id)).await {
            warn!(error = %e, user_id = %user_id, "Failed to invalidate user cache");
        }
    }

    pub async fn session(cache: &CacheStore, user_id: Uuid) {
        if let Err(e) = cache.invalidate(&sessions::by_user(user_id)).await {
            warn!(error = %e, user_id = %user_id, "Failed to invalidate session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_key_is_case_insensitive() {
        assert_eq!(
            logins::by_email(" Julia.Nguyen@Example.com "),
            "login:julia.nguyen@example.com"
        );
    }

    #[test]
    fn reset_key_hides_token() {
        let key = reset_tokens::by_token("eyJ.secret.token");
        assert!(key.starts_with("reset:"));
        assert!(!key.contains("secret"));
        assert_eq!(key.len(), "reset:".len() + 64);
        assert_eq!(key, reset_tokens::by_token("eyJ.secret.token"));
    }

    #[test]
    fn entity_keys() {
        let id = Uuid::nil();
        assert_eq!(users::by_id(id), format!("user:{}", id));
        assert_eq!(sessions::by_user(id), format!("session:{}", id));
    }

    #[tokio::test]
    async fn invalidate_helpers_remove_entries() {
        let cache = CacheStore::memory();
        let id = Uuid::new_v4();

        cache.put(&users::by_id(id), &1, USER_TTL).await;
        cache.put(&sessions::by_user(id), &1, SESSION_TTL).await;
        cache.put(&logins::by_email("a@b.c"), &1, LOGIN_TTL).await;

        invalidate::user(&cache, id).await;
        invalidate::session(&cache, id).await;
        invalidate::login(&cache, "A@B.C").await;

        assert!(!cache.exists(&users::by_id(id)).await);
        assert!(!cache.exists(&sessions::by_user(id)).await);
        assert!(!cache.exists(&logins::by_email("a@b.c")).await);
    }
}
