//! # 외부 인증 제공자 클라이언트
//!
//! Bearer 토큰의 검증은 전적으로 Supabase Auth(GoTrue)에 위임합니다.
//! `GET {SUPABASE_URL}/auth/v1/user`에 토큰을 그대로 전달하고,
//! 200이면 응답의 사용자 ID를 호출자 ID로 사용합니다.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// 검증된 사용자 신원
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// 제공자가 토큰을 거부함 (만료, 위조 등)
    #[error("token rejected by identity provider")]
    Rejected,

    /// 제공자에 연결할 수 없거나 예상하지 못한 응답
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// 토큰 → 사용자 신원
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError>;
}

pub struct SupabaseAuth {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(base_url: String, anon_key: String) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url,
            anon_key,
        })
    }
}

#[derive(Deserialize)]
struct SupabaseUser {
    id: Uuid,
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let status = response.status();
        if is_rejection(status) {
            return Err(IdentityError::Rejected);
        }
        if !status.is_success() {
            return Err(IdentityError::Unavailable(format!("status {}", status)));
        }

        let user: SupabaseUser = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        Ok(Identity {
            user_id: user.id,
        })
    }
}

// 429를 제외한 4xx는 토큰 거부로 봅니다. 429·5xx는 공급자 장애입니다.
fn is_rejection(status: reqwest::StatusCode) -> bool {
    status.is_client_error() && status != reqwest::StatusCode::TOO_MANY_REQUESTS
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn client_errors_reject_the_token() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN,
            StatusCode::NOT_FOUND,
            StatusCode::UNPROCESSABLE_ENTITY,
        ] {
            assert!(is_rejection(status), "{status}");
        }
    }

    #[test]
    fn rate_limits_and_server_errors_are_outages() {
        for status in [
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::OK,
        ] {
            assert!(!is_rejection(status), "{status}");
        }
    }
}
