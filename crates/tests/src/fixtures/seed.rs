use chrono::{Duration, Utc};
use drivebridge_services::drive::{CredentialStore, TokenState, TokenStore};
use serde_json::Value;

use super::{fake_google::VALID_ACCESS, test_app::TestApp};

pub const CLIENT_ID: &str = "123-abc.apps.googleusercontent.com";
pub const CLIENT_SECRET: &str = "GOCSPX-test-secret";
pub const REFRESH_TOKEN: &str = "1//seeded-refresh";

impl TestApp {
    pub fn auth_get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.drive_url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.drive_url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    /// Fetch a nonce for `token` from the status endpoint.
    pub async fn nonce(&self, token: &str) -> String {
        let resp = self.auth_get("/status", token).send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 200, "status request failed");
        let json: Value = resp.json().await.unwrap();
        json["nonce"].as_str().unwrap().to_string()
    }

    /// Authenticated admin POST carrying a valid nonce.
    pub async fn admin_post(&self, path: &str) -> reqwest::RequestBuilder {
        let nonce = self.nonce(&self.admin_token).await;
        self.auth_post(path, &self.admin_token)
            .header("x-drive-nonce", nonce)
    }

    pub async fn seed_credentials(&self) {
        CredentialStore::new(self.store.clone())
            .save(CLIENT_ID, CLIENT_SECRET)
            .await
            .unwrap();
    }

    /// Store a token whose expiry is `expires_in` seconds away (negative for
    /// an already expired one).
    pub async fn seed_token(&self, access_token: &str, expires_in: i64) {
        TokenStore::new(self.store.clone())
            .save(&TokenState {
                access_token: access_token.to_string(),
                refresh_token: REFRESH_TOKEN.to_string(),
                expires_at: Utc::now() + Duration::seconds(expires_in),
            })
            .await
            .unwrap();
    }

    /// Credentials plus a live token.
    pub async fn connect(&self) {
        self.seed_credentials().await;
        self.seed_token(VALID_ACCESS, 3600).await;
    }

    pub async fn stored_token(&self) -> Option<TokenState> {
        TokenStore::new(self.store.clone()).load().await.unwrap()
    }
}
