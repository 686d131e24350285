//! Billing service client for AI credit balance checks.

use async_trait::async_trait;
use call_ai::traits::credits;
use call_ai::Error;
use entity::Id;
use log::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct BalanceResponse {
    pub allowed: bool,
}

/// Billing service client
pub struct CreditsClient {
    client: reqwest::Client,
    base_url: String,
}

impl CreditsClient {
    /// Create a new billing client with the given API key and base URL
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();

        let auth_value = format!("Bearer {}", api_key);
        let mut header_value =
            reqwest::header::HeaderValue::from_str(&auth_value).map_err(|e| {
                warn!("Failed to create auth header: {:?}", e);
                Error::Configuration("Invalid API key format".to_string())
            })?;
        header_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, header_value);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .build()
            .map_err(|e| {
                warn!("Failed to build billing HTTP client: {:?}", e);
                Error::Configuration("Failed to build HTTP client".to_string())
            })?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl credits::Provider for CreditsClient {
    async fn check_balance(&self, organization_id: Id) -> Result<bool, Error> {
        let response = self
            .client
            .get(format!(
                "{}/organizations/{}/balance",
                self.base_url, organization_id
            ))
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to call billing service: {:?}", e);
                Error::Network(e.to_string())
            })?;

        if response.status().is_success() {
            let balance: BalanceResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse balance response: {:?}", e);
                Error::Deserialization("Invalid response from billing service".to_string())
            })?;
            Ok(balance.allowed)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            error!("Billing service API: {}", error_text);
            Err(Error::Provider(error_text))
        }
    }

    fn provider_id(&self) -> &str {
        "billing_service"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_ai::traits::credits::Provider;
    use mockito::Server;

    #[tokio::test]
    async fn check_balance_returns_allowed_flag() {
        let mut server = Server::new_async().await;
        let organization_id = Id::new_v4();
        let _mock = server
            .mock(
                "GET",
                format!("/organizations/{}/balance", organization_id).as_str(),
            )
            .match_header("authorization", "Bearer test_key")
            .with_status(200)
            .with_body(r#"{"allowed": false, "remaining_credits": 0}"#)
            .create_async()
            .await;

        let client = CreditsClient::new("test_key", &server.url()).unwrap();
        let allowed = client.check_balance(organization_id).await.unwrap();

        assert!(!allowed);
    }

    #[tokio::test]
    async fn check_balance_maps_rejection_to_provider_error() {
        let mut server = Server::new_async().await;
        let organization_id = Id::new_v4();
        let _mock = server
            .mock(
                "GET",
                format!("/organizations/{}/balance", organization_id).as_str(),
            )
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let client = CreditsClient::new("test_key", &server.url()).unwrap();
        let result = client.check_balance(organization_id).await;

        assert!(matches!(result, Err(Error::Provider(_))));
    }
}
