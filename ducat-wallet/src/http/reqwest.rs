use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use url::Url;

use ducat_core::primitives::CashuErrorResponse;

use crate::error::DucatWalletError;

use super::HttpClient;

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn extract_response_data<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, DucatWalletError> {
        let status = response.status();
        let response_text = response.text().await?;
        match status {
            StatusCode::OK => match serde_json::from_str::<T>(&response_text) {
                Ok(data) => Ok(data),
                Err(_) => Err(Self::parse_mint_error(&response_text)),
            },
            _ => Err(Self::parse_mint_error(&response_text)),
        }
    }

    fn parse_mint_error(body: &str) -> DucatWalletError {
        match serde_json::from_str::<CashuErrorResponse>(body) {
            Ok(error_body) => DucatWalletError::Mint(error_body.message()),
            Err(_) => DucatWalletError::UnexpectedResponse(body.to_owned()),
        }
    }

    pub async fn do_get<T: serde::de::DeserializeOwned>(
        &self,
        url: &Url,
    ) -> Result<T, DucatWalletError> {
        let resp = self.client.get(url.clone()).send().await?;
        Self::extract_response_data::<T>(resp).await
    }

    pub async fn do_post<T: serde::de::DeserializeOwned, B: serde::Serialize>(
        &self,
        url: &Url,
        body: &B,
    ) -> Result<T, DucatWalletError> {
        let resp = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_str("application/json")?)
            .body(serde_json::to_string(body)?)
            .send()
            .await?;
        Self::extract_response_data::<T>(resp).await
    }
}
