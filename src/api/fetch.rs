use gloo_net::http::{Request, RequestBuilder};
use serde_json::Value;

use super::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::error::{ClientError, Result};

/// Browser `fetch` via gloo-net.
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchTransport;

impl Transport for FetchTransport {
    async fn send(&self, base_url: &str, request: &ApiRequest) -> Result<ApiResponse> {
        let url = format!("{}{}", base_url, request.path);

        let builder: RequestBuilder = match request.method {
            Method::Get => Request::get(&url),
            Method::Post => Request::post(&url),
            Method::Delete => Request::delete(&url),
        };

        let pending = match &request.body {
            Some(body) => builder
                .json(body)
                .map_err(|e| ClientError::Parse(e.to_string()))?
                .send()
                .await,
            None => builder.send().await,
        };
        let response = pending.map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);

        Ok(ApiResponse::new(status, body))
    }
}
