use crate::domain::errors::{PayError, PayResult, TransportError};
use crate::infrastructure::config::PayConfig;
use crate::ports::xml_transport::XmlTransport;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};

/// 基于 reqwest 的 XML 传输实现
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// 按配置中的超时时间构建 HTTP 客户端
    pub fn from_config(config: &PayConfig) -> PayResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PayError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl XmlTransport for ReqwestTransport {
    async fn post_xml(&self, url: &str, body: String) -> Result<Vec<u8>, TransportError> {
        debug!("POST {} body: {}", url, body);

        let response = self
            .client
            .post(url)
            .header("Content-Type", "text/xml; charset=utf-8")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Gateway HTTP error: {} - {}", status, error_text);
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let bytes = response.bytes().await?;
        debug!("Gateway response: {}", String::from_utf8_lossy(&bytes));
        Ok(bytes.to_vec())
    }
}
