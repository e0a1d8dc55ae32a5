//! libcurl-backed network.

use super::error::NetworkError;
use super::parse::final_headers;
use super::Network;
use crate::config::NetworkConfig;
use crate::http::{Request, Response};
use async_trait::async_trait;
use std::str;
use std::time::Duration;

/// Performs each request on a blocking thread with a fresh easy handle.
#[derive(Debug, Clone)]
pub struct CurlNetwork {
    connect_timeout: Duration,
    timeout: Duration,
}

impl CurlNetwork {
    pub fn new(cfg: &NetworkConfig) -> Self {
        Self {
            connect_timeout: cfg.connect_timeout(),
            timeout: cfg.timeout(),
        }
    }

    fn perform(&self, request: &Request) -> Result<Response, NetworkError> {
        let scheme = request.url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(NetworkError::InvalidUrl(request.url.to_string()));
        }

        let mut easy = curl::easy::Easy::new();
        easy.url(request.url.as_str())?;
        match (request.method.as_str(), request.body.as_deref()) {
            ("GET", None) => easy.get(true)?,
            ("HEAD", None) => easy.nobody(true)?,
            ("POST", body) => {
                easy.post(true)?;
                easy.post_fields_copy(body.unwrap_or_default())?;
            }
            (method, body) => {
                easy.custom_request(method)?;
                if let Some(body) = body {
                    easy.post_fields_copy(body)?;
                }
            }
        }
        easy.follow_location(true)?;
        easy.max_redirections(20)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        let mut list = curl::easy::List::new();
        for (k, v) in &request.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        // The request goes out as-is; no 100-continue handshake.
        list.append("Expect:")?;
        easy.http_headers(list)?;

        let mut header_lines: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        Ok(Response::new(code as u16, final_headers(&header_lines), body))
    }
}

#[async_trait]
impl Network for CurlNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        let this = self.clone();
        let request = request.clone();
        tokio::task::spawn_blocking(move || this.perform(&request))
            .await
            .map_err(|e| NetworkError::Worker(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[tokio::test]
    async fn non_http_scheme_is_rejected() {
        let net = CurlNetwork::new(&NetworkConfig::default());
        let req = Request::get(Url::parse("file:///etc/hostname").unwrap());
        let err = net.fetch(&req).await.unwrap_err();
        assert!(matches!(err, NetworkError::InvalidUrl(_)));
    }
}
