//! Request/response value types passed between the host and the engine.

use crate::clients::ClientId;
use url::Url;

/// Header list in wire order. Names compare case-insensitively.
pub type Headers = Vec<(String, String)>;

fn find_header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Standard methods are normalized to upper case; anything else is kept verbatim.
fn normalize_method(method: &str) -> String {
    const STANDARD: [&str; 6] = ["DELETE", "GET", "HEAD", "OPTIONS", "POST", "PUT"];
    STANDARD
        .iter()
        .find(|m| m.eq_ignore_ascii_case(method))
        .map(|m| m.to_string())
        .unwrap_or_else(|| method.to_string())
}

/// One intercepted network-triggering action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: Url,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
    /// Client context that a navigation caused by this request will produce.
    pub resulting_client_id: Option<ClientId>,
}

impl Request {
    pub fn new(method: &str, url: Url) -> Self {
        Self {
            method: normalize_method(method),
            url,
            headers: Vec::new(),
            body: None,
            resulting_client_id: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    /// Build a request for a relative or absolute URL against `base`.
    pub fn resolve(method: &str, raw_url: &str, base: &Url) -> Result<Self, url::ParseError> {
        Ok(Self::new(method, base.join(raw_url)?))
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_resulting_client(mut self, id: ClientId) -> Self {
        self.resulting_client_id = Some(id);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn key(&self) -> RequestKey {
        RequestKey::new(&self.method, &self.url)
    }
}

/// A complete response: status, headers, body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, headers: Headers, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// `302 Found` pointing at `location`, empty body.
    pub fn redirect(location: &Url) -> Self {
        Self {
            status: 302,
            headers: vec![("Location".to_string(), location.to_string())],
            body: Vec::new(),
        }
    }

    /// True for 2xx statuses.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.status, 301 | 302 | 303 | 307 | 308)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Cache identity of a request: method plus absolute URL without fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    pub fn new(method: &str, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self {
            method: normalize_method(method),
            url: url.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://127.0.0.1:5000/").unwrap()
    }

    #[test]
    fn standard_methods_normalized() {
        assert_eq!(Request::new("post", base()).method, "POST");
        assert_eq!(Request::new("Get", base()).method, "GET");
        assert_eq!(Request::new("patch", base()).method, "patch");
    }

    #[test]
    fn resolve_relative_against_origin() {
        let req = Request::resolve("GET", "/static/manifest.json", &base()).unwrap();
        assert_eq!(req.url.as_str(), "http://127.0.0.1:5000/static/manifest.json");
    }

    #[test]
    fn key_strips_fragment() {
        let url = Url::parse("http://127.0.0.1:5000/search?q=a#top").unwrap();
        let key = RequestKey::new("get", &url);
        assert_eq!(key.method, "GET");
        assert_eq!(key.url, "http://127.0.0.1:5000/search?q=a");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = Request::get(base()).with_header("Content-Type", "text/plain");
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert!(req.header("accept").is_none());
    }

    #[test]
    fn redirect_response() {
        let target = base().join("/?shared=true").unwrap();
        let resp = Response::redirect(&target);
        assert_eq!(resp.status, 302);
        assert!(resp.is_redirect());
        assert!(!resp.is_ok());
        assert_eq!(resp.header("location"), Some("http://127.0.0.1:5000/?shared=true"));
    }
}
