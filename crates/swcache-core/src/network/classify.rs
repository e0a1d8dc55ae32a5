//! Classify network failures for logging. Nothing here drives a retry.

use super::error::NetworkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Dns,
    Connection,
    Other,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Dns => "dns",
            FailureKind::Connection => "connection",
            FailureKind::Other => "other",
        }
    }
}

fn classify_curl_error(e: &curl::Error) -> FailureKind {
    if e.is_operation_timedout() {
        return FailureKind::Timeout;
    }
    if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
        return FailureKind::Dns;
    }
    if e.is_couldnt_connect()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return FailureKind::Connection;
    }
    FailureKind::Other
}

pub fn classify(e: &NetworkError) -> FailureKind {
    match e {
        NetworkError::Curl(ce) => classify_curl_error(ce),
        NetworkError::Offline => FailureKind::Connection,
        NetworkError::InvalidUrl(_) | NetworkError::Worker(_) => FailureKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curl_codes_map_to_kinds() {
        // CURLE_COULDNT_RESOLVE_HOST = 6, CURLE_COULDNT_CONNECT = 7,
        // CURLE_OPERATION_TIMEDOUT = 28, CURLE_GOT_NOTHING = 52
        let dns = NetworkError::Curl(curl::Error::new(6));
        let connect = NetworkError::Curl(curl::Error::new(7));
        let timeout = NetworkError::Curl(curl::Error::new(28));
        let empty = NetworkError::Curl(curl::Error::new(52));
        assert_eq!(classify(&dns), FailureKind::Dns);
        assert_eq!(classify(&connect), FailureKind::Connection);
        assert_eq!(classify(&timeout), FailureKind::Timeout);
        assert_eq!(classify(&empty), FailureKind::Connection);
    }

    #[test]
    fn non_curl_errors() {
        assert_eq!(classify(&NetworkError::Offline), FailureKind::Connection);
        assert_eq!(
            classify(&NetworkError::Worker("panicked".into())),
            FailureKind::Other
        );
        assert_eq!(FailureKind::Timeout.as_str(), "timeout");
    }
}
