// Club Log DXCC API client
// See: https://clublog.freshdesk.com/support/solutions/articles/54905-how-to-query-club-log-for-dxcc-information
//
// One blocking GET per lookup. The server applies its own exception and
// prefix history for the supplied date, so no local resolution happens here.
// Transport errors are returned as-is; nothing is retried.

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

use super::record::Record;
use crate::error::{LookupError, Result};
use crate::time_utils::api_time_params;

/// Club Log DXCC endpoint
pub const CLUBLOG_API_URL: &str = "https://secure.clublog.org/dxcc";

/// Bodies Club Log sends when the API key is missing or rejected
const CLUBLOG_KEY_ERRORS: [&str; 2] = [
    "Access to this form requires a valid API key. For more info see: http://www.clublog.org/need_api.php",
    "Invalid or missing API Key",
];

/// Error for a non-success response
///
/// Only Club Log's key-error bodies mean a bad credential; every other
/// failure is a transport error whatever the status.
pub fn response_error(status: StatusCode, body: &str) -> LookupError {
    let trimmed = body.trim();
    if CLUBLOG_KEY_ERRORS.contains(&trimmed) {
        return LookupError::CredentialMissing;
    }
    LookupError::Transport(format!(
        "server returned HTTP {}: {}",
        status,
        truncate_string(trimmed, 200)
    ))
}

pub fn check_response(status: StatusCode, body: &str) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(response_error(status, body))
    }
}

/// Read a JSON field that may be a number or a numeric string
fn json_number<T: std::str::FromStr>(value: &Value) -> Option<T> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Map a Club Log DXCC response onto the common record shape
///
/// DXCC 0 means "no entity" and is reported as `NoMatch`. Longitude is taken
/// as returned (already positive east).
pub fn map_api_response(body: &str) -> Result<Record> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| LookupError::Transport(format!("unreadable Club Log response: {}", e)))?;
    let obj = json.as_object().ok_or_else(|| {
        LookupError::Transport("Club Log response is not a JSON object".to_string())
    })?;

    let mut record = Record::default();
    for (name, value) in obj {
        match name.as_str() {
            "Name" => record.country = json_text(value),
            "DXCC" => record.adif = json_number(value),
            "CQZ" => record.cq_zone = json_number(value),
            "Continent" => record.continent = json_text(value),
            "Lat" => record.latitude = json_number(value),
            "Lon" => record.longitude = json_number(value),
            _ => {}
        }
    }

    match record.adif {
        Some(0) | None => Err(LookupError::NoMatch),
        Some(_) => Ok(record),
    }
}

/// Stateless Club Log API backend
pub struct ClublogApi {
    http: Client,
    url: String,
    api_key: Option<String>,
}

impl ClublogApi {
    pub fn new(api_key: Option<String>, url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("dxlookup/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Transport(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            url: url.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Look up an already-normalized callsign as of `at`
    pub fn lookup(&self, callsign: &str, at: DateTime<Utc>) -> Result<Record> {
        let api_key = self.api_key.as_deref().ok_or(LookupError::CredentialMissing)?;

        let mut params: Vec<(&str, String)> = api_time_params(at).to_vec();
        params.push(("api", api_key.to_string()));
        params.push(("full", "1".to_string()));
        params.push(("call", callsign.to_string()));

        log::debug!("Querying Club Log API for {} at {}", callsign, at);

        let response = self.http.get(&self.url).query(&params).send()?;
        let status = response.status();
        let body = response.text()?;

        check_response(status, &body)?;
        map_api_response(&body)
    }
}

/// Truncate a string for error messages
fn truncate_string(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        None => s.to_string(),
        Some((idx, _)) => format!("{}...", &s[..idx]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_full_response() {
        let body = r#"{"Name":"Palau","DXCC":22,"CQZ":27,"Continent":"OC","Lat":7.5,"Lon":134.5}"#;
        let record = map_api_response(body).unwrap();
        assert_eq!(record.country.as_deref(), Some("Palau"));
        assert_eq!(record.adif, Some(22));
        assert_eq!(record.cq_zone, Some(27));
        assert_eq!(record.continent.as_deref(), Some("OC"));
        assert_eq!(record.latitude, Some(7.5));
        assert_eq!(record.longitude, Some(134.5));
        assert!(record.window.is_unbounded());
    }

    #[test]
    fn test_map_string_numbers() {
        let body = r#"{"Name":"Germany","DXCC":"230","CQZ":"14","Continent":"EU","Lat":"51.0","Lon":"10.0"}"#;
        let record = map_api_response(body).unwrap();
        assert_eq!(record.adif, Some(230));
        assert_eq!(record.cq_zone, Some(14));
        assert_eq!(record.longitude, Some(10.0));
    }

    #[test]
    fn test_unknown_entity_is_no_match() {
        let body = r#"{"Name":"Unknown","DXCC":0,"CQZ":0,"Continent":"","Lat":0,"Lon":0}"#;
        assert!(map_api_response(body).unwrap_err().is_no_match());
    }

    #[test]
    fn test_garbage_response_is_transport_error() {
        assert!(matches!(
            map_api_response("<html>oops</html>"),
            Err(LookupError::Transport(_))
        ));
    }

    #[test]
    fn test_check_response() {
        assert!(check_response(StatusCode::OK, "{}").is_ok());
        assert!(matches!(
            check_response(StatusCode::BAD_REQUEST, "Invalid or missing API Key\n"),
            Err(LookupError::CredentialMissing)
        ));
        assert!(matches!(
            check_response(StatusCode::FORBIDDEN, "<html>403 Forbidden</html>"),
            Err(LookupError::Transport(_))
        ));
        assert!(matches!(
            check_response(
                StatusCode::FORBIDDEN,
                "Access to this form requires a valid API key. For more info see: http://www.clublog.org/need_api.php"
            ),
            Err(LookupError::CredentialMissing)
        ));
        assert!(matches!(
            check_response(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            Err(LookupError::Transport(_))
        ));
    }

    #[test]
    fn test_missing_key_fails_before_request() {
        // Unroutable URL: reaching the network would surface as Transport
        let api = ClublogApi::new(None, "http://127.0.0.1:9/dxcc", Duration::from_secs(1)).unwrap();
        let err = api.lookup("W1AW", Utc::now()).unwrap_err();
        assert!(matches!(err, LookupError::CredentialMissing));

        let blank =
            ClublogApi::new(Some("  ".into()), CLUBLOG_API_URL, Duration::from_secs(1)).unwrap();
        assert!(matches!(
            blank.lookup("W1AW", Utc::now()),
            Err(LookupError::CredentialMissing)
        ));
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("abcdefgh", 3), "abc...");
    }
}
