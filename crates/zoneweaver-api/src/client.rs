// Zoneweaver API HTTP client
//
// Wraps `reqwest::Client` with URL construction and `{ success, data,
// message }` envelope unwrapping. Endpoint groups (network inventory,
// system administration, time sync) are implemented as inherent methods
// in separate files to keep this module focused on transport mechanics.

use std::time::Duration;

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{ActionOutcome, ApiResponse};
use crate::transport::TransportConfig;

/// Raw HTTP client for one host's Zoneweaver API.
///
/// All methods return the unwrapped `data` payload -- the envelope is
/// stripped before the caller sees it. A response with `success: false`
/// becomes [`Error::Api`] carrying the server's `message`.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    /// Request timeout baked into `http`, when known.
    timeout: Option<Duration>,
}

impl ApiClient {
    /// Create a client that authenticates with a bearer API key.
    ///
    /// `base_url` is the API root of the host (e.g. `https://omnios01:5001`).
    pub fn new(
        base_url: Url,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_authenticated_client(api_key)?;
        Ok(Self {
            http,
            base_url: normalize_base(base_url),
            timeout: Some(transport.timeout),
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    ///
    /// Used by tests and by callers that manage their own headers.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        Ok(Self {
            http,
            base_url: normalize_base(base_url),
            timeout: None,
        })
    }

    /// The host's API root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Resolve an API path (e.g. `system/packages`) against the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Resolve `path` and append one percent-encoded segment per entry in
    /// `segments` (resource names such as a BE or publisher).
    pub(crate) fn url_segments(&self, path: &str, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.url(path)?;
        {
            let mut segs = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            segs.pop_if_empty();
            for s in segments {
                segs.push(s);
            }
        }
        Ok(url)
    }

    /// Resolve an API path and append query parameters, skipping `None`s.
    pub(crate) fn url_with_query(
        &self,
        path: &str,
        params: &[(&str, Option<String>)],
    ) -> Result<Url, Error> {
        let mut url = self.url(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                if let Some(v) = value {
                    pairs.append_pair(key, v);
                }
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a request, reporting an elapsed timeout as [`Error::Timeout`].
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        req.send().await.map_err(|e| match self.timeout {
            Some(timeout) if e.is_timeout() => Error::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            _ => Error::Transport(e),
        })
    }

    /// Send a GET request and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.send(self.http.get(url)).await?;
        let envelope = parse_envelope(resp).await?;
        decode_data(envelope.data)
    }

    /// Send a GET request whose payload is a list, either bare or wrapped
    /// in an object under `key`.
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        url: Url,
        key: &str,
    ) -> Result<Vec<T>, Error> {
        debug!("GET {} (list: {key})", url);
        let resp = self.send(self.http.get(url)).await?;
        let envelope = parse_envelope(resp).await?;
        decode_list(envelope.data, key)
    }

    /// Send a POST request with JSON body and unwrap the envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("POST {}", url);
        let resp = self.send(self.http.post(url).json(body)).await?;
        let envelope = parse_envelope(resp).await?;
        decode_data(envelope.data)
    }

    /// Send a POST request and keep the server's message alongside the data.
    pub(crate) async fn post_action(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<ActionOutcome, Error> {
        debug!("POST {} (action)", url);
        let resp = self.send(self.http.post(url).json(body)).await?;
        let envelope = parse_envelope(resp).await?;
        Ok(ActionOutcome {
            message: envelope.message,
            data: envelope.data,
        })
    }

    /// Send a PUT request and keep the server's message alongside the data.
    pub(crate) async fn put_action(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<ActionOutcome, Error> {
        debug!("PUT {}", url);
        let resp = self.send(self.http.put(url).json(body)).await?;
        let envelope = parse_envelope(resp).await?;
        Ok(ActionOutcome {
            message: envelope.message,
            data: envelope.data,
        })
    }

    /// Send a DELETE request and keep the server's message alongside the data.
    pub(crate) async fn delete_action(&self, url: Url) -> Result<ActionOutcome, Error> {
        debug!("DELETE {}", url);
        let resp = self.send(self.http.delete(url)).await?;
        let envelope = parse_envelope(resp).await?;
        Ok(ActionOutcome {
            message: envelope.message,
            data: envelope.data,
        })
    }
}

// ── Envelope handling ────────────────────────────────────────────────

/// `Url::join` drops the last path segment unless the base ends in `/`.
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Parse the `{ success, data, message }` envelope.
///
/// Returns the envelope on success, `Error::Authentication` on 401/403,
/// and `Error::Api` when the status is non-2xx or `success` is false.
async fn parse_envelope(resp: reqwest::Response) -> Result<ApiResponse, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiResponse>(&body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| "missing or invalid API key".into());
        return Err(Error::Authentication { message });
    }

    let body = resp.text().await?;

    let envelope: ApiResponse = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => {
            return Err(Error::Deserialization {
                message: e.to_string(),
                body,
            });
        }
        Err(_) => {
            return Err(Error::Api {
                message: if body.trim().is_empty() {
                    format!("request failed with HTTP {}", status.as_u16())
                } else {
                    body
                },
                status: status.as_u16(),
            });
        }
    };

    if !status.is_success() || !envelope.success {
        return Err(Error::Api {
            message: envelope
                .message
                .unwrap_or_else(|| format!("request failed with HTTP {}", status.as_u16())),
            status: status.as_u16(),
        });
    }

    Ok(envelope)
}

fn decode_data<T: DeserializeOwned>(data: Value) -> Result<T, Error> {
    T::deserialize(&data).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: data.to_string(),
    })
}

/// Decode a list payload that may be a bare array or an object wrapping
/// the array under `key`. Any other shape is treated as an empty list.
pub(crate) fn decode_list<T: DeserializeOwned>(data: Value, key: &str) -> Result<Vec<T>, Error> {
    let items = match data {
        Value::Array(_) => data,
        Value::Object(mut map) => match map.remove(key) {
            Some(inner @ Value::Array(_)) => inner,
            _ => {
                debug!(key, "list payload missing; treating as empty");
                return Ok(Vec::new());
            }
        },
        _ => return Ok(Vec::new()),
    };
    Vec::<T>::deserialize(&items).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: items.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = normalize_base(Url::parse("https://host:5001/api").unwrap());
        assert_eq!(url.as_str(), "https://host:5001/api/");
        assert_eq!(
            url.join("system/packages").unwrap().as_str(),
            "https://host:5001/api/system/packages"
        );
    }

    #[test]
    fn url_segments_percent_encodes_names() {
        let client =
            ApiClient::from_reqwest("https://host:5001", reqwest::Client::new()).unwrap();
        let url = client
            .url_segments("system/boot-environments", &["be 2024", "mount"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://host:5001/system/boot-environments/be%202024/mount"
        );
    }

    #[test]
    fn decode_list_accepts_bare_array() {
        let items: Vec<String> = decode_list(json!(["a", "b"]), "names").unwrap();
        assert_eq!(items, vec!["a", "b"]);
    }

    #[test]
    fn decode_list_unwraps_named_key() {
        let items: Vec<u32> = decode_list(json!({ "vids": [1, 2, 3], "total": 3 }), "vids").unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn decode_list_degrades_to_empty() {
        let items: Vec<u32> = decode_list(json!({ "other": [1] }), "vids").unwrap();
        assert!(items.is_empty());
        let items: Vec<u32> = decode_list(Value::Null, "vids").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn decode_list_reports_bad_items() {
        let err = decode_list::<u32>(json!(["not-a-number"]), "vids").unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }
}
