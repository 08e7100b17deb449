// Request plumbing shared by every proxy operation: URL construction,
// auth and referrer decoration, device error extraction.

use reqwest::Method;
use reqwest::header::REFERER;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use super::DeviceProxy;
use crate::auth::{AuthMode, DEVICE_GROUP_HEADER, IDENTIFIED_DEVICE_HEADER};
use crate::error::Error;

/// Error body returned by the device on non-success responses.
#[derive(Deserialize)]
struct DeviceErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Read a response body, turning non-success statuses into [`Error::Device`].
///
/// The device reports failures as `{"code": n, "message": "..."}`; the
/// message is kept verbatim so callers can match on it. Bodies that are
/// not in that shape are used as the message as-is.
pub async fn read_response(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    if status.is_success() {
        trace!(%status, body = %body, "response");
        return Ok(body);
    }

    let message = serde_json::from_str::<DeviceErrorBody>(&body)
        .ok()
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if body.is_empty() {
                format!("HTTP {status}")
            } else {
                body.clone()
            }
        });

    Err(Error::Device {
        status: status.as_u16(),
        message,
    })
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}

impl DeviceProxy {
    // ── URL builders ─────────────────────────────────────────────────

    /// Resolve an endpoint path (optionally with a query) against this
    /// proxy's base URL.
    pub(crate) fn url(&self, path_and_query: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path_and_query)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self
            .ctx
            .http
            .request(method, url)
            .header(REFERER, self.ctx.referrer.as_str());

        match &self.auth {
            AuthMode::Basic {
                credential: Some(credential),
            } => builder.basic_auth(
                &credential.username,
                Some(credential.password.expose_secret()),
            ),
            AuthMode::Basic { credential: None } => builder,
            AuthMode::Trust { group } => {
                let builder = builder.header(IDENTIFIED_DEVICE_HEADER, "true");
                match group {
                    Some(group) => builder.header(DEVICE_GROUP_HEADER, group),
                    None => builder,
                }
            }
        }
    }

    /// Send a GET request and deserialize the response.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);

        let resp = self.request(Method::GET, url).send().await?;
        parse_json(&read_response(resp).await?)
    }

    /// Send a request with a JSON body and deserialize the response.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("{} {}", method, url);

        let resp = self.request(method, url).json(body).send().await?;
        parse_json(&read_response(resp).await?)
    }

    /// Send a request with a JSON body, discarding the response payload.
    pub(crate) async fn execute(
        &self,
        method: Method,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("{} {}", method, url);

        let resp = self.request(method, url).json(body).send().await?;
        read_response(resp).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialization_error_keeps_body_preview() {
        let err = parse_json::<serde_json::Value>("not json").err();
        match err {
            Some(Error::Deserialization { message, body }) => {
                assert!(message.contains("body preview"));
                assert_eq!(body, "not json");
            }
            other => panic!("expected deserialization error, got {other:?}"),
        }
    }
}
