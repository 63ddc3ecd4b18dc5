//! HTTP client for the game server.

use std::time::Duration;

use nline_core::{
    DeviceId, DeviceInfo, DeviceListResponse, ErrorBody, MatchAssignment, MatchId, MatchRequest,
    MatchState, MoveRequest, MoveResponse, RegisterRequest, RegisterResponse, SurrenderRequest,
    WaitingResponse, WaitingStatus,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// User agent for game requests.
const USER_AGENT_VALUE: &str = concat!("nline-client/", env!("CARGO_PKG_VERSION"));

/// Timeout of the health check.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// First retry delay; doubles per attempt.
const BASE_BACKOFF: Duration = Duration::from_millis(250);

/// Upper bound for a single retry delay.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Result of `POST /matches`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Paired immediately.
    Matched(MatchAssignment),
    /// Queued; poll the waiting status.
    Waiting { message: String },
}

/// Game server client.
#[derive(Debug, Clone)]
pub struct GameClient {
    /// HTTP client.
    client: reqwest::Client,

    /// Base URL without trailing slash.
    base_url: String,

    /// Parsed base URL that endpoint paths are appended to.
    base: Url,

    /// Configuration.
    config: ClientConfig,
}

impl GameClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let base = Url::parse(&config.url).map_err(|e| ClientError::Config {
            message: format!("invalid server url {:?}: {}", config.url, e),
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::Config {
                message: format!("server url {:?} cannot hold a path", config.url),
            });
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(default_headers)
            .build()
            .map_err(|e| ClientError::Config {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        let base_url = config.url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            base,
            config,
        })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// List connected devices.
    pub async fn list_devices(&self) -> ClientResult<Vec<DeviceId>> {
        let url = self.endpoint(&["devices"])?;
        debug!(url = %url, "listing devices");
        let response: DeviceListResponse = self.get_json(url).await?;
        debug!(count = response.connected_devices.len(), "devices listed");
        Ok(response.connected_devices)
    }

    /// Register this device and return its id.
    pub async fn register(&self, alias: Option<&str>) -> ClientResult<DeviceId> {
        let url = self.endpoint(&["devices"])?;
        let body = RegisterRequest {
            alias: alias.map(str::to_string),
        };
        let response = self.post(url, &body).await?;
        let registered: RegisterResponse = parse_json(response, "register response").await?;
        debug!(device_id = %registered.device_id, "device registered");
        Ok(registered.device_id)
    }

    /// Global stats of a device.
    pub async fn stats(&self, device_id: &DeviceId) -> ClientResult<DeviceInfo> {
        let url = self.endpoint(&["devices", device_id.as_str(), "info"])?;
        self.get_json(url).await
    }

    /// Ask for a match on a `size`×`size` board.
    pub async fn search_match(&self, device_id: &DeviceId, size: usize) -> ClientResult<SearchOutcome> {
        let url = self.endpoint(&["matches"])?;
        debug!(device_id = %device_id, size, "searching for match");
        let body = MatchRequest {
            device_id: device_id.clone(),
            size: i64::try_from(size).ok(),
        };
        let response = self.post(url, &body).await?;

        if response.status() == StatusCode::ACCEPTED {
            let waiting: WaitingResponse = parse_json(response, "waiting response").await?;
            debug!(message = %waiting.message, "waiting for opponent");
            return Ok(SearchOutcome::Waiting {
                message: waiting.message,
            });
        }
        let assignment: MatchAssignment = parse_json(response, "match assignment").await?;
        debug!(match_id = %assignment.match_id, "match found");
        Ok(SearchOutcome::Matched(assignment))
    }

    /// Whether the device has been paired yet.
    pub async fn waiting_status(&self, device_id: &DeviceId) -> ClientResult<WaitingStatus> {
        let mut url = self.endpoint(&["matches", "waiting-status"])?;
        url.query_pairs_mut().append_pair("device_id", device_id.as_str());
        self.get_json(url).await
    }

    /// Current state of a match.
    pub async fn match_state(&self, match_id: &MatchId) -> ClientResult<MatchState> {
        let url = self.endpoint(&["matches", match_id.as_str()])?;
        self.get_json(url).await
    }

    /// Play at `(x, y)`. Never retried, so a move is applied at most once.
    pub async fn make_move(
        &self,
        match_id: &MatchId,
        device_id: &DeviceId,
        x: usize,
        y: usize,
    ) -> ClientResult<MoveResponse> {
        let url = self.endpoint(&["matches", match_id.as_str(), "moves"])?;
        debug!(match_id = %match_id, x, y, "sending move");
        let body = MoveRequest {
            device_id: device_id.clone(),
            x,
            y,
        };
        let response = self.post(url, &body).await?;
        parse_json(response, "move response").await
    }

    /// Concede the match.
    pub async fn surrender(&self, match_id: &MatchId, device_id: &DeviceId) -> ClientResult<MoveResponse> {
        let url = self.endpoint(&["matches", match_id.as_str(), "surrender"])?;
        debug!(match_id = %match_id, "surrendering");
        let body = SurrenderRequest {
            device_id: device_id.clone(),
        };
        let response = self.post(url, &body).await?;
        parse_json(response, "surrender response").await
    }

    /// Whether the server answers at all; never errors.
    pub async fn check_health(&self) -> bool {
        let Ok(url) = self.endpoint(&["devices"]) else {
            return false;
        };
        match self.client.get(url).timeout(HEALTH_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "health check failed");
                false
            }
        }
    }

    /// Base URL plus percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Config {
                message: format!("server url {:?} cannot hold a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ClientResult<T> {
        let what = url.path().to_string();
        let response = self.request(Method::GET, url).await?;
        parse_json(response, &what).await
    }

    /// GET with retry for transient failures.
    async fn request(&self, method: Method, url: Url) -> ClientResult<reqwest::Response> {
        let mut retries = 0;
        let max_retries = self.config.max_retries;

        loop {
            let result = self.request_once(self.client.request(method.clone(), url.clone())).await;

            match result {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && retries < max_retries => {
                    retries += 1;

                    let backoff = match &e {
                        ClientError::RateLimited {
                            retry_after: Some(after),
                        } => *after,
                        _ => BASE_BACKOFF.saturating_mul(2u32.saturating_pow(retries - 1)),
                    }
                    .min(MAX_BACKOFF);

                    warn!(
                        error = %e,
                        retry = retries,
                        max_retries = max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying request"
                    );

                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// POST a JSON body once.
    async fn post<B: Serialize>(&self, url: Url, body: &B) -> ClientResult<reqwest::Response> {
        self.request_once(self.client.post(url).json(body)).await
    }

    /// Send without retry and map error statuses.
    async fn request_once(&self, request: reqwest::RequestBuilder) -> ClientResult<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();

        match status.as_u16() {
            200..=299 => Ok(response),

            400 => Err(ClientError::BadRequest {
                message: error_message(response).await,
            }),

            403 => Err(ClientError::NotYourTurn),

            404 => Err(ClientError::NotFound {
                message: error_message(response).await,
            }),

            429 => {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs);

                Err(ClientError::RateLimited { retry_after })
            }

            code => Err(ClientError::Http {
                status: code,
                message: error_message(response).await,
            }),
        }
    }
}

/// Server message from an error response: `message` field, then raw body, then status.
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    if let Ok(body) = serde_json::from_str::<ErrorBody>(&text) {
        return body.message;
    }
    if text.trim().is_empty() {
        format!("Error {}", status)
    } else {
        text
    }
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> ClientResult<T> {
    response
        .json()
        .await
        .map_err(|e| ClientError::InvalidResponse {
            message: format!("failed to parse {}: {}", what, e),
        })
}
