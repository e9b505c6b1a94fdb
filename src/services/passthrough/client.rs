use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use serde_json::Value;
use thiserror::Error;

use crate::config::PassthroughConfig;
use crate::services::passthrough::lines::sse_lines;

/// Hop-by-hop headers that must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("upstream transport failure: {0}")]
    UpstreamTransport(#[from] reqwest::Error),
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("service credential is not a valid header value")]
    InvalidCredential,
}

/// An inbound request, already authorized, to be replayed against the backend.
#[derive(Debug)]
pub struct ForwardRequest {
    pub method: Method,
    // path below the backend root, without a leading slash
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Backend response as handed back to the HTTP layer.
pub enum Forwarded {
    Json { status: StatusCode, body: Value },
    Stream {
        status: StatusCode,
        lines: BoxStream<'static, Result<String, reqwest::Error>>,
    },
}

impl std::fmt::Debug for Forwarded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json { status, body } => f
                .debug_struct("Json")
                .field("status", status)
                .field("body", body)
                .finish(),
            Self::Stream { status, .. } => {
                f.debug_struct("Stream").field("status", status).finish()
            }
        }
    }
}

/// Forwards requests to the local model-serving gateway with the service credential.
#[derive(Clone)]
pub struct PassthroughClient {
    client: reqwest::Client,
    base_url: String,
    authorization: HeaderValue,
}

impl std::fmt::Debug for PassthroughClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the service credential
        f.debug_struct("PassthroughClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl PassthroughClient {
    pub fn new(client: reqwest::Client, config: &PassthroughConfig) -> Result<Self, ProxyError> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", config.litellm_key))
            .map_err(|_| ProxyError::InvalidCredential)?;
        authorization.set_sensitive(true);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            authorization,
        })
    }

    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        let path = path.trim_start_matches('/');
        match query {
            Some(q) if !q.is_empty() => format!("{}/{path}?{q}", self.base_url),
            _ => format!("{}/{path}", self.base_url),
        }
    }

    /// Inbound headers minus hop-by-hop/host/length, with `Authorization` replaced.
    pub fn forward_headers(&self, inbound: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(inbound.len() + 1);
        for (name, value) in inbound {
            if is_dropped(name) {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }
        headers.insert(header::AUTHORIZATION, self.authorization.clone());
        headers
    }

    pub async fn forward(&self, req: ForwardRequest) -> Result<Forwarded, ProxyError> {
        let url = self.target_url(&req.path, req.query.as_deref());
        let headers = self.forward_headers(&req.headers);

        if req.method == Method::GET {
            tracing::debug!(%url, "forwarding GET");
            let resp = self
                .client
                .request(Method::GET, &url)
                .headers(headers)
                .send()
                .await?;
            return json_response(resp).await;
        }

        // Anything but GET carries a JSON payload (possibly empty).
        let payload = parse_payload(&req.body)?;
        let streaming = payload.as_ref().is_some_and(wants_stream);

        let mut builder = self.client.request(req.method.clone(), &url).headers(headers);
        if let Some(payload) = &payload {
            builder = builder.json(payload);
        }

        tracing::debug!(%url, method = %req.method, streaming, "forwarding request");
        let resp = builder.send().await?;

        if streaming {
            let status = resp.status();
            let lines = sse_lines(resp.bytes_stream()).boxed();
            return Ok(Forwarded::Stream { status, lines });
        }

        json_response(resp).await
    }
}

fn is_dropped(name: &HeaderName) -> bool {
    let name = name.as_str();
    HOP_BY_HOP.contains(&name)
        || name == header::HOST.as_str()
        || name == header::CONTENT_LENGTH.as_str()
        || name == header::AUTHORIZATION.as_str()
}

fn parse_payload(body: &[u8]) -> Result<Option<Value>, ProxyError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| ProxyError::MalformedPayload(e.to_string()))
}

/// Truthiness of the payload's `stream` flag.
fn wants_stream(payload: &Value) -> bool {
    match payload.get("stream") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(Value::Null) | None => false,
    }
}

async fn json_response(resp: reqwest::Response) -> Result<Forwarded, ProxyError> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .map_err(|e| ProxyError::MalformedPayload(format!("upstream response: {e}")))?
    };
    Ok(Forwarded::Json { status, body })
}
