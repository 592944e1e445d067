//! Direct HTTP crawler

use crate::crawler::{check_response, decode_body, run_with_deadline, Crawler};
use crate::request::RequestSpec;
use crate::response::ResponseModel;
use crate::status;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, Proxy};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Upper bound for establishing a connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest redirect chain followed
const MAX_REDIRECTS: usize = 10;

/// Client settings that can't be changed per request
#[derive(Debug, Clone, PartialEq, Eq)]
struct ClientSettings {
    proxy: Option<String>,
    ssl_verify: bool,
    connect_timeout: Duration,
}

impl ClientSettings {
    fn for_request(request: &RequestSpec) -> Self {
        Self {
            proxy: request.proxy.clone(),
            ssl_verify: request.ssl_verify,
            connect_timeout: CONNECT_TIMEOUT.min(request.timeout),
        }
    }
}

/// Builds an HTTP client for a request's transport settings
///
/// Only the connect timeout is set on the client; the total deadline is
/// enforced by [`run_with_deadline`].
pub fn build_http_client(request: &RequestSpec) -> Result<Client, reqwest::Error> {
    client_for_settings(&ClientSettings::for_request(request))
}

fn client_for_settings(settings: &ClientSettings) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .connect_timeout(settings.connect_timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .danger_accept_invalid_certs(!settings.ssl_verify)
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = &settings.proxy {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    builder.build()
}

/// Fetches pages with `reqwest`
///
/// The client is built on first use and reused while the transport settings
/// stay the same.
#[derive(Debug, Default)]
pub struct HttpCrawler {
    client: Mutex<Option<(ClientSettings, Client)>>,
}

impl HttpCrawler {
    pub const NAME: &'static str = "HttpCrawler";

    pub fn new() -> Self {
        Self::default()
    }

    fn client_for(&self, request: &RequestSpec) -> Result<Client, reqwest::Error> {
        let settings = ClientSettings::for_request(request);
        let mut cached = self.client.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((cached_settings, client)) = cached.as_ref() {
            if *cached_settings == settings {
                return Ok(client.clone());
            }
        }
        let client = client_for_settings(&settings)?;
        *cached = Some((settings, client.clone()));
        Ok(client)
    }
}

#[async_trait]
impl Crawler for HttpCrawler {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, request: &RequestSpec) -> ResponseModel {
        let url = request.url.clone();
        debug!("HttpCrawler: {}", request);

        let client = match self.client_for(request) {
            Ok(client) => client,
            Err(e) => {
                return ResponseModel::failure(
                    &url,
                    status::HTTP_STATUS_CODE_EXCEPTION,
                    format!("Url:{} Cannot build HTTP client: {}", url, e),
                )
            }
        };

        let request = request.clone();
        run_with_deadline(&url, request.timeout, transfer(client, request)).await
    }

    fn close(&self) {
        let mut cached = self.client.lock().unwrap_or_else(|e| e.into_inner());
        *cached = None;
    }
}

/// One complete transfer: headers, policy checks, body
async fn transfer(client: Client, request: RequestSpec) -> ResponseModel {
    let started = Instant::now();
    let url = request.url.as_str();

    let mut builder = if request.ping {
        client.head(url)
    } else {
        client.get(url)
    };
    if let Some(user_agent) = &request.user_agent {
        builder = builder.header(reqwest::header::USER_AGENT, user_agent);
    }
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if !request.cookies.is_empty() {
        let cookie = request
            .cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        builder = builder.header(reqwest::header::COOKIE, cookie);
    }

    let mut http_response = match builder.send().await {
        Ok(response) => response,
        Err(e) => return transport_failure(url, &e),
    };

    let mut response = ResponseModel::new(url, http_response.status().as_u16());
    response.url = http_response.url().to_string();
    for (name, value) in http_response.headers() {
        if let Ok(value) = value.to_str() {
            response.headers.insert(name.as_str(), value);
        }
    }

    if request.ping || !check_response(&mut response, &request) {
        response.crawl_time = Some(started.elapsed());
        return response;
    }

    let mut body = Vec::new();
    loop {
        match http_response.chunk().await {
            Ok(Some(chunk)) => {
                body.extend_from_slice(&chunk);
                if let Some(limit) = request.bytes_limit {
                    if body.len() as u64 > limit {
                        response.status_code = status::HTTP_STATUS_CODE_FILE_TOO_BIG;
                        response.add_error(format!(
                            "Url:{} Page is too big: exceeded {} bytes",
                            url, limit
                        ));
                        response.crawl_time = Some(started.elapsed());
                        return response;
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                let failure = transport_failure(url, &e);
                response.status_code = failure.status_code;
                response.errors.extend(failure.errors);
                response.crawl_time = Some(started.elapsed());
                return response;
            }
        }
    }

    if response.headers.is_text() {
        let (text, encoding) = decode_body(&body, response.headers.charset().as_deref());
        response.text = Some(text);
        response.encoding = Some(encoding);
    } else {
        response.binary = Some(body);
    }

    response.crawl_time = Some(started.elapsed());
    debug!(
        "Url:{} Status:{} Time:{:?}",
        response.url, response.status_code, response.crawl_time
    );
    response
}

/// Maps a `reqwest` error onto one of the internal failure codes
fn transport_failure(url: &str, error: &reqwest::Error) -> ResponseModel {
    let (code, kind) = if error.is_timeout() {
        (status::HTTP_STATUS_CODE_TIMEOUT, "Page timeout")
    } else if error.is_connect() {
        (status::HTTP_STATUS_CODE_CONNECTION_ERROR, "Connection error")
    } else {
        (status::HTTP_STATUS_CODE_EXCEPTION, "Crawler exception")
    };
    ResponseModel::failure(url, code, format!("Url:{} {}: {}", url, kind, error))
}
