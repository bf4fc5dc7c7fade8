use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::{Method, RequestBuilder, Response, StatusCode};

use crate::error::BadgeKitError;

/// A thin wrapper on an HTTP client. Applies a timeout and user-agent, only allows HTTPS,
/// and retries transient failures with exponential backoff.
#[derive(Debug)]
pub struct Request {
    client: reqwest::Client,
    timeout: Duration,
    max_retries: u32,
}

impl Request {
    pub(crate) fn new(timeout: Duration, max_retries: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
            max_retries,
        }
    }

    /// Creates a request builder with defaults applied.
    pub(crate) fn req(
        &self,
        method: Method,
        url: &str,
    ) -> Result<RequestBuilder, BadgeKitError> {
        if cfg!(not(test)) && !url.starts_with("https") {
            return Err(BadgeKitError::InvalidInput {
                attribute: "url".to_string(),
                reason: format!("only https urls are allowed, got {url}"),
            });
        }

        Ok(self
            .client
            .request(method, url)
            .timeout(self.timeout)
            .header(
                "User-Agent",
                format!("badgekit-core/{}", env!("CARGO_PKG_VERSION")),
            ))
    }

    /// Creates a POST request builder with defaults applied.
    pub(crate) fn post(&self, url: &str) -> Result<RequestBuilder, BadgeKitError> {
        self.req(Method::POST, url)
    }

    /// Sends a request built by `req`/`post`, retrying transient failures.
    ///
    /// A 429 or 5xx that persists after the last retry is returned as an error.
    pub(crate) async fn handle(
        &self,
        request_builder: RequestBuilder,
    ) -> Result<Response, BadgeKitError> {
        let Some(template) = request_builder.try_clone() else {
            // streaming bodies cannot be replayed
            return send_once(request_builder)
                .await
                .map_err(AttemptError::into_error);
        };

        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(self.max_retries as usize);

        (|| async {
            let request_builder = template.try_clone().ok_or_else(|| {
                AttemptError::Fatal(BadgeKitError::Generic {
                    error: "request body cannot be replayed".to_string(),
                })
            })?;
            send_once(request_builder).await
        })
        .retry(backoff)
        .when(AttemptError::is_transient)
        .notify(|err, delay| {
            log::debug!("retrying request in {delay:?}: {}", err.error());
        })
        .await
        .map_err(AttemptError::into_error)
    }
}

/// A failed attempt, tagged with whether another attempt may succeed.
#[derive(Debug)]
enum AttemptError {
    Transient(BadgeKitError),
    Fatal(BadgeKitError),
}

impl AttemptError {
    const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    const fn error(&self) -> &BadgeKitError {
        match self {
            Self::Transient(error) | Self::Fatal(error) => error,
        }
    }

    fn into_error(self) -> BadgeKitError {
        match self {
            Self::Transient(error) | Self::Fatal(error) => error,
        }
    }
}

/// Rate limiting and server errors are worth another attempt; other statuses are handed
/// back to the caller as a response.
fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

async fn send_once(request_builder: RequestBuilder) -> Result<Response, AttemptError> {
    match request_builder.send().await {
        Ok(response) if is_transient_status(response.status()) => {
            Err(AttemptError::Transient(BadgeKitError::NetworkError {
                url: response.url().to_string(),
                status: Some(response.status().as_u16()),
                error: format!("server answered {}", response.status()),
            }))
        }
        Ok(response) => Ok(response),
        Err(err) if err.is_timeout() || err.is_connect() => {
            Err(AttemptError::Transient(err.into()))
        }
        Err(err) => Err(AttemptError::Fatal(err.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sets_user_agent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/attest")
            .match_header(
                "user-agent",
                format!("badgekit-core/{}", env!("CARGO_PKG_VERSION")).as_str(),
            )
            .with_status(200)
            .create_async()
            .await;

        let request = Request::new(Duration::from_secs(5), 0);
        let builder = request.post(&format!("{}/attest", server.url())).unwrap();
        let response = request.handle(builder).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/attest")
            .with_status(500)
            .expect(2)
            .create_async()
            .await;

        let request = Request::new(Duration::from_secs(5), 1);
        let builder = request.post(&format!("{}/attest", server.url())).unwrap();
        let err = request.handle(builder).await.unwrap_err();

        mock.assert_async().await;
        match err {
            BadgeKitError::NetworkError { status, .. } => assert_eq!(status, Some(500)),
            other => panic!("expected NetworkError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/attest")
            .with_status(400)
            .expect(1)
            .create_async()
            .await;

        let request = Request::new(Duration::from_secs(5), 3);
        let builder = request.post(&format!("{}/attest", server.url())).unwrap();
        let response = request.handle(builder).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status().as_u16(), 400);
    }

    #[test]
    fn test_transient_statuses() {
        assert!(is_transient_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient_status(StatusCode::BAD_GATEWAY));
        assert!(!is_transient_status(StatusCode::NOT_FOUND));
        assert!(!is_transient_status(StatusCode::OK));
    }
}
