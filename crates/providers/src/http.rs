//! Shared plumbing for the HTTP service clients.

use finsight_core::ServiceError;

/// Map a response status to the service error taxonomy. Returns `Ok`
/// only for 200.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status().as_u16();

    if status == 429 {
        let retry_after_secs = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        return Err(ServiceError::RateLimited { retry_after_secs });
    }

    if status == 401 || status == 403 {
        return Err(ServiceError::AuthenticationFailed(
            "invalid API key or insufficient permissions".into(),
        ));
    }

    if status != 200 {
        let message = response.text().await.unwrap_or_default();
        return Err(ServiceError::ApiError {
            status_code: status,
            message,
        });
    }

    Ok(response)
}

pub(crate) fn network(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout(e.to_string())
    } else {
        ServiceError::Network(e.to_string())
    }
}

pub(crate) fn build_client(timeout: std::time::Duration) -> Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ServiceError::NotConfigured(format!("failed to build HTTP client: {e}")))
}
