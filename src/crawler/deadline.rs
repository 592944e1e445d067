//! Hard deadline around a transfer
//!
//! The HTTP client's own timeouts only bound individual stalls, so a server
//! that trickles bytes can hold a transfer open indefinitely. The transfer is
//! spawned on its own task and the caller waits at most the deadline. A task
//! that misses the deadline is abandoned and keeps running until the client
//! gives up on it.

use crate::response::ResponseModel;
use crate::status;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::warn;

/// Runs `transfer` on a separate task and waits at most `timeout` for it
pub async fn run_with_deadline<F>(url: &str, timeout: Duration, transfer: F) -> ResponseModel
where
    F: Future<Output = ResponseModel> + Send + 'static,
{
    let started = Instant::now();
    let handle = tokio::spawn(transfer);

    let mut response = match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(response)) => response,
        Ok(Err(join_error)) => ResponseModel::failure(
            url,
            status::HTTP_STATUS_CODE_EXCEPTION,
            format!("Url:{} Crawler exception: {}", url, join_error),
        ),
        Err(_) => {
            warn!("Url:{} Abandoning transfer after {:?}", url, timeout);
            ResponseModel::failure(
                url,
                status::HTTP_STATUS_CODE_TIMEOUT,
                format!("Url:{} Page timeout", url),
            )
        }
    };

    if response.crawl_time.is_none() {
        response.crawl_time = Some(started.elapsed());
    }
    response
}
