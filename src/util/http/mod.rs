use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use once_cell::sync::{Lazy, OnceCell};
use reqwest::{header, Client, Method, RequestBuilder, Response};
use tokio::sync::Semaphore;

use crate::logging::Logger;

pub mod user_agent;

/// Limits concurrent requests so the target site does not ban us.
static SEMAPHORE: Lazy<Semaphore> = Lazy::new(|| Semaphore::new(5));

/// A singleton instance of the reqwest client.
static CLIENT: OnceCell<Client> = OnceCell::new();

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("http"));

/// Maximum retry attempts for a failed request.
const MAX_RETRIES: usize = 2;

/// Returns the reqwest client singleton instance or creates one if it doesn't
/// exist.
fn get_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .brotli(true)
            .gzip(true)
            .connect_timeout(Duration::from_secs(8))
            .timeout(Duration::from_secs(15))
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            .pool_max_idle_per_host(20)
            .pool_idle_timeout(Duration::from_secs(90))
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .referer(true)
            .user_agent(user_agent::gen_random_ua())
            .build()
            .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))
    })
}

/// Performs an HTTP GET request and returns the response as text.
///
/// # Arguments
///
/// * `url`: The URL to send the GET request to.
/// * `headers`: An optional set of headers to include with the request.
///
/// # Returns
///
/// * `Result<String>`: The response text, or an error if the request fails or
///   the response cannot be parsed.
pub async fn get(url: &str, headers: Option<header::HeaderMap>) -> Result<String> {
    send(Method::GET, url, headers)
        .await?
        .text()
        .await
        .map_err(|e| anyhow!("Error parsing response text: {:?}", e))
}

/// Sends an HTTP request with bounded retries.
///
/// A failed attempt is logged and retried after an exponentially growing
/// delay, up to [`MAX_RETRIES`] attempts in total.
async fn send(
    method: Method,
    url: &str,
    headers: Option<header::HeaderMap>,
) -> Result<Response> {
    let visit_log = format!("{method}:{url}");
    let client = get_client()?;
    let mut rb: RequestBuilder = client.request(method, url);
    let mut last_error = String::new();

    if let Some(h) = headers {
        rb = rb.headers(h);
    }

    for attempt in 1..=MAX_RETRIES {
        let msg = format!("Attempt {} to send {}", attempt, visit_log);
        let rb_clone = rb
            .try_clone()
            .ok_or_else(|| anyhow!("Failed to clone RequestBuilder"))?;
        let permit = SEMAPHORE.acquire().await;
        let start = Instant::now();
        let res = rb_clone.send().await;
        let elapsed = start.elapsed().as_millis();

        // Request pacing, keeps us under the site's rate limits.
        tokio::time::sleep(Duration::from_millis(300)).await;
        drop(permit);

        match res {
            Ok(response) => {
                LOGGER.info(format!("{} {} ms", msg, elapsed));
                return Ok(response);
            }
            Err(why) => {
                last_error = format!("{:?}", why);
                LOGGER.error(format!("{} failed because {:?}. {} ms", msg, why, elapsed));
                if attempt < MAX_RETRIES {
                    tokio::time::sleep(Duration::from_secs(2u64.pow(attempt as u32))).await;

                    continue;
                }
            }
        }
    }

    Err(anyhow!(
        "Failed to send request to {} after {} attempts; last error: {}",
        url,
        MAX_RETRIES,
        last_error
    ))
}
