//! Example demonstrating how retry policies classify failures.
//!
//! No network access needed: each scenario runs the retry loop over a
//! simulated sequence of errors.
//!
//! Run with: `cargo run --example retry_policy`

use http::StatusCode;
use radar_mapping_api::retry::{OrPredicate, RetryOnTransient, RetryUnlessQuotaExceeded};
use radar_mapping_api::{Error, RetryPolicy, RetryPredicate, RetryStrategy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn status(code: u16) -> Error {
    Error::HttpError {
        status: StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        raw_response: String::new(),
    }
}

async fn attempts_until_done(policy: &RetryPolicy, code: u16) -> usize {
    let calls = AtomicUsize::new(0);
    let result: Result<(), Error> = policy
        .run(|_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(status(code)) }
        })
        .await;
    if let Err(e) = result {
        println!("  {} -> {}", code, e);
    }
    calls.load(Ordering::SeqCst)
}

fn fast(predicate: Box<dyn RetryPredicate>) -> RetryPolicy {
    RetryPolicy::new(
        RetryStrategy::Linear {
            delay: Duration::from_millis(10),
            max_retries: 5,
        },
        predicate,
    )
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("radar_mapping_api=info,retry_policy=info")
        .init();

    println!("=== Default backoff schedule ===");
    let strategy = RetryStrategy::default();
    for retry in 1..=6 {
        println!("  retry {}: {:?}", retry, strategy.delay_for_attempt(retry));
    }
    println!();

    println!("=== Default predicate: everything but 402 ===");
    let lenient = fast(Box::new(RetryUnlessQuotaExceeded));
    for code in [402, 404, 500] {
        let attempts = attempts_until_done(&lenient, code).await;
        println!("  {} took {} attempt(s)", code, attempts);
    }
    println!();

    println!("=== Strict predicate: 429 and 5xx only ===");
    let strict = fast(Box::new(RetryOnTransient));
    for code in [402, 404, 429, 503] {
        let attempts = attempts_until_done(&strict, code).await;
        println!("  {} took {} attempt(s)", code, attempts);
    }
    println!();

    println!("=== Strict plus a bounded retry on 404 ===");
    let combined = fast(Box::new(OrPredicate::new(vec![
        Box::new(RetryOnTransient),
        Box::new(|e: &Error, attempt: usize| {
            attempt < 2 && e.status() == Some(StatusCode::NOT_FOUND)
        }),
    ])));
    let attempts = attempts_until_done(&combined, 404).await;
    println!("  404 took {} attempt(s)", attempts);
}
