//! Bounded-concurrency batch execution
//!
//! Runs one operation per URL, at most `concurrency` at a time, and returns one
//! envelope per input URL in input order. Faults and panics inside an
//! operation are contained to that URL's slot.

use crate::envelope::{Outcome, ResultEnvelope};
use crate::error::Fault;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Run `op` for every URL with at most `concurrency` operations in flight.
///
/// A `concurrency` of zero is treated as one. The returned vector always has
/// `urls.len()` entries and entry `i` belongs to `urls[i]`.
pub async fn run_batch<F, Fut>(urls: &[String], concurrency: usize, op: F) -> Vec<ResultEnvelope>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Outcome>,
{
    let limit = concurrency.max(1);
    let gate = Semaphore::new(limit);

    info!(urls = urls.len(), concurrency = limit, "Starting batch");

    let mut pending: FuturesUnordered<_> = urls
        .iter()
        .enumerate()
        .map(|(index, url)| run_one(&gate, &op, index, url))
        .collect();

    let mut slots: Vec<Option<ResultEnvelope>> = vec![None; urls.len()];
    while let Some((index, envelope)) = pending.next().await {
        slots[index] = Some(envelope);
    }

    let results: Vec<ResultEnvelope> = slots
        .into_iter()
        .zip(urls)
        .map(|(slot, url)| {
            slot.unwrap_or_else(|| {
                ResultEnvelope::failure(url, &Fault::Other("Operation did not complete".into()))
            })
        })
        .collect();

    let ok = results.iter().filter(|r| r.is_success()).count();
    info!(ok, failed = results.len() - ok, "Batch done");

    results
}

async fn run_one<F, Fut>(
    gate: &Semaphore,
    op: &F,
    index: usize,
    url: &str,
) -> (usize, ResultEnvelope)
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Outcome>,
{
    let outcome = match gate.acquire().await {
        Ok(_permit) => {
            debug!(index, url, "Running operation");
            // Covers panics while building the future as well as while polling it
            AssertUnwindSafe(async { op(url.to_string()).await })
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(Fault::from_panic(panic)))
        }
        Err(_) => Err(Fault::Other("Concurrency gate closed".into())),
    };

    if let Err(fault) = &outcome {
        warn!(index, url, kind = %fault.kind(), error = %fault, "URL failed");
    }

    (index, ResultEnvelope::from_outcome(url, outcome))
}
