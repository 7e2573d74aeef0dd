use futures::stream::{self, StreamExt};

use super::{Limits, Outcome, StreamFeed, run_one};
use crate::transport::Transport;

/// Drives every target from one control loop.
///
/// At most `max_concurrency` targets are in flight (all of them when `None`);
/// each starts its deadline when it enters the in-flight set. Outcomes come
/// back in input order.
pub async fn run_concurrent<T: Transport>(
    transport: &T,
    targets: Vec<String>,
    limits: Limits,
    max_concurrency: Option<usize>,
) -> Vec<Outcome> {
    if targets.is_empty() {
        return Vec::new();
    }
    let in_flight = max_concurrency.unwrap_or(targets.len()).max(1);

    let mut finished: Vec<(usize, Outcome)> = stream::iter(targets.into_iter().enumerate())
        .map(|(index, target)| {
            let key = target.clone();
            async move {
                let outcome = run_one(target, limits, move || async move {
                    transport
                        .open(&key, limits.max_buffer)
                        .await
                        .map(StreamFeed::new)
                })
                .await;
                (index, outcome)
            }
        })
        .buffer_unordered(in_flight)
        .collect()
        .await;

    finished.sort_unstable_by_key(|(index, _)| *index);
    finished.into_iter().map(|(_, outcome)| outcome).collect()
}
