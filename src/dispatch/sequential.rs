use std::future::ready;

use super::{Limits, Outcome, RangeFeed, run_one};
use crate::transport::Transport;

/// Fallback for transports that cannot multiplex: one target at a time, one
/// ranged read per growth step, never more than one read outstanding.
pub async fn run_sequential<T: Transport>(
    transport: &T,
    targets: Vec<String>,
    limits: Limits,
) -> Vec<Outcome> {
    let mut outcomes = Vec::with_capacity(targets.len());

    for target in targets {
        let outcome = run_one(target, limits, || ready(Ok(RangeFeed::new(transport)))).await;
        outcomes.push(outcome);
    }

    outcomes
}
