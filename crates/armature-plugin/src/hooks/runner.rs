//! Stage execution runners for the collecting disciplines.
//!
//! Both runners attempt every participant and only then report: failures
//! accumulate into a [`HookErrors`] aggregate, and the reducer runs over the
//! successful results only when no participant failed. The fail-fast
//! discipline of the middleware stages lives with the registry, since it
//! never aggregates anything.

use std::collections::HashMap;

use futures::stream::{FuturesUnordered, StreamExt};

use super::error::{HookError, HookErrors};
use super::registry::{AsyncHook, HookCell};
use super::stage::Stage;

/// Run `cells` one at a time in registration order.
///
/// Every participant is awaited even when an earlier one failed; the stage
/// argument is cloned per participant. On success the reducer receives the
/// ordered `(participant, result)` pairs of the participants that succeeded.
pub async fn run_in_sequence<A, R, Out>(
    stage: Stage,
    cells: &[HookCell<AsyncHook<A, R>>],
    args: &A,
    reduce: impl FnOnce(Vec<(String, R)>) -> Out,
) -> Result<Out, HookErrors>
where
    A: Clone,
{
    tracing::debug!(stage = %stage, participants = cells.len(), "Running stage in sequence");

    let mut results: Vec<(String, R)> = Vec::with_capacity(cells.len());
    let mut failures = HookErrors::new(stage);

    for cell in cells {
        match (cell.hook)(args.clone()).await {
            Ok(value) => results.push((cell.plugin.clone(), value)),
            Err(source) => {
                tracing::warn!(
                    stage = %stage,
                    plugin = %cell.plugin,
                    error = %source,
                    "Hook participant failed"
                );
                failures.record(HookError {
                    stage,
                    plugin: cell.plugin.clone(),
                    source,
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(reduce(results))
    } else {
        Err(failures)
    }
}

/// Run `cells` concurrently and wait for all of them to settle.
///
/// No participant waits for another; results and failures are recorded in
/// settle order, which is the only order this discipline promises. On
/// success the reducer receives the mapping of participant name to result.
pub async fn run_in_parallel<A, R, Out>(
    stage: Stage,
    cells: &[HookCell<AsyncHook<A, R>>],
    args: &A,
    reduce: impl FnOnce(HashMap<String, R>) -> Out,
) -> Result<Out, HookErrors>
where
    A: Clone,
{
    tracing::debug!(stage = %stage, participants = cells.len(), "Running stage concurrently");

    let mut in_flight: FuturesUnordered<_> = cells
        .iter()
        .map(|cell| {
            let plugin = cell.plugin.clone();
            let future = (cell.hook)(args.clone());
            async move { (plugin, future.await) }
        })
        .collect();

    let mut results: HashMap<String, R> = HashMap::new();
    let mut failures = HookErrors::new(stage);

    while let Some((plugin, outcome)) = in_flight.next().await {
        match outcome {
            Ok(value) => {
                results.insert(plugin, value);
            }
            Err(source) => {
                tracing::warn!(
                    stage = %stage,
                    plugin = %plugin,
                    error = %source,
                    "Hook participant failed"
                );
                failures.record(HookError {
                    stage,
                    plugin,
                    source,
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(reduce(results))
    } else {
        Err(failures)
    }
}
