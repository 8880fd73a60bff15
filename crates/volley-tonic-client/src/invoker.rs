//! Fixed worker-pool invocation harness.
//!
//! [`run`] spawns a configured number of workers against a shared channel.
//! Each worker issues a fixed number of strictly sequential calls, every call
//! under an independent deadline measured from its own start. The harness
//! joins on all workers before reporting aggregate timing. Workers share no
//! mutable state; the channel and plan are read-only.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use tonic::Status;
use tonic::transport::Channel;

/// How many workers to run and how many calls each one issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvocationPlan {
    pub worker_count: usize,
    pub loops_per_worker: usize,
    pub payload_size_bytes: usize,
}

impl InvocationPlan {
    /// Total number of calls a full run issues.
    pub const fn total_calls(&self) -> usize {
        self.worker_count.saturating_mul(self.loops_per_worker)
    }
}

/// What a worker does after one of its calls fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum FailurePolicy {
    /// The worker stops issuing calls after its first failure.
    AbortOnFirstError,
    /// The worker records the failure and keeps issuing its remaining calls.
    BestEffort,
}

/// Identifies a single invocation within a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallSite {
    pub worker: usize,
    pub iteration: usize,
}

/// A failed call, attributable to the worker and iteration that issued it.
#[derive(Clone, Debug)]
pub struct CallFailure {
    pub site: CallSite,
    pub status: Status,
}

/// Per-worker result, produced once the worker's loop ends.
#[derive(Debug)]
pub struct WorkerOutcome {
    pub worker: usize,
    pub calls_completed: usize,
    pub first_error: Option<CallFailure>,
    pub elapsed: Duration,
}

/// Run-wide result. Existence of this value means the join barrier has been
/// passed: every worker has reported.
#[derive(Debug)]
pub struct AggregatedOutcome {
    pub total_calls_completed: usize,
    /// First failure of each failing worker, ordered by worker index.
    pub errors: Vec<CallFailure>,
    pub elapsed: Duration,
    pub workers: Vec<WorkerOutcome>,
}

impl AggregatedOutcome {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Completed calls per second over the whole run.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_calls_completed as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for AggregatedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} calls completed across {} workers in {:.2?} ({:.2} calls/sec)",
            self.total_calls_completed,
            self.workers.len(),
            self.elapsed,
            self.throughput(),
        )?;
        for failure in &self.errors {
            writeln!(
                f,
                "worker {} failed at iteration {}: {}",
                failure.site.worker, failure.site.iteration, failure.status
            )?;
        }
        Ok(())
    }
}

/// Runs the plan against the shared channel.
///
/// Spawns exactly `plan.worker_count` workers, each issuing
/// `plan.loops_per_worker` sequential invocations of `procedure`. A deadline
/// expiry cancels only the call that exceeded it; whether the worker then
/// continues is decided by `policy`. A zero worker or loop count yields a
/// trivially empty outcome.
pub async fn run<F, Fut>(
    channel: Channel,
    plan: InvocationPlan,
    deadline: Duration,
    policy: FailurePolicy,
    procedure: F,
) -> AggregatedOutcome
where
    F: Fn(Channel, CallSite) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Status>> + Send + 'static,
{
    let started = Instant::now();
    let mut tasks = FuturesUnordered::new();

    for worker in 0..plan.worker_count {
        let handle = tokio::spawn(worker_loop(
            worker,
            channel.clone(),
            plan,
            deadline,
            policy,
            procedure.clone(),
        ));
        tasks.push(async move { (worker, handle.await) });
    }

    // Join barrier: every worker reports before aggregate timing is read.
    let mut workers = Vec::with_capacity(plan.worker_count);
    while let Some((worker, joined)) = tasks.next().await {
        let outcome = joined.unwrap_or_else(|join_error| WorkerOutcome {
            worker,
            calls_completed: 0,
            first_error: Some(CallFailure {
                site: CallSite {
                    worker,
                    iteration: 0,
                },
                status: Status::internal(format!("worker task aborted: {join_error}")),
            }),
            elapsed: started.elapsed(),
        });
        workers.push(outcome);
    }
    workers.sort_unstable_by_key(|w| w.worker);

    AggregatedOutcome {
        total_calls_completed: workers.iter().map(|w| w.calls_completed).sum(),
        errors: workers.iter().filter_map(|w| w.first_error.clone()).collect(),
        elapsed: started.elapsed(),
        workers,
    }
}

async fn worker_loop<F, Fut>(
    worker: usize,
    channel: Channel,
    plan: InvocationPlan,
    deadline: Duration,
    policy: FailurePolicy,
    procedure: F,
) -> WorkerOutcome
where
    F: Fn(Channel, CallSite) -> Fut,
    Fut: Future<Output = Result<(), Status>>,
{
    let started = Instant::now();
    let mut calls_completed = 0;
    let mut first_error = None;

    for iteration in 0..plan.loops_per_worker {
        let site = CallSite { worker, iteration };

        // Each invocation gets its own deadline, measured from its own start.
        // Expiry cancels this call only.
        let result = match tokio::time::timeout(deadline, procedure(channel.clone(), site)).await {
            Ok(result) => result,
            Err(_) => Err(Status::deadline_exceeded(format!(
                "call exceeded {deadline:?} deadline"
            ))),
        };

        match result {
            Ok(()) => calls_completed += 1,
            Err(status) => {
                tracing::warn!(worker, iteration, %status, "call failed");
                if first_error.is_none() {
                    first_error = Some(CallFailure { site, status });
                }
                if policy == FailurePolicy::AbortOnFirstError {
                    break;
                }
            }
        }
    }

    WorkerOutcome {
        worker,
        calls_completed,
        first_error,
        elapsed: started.elapsed(),
    }
}
