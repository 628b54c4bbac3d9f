//! Caller-side scheduling: deadlines and batches of independent requests.
//!
//! The engines never share state, so each request can run on its own thread
//! with its own data. Nothing here cancels a running search; a request that
//! misses its deadline keeps its worker busy until it finishes on its own.

use std::{thread, time::Duration};

use crossbeam::channel::{bounded, unbounded, RecvTimeoutError};
use itertools::Itertools;
use log::debug;

use crate::{
    config::Limits,
    error::{Result, SolverError},
    request::{Report, Request},
};

/// Runs `request` on a worker thread and waits at most `timeout` for it.
pub fn run_with_deadline(request: Request, limits: Limits, timeout: Duration) -> Result<Report> {
    run_job_with_deadline(move || request.run(&limits), timeout)
}

fn run_job_with_deadline<T, F>(job: F, timeout: Duration) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (s, r) = bounded(1);
    thread::spawn(move || {
        // The receiver is gone if the deadline already passed.
        let _ = s.send(job());
    });
    match r.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            debug!("[Deadline] No answer within {timeout:?}");
            Err(SolverError::DeadlineExceeded { timeout })
        }
        Err(RecvTimeoutError::Disconnected) => Err(SolverError::WorkerFailed(
            "worker exited without an answer".to_string(),
        )),
    }
}

/// Default worker count: one per CPU.
pub fn default_workers() -> usize {
    num_cpus::get()
}

/// Runs independent requests on `workers` threads.
///
/// Results come back in request order, one per request.
pub fn run_batch(requests: Vec<Request>, limits: Limits, workers: usize) -> Vec<Result<Report>> {
    run_jobs(
        requests
            .into_iter()
            .map(|request| move || request.run(&limits))
            .collect_vec(),
        workers,
    )
}

fn run_jobs<T, F>(jobs: Vec<F>, workers: usize) -> Vec<Result<T>>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let total = jobs.len();
    let workers = workers.clamp(1, total.max(1));
    let (s_tasks, r_tasks) = unbounded();
    let (s_results, r_results) = unbounded();

    for task in jobs.into_iter().enumerate() {
        s_tasks
            .send(task)
            .expect("receiver is held until workers start");
    }
    drop(s_tasks);

    let _handlers = (0..workers)
        .map(|i| {
            let r_tasks = r_tasks.clone();
            let s_results = s_results.clone();
            thread::spawn(move || {
                while let Ok((idx, job)) = r_tasks.recv() {
                    debug!("[Worker {i}] Running task {idx}");
                    if s_results.send((idx, job())).is_err() {
                        break;
                    }
                }
            })
        })
        .collect_vec();
    drop(s_results);

    let mut results: Vec<Option<Result<T>>> = (0..total).map(|_| None).collect();
    for (idx, result) in r_results.iter() {
        results[idx] = Some(result);
    }
    results
        .into_iter()
        .enumerate()
        .map(|(idx, result)| {
            result.unwrap_or_else(|| {
                Err(SolverError::WorkerFailed(format!("task {idx} produced no result")))
            })
        })
        .collect()
}
