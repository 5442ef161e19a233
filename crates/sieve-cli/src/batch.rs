//! Batch Worker Pool
//!
//! Runs one job per input on a bounded set of scoped threads. Workers pull
//! the next index from a shared counter, so a slow file does not hold up a
//! fixed chunk of others. A job that panics is reported as a failure for its
//! own input only.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

use crate::error::CliError;

/// Run `job` over every item with at most `concurrency` workers.
///
/// Results come back in input order.
pub fn run_batch<T, R, F>(items: &[T], concurrency: usize, job: F) -> Vec<Result<R, CliError>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> Result<R, CliError> + Sync,
{
    if items.is_empty() {
        return Vec::new();
    }

    let workers = concurrency.clamp(1, items.len());
    let next = AtomicUsize::new(0);
    let results: Mutex<Vec<Option<Result<R, CliError>>>> =
        Mutex::new((0..items.len()).map(|_| None).collect());

    tracing::debug!("Processing {} inputs on {} workers", items.len(), workers);

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| {
                loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(item) = items.get(index) else {
                        break;
                    };

                    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| job(item))) {
                        Ok(result) => result,
                        Err(payload) => Err(CliError::Panicked(panic_message(payload.as_ref()))),
                    };

                    let mut guard = results.lock().unwrap_or_else(PoisonError::into_inner);
                    guard[index] = Some(outcome);
                }
            });
        }
    });

    results
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner)
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| Err(CliError::Panicked("worker exited early".to_string()))))
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_in_input_order() {
        let items: Vec<usize> = (0..20).collect();
        let results = run_batch(&items, 4, |n| Ok(n * 2));
        let values: Vec<usize> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, (0..20).map(|n| n * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_panic_isolated_to_one_item() {
        let items = vec![1, 2, 3, 4];
        let results = run_batch(&items, 2, |&n| {
            if n == 3 {
                panic!("bad input {n}");
            }
            Ok(n)
        });

        assert_eq!(results.len(), 4);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(matches!(&results[2], Err(CliError::Panicked(msg)) if msg == "bad input 3"));
        assert!(results[3].is_ok());
    }

    #[test]
    fn test_errors_reported_per_item() {
        let items = vec!["ok", "missing"];
        let results = run_batch(&items, 8, |&name| {
            if name == "missing" {
                Err(CliError::NoStylesheets)
            } else {
                Ok(name.len())
            }
        });
        assert_eq!(results[0].as_ref().unwrap(), &2);
        assert!(matches!(results[1], Err(CliError::NoStylesheets)));
    }

    #[test]
    fn test_empty_batch() {
        let items: Vec<u8> = Vec::new();
        assert!(run_batch(&items, 4, |&n| Ok(n)).is_empty());
    }

    #[test]
    fn test_zero_concurrency_runs_serially() {
        let items = vec![1, 2, 3];
        let results = run_batch(&items, 0, |&n| Ok(n + 1));
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(Result::is_ok));
    }
}
