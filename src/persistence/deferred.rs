//! Reporting off the frame
//!
//! [`DeferredReporter`] hands each round result to a spawner and returns at
//! once; the wrapped reporter runs later on the spawner's executor. On the web
//! the spawner is `wasm_bindgen_futures::spawn_local`.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use super::ResultReporter;
use crate::sim::RoundReport;

/// A task queued by [`DeferredReporter`]
pub type ReportTask = Pin<Box<dyn Future<Output = ()>>>;

/// Schedules a task on some local executor
pub type Spawner = fn(ReportTask);

/// Fire-and-forget wrapper around another reporter. Failures in the wrapped
/// reporter are logged when the task runs.
pub struct DeferredReporter<R> {
    inner: Rc<RefCell<R>>,
    spawn: Spawner,
}

impl<R: ResultReporter + 'static> DeferredReporter<R> {
    pub fn new(inner: R, spawn: Spawner) -> Self {
        Self::shared(Rc::new(RefCell::new(inner)), spawn)
    }

    /// Wrap a reporter the caller keeps a handle to
    pub fn shared(inner: Rc<RefCell<R>>, spawn: Spawner) -> Self {
        Self { inner, spawn }
    }
}

/// Spawner for the browser event loop
#[cfg(target_arch = "wasm32")]
pub fn spawn_local(task: ReportTask) {
    wasm_bindgen_futures::spawn_local(task);
}

impl<R: ResultReporter + 'static> ResultReporter for DeferredReporter<R> {
    fn report(&mut self, report: &RoundReport) -> crate::Result<()> {
        let inner = Rc::clone(&self.inner);
        let report = report.clone();
        (self.spawn)(Box::pin(async move {
            let Ok(mut reporter) = inner.try_borrow_mut() else {
                log::error!("Reporter busy, dropping result of {} points", report.score);
                return;
            };
            if let Err(e) = reporter.report(&report) {
                log::error!("Error saving score: {e}");
            }
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{DocumentStore, MemoryStore, ScoreBook};
    use crate::sim::Outcome;
    use std::task::{Context, Poll, Waker};

    thread_local! {
        static QUEUE: RefCell<Vec<ReportTask>> = RefCell::new(Vec::new());
    }

    fn enqueue(task: ReportTask) {
        QUEUE.with(|q| q.borrow_mut().push(task));
    }

    fn run_queued() -> usize {
        let tasks: Vec<ReportTask> = QUEUE.with(|q| q.borrow_mut().drain(..).collect());
        let mut cx = Context::from_waker(Waker::noop());
        let count = tasks.len();
        for mut task in tasks {
            assert_eq!(task.as_mut().poll(&mut cx), Poll::Ready(()));
        }
        count
    }

    fn report(score: u32) -> RoundReport {
        RoundReport {
            score,
            level: "expert".into(),
            correct_catches: score / 5,
            incorrect_catches: 0,
            outcome: Outcome::Excellent,
        }
    }

    #[test]
    fn test_report_runs_on_spawner_not_caller() {
        let book = Rc::new(RefCell::new(ScoreBook::new(MemoryStore::new())));
        let mut reporter = DeferredReporter::shared(Rc::clone(&book), enqueue);

        reporter.report(&report(15)).unwrap();
        let saved = || book.borrow().store().list("obstacle_game").unwrap().len();
        assert_eq!(saved(), 0);

        assert_eq!(run_queued(), 1);
        assert_eq!(saved(), 1);
    }

    #[test]
    fn test_inner_failure_is_swallowed() {
        struct Failing;
        impl ResultReporter for Failing {
            fn report(&mut self, _report: &RoundReport) -> crate::Result<()> {
                Err(crate::VowelDropError::Storage("quota exceeded".into()))
            }
        }

        let mut reporter = DeferredReporter::new(Failing, enqueue);
        assert!(reporter.report(&report(5)).is_ok());
        assert_eq!(run_queued(), 1);
    }
}
