//! Host-defined work units and the sequential drain that runs them.
//!
//! A session operation is handed to the endpoint as a [`WorkSequence`]: an
//! ordered, finite list of units produced by the host. The endpoint never
//! inspects the units; it runs each one in order against a
//! [`ProgressMonitor`] and stops at the first failure.

mod error;
mod monitor;

pub use error::{WorkError, WorkResult};
pub use monitor::{HeadlessMonitor, MessageLevel, ProgressMonitor};

use tracing::debug;

/// One discrete step of a host operation.
pub trait WorkUnit: Send {
    /// Human readable name, used for the monitor title and logs.
    fn title(&self) -> &str {
        "untitled"
    }

    /// Execute the step.
    fn run(&mut self, monitor: &dyn ProgressMonitor) -> anyhow::Result<()>;

    /// Ask a running step to stop early. Most steps ignore this.
    fn cancel(&mut self) {}
}

/// Work unit backed by a closure.
pub struct Step<F> {
    title: String,
    body: F,
}

impl<F> Step<F>
where
    F: FnMut(&dyn ProgressMonitor) -> anyhow::Result<()> + Send,
{
    pub fn new(title: impl Into<String>, body: F) -> Self {
        Self {
            title: title.into(),
            body,
        }
    }
}

impl<F> WorkUnit for Step<F>
where
    F: FnMut(&dyn ProgressMonitor) -> anyhow::Result<()> + Send,
{
    fn title(&self) -> &str {
        &self.title
    }

    fn run(&mut self, monitor: &dyn ProgressMonitor) -> anyhow::Result<()> {
        (self.body)(monitor)
    }
}

/// Ordered list of work units for one session operation.
#[derive(Default)]
pub struct WorkSequence {
    units: Vec<Box<dyn WorkUnit>>,
}

impl WorkSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit to the end of the sequence.
    pub fn push(&mut self, unit: impl WorkUnit + 'static) {
        self.units.push(Box::new(unit));
    }

    /// Builder form of [`push`](Self::push) for closure steps.
    pub fn then<F>(mut self, title: impl Into<String>, body: F) -> Self
    where
        F: FnMut(&dyn ProgressMonitor) -> anyhow::Result<()> + Send + 'static,
    {
        self.push(Step::new(title, body));
        self
    }

    /// Append every unit of `other` after the existing ones.
    pub fn append(&mut self, mut other: WorkSequence) {
        self.units.append(&mut other.units);
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(|unit| unit.title())
    }
}

impl std::fmt::Debug for WorkSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.titles()).finish()
    }
}

impl IntoIterator for WorkSequence {
    type Item = Box<dyn WorkUnit>;
    type IntoIter = std::vec::IntoIter<Box<dyn WorkUnit>>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.into_iter()
    }
}

/// Run every unit of `sequence` in order and return how many completed.
///
/// The first failing unit aborts the remaining ones. Cancellation is
/// checked before each unit starts.
pub fn drain(sequence: WorkSequence, monitor: &dyn ProgressMonitor) -> WorkResult<usize> {
    let total = sequence.len();
    let mut completed = 0;

    for (index, mut unit) in sequence.into_iter().enumerate() {
        if monitor.is_cancelled() {
            unit.cancel();
            return Err(WorkError::Cancelled { index });
        }

        let title = unit.title().to_string();
        monitor.set_title(&title);
        debug!(index, total, title = %title, "running work unit");

        unit.run(monitor)
            .map_err(|source| WorkError::UnitFailed {
                index,
                title,
                source,
            })?;
        completed += 1;
    }

    Ok(completed)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    fn recording_sequence(log: &Arc<Mutex<Vec<&'static str>>>, fail_at: Option<&'static str>) -> WorkSequence {
        let mut sequence = WorkSequence::new();
        for name in ["first", "second", "third"] {
            let log = log.clone();
            sequence.push(Step::new(name, move |_: &dyn ProgressMonitor| {
                log.lock().unwrap().push(name);
                if fail_at == Some(name) {
                    anyhow::bail!("{name} exploded");
                }
                Ok(())
            }));
        }
        sequence
    }

    #[test]
    fn test_drain_runs_units_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let completed = drain(recording_sequence(&log, None), &HeadlessMonitor).unwrap();

        assert_eq!(completed, 3);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_drain_stops_at_first_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let err = drain(recording_sequence(&log, Some("second")), &HeadlessMonitor).unwrap_err();

        assert_eq!(err.index(), 1);
        match err {
            WorkError::UnitFailed { title, source, .. } => {
                assert_eq!(title, "second");
                assert!(source.to_string().contains("second exploded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_drain_empty_sequence() {
        assert_eq!(drain(WorkSequence::new(), &HeadlessMonitor).unwrap(), 0);
    }

    struct CancelAfterFirst {
        started: AtomicBool,
    }

    impl ProgressMonitor for CancelAfterFirst {
        fn set_title(&self, _title: &str) {}
        fn set_progress(&self, _progress: f64) {}
        fn set_status_message(&self, _message: &str) {}
        fn show_message(&self, _level: MessageLevel, _message: &str) {}
        fn is_cancelled(&self) -> bool {
            self.started.swap(true, Ordering::SeqCst)
        }
    }

    #[test]
    fn test_drain_honours_cancellation() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let monitor = CancelAfterFirst {
            started: AtomicBool::new(false),
        };

        let err = drain(recording_sequence(&log, None), &monitor).unwrap_err();
        assert!(matches!(err, WorkError::Cancelled { index: 1 }));
        assert_eq!(*log.lock().unwrap(), vec!["first"]);
    }

    #[test]
    fn test_then_and_append_keep_order() {
        let mut sequence = WorkSequence::new().then("a", |_| Ok(()));
        sequence.append(WorkSequence::new().then("b", |_| Ok(())).then("c", |_| Ok(())));

        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence.titles().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }
}
