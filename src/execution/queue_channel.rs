//! Task-queue channel: units are queued on a crossbeam channel and drained by
//! workers running on threads the host owns.

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use tracing::{debug, info};

use crate::config::ChannelKind;
use crate::error::{GateError, Result};
use crate::execution::channel::{ExecutionChannel, UnitOfWork};
use crate::logging::log_channel_operation;

/// Submitting side of a work queue.
#[derive(Debug, Clone)]
pub struct QueueChannel {
    sender: Sender<UnitOfWork>,
    name: String,
}

/// Draining side of a work queue. Clone it to add workers.
#[derive(Debug, Clone)]
pub struct QueueWorker {
    receiver: Receiver<UnitOfWork>,
    name: String,
}

impl QueueChannel {
    /// Queue with room for `capacity` pending units; a full queue rejects.
    pub fn bounded(name: impl Into<String>, capacity: usize) -> Result<(Self, QueueWorker)> {
        if capacity == 0 {
            return Err(GateError::configuration(
                "queue channel capacity must be greater than 0",
            ));
        }
        let (sender, receiver) = channel::bounded(capacity);
        Ok(Self::pair(name.into(), sender, receiver))
    }

    pub fn unbounded(name: impl Into<String>) -> (Self, QueueWorker) {
        let (sender, receiver) = channel::unbounded();
        Self::pair(name.into(), sender, receiver)
    }

    fn pair(
        name: String,
        sender: Sender<UnitOfWork>,
        receiver: Receiver<UnitOfWork>,
    ) -> (Self, QueueWorker) {
        info!(channel = %name, capacity = ?sender.capacity(), "Created queue channel");
        (
            Self {
                sender,
                name: name.clone(),
            },
            QueueWorker { receiver, name },
        )
    }

    /// Pending-unit bound; `None` for an unbounded queue.
    pub fn capacity(&self) -> Option<usize> {
        self.sender.capacity()
    }

    /// Units queued and not yet taken by a worker.
    pub fn pending(&self) -> usize {
        self.sender.len()
    }
}

impl ExecutionChannel for QueueChannel {
    fn accept(&self, unit: UnitOfWork) -> Result<()> {
        let unit_id = unit.id().to_string();

        let reason = match self.sender.try_send(unit) {
            Ok(()) => {
                log_channel_operation("accept", &self.name, Some(&unit_id), "queued", None);
                return Ok(());
            }
            Err(TrySendError::Full(_)) => "queue is full",
            Err(TrySendError::Disconnected(_)) => "queue has no workers",
        };

        log_channel_operation("accept", &self.name, Some(&unit_id), "rejected", Some(reason));
        Err(GateError::ChannelRejected {
            channel: self.name.clone(),
            reason: reason.to_string(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> Option<ChannelKind> {
        Some(ChannelKind::Queue)
    }

    fn capacity(&self) -> Option<usize> {
        QueueChannel::capacity(self)
    }
}

impl QueueWorker {
    /// Block for the next unit and run it. Returns false once every
    /// [`QueueChannel`] handle is dropped and the queue is empty.
    pub fn run_once(&self) -> bool {
        match self.receiver.recv() {
            Ok(unit) => {
                unit.run_and_report(&self.name);
                true
            }
            Err(_) => false,
        }
    }

    /// Run one unit if one is waiting.
    pub fn try_run_once(&self) -> bool {
        match self.receiver.try_recv() {
            Ok(unit) => {
                unit.run_and_report(&self.name);
                true
            }
            Err(_) => false,
        }
    }

    /// Drain units until the queue is closed; returns how many ran.
    pub fn run_until_closed(&self) -> usize {
        let mut processed = 0;
        while self.run_once() {
            processed += 1;
        }
        debug!(channel = %self.name, processed = processed, "Queue worker finished");
        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[derive(Debug)]
    struct Ping;

    fn counting_unit(counter: &Arc<AtomicUsize>) -> UnitOfWork {
        let counter = counter.clone();
        UnitOfWork::new(CommandType::of::<Ping>(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_accept_queues_without_running() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (queue, worker) = QueueChannel::unbounded("jobs");

        queue.accept(counting_unit(&counter)).unwrap();
        assert_eq!(queue.pending(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        assert!(worker.try_run_once());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!worker.try_run_once());
    }

    #[test]
    fn test_full_queue_rejects() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (queue, _worker) = QueueChannel::bounded("jobs", 1).unwrap();

        queue.accept(counting_unit(&counter)).unwrap();
        match queue.accept(counting_unit(&counter)) {
            Err(GateError::ChannelRejected { channel, reason }) => {
                assert_eq!(channel, "jobs");
                assert_eq!(reason, "queue is full");
            }
            other => panic!("Expected ChannelRejected, got {other:?}"),
        }
    }

    #[test]
    fn test_queue_without_workers_rejects() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (queue, worker) = QueueChannel::unbounded("jobs");
        drop(worker);

        assert!(matches!(
            queue.accept(counting_unit(&counter)),
            Err(GateError::ChannelRejected { .. })
        ));
    }

    #[test]
    fn test_worker_survives_panicking_unit() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (queue, worker) = QueueChannel::unbounded("jobs");
        let drain = thread::spawn(move || worker.run_until_closed());

        queue
            .accept(UnitOfWork::new(CommandType::of::<Ping>(), || {
                panic!("handler blew up")
            }))
            .unwrap();
        queue.accept(counting_unit(&counter)).unwrap();
        queue.accept(counting_unit(&counter)).unwrap();
        drop(queue);

        assert_eq!(drain.join().unwrap(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_capacity_reports_bound() {
        let (bounded, _bounded_worker) = QueueChannel::bounded("jobs", 3).unwrap();
        let (unbounded, _unbounded_worker) = QueueChannel::unbounded("jobs");

        assert_eq!(bounded.capacity(), Some(3));
        assert_eq!(unbounded.capacity(), None);
        assert_eq!(bounded.kind(), Some(ChannelKind::Queue));
    }

    #[test]
    fn test_zero_capacity_is_configuration_error() {
        assert!(matches!(
            QueueChannel::bounded("jobs", 0),
            Err(GateError::Configuration { .. })
        ));
    }

    #[test]
    fn test_workers_drain_until_closed() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (queue, worker) = QueueChannel::unbounded("jobs");

        let workers: Vec<_> = (0..2)
            .map(|_| {
                let worker = worker.clone();
                thread::spawn(move || worker.run_until_closed())
            })
            .collect();
        drop(worker);

        for _ in 0..10 {
            queue.accept(counting_unit(&counter)).unwrap();
        }
        queue
            .accept(UnitOfWork::new(CommandType::of::<Ping>(), || {
                Err(GateError::internal("failing unit"))
            }))
            .unwrap();
        drop(queue);

        let processed: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();
        assert_eq!(processed, 11);
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }
}
