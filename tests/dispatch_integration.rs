//! End-to-end dispatch and schedule behavior through assembled gates.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use command_gate::member::{MemberDescriptor, MemberFault, MemberSource};
use command_gate::{
    Command, DispatchGate, GateError, HandlerRegistry, HandlerResult, InlineChannel, QueueChannel,
    TokioChannel,
};
use common::*;

fn order_gate(placed: &Recorder<OrderPlaced>, cancelled: &Recorder<OrderCancelled>) -> DispatchGate {
    DispatchGate::builder()
        .add_type::<OrderPlaced>()
        .add_type::<OrderCancelled>()
        .add_source(Arc::new(order_registry(placed, cancelled)))
        .build()
        .unwrap()
        .gate
}

#[test]
fn test_dispatch_invokes_bound_handler_with_exact_value() {
    let placed = Recorder::new();
    let cancelled = Recorder::new();
    let gate = order_gate(&placed, &cancelled);

    gate.dispatch(OrderPlaced { id: 7 }).unwrap();

    assert_eq!(placed.seen(), vec![OrderPlaced { id: 7 }]);
    assert!(cancelled.seen().is_empty());

    OrderCancelled { id: 7 }.dispatch_to(&gate).unwrap();
    assert_eq!(cancelled.seen(), vec![OrderCancelled { id: 7 }]);
}

#[test]
fn test_dispatch_returns_after_handler_body_completes() {
    let finished = Arc::new(AtomicBool::new(false));
    let registry = HandlerRegistry::new("reports");
    registry.register(slow_report_handler(finished.clone()));
    let gate = DispatchGate::builder()
        .add_type::<RebuildReport>()
        .add_source(Arc::new(registry))
        .build()
        .unwrap()
        .gate;

    let started = Instant::now();
    gate.dispatch(RebuildReport { millis: 50 }).unwrap();

    assert!(finished.load(Ordering::SeqCst));
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[test]
fn test_dispatch_surfaces_handler_error_exactly() {
    let registry = HandlerRegistry::new("orders");
    registry.register(|placed: &OrderPlaced| -> HandlerResult {
        Err(Box::new(OrderRejected {
            order_id: placed.id,
            reason: "credit limit".to_string(),
        }))
    });
    let gate = DispatchGate::builder()
        .add_type::<OrderPlaced>()
        .add_source(Arc::new(registry))
        .build()
        .unwrap()
        .gate;

    let err = gate.dispatch(OrderPlaced { id: 3 }).unwrap_err();
    assert_eq!(err.to_string(), "order 3 was rejected: credit limit");

    let original = err.into_handler_error().unwrap();
    assert_eq!(
        *original.downcast::<OrderRejected>().unwrap(),
        OrderRejected {
            order_id: 3,
            reason: "credit limit".to_string(),
        }
    );
}

#[test]
fn test_schedule_on_queue_returns_before_slow_handler() {
    let finished = Arc::new(AtomicBool::new(false));
    let registry = HandlerRegistry::new("reports");
    registry.register(slow_report_handler(finished.clone()));
    let (queue, worker) = QueueChannel::unbounded("reports-queue");
    let gate = DispatchGate::builder()
        .add_type::<RebuildReport>()
        .add_source(Arc::new(registry))
        .channel(Arc::new(queue))
        .build()
        .unwrap()
        .gate;
    let drain = thread::spawn(move || worker.run_until_closed());

    let started = Instant::now();
    gate.schedule(RebuildReport { millis: 300 }).unwrap();
    let returned_after = started.elapsed();

    assert!(returned_after < Duration::from_millis(300));
    assert!(!finished.load(Ordering::SeqCst));

    drop(gate);
    assert_eq!(drain.join().unwrap(), 1);
    assert!(finished.load(Ordering::SeqCst));
}

fn panicking_order_registry(placed: &Recorder<OrderPlaced>) -> HandlerRegistry {
    let registry = HandlerRegistry::new("orders");
    let record = placed.handler();
    registry.register(move |order: &OrderPlaced| -> HandlerResult {
        if order.id == 0 {
            panic!("order id 0 is reserved");
        }
        record(order)
    });
    registry
}

#[test]
fn test_panicking_handler_does_not_stop_queue_worker() {
    let placed = Recorder::new();
    let (queue, worker) = QueueChannel::unbounded("orders-queue");
    let gate = DispatchGate::builder()
        .add_type::<OrderPlaced>()
        .add_source(Arc::new(panicking_order_registry(&placed)))
        .channel(Arc::new(queue))
        .build()
        .unwrap()
        .gate;
    let drain = thread::spawn(move || worker.run_until_closed());

    gate.schedule(OrderPlaced { id: 0 }).unwrap();
    gate.schedule(OrderPlaced { id: 1 }).unwrap();
    gate.schedule(OrderPlaced { id: 2 }).unwrap();
    drop(gate);

    assert_eq!(drain.join().unwrap(), 3);
    assert_eq!(placed.seen(), vec![OrderPlaced { id: 1 }, OrderPlaced { id: 2 }]);
}

#[test]
fn test_panicking_handler_does_not_unwind_out_of_inline_schedule() {
    let placed = Recorder::new();
    let gate = DispatchGate::builder()
        .add_type::<OrderPlaced>()
        .add_source(Arc::new(panicking_order_registry(&placed)))
        .channel(Arc::new(InlineChannel))
        .build()
        .unwrap()
        .gate;

    gate.schedule(OrderPlaced { id: 0 }).unwrap();
    gate.schedule(OrderPlaced { id: 4 }).unwrap();
    assert_eq!(placed.seen(), vec![OrderPlaced { id: 4 }]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_schedule_on_tokio_returns_before_slow_handler() {
    let finished = Arc::new(AtomicBool::new(false));
    let done = Arc::new(tokio::sync::Notify::new());
    let registry = HandlerRegistry::new("reports");
    let (flag, notify) = (finished.clone(), done.clone());
    registry.register(move |report: &RebuildReport| -> HandlerResult {
        thread::sleep(Duration::from_millis(report.millis));
        flag.store(true, Ordering::SeqCst);
        notify.notify_one();
        Ok(())
    });

    let gate = DispatchGate::builder()
        .add_type::<RebuildReport>()
        .add_source(Arc::new(registry))
        .channel(Arc::new(TokioChannel::from_current().unwrap()))
        .build()
        .unwrap()
        .gate;

    gate.schedule(RebuildReport { millis: 300 }).unwrap();
    assert!(!finished.load(Ordering::SeqCst));

    tokio::time::timeout(Duration::from_secs(5), done.notified())
        .await
        .unwrap();
    assert!(finished.load(Ordering::SeqCst));
}

#[test]
fn test_schedule_without_channel_is_configuration_error() {
    let placed = Recorder::new();
    let gate = order_gate(&placed, &Recorder::new());

    match gate.schedule(OrderPlaced { id: 1 }) {
        Err(GateError::Configuration { reason }) => {
            assert!(reason.contains("not configured"));
        }
        other => panic!("Expected Configuration error, got {other:?}"),
    }
    assert!(placed.seen().is_empty());
}

#[derive(Default)]
struct Refunds {
    refunded: parking_lot::Mutex<Vec<u64>>,
}

fn refund_members() -> Vec<MemberDescriptor> {
    vec![MemberDescriptor::unary::<Refunds, OrderCancelled, _>(
        "refund",
        |refunds, cancelled| {
            if cancelled.id == 0 {
                return Err(MemberFault::Runtime(Box::new(OrderRejected {
                    order_id: 0,
                    reason: "nothing to refund".to_string(),
                })));
            }
            refunds.refunded.lock().push(cancelled.id);
            Ok(())
        },
    )]
}

#[test]
fn test_registry_and_member_sources_share_one_gate() {
    let placed = Recorder::<OrderPlaced>::new();
    let registry = HandlerRegistry::new("orders");
    registry.register(placed.handler());
    let refunds = Arc::new(Refunds::default());

    let gate = DispatchGate::builder()
        .add_type::<OrderPlaced>()
        .add_type::<OrderCancelled>()
        .add_source(Arc::new(registry))
        .add_source(Arc::new(
            MemberSource::new("refunds").with_owner(refunds.clone(), refund_members()),
        ))
        .build()
        .unwrap()
        .gate;

    gate.dispatch(OrderPlaced { id: 11 }).unwrap();
    gate.dispatch(OrderCancelled { id: 11 }).unwrap();

    assert_eq!(placed.seen(), vec![OrderPlaced { id: 11 }]);
    assert_eq!(refunds.refunded.lock().as_slice(), &[11]);

    let err = gate.dispatch(OrderCancelled { id: 0 }).unwrap_err();
    assert_eq!(
        err.handler_error::<OrderRejected>().map(|e| e.reason.as_str()),
        Some("nothing to refund")
    );
}

#[test]
fn test_registry_and_member_source_competing_for_a_type_fail_assembly() {
    let cancelled = Recorder::<OrderCancelled>::new();
    let registry = HandlerRegistry::new("orders");
    registry.register(cancelled.handler());

    let result = DispatchGate::builder()
        .add_type::<OrderCancelled>()
        .add_source(Arc::new(registry))
        .add_source(Arc::new(
            MemberSource::new("refunds")
                .with_owner(Arc::new(Refunds::default()), refund_members()),
        ))
        .build();

    match result {
        Err(GateError::AmbiguousHandler { sources, .. }) => {
            assert_eq!(sources, vec!["orders".to_string(), "refunds".to_string()]);
        }
        other => panic!("Expected AmbiguousHandler, got {other:?}"),
    }
}

#[test]
fn test_unlisted_command_is_missing_handler() {
    #[derive(Debug)]
    struct Unlisted;
    impl Command for Unlisted {}

    let gate = order_gate(&Recorder::new(), &Recorder::new());
    assert!(matches!(
        gate.dispatch(Unlisted),
        Err(GateError::MissingHandler { .. })
    ));
}
