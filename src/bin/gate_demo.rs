//! # Command Gate Demo
//!
//! Assembles a gate over an order workflow: one explicit handler registry, one
//! member-backed source and a queue channel drained by a worker thread. Set
//! `COMMAND_GATE_CONFIG` to a config file to choose the table mode.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use command_gate::logging::init_structured_logging;
use command_gate::member::{MemberDescriptor, MemberFault, MemberSource};
use command_gate::{
    Command, ConfigManager, DispatchGate, HandlerRegistry, HandlerResult, Lifecycle,
    QueueChannel,
};
use tracing::{info, warn};

#[derive(Debug, Clone)]
struct OrderPlaced {
    id: u64,
    amount_cents: u64,
}
impl Command for OrderPlaced {}

#[derive(Debug, Clone)]
struct OrderCancelled {
    id: u64,
}
impl Command for OrderCancelled {}

#[derive(Debug, thiserror::Error)]
#[error("order {0} is unknown")]
struct UnknownOrder(u64);

#[derive(Default)]
struct Ledger {
    booked_cents: AtomicU64,
}

fn ledger_members() -> Vec<MemberDescriptor> {
    vec![MemberDescriptor::unary::<Ledger, OrderCancelled, _>(
        "reverse",
        |_, cancelled| {
            if cancelled.id == 0 {
                return Err(MemberFault::Runtime(Box::new(UnknownOrder(0))));
            }
            info!(order_id = cancelled.id, "Reversed ledger entry");
            Ok(())
        },
    )]
}

fn main() -> anyhow::Result<()> {
    init_structured_logging();

    let config = ConfigManager::load().context("loading gate configuration")?;
    let ledger = Arc::new(Ledger::default());

    let registry = HandlerRegistry::new("orders");
    let booking = ledger.clone();
    registry.register_named("book_order", move |placed: &OrderPlaced| -> HandlerResult {
        booking
            .booked_cents
            .fetch_add(placed.amount_cents, Ordering::SeqCst);
        info!(order_id = placed.id, "Booked order");
        Ok(())
    });

    let members = MemberSource::new("ledger").with_owner(ledger.clone(), ledger_members());
    let (queue, worker) = QueueChannel::unbounded("orders-queue");

    let (gate, lifecycle) = DispatchGate::builder()
        .add_type::<OrderPlaced>()
        .add_type::<OrderCancelled>()
        .add_source(Arc::new(registry))
        .add_source(Arc::new(members))
        .with_config(config.config())?
        .channel(Arc::new(queue))
        .build()
        .context("assembling dispatch gate")?
        .into_parts();

    if let Some(lifecycle) = &lifecycle {
        lifecycle.start().context("starting handler table")?;
    }

    let drain = thread::spawn(move || worker.run_until_closed());

    gate.dispatch(OrderPlaced {
        id: 7,
        amount_cents: 4_200,
    })?;
    OrderCancelled { id: 7 }.dispatch_to(&gate)?;

    if let Err(e) = gate.dispatch(OrderCancelled { id: 0 }) {
        warn!(error = %e, "Dispatch failed as expected");
    }

    gate.schedule(OrderPlaced {
        id: 8,
        amount_cents: 1_000,
    })?;

    // Dropping the last gate releases the queue sender and lets the worker finish.
    drop(gate);
    let processed = drain
        .join()
        .map_err(|_| anyhow::anyhow!("queue worker panicked"))?;

    if let Some(lifecycle) = lifecycle {
        lifecycle.stop();
    }

    info!(
        processed = processed,
        booked_cents = ledger.booked_cents.load(Ordering::SeqCst),
        "Demo finished"
    );
    Ok(())
}
