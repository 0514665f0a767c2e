//! # Typed Event Bus
//!
//! An in-process, synchronous publish/subscribe and request/response event bus.
//! Producers and consumers of typed messages are decoupled without any network,
//! queue or persistence layer: every call runs on the caller's thread and returns
//! once the matched callbacks have run.
//!
//! ## Quick Start
//!
//! ```rust
//! use typed_eventbus::{Context, EventBus};
//!
//! struct OrderPlaced {
//!     total: u32,
//! }
//!
//! struct TaxQuote(u32);
//!
//! let bus = EventBus::new();
//! let ctx = Context::new();
//!
//! // Fan-out: every subscriber of the event type sees it
//! let subscription = bus.subscribe(|_ctx, order: &OrderPlaced| {
//!     println!("order placed: {}", order.total);
//!     Ok(())
//! });
//! bus.publish(&ctx, OrderPlaced { total: 120 }).unwrap();
//!
//! // Request/response: the first matching processor answers
//! bus.add_processor(|_ctx, order: &OrderPlaced| Ok(TaxQuote(order.total / 5)));
//! let quote: TaxQuote = bus.dispatch(&ctx, OrderPlaced { total: 120 }).unwrap();
//! assert_eq!(quote.0, 24);
//!
//! subscription.dispose();
//! ```
//!
//! ## Features
//!
//! - **Type-routed**: handlers and processors are selected by the runtime type of the
//!   event, and processors additionally by the requested result type
//! - **Fail-fast publish**: the first handler error stops the fan-out and is returned
//! - **One-shot subscriptions**: removed after their first success, kept on failure
//! - **Re-entrant**: callbacks run without bus locks held and may use the bus themselves
//! - **Tracing support**: `tracing` logs plus an optional per-bus trace callback
//!
//! ## Main Types and Functions
//!
//! - [`EventBus`] - an explicit bus instance with the typed API
//! - [`Subscription`] - disposes one registration
//! - [`HandlerEntry`] / [`ProcessorEntry`] - type-erased entries for custom routing
//! - [`define_bus!`] - named, statically allocated buses
//! - [`publish`], [`subscribe`], [`dispatch`], ... - the process-wide default bus

mod bus;
mod bus_error;
mod bus_trace;
mod context;
mod default_bus;
mod entry;
mod macros;
mod registry;
mod subscription;
mod typed;

pub use bus::EventBus;
pub use bus_error::{BoxError, BusError};
pub use bus_trace::BusTrace;
pub use context::Context;
pub use default_bus::{
    add_any_processor, add_processor, clear_trace_callback, default_bus, dispatch, dispatch_any,
    publish, set_trace_callback, subscribe, subscribe_any, subscribe_once, subscribe_once_any,
};
pub use entry::{
    EventRef, HandlerEntry, HandlerResult, Lifetime, ProcessorEntry, ProcessorOutput, ResultType,
    ANY_TYPE,
};
pub use registry::TraceCallback;
pub use subscription::Subscription;
