//! Integration tests for the process-wide default bus.
//!
//! The default bus is shared by every test in this binary, so each test clears it
//! first and runs serially.

use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use typed_eventbus::{
    add_any_processor, add_processor, default_bus, dispatch, dispatch_any, publish, subscribe,
    subscribe_any, subscribe_once, BusError, Context,
};

#[derive(Debug, Clone, PartialEq)]
struct TestEvent1;

#[derive(Debug, Clone, PartialEq)]
struct TestEvent2;

#[derive(Debug, PartialEq)]
struct TestResult1(u8);

#[derive(Debug, PartialEq)]
struct TestResult2(u8);

#[test]
#[serial]
fn test_publish_and_subscribe() -> Result<(), BusError> {
    default_bus().clear();
    let ctx = Context::new();

    let any_calls = Arc::new(AtomicUsize::new(0));
    let one_calls = Arc::new(AtomicUsize::new(0));
    let two_calls = Arc::new(AtomicUsize::new(0));

    let counter = any_calls.clone();
    let any = subscribe_any(move |_ctx, _event| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    let counter = one_calls.clone();
    subscribe(move |_ctx, _event: &TestEvent1| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    let counter = two_calls.clone();
    subscribe(move |_ctx, _event: &TestEvent2| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    publish(&ctx, TestEvent1)?;
    publish(&ctx, TestEvent1)?;
    publish(&ctx, TestEvent2)?;

    assert_eq!(any_calls.load(Ordering::SeqCst), 3);
    assert_eq!(one_calls.load(Ordering::SeqCst), 2);
    assert_eq!(two_calls.load(Ordering::SeqCst), 1);

    // Publish after dispose
    any.dispose();
    publish(&ctx, TestEvent1)?;
    assert_eq!(any_calls.load(Ordering::SeqCst), 3);

    default_bus().clear();
    Ok(())
}

#[test]
#[serial]
fn test_dispatch_and_process() -> Result<(), BusError> {
    default_bus().clear();
    let ctx = Context::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    let first = add_processor(move |_ctx, _event: &TestEvent1| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(TestResult1(1))
    });
    let counter = calls.clone();
    let second = add_processor(move |_ctx, _event: &TestEvent1| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(TestResult2(2))
    });

    let result: TestResult1 = dispatch(&ctx, TestEvent1)?;
    assert_eq!(result, TestResult1(1));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    first.dispose();
    let missing = dispatch::<TestEvent1, TestResult1>(&ctx, TestEvent1);
    assert!(missing.unwrap_err().is_not_processor());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let result: TestResult2 = dispatch(&ctx, TestEvent1)?;
    assert_eq!(result, TestResult2(2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    second.dispose();
    default_bus().clear();
    Ok(())
}

#[test]
#[serial]
fn test_any_processor() -> Result<(), BusError> {
    default_bus().clear();
    let ctx = Context::new();

    let any = add_any_processor(|_ctx, _event| Ok(TestResult1(9)));

    let output = dispatch_any(&ctx, TestEvent1)?;
    assert_eq!(output.downcast_ref::<TestResult1>(), Some(&TestResult1(9)));

    any.dispose();
    assert!(dispatch_any(&ctx, TestEvent1).unwrap_err().is_not_processor());

    // A failing processor surfaces the business error, not NotProcessor
    add_any_processor(|_ctx, _event| -> Result<TestResult2, _> { Err("biz".into()) });
    let err = dispatch::<TestEvent1, TestResult2>(&ctx, TestEvent1).unwrap_err();
    assert!(!err.is_not_processor());
    assert_eq!(err.to_string(), "biz");

    default_bus().clear();
    Ok(())
}

#[test]
#[serial]
fn test_subscribe_once_on_default_bus() -> Result<(), BusError> {
    default_bus().clear();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    subscribe_once(move |_ctx, _event: &TestEvent2| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    publish(&Context::new(), TestEvent2)?;
    publish(&Context::new(), TestEvent2)?;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    default_bus().clear();
    Ok(())
}
