//! Basic usage example for typed-eventbus.
//!
//! Demonstrates:
//! - Subscribing typed and wildcard handlers and publishing events
//! - One-shot subscriptions
//! - Request/response with processors selected by result type
//! - Disposing subscriptions
//!
//! Run with: `cargo run --example basic_usage`

use typed_eventbus::{define_bus, BusError, Context};

// Create an isolated bus for this example
define_bus!(app);

#[derive(Debug)]
struct UserSignedUp {
    name: String,
}

#[derive(Debug)]
struct Greeting(String);

#[derive(Debug)]
struct NameLength(usize);

fn main() -> Result<(), BusError> {
    println!("=== typed-eventbus: Basic Usage ===\n");
    let ctx = Context::new();

    app::set_trace_callback(|trace| println!("   [trace] {trace}"));

    // -------------------------------------------------------------------------
    // 1. Typed and wildcard subscribers
    // -------------------------------------------------------------------------
    println!("1. Subscribing handlers...");

    let welcome = app::subscribe(|_ctx, event: &UserSignedUp| {
        println!("   welcome, {}!", event.name);
        Ok(())
    });
    let audit = app::subscribe_any(|_ctx, event| {
        println!("   audit: saw {}", event.type_name());
        Ok(())
    });

    app::publish(&ctx, UserSignedUp { name: "ada".into() })?;
    app::publish(&ctx, 42u32)?;

    // -------------------------------------------------------------------------
    // 2. One-shot subscription
    // -------------------------------------------------------------------------
    println!("\n2. Subscribing once...");

    app::subscribe_once(|_ctx, event: &UserSignedUp| {
        println!("   first sign-up ever: {}", event.name);
        Ok(())
    });

    app::publish(&ctx, UserSignedUp { name: "grace".into() })?;
    app::publish(&ctx, UserSignedUp { name: "linus".into() })?;

    // -------------------------------------------------------------------------
    // 3. Processors selected by result type
    // -------------------------------------------------------------------------
    println!("\n3. Dispatching requests...");

    let greeter = app::add_processor(|_ctx, event: &UserSignedUp| {
        Ok(Greeting(format!("Hello, {}", event.name)))
    });
    app::add_processor(|_ctx, event: &UserSignedUp| Ok(NameLength(event.name.len())));

    let greeting: Greeting = app::dispatch(&ctx, UserSignedUp { name: "ken".into() })?;
    let length: NameLength = app::dispatch(&ctx, UserSignedUp { name: "ken".into() })?;
    println!("   {} ({} letters)", greeting.0, length.0);

    // -------------------------------------------------------------------------
    // 4. Disposal
    // -------------------------------------------------------------------------
    println!("\n4. Disposing...");

    welcome.dispose();
    audit.dispose();
    greeter.dispose();

    let missing: Result<Greeting, _> = app::dispatch(&ctx, UserSignedUp { name: "ken".into() });
    match missing {
        Err(err) if err.is_not_processor() => println!("   greeter gone: {err}"),
        other => println!("   unexpected: {:?}", other),
    }

    println!("\n=== Example completed successfully ===");
    Ok(())
}
