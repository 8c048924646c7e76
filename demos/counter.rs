//! Counter Example - local state, event handlers, sliced rendering
//!
//! This example demonstrates:
//! - A function component keeping a count with `use_state`
//! - An `onClick` handler bound on the host node
//! - Rendering in frame-sized slices with `FrameScheduler`
//! - Painting the committed host tree to the terminal
//!
//! Run with: RUST_LOG=spark_fiber=debug cargo run --example counter

use std::io;
use std::time::Duration;

use spark_fiber::host::terminal;
use spark_fiber::{
    Attributes, Callback, Component, Element, Event, FrameScheduler, MemoryHost, Renderer,
    RendererConfig, Value, attrs, build,
};
use tracing_subscriber::EnvFilter;

fn counter() -> Component {
    Component::new("Counter", |hooks, props| {
        let step = match props.get("step") {
            Some(Value::Int(step)) => *step,
            _ => 1,
        };
        let (count, set_count) = hooks.use_state(0_i64);
        let on_click = Callback::new(move |_| set_count.update(move |c| c + step));

        build("section", attrs([("class", "counter")]), [
            build("h1", Attributes::new(), [format!("Count: {count}")]),
            build("button", attrs([("onClick", Value::Handler(on_click))]), ["+"]),
        ])
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    println!("=== spark-fiber Counter Example ===\n");

    let counter = counter();
    let app = build("main", Attributes::new(), [
        build(&counter, attrs([("step", 1_i64)]), Vec::<Element>::new()),
        build(&counter, attrs([("step", 5_i64)]), Vec::<Element>::new()),
    ]);

    let host = MemoryHost::new();
    let container = host.container();
    let config = RendererConfig::default().with_slice_budget(Duration::from_millis(4));
    let mut renderer = Renderer::with_config(host, config);
    let mut frames = FrameScheduler::new(renderer.config().slice_budget)
        .with_frame_limit(8)
        .with_pacing(Duration::from_millis(16));

    renderer.render(app, container);
    renderer.run(&mut frames)?;
    println!("After mount ({} commit):", renderer.commits());
    terminal::paint(renderer.host(), container, &mut io::stdout())?;

    // Click every button three times
    let buttons = renderer.host().find_all("button");
    for _ in 0..3 {
        for &button in &buttons {
            renderer.host().dispatch(button, &Event::new("click"));
        }
    }
    renderer.flush()?;

    println!("\nAfter 3 clicks each ({} commits):", renderer.commits());
    terminal::paint(renderer.host(), container, &mut io::stdout())?;

    if let Some(summary) = renderer.last_commit() {
        println!(
            "\nLast commit: placed={} updated={} deleted={} delta={:?}",
            summary.placed, summary.updated, summary.deleted, summary.delta
        );
    }
    Ok(())
}
