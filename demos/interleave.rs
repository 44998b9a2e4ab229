//! Interleaved output demo: a background feed keeps printing above the
//! editor while you type. Enter submits, Esc or Ctrl-C quits.
//!
//! Run with: `cargo run --example interleave`

use std::thread;
use std::time::Duration;

use tideline::{Engine, EngineConfig};

fn main() -> std::io::Result<()> {
    let engine = Engine::with_config(EngineConfig::default())?;
    let handle = engine.handle();

    let feed = handle.clone();
    let producer = thread::spawn(move || {
        // Give the run loop a moment to start.
        thread::sleep(Duration::from_millis(100));
        let mut tick = 0u32;
        while feed.is_running() {
            feed.print([format!("[feed] background event #{tick}")]);
            tick += 1;
            thread::sleep(Duration::from_millis(700));
        }
    });

    let echo = handle.clone();
    engine.run(move |text| {
        if text == "quit" {
            echo.stop();
        } else {
            echo.status(format!("submitted {} bytes", text.len()));
        }
    })?;

    let _ = producer.join();
    Ok(())
}
