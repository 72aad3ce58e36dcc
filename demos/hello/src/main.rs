//! Hello Demo
//!
//! Four routes, each registered as a slash command:
//!
//! ```text
//! /hello/:name?age=     streams a progress line, then a greeting
//! /links                replies with two buttons (one clicks back into /hello)
//! /report?rows=         uploads a CSV attachment
//! /roll/:sides(\d+)     rolls a die for the invoking user
//! ```
//!
//! Every route also answers plain HTTP, e.g. `curl localhost:8080/hello/Ann?age=9`.
//!
//! # Usage
//!
//! ```bash
//! cp demos/hello/hookcord.toml .
//! cargo run --package hello-demo
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use hookcord::prelude::*;
use tracing::{debug, info};

// ============================================================================
// Handlers
// ============================================================================

/// Streams a progress line rewritten in place, then the greeting.
async fn hello(req: Request, _conn: ConnectionInfo, params: Params) -> Response {
    let name = params.get("name").unwrap_or("stranger").to_string();
    let age = params.get("age").map(str::to_string);
    let cancel = req.cancellation().clone();
    let (tx, response) = req.stream();

    tokio::spawn(async move {
        for percent in (0..=100).step_by(20) {
            if cancel.is_cancelled() {
                debug!("Reply went away, stopping");
                return;
            }
            if tx.send(format!("\rWarming up... {percent}%")).await.is_err() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(400)).await;
        }

        let greeting = match age {
            Some(age) => format!("\u{c}Hello, {name}! {age} is a fine age.\r\n"),
            None => format!("\u{c}Hello, {name}!\r\n"),
        };
        let _ = tx.send(greeting).await;
    });

    response
}

/// Replies with a local button and an external link.
async fn links(_req: Request, _conn: ConnectionInfo, _params: Params) -> Response {
    Response::text("Where to?").header(
        LINK,
        HeaderValue::from_static(
            r#"</hello/World?age=1>; title="Say hello", <https://www.rust-lang.org>; title="Rust""#,
        ),
    )
}

/// Uploads a small CSV file.
async fn report(_req: Request, _conn: ConnectionInfo, params: Params) -> Response {
    let rows: usize = params
        .get("rows")
        .and_then(|r| r.parse().ok())
        .unwrap_or(5)
        .min(1000);

    let mut csv = String::from("n,square\n");
    for n in 1..=rows {
        csv.push_str(&format!("{n},{}\n", n * n));
    }

    Response::text(csv)
        .header(CONTENT_TYPE, HeaderValue::from_static("text/csv"))
        .header(
            CONTENT_DISPOSITION,
            HeaderValue::from_static(r#"attachment; filename="squares.csv""#),
        )
}

/// Rolls a die with `sides` faces.
async fn roll(req: Request, _conn: ConnectionInfo, params: Params) -> Result<String> {
    let sides: u64 = params.get("sides").unwrap_or("6").parse()?;
    anyhow::ensure!(sides > 0, "a die needs at least one side");

    let seed = SystemTime::now().duration_since(UNIX_EPOCH)?.subsec_nanos() as u64;
    let who = req
        .header(USER_ID_HEADER.as_str())
        .map(|id| format!("<@{id}>"))
        .unwrap_or_else(|| "You".to_string());

    Ok(format!("{who} rolled {} (d{sides})", seed % sides + 1))
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let runtime = HookcordRuntime::new()
        .route("/hello/:name?age=", hello)?
        .add_route(Route::new("/links", links)?.description("Show some buttons"))
        .add_route(Route::new("/report?rows=", report)?.description("Upload a table of squares"))
        .route(r"/roll/:sides(\d+)", roll)?;

    info!(
        port = runtime.config().server.port,
        routes = runtime.route_count(),
        "Starting hello demo"
    );

    runtime.run().await?;
    Ok(())
}
