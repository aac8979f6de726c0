//! Integration tests for Trellis.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! cargo run -p trellis-cli -- migrate
//!
//! # Start the server
//! cargo run -p trellis-server
//!
//! # Run integration tests
//! cargo test -p trellis-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `TRELLIS_BASE_URL` - Server base URL (default: `http://localhost:4000`)
//! - `TRELLIS_ADMIN_EMAIL` / `TRELLIS_ADMIN_PASSWORD` - Must match the
//!   credentials the server was started with
//!
//! Tests are `#[ignore]`d by default because they need a running server and
//! database; each test registers its own throwaway user, so reruns against
//! the same database are safe.

/// Server base URL (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("TRELLIS_BASE_URL").unwrap_or_else(|_| "http://localhost:4000".to_string())
}

/// WebSocket URL derived from the base URL.
#[must_use]
pub fn ws_url() -> String {
    let base = base_url();
    let base = base
        .strip_prefix("http://")
        .map(|rest| format!("ws://{rest}"))
        .or_else(|| {
            base.strip_prefix("https://")
                .map(|rest| format!("wss://{rest}"))
        })
        .unwrap_or_else(|| format!("ws://{base}"));
    format!("{base}/ws")
}
