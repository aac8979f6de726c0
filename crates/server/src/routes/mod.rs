//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check
//! GET  /health/ready                 - Readiness check (database ping)
//!
//! # Users (public)
//! POST /api/user/register            - Register, returns bearer token
//! POST /api/user/login               - Login, returns bearer token
//! POST /api/user/admin/login         - Admin login, returns bearer token
//!
//! # Users (bearer token)
//! GET    /api/user/profile           - Current user sans password
//! GET    /api/user/addresses         - List addresses
//! POST   /api/user/addresses         - Add address
//! PUT    /api/user/addresses/{addressId} - Partial update
//! DELETE /api/user/addresses/{addressId} - Delete
//!
//! # Cart (bearer token)
//! POST /api/cart/add                 - Increment (product, size) by one
//! POST /api/cart/update              - Overwrite quantity / remove entry
//! GET  /api/cart/get                 - Current snapshot
//!
//! # Orders (bearer token)
//! POST /api/order/place              - Place COD order
//! POST /api/order/stripe             - Place card order, returns session URL
//! GET  /api/order/verify             - Settle card payment (?orderId&success)
//! POST /api/order/userorders         - Caller's orders
//!
//! # Orders (admin token)
//! GET  /api/order/all                - Every order with purchaser joined in
//! PUT  /api/order/update             - Advance delivery status
//!
//! # Notifications (admin token via query param)
//! GET  /ws?token=...                 - WebSocket order event stream
//! ```
//!
//! Every response body is the `{success, message?, ...}` envelope.

pub mod addresses;
pub mod cart;
pub mod orders;
pub mod user;
pub mod ws;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Build the full application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/user", user_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/order", order_routes())
        .route("/ws", get(ws::subscribe))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(user::register))
        .route("/login", post(user::login))
        .route("/admin/login", post(user::admin_login))
        .route("/profile", get(user::profile))
        .route(
            "/addresses",
            get(addresses::list).post(addresses::add),
        )
        .route(
            "/addresses/{address_id}",
            put(addresses::update).delete(addresses::delete),
        )
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/get", get(cart::get))
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/place", post(orders::place))
        .route("/stripe", post(orders::place_stripe))
        .route("/verify", get(orders::verify))
        .route("/userorders", post(orders::user_orders))
        .route("/all", get(orders::all))
        .route("/update", put(orders::update_status))
}
