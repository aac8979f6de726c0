//! Business-logic services.
//!
//! Each service wraps the repositories it needs and owns the error type for
//! its seam; route handlers stay thin and translate service errors through
//! `AppError`.

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod orders;
pub mod stripe;

pub use addresses::{AddressBookService, AddressError};
pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService};
pub use orders::{AddressSelector, OrderError, OrderService};
pub use stripe::{StripeClient, StripeError};
