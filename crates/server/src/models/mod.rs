//! Domain types.
//!
//! These types represent validated domain objects separate from database row
//! types; the `db` module converts between the two.

pub mod address;
pub mod cart;
pub mod order;
pub mod user;

pub use address::{Address, AddressFields, AddressPatch, AddressSnapshot, MissingAddressField};
pub use cart::CartData;
pub use order::{AdminOrder, Order, OrderItem};
pub use user::User;
