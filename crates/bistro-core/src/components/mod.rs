//! Components - pure data attached to entities.

mod common;
mod guests;
mod orders;
mod staff;
mod tables;

pub use common::{Movement, Position, Vec2};
pub use guests::{Guest, GuestState, Patience};
pub use orders::Order;
pub use staff::{Staff, StaffState};
pub use tables::Table;
