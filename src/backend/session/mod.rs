//! Daily Sessions
//!
//! - **`calendar`** - Local calendar day of an instant in a timezone
//! - **`resolver`** - One session per group per local day, with carry-forward
//! - **`handlers`** - HTTP handlers for creating, reading and shuffling sessions

pub mod calendar;
pub mod handlers;
pub mod resolver;

pub use handlers::{create_session, get_session, shuffle_session};
pub use resolver::{new_shuffle_seed, SessionResolver};
