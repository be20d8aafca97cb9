//! Core types and calculations for the campus portal.
//!
//! Everything here is a pure function over caller-supplied data, plus the
//! [`store::PortalStore`] abstraction that storage backends implement. This
//! crate has no HTTP or database dependencies.

// Native `async fn` in traits; the `Send` bounds are spelled out on the trait.
#![allow(async_fn_in_trait)]

pub mod assessment;
pub mod attendance;
pub mod calendar;
pub mod credits;
pub mod error;
pub mod feedback;
pub mod leave;
pub mod policy;
pub mod schedule;
pub mod store;
pub mod year_level;

pub use error::{Error, Result};
