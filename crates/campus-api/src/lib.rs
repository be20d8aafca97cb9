//! JSON REST API for the campus portal.
//!
//! Exposes an axum [`Router`] backed by any [`campus_core::store::PortalStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", campus_api::api_router(store.clone(), policy.clone()))
//! ```

pub mod assessment;
pub mod attendance;
pub mod calendar;
pub mod credits;
pub mod error;
pub mod feedback;
pub mod leave;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use campus_core::{policy::PortalPolicy, store::PortalStore};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:  Arc<S>,
  pub policy: Arc<PortalPolicy>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), policy: Arc::clone(&self.policy) }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, policy: Arc<PortalPolicy>) -> Router<()>
where
  S: PortalStore + 'static,
{
  Router::new()
    // Calendar
    .route("/academic-year", get(calendar::academic_year))
    .route("/year-level", get(calendar::year_level))
    // Attendance
    .route("/attendance/daily", post(attendance::save_daily::<S>))
    .route("/attendance/monthly", get(attendance::monthly::<S>))
    .route("/students/{id}/attendance", get(attendance::student_summary::<S>))
    // Feedback
    .route(
      "/feedback/window",
      put(feedback::set_window::<S>).get(feedback::get_window::<S>),
    )
    .route("/feedback/status", get(feedback::status::<S>))
    .route("/feedback", post(feedback::submit::<S>))
    .route("/faculty/{id}/feedback", get(feedback::entries::<S>))
    .route("/faculty/{id}/feedback-stats", get(feedback::stats::<S>))
    // Online tests
    .route("/tests/availability", post(assessment::availability))
    .route("/tests/score", post(assessment::score))
    // Leave
    .route("/leaves", post(leave::submit::<S>))
    .route("/faculty/{id}/leaves", get(leave::history::<S>))
    .route("/faculty/{id}/leave-balance", get(leave::balance::<S>))
    // Credits
    .route("/credits/progress", get(credits::progress))
    .route("/credits/promotion", post(credits::promotion))
    .with_state(ApiState { store, policy })
}
