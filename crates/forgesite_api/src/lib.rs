//! JSON boundary for the forgesite activation and aggregation core.
//! The HTTP server in front of this crate only routes paths to handlers
//! and writes the returned status/body pairs.

mod api;

pub use api::{
    get_active_units, get_aggregate_summary, get_visit_snapshot, post_increment_visits,
    post_reset_visits, post_toggle, ApiResponse,
};
