pub mod auth;
pub mod bookings;
pub mod dto;
pub mod extract;
pub mod favorites;
pub mod identity;
pub mod messages;
pub mod middleware;
pub mod reply_task;
pub mod rest;
pub mod router;
pub mod state;

// Re-export the router builder to make it easily accessible
// to the binary that will start the web server.
pub use middleware::{require_auth, CurrentUser};
pub use router::build_router;
