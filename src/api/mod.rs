//! Public entry points: the HTTP router and its shared state.

pub mod http;

pub use http::{router, AppState};
