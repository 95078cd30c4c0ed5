//! Remote command dispatch for a lighting playback controller.
//!
//! A fixed registry of actions turns option values into device commands,
//! which are sent as HTTP GETs to the controller's `remote.cgi` endpoint.

#[cfg(feature = "api")]
pub mod api;
pub mod error;
pub mod model;
pub mod paths;
pub mod registry;
pub mod settings;
pub mod state;
pub mod transport;
pub mod util;
pub mod variables;
