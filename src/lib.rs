// Library root
// -----------
// The binary (`main.rs`) is a thin shell over these modules.
//
// Module responsibilities:
// - `config`: the cached API key in `~/.pushbullet/config.json`.
// - `push`: push types and the builder that validates collected fields.
// - `api`: blocking HTTP calls to Pushbullet (device list, push creation).
// - `dispatch`: sends one push to several targets and joins the results.
// - `cli`: command-line flags and the non-interactive flow.
// - `ui`: the interactive wizard.
pub mod api;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod push;
pub mod ui;

pub use error::{PushError, Result};
