//! Magic Mount console
//!
//! Binary support library: the headless runner that drives the stores from
//! `mmui-app` and reports them as NDJSON.

pub mod headless;

pub use headless::runner::{run_headless, HeadlessOptions};
