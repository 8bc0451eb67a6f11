//! Launcher extensions, reworked as a terminal crate
//!
//! This library provides:
//! - The snake engine (game module) and its terminal driver (modes, render, input)
//! - A wrapper around the speedtest CLI with live progress (speedtest module)
//! - A cached-fetch state machine for refreshable data (fetch module)

pub mod fetch;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod speedtest;
