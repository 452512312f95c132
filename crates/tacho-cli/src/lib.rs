//! CLI library components for the tachograph compliance engine.

pub mod logging;
