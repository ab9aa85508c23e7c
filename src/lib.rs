//! Synthetic deforestation monitoring rendered as a terminal dashboard.
//!
//! The crate is split into a data side (site generation, metrics, dashboard
//! statistics) and a rendering side (braille maps and ratatui charts). The
//! two meet in [`app::App`], which owns every piece of mutable session state.

pub mod app;
pub mod braille;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod map;
pub mod monitor;
pub mod rng;
pub mod site;
pub mod stats;
pub mod ui;
