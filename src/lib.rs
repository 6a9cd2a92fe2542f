//! Scaler - interactive image scaling
//!
//! A viewer controller that resamples an image in the background, one
//! cancellable task at a time, and only ever displays the result of the
//! most recent request. The pixel math lives in the `resampler` crate.
//! This library exposes modules for integration testing.

pub mod console;
pub mod error;
pub mod models;
pub mod services;
