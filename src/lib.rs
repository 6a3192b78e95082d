//! Webcam Rock-Paper-Scissors: geometric gesture classification over 21
//! hand landmarks, a dwell-debounce filter, and a clock-stepped round state
//! machine. The binary in `main.rs` wires these to a camera, an ONNX
//! landmark pipeline, and a window; everything here runs without any of
//! those.

pub mod args;
pub mod camera;
pub mod classifier;
pub mod config;
pub mod detector;
pub mod font;
pub mod inference;
pub mod opponent;
pub mod outcome;
pub mod output;
pub mod pipeline;
pub mod round;
pub mod stability;
pub mod ttf;
pub mod types;
