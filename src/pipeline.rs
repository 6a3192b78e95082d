use crate::types::HandLandmarks;
use anyhow::Result;
use image::{ImageBuffer, Rgb};

/// A landmark source: one camera frame in, at most one hand out.
/// `None` means no hand was visible this frame, which is a normal result.
pub trait Pipeline {
    fn name(&self) -> String;
    fn process(&mut self, frame: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> Result<Option<HandLandmarks>>;
}
