use anyhow::Result;
use image::{imageops::FilterType, ImageBuffer, Rgb};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::warn;

use crate::detector::PalmDetector;
use crate::pipeline::Pipeline;
use crate::types::{HandLandmarks, Point3D, Symbol, LANDMARK_COUNT};

const LANDMARK_INPUT: u32 = 224;

/// Palm detection + 21-point hand landmark regression, both ONNX.
///
/// Either model may be missing on disk: without the detector the landmark
/// model runs on the full frame (poor accuracy, still works); without the
/// landmark model the pipeline reports no hand.
pub struct HandLandmarkPipeline {
    landmark_session: Option<Session>,
    detector: Option<PalmDetector>,
}

impl HandLandmarkPipeline {
    pub fn new(model_path: &str, detector_path: &str) -> Result<Self> {
        let detector = if Path::new(detector_path).exists() {
            println!("Loading palm detector...");
            Some(PalmDetector::new(detector_path)?)
        } else {
            println!("Palm detector not found. Accuracy will be poor.");
            None
        };

        let landmark_session = if Path::new(model_path).exists() {
            println!("Loading hand landmark model from {}...", model_path);
            Some(
                Session::builder()?
                    .with_optimization_level(GraphOptimizationLevel::Level3)?
                    .with_intra_threads(4)?
                    .with_execution_providers([
                        ort::execution_providers::CPUExecutionProvider::default().build(),
                    ])?
                    .commit_from_file(model_path)?,
            )
        } else {
            println!("Hand landmark model not found at {}.", model_path);
            None
        };

        Ok(Self {
            landmark_session,
            detector,
        })
    }
}

impl Pipeline for HandLandmarkPipeline {
    fn name(&self) -> String {
        "Hand Landmarks (21 pts)".to_string()
    }

    fn process(&mut self, frame: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> Result<Option<HandLandmarks>> {
        let roi = if let Some(det) = &mut self.detector {
            det.detect(frame)?
        } else {
            None
        };

        // Crop to the palm box (padded: the box covers the palm, the fingers
        // extend well past it), or fall back to the full frame when no
        // detector is loaded.
        let (crop, offset_x, offset_y, scale_x, scale_y) = if let Some(rect) = roi {
            let pad_w = rect.width * 1.6;
            let pad_h = rect.height * 1.6;
            let mut x = rect.x - pad_w / 2.0;
            let mut y = rect.y - pad_h / 2.0;
            let mut w = rect.width + pad_w;
            let mut h = rect.height + pad_h;

            if x < 0.0 {
                x = 0.0;
            }
            if y < 0.0 {
                y = 0.0;
            }
            if x + w > frame.width() as f32 {
                w = frame.width() as f32 - x;
            }
            if y + h > frame.height() as f32 {
                h = frame.height() as f32 - y;
            }

            let crop =
                image::imageops::crop_imm(frame, x as u32, y as u32, w as u32, h as u32).to_image();
            let sx = w / LANDMARK_INPUT as f32;
            let sy = h / LANDMARK_INPUT as f32;
            (crop, x, y, sx, sy)
        } else if self.detector.is_some() {
            // Detector active but no palm in view.
            return Ok(None);
        } else {
            (
                frame.clone(),
                0.0,
                0.0,
                frame.width() as f32 / LANDMARK_INPUT as f32,
                frame.height() as f32 / LANDMARK_INPUT as f32,
            )
        };

        let Some(model) = &mut self.landmark_session else {
            return Ok(None);
        };

        let resized =
            image::imageops::resize(&crop, LANDMARK_INPUT, LANDMARK_INPUT, FilterType::Triangle);
        let mut input_data = Vec::with_capacity((LANDMARK_INPUT * LANDMARK_INPUT * 3) as usize);
        for y in 0..LANDMARK_INPUT {
            for x in 0..LANDMARK_INPUT {
                let pixel = resized.get_pixel(x, y);
                input_data.push(pixel[0] as f32 / 255.0);
                input_data.push(pixel[1] as f32 / 255.0);
                input_data.push(pixel[2] as f32 / 255.0);
            }
        }

        let shape = vec![1, 224, 224, 3];
        let input = ort::value::Tensor::from_array((shape, input_data))?;
        let outputs = model.run(ort::inputs![input])?;

        let (_, output_data) = outputs[0].try_extract_tensor::<f32>()?;

        if output_data.len() < LANDMARK_COUNT * 3 {
            // Model contract broken; skip the frame rather than guess.
            warn!(
                "landmark model returned {} values, expected at least {}",
                output_data.len(),
                LANDMARK_COUNT * 3
            );
            return Ok(None);
        }

        let mut points = Vec::with_capacity(LANDMARK_COUNT);
        for i in 0..LANDMARK_COUNT {
            // Model space (0..224) -> crop -> full frame.
            let mx = output_data[i * 3];
            let my = output_data[i * 3 + 1];
            let mz = output_data[i * 3 + 2];
            points.push(Point3D {
                x: offset_x + mx * scale_x,
                y: offset_y + my * scale_y,
                z: mz,
            });
        }

        Ok(Some(HandLandmarks::from_points(points)?))
    }
}

/// Model-free pipeline that synthesizes a hand cycling through the three
/// poses, with a short no-hand gap between rounds so the whole game loop is
/// exercisable without a camera model.
pub struct SimulatedHandPipeline {
    start_time: std::time::Instant,
}

impl SimulatedHandPipeline {
    pub fn new() -> Self {
        Self {
            start_time: std::time::Instant::now(),
        }
    }
}

impl Default for SimulatedHandPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline for SimulatedHandPipeline {
    fn name(&self) -> String {
        "Simulated Hand".to_string()
    }

    fn process(&mut self, frame: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> Result<Option<HandLandmarks>> {
        let t = self.start_time.elapsed().as_secs_f32();
        let period = 8.0;
        let phase = t % period;

        // One second without a hand resets the round, then the pose holds.
        if phase < 1.0 {
            return Ok(None);
        }

        let pose = match ((t / period) as usize) % 3 {
            0 => Symbol::Rock,
            1 => Symbol::Paper,
            _ => Symbol::Scissors,
        };

        let w = frame.width() as f32;
        let h = frame.height() as f32;
        let points = synthetic_pose(pose, w / 2.0, h / 2.0, h * 0.35);
        Ok(Some(HandLandmarks::from_points(points)?))
    }
}

/// Builds 21 points for a canonical pose, palm centered at (cx, cy), fingers
/// pointing up. Also used by the integration tests.
pub fn synthetic_pose(pose: Symbol, cx: f32, cy: f32, scale: f32) -> Vec<Point3D> {
    // Curl per finger: thumb, index, middle, ring, pinky.
    let curl = match pose {
        Symbol::Rock => [true; 5],
        Symbol::Paper => [false; 5],
        Symbol::Scissors => [true, false, false, true, true],
        Symbol::Unknown => [true, false, true, true, false], // index+pinky
    };
    synthetic_hand(curl, cx, cy, scale)
}

/// Same pose generator with explicit per-finger curl, for classifier tests
/// that need non-canonical finger combinations.
pub fn synthetic_hand(curl: [bool; 5], cx: f32, cy: f32, scale: f32) -> Vec<Point3D> {
    let mut pts = vec![Point3D::default(); LANDMARK_COUNT];
    let p = |x: f32, y: f32| Point3D::new(cx + (x - 0.5) * scale, cy + (y - 0.65) * scale, 0.0);

    pts[0] = p(0.5, 0.9); // wrist

    let thumb_out = [(0.45, 0.85), (0.40, 0.80), (0.35, 0.75), (0.30, 0.70)];
    let thumb_in = [(0.45, 0.85), (0.44, 0.80), (0.45, 0.76), (0.46, 0.73)];
    let thumb = if curl[0] { &thumb_in } else { &thumb_out };
    for (k, &(x, y)) in thumb.iter().enumerate() {
        pts[1 + k] = p(x, y);
    }

    for f in 0..4 {
        let x = 0.42 + f as f32 * 0.05;
        let base = 5 + f * 4;
        pts[base] = p(x, 0.60);
        if curl[f + 1] {
            pts[base + 1] = p(x, 0.55);
            pts[base + 2] = p(x, 0.62);
            pts[base + 3] = p(x, 0.70);
        } else {
            pts[base + 1] = p(x, 0.45);
            pts[base + 2] = p(x, 0.32);
            pts[base + 3] = p(x, 0.20);
        }
    }

    pts
}
