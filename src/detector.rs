use anyhow::Result;
use image::{imageops::FilterType, ImageBuffer, Rgb};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;

/// Axis-aligned box in frame coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

const INPUT_SIZE: usize = 192;

/// SSD-style palm detector. Finds the strongest palm box in the frame; the
/// landmark model runs on a crop around it.
pub struct PalmDetector {
    session: Session,
    anchors: Vec<(f32, f32)>, // normalized anchor centers (cx, cy)
}

impl PalmDetector {
    pub fn new(model_path: &str) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .with_execution_providers([
                ort::execution_providers::CPUExecutionProvider::default().build(),
            ])?
            .commit_from_file(model_path)?;

        let anchors = generate_anchors(INPUT_SIZE);
        Ok(Self { session, anchors })
    }

    pub fn detect(&mut self, frame: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> Result<Option<Rect>> {
        // Preprocess: resize to 192x192, NCHW, [-1, 1]
        let resized = image::imageops::resize(
            frame,
            INPUT_SIZE as u32,
            INPUT_SIZE as u32,
            FilterType::Triangle,
        );

        let mut input_data = Vec::with_capacity(3 * INPUT_SIZE * INPUT_SIZE);
        for c in 0..3 {
            for y in 0..INPUT_SIZE {
                for x in 0..INPUT_SIZE {
                    let p = resized.get_pixel(x as u32, y as u32)[c];
                    input_data.push(p as f32 / 127.5 - 1.0);
                }
            }
        }

        let input_tensor = Tensor::from_array((vec![1, 3, 192, 192], input_data))?;
        let outputs = self.session.run(ort::inputs![input_tensor])?;

        // Output 0: box regressors [1, N, 18], output 1: logits [1, N, 1]
        let (_, boxes_data) = outputs[0].try_extract_tensor::<f32>()?;
        let (_, scores_data) = outputs[1].try_extract_tensor::<f32>()?;

        let best = Self::post_process(&self.anchors, scores_data, boxes_data, 0.7);

        if let Some(rect) = best {
            // Scale back from model space to the original frame.
            let sx = frame.width() as f32 / INPUT_SIZE as f32;
            let sy = frame.height() as f32 / INPUT_SIZE as f32;
            Ok(Some(Rect::new(
                rect.x * sx,
                rect.y * sy,
                rect.width * sx,
                rect.height * sy,
            )))
        } else {
            Ok(None)
        }
    }

    fn post_process(
        anchors: &[(f32, f32)],
        scores_raw: &[f32],
        boxes_raw: &[f32],
        threshold: f32,
    ) -> Option<Rect> {
        let mut best_score = threshold;
        let mut best_rect = None;

        // First 4 of the 18 regressors per anchor are dx, dy, w, h in model
        // pixels relative to the anchor center; the rest are palm keypoints
        // we do not use.
        for (i, &(ax, ay)) in anchors.iter().enumerate() {
            let score = sigmoid(scores_raw[i]);
            if score > best_score {
                let dx = boxes_raw[i * 18];
                let dy = boxes_raw[i * 18 + 1];
                let w = boxes_raw[i * 18 + 2];
                let h = boxes_raw[i * 18 + 3];

                let cx = ax * INPUT_SIZE as f32 + dx;
                let cy = ay * INPUT_SIZE as f32 + dy;

                best_score = score;
                best_rect = Some(Rect::new(cx - w / 2.0, cy - h / 2.0, w, h));
            }
        }

        best_rect
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Anchor grid for the 192x192 palm model: stride 8 contributes 2 anchors
/// per cell, the three stride-16 layers contribute 6, 2016 total. All
/// anchors are square and unit-sized; only their centers matter to the
/// decode.
fn generate_anchors(input_size: usize) -> Vec<(f32, f32)> {
    let mut anchors = Vec::new();
    let size = input_size as f32;

    for &(stride, per_cell) in &[(8usize, 2usize), (16, 6)] {
        let cells = input_size / stride;
        for v in 0..cells {
            for u in 0..cells {
                let cx = (u as f32 + 0.5) * stride as f32 / size;
                let cy = (v as f32 + 0.5) * stride as f32 / size;
                for _ in 0..per_cell {
                    anchors.push((cx, cy));
                }
            }
        }
    }
    anchors
}
