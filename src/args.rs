use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Camera Index (default 0)
    #[arg(short, long, default_value_t = 0)]
    pub cam_index: u32,

    /// Path to the hand landmark ONNX model
    #[arg(long, default_value = "models/hand_landmark.onnx")]
    pub landmark_model: String,

    /// Path to the palm detection ONNX model
    #[arg(long, default_value = "models/palm_detection.onnx")]
    pub palm_model: String,

    /// Run against a simulated hand instead of the ONNX models
    #[arg(long, default_value_t = false)]
    pub simulate: bool,

    /// List available cameras
    #[arg(long)]
    pub list: bool,
}
