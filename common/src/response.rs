use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;

/// A single classifier prediction: class label plus softmax confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassPrediction {
    pub class: String,
    pub confidence: f64,
}

impl ClassPrediction {
    /// Confidence formatted as a percentage, e.g. "87.3%"
    pub fn confidence_pct(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }
}

/// A 2D numeric tensor as the endpoint ships it: declared shape plus
/// row-major nested values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorData {
    pub shape: Vec<usize>,
    pub values: Vec<Vec<f64>>,
}

impl TensorData {
    /// Whether the declared shape matches the actual value dimensions.
    ///
    /// The endpoint is trusted but not blindly: a mismatched or ragged
    /// tensor is still rendered cell-by-cell downstream, this just lets
    /// callers log the discrepancy.
    pub fn is_well_formed(&self) -> bool {
        if self.shape.len() != 2 {
            return false;
        }
        self.values.len() == self.shape[0]
            && self.values.iter().all(|row| row.len() == self.shape[1])
    }

    pub fn rows(&self) -> usize {
        self.values.len()
    }

    pub fn cols(&self) -> usize {
        self.values.iter().map(|row| row.len()).max().unwrap_or(0)
    }
}

/// Downsampled waveform returned alongside the classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveformData {
    pub values: Vec<f32>,
    pub sample_rate: u32,
    pub duration: f64,
}

/// Full response from the inference endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub predictions: Vec<ClassPrediction>,
    /// Mean-aggregated feature maps keyed by CNN layer name.
    pub visualization: HashMap<String, TensorData>,
    /// The endpoint spells this field without the "r".
    #[serde(rename = "input_spectogram")]
    pub input_spectrogram: TensorData,
    pub waveform: WaveformData,
}

impl ClassifyResponse {
    /// Parse a response from raw JSON bytes.
    pub fn from_json_bytes(data: &[u8]) -> Result<Self, Box<dyn Error>> {
        let response: ClassifyResponse = serde_json::from_slice(data)?;
        Ok(response)
    }

    /// Feature-map layer names in a stable display order.
    pub fn layer_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.visualization.keys().cloned().collect();
        names.sort();
        names
    }

    /// The top prediction, if the endpoint returned any.
    pub fn top_prediction(&self) -> Option<&ClassPrediction> {
        self.predictions.iter().max_by(|a, b| {
            a.confidence
                .partial_cmp(&b.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}
