mod response;

pub use response::{ClassPrediction, ClassifyResponse, TensorData, WaveformData};

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_JSON: &str = r#"{
        "predictions": [
            {"class": "dog", "confidence": 0.82},
            {"class": "rain", "confidence": 0.11},
            {"class": "sea_waves", "confidence": 0.04}
        ],
        "visualization": {
            "conv1": {"shape": [2, 3], "values": [[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]]}
        },
        "input_spectogram": {"shape": [2, 2], "values": [[-80.0, -40.0], [-20.0, 0.0]]},
        "waveform": {"values": [0.0, 0.5, -0.5], "sample_rate": 44100, "duration": 2.5}
    }"#;

    #[test]
    fn test_parse_response() {
        let response = ClassifyResponse::from_json_bytes(TEST_JSON.as_bytes()).unwrap();

        assert_eq!(response.predictions.len(), 3);
        assert_eq!(response.predictions[0].class, "dog");
        assert!((response.predictions[0].confidence - 0.82).abs() < 1e-9);

        assert_eq!(response.input_spectrogram.shape, vec![2, 2]);
        assert_eq!(response.waveform.sample_rate, 44100);
        assert_eq!(response.waveform.values.len(), 3);
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(ClassifyResponse::from_json_bytes(b"not json").is_err());
    }

    #[test]
    fn test_tensor_well_formed() {
        let tensor = TensorData {
            shape: vec![2, 3],
            values: vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]],
        };
        assert!(tensor.is_well_formed());
        assert_eq!(tensor.rows(), 2);
        assert_eq!(tensor.cols(), 3);
    }

    #[test]
    fn test_tensor_ragged_is_not_well_formed() {
        let tensor = TensorData {
            shape: vec![2, 3],
            values: vec![vec![0.0, 1.0, 2.0], vec![3.0]],
        };
        assert!(!tensor.is_well_formed());
        // cols still reports the widest row so renderers can size cells
        assert_eq!(tensor.cols(), 3);
    }

    #[test]
    fn test_layer_names_sorted() {
        let response = ClassifyResponse::from_json_bytes(TEST_JSON.as_bytes()).unwrap();
        assert_eq!(response.layer_names(), vec!["conv1".to_string()]);
    }

    #[test]
    fn test_top_prediction() {
        let response = ClassifyResponse::from_json_bytes(TEST_JSON.as_bytes()).unwrap();
        assert_eq!(response.top_prediction().unwrap().class, "dog");
    }

    #[test]
    fn test_confidence_pct() {
        let p = ClassPrediction {
            class: "dog".to_string(),
            confidence: 0.873,
        };
        assert_eq!(p.confidence_pct(), "87.3%");
    }
}
