//! ONNX sentiment backend: local inference via `twitter-roberta-base-sentiment`
//!
//! Uses the `ort` crate for ONNX Runtime and `tokenizers` for BPE tokenization.
//! The model emits three logits per text; the arg-max class is reported as
//! `LABEL_<index>` together with its softmax probability.

use async_trait::async_trait;
use ndarray::{Array1, ArrayView1};
use ort::session::Session;
use ort::value::Tensor;
use std::sync::{Arc, Mutex};
use tokenizers::TruncationParams;

use crate::classifier::{
    Classification, ClassifierError, OnnxClassifierConfig, SentimentClassifier,
};

/// Local ONNX sentiment classifier.
pub struct OnnxSentimentClassifier {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<tokenizers::Tokenizer>,
}

impl std::fmt::Debug for OnnxSentimentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxSentimentClassifier").finish_non_exhaustive()
    }
}

impl OnnxSentimentClassifier {
    /// Load the ONNX model and tokenizer named in `config`.
    ///
    /// Returns `ClassifierError::ModelNotFound` if either file is missing.
    pub fn new(config: OnnxClassifierConfig) -> Result<Self, ClassifierError> {
        if !config.model_path.exists() {
            return Err(ClassifierError::ModelNotFound {
                path: config.model_path.display().to_string(),
            });
        }
        if !config.tokenizer_path.exists() {
            return Err(ClassifierError::ModelNotFound {
                path: config.tokenizer_path.display().to_string(),
            });
        }

        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(config.intra_threads))
            .and_then(|b| b.commit_from_file(&config.model_path))
            .map_err(|e| ClassifierError::OnnxInference(e.to_string()))?;

        let mut tokenizer = tokenizers::Tokenizer::from_file(&config.tokenizer_path)
            .map_err(|e| ClassifierError::Tokenizer(e.to_string()))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_length,
                ..Default::default()
            }))
            .map_err(|e| ClassifierError::Tokenizer(e.to_string()))?;

        tracing::info!(
            model = %config.model_path.display(),
            max_length = config.max_length,
            "Loaded ONNX sentiment model"
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }
}

#[async_trait]
impl SentimentClassifier for OnnxSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        // ONNX inference is CPU-bound; run on the blocking thread pool.
        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let text = text.to_string();

        tokio::task::spawn_blocking(move || {
            let mut session_guard = session.lock().map_err(|e| {
                ClassifierError::OnnxInference(format!("session lock poisoned: {e}"))
            })?;
            classify_sync(&mut session_guard, &tokenizer, &text)
        })
        .await
        .map_err(|e| ClassifierError::OnnxInference(format!("spawn_blocking join error: {e}")))?
    }

    fn name(&self) -> &str {
        "onnx"
    }
}

/// Run ONNX inference synchronously.
fn classify_sync(
    session: &mut Session,
    tokenizer: &tokenizers::Tokenizer,
    text: &str,
) -> Result<Classification, ClassifierError> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| ClassifierError::Tokenizer(e.to_string()))?;

    let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
    let attention_mask: Vec<i64> = encoding
        .get_attention_mask()
        .iter()
        .map(|&m| m as i64)
        .collect();

    let shape = vec![1i64, input_ids.len() as i64];

    let input_ids_tensor = Tensor::from_array((shape.clone(), input_ids))
        .map_err(|e| ClassifierError::OnnxInference(e.to_string()))?;
    let attention_mask_tensor = Tensor::from_array((shape, attention_mask))
        .map_err(|e| ClassifierError::OnnxInference(e.to_string()))?;

    let inputs = ort::inputs! {
        "input_ids" => input_ids_tensor,
        "attention_mask" => attention_mask_tensor,
    };

    let outputs = session
        .run(inputs)
        .map_err(|e| ClassifierError::OnnxInference(e.to_string()))?;

    // Expected shape: [1, num_labels]
    let (out_shape, data) = outputs[0]
        .try_extract_tensor::<f32>()
        .map_err(|e| ClassifierError::OnnxInference(e.to_string()))?;
    if out_shape.len() != 2 {
        return Err(ClassifierError::OnnxInference(format!(
            "Expected 2D logits, got {}D",
            out_shape.len()
        )));
    }
    let num_labels = out_shape[1] as usize;
    let logits = data.get(..num_labels).ok_or(ClassifierError::EmptyOutput)?;

    classification_from_logits(logits)
}

/// Softmax the logits and report the most probable class.
pub fn classification_from_logits(logits: &[f32]) -> Result<Classification, ClassifierError> {
    let probs = softmax(ArrayView1::from(logits));
    let (index, score) = probs
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, p)| match best {
            Some((_, bp)) if bp >= p => best,
            _ => Some((i, p)),
        })
        .ok_or(ClassifierError::EmptyOutput)?;

    Ok(Classification {
        raw_label: format!("LABEL_{index}"),
        score,
    })
}

fn softmax(logits: ArrayView1<'_, f32>) -> Array1<f32> {
    let max = logits.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
    let exp = logits.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_model_not_found_returns_error() {
        let config = OnnxClassifierConfig {
            model_path: PathBuf::from("/nonexistent/model.onnx"),
            tokenizer_path: PathBuf::from("/nonexistent/model-tokenizer.json"),
            max_length: 512,
            intra_threads: 1,
        };

        match OnnxSentimentClassifier::new(config).unwrap_err() {
            ClassifierError::ModelNotFound { path } => {
                assert!(path.contains("nonexistent"), "path was: {path}");
            }
            other => panic!("Expected ModelNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn test_argmax_becomes_raw_label() {
        let c = classification_from_logits(&[-1.2, 0.3, 2.9]).unwrap();
        assert_eq!(c.raw_label, "LABEL_2");
        assert!(c.score > 0.5 && c.score <= 1.0, "score was {}", c.score);

        let c = classification_from_logits(&[3.0, 0.1, -2.0]).unwrap();
        assert_eq!(c.raw_label, "LABEL_0");
    }

    #[test]
    fn test_equal_logits_split_probability() {
        let c = classification_from_logits(&[0.5, 0.5, 0.5]).unwrap();
        assert_eq!(c.raw_label, "LABEL_0");
        assert!((c.score - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_softmax_is_stable_for_large_logits() {
        let probs = softmax(ArrayView1::from(&[1000.0f32, 999.0, -1000.0][..]));
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!((probs.sum() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_logits_is_an_error() {
        assert!(matches!(
            classification_from_logits(&[]),
            Err(ClassifierError::EmptyOutput)
        ));
    }
}
