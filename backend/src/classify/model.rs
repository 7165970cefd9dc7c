use std::path::Path;
use std::sync::{Arc, Mutex};

use log::debug;
use ndarray::Array4;
use tch::{CModule, Device, Kind, Tensor};

use shared::{ModelFamily, NUM_CLASSES};

use crate::classify::preprocess::INPUT_SIZE;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("model execution failed: {0}")]
    Model(#[from] tch::TchError),
    #[error("expected 4 class probabilities, got {0}")]
    UnexpectedOutput(usize),
}

/// Softmax output of one forward pass, positionally indexed against
/// `shared::CLASS_LABELS`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probabilities([f32; NUM_CLASSES]);

impl Probabilities {
    pub fn new(values: [f32; NUM_CLASSES]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f32; NUM_CLASSES] {
        &self.0
    }

    /// Index and probability of the winning class.
    pub fn top(&self) -> (usize, f32) {
        self.0
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |best, (index, prob)| {
                if prob > best.1 { (index, prob) } else { best }
            })
    }

    pub fn confidence(&self) -> f32 {
        self.top().1
    }
}

/// One loaded classifier artifact, resident for process lifetime.
#[derive(Clone)]
pub struct Classifier {
    family: ModelFamily,
    module: Arc<Mutex<CModule>>,
}

impl Classifier {
    pub fn load(family: ModelFamily, path: &Path) -> Result<Self, tch::TchError> {
        let device = Device::cuda_if_available();
        let module = CModule::load_on_device(path, device)?;
        Ok(Self {
            family,
            module: Arc::new(Mutex::new(module)),
        })
    }

    /// Forward pass over one normalized NHWC batch. Blocking; no gradient
    /// state is kept between calls.
    pub fn probabilities(&self, input: &Array4<f32>) -> Result<Probabilities, InferenceError> {
        debug!("Running {} forward pass", self.family);
        let flat: Vec<f32> = input.iter().copied().collect();
        let side = i64::from(INPUT_SIZE);
        let tensor = Tensor::f_from_slice(&flat)?.f_view([1, side, side, 3])?;

        let output = self.module.lock().unwrap().forward_ts(&[tensor])?;
        let probs = output
            .softmax(-1, Kind::Float)
            .to_kind(Kind::Float)
            .f_view([-1])?;

        let count = probs.size()[0] as usize;
        if count != NUM_CLASSES {
            return Err(InferenceError::UnexpectedOutput(count));
        }
        let mut values = [0.0f32; NUM_CLASSES];
        probs.copy_data(&mut values, NUM_CLASSES);
        Ok(Probabilities::new(values))
    }
}

/// The two process-wide classifiers, shared read-only across requests.
#[derive(Clone)]
pub struct Engines {
    pub mobilenet: Classifier,
    pub efficientnet: Classifier,
}

impl Engines {
    pub fn classifier(&self, family: ModelFamily) -> &Classifier {
        match family {
            ModelFamily::Mobilenet => &self.mobilenet,
            ModelFamily::Efficientnet => &self.efficientnet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_picks_the_argmax() {
        let probs = Probabilities::new([0.1, 0.6, 0.2, 0.1]);
        assert_eq!(probs.top(), (1, 0.6));
        assert_eq!(probs.confidence(), 0.6);
    }

    #[test]
    fn top_prefers_the_earlier_class_on_exact_ties() {
        let probs = Probabilities::new([0.4, 0.4, 0.1, 0.1]);
        assert_eq!(probs.top().0, 0);
    }
}
