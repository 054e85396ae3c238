use log::debug;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::svm::Kernels;
use smartcore::svm::svc::{SVC, SVCParameters};

use crate::error::{DetectorError, Result};
use crate::models::Verdict;
use crate::recognizer::PatchClassifier;

/// Two-class SVM with a linear kernel, kept as its separating hyperplane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvm {
    pub weights: Vec<f32>,
    pub bias: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct SvmParams {
    pub c: f64,
    pub epochs: usize,
    pub seed: u64,
}

impl LinearSvm {
    /// Train on `samples`, where `labels[i]` is `true` for the boat class.
    /// Both classes must be present.
    pub fn train(samples: &[Vec<f32>], labels: &[bool], params: SvmParams) -> Result<LinearSvm> {
        let dim = samples.first().map(Vec::len).unwrap_or(0);
        let rows: Vec<Vec<f64>> = samples
            .iter()
            .map(|s| s.iter().map(|&v| v as f64).collect())
            .collect();
        let x = DenseMatrix::from_2d_vec(&rows).map_err(DetectorError::training)?;
        let y: Vec<i32> = labels.iter().map(|&boat| if boat { 1 } else { -1 }).collect();

        // The origin, then one unit vector per feature
        let mut basis = vec![vec![0f64; dim]; dim + 1];
        for (j, row) in basis.iter_mut().skip(1).enumerate() {
            row[j] = 1.0;
        }
        let basis = DenseMatrix::from_2d_vec(&basis).map_err(DetectorError::training)?;

        let parameters = SVCParameters::default()
            .with_c(params.c)
            .with_epoch(params.epochs.max(1))
            .with_seed(Some(params.seed))
            .with_kernel(Kernels::linear());
        let svc = SVC::fit(&x, &y, &parameters).map_err(DetectorError::training)?;

        // A linear decision function is affine, so its values on the basis
        // give the bias and each weight directly
        let responses = svc.decision_function(&basis).map_err(DetectorError::training)?;
        let bias = responses[0];
        let weights = responses[1..].iter().map(|r| (r - bias) as f32).collect();

        debug!("SVM fitted on {} samples of dimension {}", samples.len(), dim);
        Ok(LinearSvm {
            weights,
            bias: bias as f32,
        })
    }

    pub fn decision(&self, descriptor: &[f32]) -> f32 {
        dot(&self.weights, descriptor) + self.bias
    }
}

impl PatchClassifier for LinearSvm {
    fn classify(&self, descriptor: &[f32]) -> Verdict {
        if self.decision(descriptor) > 0.0 {
            Verdict::Boat
        } else {
            Verdict::NotBoat
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
