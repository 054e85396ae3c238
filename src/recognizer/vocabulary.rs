//! Visual vocabulary: k-means cluster centres over keypoint descriptors.

use std::collections::HashSet;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use smartcore::cluster::kmeans::{KMeans, KMeansParameters};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::{DetectorError, Result};

type Clusters = KMeans<f32, u32, DenseMatrix<f32>, Vec<u32>>;

#[derive(Debug, Serialize, Deserialize)]
pub struct Vocabulary {
    size: usize,
    clusters: Clusters,
}

/// Cluster count, iteration budget and seeding for [`Vocabulary::cluster`].
#[derive(Debug, Clone, Copy)]
pub struct KMeansParams {
    pub clusters: usize,
    pub max_iterations: usize,
    pub seed: u64,
}

impl Vocabulary {
    /// Cluster `descriptors` into at most `params.clusters` words.
    ///
    /// The word count is capped by the number of distinct descriptors, and at
    /// least two distinct descriptors are required.
    pub fn cluster(descriptors: &[Vec<f32>], params: KMeansParams) -> Result<Vocabulary> {
        let distinct = distinct_count(descriptors);
        let k = params.clusters.min(distinct);
        if k < 2 {
            return Err(DetectorError::Training(format!(
                "a vocabulary needs at least two distinct descriptors, found {}",
                distinct
            )));
        }

        let data = DenseMatrix::from_2d_vec(&descriptors.to_vec()).map_err(DetectorError::training)?;
        let parameters = KMeansParameters {
            k,
            max_iter: params.max_iterations.max(1),
            seed: Some(params.seed),
        };
        let clusters = Clusters::fit(&data, parameters).map_err(DetectorError::training)?;

        info!("Built vocabulary of {} words from {} descriptors", k, descriptors.len());
        Ok(Vocabulary { size: k, clusters })
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Frequency of each word among `descriptors`, normalized by their count.
    pub fn histogram(&self, descriptors: &[Vec<f32>]) -> Vec<f32> {
        let mut hist = vec![0f32; self.size];
        if descriptors.is_empty() {
            return hist;
        }

        let words = DenseMatrix::from_2d_vec(&descriptors.to_vec())
            .and_then(|data| self.clusters.predict(&data));
        let words = match words {
            Ok(words) => words,
            Err(e) => {
                warn!("Cannot assign descriptors to words: {}", e);
                return hist;
            }
        };

        for word in words {
            hist[word as usize] += 1.0;
        }
        let n = descriptors.len() as f32;
        for h in hist.iter_mut() {
            *h /= n;
        }
        hist
    }
}

fn distinct_count(descriptors: &[Vec<f32>]) -> usize {
    descriptors
        .iter()
        .map(|d| d.iter().map(|v| v.to_bits()).collect::<Vec<u32>>())
        .collect::<HashSet<_>>()
        .len()
}
