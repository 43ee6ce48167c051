use serde::{Deserialize, Serialize};

/// Fixed-length fingerprint of a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding {
    values: Vec<f32>,
}

impl Embedding {
    /// Build an embedding, scaling `values` to unit length.
    /// A zero vector is returned unchanged.
    pub fn normalized(values: Vec<f32>) -> Self {
        let norm = l2_norm(&values);
        if norm > 0.0 {
            Self {
                values: values.into_iter().map(|v| v / norm).collect(),
            }
        } else {
            Self { values }
        }
    }

    /// Wrap values as-is (for vectors read back from a snapshot).
    pub fn from_raw(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn zeros(dimension: usize) -> Self {
        Self {
            values: vec![0.0; dimension],
        }
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn norm(&self) -> f32 {
        l2_norm(&self.values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

pub(crate) fn l2_norm(values: &[f32]) -> f32 {
    values.iter().map(|v| v * v).sum::<f32>().sqrt()
}
