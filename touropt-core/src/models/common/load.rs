#[cfg(test)]
#[path = "../../../tests/unit/models/common/load_test.rs"]
mod load_test;

use crate::utils::GenericResult;
use std::ops::{Add, Sub};

const LOAD_DIMENSION_SIZE: usize = 8;

/// Specifies a multi dimensional, signed load vector: positive components model pickups,
/// negative ones deliveries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Load {
    /// Load data.
    load: [i64; LOAD_DIMENSION_SIZE],
    /// Actual used size.
    size: usize,
}

impl Load {
    /// Creates a new instance of `Load`.
    pub fn new(data: Vec<i64>) -> Self {
        assert!(data.len() <= LOAD_DIMENSION_SIZE);

        let mut load = [0; LOAD_DIMENSION_SIZE];
        for (idx, value) in data.iter().enumerate() {
            load[idx] = *value;
        }

        Self { load, size: data.len() }
    }

    /// Creates a new instance of `Load` rejecting data which exceeds the dimension cap.
    pub fn try_new(data: Vec<i64>) -> GenericResult<Self> {
        if data.len() > LOAD_DIMENSION_SIZE {
            return Err(
                format!("load has {} dimensions, at most {LOAD_DIMENSION_SIZE} are supported", data.len()).into()
            );
        }

        Ok(Self::new(data))
    }

    /// Checks whether load has no non-zero components.
    pub fn is_empty(&self) -> bool {
        self.load.iter().all(|v| *v == 0)
    }

    /// Returns true if all components of `other` fit into this load seen as a capacity.
    pub fn can_fit(&self, other: &Self) -> bool {
        self.load.iter().zip(other.load.iter()).all(|(a, b)| a >= b)
    }

    /// Returns a load with component-wise absolute values.
    pub fn abs(&self) -> Self {
        let mut result = *self;
        result.load.iter_mut().for_each(|v| *v = v.abs());

        result
    }

    /// Returns a load with component-wise maximum values of two.
    pub fn max_load(self, other: Self) -> Self {
        let mut result = self;
        result.load.iter_mut().zip(other.load.iter()).for_each(|(a, b)| *a = (*a).max(*b));
        result.size = result.size.max(other.size);

        result
    }

    /// Converts to vector representation.
    pub fn as_vec(&self) -> Vec<i64> {
        if self.size == 0 {
            vec![0]
        } else {
            self.load[..self.size].to_vec()
        }
    }
}

impl Default for Load {
    fn default() -> Self {
        Self { load: [0; LOAD_DIMENSION_SIZE], size: 0 }
    }
}

impl Add for Load {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let mut result = self;

        for (idx, value) in rhs.load.iter().enumerate() {
            result.load[idx] += *value;
        }
        result.size = result.size.max(rhs.size);

        result
    }
}

impl Sub for Load {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        let mut result = self;

        for (idx, value) in rhs.load.iter().enumerate() {
            result.load[idx] -= *value;
        }
        result.size = result.size.max(rhs.size);

        result
    }
}
