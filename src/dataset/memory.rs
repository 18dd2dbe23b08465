use crate::dataset::Dataset;
use crate::model::ModelError;
use ndarray::{s, Array1, Array2};
use std::ops::Range;

/// Dense feature matrix and target held in memory.
#[derive(Clone, Debug)]
pub struct InMemoryDataset {
    x: Array2<f64>,
    y: Array1<f64>,
}

impl InMemoryDataset {
    pub fn new(x: Array2<f64>, y: Array1<f64>) -> Result<Self, ModelError> {
        if x.nrows() != y.len() {
            return Err(ModelError::InvalidParameter(format!(
                "x has {} rows but y has {} values",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() == 0 {
            return Err(ModelError::EmptyData("Dataset is empty".to_string()));
        }
        Ok(Self { x, y })
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }
}

impl Dataset for InMemoryDataset {
    type Error = std::convert::Infallible;

    fn len(&self) -> Option<usize> {
        Some(self.x.nrows())
    }

    fn get_batch(&self, range: Range<usize>) -> Result<(Array2<f64>, Array1<f64>), Self::Error> {
        let x = self.x.slice(s![range.clone(), ..]).to_owned();
        let y = self.y.slice(s![range]).to_owned();
        Ok((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_batches_cover_all_rows() {
        let x = Array2::from_shape_fn((5, 2), |(i, j)| (i * 2 + j) as f64);
        let y = array![0.0, 1.0, 0.0, 1.0, 1.0];
        let dataset = InMemoryDataset::new(x, y).unwrap();

        let sizes: Vec<usize> = dataset
            .batches(2)
            .map(|b| b.unwrap().0.nrows())
            .collect();
        assert_eq!(sizes, vec![2, 2, 1]);

        let (last_x, last_y) = dataset.batches(2).last().unwrap().unwrap();
        assert_eq!(last_x, array![[8.0, 9.0]]);
        assert_eq!(last_y, array![1.0]);
    }

    #[test]
    fn test_zero_batch_size_still_advances() {
        let dataset = InMemoryDataset::new(Array2::zeros((3, 1)), Array1::zeros(3)).unwrap();
        assert_eq!(dataset.batches(0).count(), 3);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = InMemoryDataset::new(Array2::zeros((3, 1)), Array1::zeros(2));
        assert!(matches!(result, Err(ModelError::InvalidParameter(_))));
    }

    #[test]
    fn test_empty_rejected() {
        let result = InMemoryDataset::new(Array2::zeros((0, 1)), Array1::zeros(0));
        assert!(matches!(result, Err(ModelError::EmptyData(_))));
    }
}
