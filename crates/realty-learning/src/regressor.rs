//! Linear price models backed by linfa.
//!
//! Both algorithms reduce to a [`LinearModel`]: one coefficient per feature
//! column plus an intercept. Fitting goes through `linfa-linear` (ordinary
//! least squares) or `linfa-elasticnet` (Lasso); prediction is a plain dot
//! product so a saved model needs neither crate to be reloaded.

use crate::config::Algorithm;
use crate::error::LearningError;
use linfa::prelude::{Dataset, Fit, SingleTargetRegression};
use linfa_elasticnet::ElasticNet;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Coefficients and intercept of a fitted linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    /// Fit `algorithm` on `x`/`y`. `alpha` is the Lasso penalty and is
    /// ignored for linear regression.
    pub fn fit(
        algorithm: Algorithm,
        alpha: Option<f64>,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
    ) -> Result<Self, LearningError> {
        let dataset = Dataset::new(x.to_owned(), y.to_owned());

        let model = match algorithm {
            Algorithm::LinearRegression => {
                let fitted = LinearRegression::new()
                    .fit(&dataset)
                    .map_err(|e| LearningError::TrainingFailed(e.to_string()))?;
                Self {
                    coefficients: fitted.params().to_vec(),
                    intercept: fitted.intercept(),
                }
            }
            Algorithm::Lasso => {
                let penalty = alpha.ok_or_else(|| {
                    LearningError::InvalidConfig("lasso requires an alpha".to_string())
                })?;
                let fitted = ElasticNet::<f64>::lasso()
                    .penalty(penalty)
                    .fit(&dataset)
                    .map_err(|e| LearningError::TrainingFailed(e.to_string()))?;
                Self {
                    coefficients: fitted.hyperplane().to_vec(),
                    intercept: fitted.intercept(),
                }
            }
        };

        if !model.is_finite() {
            return Err(LearningError::TrainingFailed(format!(
                "{algorithm} produced non-finite coefficients"
            )));
        }
        Ok(model)
    }

    fn is_finite(&self) -> bool {
        self.intercept.is_finite() && self.coefficients.iter().all(|c| c.is_finite())
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Predict one target per row of `x`.
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, LearningError> {
        if x.ncols() != self.n_features() {
            return Err(LearningError::InvalidData(format!(
                "expected {} feature columns, got {}",
                self.n_features(),
                x.ncols()
            )));
        }
        let coefficients = ArrayView1::from(self.coefficients.as_slice());
        Ok(x.dot(&coefficients) + self.intercept)
    }

    /// Predict a single feature vector.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64, LearningError> {
        if row.len() != self.n_features() {
            return Err(LearningError::InvalidData(format!(
                "expected {} features, got {}",
                self.n_features(),
                row.len()
            )));
        }
        Ok(self
            .coefficients
            .iter()
            .zip(row)
            .map(|(c, v)| c * v)
            .sum::<f64>()
            + self.intercept)
    }

    /// Coefficient of determination of the predictions on `x` against `y`.
    pub fn score(&self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<f64, LearningError> {
        let predicted = self.predict(x)?;
        let truth = y.to_owned();
        predicted
            .r2(&truth)
            .map_err(|e| LearningError::TrainingFailed(format!("cannot score model: {e}")))
    }
}

/// Row-major design matrix from the column vectors of an encoded dataset.
pub fn design_matrix(columns: &[Vec<f64>]) -> Result<Array2<f64>, LearningError> {
    let n_rows = columns.first().map_or(0, Vec::len);
    if let Some(bad) = columns.iter().find(|c| c.len() != n_rows) {
        return Err(LearningError::InvalidData(format!(
            "feature columns differ in length ({} vs {n_rows})",
            bad.len()
        )));
    }
    Ok(Array2::from_shape_fn((n_rows, columns.len()), |(i, j)| {
        columns[j][i]
    }))
}

/// Rows `indices` of `x` and `y`.
pub fn select_rows(
    x: &Array2<f64>,
    y: &Array1<f64>,
    indices: &[usize],
) -> (Array2<f64>, Array1<f64>) {
    (x.select(Axis(0), indices), y.select(Axis(0), indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// price = 2 * a - 3 * b + 5, exactly.
    fn exact_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [1.0, 0.0],
            [2.0, 1.0],
            [3.0, 0.0],
            [4.0, 2.0],
            [5.0, 1.0],
            [6.0, 3.0],
            [7.0, 1.0],
            [8.0, 0.0],
        ];
        let y = x.map_axis(Axis(1), |row| 2.0 * row[0] - 3.0 * row[1] + 5.0);
        (x, y)
    }

    #[test]
    fn test_linear_regression_recovers_coefficients() {
        let (x, y) = exact_data();
        let model =
            LinearModel::fit(Algorithm::LinearRegression, None, x.view(), y.view()).unwrap();

        assert_eq!(model.n_features(), 2);
        assert!((model.coefficients[0] - 2.0).abs() < 1e-6);
        assert!((model.coefficients[1] + 3.0).abs() < 1e-6);
        assert!((model.intercept - 5.0).abs() < 1e-6);
        assert!(model.score(x.view(), y.view()).unwrap() > 0.999);
    }

    #[test]
    fn test_lasso_shrinks_towards_zero() {
        let (x, y) = exact_data();
        let ols = LinearModel::fit(Algorithm::LinearRegression, None, x.view(), y.view()).unwrap();
        let lasso = LinearModel::fit(Algorithm::Lasso, Some(1.0), x.view(), y.view()).unwrap();

        let l1 = |m: &LinearModel| m.coefficients.iter().map(|c| c.abs()).sum::<f64>();
        assert!(l1(&lasso) < l1(&ols));
    }

    #[test]
    fn test_lasso_requires_alpha() {
        let (x, y) = exact_data();
        let err = LinearModel::fit(Algorithm::Lasso, None, x.view(), y.view()).unwrap_err();
        assert!(matches!(err, LearningError::InvalidConfig(_)));
    }

    #[test]
    fn test_predict_row_matches_batch() {
        let model = LinearModel {
            coefficients: vec![2.0, -3.0],
            intercept: 5.0,
        };
        let (x, _) = exact_data();
        let batch = model.predict(x.view()).unwrap();

        for (i, row) in x.rows().into_iter().enumerate() {
            assert_eq!(model.predict_row(&row.to_vec()).unwrap(), batch[i]);
        }
        assert!(model.predict_row(&[1.0]).is_err());
    }

    #[test]
    fn test_design_matrix_is_row_major() {
        let x = design_matrix(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(x, array![[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]]);

        assert!(design_matrix(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_select_rows() {
        let (x, y) = exact_data();
        let (xs, ys) = select_rows(&x, &y, &[3, 0]);
        assert_eq!(xs, array![[4.0, 2.0], [1.0, 0.0]]);
        assert_eq!(ys, array![7.0, 7.0]);
    }
}
