//! Cross-validated model search over the configured candidates.

use crate::config::{Algorithm, TrainingConfig};
use crate::error::LearningError;
use crate::regressor::{LinearModel, select_rows};
use crate::split::ShuffleSplit;
use crate::types::ModelComparison;
use ndarray::{Array1, Array2};
use tracing::{debug, info, warn};

/// One algorithm and penalty pair tried by the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub algorithm: Algorithm,
    pub alpha: Option<f64>,
}

impl Candidate {
    pub fn linear() -> Self {
        Self {
            algorithm: Algorithm::LinearRegression,
            alpha: None,
        }
    }

    pub fn lasso(alpha: f64) -> Self {
        Self {
            algorithm: Algorithm::Lasso,
            alpha: Some(alpha),
        }
    }

    /// Display name, e.g. `lasso(alpha=2)`.
    pub fn name(&self) -> String {
        match self.alpha {
            Some(alpha) => format!("{}(alpha={alpha})", self.algorithm),
            None => self.algorithm.to_string(),
        }
    }

    pub fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<LinearModel, LearningError> {
        LinearModel::fit(self.algorithm, self.alpha, x.view(), y.view())
    }
}

/// Candidates in search order: linear regression first, then one Lasso per
/// alpha. A forced algorithm limits the list to that algorithm.
pub fn candidates(config: &TrainingConfig) -> Vec<Candidate> {
    let mut out = Vec::new();
    if matches!(config.algorithm, None | Some(Algorithm::LinearRegression)) {
        out.push(Candidate::linear());
    }
    if matches!(config.algorithm, None | Some(Algorithm::Lasso)) {
        out.extend(config.lasso_alphas.iter().copied().map(Candidate::lasso));
    }
    out
}

/// R² of `candidate` on every round of `splitter`.
pub fn cross_validate(
    candidate: &Candidate,
    x: &Array2<f64>,
    y: &Array1<f64>,
    splitter: &ShuffleSplit,
) -> Result<Vec<f64>, LearningError> {
    splitter
        .split(x.nrows())?
        .iter()
        .map(|split| {
            let (x_train, y_train) = select_rows(x, y, &split.train);
            let (x_test, y_test) = select_rows(x, y, &split.test);
            let model = candidate.fit(&x_train, &y_train)?;
            model.score(x_test.view(), y_test.view())
        })
        .collect()
}

/// Outcome of a model search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best: Candidate,
    pub best_scores: Vec<f64>,
    pub comparison: Vec<ModelComparison>,
    pub warnings: Vec<String>,
}

/// Cross-validate every candidate and keep the one with the highest mean R².
///
/// Ties keep the earlier candidate. A candidate that fails to fit on any
/// round is skipped with a warning; the search only fails when every
/// candidate does.
pub fn search<F>(
    candidates: &[Candidate],
    x: &Array2<f64>,
    y: &Array1<f64>,
    splitter: &ShuffleSplit,
    mut on_candidate: F,
) -> Result<SearchOutcome, LearningError>
where
    F: FnMut(usize, &Candidate),
{
    if candidates.is_empty() {
        return Err(LearningError::InvalidConfig(
            "no candidate models to search".to_string(),
        ));
    }

    let mut comparison = Vec::with_capacity(candidates.len());
    let mut warnings = Vec::new();
    let mut best: Option<(Candidate, Vec<f64>, f64)> = None;

    for (i, candidate) in candidates.iter().enumerate() {
        on_candidate(i, candidate);
        let name = candidate.name();

        let scores = match cross_validate(candidate, x, y, splitter) {
            Ok(scores) => scores,
            Err(e) => {
                warn!("Candidate {} failed: {}", name, e);
                warnings.push(format!("{name}: {e}"));
                continue;
            }
        };
        let cv_mean = scores.iter().sum::<f64>() / scores.len() as f64;
        if !cv_mean.is_finite() {
            warn!("Candidate {} produced a non-finite score", name);
            warnings.push(format!("{name}: non-finite cross-validation score"));
            continue;
        }
        debug!("{} scores: {:?}", name, scores);
        info!("Candidate {} mean R² = {:.4}", name, cv_mean);

        comparison.push(ModelComparison {
            name,
            algorithm: candidate.algorithm,
            alpha: candidate.alpha,
            cv_scores: scores.clone(),
            cv_mean,
        });

        if best.as_ref().is_none_or(|(_, _, top)| cv_mean > *top) {
            best = Some((*candidate, scores, cv_mean));
        }
    }

    let (best, best_scores, _) = best.ok_or_else(|| {
        LearningError::TrainingFailed(format!(
            "every candidate failed: {}",
            warnings.join("; ")
        ))
    })?;

    Ok(SearchOutcome {
        best,
        best_scores,
        comparison,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ndarray::Axis;

    fn data(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 { i as f64 } else { ((i * 7) % 5) as f64 }
        });
        let y = x.map_axis(Axis(1), |row| 3.0 * row[0] + 2.0 * row[1] + 1.0);
        (x, y)
    }

    #[test]
    fn test_candidates_default_order() {
        let names: Vec<String> = candidates(&TrainingConfig::default())
            .iter()
            .map(Candidate::name)
            .collect();
        assert_eq!(names, vec!["linear_regression", "lasso(alpha=1)", "lasso(alpha=2)"]);
    }

    #[test]
    fn test_candidates_forced_algorithm() {
        let config = TrainingConfig::builder()
            .algorithm(Algorithm::LinearRegression)
            .build()
            .unwrap();
        assert_eq!(candidates(&config), vec![Candidate::linear()]);

        let config = TrainingConfig::builder()
            .algorithm(Algorithm::Lasso)
            .lasso_alphas([0.5])
            .build()
            .unwrap();
        assert_eq!(candidates(&config), vec![Candidate::lasso(0.5)]);
    }

    #[test]
    fn test_cross_validate_scores_every_round() {
        let (x, y) = data(30);
        let scores =
            cross_validate(&Candidate::linear(), &x, &y, &ShuffleSplit::new(5, 0.2, 0)).unwrap();
        assert_eq!(scores.len(), 5);
        assert!(scores.iter().all(|s| *s > 0.999));
    }

    #[test]
    fn test_search_prefers_exact_fit() {
        let (x, y) = data(30);
        let mut visited = Vec::new();
        let outcome = search(
            &[Candidate::lasso(2.0), Candidate::linear()],
            &x,
            &y,
            &ShuffleSplit::new(5, 0.2, 0),
            |i, c| visited.push((i, c.name())),
        )
        .unwrap();

        assert_eq!(outcome.best, Candidate::linear());
        assert_eq!(outcome.comparison.len(), 2);
        assert_eq!(outcome.best_scores.len(), 5);
        assert_eq!(visited[0], (0, "lasso(alpha=2)".to_string()));
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_search_fails_when_all_candidates_fail() {
        // a single row cannot be split
        let (x, y) = data(1);
        let result = search(
            &[Candidate::linear(), Candidate::lasso(1.0)],
            &x,
            &y,
            &ShuffleSplit::new(2, 0.2, 0),
            |_, _| {},
        );
        let err = result.unwrap_err();
        assert!(matches!(err, LearningError::TrainingFailed(_)));
        assert!(err.to_string().contains("lasso(alpha=1)"));
    }

    #[test]
    fn test_search_without_candidates() {
        let (x, y) = data(10);
        let result = search(&[], &x, &y, &ShuffleSplit::new(2, 0.2, 0), |_, _| {});
        assert!(matches!(result, Err(LearningError::InvalidConfig(_))));
    }
}
