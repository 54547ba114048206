//! Gaussian Naive Bayes
//!
//! Parameter names follow scikit-learn's `GaussianNB` attributes so an export
//! script can dump `class_prior_`, `theta_` and `var_` unchanged.

use serde::Deserialize;

use super::ModelError;
use crate::features::N_FEATURES;

#[derive(Debug, Clone, Deserialize)]
pub struct GaussianNb {
    /// P(class), one per class
    pub class_prior: Vec<f64>,
    /// Per-class feature means
    pub theta: Vec<[f64; N_FEATURES]>,
    /// Per-class feature variances (already smoothed by sklearn)
    pub var: Vec<[f64; N_FEATURES]>,
}

impl GaussianNb {
    pub(crate) fn validate(&self, n_classes: usize) -> Result<(), ModelError> {
        for (name, len) in [
            ("class_prior", self.class_prior.len()),
            ("theta", self.theta.len()),
            ("var", self.var.len()),
        ] {
            if len != n_classes {
                return Err(ModelError::InvalidArtifact(format!(
                    "{} has {} entries, expected {} classes",
                    name, len, n_classes
                )));
            }
        }

        if self.class_prior.iter().any(|p| !(*p > 0.0)) {
            return Err(ModelError::InvalidArtifact(
                "class_prior entries must be positive".into(),
            ));
        }

        if self.var.iter().flatten().any(|v| !(*v > 0.0)) {
            return Err(ModelError::InvalidArtifact(
                "var entries must be positive".into(),
            ));
        }

        Ok(())
    }

    /// Joint log likelihood per class: log P(c) + Σ log N(x_i | θ_ci, σ²_ci)
    fn joint_log_likelihood(&self, x: &[f64; N_FEATURES]) -> Vec<f64> {
        self.class_prior
            .iter()
            .zip(self.theta.iter().zip(&self.var))
            .map(|(prior, (theta, var))| {
                let mut jll = prior.ln();
                for i in 0..N_FEATURES {
                    let diff = x[i] - theta[i];
                    jll -= 0.5 * (2.0 * std::f64::consts::PI * var[i]).ln();
                    jll -= 0.5 * diff * diff / var[i];
                }
                jll
            })
            .collect()
    }

    pub fn predict_proba(&self, x: &[f64; N_FEATURES]) -> Vec<f64> {
        let jll = self.joint_log_likelihood(x);

        // log-sum-exp keeps far-away samples from underflowing to 0/0
        let max = jll.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = jll.iter().map(|v| (v - max).exp()).collect();
        let total: f64 = exps.iter().sum();

        exps.into_iter().map(|e| e / total).collect()
    }
}
