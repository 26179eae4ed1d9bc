use serde::Serialize;

/// Sentinel for an alpha/beta value that has not been chosen yet, either by
/// the caller or by the grid search.
pub const UNASSIGNED: f64 = -1.0;

/// Smoothing priors of the protein inference model.
///
/// `alpha` and `beta` are the peptide emission/creation priors that the grid
/// search selects when left unassigned; `gamma` is the fixed protein prior
/// and is never searched.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ModelParameters {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            alpha: UNASSIGNED,
            beta: UNASSIGNED,
            gamma: 0.5,
        }
    }
}

impl ModelParameters {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self {
            alpha,
            beta,
            ..Default::default()
        }
    }

    pub fn alpha_assigned(&self) -> bool {
        self.alpha != UNASSIGNED
    }

    pub fn beta_assigned(&self) -> bool {
        self.beta != UNASSIGNED
    }

    /// Both smoothing priors have concrete values, so inference can run
    /// without a grid search.
    pub fn assigned(&self) -> bool {
        self.alpha_assigned() && self.beta_assigned()
    }

    /// Fallback values used when the caller wants to skip the grid search
    /// entirely.
    pub fn set_defaults(&mut self) {
        self.alpha = 0.1;
        self.beta = 0.01;
    }
}
