//! Router configuration.
//!
//! All knobs of the routing engine live in [`RouterConfig`]. Every field has
//! a default, so a config deserialized from a partial document (or built via
//! `RouterConfig::default()`) is always complete. [`RouterConfig::validate`]
//! rejects out-of-domain values before any routing state is built.

use serde::{Deserialize, Serialize};

/// Configuration for the negotiated-congestion router.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Horizontal slack added to each arc's bounding box during search.
    pub bb_margin_x: i32,
    /// Vertical slack added to each arc's bounding box during search.
    pub bb_margin_y: i32,
    /// Extra bounding-box enlargement applied on the retry after a failed
    /// arc search.
    pub bb_grow: i32,
    /// Weight of the remaining horizontal distance in the to-go estimate.
    pub togo_cost_dx: f32,
    /// Weight of the remaining vertical distance in the to-go estimate.
    pub togo_cost_dy: f32,
    /// Constant added to the to-go estimate.
    pub togo_cost_adder: f32,
    /// Strength of the pull toward the net centroid.
    pub bias_cost_factor: f32,
    /// Initial weight of present congestion in node costs.
    pub init_curr_cong: f32,
    /// Per-iteration increment weight for historical congestion.
    pub init_hist_cong: f32,
    /// Multiplier applied to the present-congestion weight after each
    /// iteration that still has overflow.
    pub curr_cong_mult: f32,
    /// Maximum number of outer iterations before giving up.
    pub max_iter: u32,
    /// Seed for the tie-break RNG.
    pub seed: u64,
    /// Emit per-net setup and per-iteration progress notes.
    pub verbose: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            bb_margin_x: 3,
            bb_margin_y: 3,
            bb_grow: 8,
            togo_cost_dx: 0.5,
            togo_cost_dy: 0.5,
            togo_cost_adder: 2.5,
            bias_cost_factor: 0.25,
            init_curr_cong: 0.5,
            init_hist_cong: 1.0,
            curr_cong_mult: 2.0,
            max_iter: 200,
            seed: 1,
            verbose: false,
        }
    }
}

impl RouterConfig {
    /// Checks that every option lies in its legal domain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bb_margin_x < 0 {
            return Err(ConfigError::out_of_range("bb_margin_x", "non-negative"));
        }
        if self.bb_margin_y < 0 {
            return Err(ConfigError::out_of_range("bb_margin_y", "non-negative"));
        }
        if self.bb_grow < 0 {
            return Err(ConfigError::out_of_range("bb_grow", "non-negative"));
        }
        if self.bias_cost_factor < 0.0 {
            return Err(ConfigError::out_of_range("bias_cost_factor", "non-negative"));
        }
        if self.init_curr_cong <= 0.0 {
            return Err(ConfigError::out_of_range("init_curr_cong", "positive"));
        }
        if self.init_hist_cong <= 0.0 {
            return Err(ConfigError::out_of_range("init_hist_cong", "positive"));
        }
        if self.curr_cong_mult <= 0.0 {
            return Err(ConfigError::out_of_range("curr_cong_mult", "positive"));
        }
        if self.max_iter == 0 {
            return Err(ConfigError::out_of_range("max_iter", "positive"));
        }
        Ok(())
    }
}

/// Errors produced by configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration field lies outside its legal domain.
    #[error("router option `{field}` must be {requirement}")]
    OutOfRange {
        /// The offending field name.
        field: &'static str,
        /// The domain requirement the value failed.
        requirement: &'static str,
    },
}

impl ConfigError {
    fn out_of_range(field: &'static str, requirement: &'static str) -> Self {
        Self::OutOfRange { field, requirement }
    }
}
