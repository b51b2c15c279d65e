use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{AuditError, AuditResult};

const CONFIG_FILE_NAME: &str = "layout_audit.toml";

/// Immutable tolerance profile for one audit run.
///
/// Every section is optional in TOML; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Textless containers smaller than this (design units, either axis) are ghosts.
    pub ghost_min_size: f64,
    pub tolerance: ToleranceConfig,
    pub matching: MatchingConfig,
    pub calibration: CalibrationConfig,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            ghost_min_size: 20.0,
            tolerance: ToleranceConfig::default(),
            matching: MatchingConfig::default(),
            calibration: CalibrationConfig::default(),
        }
    }
}

impl AuditConfig {
    /// Shorthand for overriding the relative tolerance, e.g. `0.12` for 12%.
    #[must_use]
    pub fn with_tolerance_fraction(mut self, fraction: f64) -> Self {
        self.tolerance.tolerance_fraction = fraction.max(0.0);
        self
    }

    #[must_use]
    pub fn with_min_tolerance_px(mut self, px: f64) -> Self {
        self.tolerance.min_tolerance_px = px.max(0.0);
        self
    }

    #[must_use]
    pub fn without_calibration(mut self) -> Self {
        self.calibration.enabled = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceConfig {
    /// Relative tolerance applied to every expected pixel value.
    pub tolerance_fraction: f64,
    /// Lower bound for the allowed delta, absorbs rounding on tiny elements.
    pub min_tolerance_px: f64,
    /// Euclidean RGB distance above which two colors differ.
    pub color_distance_threshold: f64,
    /// Lower bound for the allowed font size delta, in dp.
    pub font_min_tolerance_dp: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            tolerance_fraction: 0.10,
            min_tolerance_px: 4.0,
            color_distance_threshold: 45.0,
            font_min_tolerance_dp: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Normalized text must be longer than this to count as a text match.
    pub text_min_len: usize,
    /// Substring matches need a length difference strictly below this.
    pub substring_max_len_diff: usize,
    /// Ceiling for text-identical matches in pass 1 (actual pixels).
    pub text_match_max_distance: f64,
    pub pass1_max_distance: f64,
    pub pass1_max_aspect_diff: f64,
    pub aspect_penalty_weight: f64,
    pub pass2_max_distance: f64,
    pub pass2_max_aspect_diff: f64,
    pub shape_mismatch_penalty: f64,
    pub text_bonus: f64,
    pub same_kind_bonus: f64,
    /// Pass-2 candidates are accepted only when their score is below this.
    pub pass2_accept_score: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            text_min_len: 2,
            substring_max_len_diff: 4,
            text_match_max_distance: 1500.0,
            pass1_max_distance: 80.0,
            pass1_max_aspect_diff: 0.5,
            aspect_penalty_weight: 40.0,
            pass2_max_distance: 600.0,
            pass2_max_aspect_diff: 1.0,
            shape_mismatch_penalty: 100.0,
            text_bonus: 150.0,
            same_kind_bonus: 30.0,
            pass2_accept_score: 400.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub enabled: bool,
    /// Landmark text must be longer than this for scale estimation.
    pub scale_min_text_len: usize,
    /// Landmark text must be longer than this for offset estimation.
    pub offset_min_text_len: usize,
    /// Expected landmark boxes must exceed this on both axes (design units).
    pub min_landmark_size: f64,
    /// A detected scale replaces the nominal one only beyond this difference.
    pub scale_epsilon: f64,
    /// Offsets at or below this magnitude are treated as noise.
    pub min_offset_px: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scale_min_text_len: 5,
            offset_min_text_len: 2,
            min_landmark_size: 10.0,
            scale_epsilon: 0.01,
            min_offset_px: 5.0,
        }
    }
}

fn resolve_config_path() -> AuditResult<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(candidate);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join(CONFIG_FILE_NAME);
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(candidate);
    }

    Err(AuditError::Config(format!(
        "{CONFIG_FILE_NAME} not found next to executable or in working directory"
    )))
}

pub fn load_config() -> AuditResult<AuditConfig> {
    let path = resolve_config_path()?;
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> AuditResult<AuditConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AuditConfig = toml::from_str(&content)?;
    if !config.tolerance.tolerance_fraction.is_finite() || config.tolerance.tolerance_fraction < 0.0 {
        return Err(AuditError::Config(format!(
            "tolerance_fraction must be a non-negative number, got {}",
            config.tolerance.tolerance_fraction
        )));
    }
    tracing::info!(
        path = %path.display(),
        tolerance = config.tolerance.tolerance_fraction,
        "config loaded"
    );
    Ok(config)
}

pub fn save_config(config: &AuditConfig, path: &Path) -> AuditResult<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
