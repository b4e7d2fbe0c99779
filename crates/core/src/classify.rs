//! Alert tier classification from LTV.

/// Alert severity for a position, derived purely from its LTV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertTier {
    /// LTV below the warning threshold.
    Healthy,
    /// LTV at or above the warning threshold.
    Warning,
    /// LTV at or above the critical threshold.
    Critical,
}

impl AlertTier {
    /// Classify an LTV against the two thresholds. A boundary value
    /// belongs to the higher-severity tier.
    ///
    /// `warning <= critical` is validated at configuration load, not
    /// here.
    pub fn classify(ltv_percent: f64, warning_threshold: f64, critical_threshold: f64) -> Self {
        if ltv_percent >= critical_threshold {
            Self::Critical
        } else if ltv_percent >= warning_threshold {
            Self::Warning
        } else {
            Self::Healthy
        }
    }

    /// Display label used in reports and alert messages.
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Healthy => "✅ Healthy",
            Self::Warning => "⚠️ WARNING",
            Self::Critical => "🚨 CRITICAL",
        }
    }

    pub fn is_alert(&self) -> bool {
        matches!(self, Self::Warning | Self::Critical)
    }
}

/// LTV alert thresholds as percentages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    pub warning: f64,
    pub critical: f64,
}

impl AlertThresholds {
    pub fn classify(&self, ltv_percent: f64) -> AlertTier {
        AlertTier::classify(ltv_percent, self.warning, self.critical)
    }
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            warning: 70.0,
            critical: 80.0,
        }
    }
}
