//! The shared readiness context every assessor reviews.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{ConfigError, Result};

/// Snapshot of system state taken before a launch review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessContext {
    pub kill_switch: bool,
    pub tool_count: u32,
    /// `online`, `degraded`, or anything else for not operational.
    pub system_status: String,
    pub ai_keys_configured: bool,
    pub battery_remaining: f64,
    pub battery_daily_limit: f64,
    pub battery_depleted: bool,
    pub services_healthy: Vec<String>,
    pub services_down: Vec<String>,
    pub campaign_profile_count: u32,
    pub campaign_template_languages: Vec<String>,
    pub draft_first_enforced: bool,
    pub webhook_crypto_enabled: bool,
    pub rate_limiting_enabled: bool,
    pub jwt_auth_enabled: bool,
    pub semantic_router_active: bool,
    pub messaging_connector_configured: bool,
    pub workspace_configured: bool,
    pub cadence_engine_enabled: bool,
    pub funnel_stages_defined: u32,
    pub activation_target_minutes: u32,
    pub pricing_tiers_defined: u32,
    pub free_to_paid_path_defined: bool,
}

impl Default for ReadinessContext {
    fn default() -> Self {
        Self {
            kill_switch: false,
            tool_count: 0,
            system_status: "offline".to_string(),
            ai_keys_configured: false,
            battery_remaining: 0.0,
            battery_daily_limit: 0.0,
            battery_depleted: false,
            services_healthy: Vec::new(),
            services_down: Vec::new(),
            campaign_profile_count: 0,
            campaign_template_languages: Vec::new(),
            draft_first_enforced: false,
            webhook_crypto_enabled: false,
            rate_limiting_enabled: false,
            jwt_auth_enabled: false,
            semantic_router_active: false,
            messaging_connector_configured: false,
            workspace_configured: false,
            cadence_engine_enabled: false,
            funnel_stages_defined: 0,
            activation_target_minutes: 0,
            pricing_tiers_defined: 0,
            free_to_paid_path_defined: false,
        }
    }
}

impl ReadinessContext {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw).map_err(ConfigError::from)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn is_online(&self) -> bool {
        self.system_status == "online"
    }

    pub fn is_degraded(&self) -> bool {
        self.system_status == "degraded"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let ctx = ReadinessContext::from_toml_str(
            r#"
            kill_switch = true
            tool_count = 68
            system_status = "degraded"
            campaign_template_languages = ["es", "en"]
            "#,
        )
        .unwrap();
        assert!(ctx.kill_switch);
        assert_eq!(ctx.tool_count, 68);
        assert!(ctx.is_degraded());
        assert_eq!(ctx.campaign_template_languages.len(), 2);
        assert!(!ctx.jwt_auth_enabled);
    }

    #[test]
    fn test_default_is_offline() {
        let ctx = ReadinessContext::default();
        assert!(!ctx.is_online());
        assert!(!ctx.is_degraded());
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = ReadinessContext::from_toml_str("tool_count = \"many\"").unwrap_err();
        assert!(matches!(err, crate::domain::AosError::Config(_)));
    }
}
