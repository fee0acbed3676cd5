//! Compile-time registry of fallback provider configurations.
//!
//! Each provider is defined in a TOML file under `services/`. The
//! registry embeds these at compile time and exposes them via
//! [`all_services`] and [`enabled_services`]. Disabling a service in
//! its TOML removes that tier from the corresponding signal's fallback
//! chain; the static default still applies.

use serde::Deserialize;

/// A fallback service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackService {
    /// Unique identifier (e.g., `"soilgrids"`, `"openmeteo"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service participates in fallback resolution.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// ISRIC SoilGrids v2 point query.
    SoilGrids {
        /// API base URL (e.g., `"https://rest.isric.org"`).
        base_url: String,
    },
    /// Open-Meteo historical weather archive.
    OpenMeteo {
        /// API base URL (e.g., `"https://archive-api.open-meteo.com"`).
        base_url: String,
    },
    /// Nominatim / `OpenStreetMap` reverse geocoder.
    Nominatim {
        /// API base URL (e.g., `"https://nominatim.openstreetmap.org"`).
        base_url: String,
    },
}

const fn default_true() -> bool {
    true
}

const fn default_timeout_secs() -> u64 {
    10
}

impl FallbackService {
    /// Returns the provider's base URL regardless of variant.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::SoilGrids { base_url }
            | ProviderConfig::OpenMeteo { base_url }
            | ProviderConfig::Nominatim { base_url } => base_url,
        }
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("soilgrids", include_str!("../services/soilgrids.toml")),
    ("openmeteo", include_str!("../services/openmeteo.toml")),
    ("nominatim", include_str!("../services/nominatim.toml")),
];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 3;

/// Returns all fallback service configurations (enabled and disabled).
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time
/// guarantee since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<FallbackService> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse fallback service '{name}': {e}"))
        })
        .collect()
}

/// Returns only the enabled services.
#[must_use]
pub fn enabled_services() -> Vec<FallbackService> {
    all_services().into_iter().filter(|s| s.enabled).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_all_services() {
        let services = all_services();
        assert_eq!(services.len(), EXPECTED_SERVICE_COUNT);
    }

    #[test]
    fn service_ids_are_unique() {
        let services = all_services();
        let mut seen = BTreeSet::new();
        for svc in &services {
            assert!(seen.insert(&svc.id), "Duplicate service ID: {}", svc.id);
        }
    }

    #[test]
    fn all_services_have_required_fields() {
        for svc in &all_services() {
            assert!(!svc.id.is_empty(), "Service has empty id");
            assert!(!svc.name.is_empty(), "Service {} has empty name", svc.id);
            assert!(
                !svc.base_url().is_empty(),
                "Service {} has empty base_url",
                svc.id
            );
            assert!(svc.timeout_secs > 0, "Service {} has zero timeout", svc.id);
        }
    }
}
