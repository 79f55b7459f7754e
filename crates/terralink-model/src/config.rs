//! Planner configuration loaded from YAML.

use std::path::Path;

use tracing::debug;

use crate::properties::{EndpointScope, PlannerScope, ResolvedProperties};
use crate::{PropertyError, Result};

/// Resolved properties for one planning session.
///
/// `planner` carries link, coverage and elevation settings. `tx` and `rx`
/// carry the radio settings for each end of a link; coverage runs only read
/// `tx`, and treat `rx` as the remote node.
#[derive(Debug, Clone, Default)]
pub struct PlannerConfig {
    /// Planner-wide properties.
    pub planner: ResolvedProperties<PlannerScope>,
    /// Transmitter radio properties.
    pub tx: ResolvedProperties<EndpointScope>,
    /// Receiver radio properties.
    pub rx: ResolvedProperties<EndpointScope>,
}

impl PlannerConfig {
    /// Parse a YAML document with optional `planner`, `tx`, `rx` and
    /// `radio` sections. `radio` applies to both endpoints before the
    /// endpoint sections are applied.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut config = PlannerConfig::default();
        if yaml.trim().is_empty() {
            return Ok(config);
        }
        let doc: serde_yaml::Value = serde_yaml::from_str(yaml)?;

        let map = match &doc {
            serde_yaml::Value::Null => return Ok(config),
            serde_yaml::Value::Mapping(map) => map,
            _ => {
                return Err(PropertyError::InvalidStructure(
                    "configuration root must be a mapping".to_string(),
                ))
            }
        };

        // Shared radio settings go first so endpoint sections override them
        if let Some(radio) = map.get("radio") {
            let shared = serde_yaml::Value::Mapping(
                std::iter::once((serde_yaml::Value::from("radio"), radio.clone())).collect(),
            );
            config.tx.apply_yaml(&shared)?;
            config.rx.apply_yaml(&shared)?;
        }

        for (key, section) in map {
            match key.as_str() {
                Some("radio") => {}
                Some("planner") => config.planner.apply_yaml(section)?,
                Some("tx") => config.tx.apply_yaml(section)?,
                Some("rx") => config.rx.apply_yaml(section)?,
                Some(other) => {
                    return Err(PropertyError::InvalidStructure(format!(
                        "unknown section '{}' (expected planner, radio, tx or rx)",
                        other
                    )))
                }
                None => {
                    return Err(PropertyError::InvalidStructure(
                        "section names must be strings".to_string(),
                    ))
                }
            }
        }

        debug!(
            planner = config.planner.len(),
            tx = config.tx.len(),
            rx = config.rx.len(),
            "Loaded planner configuration"
        );
        Ok(config)
    }

    /// Read and parse a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{
        COVERAGE_MAX_RANGE_KM, LINK_FADE_MARGIN_DB, RADIO_ANTENNA_HEIGHT_M, RADIO_TX_POWER_W,
    };

    #[test]
    fn test_empty_document() {
        let config = PlannerConfig::from_yaml_str("").unwrap();
        assert!(config.planner.is_empty());
        assert_eq!(config.tx.get(&RADIO_TX_POWER_W), 1.0);
    }

    #[test]
    fn test_sections() {
        let config = PlannerConfig::from_yaml_str(
            r#"
planner:
  link:
    fade_margin_db: 8
  coverage:
    max_range_km: 30
radio:
  antenna_height_m: 6
tx:
  radio:
    tx_power_w: 0.5
rx:
  radio:
    antenna_height_m: 2
"#,
        )
        .unwrap();

        assert_eq!(config.planner.get(&LINK_FADE_MARGIN_DB), 8.0);
        assert_eq!(config.planner.get(&COVERAGE_MAX_RANGE_KM), 30.0);
        assert_eq!(config.tx.get(&RADIO_TX_POWER_W), 0.5);
        assert_eq!(config.tx.get(&RADIO_ANTENNA_HEIGHT_M), 6.0);
        assert_eq!(config.rx.get(&RADIO_ANTENNA_HEIGHT_M), 2.0);
        assert_eq!(config.rx.get(&RADIO_TX_POWER_W), 1.0);
    }

    #[test]
    fn test_unknown_section() {
        let err = PlannerConfig::from_yaml_str("simulation:\n  x: 1\n").unwrap_err();
        assert!(matches!(err, PropertyError::InvalidStructure(_)));
    }

    #[test]
    fn test_bad_yaml() {
        let err = PlannerConfig::from_yaml_str("planner: [").unwrap_err();
        assert!(matches!(err, PropertyError::Yaml(_)));
    }
}
