use std::path::Path;
use tracing::debug;

use deal_calc_core::analysis::AnalysisConfig;

use crate::input;

/// Load scoring and flag settings from a YAML or JSON file.
///
/// `.yaml`/`.yml` files are read as YAML, anything else as JSON. With no
/// path the built-in defaults apply. The config is validated before use.
pub fn load_config(path: Option<&str>) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default());
    };

    let (canonical, contents) = input::file::read_text(path)?;
    let config: AnalysisConfig = if is_yaml(&canonical) {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    };
    config.validate()?;

    debug!(path = %canonical.display(), "loaded analysis config");
    Ok(config)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use deal_calc_core::inputs::MarketTier;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_no_path_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn test_yaml_partial_override() {
        let file = write_temp(
            ".yaml",
            r#"
scoring:
  weights:
    cash_flow: "0.40"
    cap_rate: "0.20"
    cash_on_cash: "0.25"
    rent_ratio: "0.15"
flags:
  low_cap_rate: "6"
"#,
        );
        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.scoring.weights.cash_flow, dec!(0.40));
        assert_eq!(config.scoring.cash_flow, AnalysisConfig::default().scoring.cash_flow);
        assert_eq!(config.flags.low_cap_rate, Some(dec!(6)));
        assert_eq!(config.flags.strong_cash_flow, None);
        let thresholds = config.flag_thresholds(MarketTier::C);
        assert_eq!(thresholds.low_cap_rate, dec!(6));
        assert_eq!(thresholds.strong_cash_flow, dec!(200));
    }

    #[test]
    fn test_json_config() {
        let file = write_temp(".json", r#"{ "flags": { "strong_cash_flow": "300" } }"#);
        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.flags.strong_cash_flow, Some(dec!(300)));
        assert_eq!(config.flag_thresholds(MarketTier::A).low_cap_rate, dec!(3));
        assert_eq!(config.flag_thresholds(MarketTier::C).low_cap_rate, dec!(5));
    }

    #[test]
    fn test_weights_not_summing_to_one_rejected() {
        let file = write_temp(
            ".yml",
            "scoring:\n  weights:\n    cash_flow: \"0.5\"\n    cap_rate: \"0.5\"\n    cash_on_cash: \"0.5\"\n    rent_ratio: \"0\"\n",
        );
        let err = load_config(file.path().to_str()).unwrap_err();
        assert!(err.to_string().contains("sum to 1"));
    }

    #[test]
    fn test_missing_file() {
        assert!(load_config(Some("/nonexistent/dealcalc.yaml")).is_err());
    }
}
