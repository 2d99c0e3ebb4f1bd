/*!
This module defines the `Config` struct, which can be deserialized from a caller's configuration file to set the options of the metrics in this crate. Every field is optional and falls back to the metric's default.
*/

use super::{AccuracyOptions, MaskedMeanSquaredErrorOptions};

#[derive(Debug, Default, serde::Deserialize)]
pub struct Config {
	/// The label value that marks a missing label. Defaults to [`MISSING_VALUE`](constant.MISSING_VALUE.html).
	pub missing_value: Option<f32>,
	/// The relative tolerance used by the accuracy metrics. Defaults to `0.10`.
	pub pct_close: Option<f32>,
}

impl Config {
	pub fn masked_mean_squared_error_options(&self) -> MaskedMeanSquaredErrorOptions {
		let defaults = MaskedMeanSquaredErrorOptions::default();
		MaskedMeanSquaredErrorOptions {
			missing_value: self.missing_value.unwrap_or(defaults.missing_value),
		}
	}

	pub fn accuracy_options(&self) -> AccuracyOptions {
		let defaults = AccuracyOptions::default();
		AccuracyOptions {
			pct_close: self.pct_close.unwrap_or(defaults.pct_close),
		}
	}
}

#[test]
fn test_config_defaults() {
	let config: Config = serde_json::from_str("{}").unwrap();
	assert_eq!(
		config.masked_mean_squared_error_options(),
		MaskedMeanSquaredErrorOptions { missing_value: 0.0 }
	);
	assert_eq!(config.accuracy_options(), AccuracyOptions { pct_close: 0.10 });
}

#[test]
fn test_config() {
	let config: Config =
		serde_json::from_str(r#"{ "missing_value": -1.0, "pct_close": 0.05 }"#).unwrap();
	assert_eq!(
		config.masked_mean_squared_error_options(),
		MaskedMeanSquaredErrorOptions {
			missing_value: -1.0
		}
	);
	assert_eq!(config.accuracy_options(), AccuracyOptions { pct_close: 0.05 });
}
