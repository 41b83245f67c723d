//! Construction options.
//!
//! Every struct has per-field defaults and rejects unknown keys, so a typo in
//! a config file is reported instead of silently ignored.
//!
//! # Example
//!
//! ```
//! use horizon_grid::options::DataViewOptions;
//!
//! let options = DataViewOptions::from_toml_str(
//!     r#"
//!     id_field = "key"
//!     inline_filters = true
//!
//!     [group_metadata]
//!     totals_focusable = true
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(options.id_field, "key");
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::OptionsError;
use crate::model::{DEFAULT_ID_FIELD, GroupMetadataOptions};

fn from_json<T: DeserializeOwned>(text: &str) -> Result<T, OptionsError> {
    Ok(serde_json::from_str(text)?)
}

fn from_toml<T: DeserializeOwned>(text: &str) -> Result<T, OptionsError> {
    Ok(toml::from_str(text)?)
}

/// Options for a [`DataView`](crate::model::DataView).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataViewOptions {
    /// Field holding each item's unique id.
    pub id_field: String,
    /// Cache per-item filter results so refresh hints can skip re-testing.
    /// Never changes the visible result.
    pub inline_filters: bool,
    /// Installs the default group metadata provider with these options.
    /// Grouping fails without a provider.
    pub group_metadata: Option<GroupMetadataOptions>,
}

impl Default for DataViewOptions {
    fn default() -> Self {
        Self {
            id_field: DEFAULT_ID_FIELD.to_string(),
            inline_filters: false,
            group_metadata: None,
        }
    }
}

impl DataViewOptions {
    pub fn from_json_str(text: &str) -> Result<Self, OptionsError> {
        let options: Self = from_json(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, OptionsError> {
        let options: Self = from_toml(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.id_field.is_empty() {
            return Err(OptionsError::invalid_value("id_field", "must not be empty"));
        }
        Ok(())
    }
}

/// Options for a [`ViewportWindow`](crate::viewport::ViewportWindow).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewportOptions {
    /// Height of every row, in the same unit as scroll offsets.
    pub row_height: f64,
    /// Rows rendered past the trailing edge, and the floor for the leading
    /// buffer.
    pub min_buffer: usize,
    /// Fraction of the viewport height a scroll must cover before a
    /// re-render.
    pub skip_fraction: f64,
    /// Rows a scroll must cover before a re-render. The smaller of this and
    /// `skip_fraction` wins.
    pub skip_rows: usize,
    /// Debounce delay for render requests.
    pub render_delay_ms: u64,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            row_height: 25.0,
            min_buffer: 3,
            skip_fraction: 0.1,
            skip_rows: 1,
            render_delay_ms: 50,
        }
    }
}

impl ViewportOptions {
    pub fn from_json_str(text: &str) -> Result<Self, OptionsError> {
        let options: Self = from_json(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, OptionsError> {
        let options: Self = from_toml(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(self.row_height > 0.0 && self.row_height.is_finite()) {
            return Err(OptionsError::invalid_value(
                "row_height",
                format!("{} is not a positive height", self.row_height),
            ));
        }
        if !(0.0..=1.0).contains(&self.skip_fraction) {
            return Err(OptionsError::invalid_value(
                "skip_fraction",
                format!("{} is outside 0..=1", self.skip_fraction),
            ));
        }
        Ok(())
    }
}

/// Options for a [`RowCache`](crate::viewport::RowCache).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RowCacheOptions {
    /// Cached rows kept even when far from the visible range.
    pub min_capacity: usize,
    /// When more than this share of cached rows must go, the cache is
    /// rebuilt instead of patched.
    pub full_replace_ratio: f64,
}

impl Default for RowCacheOptions {
    fn default() -> Self {
        Self {
            min_capacity: 50,
            full_replace_ratio: 0.5,
        }
    }
}

impl RowCacheOptions {
    pub fn from_json_str(text: &str) -> Result<Self, OptionsError> {
        let options: Self = from_json(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, OptionsError> {
        let options: Self = from_toml(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(0.0..=1.0).contains(&self.full_replace_ratio) {
            return Err(OptionsError::invalid_value(
                "full_replace_ratio",
                format!("{} is outside 0..=1", self.full_replace_ratio),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_input() {
        assert_eq!(DataViewOptions::from_json_str("{}").unwrap(), DataViewOptions::default());
        assert_eq!(ViewportOptions::from_toml_str("").unwrap(), ViewportOptions::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = DataViewOptions::from_json_str(r#"{"inlineFilters": true}"#).unwrap_err();
        assert!(matches!(err, OptionsError::Json(_)));

        let err = RowCacheOptions::from_toml_str("capacity = 3").unwrap_err();
        assert!(matches!(err, OptionsError::Toml(_)));
    }

    #[test]
    fn test_nested_group_metadata() {
        let options = DataViewOptions::from_json_str(
            r#"{"group_metadata": {"group_css_class": "g", "totals_focusable": true}}"#,
        )
        .unwrap();
        let group = options.group_metadata.unwrap();
        assert_eq!(group.group_css_class, "g");
        assert!(group.totals_focusable);
        assert!(group.enable_expand_collapse);
    }

    #[test]
    fn test_validation() {
        let err = DataViewOptions::from_json_str(r#"{"id_field": ""}"#).unwrap_err();
        assert!(matches!(err, OptionsError::InvalidValue { field: "id_field", .. }));

        let err = ViewportOptions::from_json_str(r#"{"skip_fraction": 1.5}"#).unwrap_err();
        assert!(matches!(err, OptionsError::InvalidValue { field: "skip_fraction", .. }));
    }
}
