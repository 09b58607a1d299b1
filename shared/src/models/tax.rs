//! Tax settings

use serde::{Deserialize, Serialize};

/// Tax configuration, fetched once per session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TaxSettings {
    /// Central GST in percent (e.g. 2.5)
    #[serde(default)]
    pub cgst: f64,
    /// State GST in percent
    #[serde(default)]
    pub sgst: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fssai_number: Option<String>,
}
