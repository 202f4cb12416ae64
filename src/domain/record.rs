//! Record - Access Point Rows
//!
//! Raw access points as returned by the listing service, and the flattened
//! provider rows shown in the review table. The mapping is 1:1.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::filter::Filterable;

/// Provider profile nested in an access point
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderItem {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub liability_policy: Option<String>,
    pub license_type: Option<String>,
    pub url: Option<String>,
}

/// A provider's licence registration in one region, as listed remotely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPointItem {
    pub owner: String,
    pub state: String,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub license_expiration: Option<NaiveDate>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub provider: Option<ProviderItem>,
}

impl AccessPointItem {
    /// Check if the access point has been marked verified
    pub fn is_verified(&self) -> bool {
        self.verified == Some(true)
    }

    /// Identity used by the review mutation
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.owner.clone(), self.state.clone())
    }
}

impl Filterable for AccessPointItem {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "owner" => Some(&self.owner),
            "state" => Some(&self.state),
            "license" => self.license.as_deref(),
            "licenseType" => self.provider.as_ref()?.license_type.as_deref(),
            _ => None,
        }
    }
}

/// Identity of an access point: owner within a region
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub owner: String,
    pub state: String,
}

impl RecordKey {
    pub fn new(owner: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            state: state.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.owner, self.state)
    }
}

/// Display row for the review table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderRow {
    pub owner: String,
    pub state: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub license_type: Option<String>,
    pub license: Option<String>,
    pub license_expiration: Option<NaiveDate>,
    pub liability_policy: Option<String>,
    pub url: Option<String>,
}

impl ProviderRow {
    /// Identity of the underlying access point
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.owner.clone(), self.state.clone())
    }
}

impl From<AccessPointItem> for ProviderRow {
    fn from(item: AccessPointItem) -> Self {
        let provider = item.provider.unwrap_or_default();
        Self {
            owner: item.owner,
            state: item.state,
            full_name: provider.full_name.unwrap_or_default(),
            email: provider.email,
            phone: provider.phone,
            license_type: provider.license_type,
            license: item.license,
            license_expiration: item.license_expiration,
            liability_policy: provider.liability_policy,
            url: provider.url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_point_flattens_into_row() {
        let json = r#"{
            "owner": "u-17",
            "state": "CA",
            "license": "LMFT 1234",
            "licenseExpiration": "2027-03-31",
            "verified": null,
            "provider": {
                "fullName": "Dana Reyes",
                "email": "dana@example.org",
                "licenseType": "LMFT"
            }
        }"#;
        let item: AccessPointItem = serde_json::from_str(json).expect("parse");
        assert!(!item.is_verified());

        let row = ProviderRow::from(item);
        assert_eq!(row.owner, "u-17");
        assert_eq!(row.state, "CA");
        assert_eq!(row.full_name, "Dana Reyes");
        assert_eq!(row.license_type.as_deref(), Some("LMFT"));
        assert_eq!(row.license_expiration, NaiveDate::from_ymd_opt(2027, 3, 31));
        assert_eq!(row.phone, None);
        assert_eq!(row.key(), RecordKey::new("u-17", "CA"));
    }

    #[test]
    fn missing_provider_yields_blank_name() {
        let json = r#"{"owner": "u-2", "state": "NY"}"#;
        let item: AccessPointItem = serde_json::from_str(json).expect("parse");
        let row = ProviderRow::from(item);
        assert_eq!(row.full_name, "");
        assert_eq!(row.email, None);
    }

    #[test]
    fn filterable_fields() {
        let item = AccessPointItem {
            owner: "u-3".to_string(),
            state: "WA".to_string(),
            license: None,
            license_expiration: None,
            verified: Some(true),
            provider: None,
        };
        assert!(item.is_verified());
        assert_eq!(item.field("state"), Some("WA"));
        assert_eq!(item.field("licenseType"), None);
        assert_eq!(item.key().to_string(), "u-3@WA");
    }
}
