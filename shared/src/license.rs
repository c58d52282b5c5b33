//! License package, status and feature-flag model

use serde::{Deserialize, Serialize};

/// Purchasable package tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageType {
    Free,
    Single,
    Freelancer,
    Agency,
}

impl PackageType {
    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Self::Free),
            "single" => Some(Self::Single),
            "freelancer" => Some(Self::Freelancer),
            "agency" => Some(Self::Agency),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Single => "single",
            Self::Freelancer => "freelancer",
            Self::Agency => "agency",
        }
    }

    /// Domain quota for this package
    pub fn max_domains(&self) -> i32 {
        match self {
            Self::Free => 1,
            Self::Single => 1,
            Self::Freelancer => 5,
            Self::Agency => 25,
        }
    }

    /// License-key prefix, e.g. `GS-AGENCY-`
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Self::Free => "GS-FREE-",
            Self::Single => "GS-SINGLE-",
            Self::Freelancer => "GS-FREELANCER-",
            Self::Agency => "GS-AGENCY-",
        }
    }

    /// Paid packages expire; Free licenses never do
    pub fn is_paid(&self) -> bool {
        !matches!(self, Self::Free)
    }
}

/// License lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseStatus {
    Active,
    Suspended,
    Expired,
    Cancelled,
}

impl LicenseStatus {
    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            "expired" => Some(Self::Expired),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Plugin feature flags, derived purely from the package type.
///
/// A static boolean table, no per-feature state. The plugin caches the set
/// it receives from the validation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Hidden honeypot fields in protected forms
    pub honeypot: bool,
    /// Minimum-fill-time check
    pub time_check: bool,
    /// Mouse/keystroke behavioral signals
    pub behavior_check: bool,
    /// Country-based blocking
    pub country_blocking: bool,
    /// Telemetry dashboard in the portal
    pub telemetry_dashboard: bool,
    /// Priority support channel
    pub priority_support: bool,
}

impl FeatureFlags {
    /// The feature table for a package
    pub fn for_package(package: PackageType) -> Self {
        match package {
            PackageType::Free => Self {
                honeypot: true,
                time_check: true,
                behavior_check: false,
                country_blocking: false,
                telemetry_dashboard: false,
                priority_support: false,
            },
            PackageType::Single => Self {
                honeypot: true,
                time_check: true,
                behavior_check: true,
                country_blocking: false,
                telemetry_dashboard: true,
                priority_support: false,
            },
            PackageType::Freelancer => Self {
                honeypot: true,
                time_check: true,
                behavior_check: true,
                country_blocking: true,
                telemetry_dashboard: true,
                priority_support: false,
            },
            PackageType::Agency => Self {
                honeypot: true,
                time_check: true,
                behavior_check: true,
                country_blocking: true,
                telemetry_dashboard: true,
                priority_support: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_db_round_trip() {
        for p in [
            PackageType::Free,
            PackageType::Single,
            PackageType::Freelancer,
            PackageType::Agency,
        ] {
            assert_eq!(PackageType::from_db(p.as_db()), Some(p));
        }
        assert_eq!(PackageType::from_db("gold"), None);
    }

    #[test]
    fn test_status_db_round_trip() {
        for s in [
            LicenseStatus::Active,
            LicenseStatus::Suspended,
            LicenseStatus::Expired,
            LicenseStatus::Cancelled,
        ] {
            assert_eq!(LicenseStatus::from_db(s.as_db()), Some(s));
        }
        assert!(LicenseStatus::Active.is_active());
        assert!(!LicenseStatus::Expired.is_active());
    }

    #[test]
    fn test_quotas() {
        assert_eq!(PackageType::Free.max_domains(), 1);
        assert_eq!(PackageType::Single.max_domains(), 1);
        assert_eq!(PackageType::Freelancer.max_domains(), 5);
        assert_eq!(PackageType::Agency.max_domains(), 25);
    }

    #[test]
    fn test_key_prefixes() {
        assert_eq!(PackageType::Agency.key_prefix(), "GS-AGENCY-");
        assert_eq!(PackageType::Single.key_prefix(), "GS-SINGLE-");
    }

    #[test]
    fn test_feature_table_is_monotone_by_tier() {
        let free = FeatureFlags::for_package(PackageType::Free);
        let agency = FeatureFlags::for_package(PackageType::Agency);
        assert!(free.honeypot && free.time_check);
        assert!(!free.behavior_check);
        assert!(agency.country_blocking && agency.priority_support);
    }

    #[test]
    fn test_serde_wire_names() {
        let json = serde_json::to_string(&PackageType::Agency).unwrap();
        assert_eq!(json, "\"AGENCY\"");
        let json = serde_json::to_string(&LicenseStatus::Expired).unwrap();
        assert_eq!(json, "\"EXPIRED\"");
    }
}
