//! Error codes with HTTP mapping and default messages

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Coarse classification of an error code, used for logging decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    General,
    Auth,
    License,
    Domain,
    Billing,
    Guard,
    System,
}

/// Standardized error codes for the licensing API.
///
/// The numeric value is stable and part of the wire contract; the plugin
/// switches on it to decide what to show the site owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum ErrorCode {
    // ── General (0xxx) ──
    ValidationFailed = 2,
    NotFound = 3,
    AlreadyExists = 4,
    InvalidRequest = 6,

    // ── Authentication (1xxx) ──
    NotAuthenticated = 1001,
    InvalidCredentials = 1002,
    TokenInvalid = 1003,
    TokenExpired = 1004,
    PermissionDenied = 1005,
    AccountNotActivated = 1006,
    RateLimited = 1007,

    // ── License (3xxx) ──
    LicenseNotFound = 3001,
    LicenseSuspended = 3002,
    LicenseExpired = 3003,
    LicenseCancelled = 3004,

    // ── Domain activation (4xxx) ──
    InvalidDomain = 4001,
    DomainQuotaExceeded = 4002,
    SingleDomainTaken = 4003,
    DomainNotRegistered = 4004,

    // ── Billing (5xxx) ──
    CheckoutFailed = 5001,
    InvoiceNotFound = 5002,

    // ── Form guard (6xxx) ──
    GuardTokenInvalid = 6001,

    // ── System (9xxx) ──
    InternalError = 9001,
    DatabaseError = 9002,
    KeySpaceExhausted = 9003,
}

impl ErrorCode {
    /// Numeric wire value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Default human-readable message (German; the product's audience)
    pub fn message(&self) -> &'static str {
        match self {
            Self::ValidationFailed => "Eingabe ungültig",
            Self::NotFound => "Nicht gefunden",
            Self::AlreadyExists => "Existiert bereits",
            Self::InvalidRequest => "Ungültige Anfrage",

            Self::NotAuthenticated => "Anmeldung erforderlich",
            Self::InvalidCredentials => "E-Mail oder Passwort falsch",
            Self::TokenInvalid => "Token ungültig",
            Self::TokenExpired => "Token abgelaufen",
            Self::PermissionDenied => "Zugriff verweigert",
            Self::AccountNotActivated => "Konto noch nicht aktiviert",
            Self::RateLimited => "Zu viele Anfragen, bitte später erneut versuchen",

            Self::LicenseNotFound => "Lizenzschlüssel ungültig",
            Self::LicenseSuspended => "Lizenz ist gesperrt",
            Self::LicenseExpired => "Lizenz ist abgelaufen",
            Self::LicenseCancelled => "Lizenz wurde gekündigt",

            Self::InvalidDomain => "Domain ungültig",
            Self::DomainQuotaExceeded => "Maximale Anzahl an Domains erreicht",
            Self::SingleDomainTaken => {
                "Diese Lizenz ist bereits auf einer anderen Domain aktiviert"
            }
            Self::DomainNotRegistered => "Domain ist für diese Lizenz nicht registriert",

            Self::CheckoutFailed => "Zahlungsvorgang konnte nicht gestartet werden",
            Self::InvoiceNotFound => "Rechnung nicht gefunden",

            Self::GuardTokenInvalid => "Formular-Token ungültig",

            Self::InternalError => "Interner Serverfehler",
            Self::DatabaseError => "Datenbankfehler",
            Self::KeySpaceExhausted => "Lizenzschlüssel konnte nicht erzeugt werden",
        }
    }

    /// HTTP status this code maps to
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::ValidationFailed | Self::InvalidRequest | Self::InvalidDomain => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound
            | Self::LicenseNotFound
            | Self::DomainNotRegistered
            | Self::InvoiceNotFound => StatusCode::NOT_FOUND,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenInvalid
            | Self::TokenExpired
            | Self::GuardTokenInvalid => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied
            | Self::AccountNotActivated
            | Self::LicenseSuspended
            | Self::LicenseExpired
            | Self::LicenseCancelled
            | Self::DomainQuotaExceeded
            | Self::SingleDomainTaken => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::CheckoutFailed => StatusCode::BAD_GATEWAY,
            Self::InternalError | Self::DatabaseError | Self::KeySpaceExhausted => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Category of this code
    pub fn category(&self) -> ErrorCategory {
        match self.code() {
            0..=999 => ErrorCategory::General,
            1000..=1999 => ErrorCategory::Auth,
            3000..=3999 => ErrorCategory::License,
            4000..=4999 => ErrorCategory::Domain,
            5000..=5999 => ErrorCategory::Billing,
            6000..=6999 => ErrorCategory::Guard,
            _ => ErrorCategory::System,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            ErrorCode::LicenseNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::DomainQuotaExceeded.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::RateLimited.http_status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_categories() {
        assert_eq!(ErrorCode::NotFound.category(), ErrorCategory::General);
        assert_eq!(
            ErrorCode::InvalidCredentials.category(),
            ErrorCategory::Auth
        );
        assert_eq!(ErrorCode::LicenseExpired.category(), ErrorCategory::License);
        assert_eq!(
            ErrorCode::SingleDomainTaken.category(),
            ErrorCategory::Domain
        );
        assert_eq!(ErrorCode::CheckoutFailed.category(), ErrorCategory::Billing);
        assert_eq!(
            ErrorCode::GuardTokenInvalid.category(),
            ErrorCategory::Guard
        );
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_display_format() {
        assert_eq!(ErrorCode::ValidationFailed.to_string(), "E0002");
        assert_eq!(ErrorCode::LicenseExpired.to_string(), "E3003");
    }
}
