//! License validation endpoint (plugin-facing)
//!
//! POST /api/v1/validate — the one call every installed plugin makes. The
//! response shape is part of the plugin wire contract: `valid` plus either
//! the feature/license payload or `error` + `message`.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use shared::error::AppError;

use crate::db::domains::SiteMeta;
use crate::licensing::activation;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ValidateRequest {
    pub license_key: String,
    pub domain: String,
    #[serde(default)]
    pub site_title: Option<String>,
    #[serde(default)]
    pub wp_version: Option<String>,
    #[serde(default)]
    pub php_version: Option<String>,
}

pub async fn validate(
    State(state): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> Response {
    let meta = SiteMeta {
        site_title: req.site_title.as_deref(),
        wp_version: req.wp_version.as_deref(),
        php_version: req.php_version.as_deref(),
    };

    match activation::validate_and_activate(&state.pool, &req.license_key, &req.domain, &meta)
        .await
    {
        Ok(act) => Json(serde_json::json!({
            "valid": true,
            "registered": act.registered,
            "features": act.features,
            "license": act.license,
        }))
        .into_response(),
        Err(e) => {
            let err: AppError = e.into();
            (err.http_status(), Json(error_body(&err))).into_response()
        }
    }
}

fn error_body(err: &AppError) -> serde_json::Value {
    let mut body = serde_json::json!({
        "valid": false,
        "error": err.code.code(),
        "message": err.message,
    });
    if let Some(ref details) = err.details {
        body["details"] = serde_json::json!(details);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn test_error_body_shape() {
        let err = AppError::new(ErrorCode::SingleDomainTaken)
            .with_detail("max_domains", 1)
            .with_detail("registered_domains", serde_json::json!(["site-a.com"]));
        let body = error_body(&err);

        assert_eq!(body["valid"], false);
        assert_eq!(body["error"], 4003);
        assert_eq!(
            body["message"],
            "Diese Lizenz ist bereits auf einer anderen Domain aktiviert"
        );
        assert_eq!(body["details"]["max_domains"], 1);
        assert_eq!(body["details"]["registered_domains"][0], "site-a.com");
    }

    #[test]
    fn test_error_body_without_details() {
        let body = error_body(&AppError::new(ErrorCode::LicenseNotFound));
        assert_eq!(body["error"], 3001);
        assert!(body.get("details").is_none());
    }
}
