//! License key generation
//!
//! Keys look like `GS-AGENCY-7XK2-M4PQ-WR9T`: package prefix plus three
//! groups of four characters from an alphabet without visually ambiguous
//! characters (no 0/O, no 1/I/L). Random only; keys carry no embedded
//! structure beyond the prefix.

use rand::Rng;
use shared::error::{AppError, ErrorCode};
use shared::license::PackageType;
use sqlx::PgPool;

use crate::db;
use crate::error::ServiceResult;

const KEY_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const GROUPS: usize = 3;
const GROUP_LEN: usize = 4;

/// Maximum uniqueness-check attempts before failing closed
const MAX_ATTEMPTS: u32 = 10;

/// One random key candidate (uniqueness not yet checked)
pub fn random_key(package: PackageType) -> String {
    let mut rng = rand::thread_rng();
    let mut key = String::from(package.key_prefix());
    for group in 0..GROUPS {
        if group > 0 {
            key.push('-');
        }
        for _ in 0..GROUP_LEN {
            let idx = rng.gen_range(0..KEY_ALPHABET.len());
            key.push(KEY_ALPHABET[idx] as char);
        }
    }
    key
}

/// Generate a key that does not collide with an existing license.
///
/// Collisions are astronomically unlikely (31^12 per prefix) but the check
/// is cheap; after [`MAX_ATTEMPTS`] lookups this fails closed rather than
/// risking a duplicate key.
pub async fn generate_unique_key(pool: &PgPool, package: PackageType) -> ServiceResult<String> {
    for _ in 0..MAX_ATTEMPTS {
        let candidate = random_key(package);
        if !db::licenses::key_exists(pool, &candidate).await? {
            return Ok(candidate);
        }
        tracing::warn!(package = package.as_db(), "License key collision, retrying");
    }
    Err(AppError::new(ErrorCode::KeySpaceExhausted).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agency_prefix() {
        for _ in 0..50 {
            assert!(random_key(PackageType::Agency).starts_with("GS-AGENCY-"));
        }
    }

    #[test]
    fn test_key_shape() {
        let key = random_key(PackageType::Single);
        let rest = key.strip_prefix("GS-SINGLE-").unwrap();
        let groups: Vec<&str> = rest.split('-').collect();
        assert_eq!(groups.len(), 3);
        for g in groups {
            assert_eq!(g.len(), 4);
        }
    }

    #[test]
    fn test_no_ambiguous_characters() {
        for _ in 0..100 {
            let key = random_key(PackageType::Free);
            let rest = key.strip_prefix("GS-FREE-").unwrap();
            for c in rest.chars().filter(|c| *c != '-') {
                assert!(
                    !"0O1IL".contains(c),
                    "ambiguous character {c} in key {key}"
                );
                assert!(KEY_ALPHABET.contains(&(c as u8)));
            }
        }
    }

    #[test]
    fn test_keys_differ() {
        let a = random_key(PackageType::Agency);
        let b = random_key(PackageType::Agency);
        assert_ne!(a, b);
    }
}
