//! Physical table naming.
//!
//! Table names are interpolated into DDL and DML, so every name passes
//! [`validate_identifier`] before it reaches an engine.

use crate::error::{StorageError, StorageResult};
use crate::types::BucketId;

/// Prefix shared by all partition tables.
pub const PARTITION_PREFIX: &str = "downloads_requests_";

/// Name of the externally maintained window relation.
pub const WINDOW_TABLE: &str = "bucket_windows";

/// Name of the fixed, non-partitioned client registration table.
pub const CLIENT_TABLE: &str = "mid_clients";

const MAX_IDENTIFIER_LEN: usize = 63;

/// Returns the table name for `bucket`.
///
/// Negative ids are written as `n<abs>` so the name stays inside the
/// allowed character set.
#[must_use]
pub fn partition_name(bucket: BucketId) -> String {
    let id = bucket.as_i64();
    if id < 0 {
        format!("{PARTITION_PREFIX}n{}", id.unsigned_abs())
    } else {
        format!("{PARTITION_PREFIX}{id}")
    }
}

/// Checks that `name` only uses `[a-z0-9_]`, starts with a letter or
/// underscore and fits the engine identifier limit.
pub fn validate_identifier(name: &str) -> StorageResult<&str> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid_start && valid_rest && name.len() <= MAX_IDENTIFIER_LEN {
        Ok(name)
    } else {
        Err(StorageError::InvalidIdentifier(name.to_string()))
    }
}

/// Returns the validated table name for `bucket`.
pub fn checked_partition_name(bucket: BucketId) -> StorageResult<String> {
    let name = partition_name(bucket);
    validate_identifier(&name)?;
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn positive_bucket_name() {
        assert_eq!(partition_name(BucketId::new(7)), "downloads_requests_7");
    }

    #[test]
    fn unresolved_bucket_name() {
        assert_eq!(partition_name(BucketId::UNRESOLVED), "downloads_requests_0");
    }

    #[test]
    fn negative_bucket_name() {
        assert_eq!(partition_name(BucketId::new(-12)), "downloads_requests_n12");
        assert_eq!(
            partition_name(BucketId::new(i64::MIN)),
            "downloads_requests_n9223372036854775808"
        );
    }

    #[test]
    fn rejects_injection_attempts() {
        assert!(validate_identifier("t; drop table x").is_err());
        assert!(validate_identifier("Downloads").is_err());
        assert!(validate_identifier("1abc").is_err());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier(&"a".repeat(64)).is_err());
    }

    #[test]
    fn accepts_static_tables() {
        assert!(validate_identifier(WINDOW_TABLE).is_ok());
        assert!(validate_identifier(CLIENT_TABLE).is_ok());
    }

    proptest! {
        #[test]
        fn every_bucket_name_is_valid(id in any::<i64>()) {
            let name = checked_partition_name(BucketId::new(id)).unwrap();
            prop_assert!(name.starts_with(PARTITION_PREFIX));
        }

        #[test]
        fn naming_is_deterministic_and_injective(a in any::<i64>(), b in any::<i64>()) {
            let (na, nb) = (partition_name(BucketId::new(a)), partition_name(BucketId::new(b)));
            prop_assert_eq!(na == nb, a == b);
        }
    }
}
