//! Storage locator - `gs://bucket/path` addressing for stored documents.
//!
//! Search hits point at their source files through a locator string. Before a
//! locator can be turned into a download link it is parsed into its bucket and
//! object parts; anything that does not follow the scheme is rejected without
//! touching the network.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Scheme prefix accepted for locators.
pub const GCS_SCHEME: &str = "gs";

/// Display name for a document whose locator names no file.
pub const UNKNOWN_FILE_NAME: &str = "unknown";

/// A parsed `gs://bucket/path` locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageLocator {
    bucket: String,
    object: String,
}

/// Locator parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    /// The string does not follow `gs://bucket/path`.
    #[error("Invalid GCS URI format: {0}")]
    InvalidLocatorFormat(String),
}

impl StorageLocator {
    /// Parses a locator string.
    ///
    /// The bucket is everything between `gs://` and the next `/`; the object
    /// path is the non-empty remainder.
    pub fn parse(raw: &str) -> Result<Self, LocatorError> {
        let invalid = || LocatorError::InvalidLocatorFormat(raw.to_string());

        let rest = raw
            .strip_prefix(GCS_SCHEME)
            .and_then(|r| r.strip_prefix("://"))
            .ok_or_else(invalid)?;
        let (bucket, object) = rest.split_once('/').ok_or_else(invalid)?;

        if bucket.is_empty() || object.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            bucket: bucket.to_string(),
            object: object.to_string(),
        })
    }

    /// Returns the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the object path inside the bucket.
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Returns the last path segment, used as a display file name.
    ///
    /// A locator ending in `/` names a folder and gets [`UNKNOWN_FILE_NAME`].
    pub fn file_name(&self) -> &str {
        file_name_of(&self.object)
    }
}

impl FromStr for StorageLocator {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for StorageLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", GCS_SCHEME, self.bucket, self.object)
    }
}

/// Last `/`-separated segment of any path-like string, or
/// [`UNKNOWN_FILE_NAME`] when that segment is empty.
///
/// Works on raw locator strings too, so hits whose locator is not a valid
/// `gs://` address still get a readable name.
pub(crate) fn file_name_of(path: &str) -> &str {
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => UNKNOWN_FILE_NAME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_bucket_and_nested_object() {
        let locator = StorageLocator::parse("gs://docs/manuals/2024/aircon.pdf").unwrap();
        assert_eq!(locator.bucket(), "docs");
        assert_eq!(locator.object(), "manuals/2024/aircon.pdf");
        assert_eq!(locator.file_name(), "aircon.pdf");
    }

    #[test]
    fn display_round_trips_the_original_string() {
        let raw = "gs://docs/a.pdf";
        assert_eq!(StorageLocator::parse(raw).unwrap().to_string(), raw);
    }

    #[test]
    fn rejects_wrong_scheme() {
        let err = StorageLocator::parse("s3://docs/a.pdf").unwrap_err();
        assert_eq!(err, LocatorError::InvalidLocatorFormat("s3://docs/a.pdf".to_string()));
        assert_eq!(err.to_string(), "Invalid GCS URI format: s3://docs/a.pdf");
    }

    #[test]
    fn rejects_missing_object_path() {
        assert!(StorageLocator::parse("gs://docs").is_err());
        assert!(StorageLocator::parse("gs://docs/").is_err());
    }

    #[test]
    fn rejects_missing_bucket() {
        assert!(StorageLocator::parse("gs:///a.pdf").is_err());
        assert!(StorageLocator::parse("").is_err());
        assert!(StorageLocator::parse("https://storage.googleapis.com/docs/a.pdf").is_err());
    }

    #[test]
    fn file_name_of_raw_strings() {
        assert_eq!(file_name_of("gs://docs/dir/b.pdf"), "b.pdf");
        assert_eq!(file_name_of("plain"), "plain");
        assert_eq!(file_name_of("gs://docs/dir/"), UNKNOWN_FILE_NAME);
        assert_eq!(file_name_of(""), UNKNOWN_FILE_NAME);
    }

    #[test]
    fn folder_locator_has_unknown_file_name() {
        let locator = StorageLocator::parse("gs://docs/dir/").unwrap();
        assert_eq!(locator.object(), "dir/");
        assert_eq!(locator.file_name(), "unknown");
    }

    proptest! {
        #[test]
        fn strings_without_gs_scheme_never_parse(s in "[a-z0-9:/._-]{0,40}") {
            prop_assume!(!s.starts_with("gs://"));
            prop_assert!(StorageLocator::parse(&s).is_err());
        }

        #[test]
        fn well_formed_locators_always_parse(
            bucket in "[a-z0-9][a-z0-9._-]{0,20}",
            object in "[A-Za-z0-9._-]{1,20}(/[A-Za-z0-9._-]{1,20}){0,3}",
        ) {
            let raw = format!("gs://{}/{}", bucket, object);
            let locator = StorageLocator::parse(&raw).unwrap();
            prop_assert_eq!(locator.bucket(), bucket.as_str());
            prop_assert_eq!(locator.object(), object.as_str());
        }
    }
}
