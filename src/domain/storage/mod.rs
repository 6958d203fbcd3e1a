//! Storage module - addressing of stored documents.

mod locator;

pub use locator::{LocatorError, StorageLocator, GCS_SCHEME, UNKNOWN_FILE_NAME};
pub(crate) use locator::file_name_of;
