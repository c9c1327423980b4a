//! Version bookkeeping for schemas that change shape.
//!
//! A schema whose JSON differs from the previously exported one must carry a
//! version exactly one step ahead: a major bump with minor and patch reset, a
//! minor bump with patch reset, or a patch bump.

use semver::Version;

use crate::error::VersionError;

/// Compare two exported schemas, ignoring key order.
#[must_use]
pub fn schemas_equal(new: &serde_json::Value, old: &serde_json::Value) -> bool {
    // `Map` equality is by key, so insertion order never matters here.
    new == old
}

/// Check that `new` is a single increment of `old`.
///
/// An `old` version that does not parse accepts any well-formed `new`.
///
/// # Errors
///
/// Returns `VersionError::Format` when `new` is not a semantic version and
/// `VersionError::Increment` when it is not exactly one step ahead.
pub fn compare_versions(new: &str, old: &str) -> Result<(), VersionError> {
    let new_version = Version::parse(new).map_err(|source| VersionError::Format {
        version: new.to_string(),
        source,
    })?;
    let old_version = match Version::parse(old) {
        Ok(version) => version,
        Err(err) => {
            tracing::warn!(old, %err, "previous version is malformed, accepting {new}");
            return Ok(());
        }
    };

    let candidates = [
        Version::new(old_version.major + 1, 0, 0),
        Version::new(old_version.major, old_version.minor + 1, 0),
        Version::new(old_version.major, old_version.minor, old_version.patch + 1),
    ];
    if candidates.contains(&new_version) {
        Ok(())
    } else {
        Err(VersionError::Increment {
            old: old.to_string(),
            new: new.to_string(),
        })
    }
}
