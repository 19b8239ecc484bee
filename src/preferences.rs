//! Preference Storage
//!
//! The sticky bundle preference lives in a single slot, last write wins. The
//! storefront keeps it as JSON under an opaque key; [`JsonFilePreferenceStore`] does
//! the same with a file.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

use crate::selection::BundlePreference;

/// Errors reading or writing a stored preference.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// IO error reading or writing the preference file
    #[error("failed to access preference file {path}: {source}")]
    Io {
        /// File that could not be accessed
        path: PathBuf,
        /// Underlying IO error
        source: io::Error,
    },

    /// The stored preference is not valid JSON
    #[error("failed to parse stored preference: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize a preference to its stored JSON form.
///
/// # Errors
///
/// Returns a [`PreferenceError::Json`] if serialization fails.
pub fn to_json(preference: &BundlePreference) -> Result<String, PreferenceError> {
    Ok(serde_json::to_string(preference)?)
}

/// Parse a preference from its stored JSON form. A JSON `null` is no preference.
///
/// # Errors
///
/// Returns a [`PreferenceError::Json`] if the text is not a valid preference.
pub fn from_json(json: &str) -> Result<Option<BundlePreference>, PreferenceError> {
    Ok(serde_json::from_str(json)?)
}

/// Storage for the sticky bundle preference.
pub trait PreferenceStore {
    /// Load the stored preference, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`PreferenceError`] if the stored value cannot be read.
    fn load(&self) -> Result<Option<BundlePreference>, PreferenceError>;

    /// Overwrite the stored preference; `None` clears it.
    ///
    /// # Errors
    ///
    /// Returns a [`PreferenceError`] if the value cannot be written.
    fn save(&mut self, preference: Option<&BundlePreference>) -> Result<(), PreferenceError>;
}

/// In-memory preference slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    slot: Option<BundlePreference>,
}

impl MemoryPreferenceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Option<BundlePreference>, PreferenceError> {
        Ok(self.slot.clone())
    }

    fn save(&mut self, preference: Option<&BundlePreference>) -> Result<(), PreferenceError> {
        self.slot = preference.cloned();

        Ok(())
    }
}

/// Preference stored as JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
}

impl JsonFilePreferenceStore {
    /// Create a store backed by the given file. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> PreferenceError {
        PreferenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn load(&self) -> Result<Option<BundlePreference>, PreferenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored preference");
                return Ok(None);
            }
            Err(err) => return Err(self.io_error(err)),
        };

        if contents.trim().is_empty() {
            return Ok(None);
        }

        from_json(&contents)
    }

    fn save(&mut self, preference: Option<&BundlePreference>) -> Result<(), PreferenceError> {
        let json = serde_json::to_string_pretty(&preference)?;

        fs::write(&self.path, json).map_err(|err| self.io_error(err))?;

        debug!(
            path = %self.path.display(),
            code = preference.map(|p| p.code.as_str()),
            "stored preference"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{cart::ZodiacSign, discounts::Discount};

    use super::*;

    fn family() -> BundlePreference {
        BundlePreference::from_discount(
            &Discount::new("FAMILY15-ARI".into(), "Family (Aries)", 750)
                .with_sign(ZodiacSign::Aries),
        )
    }

    #[test]
    fn json_shape() -> TestResult {
        let json = to_json(&family())?;

        assert_eq!(
            json,
            r#"{"code":"FAMILY15-ARI","label":"Family (Aries)","amount_minor":750,"sign":"ARI"}"#
        );

        Ok(())
    }

    #[test]
    fn json_without_sign_omits_it() -> TestResult {
        let preference =
            BundlePreference::from_discount(&Discount::new("DUO10".into(), "Duo", 700));

        assert!(!to_json(&preference)?.contains("sign"));
        assert_eq!(from_json(&to_json(&preference)?)?, Some(preference));

        Ok(())
    }

    #[test]
    fn null_is_no_preference() -> TestResult {
        assert_eq!(from_json("null")?, None);

        Ok(())
    }

    #[test]
    fn memory_store_last_write_wins() -> TestResult {
        let mut store = MemoryPreferenceStore::new();

        assert_eq!(store.load()?, None);

        store.save(Some(&family()))?;
        assert_eq!(store.load()?, Some(family()));

        store.save(None)?;
        assert_eq!(store.load()?, None);

        Ok(())
    }

    #[test]
    fn file_store_missing_file_is_none() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFilePreferenceStore::new(dir.path().join("bundle.json"));

        assert_eq!(store.load()?, None);

        Ok(())
    }

    #[test]
    fn file_store_saves_and_clears() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut store = JsonFilePreferenceStore::new(dir.path().join("bundle.json"));

        store.save(Some(&family()))?;
        assert_eq!(store.load()?, Some(family()));

        store.save(None)?;
        assert_eq!(store.load()?, None);

        Ok(())
    }

    #[test]
    fn file_store_corrupt_file_is_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bundle.json");
        fs::write(&path, "{not json")?;

        let store = JsonFilePreferenceStore::new(path);

        assert!(matches!(store.load(), Err(PreferenceError::Json(_))));

        Ok(())
    }
}
