//! Flat source mappings consumed by the form mapper.

use crate::file::UploadedFile;
use indexmap::IndexMap;

/// Multi-valued string mapping built from url-encoded or multipart fields.
///
/// Keys keep their first-insertion order and every key holds the values in
/// the order they were appended, so repeated inputs (multi-selects,
/// checkbox groups) survive intact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    inner: IndexMap<String, Vec<String>>,
}

impl FormValues {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapping from ordered pairs.
    ///
    /// ```
    /// use bindery_core::FormValues;
    ///
    /// let values = FormValues::from_pairs([("ip", "10.0.0.1"), ("ip", "10.0.0.2")]);
    /// assert_eq!(values.get("ip").map(<[String]>::len), Some(2));
    /// ```
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut values = Self::new();
        for (key, value) in pairs {
            values.append(key, value);
        }
        values
    }

    /// Appends a value under `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.entry(key.into()).or_default().push(value.into());
    }

    /// Appends every value of `other` after the values already present.
    pub fn merge(&mut self, other: FormValues) {
        for (key, values) in other.inner {
            self.inner.entry(key).or_default().extend(values);
        }
    }

    /// Returns all values of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.inner.get(key).map(Vec::as_slice)
    }

    /// Returns the first value of `key`.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.inner
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no key is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates over keys and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Uploaded files grouped by form field name.
#[derive(Debug, Clone, Default)]
pub struct FileMap {
    inner: IndexMap<String, Vec<UploadedFile>>,
}

impl FileMap {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a file under `key`.
    pub fn append(&mut self, key: impl Into<String>, file: UploadedFile) {
        self.inner.entry(key.into()).or_default().push(file);
    }

    /// Returns all files of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[UploadedFile]> {
        self.inner.get(key).map(Vec::as_slice)
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no file was uploaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates over keys and their files.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[UploadedFile])> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}
