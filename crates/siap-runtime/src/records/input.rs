//! Raw form input for create and edit.

use std::collections::BTreeMap;

/// One uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Field values as typed into a form, plus any attached files.
///
/// ```
/// use siap_runtime::records::RecordInput;
///
/// let input = RecordInput::new()
///     .set("name", "Budi")
///     .set("age", "31")
///     .attach("photo", "budi.jpg", vec![0xFF, 0xD8]);
/// assert_eq!(input.value("age"), Some("31"));
/// assert_eq!(input.uploads().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordInput {
    values: BTreeMap<String, String>,
    uploads: Vec<Upload>,
}

impl RecordInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field value, replacing an earlier one.
    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    /// Adds a file to an attachment field.
    #[must_use]
    pub fn attach(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.uploads.push(Upload {
            field: field.into(),
            file_name: file_name.into(),
            bytes,
        });
        self
    }

    /// Parses `field=value`. The value may contain `=`.
    pub fn parse_assignment(text: &str) -> Option<(String, String)> {
        let (field, value) = text.split_once('=')?;
        let field = field.trim();
        (!field.is_empty()).then(|| (field.to_string(), value.to_string()))
    }

    #[must_use]
    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn uploads(&self) -> &[Upload] {
        &self.uploads
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.uploads.is_empty()
    }
}
