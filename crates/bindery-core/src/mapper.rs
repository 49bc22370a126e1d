//! The form mapper: populates a [`FormModel`] from flat form sources.
//!
//! For every field of the model's table, in declaration order:
//!
//! 1. optional records are populated into a fresh value which is kept only
//!    when at least one of its keys matched;
//! 2. plain records are populated in place, sharing the flat key namespace;
//! 3. if the field's key has plain values, scalars take the first value and
//!    sequences are rebuilt from all of them; the file lookup is skipped;
//! 4. otherwise, if the key has uploaded files, file fields take them.
//!
//! Coercion failures are recorded in the error collection and never stop
//! the traversal.

use crate::error::{BindingError, Errors};
use crate::schema::{FieldKind, FormModel};
use crate::source::{FileMap, FormValues};

/// Borrowed view of the plain values and files a model is populated from.
#[derive(Debug, Clone, Copy)]
pub struct FormSource<'a> {
    values: &'a FormValues,
    files: Option<&'a FileMap>,
}

impl<'a> FormSource<'a> {
    /// Creates a source; `files` is `None` for url-encoded forms.
    #[must_use]
    pub const fn new(values: &'a FormValues, files: Option<&'a FileMap>) -> Self {
        Self { values, files }
    }

    /// The plain values.
    #[must_use]
    pub const fn values(&self) -> &'a FormValues {
        self.values
    }

    /// The uploaded files, if any.
    #[must_use]
    pub const fn files(&self) -> Option<&'a FileMap> {
        self.files
    }
}

/// Populates `model` from `values` and, for multipart forms, `files`.
///
/// Per-field failures are appended to `errors`; fields whose key is absent
/// keep their current value.
///
/// # Example
///
/// ```
/// use bindery_core::{map_form, Errors, Field, FieldKind, FormModel, FormValues, ScalarSlot};
///
/// #[derive(Default)]
/// struct Login {
///     remember: bool,
/// }
///
/// fn remember(m: &mut Login) -> &mut dyn ScalarSlot {
///     &mut m.remember
/// }
///
/// impl FormModel for Login {
///     fn fields() -> &'static [Field<Self>] {
///         static FIELDS: [Field<Login>; 1] =
///             [Field::new("remember", "remember", FieldKind::Scalar(remember))];
///         &FIELDS
///     }
/// }
///
/// let mut login = Login::default();
/// let mut errors = Errors::new();
/// map_form(&mut login, &FormValues::from_pairs([("remember", "on")]), None, &mut errors);
/// assert!(login.remember);
/// assert!(errors.is_empty());
/// ```
pub fn map_form<M: FormModel>(
    model: &mut M,
    values: &FormValues,
    files: Option<&FileMap>,
    errors: &mut Errors,
) {
    let source = FormSource::new(values, files);
    map_fields(model, &source, errors);
}

/// Walks the field table of `M`; returns `true` if any key matched.
pub(crate) fn map_fields<M: FormModel>(
    model: &mut M,
    source: &FormSource<'_>,
    errors: &mut Errors,
) -> bool {
    let mut matched = false;

    for field in M::fields() {
        match field.kind() {
            FieldKind::Optional(access) => matched |= access(model).map_optional(source, errors),
            FieldKind::Record(access) => matched |= access(model).map_record(source, errors),
            _ => {}
        }

        let key = field.key();

        if let Some(tokens) = source.values.get(key) {
            match field.kind() {
                FieldKind::Scalar(access) => {
                    matched = true;
                    if let Some(token) = tokens.first() {
                        if let Err(err) = access(model).assign(token, key) {
                            tracing::trace!(key, token = %token, "field coercion failed");
                            errors.push(BindingError::deserialization(err));
                        }
                    }
                }
                FieldKind::Sequence(access) => {
                    matched = true;
                    if !tokens.is_empty() {
                        access(model).assign_all(tokens, key, errors);
                    }
                }
                // Plain values never populate files or records.
                FieldKind::File(_) | FieldKind::Record(_) | FieldKind::Optional(_) => {}
            }
            continue;
        }

        if let FieldKind::File(access) = field.kind() {
            if let Some(files) = source.files.and_then(|files| files.get(key)) {
                matched = true;
                access(model).assign_files(files);
            }
        }
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::ScalarSlot;
    use crate::file::UploadedFile;
    use crate::schema::{Field, FileSlot, OptionalSlot, RecordSlot, SequenceSlot};
    use bytes::Bytes;

    #[derive(Debug, Default, PartialEq)]
    struct Address {
        street: String,
        city: String,
    }

    fn street(m: &mut Address) -> &mut dyn ScalarSlot {
        &mut m.street
    }
    fn city(m: &mut Address) -> &mut dyn ScalarSlot {
        &mut m.city
    }

    impl FormModel for Address {
        fn fields() -> &'static [Field<Self>] {
            static FIELDS: [Field<Address>; 2] = [
                Field::new("street", "street", FieldKind::Scalar(street)),
                Field::new("city", "city", FieldKind::Scalar(city)),
            ];
            &FIELDS
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Contact {
        phone: String,
    }

    fn phone(m: &mut Contact) -> &mut dyn ScalarSlot {
        &mut m.phone
    }

    impl FormModel for Contact {
        fn fields() -> &'static [Field<Self>] {
            static FIELDS: [Field<Contact>; 1] =
                [Field::new("phone", "phone", FieldKind::Scalar(phone))];
            &FIELDS
        }
    }

    #[derive(Debug, Default)]
    struct Profile {
        name: String,
        height: i32,
        address: Address,
        contact: Option<Contact>,
        ip: Vec<String>,
        avatar: Option<UploadedFile>,
        pictures: Vec<UploadedFile>,
    }

    fn name(m: &mut Profile) -> &mut dyn ScalarSlot {
        &mut m.name
    }
    fn height(m: &mut Profile) -> &mut dyn ScalarSlot {
        &mut m.height
    }
    fn address(m: &mut Profile) -> &mut dyn RecordSlot {
        &mut m.address
    }
    fn contact(m: &mut Profile) -> &mut dyn OptionalSlot {
        &mut m.contact
    }
    fn ip(m: &mut Profile) -> &mut dyn SequenceSlot {
        &mut m.ip
    }
    fn avatar(m: &mut Profile) -> &mut dyn FileSlot {
        &mut m.avatar
    }
    fn pictures(m: &mut Profile) -> &mut dyn FileSlot {
        &mut m.pictures
    }

    impl FormModel for Profile {
        fn fields() -> &'static [Field<Self>] {
            static FIELDS: [Field<Profile>; 7] = [
                Field::new("name", "first_name", FieldKind::Scalar(name)),
                Field::new("height", "height", FieldKind::Scalar(height)),
                Field::new("address", "address", FieldKind::Record(address)),
                Field::new("contact", "contact", FieldKind::Optional(contact)),
                Field::new("ip", "ip", FieldKind::Sequence(ip)),
                Field::new("avatar", "avatar", FieldKind::File(avatar)),
                Field::new("pictures", "picture", FieldKind::File(pictures)),
            ];
            &FIELDS
        }
    }

    fn picture(name: &str) -> UploadedFile {
        UploadedFile::in_memory("picture", Bytes::from_static(b"img")).with_file_name(name)
    }

    #[test]
    fn test_populates_flat_and_nested_fields() {
        let values = FormValues::from_pairs([
            ("first_name", "Logan"),
            ("height", "180"),
            ("street", "404 Broadway"),
            ("city", "Browser"),
            ("ip", "10.0.0.1"),
            ("ip", "10.0.0.2"),
        ]);
        let mut profile = Profile::default();
        let mut errors = Errors::new();

        map_form(&mut profile, &values, None, &mut errors);

        assert!(errors.is_empty());
        assert_eq!(profile.name, "Logan");
        assert_eq!(profile.height, 180);
        assert_eq!(profile.address.street, "404 Broadway");
        assert_eq!(profile.address.city, "Browser");
        assert_eq!(profile.ip, ["10.0.0.1", "10.0.0.2"]);
        assert!(profile.contact.is_none());
    }

    #[test]
    fn test_bad_token_recorded_and_traversal_continues() {
        let values = FormValues::from_pairs([("height", "bad"), ("first_name", "Logan")]);
        let mut profile = Profile::default();
        let mut errors = Errors::new();

        map_form(&mut profile, &values, None, &mut errors);

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            r#"field "height" cannot parse "bad" as int"#
        );
        assert_eq!(profile.height, 0);
        assert_eq!(profile.name, "Logan");
    }

    #[test]
    fn test_optional_record_materialized_only_when_matched() {
        let mut profile = Profile::default();
        let mut errors = Errors::new();
        map_form(&mut profile, &FormValues::new(), None, &mut errors);
        assert!(profile.contact.is_none());

        // Present with an empty value still counts as present.
        let values = FormValues::from_pairs([("phone", "")]);
        map_form(&mut profile, &values, None, &mut errors);
        assert_eq!(profile.contact, Some(Contact::default()));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_files_assigned_from_file_map() {
        let mut files = FileMap::new();
        files.append("avatar", picture("me.png"));
        files.append("picture", picture("1.png"));
        files.append("picture", picture("2.png"));

        let mut profile = Profile::default();
        let mut errors = Errors::new();
        map_form(&mut profile, &FormValues::new(), Some(&files), &mut errors);

        assert_eq!(profile.avatar.as_ref().and_then(UploadedFile::file_name), Some("me.png"));
        let names: Vec<_> = profile.pictures.iter().filter_map(UploadedFile::file_name).collect();
        assert_eq!(names, ["1.png", "2.png"]);
    }

    #[test]
    fn test_plain_value_shadows_file_lookup() {
        let values = FormValues::from_pairs([("avatar", "not-a-file")]);
        let mut files = FileMap::new();
        files.append("avatar", picture("me.png"));

        let mut profile = Profile::default();
        let mut errors = Errors::new();
        map_form(&mut profile, &values, Some(&files), &mut errors);

        assert!(profile.avatar.is_none());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_sequence_with_bad_elements() {
        #[derive(Default)]
        struct Scores {
            points: Vec<u16>,
        }
        fn points(m: &mut Scores) -> &mut dyn SequenceSlot {
            &mut m.points
        }
        impl FormModel for Scores {
            fn fields() -> &'static [Field<Self>] {
                static FIELDS: [Field<Scores>; 1] =
                    [Field::new("points", "points", FieldKind::Sequence(points))];
                &FIELDS
            }
        }

        let values = FormValues::from_pairs([("points", "1"), ("points", "x"), ("points", "-2")]);
        let mut scores = Scores::default();
        let mut errors = Errors::new();
        map_form(&mut scores, &values, None, &mut errors);

        assert_eq!(scores.points, [1, 0, 0]);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1].to_string(), r#"field "points" cannot parse "-2" as uint"#);
    }
}
