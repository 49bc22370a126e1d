//! Field tables generated by `#[derive(FormModel)]`.

use bindery::core::{map_form, FileMap, FormValues};
use bindery::{Errors, FormModel, UploadedFile};

fn file(field: &str, name: &str) -> UploadedFile {
    UploadedFile::in_memory(field, name.as_bytes().to_vec().into()).with_file_name(name)
}

#[derive(Debug, Default, PartialEq, FormModel)]
struct Address {
    city: String,
    #[form(rename = "zip")]
    postal_code: String,
}

#[derive(Debug, Default, PartialEq, FormModel)]
struct Phone {
    phone: String,
}

#[derive(Debug, Default, FormModel)]
struct Profile {
    #[form(rename = "first_name")]
    name: String,
    age: u8,
    remember: bool,
    ratio: f64,
    ip: Vec<String>,
    scores: Vec<i16>,
    #[form(nested)]
    address: Address,
    #[form(nested)]
    phone: Option<Phone>,
    avatar: Option<UploadedFile>,
    pictures: Vec<UploadedFile>,
    #[form(skip)]
    internal: String,
    r#type: String,
}

#[test]
fn test_table_keys_and_order() {
    let keys: Vec<_> = Profile::fields().iter().map(|f| f.key()).collect();
    assert_eq!(
        keys,
        [
            "first_name", "age", "remember", "ratio", "ip", "scores", "address", "phone",
            "avatar", "pictures", "type"
        ]
    );
    assert_eq!(Profile::fields()[0].name(), "name");
}

#[test]
fn test_full_population() {
    let values = FormValues::from_pairs([
        ("first_name", "Logan"),
        ("age", "30"),
        ("remember", "on"),
        ("ratio", "0.5"),
        ("ip", "10.0.0.1"),
        ("ip", "10.0.0.2"),
        ("scores", "1"),
        ("scores", "-2"),
        ("city", "Browser"),
        ("zip", "12345"),
        ("internal", "nope"),
        ("type", "admin"),
    ]);
    let mut files = FileMap::new();
    files.append("avatar", file("avatar", "me.png"));
    files.append("pictures", file("pictures", "a.png"));
    files.append("pictures", file("pictures", "b.png"));

    let mut profile = Profile::default();
    let mut errors = Errors::new();
    map_form(&mut profile, &values, Some(&files), &mut errors);

    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(profile.name, "Logan");
    assert_eq!(profile.age, 30);
    assert!(profile.remember);
    assert!((profile.ratio - 0.5).abs() < f64::EPSILON);
    assert_eq!(profile.ip, ["10.0.0.1", "10.0.0.2"]);
    assert_eq!(profile.scores, [1, -2]);
    assert_eq!(
        profile.address,
        Address {
            city: "Browser".into(),
            postal_code: "12345".into()
        }
    );
    assert!(profile.phone.is_none());
    assert_eq!(profile.avatar.unwrap().file_name(), Some("me.png"));
    assert_eq!(profile.pictures.len(), 2);
    assert_eq!(profile.internal, "");
    assert_eq!(profile.r#type, "admin");
}

#[test]
fn test_optional_record_materialised_on_match() {
    let values = FormValues::from_pairs([("phone", "555-0100")]);
    let mut profile = Profile::default();
    let mut errors = Errors::new();
    map_form(&mut profile, &values, None, &mut errors);

    assert_eq!(
        profile.phone,
        Some(Phone {
            phone: "555-0100".into()
        })
    );
}

#[test]
fn test_coercion_errors_accumulate() {
    let values = FormValues::from_pairs([
        ("age", "old"),
        ("remember", "maybe"),
        ("scores", "1"),
        ("scores", "x"),
        ("first_name", "Logan"),
    ]);
    let mut profile = Profile::default();
    let mut errors = Errors::new();
    map_form(&mut profile, &values, None, &mut errors);

    let messages: Vec<_> = errors.iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        [
            r#"field "age" cannot parse "old" as uint"#,
            r#"field "remember" cannot parse "maybe" as bool"#,
            r#"field "scores" cannot parse "x" as int"#,
        ]
    );
    assert_eq!(profile.age, 0);
    assert_eq!(profile.scores, [1, 0]);
    assert_eq!(profile.name, "Logan");
}

#[test]
fn test_plain_value_shadows_file() {
    let values = FormValues::from_pairs([("avatar", "not a file")]);
    let mut files = FileMap::new();
    files.append("avatar", file("avatar", "me.png"));

    let mut profile = Profile::default();
    let mut errors = Errors::new();
    map_form(&mut profile, &values, Some(&files), &mut errors);

    assert!(profile.avatar.is_none());
    assert!(errors.is_empty());
}
