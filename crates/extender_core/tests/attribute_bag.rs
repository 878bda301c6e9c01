use extender_core::{detect_value_type, AttrValue, AttributeBag, Extender, ExtenderKind, ValueType};

#[test]
fn numbers_and_numeric_strings_are_integers() {
    for value in [
        AttrValue::Int(5),
        AttrValue::Float(2.5),
        AttrValue::from("42"),
        AttrValue::from(" -7 "),
        AttrValue::from("1e3"),
    ] {
        assert_eq!(detect_value_type(&value, ""), ValueType::Integer, "{value:?}");
    }
    for value in [
        AttrValue::from("blue"),
        AttrValue::from("42abc"),
        AttrValue::from(""),
        AttrValue::Bool(true),
        AttrValue::Null,
    ] {
        assert_eq!(detect_value_type(&value, ""), ValueType::Text, "{value:?}");
    }
}

#[test]
fn explicit_type_always_wins() {
    assert_eq!(
        detect_value_type(&AttrValue::from("42"), "text"),
        ValueType::Text
    );
    assert_eq!(
        detect_value_type(&AttrValue::from("blue"), "json"),
        ValueType::Other("json".to_string())
    );
}

#[test]
fn integer_reads_truncate_numeric_prefix() {
    let mut extender =
        Extender::with_value_type(ExtenderKind::Metadata, 1, 2, "n", "12.9kg", "integer");
    assert_eq!(extender.value().unwrap(), Some(AttrValue::Int(12)));
    assert_eq!(extender.raw_value(), &AttrValue::from("12.9kg"));

    extender.set_value("blue", "");
    assert_eq!(extender.value_type(), ValueType::Text);
    assert_eq!(extender.value().unwrap(), Some(AttrValue::from("blue")));
}

#[test]
fn cursor_pass_repeats_after_rewind() {
    let extender = Extender::new(ExtenderKind::Annotation, 1, 2, "comment", "hi");
    let mut bag = extender.attributes().clone();

    let mut first = Vec::new();
    bag.rewind();
    while bag.valid() {
        first.push((bag.key().unwrap().to_string(), bag.current().cloned()));
        bag.next();
    }

    let mut second = Vec::new();
    bag.rewind();
    while bag.valid() {
        second.push((bag.key().unwrap().to_string(), bag.current().cloned()));
        bag.next();
    }

    assert_eq!(first.len(), bag.len());
    assert_eq!(first, second);
    assert!(bag.current().is_none());
}

#[test]
fn keyed_view_never_adds_keys_and_clear_is_idempotent() {
    let mut bag = AttributeBag::with_keys(&["name", "value"]);
    assert!(!bag.write("missing", "x"));
    assert!(!bag.exists("missing"));

    assert!(bag.write("name", "color"));
    assert!(bag.clear("name"));
    let once = bag.clone();
    assert!(bag.clear("name"));
    assert_eq!(bag, once);
    assert_eq!(bag.read("name"), Some(&AttrValue::from("")));
    assert!(bag.exists("name"));
}
