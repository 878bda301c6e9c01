use extender_core::db::open_db_in_memory;
use extender_core::{
    AttrValue, Extender, ExtenderKind, ExtenderRepository, RepoError, SqliteExtenderRepository,
    ValueError, ValueType,
};

#[test]
fn first_save_assigns_id_and_time_created() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteExtenderRepository::new(&conn);

    let mut extender = Extender::new(ExtenderKind::Metadata, 42, 7, "count", 42);
    assert_eq!(extender.id(), None);
    assert_eq!(extender.time_created(), None);

    let id = extender.save(&repo).unwrap();
    assert_eq!(extender.id(), Some(id));
    assert!(extender.time_created().unwrap() > 0);
    assert_eq!(extender.system_log_id(), Some(id));
    assert_eq!(extender.class_name(), "metadata");
    assert_eq!(extender.object_owner_guid(), 7);
}

#[test]
fn stored_integer_string_reads_back_as_integer() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteExtenderRepository::new(&conn);

    let mut extender = Extender::new(ExtenderKind::Annotation, 1, 2, "score", "42");
    let id = extender.save(&repo).unwrap();

    let loaded = repo.get(ExtenderKind::Annotation, id).unwrap().unwrap();
    assert_eq!(loaded.raw_value(), &AttrValue::from("42"));
    assert_eq!(loaded.value_type(), ValueType::Integer);
    assert_eq!(loaded.value().unwrap(), Some(AttrValue::Int(42)));
    assert_eq!(loaded.name(), "score");
    assert_eq!(loaded.entity_guid(), 1);
    assert_eq!(loaded.owner_guid(), 2);
    assert_eq!(loaded.time_created(), extender.time_created());
}

#[test]
fn unsupported_stored_type_fails_on_read_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteExtenderRepository::new(&conn);

    let mut extender =
        Extender::with_value_type(ExtenderKind::Metadata, 1, 2, "ratio", "0.5", "float");
    let id = extender.save(&repo).unwrap();

    let loaded = repo.get(ExtenderKind::Metadata, id).unwrap().unwrap();
    assert_eq!(
        loaded.value(),
        Err(ValueError::UnsupportedValueType("float".to_string()))
    );
    assert_eq!(loaded.raw_value(), &AttrValue::from("0.5"));
}

#[test]
fn variants_use_separate_tables() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteExtenderRepository::new(&conn);

    let mut annotation = Extender::new(ExtenderKind::Annotation, 1, 2, "comment", "hi");
    let id = annotation.save(&repo).unwrap();

    assert!(repo.get(ExtenderKind::Metadata, id).unwrap().is_none());
    assert!(repo.get(ExtenderKind::Annotation, id).unwrap().is_some());
}

#[test]
fn second_save_updates_value_in_place() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteExtenderRepository::new(&conn);

    let mut extender = Extender::new(ExtenderKind::Metadata, 1, 2, "color", "blue");
    let id = extender.save(&repo).unwrap();

    extender.set_value(7, "");
    assert_eq!(extender.save(&repo).unwrap(), id);

    let loaded = repo.get(ExtenderKind::Metadata, id).unwrap().unwrap();
    assert_eq!(loaded.value_type(), ValueType::Integer);
    assert_eq!(loaded.value().unwrap(), Some(AttrValue::Int(7)));
    assert_eq!(loaded.time_created(), extender.time_created());
}

#[test]
fn list_for_entity_returns_rows_in_insert_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteExtenderRepository::new(&conn);

    for (entity, name) in [(1, "a"), (2, "b"), (1, "c")] {
        Extender::new(ExtenderKind::Metadata, entity, 9, name, "x")
            .save(&repo)
            .unwrap();
    }

    let names = repo
        .list_for_entity(ExtenderKind::Metadata, 1)
        .unwrap()
        .iter()
        .map(|extender| extender.name().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["a", "c"]);
    assert!(repo
        .list_for_entity(ExtenderKind::Annotation, 1)
        .unwrap()
        .is_empty());
}

#[test]
fn delete_removes_row_and_reports_missing_targets() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteExtenderRepository::new(&conn);

    let unsaved = Extender::new(ExtenderKind::Annotation, 1, 2, "comment", "hi");
    assert!(matches!(unsaved.delete(&repo), Err(RepoError::MissingId)));

    let mut extender = unsaved.clone();
    let id = extender.save(&repo).unwrap();
    extender.delete(&repo).unwrap();
    assert!(repo.get(ExtenderKind::Annotation, id).unwrap().is_none());

    match extender.delete(&repo).unwrap_err() {
        RepoError::NotFound { kind, id: missing } => {
            assert_eq!(kind, ExtenderKind::Annotation);
            assert_eq!(missing, id);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn blank_name_is_rejected_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteExtenderRepository::new(&conn);

    let mut extender = Extender::new(ExtenderKind::Metadata, 1, 2, "  ", "x");
    assert!(matches!(
        extender.save(&repo),
        Err(RepoError::InvalidData(_))
    ));
    assert_eq!(extender.id(), None);
}
