use diboot_core::db::open_db_in_memory;
use diboot_core::repo::relation::related_entity_ids;
use diboot_core::{
    dictionary_parent_key, Dictionary, DictionaryService, DictionaryVo, EntityQuery,
    ServiceError, SqliteDictionaryRepository,
};
use rusqlite::Connection;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn service(conn: &Connection) -> DictionaryService<SqliteDictionaryRepository<'_>> {
    DictionaryService::new(SqliteDictionaryRepository::try_new(conn).unwrap())
}

fn id_type_vo() -> DictionaryVo {
    DictionaryVo::new(
        Dictionary::root("ID_TYPE", "ID type"),
        vec![
            Dictionary::item("ID_TYPE", "ID card", "SFZ"),
            Dictionary::item("ID_TYPE", "Driving licence", "JZ"),
            Dictionary::item("ID_TYPE", "Passport", "HZ"),
        ],
    )
}

fn item_names(service: &DictionaryService<SqliteDictionaryRepository<'_>>, id: i64) -> Vec<String> {
    service
        .get_dictionary_with_children(id)
        .unwrap()
        .unwrap()
        .children
        .into_iter()
        .map(|child| child.item_name)
        .collect()
}

#[test]
fn create_update_delete_with_children() {
    let conn = setup();
    let service = service(&conn);

    let mut vo = id_type_vo();
    let parent_id = service.create_dict_and_children(&mut vo).unwrap();
    assert_eq!(vo.dictionary.id, Some(parent_id));
    assert!(vo.children.iter().all(|child| child.id.is_some()));
    assert!(vo.children.iter().all(|child| child.parent_id == parent_id));
    assert_eq!(
        related_entity_ids(&conn, parent_id, dictionary_parent_key())
            .unwrap()
            .len(),
        3
    );

    // Drop "Driving licence", keep the rest, add one new item.
    vo.dictionary.description = Some("identity documents".to_string());
    vo.children.remove(1);
    vo.children
        .push(Dictionary::item("ID_TYPE", "Travel permit", "TXZ"));
    let summary = service.update_dict_and_children(&mut vo).unwrap();
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.updated, 2);
    assert_eq!(summary.deleted, 1);
    assert!(vo.children[2].id.is_some());

    let names = item_names(&service, parent_id);
    assert_eq!(names, vec!["ID card", "Passport", "Travel permit"]);
    let reloaded = service.base().get_entity(parent_id).unwrap().unwrap();
    assert_eq!(reloaded.description.as_deref(), Some("identity documents"));

    service.delete_dict_and_children(parent_id).unwrap();
    assert!(service.base().get_entity(parent_id).unwrap().is_none());
    let remaining = service
        .base()
        .get_entity_list(&EntityQuery::new().eq("parent_id", parent_id))
        .unwrap();
    assert!(remaining.is_empty());
}

#[test]
fn update_with_empty_children_removes_all_items() {
    let conn = setup();
    let service = service(&conn);

    let mut vo = id_type_vo();
    let parent_id = service.create_dict_and_children(&mut vo).unwrap();

    vo.children.clear();
    let summary = service.update_dict_and_children(&mut vo).unwrap();
    assert_eq!(summary.deleted, 3);
    assert!(item_names(&service, parent_id).is_empty());
    assert!(service.get_key_value_list("ID_TYPE").unwrap().is_empty());
}

#[test]
fn foreign_child_rolls_back_the_whole_update() {
    let conn = setup();
    let service = service(&conn);

    let mut gender = DictionaryVo::new(
        Dictionary::root("GENDER", "Gender"),
        vec![Dictionary::item("GENDER", "Male", "M")],
    );
    service.create_dict_and_children(&mut gender).unwrap();

    let mut vo = id_type_vo();
    let parent_id = service.create_dict_and_children(&mut vo).unwrap();

    vo.dictionary.item_name = "Renamed".to_string();
    vo.children.clear();
    vo.children.push(gender.children[0].clone());
    let err = service.update_dict_and_children(&mut vo).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let parent = service.base().get_entity(parent_id).unwrap().unwrap();
    assert_eq!(parent.item_name, "ID type");
    assert_eq!(item_names(&service, parent_id).len(), 3);
    assert_eq!(
        service.get_key_value_list("GENDER").unwrap()[0].v,
        "M"
    );
}

#[test]
fn children_follow_the_definition_type() {
    let conn = setup();
    let service = service(&conn);

    let mut vo = DictionaryVo::new(
        Dictionary::root(" GENDER ", "Gender"),
        vec![Dictionary::item("WHATEVER", "Male", "M")],
    );
    let parent_id = service.create_dict_and_children(&mut vo).unwrap();

    let loaded = service.get_dictionary_with_children(parent_id).unwrap().unwrap();
    assert_eq!(loaded.dictionary.dict_type, "GENDER");
    assert_eq!(loaded.children[0].dict_type, "GENDER");
}

#[test]
fn duplicate_type_is_rejected() {
    let conn = setup();
    let service = service(&conn);

    service.create_dict_and_children(&mut id_type_vo()).unwrap();
    let err = service
        .create_dict_and_children(&mut id_type_vo())
        .unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateType(ref t) if t == "ID_TYPE"));

    let mut gender = DictionaryVo::new(Dictionary::root("GENDER", "Gender"), Vec::new());
    service.create_dict_and_children(&mut gender).unwrap();
    gender.dictionary.dict_type = "ID_TYPE".to_string();
    let err = service.update_dict_and_children(&mut gender).unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateType(_)));
}

#[test]
fn write_preconditions_are_checked() {
    let conn = setup();
    let service = service(&conn);

    let mut without_id = id_type_vo();
    let err = service.update_dict_and_children(&mut without_id).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let mut with_id = id_type_vo();
    with_id.dictionary.id = Some(42);
    let err = service.create_dict_and_children(&mut with_id).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = service.delete_dict_and_children(42).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { id: 42, .. }));
}

#[test]
fn generic_relation_entry_points_link_children() {
    let conn = setup();
    let service = service(&conn);
    let base = service.base();

    let mut parent = Dictionary::root("LEVEL", "Level");
    let mut children = vec![
        Dictionary::item("LEVEL", "High", "H").with_sort_id(1),
        Dictionary::item("LEVEL", "Low", "L").with_sort_id(2),
    ];
    let summary = base
        .create_entity_and_related_entities(&mut parent, &mut children, dictionary_parent_key())
        .unwrap();
    assert_eq!(summary.inserted, 2);
    assert_eq!(parent.id, Some(summary.parent_id));
    assert!(children.iter().all(|c| c.parent_id == summary.parent_id));

    let deleted = base
        .delete_entity_and_related_entities(summary.parent_id, dictionary_parent_key())
        .unwrap();
    assert_eq!(deleted.deleted, 3);
    assert!(base
        .get_entity_list_by_ids(&[children[0].id.unwrap(), children[1].id.unwrap()])
        .unwrap()
        .is_empty());
}

#[test]
fn failed_insert_rolls_back_deletes_and_parent_update() {
    let conn = setup();
    let service = service(&conn);
    let base = service.base();

    let mut parent = Dictionary::root("LEVEL", "Level");
    let mut children = vec![
        Dictionary::item("LEVEL", "High", "H"),
        Dictionary::item("LEVEL", "Low", "L"),
    ];
    let summary = base
        .create_entity_and_related_entities(&mut parent, &mut children, dictionary_parent_key())
        .unwrap();
    let parent_id = summary.parent_id;

    // Both current items are dropped from the target; the only new item is invalid.
    parent.item_name = "Renamed".to_string();
    let mut target = vec![Dictionary::item("LEVEL", "  ", "X")];
    let err = base
        .update_entity_and_related_entities(&parent, &mut target, dictionary_parent_key())
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(target[0].id.is_none());

    let reloaded = base.get_entity(parent_id).unwrap().unwrap();
    assert_eq!(reloaded.item_name, "Level");
    assert_eq!(item_names(&service, parent_id), vec!["High", "Low"]);
    assert_eq!(
        related_entity_ids(&conn, parent_id, dictionary_parent_key())
            .unwrap()
            .len(),
        2
    );
}
