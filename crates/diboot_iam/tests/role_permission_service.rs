use diboot_core::db::open_db_in_memory;
use diboot_core::{EntityQuery, RepoError, ServiceError};
use diboot_iam::{
    IamRolePermission, IamRolePermissionService, IamRolePermissionVo, RolePermissionRepository,
    SqliteRolePermissionRepository,
};
use rusqlite::Connection;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn service(conn: &Connection) -> IamRolePermissionService<SqliteRolePermissionRepository<'_>> {
    IamRolePermissionService::new(SqliteRolePermissionRepository::try_new(conn).unwrap())
}

#[test]
fn create_grants_distinct_permissions() {
    let conn = setup();
    let service = service(&conn);

    assert_eq!(service.create_role_permission_relations(1, &[12, 10, 12]).unwrap(), 2);
    assert_eq!(service.get_permission_ids(1).unwrap(), vec![10, 12]);

    // Re-granting is a no-op.
    assert_eq!(service.create_role_permission_relations(1, &[10]).unwrap(), 0);
    assert!(service.get_permission_ids(2).unwrap().is_empty());
}

#[test]
fn update_reconciles_grants_exactly() {
    let conn = setup();
    let service = service(&conn);
    service.create_role_permission_relations(1, &[10, 11, 12]).unwrap();
    service.create_role_permission_relations(2, &[11]).unwrap();

    let summary = service
        .update_role_permission_relations(1, &[11, 12, 13])
        .unwrap();
    assert_eq!(summary.parent_id, 1);
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.deleted, 1);
    assert_eq!(service.get_permission_ids(1).unwrap(), vec![11, 12, 13]);
    assert_eq!(service.get_permission_ids(2).unwrap(), vec![11]);

    let cleared = service.update_role_permission_relations(1, &[]).unwrap();
    assert_eq!(cleared.deleted, 3);
    assert!(service.get_permission_ids(1).unwrap().is_empty());
}

#[test]
fn invalid_ids_are_rejected_before_any_write() {
    let conn = setup();
    let service = service(&conn);

    let err = service
        .create_role_permission_relations(1, &[10, 0])
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    let err = service.update_role_permission_relations(-1, &[10]).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(service.get_permission_ids(1).unwrap().is_empty());
}

#[test]
fn delete_revokes_every_grant_of_the_role() {
    let conn = setup();
    let service = service(&conn);
    service.create_role_permission_relations(3, &[1, 2]).unwrap();
    service.create_role_permission_relations(4, &[1]).unwrap();

    assert_eq!(service.delete_role_permission_relations(3).unwrap(), 2);
    assert!(service.get_permission_ids(3).unwrap().is_empty());
    assert_eq!(service.get_permission_ids(4).unwrap(), vec![1]);
    assert_eq!(service.delete_role_permission_relations(3).unwrap(), 0);
}

#[test]
fn base_crud_works_on_grant_rows() {
    let conn = setup();
    let service = service(&conn);
    let base = service.base();

    let mut grant = IamRolePermission::new(5, 50);
    let id = base.create_entity(&mut grant).unwrap();
    let loaded = base.get_entity(id).unwrap().unwrap();
    assert!(!loaded.is_deleted);
    assert!(loaded.create_time.is_some());

    let mut vo = IamRolePermissionVo::from(loaded);
    vo.permission_id = 51;
    base.update_entity(&vo.clone().into()).unwrap();
    assert_eq!(service.get_permission_ids(5).unwrap(), vec![51]);

    assert!(base.exists("role_id", 5_i64).unwrap());
    assert_eq!(
        base.get_entity_list_count(&EntityQuery::new().eq("permission_id", 51_i64))
            .unwrap(),
        1
    );

    let err = base.create_entity(&mut IamRolePermission::new(5, 0)).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn repository_diff_validates_grants_and_rolls_back() {
    let conn = setup();
    let repo = SqliteRolePermissionRepository::try_new(&conn).unwrap();
    repo.apply_permission_diff(3, &[30, 31], &[]).unwrap();

    let err = repo.apply_permission_diff(3, &[32, -1], &[30]).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.list_permission_ids(3).unwrap(), vec![30, 31]);

    let summary = repo.apply_permission_diff(3, &[32], &[30, 30, 99]).unwrap();
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.deleted, 1);
    assert_eq!(repo.list_permission_ids(3).unwrap(), vec![31, 32]);

    let err = repo.apply_permission_diff(0, &[40], &[]).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}
