use noteshare_core::db::open_db_in_memory;
use noteshare_core::{
    AccessLevel, ErrorKind, IdentityDirectory, NoteId, NoteRepository, NoteService,
    NoteServiceError, SqliteIdentityDirectory, SqliteNoteRepository, UserId,
};
use rusqlite::Connection;

fn service_over(
    conn: &Connection,
) -> NoteService<SqliteNoteRepository<'_>, SqliteIdentityDirectory<'_>> {
    NoteService::new(
        SqliteNoteRepository::new(conn),
        SqliteIdentityDirectory::new(conn),
    )
}

fn register(conn: &Connection, username: &str) -> UserId {
    SqliteIdentityDirectory::new(conn)
        .register_identity(username)
        .unwrap()
}

fn shared_with(conn: &Connection, note_id: NoteId) -> Vec<UserId> {
    SqliteNoteRepository::new(conn)
        .get_note(note_id)
        .unwrap()
        .unwrap()
        .shared_with
        .into_iter()
        .collect()
}

#[test]
fn share_grants_read_access_to_the_target() {
    let conn = open_db_in_memory().unwrap();
    let service = service_over(&conn);
    let owner = register(&conn, "owner");
    let reader = register(&conn, "reader");
    let note_id = service.create_note(owner, "plan", "current body").unwrap();

    service
        .share_note(owner, note_id, &["reader".to_string()])
        .unwrap();

    let view = service.get_note(reader, note_id).unwrap();
    assert_eq!(view.content, "current body");
    assert_eq!(shared_with(&conn, note_id), vec![reader]);
}

#[test]
fn sharing_the_same_user_twice_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let service = service_over(&conn);
    let owner = register(&conn, "owner");
    let reader = register(&conn, "reader");
    let note_id = service.create_note(owner, "plan", "body").unwrap();

    service
        .share_note(owner, note_id, &["reader".to_string()])
        .unwrap();
    let err = service
        .share_note(owner, note_id, &["reader".to_string()])
        .unwrap_err();

    assert!(matches!(err, NoteServiceError::AlreadyShared(ref name) if name == "reader"));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(shared_with(&conn, note_id), vec![reader]);
}

#[test]
fn duplicate_username_within_one_call_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let service = service_over(&conn);
    let owner = register(&conn, "owner");
    let reader = register(&conn, "reader");
    let note_id = service.create_note(owner, "plan", "body").unwrap();

    let err = service
        .share_note(
            owner,
            note_id,
            &["reader".to_string(), "reader".to_string()],
        )
        .unwrap_err();

    assert!(matches!(err, NoteServiceError::AlreadyShared(_)));
    // The first grant stays applied.
    assert_eq!(shared_with(&conn, note_id), vec![reader]);
}

#[test]
fn sharing_with_the_owner_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service_over(&conn);
    let owner = register(&conn, "owner");
    let note_id = service.create_note(owner, "plan", "body").unwrap();

    let err = service
        .share_note(owner, note_id, &["owner".to_string()])
        .unwrap_err();

    assert!(matches!(err, NoteServiceError::SelfShare(ref name) if name == "owner"));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(shared_with(&conn, note_id).is_empty());
}

#[test]
fn sharing_with_an_unknown_username_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service_over(&conn);
    let owner = register(&conn, "owner");
    let note_id = service.create_note(owner, "plan", "body").unwrap();

    let err = service
        .share_note(owner, note_id, &["ghost".to_string()])
        .unwrap_err();

    assert!(matches!(err, NoteServiceError::UnknownUser(ref name) if name == "ghost"));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn rejected_entry_keeps_grants_applied_earlier_in_the_call() {
    let conn = open_db_in_memory().unwrap();
    let service = service_over(&conn);
    let owner = register(&conn, "owner");
    let reader = register(&conn, "reader");
    let note_id = service.create_note(owner, "plan", "body").unwrap();

    let err = service
        .share_note(owner, note_id, &["reader".to_string(), "owner".to_string()])
        .unwrap_err();

    assert!(matches!(err, NoteServiceError::SelfShare(_)));
    // No rollback: the grant before the rejected entry survives.
    assert_eq!(shared_with(&conn, note_id), vec![reader]);
    assert_eq!(service.get_note(reader, note_id).unwrap().content, "body");
}

#[test]
fn entries_after_the_rejected_one_are_never_applied() {
    let conn = open_db_in_memory().unwrap();
    let service = service_over(&conn);
    let owner = register(&conn, "owner");
    register(&conn, "late");
    let note_id = service.create_note(owner, "plan", "body").unwrap();

    let err = service
        .share_note(owner, note_id, &["ghost".to_string(), "late".to_string()])
        .unwrap_err();

    assert!(matches!(err, NoteServiceError::UnknownUser(_)));
    assert!(shared_with(&conn, note_id).is_empty());
}

#[test]
fn empty_username_list_is_a_successful_no_op() {
    let conn = open_db_in_memory().unwrap();
    let service = service_over(&conn);
    let owner = register(&conn, "owner");
    let note_id = service.create_note(owner, "plan", "body").unwrap();

    service.share_note(owner, note_id, &[]).unwrap();

    assert!(shared_with(&conn, note_id).is_empty());
}

#[test]
fn shared_user_can_edit_but_not_extend_the_share_set() {
    let conn = open_db_in_memory().unwrap();
    let service = service_over(&conn);
    let owner = register(&conn, "owner");
    let editor = register(&conn, "editor");
    register(&conn, "third");
    let note_id = service.create_note(owner, "plan", "v1").unwrap();
    service
        .share_note(owner, note_id, &["editor".to_string()])
        .unwrap();

    service.update_note(editor, note_id, "v2").unwrap();
    assert_eq!(service.get_note(owner, note_id).unwrap().content, "v2");

    let err = service
        .share_note(editor, note_id, &["third".to_string()])
        .unwrap_err();
    assert!(matches!(
        err,
        NoteServiceError::Forbidden(AccessLevel::Share)
    ));
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[test]
fn sharing_with_multiple_users_applies_all_grants() {
    let conn = open_db_in_memory().unwrap();
    let service = service_over(&conn);
    let owner = register(&conn, "owner");
    let ana = register(&conn, "ana");
    let bart = register(&conn, "bart");
    let note_id = service.create_note(owner, "plan", "body").unwrap();

    service
        .share_note(owner, note_id, &["ana".to_string(), "bart".to_string()])
        .unwrap();

    let mut expected = vec![ana, bart];
    expected.sort();
    assert_eq!(shared_with(&conn, note_id), expected);
}
