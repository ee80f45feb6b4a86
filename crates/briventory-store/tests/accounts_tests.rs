#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use briventory_core::ErrorKind;
use briventory_store::models::{BrickLinkTokens, Locker};
use briventory_store::{AccountsRepository, BrickLinkTokensRepository, ContainersRepository};
use chrono::NaiveDate;
use common::{count, count_where, new_account, open_store, stored_account, stored_container_type};

fn message_keys(err: &briventory_core::OrmError) -> Vec<&str> {
    err.validation_errors()
        .iter()
        .map(|e| e.message_key.as_str())
        .collect()
}

#[test]
fn test_new_administrator_writes_marker_with_generated_key() {
    // Given: A new account flagged as administrator
    let (context, handler) = open_store();
    let accounts = handler.repository::<AccountsRepository>().unwrap();
    let mut account = new_account(&accounts, "Alice", "alice@example.org");
    account.set_administrator(true);

    // When: It is persisted
    accounts.persist(&mut account).unwrap();

    // Then: The generated key reaches the marker row
    let id = account.id().expect("key assigned");
    assert_eq!(count_where(&context, "administrator", &format!("id_account = {id}")), 1);
    assert_eq!(count(&context, "locked_account"), 0);

    // And: A reloaded account reports the flag and the password
    let mut reloaded = accounts.find_by_id(id).unwrap().unwrap();
    assert!(reloaded.is_administrator().unwrap());
    assert!(!reloaded.is_locked().unwrap());
    assert!(reloaded.verify_password("s3cret-bricks"));
    assert!(!reloaded.verify_password("wrong"));
}

#[test]
fn test_invalid_account_is_rejected_without_writes() {
    // Given: An account with missing names and a malformed email
    let (context, handler) = open_store();
    let accounts = handler.repository::<AccountsRepository>().unwrap();
    let mut account = accounts.build_instance();
    account.set_email("not-an-email");
    account.set_administrator(true);

    // When: It is persisted
    let err = accounts.persist(&mut account).unwrap_err();

    // Then: Every finding is reported and nothing is written
    assert_eq!(err.kind(), ErrorKind::PersistenceRejected);
    let keys = message_keys(&err);
    assert!(keys.contains(&"account.error.firstname.empty"));
    assert!(keys.contains(&"account.error.lastname.empty"));
    assert!(keys.contains(&"account.error.password.empty"));
    assert!(keys.contains(&"account.error.email.invalid"));
    assert_eq!(count(&context, "account"), 0);
    assert_eq!(count(&context, "administrator"), 0);
    assert!(account.id().is_none());
}

#[test]
fn test_email_is_unique_ignoring_case() {
    // Given: A stored account
    let (_context, handler) = open_store();
    let accounts = handler.repository::<AccountsRepository>().unwrap();
    let mut stored = stored_account(&accounts, "Alice", "alice@example.org", false);

    // When: Another account uses the same email in other case
    let mut other = new_account(&accounts, "Alicia", "ALICE@example.org");
    let err = accounts.persist(&mut other).unwrap_err();

    // Then: It is rejected with the email as argument
    let exists = &err.validation_errors()[0];
    assert_eq!(exists.message_key, "account.error.email.exists");
    assert_eq!(exists.arguments, vec!["ALICE@example.org".to_string()]);

    // And: The stored account may be saved again under its own email
    stored.set_lastname("Smith");
    accounts.persist(&mut stored).unwrap();
    assert!(accounts.email_exists("Alice@Example.org").unwrap());
    let found = accounts.find_by_email("ALICE@EXAMPLE.ORG").unwrap().unwrap();
    assert_eq!(found.lastname(), "Smith");
}

#[test]
fn test_last_active_administrator_cannot_be_deleted() {
    // Given: One administrator and one regular account
    let (context, handler) = open_store();
    let accounts = handler.repository::<AccountsRepository>().unwrap();
    let admin = stored_account(&accounts, "Alice", "alice@example.org", true);
    let user = stored_account(&accounts, "Bob", "bob@example.org", false);

    // When: The administrator is deleted
    let err = accounts.delete(&admin).unwrap_err();

    // Then: Deletion is refused and the account remains
    assert_eq!(err.code(), "ERR_DELETION_REJECTED");
    assert_eq!(message_keys(&err), vec!["account.error.delete.last_administrator"]);
    assert_eq!(count(&context, "account"), 2);

    // And: A regular account is deleted freely
    accounts.delete(&user).unwrap();
    assert_eq!(count(&context, "account"), 1);
}

#[test]
fn test_administrator_deleted_when_another_remains() {
    // Given: Two administrators
    let (context, handler) = open_store();
    let accounts = handler.repository::<AccountsRepository>().unwrap();
    let first = stored_account(&accounts, "Alice", "alice@example.org", true);
    let _second = stored_account(&accounts, "Carol", "carol@example.org", true);

    // When: One of them is deleted
    accounts.delete(&first).unwrap();

    // Then: Its marker row goes with it
    assert_eq!(count(&context, "account"), 1);
    assert_eq!(count(&context, "administrator"), 1);
    assert!(accounts.has_active_administrator().unwrap());
}

#[test]
fn test_locking_last_administrator_is_rejected() {
    // Given: A single administrator
    let (context, handler) = open_store();
    let accounts = handler.repository::<AccountsRepository>().unwrap();
    let admin = stored_account(&accounts, "Alice", "alice@example.org", true);
    let mut reloaded = accounts.find_by_id(admin.id().unwrap()).unwrap().unwrap();

    // When: It is locked
    reloaded.set_locked(true);
    let err = accounts.persist(&mut reloaded).unwrap_err();

    // Then: The lock is refused
    assert_eq!(message_keys(&err), vec!["account.error.lock.last_administrator"]);
    assert_eq!(count(&context, "locked_account"), 0);
}

#[test]
fn test_locked_flag_round_trips_through_marker_table() {
    // Given: A regular account
    let (context, handler) = open_store();
    let accounts = handler.repository::<AccountsRepository>().unwrap();
    let stored = stored_account(&accounts, "Bob", "bob@example.org", false);
    let id = stored.id().unwrap();

    // When: It is locked and then unlocked
    let mut account = accounts.find_by_id(id).unwrap().unwrap();
    account.set_locked(true);
    accounts.persist(&mut account).unwrap();
    assert_eq!(accounts.locked_accounts().unwrap().len(), 1);

    let mut account = accounts.find_by_id(id).unwrap().unwrap();
    assert!(account.is_locked().unwrap());
    account.set_locked(false);
    accounts.persist(&mut account).unwrap();

    // Then: The marker row is gone again
    assert_eq!(count(&context, "locked_account"), 0);
}

#[test]
fn test_flags_toggled_twice_on_same_instance_are_written_both_times() {
    // Given: A regular account read back next to an administrator
    let (context, handler) = open_store();
    let accounts = handler.repository::<AccountsRepository>().unwrap();
    let _admin = stored_account(&accounts, "Alice", "alice@example.org", true);
    let bob = stored_account(&accounts, "Bob", "bob@example.org", false);
    let mut account = accounts.find_by_id(bob.id().unwrap()).unwrap().unwrap();
    assert!(!account.is_administrator().unwrap());
    assert!(!account.is_locked().unwrap());

    // When: It is promoted and demoted without reloading
    account.set_administrator(true);
    accounts.persist(&mut account).unwrap();
    assert_eq!(count(&context, "administrator"), 2);
    account.set_administrator(false);
    accounts.persist(&mut account).unwrap();

    // Then: The demotion reached the store
    assert_eq!(count(&context, "administrator"), 1);

    // When: It is locked and unlocked the same way
    account.set_locked(true);
    accounts.persist(&mut account).unwrap();
    assert_eq!(count(&context, "locked_account"), 1);
    account.set_locked(false);
    accounts.persist(&mut account).unwrap();

    // Then: The marker row is gone
    assert_eq!(count(&context, "locked_account"), 0);
}

#[test]
fn test_deleting_account_removes_its_private_containers() {
    // Given: An account owning a container with lockers, and a shared container
    let (context, handler) = open_store();
    let accounts = handler.repository::<AccountsRepository>().unwrap();
    let containers = handler.repository::<ContainersRepository>().unwrap();
    let _admin = stored_account(&accounts, "Alice", "alice@example.org", true);
    let owner = stored_account(&accounts, "Bob", "bob@example.org", false);
    let drawer = stored_container_type(&handler, "Drawer", 0, 4);
    let mut private = containers.new_private(drawer.id.unwrap(), owner.id().unwrap());
    private.set_lockers(vec![Locker::new(1), Locker::new(2)]);
    containers.persist(&mut private).unwrap();
    let mut shared = containers.new_shared(drawer.id.unwrap());
    containers.persist(&mut shared).unwrap();

    // When: The owner is deleted
    accounts.delete(&owner).unwrap();

    // Then: Its container and lockers are gone, the shared one stays
    assert_eq!(count(&context, "account"), 1);
    assert_eq!(count(&context, "private_container"), 0);
    assert_eq!(count(&context, "locker"), 0);
    assert_eq!(count(&context, "container"), 1);
    assert_eq!(count(&context, "shared_container"), 1);
}

#[test]
fn test_delete_all_reports_refused_position() {
    // Given: A regular account followed by the only administrator
    let (context, handler) = open_store();
    let accounts = handler.repository::<AccountsRepository>().unwrap();
    let batch = vec![
        stored_account(&accounts, "Bob", "bob@example.org", false),
        stored_account(&accounts, "Alice", "alice@example.org", true),
    ];

    // When: Both are deleted in one batch
    let err = accounts.delete_all(&batch).unwrap_err();

    // Then: The administrator's position is reported and nothing is removed
    match err {
        briventory_core::OrmError::Deletion { position, .. } => assert_eq!(position, Some(1)),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(count(&context, "account"), 2);
}

#[test]
fn test_bricklink_tokens_follow_the_account() {
    // Given: A new account carrying BrickLink tokens
    let (context, handler) = open_store();
    let accounts = handler.repository::<AccountsRepository>().unwrap();
    let tokens_repository = handler.repository::<BrickLinkTokensRepository>().unwrap();
    let mut account = new_account(&accounts, "Alice", "alice@example.org");
    let valid_until = NaiveDate::from_ymd_opt(2027, 3, 31).unwrap();
    account.set_bricklink_tokens(Some(
        BrickLinkTokens::new("ck", "cs", "tv", "ts").valid_until(valid_until),
    ));

    // When: The account is persisted
    accounts.persist(&mut account).unwrap();

    // Then: The tokens are stored under the account's key
    let id = account.id().unwrap();
    let stored = tokens_repository.find_for_account(id).unwrap().unwrap();
    assert_eq!(stored.id_account, Some(id));
    assert_eq!(stored.consumer_secret.expose(), "cs");
    assert_eq!(stored.valid_until, Some(valid_until));

    // When: The tokens are removed from the reloaded account
    let mut reloaded = accounts.find_by_id(id).unwrap().unwrap();
    assert_eq!(reloaded.bricklink_tokens().unwrap().map(|t| t.token_value.as_str()), Some("tv"));
    reloaded.set_bricklink_tokens(None);
    accounts.persist(&mut reloaded).unwrap();

    // Then: They are deleted
    assert_eq!(count(&context, "bricklink_tokens"), 0);
}

#[test]
fn test_accounts_repository_resolves_its_dependencies_once() {
    // Given: A fresh handler
    let (_context, handler) = open_store();
    assert!(handler.is_empty());

    // When: The accounts repository is requested twice
    let first = handler.repository::<AccountsRepository>().unwrap();
    let second = handler.repository::<AccountsRepository>().unwrap();

    // Then: One instance exists, next to the repositories it depends on
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(handler.len(), 3);
}
