//! Copying a live database out and back into place

use std::fs;

use bobdb::{copy_from, copy_to, Locator, Session};

#[test]
fn test_round_trip_is_byte_identical() {
    let root = tempfile::tempdir().unwrap();
    let locator = Locator::new(root.path().join("install"));
    let location = locator.resolve_with("faces", None);
    fs::create_dir_all(location.parent().unwrap()).unwrap();

    let mut session = Session::open_location(&location, false).unwrap();
    session
        .unit_of_work(|tx| {
            tx.execute("CREATE TABLE client (id INTEGER PRIMARY KEY, name TEXT)", [])?;
            for name in ["alice", "bob", "carol"] {
                tx.execute("INSERT INTO client (name) VALUES (?1)", [name])?;
            }
            Ok(())
        })
        .unwrap();
    session.close().unwrap();
    let original = fs::read(location.path()).unwrap();

    let backup = root.path().join("backup");
    let report = copy_to(&location, "faces", &backup, false).unwrap();
    assert_eq!(report.to, backup.join("faces.sql3"));

    // move the live database somewhere new and restore it from the backup
    let relocated = locator.resolve_with("faces", root.path().join("moved").to_str());
    let report = copy_from(&relocated, "faces", &backup, true).unwrap();
    assert_eq!(report.to, relocated.path());
    assert_eq!(fs::read(relocated.path()).unwrap(), original);

    let session = Session::open_location(&relocated, false).unwrap();
    let count: i64 = session
        .connection()
        .query_row("SELECT COUNT(*) FROM client", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 3);
}

#[test]
fn test_copy_to_is_repeatable() {
    let root = tempfile::tempdir().unwrap();
    let locator = Locator::new(root.path());
    let location = locator.resolve_with("faces", None);
    fs::create_dir_all(location.parent().unwrap()).unwrap();
    fs::write(location.path(), b"first").unwrap();

    let backup = root.path().join("backup");
    copy_to(&location, "faces", &backup, false).unwrap();
    fs::write(location.path(), b"second version").unwrap();
    copy_to(&location, "faces", &backup, false).unwrap();

    assert_eq!(
        fs::read(backup.join("faces.sql3")).unwrap(),
        b"second version"
    );
}
