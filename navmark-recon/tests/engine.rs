use std::path::{Path, PathBuf};

use navmark_db::Connection;
use navmark_manifest::aggregate::SupplementaryStatus;
use navmark_recon::{
    ReconcileConfig, ReconcileError, check_manifest, reconcile, reset_registry,
};
use rusqlite::params;

fn create_registry(dir: &Path) -> PathBuf {
    let path = dir.join("little_navmap_msfs24.sqlite");
    let conn = Connection::open(&path).unwrap();
    navmark_db::create_schema(&conn).unwrap();
    path
}

fn insert_airport(registry: &Path, ident: &str) {
    let conn = Connection::open(registry).unwrap();
    conn.execute("INSERT INTO airport (ident) VALUES (?1)", params![ident])
        .unwrap();
}

fn write_manifest(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn airport_state(registry: &Path, ident: &str) -> (i64, Option<String>, Option<String>) {
    let conn = Connection::open(registry).unwrap();
    conn.query_row(
        "SELECT is_addon, scenery_local_path, addon_source FROM airport WHERE ident = ?1",
        params![ident],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )
    .unwrap()
}

fn config(manifest: PathBuf, registry: PathBuf) -> ReconcileConfig {
    ReconcileConfig {
        primary_manifest: manifest,
        supplementary_manifest: None,
        registry_path: registry,
    }
}

#[test]
fn round_trip_marks_matching_row() {
    let dir = tempfile::tempdir().unwrap();
    let registry = create_registry(dir.path());
    insert_airport(&registry, "kxyz");
    let manifest = write_manifest(dir.path(), "Addons_ICAO.bin", "C:\\scenery\\kxyz;KXYZ\n");

    let outcome = reconcile(&config(manifest, registry.clone()), None).unwrap();

    assert_eq!(outcome.report.total_records, 1);
    assert_eq!(outcome.report.updated_count, 1);
    assert!(outcome.report.unmatched_idents.is_empty());

    let (is_addon, path, source) = airport_state(&registry, "kxyz");
    assert_eq!(is_addon, 1);
    assert_eq!(path.as_deref(), Some("C:\\scenery\\kxyz"));
    assert_eq!(source.as_deref(), Some(navmark_db::SENTINEL));
}

#[test]
fn unmatched_ident_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let registry = create_registry(dir.path());
    insert_airport(&registry, "KAAA");
    let manifest = write_manifest(dir.path(), "Addons_ICAO.bin", "a;KAAA\nb;ZZZZ\n");

    let outcome = reconcile(&config(manifest, registry), None).unwrap();

    assert_eq!(outcome.report.total_records, 2);
    assert_eq!(outcome.report.updated_count, 1);
    assert_eq!(outcome.report.unmatched_idents, vec!["ZZZZ".to_string()]);
}

#[test]
fn later_record_wins_for_shared_ident() {
    let dir = tempfile::tempdir().unwrap();
    let registry = create_registry(dir.path());
    insert_airport(&registry, "KAAA");
    let manifest = write_manifest(dir.path(), "Addons_ICAO.bin", "primary;KAAA\n");
    let supplementary = write_manifest(dir.path(), "Addons_ICAO_User.bin", "user;KAAA\n");

    let outcome = reconcile(
        &ReconcileConfig {
            primary_manifest: manifest,
            supplementary_manifest: Some(supplementary),
            registry_path: registry.clone(),
        },
        None,
    )
    .unwrap();

    assert!(matches!(
        outcome.supplementary,
        SupplementaryStatus::Loaded { records: 1, .. }
    ));
    // Both records applied in order; the supplementary one lands last
    assert_eq!(outcome.report.updated_count, 2);
    let (_, path, _) = airport_state(&registry, "KAAA");
    assert_eq!(path.as_deref(), Some("user"));
}

#[test]
fn rerun_removes_stale_markings() {
    let dir = tempfile::tempdir().unwrap();
    let registry = create_registry(dir.path());
    insert_airport(&registry, "KAAA");
    insert_airport(&registry, "KBBB");

    let manifest = write_manifest(dir.path(), "Addons_ICAO.bin", "a;KAAA\nb;KBBB\n");
    reconcile(&config(manifest, registry.clone()), None).unwrap();

    // KBBB has been removed from the manifest since the last run
    let manifest = write_manifest(dir.path(), "Addons_ICAO.bin", "a;KAAA\n");
    let outcome = reconcile(&config(manifest, registry.clone()), None).unwrap();

    assert_eq!(outcome.cleared, 2);
    let (is_addon, _, source) = airport_state(&registry, "KAAA");
    assert_eq!(is_addon, 1);
    assert_eq!(source.as_deref(), Some(navmark_db::SENTINEL));
    let (is_addon, path, source) = airport_state(&registry, "KBBB");
    assert_eq!(is_addon, 0);
    assert_eq!(path.as_deref(), Some(""));
    assert_eq!(source, None);
}

#[test]
fn external_addon_rows_survive_runs() {
    let dir = tempfile::tempdir().unwrap();
    let registry = create_registry(dir.path());
    insert_airport(&registry, "KAAA");
    {
        let conn = Connection::open(&registry).unwrap();
        conn.execute(
            "INSERT INTO airport (ident, is_addon, scenery_local_path)
             VALUES ('KEXT', 1, 'external')",
            [],
        )
        .unwrap();
    }

    let manifest = write_manifest(dir.path(), "Addons_ICAO.bin", "a;KAAA\n");
    reconcile(&config(manifest, registry.clone()), None).unwrap();

    let (is_addon, path, _) = airport_state(&registry, "KEXT");
    assert_eq!(is_addon, 1);
    assert_eq!(path.as_deref(), Some("external"));
}

#[test]
fn validation_failure_short_circuits_without_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let registry = dir.path().join("not_a_registry.sqlite");
    {
        let conn = Connection::open(&registry).unwrap();
        conn.execute_batch("CREATE TABLE waypoint (ident TEXT);").unwrap();
    }
    let manifest = write_manifest(dir.path(), "Addons_ICAO.bin", "a;KAAA\n");

    let err = reconcile(&config(manifest, registry.clone()), None).unwrap_err();
    match err {
        ReconcileError::Validation { manifest, registry } => {
            assert!(manifest.valid);
            assert!(!registry.valid);
        }
        other => panic!("expected validation error, got {other}"),
    }

    // The registry was never opened for writing, so no sentinel column appeared
    let conn = Connection::open(&registry).unwrap();
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='airport'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn missing_primary_manifest_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let registry = create_registry(dir.path());
    let manifest = dir.path().join("nope.bin");

    let err = reconcile(&config(manifest, registry), None).unwrap_err();
    assert!(matches!(err, ReconcileError::Validation { .. }));
}

#[test]
fn unusable_rows_only_manifest_is_a_manifest_error() {
    let dir = tempfile::tempdir().unwrap();
    let registry = create_registry(dir.path());
    // Non-empty file, but no row has two fields and a usable ident
    let manifest = write_manifest(dir.path(), "Addons_ICAO.bin", "short\n;\n");

    let err = reconcile(&config(manifest, registry), None).unwrap_err();
    assert!(matches!(err, ReconcileError::Manifest(_)));
}

#[test]
fn reset_registry_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let registry = create_registry(dir.path());
    insert_airport(&registry, "KAAA");
    let manifest = write_manifest(dir.path(), "Addons_ICAO.bin", "a;KAAA\n");
    reconcile(&config(manifest, registry.clone()), None).unwrap();

    assert_eq!(reset_registry(&registry).unwrap(), 1);
    let first = airport_state(&registry, "KAAA");
    assert_eq!(reset_registry(&registry).unwrap(), 0);
    let second = airport_state(&registry, "KAAA");
    assert_eq!(first, second);
}

#[test]
fn unmigrated_registry_is_upgraded_during_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let registry = dir.path().join("legacy.sqlite");
    {
        let conn = Connection::open(&registry).unwrap();
        conn.execute_batch(
            "CREATE TABLE airport (
                airport_id INTEGER PRIMARY KEY,
                ident TEXT NOT NULL,
                is_addon INTEGER NOT NULL DEFAULT 0,
                scenery_local_path TEXT
            );
            INSERT INTO airport (ident) VALUES ('KAAA');",
        )
        .unwrap();
    }
    let manifest = write_manifest(dir.path(), "Addons_ICAO.bin", "a;KAAA\n");

    let outcome = reconcile(&config(manifest, registry.clone()), None).unwrap();

    assert_eq!(outcome.report.updated_count, 1);
    let (is_addon, _, source) = airport_state(&registry, "KAAA");
    assert_eq!(is_addon, 1);
    assert_eq!(source.as_deref(), Some(navmark_db::SENTINEL));
}

#[test]
fn check_manifest_rejects_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), "Addons_ICAO.bin", "");

    let check = check_manifest(&manifest);
    assert!(!check.valid);
    assert!(check.diagnostic.contains("empty"));
}
