//! Config load + validation integration tests.

use assert_fs::prelude::*;
use lcrpd_core::{
    load_config, validate, ConfigError, RawConfig, KEY_CHANGELOG_USER, KEY_FSNAME, KEY_LCRP_DIR,
};
use predicates::prelude::*;
use rstest::rstest;

fn raw(fsname: Option<&str>, lcrp_dir: Option<&str>, changelog_user: Option<&str>) -> RawConfig {
    RawConfig {
        fsname: fsname.map(str::to_owned),
        lcrp_dir: lcrp_dir.map(str::to_owned),
        changelog_user: changelog_user.map(str::to_owned),
    }
}

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

#[test]
fn load_reads_all_three_keys() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("lcrpd.conf");
    file.write_str("fsname: lustre1\nlcrp_dir: /var/lcrp/lustre1\nchangelog_user: cl1\n")
        .expect("write");

    let config = load_config(file.path()).expect("load");
    assert_eq!(
        config,
        raw(Some("lustre1"), Some("/var/lcrp/lustre1"), Some("cl1"))
    );
}

#[test]
fn load_missing_file_returns_io_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let path = dir.path().join("absent.conf");

    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "got: {err}");
    assert!(err.to_string().contains("absent.conf"));
}

#[rstest]
#[case::broken_syntax(b": : corrupt : yaml : !!!\n  - broken: [unclosed".as_slice())]
#[case::list_not_mapping(b"- fsname\n- lcrp_dir\n".as_slice())]
#[case::nested_value(b"fsname:\n  nested: true\n".as_slice())]
fn load_malformed_yaml_returns_parse_error_with_path(#[case] contents: &[u8]) {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("lcrpd.conf");
    file.write_binary(contents).expect("write");

    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(
        predicate::str::contains("lcrpd.conf").eval(&err.to_string()),
        "must contain file path, got: {err}"
    );
}

// ---------------------------------------------------------------------------
// 2. Validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_complete_config() {
    let lcrp_dir = assert_fs::TempDir::new().expect("tempdir");
    let dir = lcrp_dir.path().to_str().expect("utf8 path");
    let config = raw(Some("lustre1"), Some(dir), Some("cl1"));

    let params = validate(&config, "/etc/lcrpd.conf".as_ref()).expect("validate");
    assert_eq!(params.fsname(), "lustre1");
    assert_eq!(params.lcrp_dir(), lcrp_dir.path());
    assert_eq!(params.changelog_user(), "cl1");
}

#[rstest]
#[case::no_fsname(raw(None, Some("/tmp"), Some("cl1")), vec![KEY_FSNAME])]
#[case::no_lcrp_dir(raw(Some("lustre1"), None, Some("cl1")), vec![KEY_LCRP_DIR])]
#[case::no_changelog_user(raw(Some("lustre1"), Some("/tmp"), None), vec![KEY_CHANGELOG_USER])]
#[case::blank_fsname(raw(Some(" "), Some("/tmp"), Some("cl1")), vec![KEY_FSNAME])]
#[case::two_missing(raw(None, Some("/tmp"), None), vec![KEY_FSNAME, KEY_CHANGELOG_USER])]
#[case::all_missing(RawConfig::default(), vec![KEY_FSNAME, KEY_LCRP_DIR, KEY_CHANGELOG_USER])]
fn validate_reports_missing_keys_in_check_order(
    #[case] config: RawConfig,
    #[case] expected: Vec<&'static str>,
) {
    let err = validate(&config, "/etc/lcrpd.conf".as_ref()).unwrap_err();
    match &err {
        ConfigError::MissingKeys { keys, path } => {
            assert_eq!(keys, &expected);
            assert_eq!(path.to_str(), Some("/etc/lcrpd.conf"));
        }
        other => panic!("expected MissingKeys, got: {other}"),
    }
    let msg = err.to_string();
    assert!(msg.contains(expected[0]), "first missing key must be named: {msg}");
    assert!(msg.contains("/etc/lcrpd.conf"), "config path must be named: {msg}");
}

#[test]
fn validate_skips_directory_check_when_a_key_is_missing() {
    let config = raw(Some("lustre1"), Some("/definitely/not/here"), None);
    let err = validate(&config, "c.yaml".as_ref()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingKeys { .. }), "got: {err}");
}

#[test]
fn validate_rejects_nonexistent_directory() {
    let base = assert_fs::TempDir::new().expect("tempdir");
    let missing = base.path().join("lustre1");
    let config = raw(Some("lustre1"), missing.to_str(), Some("cl1"));

    let err = validate(&config, "/etc/lcrpd.conf".as_ref()).unwrap_err();
    match &err {
        ConfigError::NotADirectory { dir, key, .. } => {
            assert_eq!(dir, &missing);
            assert_eq!(*key, KEY_LCRP_DIR);
        }
        other => panic!("expected NotADirectory, got: {other}"),
    }
    assert!(err.to_string().contains("lcrp_dir"));
}

#[test]
fn validate_rejects_regular_file_as_directory() {
    let base = assert_fs::TempDir::new().expect("tempdir");
    let file = base.child("not_a_dir");
    file.touch().expect("touch");
    let config = raw(Some("lustre1"), file.path().to_str(), Some("cl1"));

    let err = validate(&config, "/etc/lcrpd.conf".as_ref()).unwrap_err();
    assert!(matches!(err, ConfigError::NotADirectory { .. }), "got: {err}");
}

#[test]
fn validated_parameters_serialize_for_reporting() {
    let lcrp_dir = assert_fs::TempDir::new().expect("tempdir");
    let config = raw(Some("lustre1"), lcrp_dir.path().to_str(), Some("cl1"));
    let params = validate(&config, "c.yaml".as_ref()).expect("validate");

    let json = serde_json::to_value(&params).expect("serialize");
    assert_eq!(json["fsname"], "lustre1");
    assert_eq!(json["changelog_user"], "cl1");
}
