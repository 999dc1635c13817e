//! End-to-end flow: settings -> registry -> manager -> file on disk

use configur::{
    ConfigData, Configur, ConfigurSettings, Error, Manager, Section, Value,
};
use configur_test_utils::TestConfigDir;
use pretty_assertions::assert_eq;
use serde_json::json;

fn setup_conf() -> TestConfigDir {
    TestConfigDir::new()
        .with_file(
            "conf/db.ini",
            "; primary database\nhost = localhost\nport = 5432\n\n[replica]\nhost = \"db2\"\nweights[] = 1\nweights[] = 2\n",
        )
        .with_file("conf/app.ini", "name = 'demo'\n")
}

#[test]
fn test_full_flow() {
    let conf = setup_conf();
    let configur = Configur::new(ConfigurSettings::new().with_folder(conf.path("conf"))).unwrap();
    assert_eq!(configur.len(), 2);

    let mut db = configur.resolve("Db").unwrap();
    assert_eq!(db.get_str("host"), Some("localhost"));

    let replica = db.section("replica").unwrap();
    let weights = replica.get("weights").and_then(|e| e.as_array()).unwrap();
    assert_eq!(weights.len(), 2);

    db.set_json("pool", json!({"min": 1, "max": 8, "tags": ["a", "b"]}))
        .unwrap();

    conf.assert_file_eq(
        "conf/db.ini",
        "host = \"localhost\"\r\nport = 5432\r\n[replica]\r\nhost = \"db2\"\r\nweights[] = 1\r\nweights[] = 2\r\n[pool]\r\nmax = 8\r\nmin = 1\r\ntags[] = \"a\"\r\ntags[] = \"b\"",
    );

    let again = configur.resolve("db").unwrap();
    assert_eq!(again.get_all(), db.get_all());
}

#[test]
fn test_overwrite_replaces_file_content() {
    let conf = setup_conf();
    let configur = Configur::new(ConfigurSettings::new().with_folder(conf.path("conf"))).unwrap();
    let mut app = configur.resolve("app").unwrap();

    app.overwrite(
        ConfigData::new()
            .with("name", "replaced")
            .with("server", Section::new().with("port", 8080)),
    )
    .unwrap();

    conf.assert_file_eq("conf/app.ini", "name = \"replaced\"\r\n[server]\r\nport = 8080");
    let fresh = configur.resolve("app").unwrap();
    assert_eq!(fresh.get("name"), Some(&Value::from("replaced")));
}

#[test]
fn test_too_deep_input_is_rejected_without_side_effects() {
    let conf = setup_conf();
    let configur = Configur::new(ConfigurSettings::new().with_folder(conf.path("conf"))).unwrap();
    let mut app = configur.resolve("app").unwrap();
    let before = conf.read("conf/app.ini");

    let err = app
        .overwrite_json(json!({"a": {"b": {"c": {"d": 1}}}}))
        .unwrap_err();
    assert!(matches!(err, Error::DepthExceeded { ref key } if key == "a.b"), "{err}");

    let err = app.overwrite_json(json!(["not", "a", "mapping"])).unwrap_err();
    assert!(matches!(err, Error::NotAMapping));

    assert_eq!(conf.read("conf/app.ini"), before);
    assert_eq!(app.get_str("name"), Some("demo"));
}

#[test]
fn test_top_level_writes_stay_top_level_in_sectioned_files() {
    let conf = setup_conf();
    let configur = Configur::new(ConfigurSettings::new().with_folder(conf.path("conf"))).unwrap();
    let mut db = configur.resolve("db").unwrap();

    db.set("timeout", 30.into()).unwrap();

    let fresh = configur.resolve("db").unwrap();
    assert_eq!(fresh.get_i64("timeout"), Some(30));
    assert!(fresh.section("replica").unwrap().get("timeout").is_none());
}

#[test]
fn test_multiline_text_is_refused_and_file_stays_readable() {
    let conf = setup_conf();
    let configur = Configur::new(ConfigurSettings::new().with_folder(conf.path("conf"))).unwrap();
    let mut app = configur.resolve("app").unwrap();
    let before = conf.read("conf/app.ini");

    let err = app.set("motd", "line1\nline2".into()).unwrap_err();
    assert!(matches!(err, Error::Unwritable { .. }), "{err}");

    assert_eq!(conf.read("conf/app.ini"), before);
    assert_eq!(configur.resolve("app").unwrap().get_str("name"), Some("demo"));
}

#[test]
fn test_missing_key_is_not_an_error() {
    let conf = setup_conf();
    let configur = Configur::new(ConfigurSettings::new().with_folder(conf.path("conf"))).unwrap();
    let app = configur.resolve("app").unwrap();

    assert_eq!(app.get("nope"), None);
    assert!(!app.contains("nope"));
}

#[test]
fn test_malformed_file_reports_line() {
    let conf = TestConfigDir::new().with_file("broken.ini", "a = 1\nb = \"unterminated\n");
    let mut configur = Configur::default();
    configur.add_config_file(conf.path("broken.ini")).unwrap();

    let err = configur.resolve("broken").unwrap_err();
    match err {
        Error::Parse { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other}"),
    }
}
