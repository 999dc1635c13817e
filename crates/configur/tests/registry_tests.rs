//! Registration and resolution against config folders on disk

use configur::{
    ConfigManager, Configur, ConfigurSettings, CustomManager, Error, Manager, ManagerCatalog,
    WritePolicy,
};
use configur_test_utils::TestConfigDir;
use configur_test_utils::fixtures::{APP_INI, DB_INI};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

struct DbManager(ConfigManager);

impl DbManager {
    fn dsn(&self) -> String {
        format!(
            "{}:{}",
            self.get_str("host").unwrap_or("localhost"),
            self.get_i64("port").unwrap_or(5432)
        )
    }
}

impl Manager for DbManager {
    fn base(&self) -> &ConfigManager {
        &self.0
    }

    fn base_mut(&mut self) -> &mut ConfigManager {
        &mut self.0
    }

    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }
}

impl CustomManager for DbManager {
    const TYPE_NAME: &'static str = "DbManager";

    fn from_base(base: ConfigManager) -> Self {
        Self(base)
    }
}

struct TestManager(ConfigManager);

impl Manager for TestManager {
    fn base(&self) -> &ConfigManager {
        &self.0
    }

    fn base_mut(&mut self) -> &mut ConfigManager {
        &mut self.0
    }

    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }
}

impl CustomManager for TestManager {
    const TYPE_NAME: &'static str = "TestConfigurManager";

    fn from_base(base: ConfigManager) -> Self {
        Self(base)
    }
}

#[fixture]
fn conf() -> TestConfigDir {
    TestConfigDir::new()
        .with_file("conf/db.ini", DB_INI)
        .with_file("conf/app.ini", APP_INI)
        .with_file("conf/routes.php", "<?php return [];")
        .with_file("conf/README.md", "# not a config")
}

#[rstest]
fn folder_registration_resolves_case_insensitively(conf: TestConfigDir) {
    let settings = ConfigurSettings::new().with_folder(conf.path("conf"));
    let configur = Configur::new(settings).unwrap();

    assert_eq!(configur.ids().collect::<Vec<_>>(), vec!["app", "db", "routes"]);

    let db = configur.resolve("DB").unwrap();
    assert_eq!(db.type_name(), "ConfigManager");
    assert_eq!(db.get_str("host"), Some("localhost"));
    assert_eq!(db.get_i64("port"), Some(5432));
    assert_eq!(db.get_bool("debug"), Some(false));
}

#[rstest]
fn custom_manager_is_selected_by_file_stem(conf: TestConfigDir) {
    let mut configur = Configur::new(ConfigurSettings::new().with_folder(conf.path("conf"))).unwrap();
    assert!(configur.add_custom_manager::<DbManager>());
    assert!(!configur.add_custom_manager::<DbManager>());

    let db = configur.resolve("db").unwrap();
    assert!(db.is::<DbManager>());
    assert_eq!(db.downcast_ref::<DbManager>().unwrap().dsn(), "localhost:5432");

    let app = configur.resolve("app").unwrap();
    assert!(app.is::<ConfigManager>());
}

#[rstest]
fn custom_managers_by_name_need_a_catalog_entry(conf: TestConfigDir) {
    conf.write_file("conf/test.ini", "suite = \"integration\"");

    let settings = ConfigurSettings::new()
        .with_folder(conf.path("conf"))
        .with_custom_manager("TestConfigurManager");
    let catalog = ManagerCatalog::new().with::<TestManager>().with::<DbManager>();
    let configur = Configur::with_catalog(settings.clone(), catalog).unwrap();

    let test = configur.resolve("test").unwrap();
    assert_eq!(test.type_name(), "TestConfigurManager");
    assert_eq!(test.get_str("suite"), Some("integration"));
    // Only managers named in the settings are active
    assert!(configur.resolve("db").unwrap().is::<ConfigManager>());

    let err = Configur::new(settings).unwrap_err();
    assert!(matches!(err, Error::ManagerNotFound { ref name } if name == "TestConfigurManager"));
}

#[test]
fn default_manager_cannot_be_registered_as_custom() {
    let settings = ConfigurSettings::new().with_custom_manager("ConfigManager");
    let err = Configur::new(settings).unwrap_err();
    assert!(matches!(err, Error::ManagerNotSupported { .. }));
}

#[rstest]
fn missing_inputs_fail_construction(conf: TestConfigDir) {
    let err = Configur::new(ConfigurSettings::new().with_file(conf.path("conf/nope.ini"))).unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));

    let err = Configur::new(ConfigurSettings::new().with_folder(conf.path("missing"))).unwrap_err();
    assert!(matches!(err, Error::FolderNotFound { .. }));

    let err =
        Configur::new(ConfigurSettings::new().with_file(conf.path("conf/README.md"))).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { ref extension } if extension == "md"));
}

#[rstest]
fn explicit_files_win_over_folder_duplicates(conf: TestConfigDir) {
    let primary = conf.write_file("primary/DB.ini", "host = \"primary\"");
    let settings = ConfigurSettings::new()
        .with_file(&primary)
        .with_folder(conf.path("conf"));
    let configur = Configur::new(settings).unwrap();

    let descriptor = configur.descriptor("db").unwrap();
    assert_eq!(descriptor.stem(), "DB");
    assert_eq!(configur.resolve("db").unwrap().get_str("host"), Some("primary"));
}

#[rstest]
fn php_files_register_but_do_not_resolve(conf: TestConfigDir) {
    let configur = Configur::new(ConfigurSettings::new().with_folder(conf.path("conf"))).unwrap();

    assert!(configur.contains("routes"));
    let err = configur.resolve("routes").unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { ref extension } if extension == "php"));
}

#[rstest]
fn writes_through_resolve_are_seen_by_the_next_resolve(conf: TestConfigDir) {
    let configur = Configur::new(ConfigurSettings::new().with_folder(conf.path("conf"))).unwrap();

    let mut db = configur.resolve("db").unwrap();
    db.set("port", 6543.into()).unwrap();
    db.set("user", "admin".into()).unwrap();

    let fresh = configur.resolve("db").unwrap();
    assert_eq!(fresh.get_i64("port"), Some(6543));
    assert_eq!(fresh.get_str("user"), Some("admin"));
    conf.assert_file_eq(
        "conf/db.ini",
        "host = \"localhost\"\r\nport = 6543\r\ndebug = false\r\nuser = \"admin\"",
    );
}

#[rstest]
fn settings_file_drives_construction(conf: TestConfigDir) {
    let settings_path = conf.write_file(
        "configur.json",
        &format!(
            r#"{{"configFolders": [{:?}], "writePolicy": "deferred"}}"#,
            conf.path("conf").display().to_string()
        ),
    );

    let settings = ConfigurSettings::from_json_file(&settings_path).unwrap();
    let configur = Configur::new(settings).unwrap();
    assert_eq!(configur.write_policy(), WritePolicy::Deferred);

    let mut app = configur.resolve("app").unwrap();
    app.set("name", "renamed".into()).unwrap();
    conf.assert_file_contains("conf/app.ini", "name = \"demo\"");
    app.flush().unwrap();
    conf.assert_file_contains("conf/app.ini", "name = \"renamed\"");
}
