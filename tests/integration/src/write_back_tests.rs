//! Locked write-back seen through resolved managers

use std::fs::OpenOptions;
use std::thread;
use std::time::{Duration, Instant};

use configur::{Configur, ConfigurSettings, Manager, WritePolicy};
use configur_fs::LockConfig;
use configur_test_utils::TestConfigDir;
use fs2::FileExt;
use pretty_assertions::assert_eq;

#[test]
fn managers_on_different_files_write_independently() {
    let conf = TestConfigDir::new();
    for idx in 0..4 {
        conf.write_file(&format!("conf/worker{idx}.ini"), "count = 0");
    }
    let configur = Configur::new(ConfigurSettings::new().with_folder(conf.path("conf"))).unwrap();

    thread::scope(|scope| {
        for idx in 0..4 {
            let configur = &configur;
            scope.spawn(move || {
                let mut manager = configur.resolve(&format!("worker{idx}")).unwrap();
                for count in 1..=20 {
                    manager.set("count", count.into()).unwrap();
                }
            });
        }
    });

    for idx in 0..4 {
        conf.assert_file_eq(&format!("conf/worker{idx}.ini"), "count = 20");
    }
}

#[test]
fn concurrent_writers_on_one_file_never_interleave() {
    let conf = TestConfigDir::new().with_file("shared.ini", "owner = \"none\"");
    let mut configur = Configur::default();
    configur.add_config_file(conf.path("shared.ini")).unwrap();

    thread::scope(|scope| {
        for idx in 0..6 {
            let configur = &configur;
            scope.spawn(move || {
                let mut manager = configur.resolve("shared").unwrap();
                manager.set("owner", format!("writer-{idx}").into()).unwrap();
            });
        }
    });

    let content = conf.read("shared.ini");
    assert!(
        (0..6).any(|idx| content == format!("owner = \"writer-{idx}\"")),
        "torn write: {content:?}"
    );
}

#[test]
fn held_lock_surfaces_timeout_from_manager() {
    let conf = TestConfigDir::new().with_file("locked.ini", "a = 1");
    let mut configur = Configur::default().with_lock_config(LockConfig {
        timeout: Duration::from_millis(200),
        ..LockConfig::default()
    });
    configur.add_config_file(conf.path("locked.ini")).unwrap();
    let mut manager = configur.resolve("locked").unwrap();

    let holder = OpenOptions::new()
        .write(true)
        .open(conf.path("locked.ini"))
        .unwrap();
    holder.lock_exclusive().unwrap();

    let started = Instant::now();
    let err = manager.set("a", 2.into()).unwrap_err();
    assert!(err.is_lock_timeout(), "{err}");
    assert!(started.elapsed() >= Duration::from_millis(150));

    FileExt::unlock(&holder).unwrap();
    conf.assert_file_eq("locked.ini", "a = 1");

    // Value stays pending in memory and is written on the next flush
    assert_eq!(manager.get_i64("a"), Some(2));
    manager.flush().unwrap();
    conf.assert_file_eq("locked.ini", "a = 2");
}

#[test]
fn deferred_policy_batches_writes() {
    let conf = TestConfigDir::new().with_file("batch.ini", "");
    let settings = ConfigurSettings::new()
        .with_file(conf.path("batch.ini"))
        .with_write_policy(WritePolicy::Deferred);
    let configur = Configur::new(settings).unwrap();
    let mut batch = configur.resolve("batch").unwrap();

    for idx in 0..10 {
        batch.set(&format!("k{idx}"), idx.into()).unwrap();
    }
    conf.assert_file_eq("batch.ini", "");

    batch.flush().unwrap();
    assert_eq!(conf.read("batch.ini").split("\r\n").count(), 10);
}
