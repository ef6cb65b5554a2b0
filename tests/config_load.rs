// tests/config_load.rs
use astro_notifier::config::app::{AppConfig, ENV_API_KEY, ENV_CONFIG_PATH, ENV_DATA_DIR};
use std::path::PathBuf;
use std::{env, fs};

fn clear_env() {
    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_API_KEY);
    env::remove_var(ENV_DATA_DIR);
}

#[serial_test::serial]
#[test]
fn defaults_then_file_then_env() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    // 1) Nothing on disk, no env → defaults with the demo key
    let c = AppConfig::load_default().unwrap();
    assert_eq!(c, AppConfig::default());
    assert_eq!(c.api_key, "DEMO_KEY");

    // 2) config/astro.toml fallback
    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(
        tmp.path().join("config/astro.toml"),
        "api_key = \"ENV\"\ndata_dir = \"state\"\n",
    )
    .unwrap();
    let c = AppConfig::load_default().unwrap();
    assert_eq!(c.data_dir, PathBuf::from("state"));
    assert_eq!(c.api_key, "DEMO_KEY");

    // 3) env key and data dir override the file
    env::set_var(ENV_API_KEY, "real-key");
    env::set_var(ENV_DATA_DIR, "/var/lib/astro");
    let c = AppConfig::load_default().unwrap();
    assert_eq!(c.api_key, "real-key");
    assert_eq!(c.data_dir, PathBuf::from("/var/lib/astro"));

    // 4) explicit path must exist
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml"));
    assert!(AppConfig::load_default().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn explicit_path_wins() {
    clear_env();
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("astro.toml");
    fs::write(&p, "api_key = \"from-file\"\nhttp_timeout_secs = 0\n").unwrap();
    env::set_var(ENV_CONFIG_PATH, &p);

    let c = AppConfig::load_default().unwrap();
    assert_eq!(c.api_key, "from-file");
    assert_eq!(c.http_timeout_secs, 10);

    clear_env();
}
