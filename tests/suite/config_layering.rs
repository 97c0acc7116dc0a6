//! Config file → settings → running app.

use std::fs;
use std::time::{Duration, Instant};

use digitpad_config::{ConfigError, DigitpadConfig, Settings};
use digitpad_engine::App;
use tempfile::TempDir;

use crate::common::{mount_prediction, settle, start_classifier_mock, stroke};

fn write_config(dir: &TempDir, body: &str) -> DigitpadConfig {
    let path = dir.path().join("config.toml");
    fs::write(&path, body).unwrap();
    DigitpadConfig::load_from(&path)
        .unwrap()
        .expect("config file exists")
}

#[tokio::test]
async fn base_url_from_config_file_reaches_the_server() {
    let server = start_classifier_mock().await;
    mount_prediction(&server, 2, 0.75).await;

    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        &format!(
            "[classifier]\nbase_url = \"{}\"\ntimeout_secs = 5\n\n[canvas]\nthrottle_ms = 900\n",
            server.uri()
        ),
    );
    let settings = Settings::resolve(Some(&config), None).unwrap();
    assert_eq!(settings.throttle, Duration::from_millis(900));

    let mut app = App::new(&settings).unwrap();
    assert_eq!(app.endpoint(), format!("{}/predict", server.uri()));

    stroke(&mut app, (60.0, 60.0), (190.0, 190.0), Instant::now());
    settle(&mut app, 1).await;
    assert_eq!(app.prediction().prediction_label(), "2");
}

#[tokio::test]
async fn environment_url_beats_the_config_file() {
    let server = start_classifier_mock().await;
    mount_prediction(&server, 6, 0.6).await;

    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        "[classifier]\nbase_url = \"http://config-host.invalid:9\"\n",
    );
    let settings = Settings::resolve(Some(&config), Some(server.uri())).unwrap();
    let mut app = App::new(&settings).unwrap();

    stroke(&mut app, (60.0, 60.0), (190.0, 190.0), Instant::now());
    settle(&mut app, 1).await;
    assert_eq!(app.prediction().prediction_label(), "6");
    assert!(app.toasts().is_empty());
}

#[test]
fn ui_options_flow_into_the_app() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        "[app]\nascii_only = true\nreduced_motion = true\n",
    );
    let settings = Settings::resolve(Some(&config), None).unwrap();
    let app = App::new(&settings).unwrap();

    let options = app.ui_options();
    assert!(options.ascii_only);
    assert!(options.reduced_motion);
    assert!(!options.high_contrast);
    assert_eq!(app.endpoint(), "http://localhost:5000/predict");
}

#[tokio::test]
async fn zero_throttle_in_config_still_gates_exports() {
    let server = start_classifier_mock().await;
    mount_prediction(&server, 4, 0.9).await;

    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        &format!(
            "[classifier]\nbase_url = \"{}\"\n\n[canvas]\nthrottle_ms = 0\n",
            server.uri()
        ),
    );
    let settings = Settings::resolve(Some(&config), None).unwrap();
    assert_eq!(settings.throttle, Duration::from_millis(700));

    let mut app = App::new(&settings).unwrap();
    let now = Instant::now();
    for step in 0..5_u8 {
        let y = 40.0 + f32::from(step) * 30.0;
        stroke(&mut app, (60.0, y), (190.0, y), now);
    }
    assert_eq!(app.snapshots_exported(), 1);
    settle(&mut app, 1).await;
}

#[test]
fn invalid_base_url_is_a_startup_error() {
    let err = Settings::resolve(None, Some("ftp://example.com".to_string())).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidUrl { .. }));
}

#[test]
fn broken_config_file_is_reported_with_its_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[classifier\nbase_url = ").unwrap();

    let err = DigitpadConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.path(), Some(&path));
}
