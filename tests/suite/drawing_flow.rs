//! Full stroke → request → panel round trips against a mock classifier.

use std::time::{Duration, Instant};

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use digitpad_classifier::REQUEST_ID_HEADER;
use digitpad_engine::{App, PREDICTION_ERROR_TEXT, format_percentage};

use crate::common::{
    THROTTLE, distribution, mount_failure, mount_prediction, settings_for, settle,
    start_classifier_mock, stroke,
};

#[tokio::test]
async fn digit_eight_is_reported_with_its_probability() {
    let server = start_classifier_mock().await;
    mount_prediction(&server, 8, 0.95).await;

    let mut app = App::new(&settings_for(&server)).unwrap();
    stroke(&mut app, (125.0, 30.0), (125.0, 220.0), Instant::now());
    assert!(app.is_loading());

    settle(&mut app, 1).await;
    assert!(!app.is_loading());
    assert_eq!(app.prediction().prediction_label(), "8");
    assert_eq!(format_percentage(app.prediction().probabilities()[8]), "95.00%");
    assert_eq!(format_percentage(app.prediction().probabilities()[9]), "5.00%");
}

#[tokio::test]
async fn server_error_raises_one_toast() {
    let server = start_classifier_mock().await;
    mount_failure(&server, 500).await;

    let mut app = App::new(&settings_for(&server)).unwrap();
    let start = Instant::now();
    stroke(&mut app, (60.0, 60.0), (100.0, 100.0), start);
    stroke(&mut app, (120.0, 120.0), (160.0, 160.0), start + THROTTLE);
    settle(&mut app, 2).await;

    assert!(!app.is_loading());
    assert!(app.prediction().is_neutral());
    // Identical failures refresh the same toast.
    assert_eq!(app.toasts().len(), 1);
    assert_eq!(app.toasts()[0].text(), PREDICTION_ERROR_TEXT);
}

#[tokio::test]
async fn toast_expires_on_its_own() {
    let server = start_classifier_mock().await;
    mount_failure(&server, 502).await;

    let mut app = App::new(&settings_for(&server)).unwrap();
    stroke(&mut app, (60.0, 60.0), (100.0, 100.0), Instant::now());
    settle(&mut app, 1).await;
    assert_eq!(app.toasts().len(), 1);

    app.tick(Instant::now() + Duration::from_secs(6));
    assert!(app.toasts().is_empty());
}

#[tokio::test]
async fn late_answer_for_an_older_drawing_is_ignored() {
    let server = start_classifier_mock().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(header(REQUEST_ID_HEADER, "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(distribution(1, 0.99))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(header(REQUEST_ID_HEADER, "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(distribution(8, 0.95)))
        .mount(&server)
        .await;

    let mut app = App::new(&settings_for(&server)).unwrap();
    let start = Instant::now();
    stroke(&mut app, (125.0, 30.0), (125.0, 220.0), start);
    stroke(&mut app, (60.0, 125.0), (190.0, 125.0), start + THROTTLE);

    // B answers first and is shown; A's late answer is dropped.
    assert_eq!(settle(&mut app, 2).await, 2);
    assert_eq!(app.prediction().prediction_label(), "8");
    assert_eq!(format_percentage(app.prediction().probabilities()[8]), "95.00%");
    assert!(!app.is_loading());
}

#[tokio::test]
async fn clearing_before_the_answer_keeps_the_panel_neutral() {
    let server = start_classifier_mock().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(distribution(4, 0.7))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut app = App::new(&settings_for(&server)).unwrap();
    stroke(&mut app, (60.0, 60.0), (190.0, 190.0), Instant::now());
    app.clear_canvas();
    assert!(!app.is_loading());

    settle(&mut app, 1).await;
    assert!(app.prediction().is_neutral());
    assert!(app.surface().bitmap().is_blank());
}
