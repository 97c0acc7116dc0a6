//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::time::{Duration, Instant};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use digitpad_config::{ClassifierEndpoint, Settings};
use digitpad_engine::{App, GestureInput, PointerEvent};

pub const THROTTLE: Duration = Duration::from_millis(700);

/// Start a mock server standing in for the classifier.
pub async fn start_classifier_mock() -> MockServer {
    MockServer::start().await
}

/// Response body putting `p` on `top` and the remainder on the next digit.
pub fn distribution(top: u8, p: f64) -> serde_json::Value {
    let mut probabilities = vec![0.0; 10];
    probabilities[usize::from(top)] = p;
    probabilities[(usize::from(top) + 1) % 10] = 1.0 - p;
    serde_json::json!({
        "message": "Prediction successful",
        "probabilities": probabilities,
        "prediction": top,
    })
}

/// Mount a successful `/predict` answer.
pub async fn mount_prediction(server: &MockServer, top: u8, p: f64) {
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(distribution(top, p)))
        .mount(server)
        .await;
}

/// Mount a failing `/predict` answer.
pub async fn mount_failure(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_json(serde_json::json!({"message": "An error occurred"})),
        )
        .mount(server)
        .await;
}

/// Settings pointing at the mock server with a short request timeout.
pub fn settings_for(server: &MockServer) -> Settings {
    Settings {
        endpoint: ClassifierEndpoint::parse(&server.uri()).expect("mock uri is a valid URL"),
        request_timeout: Duration::from_secs(5),
        throttle: THROTTLE,
        ..Settings::default()
    }
}

/// Press, drag and release in page coordinates.
pub fn stroke(app: &mut App, from: (f32, f32), to: (f32, f32), now: Instant) {
    app.pointer(PointerEvent::Down(GestureInput::mouse(from.0, from.1)), now);
    app.pointer(PointerEvent::Drag(GestureInput::mouse(to.0, to.1)), now);
    app.pointer(PointerEvent::Up(GestureInput::mouse(to.0, to.1)), now);
}

/// Drain prediction results until `expected` have arrived or five seconds pass.
pub async fn settle(app: &mut App, expected: usize) -> usize {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut drained = 0;
    while drained < expected && Instant::now() < deadline {
        drained += app.process_prediction_events(Instant::now());
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    drained
}

/// Locate the first occurrence of `needle` on a rendered screen as
/// (column, row).
pub fn find_on_screen(contents: &str, needle: &str) -> Option<(u16, u16)> {
    contents.lines().enumerate().find_map(|(row, line)| {
        line.find(needle).map(|byte| {
            let column = line[..byte].chars().count();
            (column as u16, row as u16)
        })
    })
}
