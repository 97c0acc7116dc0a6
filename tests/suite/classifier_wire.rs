//! What actually goes over the wire when a stroke is finished.

use std::io::Cursor;
use std::time::Instant;

use digitpad_classifier::{FILE_FIELD, FILE_NAME, REQUEST_ID_HEADER};
use digitpad_engine::App;

use crate::common::{mount_prediction, settings_for, settle, start_classifier_mock, stroke};

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn position(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[tokio::test]
async fn uploaded_file_is_the_drawn_bitmap() {
    let server = start_classifier_mock().await;
    mount_prediction(&server, 7, 0.9).await;

    let mut app = App::new(&settings_for(&server)).unwrap();
    stroke(&mut app, (40.0, 125.0), (210.0, 125.0), Instant::now());
    assert_eq!(settle(&mut app, 1).await, 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    assert_eq!(request.url.path(), "/predict");
    assert_eq!(
        request
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
        Some("1")
    );

    let disposition = format!("name=\"{FILE_FIELD}\"; filename=\"{FILE_NAME}\"");
    assert!(position(&request.body, disposition.as_bytes()).is_some());

    let start = position(&request.body, PNG_MAGIC).expect("body carries a PNG");
    let decoder = png::Decoder::new(Cursor::new(&request.body[start..]));
    let mut reader = decoder.read_info().unwrap();
    let mut pixels = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut pixels).unwrap();

    assert_eq!((info.width, info.height), (250, 250));
    assert_eq!(info.color_type, png::ColorType::Grayscale);
    // Stroke ran horizontally through the middle row.
    assert_eq!(pixels[125 * 250 + 125], 0);
    assert_eq!(pixels[10 * 250 + 10], 255);
}

#[tokio::test]
async fn each_snapshot_gets_the_next_request_id() {
    let server = start_classifier_mock().await;
    mount_prediction(&server, 3, 0.8).await;

    let mut app = App::new(&settings_for(&server)).unwrap();
    let start = Instant::now();
    stroke(&mut app, (40.0, 40.0), (60.0, 60.0), start);
    stroke(&mut app, (90.0, 90.0), (120.0, 120.0), start + crate::common::THROTTLE);
    stroke(
        &mut app,
        (150.0, 150.0),
        (180.0, 180.0),
        start + crate::common::THROTTLE * 2,
    );
    assert_eq!(settle(&mut app, 3).await, 3);

    let mut ids: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter_map(|r| r.headers.get(REQUEST_ID_HEADER))
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["1", "2", "3"]);
}
