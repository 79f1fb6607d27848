// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::enrollment::EnrollmentStatus;
use chrono::TimeZone;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

/// Serve a single canned HTTP response; the handle yields the request line
/// and body the client sent
fn serve_once(status: &str, body: &str) -> (String, JoinHandle<(String, String)>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut content_length = 0usize;
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).unwrap();
            if header == "\r\n" || header.is_empty() {
                break;
            }
            let lower = header.to_ascii_lowercase();
            if let Some(value) = lower.strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap();
            }
        }
        let mut request_body = vec![0u8; content_length];
        reader.read_exact(&mut request_body).unwrap();

        reader.get_mut().write_all(response.as_bytes()).unwrap();
        (
            request_line.trim_end().to_string(),
            String::from_utf8(request_body).unwrap(),
        )
    });

    (base_url, handle)
}

fn adapter(base_url: &str) -> HttpHostAdapter {
    HttpHostAdapter::new(base_url, Duration::from_secs(5))
}

#[test]
fn base_url_trailing_slash_is_trimmed() {
    let host = adapter("http://lms.test/api/");
    assert_eq!(host.base_url(), "http://lms.test/api");
}

#[tokio::test]
async fn create_posts_reference_tag_and_returns_host_id() {
    let (base_url, server) = serve_once("201 Created", r#"{"id":4411}"#);
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();

    let id = adapter(&base_url)
        .create_enrollment(UserId(5), CourseId(10), start, "esched", ScheduleId(3))
        .await
        .unwrap();

    assert_eq!(id, ExternalId("4411".to_string()));
    let (request_line, body) = server.join().unwrap();
    assert!(request_line.starts_with("POST /enrollments"));
    let sent: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(sent["ref_marker"], "esched");
    assert_eq!(sent["ref_id"], 3);
    assert_eq!(sent["user_id"], 5);
}

#[tokio::test]
async fn delete_by_ref_sends_tag_as_query() {
    let (base_url, server) = serve_once("200 OK", r#"{"deleted":1}"#);

    let deleted = adapter(&base_url)
        .delete_enrollment_by_ref("esched", ScheduleId(3))
        .await
        .unwrap();

    assert_eq!(deleted, 1);
    let (request_line, _) = server.join().unwrap();
    assert!(request_line.starts_with("DELETE /enrollments?"));
    assert!(request_line.contains("ref_marker=esched"));
    assert!(request_line.contains("ref_id=3"));
}

#[tokio::test]
async fn find_returns_active_record_first() {
    let body = r#"[
        {"id":"1","user_id":5,"course_id":10,"status":"cancelled"},
        {"id":"2","user_id":5,"course_id":10,"status":"enrolled","ref_marker":"esched","ref_id":3}
    ]"#;
    let (base_url, server) = serve_once("200 OK", body);

    let record = adapter(&base_url)
        .find_enrollment(UserId(5), CourseId(10))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(record.id, ExternalId("2".to_string()));
    assert_eq!(record.status, EnrollmentStatus::Enrolled);
    assert!(record.created_by("esched", ScheduleId(3)));
    let (request_line, _) = server.join().unwrap();
    assert!(request_line.contains("user_id=5"));
    assert!(request_line.contains("course_id=10"));
}

#[tokio::test]
async fn find_with_no_records_is_none() {
    let (base_url, _server) = serve_once("200 OK", "[]");

    let record = adapter(&base_url)
        .find_enrollment(UserId(5), CourseId(10))
        .await
        .unwrap();

    assert!(record.is_none());
}

#[tokio::test]
async fn missing_user_is_not_an_error() {
    let (base_url, server) = serve_once("404 Not Found", "{}");

    let exists = adapter(&base_url).user_exists(UserId(99)).await.unwrap();

    assert!(!exists);
    let (request_line, _) = server.join().unwrap();
    assert!(request_line.starts_with("GET /users/99"));
}

#[tokio::test]
async fn server_error_is_unavailable() {
    let (base_url, _server) = serve_once("503 Service Unavailable", "{}");

    let result = adapter(&base_url)
        .delete_enrollment_by_ref("esched", ScheduleId(3))
        .await;

    assert!(matches!(result, Err(EnrollmentError::Unavailable(_))));
}

#[tokio::test]
async fn client_error_is_rejected() {
    let (base_url, _server) = serve_once("409 Conflict", "{}");
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();

    let result = adapter(&base_url)
        .create_enrollment(UserId(5), CourseId(10), start, "esched", ScheduleId(3))
        .await;

    assert!(matches!(result, Err(EnrollmentError::Rejected(_))));
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let (base_url, _server) = serve_once("200 OK", r#"{"ok":true}"#);

    let result = adapter(&base_url)
        .delete_enrollment_by_ref("esched", ScheduleId(3))
        .await;

    assert!(matches!(result, Err(EnrollmentError::Decode(_))));
}
