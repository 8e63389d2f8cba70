use super::*;
use crate::test_support::{fake_catalog, fake_daemon};
use obs_connection::Connection;
use obs_core::property::{ElementMap, VectorMeta};
use obs_core::{NumberElement, NumberVector, PropertyPerm, PropertyState, TextElement, TextVector};
use obs_wire::{encode_def_number, encode_def_text};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn meta(name: &str) -> VectorMeta {
    VectorMeta {
        device: "wheel".into(),
        name: name.into(),
        label: name.into(),
        group: "Main".into(),
        state: PropertyState::Ok,
        perm: PropertyPerm::Rw,
        timeout: 5.0,
        timestamp: Utc::now(),
        message: None,
    }
}

fn filter_names_xml() -> String {
    let mut elements = ElementMap::new();
    elements.insert("FILTER_NAME_1", TextElement { name: "FILTER_NAME_1".into(), label: "1".into(), value: "Luminance".into() });
    elements.insert("FILTER_NAME_2", TextElement { name: "FILTER_NAME_2".into(), label: "2".into(), value: "Red".into() });
    let vector = TextVector { meta: meta("FILTER_NAME"), elements };
    encode_def_text(&vector).unwrap()
}

fn filter_slot_xml(slot: f64) -> String {
    let mut elements = ElementMap::new();
    elements.insert("FILTER_SLOT", NumberElement { name: "FILTER_SLOT".into(), label: "Slot".into(), format: "%g".into(), min: 1.0, max: 8.0, step: 1.0, value: slot });
    let vector = NumberVector { meta: meta("FILTER_SLOT"), elements };
    encode_def_number(&vector).unwrap()
}

async fn wait_for_wheel(conn: &Connection) {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(2);
    loop {
        if conn.state().await.unwrap().get("wheel").and_then(|d| d.get("FILTER_SLOT")).is_some() {
            break;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("wheel never appeared in mirror");
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn trigger_finishes_immediately_when_already_on_target_slot() {
    let (conn, mut socket) = fake_daemon().await;
    let catalog = fake_catalog();
    socket.write_all(filter_names_xml().as_bytes()).await.unwrap();
    socket.write_all(filter_slot_xml(2.0).as_bytes()).await.unwrap();
    wait_for_wheel(&conn).await;

    let mut event = SetFilter::new(JobId::new("job-1"), 0, "Red");
    let ctx = EventContext { conn: &conn, catalog: &catalog, now: Utc::now() };
    event.trigger(&ctx).await;
    assert_eq!(event.status(), EventStatus::Finished);

    conn.close().await.unwrap();
}

#[tokio::test]
async fn trigger_writes_filter_slot_and_update_finishes_on_convergence() {
    let (conn, mut socket) = fake_daemon().await;
    let catalog = fake_catalog();
    socket.write_all(filter_names_xml().as_bytes()).await.unwrap();
    socket.write_all(filter_slot_xml(1.0).as_bytes()).await.unwrap();
    wait_for_wheel(&conn).await;

    let mut event = SetFilter::new(JobId::new("job-1"), 0, "Red");
    let now = Utc::now();
    let ctx = EventContext { conn: &conn, catalog: &catalog, now };
    event.trigger(&ctx).await;
    assert_eq!(event.status(), EventStatus::Running);

    let mut buf = vec![0u8; 1024];
    let n = socket.read(&mut buf).await.unwrap();
    assert!(String::from_utf8_lossy(&buf[..n]).contains("FILTER_SLOT"));

    socket.write_all(filter_slot_xml(2.0).as_bytes()).await.unwrap();
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(2);
    loop {
        event.update(&ctx).await;
        if event.status() == EventStatus::Finished {
            break;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("filter change never converged");
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    conn.close().await.unwrap();
}

#[tokio::test]
async fn trigger_fails_for_unknown_filter_name() {
    let (conn, mut socket) = fake_daemon().await;
    let catalog = fake_catalog();
    socket.write_all(filter_names_xml().as_bytes()).await.unwrap();
    wait_for_wheel_names(&conn).await;

    let mut event = SetFilter::new(JobId::new("job-1"), 0, "Infrared");
    let ctx = EventContext { conn: &conn, catalog: &catalog, now: Utc::now() };
    event.trigger(&ctx).await;
    assert_eq!(event.status(), EventStatus::Failed);
    assert!(event.failure_message().unwrap().contains("Infrared"));

    conn.close().await.unwrap();
}

async fn wait_for_wheel_names(conn: &Connection) {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(2);
    loop {
        if conn.state().await.unwrap().get("wheel").and_then(|d| d.get("FILTER_NAME")).is_some() {
            break;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("wheel never appeared in mirror");
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn cancel_fails_with_message() {
    let (conn, _socket) = fake_daemon().await;
    let catalog = fake_catalog();
    let mut event = SetFilter::new(JobId::new("job-1"), 0, "Red");
    let ctx = EventContext { conn: &conn, catalog: &catalog, now: Utc::now() };
    event.cancel(&ctx).await;
    assert_eq!(event.status(), EventStatus::Failed);
    assert_eq!(event.failure_message(), Some("Filter change cancelled"));

    conn.close().await.unwrap();
}
