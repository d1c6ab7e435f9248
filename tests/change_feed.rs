use chrono::{Duration, Utc};
use futures_util::StreamExt;
use serde_json::{Value, json};
use uuid::Uuid;

use wema_backend::config::AttendanceConfig;
use wema_backend::entities::{Student, StudentStatus, UsageType};
use wema_backend::handlers::events::scoped_stream;
use wema_backend::services::{ChangeEvent, ChangeFeed, StudentService};
use wema_backend::store::{MemoryStore, StudentStore};

fn student(owner: &str, name: &str, usage_type: UsageType, total: i32, current: i32) -> Student {
    Student {
        id: Uuid::new_v4(),
        owner_id: owner.to_string(),
        name: name.to_string(),
        contact: None,
        pin: "1234".to_string(),
        subject: "piano".to_string(),
        branch: "main".to_string(),
        usage_type,
        total_count: total,
        current_count: current,
        last_payment_date: Utc::now(),
        status: StudentStatus::Active,
        reg_date: Utc::now().date_naive(),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn sse_stream_only_carries_own_academy_events() {
    let feed = ChangeFeed::default();
    let mut stream = Box::pin(scoped_stream(&feed, "academy-1".to_string()));

    let mine = Uuid::new_v4();
    let theirs = Uuid::new_v4();
    feed.publish(ChangeEvent::StudentChanged {
        owner_id: "academy-1".to_string(),
        student_id: mine,
    });
    feed.publish(ChangeEvent::StudentChanged {
        owner_id: "academy-2".to_string(),
        student_id: theirs,
    });
    feed.publish(ChangeEvent::PaymentProcessed {
        owner_id: "academy-1".to_string(),
        student_id: mine,
    });
    // Closing the feed ends the stream so the collection below terminates.
    drop(feed);

    let mut events = Vec::new();
    while let Some(frame) = stream.next().await {
        let frame = frame.unwrap();
        let text = std::str::from_utf8(&frame).unwrap();
        assert!(text.starts_with("data: "), "bad SSE framing: {text:?}");
        assert!(text.ends_with("\n\n"), "bad SSE framing: {text:?}");
        let event: Value =
            serde_json::from_str(&text["data: ".len()..text.len() - 2]).unwrap();
        events.push(event);
    }

    // The other academy's event was dropped, not delivered.
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["event"], json!("student_changed"));
    assert_eq!(events[1]["event"], json!("payment_processed"));
    for event in &events {
        assert_eq!(event["owner_id"], json!("academy-1"));
        assert_eq!(event["student_id"], json!(mine.to_string()));
    }
}

#[tokio::test]
async fn payment_due_scan_publishes_reminders_across_owners() {
    let store = MemoryStore::new();
    let feed = ChangeFeed::default();
    let service = StudentService::new(store.clone(), feed.clone(), AttendanceConfig::default());

    let mut overdue = student("academy-1", "Mina", UsageType::Monthly, 0, 0);
    overdue.last_payment_date = Utc::now() - Duration::days(40);
    let overdue_id = overdue.id;
    store.insert(overdue).await.unwrap();

    let exhausted = student("academy-1", "Minho", UsageType::Session, 8, 8);
    let exhausted_id = exhausted.id;
    store.insert(exhausted).await.unwrap();

    // Plenty of balance left; no reminder expected.
    let healthy = student("academy-1", "Ara", UsageType::Session, 8, 1);
    let healthy_id = healthy.id;
    store.insert(healthy).await.unwrap();

    let imminent = student("academy-2", "Yuna", UsageType::Session, 8, 7);
    let imminent_id = imminent.id;
    store.insert(imminent).await.unwrap();

    let mut rx = feed.subscribe();
    let reminded = service.scan_payment_due().await.unwrap();
    assert_eq!(reminded, 3);

    let mut seen = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            ChangeEvent::PaymentDueReminder {
                owner_id,
                student_id,
                ..
            } => seen.push((owner_id, student_id)),
            other => panic!("unexpected event during scan: {other:?}"),
        }
    }

    assert_eq!(seen.len(), 3);
    assert!(seen.contains(&("academy-1".to_string(), overdue_id)));
    assert!(seen.contains(&("academy-1".to_string(), exhausted_id)));
    assert!(seen.contains(&("academy-2".to_string(), imminent_id)));
    assert!(!seen.iter().any(|(_, id)| *id == healthy_id));
}
