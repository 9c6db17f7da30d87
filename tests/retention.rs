//! Integration tests for the retention policy: bounded sections, eviction
//! order, read-state preservation, bookmark exemption.
//!
//! Each test creates its own in-memory SQLite database for isolation.

use paperboy::{Database, Section, Story};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

async fn test_db(max_retained: usize) -> Database {
    Database::open_with_retention(":memory:", max_retained)
        .await
        .unwrap()
}

fn test_story(id: i64, time: i64) -> Story {
    Story {
        id,
        title: format!("Story {id}"),
        author: "tester".to_string(),
        time,
        score: id,
        url: format!("https://example.com/{id}"),
        read: false,
        bookmarked: false,
        section: None,
    }
}

// ============================================================================
// Bounded Sections
// ============================================================================

#[tokio::test]
async fn eleven_inserts_leave_the_ten_newest() {
    let db = test_db(10).await;
    for i in 1..=11 {
        db.put(&test_story(i, 1000 + i), Section::Recent, false, false)
            .await
            .unwrap();
    }

    let stories = db.load_all(Section::Recent, true).await;
    assert_eq!(stories.len(), 10);

    let ids: Vec<i64> = stories.iter().map(|s| s.id).collect();
    let expected: Vec<i64> = (2..=11).rev().collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn eviction_is_strictly_oldest_first() {
    let db = test_db(3).await;
    // Insert out of time order; eviction must go by time, not arrival.
    for (id, time) in [(1, 500), (2, 100), (3, 900), (4, 700)] {
        db.put(&test_story(id, time), Section::Recent, false, false)
            .await
            .unwrap();
    }

    let ids: Vec<i64> = db
        .load_all(Section::Recent, true)
        .await
        .iter()
        .map(|s| s.id)
        .collect();
    // Story 2 (time 100) is the oldest and the one gone.
    assert_eq!(ids, vec![3, 4, 1]);
}

#[tokio::test]
async fn read_records_are_not_eviction_targets_by_themselves() {
    let db = test_db(5).await;
    for i in 1..=5 {
        db.put(&test_story(i, 100 + i), Section::Top, false, false)
            .await
            .unwrap();
    }
    // Read the three oldest. Nothing is over the cap, so nothing may go.
    for i in 1..=3 {
        db.mark_read(&test_story(i, 100 + i), Section::Top)
            .await
            .unwrap();
    }

    let stories = db.load_all(Section::Top, true).await;
    assert_eq!(stories.len(), 5);
    assert_eq!(stories.iter().filter(|s| s.read).count(), 3);
}

#[tokio::test]
async fn sections_are_bounded_independently() {
    let db = test_db(4).await;
    for i in 1..=6 {
        db.put(&test_story(i, 100 + i), Section::Recent, false, false)
            .await
            .unwrap();
    }
    for i in 1..=3 {
        db.put(&test_story(i, 100 + i), Section::Top, false, false)
            .await
            .unwrap();
    }

    assert_eq!(db.load_all(Section::Recent, true).await.len(), 4);
    assert_eq!(db.load_all(Section::Top, true).await.len(), 3);
}

// ============================================================================
// Bookmark Exemption
// ============================================================================

#[tokio::test]
async fn bookmark_section_ignores_the_cap() {
    let db = test_db(3).await;
    for i in 1..=40 {
        db.put(&test_story(i, 100 + i), Section::Bookmark, false, false)
            .await
            .unwrap();
    }

    assert_eq!(db.load_all(Section::Bookmark, true).await.len(), 40);
}

#[tokio::test]
async fn bounded_churn_does_not_touch_bookmarks() {
    let db = test_db(3).await;
    for i in 1..=5 {
        db.put(&test_story(i, 100 + i), Section::Bookmark, false, false)
            .await
            .unwrap();
    }
    // Churn the recent section well past its cap.
    for i in 1..=20 {
        db.put(&test_story(100 + i, 1000 + i), Section::Recent, false, false)
            .await
            .unwrap();
    }

    assert_eq!(db.load_all(Section::Bookmark, true).await.len(), 5);
    assert_eq!(db.load_all(Section::Recent, true).await.len(), 3);
}

// ============================================================================
// Read-State Preservation
// ============================================================================

#[tokio::test]
async fn refetch_never_downgrades_a_read_record() {
    let db = test_db(10).await;
    db.put(&test_story(5, 100), Section::Recent, false, false)
        .await
        .unwrap();
    db.mark_read(&test_story(5, 100), Section::Recent)
        .await
        .unwrap();

    // The sync engine re-fetching the same story writes unread and must
    // be skipped.
    let written = db
        .put(&test_story(5, 100), Section::Recent, false, false)
        .await
        .unwrap();
    assert!(!written);
    assert!(db.load_all(Section::Recent, true).await[0].read);
}

#[tokio::test]
async fn mark_read_needs_a_stored_record() {
    let db = test_db(10).await;

    let written = db
        .mark_read(&test_story(1, 100), Section::Recent)
        .await
        .unwrap();
    assert!(!written);
    assert!(db.load_all(Section::Recent, true).await.is_empty());
}

#[tokio::test]
async fn remove_requires_a_matching_section() {
    let db = test_db(10).await;
    db.put(&test_story(5, 100), Section::Top, false, false)
        .await
        .unwrap();

    assert!(!db.remove(5, Section::Recent).await.unwrap());
    assert_eq!(db.load_all(Section::Top, true).await.len(), 1);
}

// ============================================================================
// Bounded Invariant (property)
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// For any sequence of inserts, a bounded section never exceeds its cap.
    #[test]
    fn retention_cap_holds_under_any_insert_sequence(
        times in proptest::collection::vec(0i64..10_000, 1..40),
        cap in 1usize..12,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let db = Database::open_with_retention(":memory:", cap).await.unwrap();
            for (i, time) in times.iter().enumerate() {
                db.put(&test_story(i as i64 + 1, *time), Section::Recent, false, false)
                    .await
                    .unwrap();
                let count = db.load_all(Section::Recent, false).await.len();
                prop_assert!(count <= cap, "{count} stories retained with cap {cap}");
            }
            Ok(())
        })?;
    }
}
