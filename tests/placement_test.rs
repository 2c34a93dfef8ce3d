//! Tree-shape and race-safety tests for the placement engine.

use binplan::config::Config;
use binplan::db::init_db;
use binplan::domain::{Decimal, MemberId, Slot, TimeMs};
use binplan::engine::PlacementEngine;
use binplan::Repository;
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;

fn test_config() -> Config {
    Config {
        port: 0,
        database_path: String::new(),
        admin_member_id: MemberId::new("house"),
        max_upline_depth: 4,
        // Generous bound: the race tests below hammer one referrer.
        placement_max_retries: 20,
        allow_inactive_referrer: false,
        max_ledger_amount: Decimal::from_str_canonical("1000000000").unwrap(),
    }
}

async fn setup() -> (Arc<PlacementEngine>, Arc<Repository>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));
    let engine = Arc::new(PlacementEngine::new(repo.clone(), test_config()));
    (engine, repo, temp_dir)
}

#[tokio::test]
async fn test_bfs_fills_levels_in_order() {
    let (engine, repo, _temp) = setup().await;

    engine
        .place(MemberId::new("r"), None, TimeMs::new(0))
        .await
        .unwrap();
    for i in 1..=6 {
        engine
            .place(
                MemberId::new(format!("m{}", i)),
                Some(MemberId::new("r")),
                TimeMs::new(i),
            )
            .await
            .unwrap();
    }

    // Level 1: m1/m2 under r. Level 2: m3/m4 under m1, m5/m6 under m2.
    let r = repo.get_member(&MemberId::new("r")).await.unwrap().unwrap();
    assert_eq!(r.left_child_id, Some(MemberId::new("m1")));
    assert_eq!(r.right_child_id, Some(MemberId::new("m2")));

    let m1 = repo.get_member(&MemberId::new("m1")).await.unwrap().unwrap();
    assert_eq!(m1.left_child_id, Some(MemberId::new("m3")));
    assert_eq!(m1.right_child_id, Some(MemberId::new("m4")));

    let m2 = repo.get_member(&MemberId::new("m2")).await.unwrap().unwrap();
    assert_eq!(m2.left_child_id, Some(MemberId::new("m5")));
    assert_eq!(m2.right_child_id, Some(MemberId::new("m6")));
}

#[tokio::test]
async fn test_referrer_assignment_is_immutable_by_placement() {
    let (engine, repo, _temp) = setup().await;

    engine
        .place(MemberId::new("r"), None, TimeMs::new(0))
        .await
        .unwrap();
    engine
        .place(MemberId::new("m1"), Some(MemberId::new("r")), TimeMs::new(1))
        .await
        .unwrap();
    // m2 refers through m1 but lands wherever BFS under m1 says.
    let placement = engine
        .place(MemberId::new("m2"), Some(MemberId::new("m1")), TimeMs::new(2))
        .await
        .unwrap();
    assert_eq!(placement.parent_id, Some(MemberId::new("m1")));

    let m2 = repo.get_member(&MemberId::new("m2")).await.unwrap().unwrap();
    assert_eq!(m2.referrer_id, Some(MemberId::new("m1")));
}

#[tokio::test]
async fn test_concurrent_placements_never_share_a_slot() {
    let (engine, repo, _temp) = setup().await;

    engine
        .place(MemberId::new("r"), None, TimeMs::new(0))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .place(
                    MemberId::new(format!("c{}", i)),
                    Some(MemberId::new("r")),
                    TimeMs::new(1),
                )
                .await
        }));
    }

    let mut placements = Vec::new();
    for handle in handles {
        placements.push(handle.await.unwrap().expect("placement failed"));
    }

    // Every (parent, slot) pair is claimed exactly once.
    let mut seen: HashSet<(String, Slot)> = HashSet::new();
    for p in &placements {
        let key = (
            p.parent_id.as_ref().unwrap().as_str().to_string(),
            p.slot.unwrap(),
        );
        assert!(seen.insert(key), "slot double-assigned: {:?}", p);
    }

    // And the stored tree agrees: each child appears as exactly one
    // child pointer.
    let mut pointed_at: Vec<String> = Vec::new();
    let mut ids = vec!["r".to_string()];
    for i in 0..8 {
        ids.push(format!("c{}", i));
    }
    for id in &ids {
        let m = repo.get_member(&MemberId::new(id)).await.unwrap().unwrap();
        if let Some(l) = m.left_child_id {
            pointed_at.push(l.as_str().to_string());
        }
        if let Some(r) = m.right_child_id {
            pointed_at.push(r.as_str().to_string());
        }
    }
    pointed_at.sort();
    let deduped: HashSet<_> = pointed_at.iter().cloned().collect();
    assert_eq!(pointed_at.len(), deduped.len(), "a child is pointed at twice");
    assert_eq!(pointed_at.len(), 8);
}
