//! Concurrent writers against a file database with several pool connections

mod common;

use common::*;
use coursectl_server::db::ForumRepo;
use coursectl_server::models::Content;
use coursectl_server::rules::{enroll, CapacityPolicy, EnrollDecision};
use tempfile::TempDir;

const STUDENTS: usize = 20;

async fn seed(pool: &sqlx::SqlitePool, max_limit: i64) {
    course(pool, "CMPSC431W", Some(1), &[(1, max_limit)]).await;
    for i in 0..STUDENTS {
        student(pool, &format!("s{i}@psu.edu")).await;
    }
}

async fn enroll_all(pool: &sqlx::SqlitePool, policy: CapacityPolicy) -> Vec<EnrollDecision> {
    let handles: Vec<_> = (0..STUDENTS)
        .map(|i| {
            let pool = pool.clone();
            tokio::spawn(async move {
                enroll(&pool, &format!("s{i}@psu.edu"), "CMPSC431W", 1, policy).await
            })
        })
        .collect();

    let mut decisions = Vec::new();
    for handle in handles {
        decisions.push(handle.await.unwrap().expect("enroll should not fail under contention"));
    }
    decisions
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_enrollments_all_succeed_when_there_is_room() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir).await;
    seed(&pool, 100).await;

    let decisions = enroll_all(&pool, CapacityPolicy::Strict).await;

    assert!(decisions.iter().all(EnrollDecision::is_eligible), "{decisions:?}");
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM Enrolls").await, STUDENTS as i64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_enrollments_never_overbook() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir).await;
    seed(&pool, 5).await;

    let decisions = enroll_all(&pool, CapacityPolicy::Strict).await;

    let admitted = decisions.iter().filter(|d| d.is_eligible()).count();
    assert_eq!(admitted, 5);
    assert!(decisions
        .iter()
        .filter(|d| !d.is_eligible())
        .all(|d| matches!(d, EnrollDecision::SectionFull { max_limit: 5, .. })));
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM Enrolls").await, 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_posts_get_distinct_numbers() {
    let dir = TempDir::new().unwrap();
    let pool = file_pool(&dir).await;
    seed(&pool, 100).await;

    let handles: Vec<_> = (0..STUDENTS)
        .map(|i| {
            let pool = pool.clone();
            tokio::spawn(async move {
                let content = Content::new("content", &format!("question {i}")).unwrap();
                ForumRepo::new(&pool)
                    .create_post("CMPSC431W", &format!("s{i}@psu.edu"), &content)
                    .await
            })
        })
        .collect();

    let mut numbers = Vec::new();
    for handle in handles {
        numbers.push(handle.await.unwrap().expect("post should not fail under contention").post_no);
    }
    numbers.sort_unstable();
    assert_eq!(numbers, (1..=STUDENTS as i64).collect::<Vec<_>>());
}
