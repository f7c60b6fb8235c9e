//! Enrollment eligibility and capacity

mod common;

use common::*;
use coursectl_server::models::AssignmentKind;
use coursectl_server::rules::{can_enroll, enroll, CapacityPolicy, EnrollDecision};

const LENIENT: CapacityPolicy = CapacityPolicy::Lenient;

#[tokio::test]
async fn second_enrollment_in_same_course_is_rejected() {
    let pool = pool().await;
    course(&pool, "CMPSC431W", Some(1), &[(1, 30), (2, 30)]).await;
    student(&pool, "ab@psu.edu").await;

    let first = enroll(&pool, "ab@psu.edu", "CMPSC431W", 1, LENIENT).await.unwrap();
    assert_eq!(first, EnrollDecision::Eligible);

    let again = enroll(&pool, "ab@psu.edu", "CMPSC431W", 1, LENIENT).await.unwrap();
    assert_eq!(again, EnrollDecision::AlreadyEnrolled);

    let other_section = enroll(&pool, "ab@psu.edu", "CMPSC431W", 2, LENIENT).await.unwrap();
    assert_eq!(other_section, EnrollDecision::AlreadyEnrolled);

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM Enrolls").await, 1);
}

#[tokio::test]
async fn lenient_policy_admits_one_past_the_limit() {
    let pool = pool().await;
    course(&pool, "MATH140", None, &[(1, 2)]).await;
    for i in 0..4 {
        student(&pool, &format!("s{i}@psu.edu")).await;
    }

    assert_eq!(enroll(&pool, "s0@psu.edu", "MATH140", 1, LENIENT).await.unwrap(), EnrollDecision::Eligible);
    assert_eq!(enroll(&pool, "s1@psu.edu", "MATH140", 1, LENIENT).await.unwrap(), EnrollDecision::Eligible);

    // count == max_limit still admits
    assert_eq!(enroll(&pool, "s2@psu.edu", "MATH140", 1, LENIENT).await.unwrap(), EnrollDecision::Eligible);

    assert_eq!(
        enroll(&pool, "s3@psu.edu", "MATH140", 1, LENIENT).await.unwrap(),
        EnrollDecision::SectionFull { enrolled: 3, max_limit: 2 }
    );
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM Enrolls").await, 3);
}

#[tokio::test]
async fn strict_policy_rejects_at_the_limit() {
    let pool = pool().await;
    course(&pool, "MATH140", None, &[(1, 2)]).await;
    for i in 0..3 {
        student(&pool, &format!("s{i}@psu.edu")).await;
    }

    let strict = CapacityPolicy::Strict;
    assert!(enroll(&pool, "s0@psu.edu", "MATH140", 1, strict).await.unwrap().is_eligible());
    assert!(enroll(&pool, "s1@psu.edu", "MATH140", 1, strict).await.unwrap().is_eligible());
    assert_eq!(
        enroll(&pool, "s2@psu.edu", "MATH140", 1, strict).await.unwrap(),
        EnrollDecision::SectionFull { enrolled: 2, max_limit: 2 }
    );
}

#[tokio::test]
async fn professors_and_unknown_accounts_cannot_enroll() {
    let pool = pool().await;
    course(&pool, "PHYS211", Some(4), &[(1, 10)]).await;
    professor(&pool, "prof@psu.edu", Some(4)).await;

    assert_eq!(
        can_enroll(&pool, "prof@psu.edu", "PHYS211", 1, LENIENT).await.unwrap(),
        EnrollDecision::NotAStudent
    );
    assert_eq!(
        can_enroll(&pool, "ghost@psu.edu", "PHYS211", 1, LENIENT).await.unwrap(),
        EnrollDecision::NotAStudent
    );
}

#[tokio::test]
async fn teaching_assistants_cannot_enroll_in_their_course() {
    let pool = pool().await;
    course(&pool, "PHYS211", Some(4), &[(1, 10)]).await;
    course(&pool, "CHEM110", Some(5), &[(1, 10)]).await;
    ta(&pool, "ta@psu.edu", 4).await;

    assert_eq!(
        enroll(&pool, "ta@psu.edu", "PHYS211", 1, LENIENT).await.unwrap(),
        EnrollDecision::TeachingAssistant
    );
    assert!(enroll(&pool, "ta@psu.edu", "CHEM110", 1, LENIENT).await.unwrap().is_eligible());
}

#[tokio::test]
async fn unknown_section_is_reported() {
    let pool = pool().await;
    course(&pool, "PHYS211", None, &[(1, 10)]).await;
    student(&pool, "ab@psu.edu").await;

    assert_eq!(
        enroll(&pool, "ab@psu.edu", "PHYS211", 9, LENIENT).await.unwrap(),
        EnrollDecision::SectionNotFound
    );
    assert_eq!(
        enroll(&pool, "ab@psu.edu", "NOPE101", 1, LENIENT).await.unwrap(),
        EnrollDecision::SectionNotFound
    );
}

#[tokio::test]
async fn can_enroll_does_not_write() {
    let pool = pool().await;
    course(&pool, "PHYS211", None, &[(1, 10)]).await;
    student(&pool, "ab@psu.edu").await;

    let decision = can_enroll(&pool, "ab@psu.edu", "PHYS211", 1, LENIENT).await.unwrap();
    assert!(decision.is_eligible());
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM Enrolls").await, 0);
}

#[tokio::test]
async fn enrolling_creates_null_grades_for_existing_assignments() {
    let pool = pool().await;
    course(&pool, "CMPSC431W", None, &[(1, 30), (2, 30)]).await;
    assignment(&pool, AssignmentKind::Homework, "CMPSC431W", 1).await;
    assignment(&pool, AssignmentKind::Homework, "CMPSC431W", 1).await;
    assignment(&pool, AssignmentKind::Exam, "CMPSC431W", 1).await;
    assignment(&pool, AssignmentKind::Exam, "CMPSC431W", 2).await;
    student(&pool, "ab@psu.edu").await;

    enroll(&pool, "ab@psu.edu", "CMPSC431W", 1, LENIENT).await.unwrap();

    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM Homework_Grades WHERE student_email = 'ab@psu.edu' AND grade IS NULL").await,
        2
    );
    // the section-2 exam is not theirs
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM Exam_Grades WHERE student_email = 'ab@psu.edu'").await,
        1
    );
}
