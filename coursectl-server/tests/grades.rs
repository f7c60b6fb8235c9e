//! Assignment fan-out, grade entry and aggregation

mod common;

use common::*;
use coursectl_server::db::{AssignmentRepo, DbError, GradeRepo};
use coursectl_server::models::{AssignmentKind, Content};
use coursectl_server::rules::{average_grade, enroll, summarize, total_grade, CapacityPolicy};
use sqlx::SqlitePool;

async fn two_sections(pool: &SqlitePool) {
    course(pool, "STAT200", None, &[(1, 30), (2, 30)]).await;
    for (email, sec) in [("a@psu.edu", 1), ("b@psu.edu", 1), ("c@psu.edu", 2)] {
        student(pool, email).await;
        enroll(pool, email, "STAT200", sec, CapacityPolicy::Lenient).await.unwrap();
    }
}

#[tokio::test]
async fn new_homework_gets_one_null_grade_per_enrolled_student() {
    let pool = pool().await;
    two_sections(&pool).await;

    let details = Content::new("details", "Chapter 3 problems").unwrap();
    let created = AssignmentRepo::new(&pool)
        .add(AssignmentKind::Homework, "STAT200", 1, &details)
        .await
        .unwrap();

    assert_eq!(created.assignment.number, 1);
    assert_eq!(created.grade_rows, 2);
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM Homework_Grades WHERE sec_no = 1 AND hw_no = 1 AND grade IS NULL").await,
        2
    );
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM Homework_Grades WHERE sec_no = 2").await, 0);
}

#[tokio::test]
async fn numbering_is_per_section_and_kind() {
    let pool = pool().await;
    two_sections(&pool).await;

    assert_eq!(assignment(&pool, AssignmentKind::Homework, "STAT200", 1).await, 1);
    assert_eq!(assignment(&pool, AssignmentKind::Homework, "STAT200", 1).await, 2);
    assert_eq!(assignment(&pool, AssignmentKind::Homework, "STAT200", 2).await, 1);
    assert_eq!(assignment(&pool, AssignmentKind::Exam, "STAT200", 1).await, 1);

    let listed = AssignmentRepo::new(&pool)
        .list_for_section(AssignmentKind::Homework, "STAT200", 1)
        .await
        .unwrap();
    let numbers: Vec<i64> = listed.iter().map(|a| a.number).collect();
    assert_eq!(numbers, vec![1, 2]);
}

#[tokio::test]
async fn assignment_for_missing_section_is_not_found() {
    let pool = pool().await;
    two_sections(&pool).await;

    let details = Content::new("details", "orphan").unwrap();
    let err = AssignmentRepo::new(&pool)
        .add(AssignmentKind::Exam, "STAT200", 7, &details)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { resource: "section", .. }));
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM Exams").await, 0);
}

#[tokio::test]
async fn change_grade_overwrites_and_clears() {
    let pool = pool().await;
    two_sections(&pool).await;
    let hw = assignment(&pool, AssignmentKind::Homework, "STAT200", 1).await;
    let grades = GradeRepo::new(&pool);

    grades
        .set_grade(AssignmentKind::Homework, "a@psu.edu", "STAT200", 1, hw, Some(88.0))
        .await
        .unwrap();
    grades
        .set_grade(AssignmentKind::Homework, "a@psu.edu", "STAT200", 1, hw, Some(92.5))
        .await
        .unwrap();

    let sheet = grades.grade_sheet(AssignmentKind::Homework, "STAT200", 1, hw).await.unwrap();
    assert_eq!(sheet.len(), 2);
    assert_eq!(sheet[0].student_email, "a@psu.edu");
    assert_eq!(sheet[0].grade, Some(92.5));
    assert_eq!(sheet[1].grade, None);

    grades
        .set_grade(AssignmentKind::Homework, "a@psu.edu", "STAT200", 1, hw, None)
        .await
        .unwrap();
    let mine = grades
        .student_grades(AssignmentKind::Homework, "a@psu.edu", "STAT200", 1)
        .await
        .unwrap();
    assert_eq!(mine[0].grade, None);
}

#[tokio::test]
async fn change_grade_without_row_is_not_found() {
    let pool = pool().await;
    two_sections(&pool).await;
    let hw = assignment(&pool, AssignmentKind::Homework, "STAT200", 1).await;

    // c is in section 2
    let err = GradeRepo::new(&pool)
        .set_grade(AssignmentKind::Homework, "c@psu.edu", "STAT200", 1, hw, Some(50.0))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { resource: "grade", .. }));
}

#[tokio::test]
async fn totals_average_graded_items_equally() {
    let pool = pool().await;
    two_sections(&pool).await;
    let hw = assignment(&pool, AssignmentKind::Homework, "STAT200", 1).await;
    let exam = assignment(&pool, AssignmentKind::Exam, "STAT200", 1).await;
    // ungraded item stays out of the mean
    assignment(&pool, AssignmentKind::Homework, "STAT200", 1).await;

    assert_eq!(total_grade(&pool, "a@psu.edu", "STAT200").await.unwrap(), None);

    let grades = GradeRepo::new(&pool);
    grades
        .set_grade(AssignmentKind::Homework, "a@psu.edu", "STAT200", 1, hw, Some(80.0))
        .await
        .unwrap();
    grades
        .set_grade(AssignmentKind::Exam, "a@psu.edu", "STAT200", 1, exam, Some(60.0))
        .await
        .unwrap();

    let total = total_grade(&pool, "a@psu.edu", "STAT200").await.unwrap().unwrap();
    assert!((total - 70.0).abs() < 1e-9);

    let summary = summarize(&pool, "a@psu.edu", "STAT200").await.unwrap();
    assert!((summary.total_ratio().unwrap() - 0.70).abs() < 1e-9);
    assert_eq!(summary.homework_average, Some(80.0));
    assert_eq!(summary.exam_average, Some(60.0));

    // b has nothing graded
    assert_eq!(
        average_grade(&pool, AssignmentKind::Homework, "b@psu.edu", "STAT200").await.unwrap(),
        None
    );
}
