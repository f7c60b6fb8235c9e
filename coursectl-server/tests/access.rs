//! Role resolution and per-course access

mod common;

use common::*;
use coursectl_server::db::{CourseRepo, DbError, UserRepo};
use coursectl_server::models::{CourseRole, UserRole};
use coursectl_server::rules::{
    course_access, enroll, is_enrolled, is_prof_for_class, is_ta_for_class, CapacityPolicy,
};

#[tokio::test]
async fn roles_follow_profile_tables() {
    let pool = pool().await;
    student(&pool, "s@psu.edu").await;
    professor(&pool, "p@psu.edu", None).await;

    let users = UserRepo::new(&pool);
    assert_eq!(users.resolve_role("s@psu.edu").await.unwrap(), UserRole::Student);
    assert_eq!(users.resolve_role("p@psu.edu").await.unwrap(), UserRole::Professor);
    assert_eq!(users.resolve_role("nobody@psu.edu").await.unwrap(), UserRole::Unknown);
}

#[tokio::test]
async fn professor_and_ta_checks_go_through_the_team() {
    let pool = pool().await;
    course(&pool, "CMPSC431W", Some(1), &[(1, 30)]).await;
    course(&pool, "CMPSC465", Some(2), &[(1, 30)]).await;
    professor(&pool, "prof@psu.edu", Some(1)).await;
    ta(&pool, "ta@psu.edu", 1).await;

    assert!(is_prof_for_class(&pool, "prof@psu.edu", "CMPSC431W").await.unwrap());
    assert!(!is_prof_for_class(&pool, "prof@psu.edu", "CMPSC465").await.unwrap());
    assert!(is_ta_for_class(&pool, "ta@psu.edu", "CMPSC431W").await.unwrap());
    assert!(!is_ta_for_class(&pool, "ta@psu.edu", "CMPSC465").await.unwrap());
    // a TA is not a professor and the reverse
    assert!(!is_prof_for_class(&pool, "ta@psu.edu", "CMPSC431W").await.unwrap());
    assert!(!is_ta_for_class(&pool, "prof@psu.edu", "CMPSC431W").await.unwrap());
}

#[tokio::test]
async fn course_without_team_has_no_administrators() {
    let pool = pool().await;
    course(&pool, "ORPHAN1", None, &[(1, 30)]).await;
    professor(&pool, "prof@psu.edu", Some(1)).await;
    ta(&pool, "ta@psu.edu", 1).await;

    assert!(!is_prof_for_class(&pool, "prof@psu.edu", "ORPHAN1").await.unwrap());
    assert!(!is_ta_for_class(&pool, "ta@psu.edu", "ORPHAN1").await.unwrap());

    CourseRepo::new(&pool).assign_team("ORPHAN1", 1).await.unwrap();
    assert!(is_prof_for_class(&pool, "prof@psu.edu", "ORPHAN1").await.unwrap());
}

#[tokio::test]
async fn course_access_reports_the_strongest_relationship() {
    let pool = pool().await;
    course(&pool, "CMPSC431W", Some(1), &[(1, 30), (2, 30)]).await;
    professor(&pool, "prof@psu.edu", Some(1)).await;
    ta(&pool, "ta@psu.edu", 1).await;
    student(&pool, "enrolled@psu.edu").await;
    student(&pool, "visitor@psu.edu").await;
    enroll(&pool, "enrolled@psu.edu", "CMPSC431W", 2, CapacityPolicy::Lenient)
        .await
        .unwrap();

    let expected = [
        ("prof@psu.edu", CourseRole::Professor),
        ("ta@psu.edu", CourseRole::TeachingAssistant),
        ("enrolled@psu.edu", CourseRole::Enrolled),
        ("visitor@psu.edu", CourseRole::Visitor),
        ("ghost@psu.edu", CourseRole::Visitor),
    ];
    for (email, role) in expected {
        let access = course_access(&pool, email, "CMPSC431W").await.unwrap();
        assert_eq!(access.course_role(), role, "{email}");
    }

    let access = course_access(&pool, "enrolled@psu.edu", "CMPSC431W").await.unwrap();
    assert_eq!(access.section, Some(2));
    assert_eq!(access.role, UserRole::Student);
    assert!(is_enrolled(&pool, "enrolled@psu.edu", "CMPSC431W").await.unwrap());
    assert!(!is_enrolled(&pool, "visitor@psu.edu", "CMPSC431W").await.unwrap());
}

#[tokio::test]
async fn course_access_on_unknown_course_is_not_found() {
    let pool = pool().await;
    student(&pool, "s@psu.edu").await;

    let err = course_access(&pool, "s@psu.edu", "NOPE101").await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { resource: "course", .. }));
}
