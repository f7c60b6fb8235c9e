//! Shared fixtures for integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use coursectl_server::auth::hash_password;
use coursectl_server::db::{
    create_pool, open_in_memory, schema, AssignmentRepo, CourseRepo, NewCourse, NewProfessor,
    NewStudent, UserRepo,
};
use coursectl_server::models::{AssignmentKind, Content, DropDeadline};
use sqlx::SqlitePool;

pub const PASSWORD: &str = "hunter22";

pub async fn pool() -> SqlitePool {
    // RUST_LOG=coursectl_server=debug shows repo logging under --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    open_in_memory().await.expect("in-memory database")
}

/// File-backed pool (WAL, several connections) with the schema applied.
pub async fn file_pool(dir: &tempfile::TempDir) -> SqlitePool {
    let path = dir.path().join("campus.db");
    let pool = create_pool(&path.display().to_string())
        .await
        .expect("file database");
    schema::apply(&pool).await.expect("schema");
    pool
}

pub async fn student(pool: &SqlitePool, email: &str) {
    UserRepo::new(pool)
        .create_student(&NewStudent {
            email: email.into(),
            password_hash: hash_password(PASSWORD),
            name: format!("Student {email}"),
            age: Some(20),
            ..Default::default()
        })
        .await
        .expect("create student");
}

pub async fn professor(pool: &SqlitePool, email: &str, team: Option<i64>) {
    UserRepo::new(pool)
        .create_professor(&NewProfessor {
            email: email.into(),
            password_hash: hash_password(PASSWORD),
            name: format!("Prof {email}"),
            office_address: Some("101 Keller".into()),
            department: Some("CS".into()),
            title: Some("Professor".into()),
            ..Default::default()
        })
        .await
        .expect("create professor");
    if let Some(team) = team {
        CourseRepo::new(pool)
            .add_professor_to_team(email, team)
            .await
            .expect("join team");
    }
}

pub async fn ta(pool: &SqlitePool, email: &str, team: i64) {
    student(pool, email).await;
    CourseRepo::new(pool)
        .add_ta_to_team(email, team)
        .await
        .expect("join team");
}

/// Course with the given team and `(sec_no, max_limit)` sections.
pub async fn course(pool: &SqlitePool, id: &str, team: Option<i64>, sections: &[(i64, i64)]) {
    let repo = CourseRepo::new(pool);
    repo.create(&NewCourse {
        course_id: id.into(),
        course_name: format!("{id} course"),
        course_desc: Some("fixture".into()),
        teaching_team_id: team,
    })
    .await
    .expect("create course");
    for &(sec_no, max_limit) in sections {
        repo.add_section(id, sec_no, max_limit)
            .await
            .expect("create section");
    }
}

pub async fn deadline(pool: &SqlitePool, id: &str, date: NaiveDate) {
    CourseRepo::new(pool)
        .set_drop_deadline(id, Some(DropDeadline::from_date(date)))
        .await
        .expect("set deadline");
}

pub async fn assignment(pool: &SqlitePool, kind: AssignmentKind, id: &str, sec_no: i64) -> i64 {
    let details = Content::new("details", "fixture assignment").expect("valid details");
    AssignmentRepo::new(pool)
        .add(kind, id, sec_no, &details)
        .await
        .expect("create assignment")
        .assignment
        .number
}

pub async fn count(pool: &SqlitePool, sql: &str) -> i64 {
    let (n,): (i64,) = sqlx::query_as(sql).fetch_one(pool).await.expect("count query");
    n
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
