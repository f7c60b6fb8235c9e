//! Forum repository
//!
//! Flat two-level forum: posts per course, comments per post. Numbers are
//! issued per scope from `Forum_Sequences`, so a number freed by a drop is
//! never handed out again.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use super::DbError;
use crate::db::begin_write;
use crate::models::Content;

/// Post record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Post {
    pub course_id: String,
    pub post_no: i64,
    pub student_email: String,
    pub post_content: String,
}

/// Comment record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub course_id: String,
    pub post_no: i64,
    pub comment_no: i64,
    pub student_email: String,
    pub comment_content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub comment_no: i64,
    pub author_email: String,
    pub author_name: Option<String>,
    pub content: String,
}

/// Post with its comments, for the course forum page
#[derive(Debug, Clone, Serialize)]
pub struct PostWithComments {
    pub post_no: i64,
    pub author_email: String,
    pub author_name: Option<String>,
    pub content: String,
    pub comments: Vec<CommentView>,
}

#[derive(FromRow)]
struct PostRow {
    post_no: i64,
    student_email: String,
    author_name: Option<String>,
    post_content: String,
}

#[derive(FromRow)]
struct CommentRow {
    post_no: i64,
    comment_no: i64,
    student_email: String,
    author_name: Option<String>,
    comment_content: String,
}

fn post_scope(course_id: &str) -> String {
    format!("post:{course_id}")
}

fn comment_scope(course_id: &str, post_no: i64) -> String {
    format!("comment:{course_id}:{post_no}")
}

/// Issue the next number for a scope: one past both the highest number in
/// use and the highest ever issued.
async fn next_number(
    conn: &mut SqliteConnection,
    scope: &str,
    highest_in_use: i64,
) -> Result<i64, DbError> {
    let issued: Option<(i64,)> = sqlx::query_as("SELECT last_no FROM Forum_Sequences WHERE scope = ?")
        .bind(scope)
        .fetch_optional(&mut *conn)
        .await?;

    let next = highest_in_use.max(issued.map_or(0, |(n,)| n)) + 1;

    sqlx::query(
        r#"
        INSERT INTO Forum_Sequences (scope, last_no) VALUES (?, ?)
        ON CONFLICT (scope) DO UPDATE SET last_no = excluded.last_no
        "#,
    )
    .bind(scope)
    .bind(next)
    .execute(&mut *conn)
    .await?;

    Ok(next)
}

/// Delete an author's comments and posts in a course. Comments by others,
/// including those on the deleted posts, are left in place.
///
/// Returns `(posts_removed, comments_removed)`.
pub(crate) async fn delete_by_author(
    conn: &mut SqliteConnection,
    course_id: &str,
    email: &str,
) -> Result<(u64, u64), DbError> {
    let comments = sqlx::query("DELETE FROM Comments WHERE course_id = ? AND student_email = ?")
        .bind(course_id)
        .bind(email)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    let posts = sqlx::query("DELETE FROM Posts WHERE course_id = ? AND student_email = ?")
        .bind(course_id)
        .bind(email)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok((posts, comments))
}

/// Forum repository
pub struct ForumRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ForumRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the next post in a course (atomic with its number).
    pub async fn create_post(
        &self,
        course_id: &str,
        author_email: &str,
        content: &Content,
    ) -> Result<Post, DbError> {
        let mut tx = begin_write(self.pool).await?;

        let (courses,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM Courses WHERE course_id = ?")
            .bind(course_id)
            .fetch_one(&mut *tx)
            .await?;
        if courses == 0 {
            return Err(DbError::not_found("course", course_id));
        }

        let (highest,): (i64,) =
            sqlx::query_as("SELECT COALESCE(MAX(post_no), 0) FROM Posts WHERE course_id = ?")
                .bind(course_id)
                .fetch_one(&mut *tx)
                .await?;
        let post_no = next_number(&mut tx, &post_scope(course_id), highest).await?;

        let post: Post = sqlx::query_as(
            r#"
            INSERT INTO Posts (course_id, post_no, student_email, post_content)
            VALUES (?, ?, ?, ?)
            RETURNING course_id, post_no, student_email, post_content
            "#,
        )
        .bind(course_id)
        .bind(post_no)
        .bind(author_email)
        .bind(content.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(course = course_id, post_no, author = author_email, "post created");
        Ok(post)
    }

    /// Create the next comment on a post (atomic with its number).
    pub async fn create_comment(
        &self,
        course_id: &str,
        post_no: i64,
        author_email: &str,
        content: &Content,
    ) -> Result<Comment, DbError> {
        let mut tx = begin_write(self.pool).await?;

        let (posts,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM Posts WHERE course_id = ? AND post_no = ?")
                .bind(course_id)
                .bind(post_no)
                .fetch_one(&mut *tx)
                .await?;
        if posts == 0 {
            return Err(DbError::not_found("post", format!("{course_id}#{post_no}")));
        }

        let (highest,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(comment_no), 0) FROM Comments WHERE course_id = ? AND post_no = ?",
        )
        .bind(course_id)
        .bind(post_no)
        .fetch_one(&mut *tx)
        .await?;
        let comment_no = next_number(&mut tx, &comment_scope(course_id, post_no), highest).await?;

        let comment: Comment = sqlx::query_as(
            r#"
            INSERT INTO Comments (course_id, post_no, comment_no, student_email, comment_content)
            VALUES (?, ?, ?, ?, ?)
            RETURNING course_id, post_no, comment_no, student_email, comment_content
            "#,
        )
        .bind(course_id)
        .bind(post_no)
        .bind(comment_no)
        .bind(author_email)
        .bind(content.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(course = course_id, post_no, comment_no, author = author_email, "comment created");
        Ok(comment)
    }

    /// Posts of a course in order, each with its comments in order.
    ///
    /// Two queries total; comments are grouped in memory.
    pub async fn list(&self, course_id: &str) -> Result<Vec<PostWithComments>, DbError> {
        let posts: Vec<PostRow> = sqlx::query_as(
            r#"
            SELECT p.post_no, p.student_email, u.name AS author_name, p.post_content
            FROM Posts p
            LEFT JOIN User u ON u.email = p.student_email
            WHERE p.course_id = ?
            ORDER BY p.post_no
            "#,
        )
        .bind(course_id)
        .fetch_all(self.pool)
        .await?;

        let comments: Vec<CommentRow> = sqlx::query_as(
            r#"
            SELECT c.post_no, c.comment_no, c.student_email, u.name AS author_name, c.comment_content
            FROM Comments c
            LEFT JOIN User u ON u.email = c.student_email
            WHERE c.course_id = ?
            ORDER BY c.post_no, c.comment_no
            "#,
        )
        .bind(course_id)
        .fetch_all(self.pool)
        .await?;

        let mut by_post: HashMap<i64, Vec<CommentView>> = HashMap::new();
        for c in comments {
            by_post.entry(c.post_no).or_default().push(CommentView {
                comment_no: c.comment_no,
                author_email: c.student_email,
                author_name: c.author_name,
                content: c.comment_content,
            });
        }

        Ok(posts
            .into_iter()
            .map(|p| PostWithComments {
                comments: by_post.remove(&p.post_no).unwrap_or_default(),
                post_no: p.post_no,
                author_email: p.student_email,
                author_name: p.author_name,
                content: p.post_content,
            })
            .collect())
    }
}
