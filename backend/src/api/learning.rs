//! Lesson catalog, quiz submission and progress endpoints

use crate::api::utils::{require_role, require_user, ApiState};
use crate::auth::AuthUser;
use crate::content::{self, Lesson, ProgressSummary};
use crate::db::Role;
use crate::error::AppError;
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Lesson catalog
#[derive(Debug, Serialize)]
pub struct LessonsResponse {
    /// Always true
    pub success: bool,
    /// All lessons
    pub lessons: &'static [Lesson],
}

/// Quiz answers for one lesson
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    /// Lesson being answered
    pub lesson_id: String,
    /// Chosen option per question, in question order
    pub answers: Vec<i64>,
}

/// Graded quiz
#[derive(Debug, Serialize)]
pub struct QuizResult {
    /// Always true
    pub success: bool,
    /// Correct answers
    pub score: usize,
    /// Questions in the lesson
    pub total: usize,
    /// Whether the pass threshold was reached
    pub passed: bool,
}

/// Progress summary with the success flag
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    /// Always true
    pub success: bool,
    /// Aggregated progress
    #[serde(flatten)]
    pub summary: ProgressSummary,
}

/// GET /api/learning/lessons - Lesson catalog
pub async fn list_lessons() -> Json<LessonsResponse> {
    Json(LessonsResponse {
        success: true,
        lessons: content::lessons(),
    })
}

/// POST /api/learning/submit - Grade and record a quiz
pub async fn submit_quiz(
    State(state): State<ApiState>,
    auth: AuthUser,
    Json(submission): Json<QuizSubmission>,
) -> Result<Json<QuizResult>, AppError> {
    let user = require_user(&state, &auth).await?;
    let lesson = content::find_lesson(&submission.lesson_id)
        .ok_or_else(|| AppError::NotFound("Lesson not found".to_string()))?;

    let grade = lesson.grade(&submission.answers);
    state
        .db
        .append_progress(
            &user.id,
            lesson.id,
            grade.score as i64,
            grade.total as i64,
            grade.passed,
        )
        .await?;

    info!(
        user_id = %user.id,
        lesson_id = %lesson.id,
        score = grade.score,
        total = grade.total,
        passed = grade.passed,
        "Quiz graded"
    );

    Ok(Json(QuizResult {
        success: true,
        score: grade.score,
        total: grade.total,
        passed: grade.passed,
    }))
}

async fn progress_for(state: &ApiState, user_id: &str) -> Result<Json<ProgressResponse>, AppError> {
    let attempts = state.db.get_progress(user_id).await?;
    Ok(Json(ProgressResponse {
        success: true,
        summary: ProgressSummary::from_records(attempts, content::lessons().len()),
    }))
}

/// GET /api/learning/progress - Caller's own progress
pub async fn my_progress(
    State(state): State<ApiState>,
    auth: AuthUser,
) -> Result<Json<ProgressResponse>, AppError> {
    let user = require_user(&state, &auth).await?;
    progress_for(&state, &user.id).await
}

/// GET /api/learning/progress/:child_id - A linked child's progress
pub async fn child_progress(
    State(state): State<ApiState>,
    auth: AuthUser,
    Path(child_id): Path<String>,
) -> Result<Json<ProgressResponse>, AppError> {
    let parent = require_role(
        &state,
        &auth,
        Role::Parent,
        "Only parents can view child progress",
    )
    .await?;
    if !state.db.is_linked(&parent.id, &child_id).await? {
        return Err(AppError::Forbidden(
            "Not linked to this child".to_string(),
        ));
    }
    progress_for(&state, &child_id).await
}
