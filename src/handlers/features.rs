//! AI feature endpoints
//!
//! Embedding, scoring, email, project and profile processing. The request
//! contracts are validated, the pipelines themselves are not built yet and
//! respond with `501 Not Implemented`.

use crate::models::schemas::*;
use crate::utils::error::helpers::not_implemented_error;
use crate::utils::error::AppResult;
use axum::Json;
use tracing::debug;

/// POST /embed
pub async fn generate_embeddings(Json(payload): Json<EmbedRequest>) -> AppResult<Json<EmbedResponse>> {
    debug!("Embedding request for {} texts (normalize: {})", payload.texts.len(), payload.normalize);
    Err(not_implemented_error("Embedding generation not implemented yet."))
}

/// POST /score
///
/// Will combine semantic, compatibility and feasibility scores per profile.
pub async fn score_profiles(Json(payload): Json<ScoreRequest>) -> AppResult<Json<ScoreResponse>> {
    debug!(
        "Scoring request for {} profiles ({:?})",
        payload.profiles.len(),
        payload.rerank_strategy
    );
    Err(not_implemented_error("Scoring pipeline not implemented yet."))
}

/// POST /email
pub async fn generate_email(Json(payload): Json<EmailRequest>) -> AppResult<Json<EmailResponse>> {
    debug!("Email request for profile {} ({:?})", payload.profile.profile_id, payload.tone);
    Err(not_implemented_error("Email generation not implemented yet."))
}

/// POST /project
pub async fn generate_projects(Json(payload): Json<ProjectRequest>) -> AppResult<Json<ProjectResponse>> {
    debug!(
        "Project request for profile {} ({:?})",
        payload.profile.profile_id, payload.collaboration_horizon
    );
    Err(not_implemented_error("Project idea generation not implemented yet."))
}

/// POST /process-profile
pub async fn process_profile(
    Json(payload): Json<ProcessProfileRequest>,
) -> AppResult<Json<ProcessProfileResponse>> {
    debug!("Profile processing request for {}", payload.profile.profile_id);
    Err(not_implemented_error("Profile processing not implemented yet."))
}
