use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use chrono::Utc;
use validator::Validate;
use crate::core::{
    ensure_no_existing_match, evaluate, labels, match_reason, matched_user_ids, MatchError,
    MatchResponse, Matcher,
};
use crate::models::{
    CompatibilityQuery, CompatibilityResponse, CreateMatchRequest, ErrorResponse,
    FindMatchesRequest, FindMatchesResponse, HealthResponse, LabelsResponse, MatchListResponse,
    MatchRecord, MatchRecordResponse, RespondMatchRequest, UserQuery,
};
use crate::services::{BuddyRepository, RepositoryError, StoreError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub repository: BuddyRepository,
    pub matcher: Matcher,
    pub max_limit: usize,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/labels", web::get().to(get_labels))
        .route("/compatibility", web::get().to(get_compatibility))
        .route("/matches/potential", web::post().to(potential_matches))
        .route("/matches/top", web::post().to(top_matches))
        .route("/matches", web::post().to(create_match))
        .route("/matches", web::get().to(list_matches))
        .route("/matches/{id}/respond", web::post().to(respond_to_match));
}

fn error_json(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    error_json(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string())
}

/// Map a data-access failure onto an HTTP error
fn repository_error(context: &str, err: RepositoryError) -> HttpResponse {
    let status = match &err {
        RepositoryError::ProfileNotFound(_) | RepositoryError::MatchNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        RepositoryError::Match(e) => return match_error(e),
        RepositoryError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
        RepositoryError::Store(_) | RepositoryError::Decode { .. } => {
            tracing::error!("{}: {}", context, err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_json(status, context, err.to_string())
}

fn match_error(err: &MatchError) -> HttpResponse {
    let status = match err {
        MatchError::SelfMatch | MatchError::InvalidAction(_) => StatusCode::BAD_REQUEST,
        MatchError::NotParticipant(_) => StatusCode::FORBIDDEN,
        MatchError::AlreadyExists(..) | MatchError::AlreadyResolved(_) => StatusCode::CONFLICT,
    };
    error_json(status, "Match rule violated", err.to_string())
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = match state.repository.store().ping().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::warn!("Store health probe failed: {}", e);
            "degraded"
        }
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// Display label tables
///
/// GET /api/v1/labels
async fn get_labels() -> impl Responder {
    HttpResponse::Ok().json(LabelsResponse {
        goals: labels::table(labels::GOAL_LABELS),
        levels: labels::table(labels::LEVEL_LABELS),
        styles: labels::table(labels::STYLE_LABELS),
        time_slots: labels::table(labels::TIME_SLOT_LABELS),
        days: labels::table(labels::DAY_LABELS),
    })
}

/// Fetch, exclude, score and rank candidates for one user
async fn build_match_list(
    state: &AppState,
    user_id: &str,
    limit: Option<usize>,
) -> Result<FindMatchesResponse, RepositoryError> {
    let me = state.repository.get_profile(user_id).await?;
    let records = state.repository.matches_for(user_id).await?;
    let excluded = matched_user_ids(user_id, &records);

    tracing::debug!("Excluding {} matched users for {}", excluded.len(), user_id);

    let candidates = state.repository.list_profiles().await?;
    let result = state
        .matcher
        .find_matches(user_id, &me.attributes, candidates, &excluded, limit);

    tracing::info!(
        "Returning {} matches for user {} ({} scored of {} candidates)",
        result.matches.len(),
        user_id,
        result.scored_candidates,
        result.total_candidates
    );

    Ok(FindMatchesResponse {
        matches: result.matches,
        total_candidates: result.total_candidates,
        scored_candidates: result.scored_candidates,
    })
}

/// Potential matches endpoint
///
/// POST /api/v1/matches/potential
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "limit": 20
/// }
/// ```
///
/// Without a limit every candidate scoring above the threshold is returned.
async fn potential_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let limit = req.limit.map(|l| (l as usize).min(state.max_limit));

    match build_match_list(&state, &req.user_id, limit).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => repository_error("Failed to load potential matches", e),
    }
}

/// Top matches endpoint
///
/// POST /api/v1/matches/top
///
/// Same body as the potential matches endpoint; the limit defaults to the
/// configured top-N.
async fn top_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let limit = req
        .limit
        .map(|l| l as usize)
        .unwrap_or(state.matcher.rules().default_limit)
        .min(state.max_limit);

    match build_match_list(&state, &req.user_id, Some(limit)).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => repository_error("Failed to load top matches", e),
    }
}

/// Compatibility breakdown between two users
///
/// GET /api/v1/compatibility?userId={userId}&otherUserId={otherUserId}
async fn get_compatibility(
    state: web::Data<AppState>,
    query: web::Query<CompatibilityQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let profiles = tokio::try_join!(
        state.repository.get_profile(&query.user_id),
        state.repository.get_profile(&query.other_user_id),
    );

    let (me, other) = match profiles {
        Ok(pair) => pair,
        Err(e) => return repository_error("Failed to load profiles", e),
    };

    let compatibility = evaluate(&me.attributes, &other.attributes);
    let match_reasons = compatibility.criteria.iter().map(match_reason).collect();

    HttpResponse::Ok().json(CompatibilityResponse {
        user_id: me.user_id,
        other_user_id: other.user_id,
        compatibility,
        match_reasons,
    })
}

/// Create a pending match with a score snapshot
///
/// POST /api/v1/matches
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "matchedUserId": "string"
/// }
/// ```
async fn create_match(
    state: web::Data<AppState>,
    req: web::Json<CreateMatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match open_match(&state, &req.user_id, &req.matched_user_id).await {
        Ok(record) => {
            tracing::info!(
                "User {} started a match with {} (score {:?})",
                record.user_id,
                record.matched_user_id,
                record.compatibility_score
            );
            HttpResponse::Created().json(MatchRecordResponse { record })
        }
        Err(e) => repository_error("Failed to create match", e),
    }
}

async fn open_match(
    state: &AppState,
    user_id: &str,
    matched_user_id: &str,
) -> Result<MatchRecord, RepositoryError> {
    if user_id == matched_user_id {
        return Err(MatchError::SelfMatch.into());
    }

    let (me, other) = tokio::try_join!(
        state.repository.get_profile(user_id),
        state.repository.get_profile(matched_user_id),
    )?;

    let existing = state.repository.matches_for(user_id).await?;
    ensure_no_existing_match(user_id, matched_user_id, &existing)?;

    let snapshot = evaluate(&me.attributes, &other.attributes).score;
    let record = MatchRecord::new_pending(user_id, matched_user_id, Some(snapshot), Utc::now())?;

    state.repository.insert_match(&record).await
}

/// Accept or reject a pending match
///
/// POST /api/v1/matches/{id}/respond
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "action": "accept|reject"
/// }
/// ```
async fn respond_to_match(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<RespondMatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let response: MatchResponse = match req.action.parse() {
        Ok(r) => r,
        Err(e) => return match_error(&e),
    };

    let match_id = path.into_inner();
    match settle_match(&state, &match_id, &req.user_id, response).await {
        Ok(record) => {
            tracing::info!("Match {} is now {}", record.id, record.status);
            HttpResponse::Ok().json(MatchRecordResponse { record })
        }
        Err(e) => repository_error("Failed to update match", e),
    }
}

async fn settle_match(
    state: &AppState,
    match_id: &str,
    responder: &str,
    response: MatchResponse,
) -> Result<MatchRecord, RepositoryError> {
    let mut record = state.repository.get_match(match_id).await?;
    record.respond(responder, response, Utc::now())?;

    state
        .repository
        .resolve_match(&record.id, record.status, record.updated_at)
        .await
}

/// All match records involving a user
///
/// GET /api/v1/matches?userId={userId}
async fn list_matches(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    match state.repository.matches_for(&query.user_id).await {
        Ok(matches) => HttpResponse::Ok().json(MatchListResponse {
            user_id: query.user_id.clone(),
            count: matches.len(),
            matches,
        }),
        Err(e) => repository_error("Failed to load matches", e),
    }
}
