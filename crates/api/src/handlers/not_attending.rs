//! Redemption of the single-use "not attending" link from reminder emails.
//!
//! Unauthenticated: the token is the capability. Every outcome redirects to
//! the web app.

use axum::extract::{Query, State};
use axum::response::Redirect;
use chrono::Utc;
use tutorhub_core::tokens::{REDIRECT_CONFIRMED, REDIRECT_EXPIRED, REDIRECT_INVALID};
use tutorhub_db::models::token::RedeemOutcome;
use tutorhub_db::repositories::TokenRepo;
use uuid::Uuid;

use crate::error::AppResult;
use crate::query::TokenParams;
use crate::state::AppState;

/// GET /not-attending?token=
pub async fn redeem(
    State(state): State<AppState>,
    Query(params): Query<TokenParams>,
) -> AppResult<Redirect> {
    let target = match params.token.as_deref().map(Uuid::parse_str) {
        Some(Ok(token)) => match TokenRepo::redeem(&state.pool, token, Utc::now()).await? {
            RedeemOutcome::Redeemed(attendance) => {
                tracing::info!(
                    user_id = attendance.user_id,
                    event_id = attendance.event_id,
                    "Marked not attending from email link",
                );
                REDIRECT_CONFIRMED
            }
            RedeemOutcome::Expired => {
                tracing::info!(token = %token, "Expired not-attending token");
                REDIRECT_EXPIRED
            }
            RedeemOutcome::NotFound => REDIRECT_INVALID,
        },
        _ => REDIRECT_INVALID,
    };

    Ok(Redirect::to(&format!("{}{target}", state.config.app_url)))
}
