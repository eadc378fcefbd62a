// Provider listing for the admin surface. Registration happens at boot;
// this endpoint only reports what is wired.

use axum::{extract::State, Json};

use crate::adapters::http::{dto::ProviderView, state::AppState};

/// GET /providers
pub async fn list(State(state): State<AppState>) -> Json<Vec<ProviderView>> {
    let providers = state
        .bridge
        .names()
        .into_iter()
        .map(|name| ProviderView { name })
        .collect();
    Json(providers)
}
