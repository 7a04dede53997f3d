//! Read-only view of the loaded template groups.

use axum::{extract::State, Json};

use crate::server::AppState;

use super::models::{GroupSummary, TemplateListResponse};

/// GET /api/v1/templates - List groups and the templates they define
#[tracing::instrument(name = "http.list_templates", skip(state))]
pub async fn list_templates(State(state): State<AppState>) -> Json<TemplateListResponse> {
    let store = &state.template_store;

    let groups: Vec<GroupSummary> = store
        .group_names()
        .into_iter()
        .filter_map(|name| {
            let templates = store.group(&name).ok()?.template_names();
            Some(GroupSummary { name, templates })
        })
        .collect();

    Json(TemplateListResponse {
        total: store.template_count(),
        groups,
    })
}
