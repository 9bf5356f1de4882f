// SPDX-License-Identifier: GPL-3.0-only
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::registry::{
    FieldError, Plot, PlotData, PlotId, PlotRegistry, RegistryError, WishlistEntry, WishlistRegistry,
    GUEST_USER_ID,
};

/// Query parameters for listing plots; `search` wins over `location`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PlotQuery {
    pub search: Option<String>,
    pub location: Option<String>,
}

/// Caller identity for wishlist routes
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl UserQuery {
    /// Falls back to the guest user when absent or blank
    pub fn user_id(&self) -> &str {
        match self.user_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => GUEST_USER_ID,
        }
    }
}

/// Plot as returned by the API, with its contact link
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotView {
    #[serde(flatten)]
    pub plot: Plot,
    pub whatsapp_link: String,
}

impl From<Plot> for PlotView {
    fn from(plot: Plot) -> Self {
        let whatsapp_link = plot.whatsapp_link();
        Self { plot, whatsapp_link }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistStatus {
    pub is_in_wishlist: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            errors: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            errors: Vec::new(),
        }
    }

    pub fn invalid(errors: Vec<FieldError>) -> Self {
        let message = errors
            .first()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| "Validation failed".to_string());
        Self {
            errors,
            ..Self::error(message)
        }
    }
}

pub type ApiReply<T> = (StatusCode, Json<ApiResponse<T>>);

fn ok<T>(status: StatusCode, data: T) -> ApiReply<T> {
    (status, Json(ApiResponse::success(data)))
}

fn fail<T>(status: StatusCode, message: &str) -> ApiReply<T> {
    (status, Json(ApiResponse::error(message)))
}

/// Map a registry failure to a response; store errors are logged and reported generically
fn registry_failure<T>(err: RegistryError, action: &str) -> ApiReply<T> {
    match err {
        RegistryError::Validation(errors) => {
            warn!(action, error_count = errors.len(), "Rejected invalid plot payload");
            (StatusCode::BAD_REQUEST, Json(ApiResponse::invalid(errors)))
        }
        RegistryError::NotFound(_) => fail(StatusCode::NOT_FOUND, "Plot not found"),
        e @ (RegistryError::Store(_) | RegistryError::Corrupt(_)) => {
            error!(error = %e, action, "Registry operation failed");
            fail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

fn views(plots: Vec<Plot>) -> Vec<PlotView> {
    plots.into_iter().map(PlotView::from).collect()
}

pub struct ApiHandlers {
    plots: Arc<dyn PlotRegistry>,
    wishlist: Arc<dyn WishlistRegistry>,
}

impl ApiHandlers {
    pub fn new(plots: Arc<dyn PlotRegistry>, wishlist: Arc<dyn WishlistRegistry>) -> Self {
        Self { plots, wishlist }
    }
}

impl ApiHandlers {
    pub async fn health() -> Json<ApiResponse<&'static str>> {
        Json(ApiResponse::success("ok"))
    }

    pub async fn list_plots(&self, query: PlotQuery) -> ApiReply<Vec<PlotView>> {
        let search = query.search.filter(|s| !s.trim().is_empty());
        let location = query.location.filter(|l| !l.trim().is_empty());

        let result = match (search, location) {
            (Some(keyword), _) => self.plots.search(Some(&keyword)).await,
            (None, Some(location)) => self.plots.search_by_location(&location).await,
            (None, None) => self.plots.list_active().await,
        };

        match result {
            Ok(plots) => ok(StatusCode::OK, views(plots)),
            Err(e) => registry_failure(e, "list_plots"),
        }
    }

    pub async fn get_plot(&self, id: PlotId) -> ApiReply<PlotView> {
        match self.plots.get_by_id(id).await {
            Ok(Some(plot)) => ok(StatusCode::OK, plot.into()),
            Ok(None) => fail(StatusCode::NOT_FOUND, "Plot not found"),
            Err(e) => registry_failure(e, "get_plot"),
        }
    }

    pub async fn create_plot(&self, data: PlotData) -> ApiReply<PlotView> {
        match self.plots.create(data).await {
            Ok(plot) => ok(StatusCode::CREATED, plot.into()),
            Err(e) => registry_failure(e, "create_plot"),
        }
    }

    pub async fn update_plot(&self, id: PlotId, data: PlotData) -> ApiReply<PlotView> {
        match self.plots.update(id, data).await {
            Ok(plot) => ok(StatusCode::OK, plot.into()),
            Err(e) => registry_failure(e, "update_plot"),
        }
    }

    /// Soft delete; an unknown id still answers 204
    pub async fn delete_plot(&self, id: PlotId) -> StatusCode {
        match self.plots.soft_delete(id).await {
            Ok(true) => StatusCode::NO_CONTENT,
            Ok(false) => {
                info!(plot_id = id, "Delete requested for unknown plot");
                StatusCode::NO_CONTENT
            }
            Err(e) => {
                error!(error = %e, plot_id = id, "Failed to delete plot");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub async fn get_wishlist(&self, user: UserQuery) -> ApiReply<Vec<PlotView>> {
        match self.wishlist.get_user_wishlist(user.user_id()).await {
            Ok(plots) => ok(StatusCode::OK, views(plots)),
            Err(e) => registry_failure(e, "get_wishlist"),
        }
    }

    pub async fn list_wishlist_entries(&self, user: UserQuery) -> ApiReply<Vec<WishlistEntry>> {
        match self.wishlist.list_entries(user.user_id()).await {
            Ok(entries) => ok(StatusCode::OK, entries),
            Err(e) => registry_failure(e, "list_wishlist_entries"),
        }
    }

    pub async fn add_to_wishlist(&self, user: UserQuery, plot_id: PlotId) -> ApiReply<String> {
        match self.wishlist.add_to_wishlist(user.user_id(), plot_id).await {
            Ok(true) => ok(StatusCode::OK, "Added to wishlist successfully".to_string()),
            Ok(false) => fail(StatusCode::BAD_REQUEST, "Failed to add to wishlist"),
            Err(e) => registry_failure(e, "add_to_wishlist"),
        }
    }

    pub async fn remove_from_wishlist(&self, user: UserQuery, plot_id: PlotId) -> ApiReply<String> {
        match self.wishlist.remove_from_wishlist(user.user_id(), plot_id).await {
            Ok(true) => ok(StatusCode::OK, "Removed from wishlist successfully".to_string()),
            Ok(false) => fail(StatusCode::BAD_REQUEST, "Failed to remove from wishlist"),
            Err(e) => registry_failure(e, "remove_from_wishlist"),
        }
    }

    pub async fn check_wishlist(&self, user: UserQuery, plot_id: PlotId) -> ApiReply<WishlistStatus> {
        match self.wishlist.is_in_wishlist(user.user_id(), plot_id).await {
            Ok(is_in_wishlist) => ok(StatusCode::OK, WishlistStatus { is_in_wishlist }),
            Err(e) => registry_failure(e, "check_wishlist"),
        }
    }
}
