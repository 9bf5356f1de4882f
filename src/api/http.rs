// SPDX-License-Identifier: GPL-3.0-only
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderValue, Method, Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span};
use uuid::Uuid;

use crate::api::handlers::{ApiHandlers, ApiReply, PlotQuery, PlotView, UserQuery, WishlistStatus};
use crate::registry::{PlotData, PlotId, PlotRegistry, WishlistEntry, WishlistRegistry};

pub struct HttpServer {
    handlers: ApiHandlers,
    addr: SocketAddr,
    cors_allowed_origin: Option<String>,
}

impl HttpServer {
    pub fn new(
        plots: Arc<dyn PlotRegistry>,
        wishlist: Arc<dyn WishlistRegistry>,
        addr: SocketAddr,
        cors_allowed_origin: Option<String>,
    ) -> Self {
        Self {
            handlers: ApiHandlers::new(plots, wishlist),
            addr,
            cors_allowed_origin,
        }
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.addr).await?;
        self.serve_on(listener).await
    }

    /// Serve on an already-bound listener
    pub async fn serve_on(self, listener: TcpListener) -> anyhow::Result<()> {
        let app = build_router(Arc::new(self.handlers), self.cors_allowed_origin.as_deref())?;

        info!(addr = %listener.local_addr()?, "Starting HTTP server");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

pub fn build_router(handlers: Arc<ApiHandlers>, cors_allowed_origin: Option<&str>) -> anyhow::Result<Router> {
    let app = Router::new()
        .route("/health", get(ApiHandlers::health))
        .route("/api/plots", get(list_plots_handler).post(create_plot_handler))
        .route(
            "/api/plots/:id",
            get(get_plot_handler).put(update_plot_handler).delete(delete_plot_handler),
        )
        .route("/api/wishlist", get(get_wishlist_handler))
        .route("/api/wishlist/entries", get(list_wishlist_entries_handler))
        .route(
            "/api/wishlist/:plot_id",
            post(add_to_wishlist_handler).delete(remove_from_wishlist_handler),
        )
        .route("/api/wishlist/check/:plot_id", get(check_wishlist_handler))
        .with_state(handlers)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                info_span!(
                    "http_request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        );

    let app = match cors_allowed_origin {
        Some(origin) => app.layer(cors_layer(origin)?),
        None => app,
    };

    Ok(app)
}

fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    Ok(CorsLayer::new()
        .allow_origin(origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]))
}

async fn list_plots_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Query(query): Query<PlotQuery>,
) -> ApiReply<Vec<PlotView>> {
    handlers.list_plots(query).await
}

async fn get_plot_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Path(id): Path<PlotId>,
) -> ApiReply<PlotView> {
    handlers.get_plot(id).await
}

async fn create_plot_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Json(data): Json<PlotData>,
) -> ApiReply<PlotView> {
    handlers.create_plot(data).await
}

async fn update_plot_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Path(id): Path<PlotId>,
    Json(data): Json<PlotData>,
) -> ApiReply<PlotView> {
    handlers.update_plot(id, data).await
}

async fn delete_plot_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Path(id): Path<PlotId>,
) -> StatusCode {
    handlers.delete_plot(id).await
}

async fn get_wishlist_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Query(user): Query<UserQuery>,
) -> ApiReply<Vec<PlotView>> {
    handlers.get_wishlist(user).await
}

async fn list_wishlist_entries_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Query(user): Query<UserQuery>,
) -> ApiReply<Vec<WishlistEntry>> {
    handlers.list_wishlist_entries(user).await
}

async fn add_to_wishlist_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Path(plot_id): Path<PlotId>,
    Query(user): Query<UserQuery>,
) -> ApiReply<String> {
    handlers.add_to_wishlist(user, plot_id).await
}

async fn remove_from_wishlist_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Path(plot_id): Path<PlotId>,
    Query(user): Query<UserQuery>,
) -> ApiReply<String> {
    handlers.remove_from_wishlist(user, plot_id).await
}

async fn check_wishlist_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Path(plot_id): Path<PlotId>,
    Query(user): Query<UserQuery>,
) -> ApiReply<WishlistStatus> {
    handlers.check_wishlist(user, plot_id).await
}
