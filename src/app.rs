use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{self, SecurityConfig};
use crate::database::FarmStore;
use crate::handlers;
use crate::middleware::jwt_auth_middleware;

/// Shared handler state: the store sessions are opened from and the key
/// bearer tokens are checked against
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn FarmStore>,
    jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(store: impl FarmStore + 'static, jwt_secret: impl Into<String>) -> Self {
        Self {
            store: Arc::new(store),
            jwt_secret: Arc::from(jwt_secret.into()),
        }
    }

    pub fn store(&self) -> &dyn FarmStore {
        self.store.as_ref()
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }
}

/// Full application router
pub fn app(state: AppState) -> Router {
    let config = config::config();

    Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        // Protected
        .merge(farm_routes(&state, "/farms"))
        .merge(farm_routes(&state, "/api/v1/farms"))
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn farm_routes(state: &AppState, prefix: &str) -> axum::Router<AppState> {
    use handlers::protected::farms;

    let collection = get(farms::farms_list).post(farms::farm_create);

    Router::new()
        .route(prefix, collection.clone())
        .route(&format!("{}/", prefix), collection)
        .route(
            &format!("{}/:id", prefix),
            get(farms::farm_get)
                .put(farms::farm_update)
                .delete(farms::farm_delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
