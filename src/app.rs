use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{AdminGate, Authenticator, PasswordHasher, SessionIssuer};
use crate::config::AppConfig;
use crate::database::UserStore;
use crate::handlers::{elevated, protected, public};
use crate::middleware::require_session;

/// Everything a handler needs, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn UserStore>,
    pub hasher: PasswordHasher,
    pub authenticator: Authenticator,
    pub sessions: Arc<SessionIssuer>,
    pub gate: AdminGate,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn UserStore>) -> Self {
        let hasher = if config.features.hashing_enabled {
            PasswordHasher::new(config.security.bcrypt_cost)
        } else {
            PasswordHasher::plaintext()
        };
        let sessions = Arc::new(SessionIssuer::from_config(&config.security));

        Self {
            authenticator: Authenticator::new(store.clone(), hasher.clone()),
            gate: AdminGate::new(store.clone()),
            config: Arc::new(config),
            store,
            hasher,
            sessions,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let public_routes: Router<AppState> = Router::new()
        .route("/health", get(public::health))
        .route("/api/login", post(public::login))
        .route("/api/logout", get(public::logout));

    let mut api_routes: Router<AppState> = Router::new()
        .route("/api/showusers", get(protected::show_users))
        .route("/api/:username/createuser", post(elevated::create_user))
        .route("/api/:username/deleteuser", post(elevated::delete_user))
        .route("/api/:username/updateuser", post(elevated::update_user));

    if state.config.features.sessions_enabled {
        api_routes = api_routes.route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));
    }

    let mut router = public_routes.merge(api_routes);

    if state.config.api.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}
