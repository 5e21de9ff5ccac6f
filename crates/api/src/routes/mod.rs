//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod accounts;
pub mod cash_pool;
pub mod closings;
pub mod health;
pub mod journal;
pub mod obligations;
pub mod payments;
pub mod sessions;

/// Creates the API router: public health plus token-protected treasury routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(accounts::routes())
        .merge(obligations::routes())
        .merge(payments::routes())
        .merge(cash_pool::routes())
        .merge(journal::routes())
        .merge(sessions::routes())
        .merge(closings::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new().merge(health::routes()).merge(protected_routes)
}
