use axum::Router;

use crate::state::AppState;

pub mod analytics;
pub mod auth;
pub mod chat;
pub mod dashboards;
pub mod donors;
pub mod feedback;
pub mod food_items;
pub mod ngos;
pub mod requests;
pub mod transactions;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(auth::router())
        .merge(donors::router())
        .merge(ngos::router())
        .merge(food_items::router())
        .merge(requests::router())
        .merge(transactions::router())
        .merge(feedback::router())
        .merge(analytics::router())
        .merge(chat::router());

    Router::new()
        .nest("/api", api)
        .merge(dashboards::router())
        .with_state(state)
}
