use db::DBService;

pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod middleware;
pub mod routes;

/// Shared request state handed to every handler through axum's `State`.
#[derive(Clone)]
pub struct AppState {
    db: DBService,
}

impl AppState {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }
}
