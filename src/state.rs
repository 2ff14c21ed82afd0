use crate::{config::Config, store::Models};
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub models: Models,
    pub config: Config,
}

impl FromRef<AppState> for Models {
    fn from_ref(state: &AppState) -> Self {
        state.models.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
