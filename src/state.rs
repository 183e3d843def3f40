use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::store::Store;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { store, verifier }
    }
}
