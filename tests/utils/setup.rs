use axum::Router;
use std::sync::Arc;

use roomsync::{
    build_router, room::models::OperationLimits, AppState, InMemoryKvStore, KvStore,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestApp {
    pub router: Router,
    pub store: Option<Arc<InMemoryKvStore>>,
}

pub struct TestAppBuilder {
    with_store: bool,
    limits: OperationLimits,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            with_store: true,
            limits: OperationLimits::default(),
        }
    }

    #[allow(dead_code)]
    pub fn without_store(mut self) -> Self {
        self.with_store = false;
        self
    }

    #[allow(dead_code)]
    pub fn with_limits(mut self, limits: OperationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn build(self) -> TestApp {
        let store = self.with_store.then(|| Arc::new(InMemoryKvStore::new()));
        let kv: Option<Arc<dyn KvStore>> = store
            .clone()
            .map(|store| store as Arc<dyn KvStore>);

        TestApp {
            router: build_router(AppState::new(kv, self.limits)),
            store,
        }
    }
}
