//! Application state for Axum handlers.

use order_ledger_core::OrderQueryService;

/// Default cap on `pageSize`.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Application state shared across all HTTP handlers.
pub struct AppState<S> {
    /// Query service answering customer order lookups
    pub query: OrderQueryService<S>,
    /// Largest `pageSize` a client may request
    pub max_page_size: u32,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            max_page_size: self.max_page_size,
        }
    }
}

impl<S> AppState<S> {
    /// State with the default page size cap.
    #[must_use]
    pub const fn new(query: OrderQueryService<S>) -> Self {
        Self {
            query,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    /// Override the page size cap.
    #[must_use]
    pub const fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_ledger_testing::InMemoryOrderStore;
    use std::sync::Arc;

    #[test]
    fn test_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState<InMemoryOrderStore>>();
    }

    #[test]
    fn test_max_page_size_override() {
        let state = AppState::new(OrderQueryService::new(Arc::new(InMemoryOrderStore::new())));
        assert_eq!(state.max_page_size, DEFAULT_MAX_PAGE_SIZE);

        let state = state.with_max_page_size(25);
        assert_eq!(state.max_page_size, 25);
    }
}
