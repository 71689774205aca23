//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{UserItemsCommand, UserItemsQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Write operations.
    pub command: Arc<dyn UserItemsCommand>,
    /// Read operations.
    pub query: Arc<dyn UserItemsQuery>,
}

impl HttpState {
    /// Construct state from the write and read ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use stockroom::domain::UserItemsService;
    /// use stockroom::inbound::http::state::HttpState;
    /// use stockroom::outbound::persistence::DieselUserItemStore;
    ///
    /// fn state_for(service: Arc<UserItemsService<DieselUserItemStore>>) -> HttpState {
    ///     HttpState::new(service.clone(), service)
    /// }
    /// ```
    pub fn new(command: Arc<dyn UserItemsCommand>, query: Arc<dyn UserItemsQuery>) -> Self {
        Self { command, query }
    }
}
