//! Application state for shared services

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::domain::user::UserRepository;
use crate::domain::OperationContext;
use crate::infrastructure::user::UserService;

/// Service type the handlers work against, whatever backend sits below it
pub type DynUserService = UserService<dyn UserRepository>;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<DynUserService>,
    /// Deadline for each request's storage calls
    pub request_timeout: Duration,
    /// Cancelled once the shutdown grace period runs out
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(repository: Arc<dyn UserRepository>, request_timeout: Duration) -> Self {
        Self {
            user_service: Arc::new(UserService::new(repository)),
            request_timeout,
            shutdown: CancellationToken::new(),
        }
    }

    /// Fresh per-request context bounded by the request timeout
    pub fn operation_context(&self) -> OperationContext {
        OperationContext::with_timeout(self.request_timeout)
            .with_cancellation(self.shutdown.child_token())
    }
}
