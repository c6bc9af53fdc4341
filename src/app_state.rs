//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::{PasswordService, TokenService};
use crate::domain::{BusNotifier, EventBus};
use crate::persistence::PortalStore;
use crate::service::{AccountService, ApplicationService, JobService, ResumeService};
use crate::storage::ResumeStorage;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Identity gate shared by the REST extractors and `/ws`.
    pub tokens: Arc<TokenService>,
    /// Job writes and the public board.
    pub job_service: Arc<JobService>,
    /// Role-scoped application queries and the dashboard.
    pub application_service: Arc<ApplicationService>,
    /// Registration and login.
    pub account_service: Arc<AccountService>,
    /// HR resume uploads and downloads.
    pub resume_service: Arc<ResumeService>,
    /// Event bus, absent when real-time delivery is disabled.
    pub event_bus: Option<EventBus>,
}

impl AppState {
    /// Wires the services over `store` and `resumes`. The job service
    /// notifies through `event_bus` when one is given.
    #[must_use]
    pub fn new(
        store: Arc<dyn PortalStore>,
        resumes: Arc<dyn ResumeStorage>,
        resume_max_bytes: usize,
        tokens: Arc<TokenService>,
        passwords: PasswordService,
        event_bus: Option<EventBus>,
    ) -> Self {
        let notifier = Arc::new(BusNotifier::new(event_bus.clone()));
        Self {
            resume_service: Arc::new(ResumeService::new(
                Arc::clone(&store),
                resumes,
                resume_max_bytes,
            )),
            job_service: Arc::new(JobService::new(Arc::clone(&store), notifier)),
            application_service: Arc::new(ApplicationService::new(Arc::clone(&store))),
            account_service: Arc::new(AccountService::new(
                store,
                passwords,
                Arc::clone(&tokens),
            )),
            tokens,
            event_bus,
        }
    }
}
