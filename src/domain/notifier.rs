//! Post-commit notification hook.
//!
//! Write handlers call a [`JobNotifier`] unconditionally once their change
//! is persisted. The notifier owns its failure handling: nothing it does
//! can change the outcome of the write that triggered it.

use std::fmt;

use super::{Application, EventBus, Job, PortalEvent};

/// Observer invoked after a committed write.
pub trait JobNotifier: Send + Sync + fmt::Debug {
    /// A job transitioned from active to expired.
    fn job_expired(&self, job: &Job);

    /// An application was created for `job`.
    fn application_created(&self, application: &Application, job: &Job);
}

/// Notifier that forwards to the [`EventBus`] when one is available.
///
/// Without a bus (real-time disabled on this instance) every call is a
/// no-op.
#[derive(Debug, Clone, Default)]
pub struct BusNotifier {
    bus: Option<EventBus>,
}

impl BusNotifier {
    /// Creates a notifier over an optional bus.
    #[must_use]
    pub const fn new(bus: Option<EventBus>) -> Self {
        Self { bus }
    }

    fn emit(&self, event: PortalEvent) {
        let Some(bus) = &self.bus else {
            tracing::trace!(event = event.name(), "real-time disabled, event not sent");
            return;
        };
        // Listeners get the serialized payload; refuse to broadcast one
        // that cannot be produced.
        if let Err(e) = event.payload() {
            tracing::warn!(event = event.name(), error = %e, "dropping unserializable event");
            return;
        }
        let job_id = event.job_id();
        let name = event.name();
        let delivered = bus.publish(event);
        tracing::debug!(event = name, %job_id, delivered, "notification sent");
    }
}

impl JobNotifier for BusNotifier {
    fn job_expired(&self, job: &Job) {
        self.emit(PortalEvent::job_expired(job));
    }

    fn application_created(&self, application: &Application, job: &Job) {
        self.emit(PortalEvent::new_application(application, job));
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Utc;
    use tokio_test::assert_ok;

    use super::*;
    use crate::auth::Principal;
    use crate::domain::{ApplicationId, ApplicationStatus, JobId, JobStatus, Role, UserId};

    fn job() -> Job {
        Job {
            id: JobId::new(1),
            title: "QA".to_string(),
            description: String::new(),
            salary: String::new(),
            location: String::new(),
            status: JobStatus::Active,
            posted_by: UserId::new(1),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn without_bus_is_silent() {
        let notifier = BusNotifier::new(None);
        notifier.job_expired(&job());
    }

    #[tokio::test]
    async fn forwards_to_bus() {
        let bus = EventBus::new(8);
        let mut handle = bus.join(Principal::new(UserId::new(1), Role::Hr)).await;
        let notifier = BusNotifier::new(Some(bus));

        let application = Application {
            id: ApplicationId::new(2),
            job_id: JobId::new(1),
            user_id: UserId::new(9),
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
        };
        notifier.application_created(&application, &job());

        let event = assert_ok!(handle.recv().await);
        assert_eq!(event.name(), "new-application");
    }
}
