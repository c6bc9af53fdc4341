//! Domain layer: records, identifiers, and the real-time event system.
//!
//! This module contains the portal's strict internal records (users, jobs,
//! applications, resumes), the events emitted after committed writes, the event bus
//! that fans them out to connected listeners, and the post-commit
//! notification hook that links the two.

pub mod application;
pub mod connection_id;
pub mod event_bus;
pub mod ids;
pub mod job;
pub mod notifier;
pub mod portal_event;
pub mod resume;
pub mod user;

pub use application::{Application, ApplicationStatus, ApplicationView, OwnerStats};
pub use connection_id::ConnectionId;
pub use event_bus::{Audience, ConnectionHandle, EventBus};
pub use ids::{ApplicationId, JobId, ResumeId, UserId};
pub use job::{Job, JobListing, JobStatus, NewJob, OwnedJob, StatusUpdate};
pub use notifier::{BusNotifier, JobNotifier};
pub use portal_event::{JobExpiredPayload, NewApplicationPayload, PortalEvent};
pub use resume::{NewResume, Resume, ResumeStatus, ResumeView};
pub use user::{NewUser, Role, UnknownRole, User};
