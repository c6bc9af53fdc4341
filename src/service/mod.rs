//! Service layer: business logic orchestration.
//!
//! [`JobService`] runs the write handlers that produce real-time events,
//! [`ApplicationService`] serves role-scoped application queries,
//! [`AccountService`] handles registration and login, and
//! [`ResumeService`] manages HR resume files. All of them talk to the
//! database only through [`crate::persistence::PortalStore`].

pub mod account_service;
pub mod application_service;
pub mod job_service;
pub mod resume_service;

pub use account_service::{AccountService, Registration, Session};
pub use application_service::ApplicationService;
pub use job_service::{JobBoard, JobDraft, JobService};
pub use resume_service::{
    FailedUpload, ResumeDownload, ResumeFile, ResumeService, UploadOutcome,
};
