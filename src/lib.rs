//! # job-portal-gateway
//!
//! REST API and real-time notification gateway for the job portal.
//!
//! HR users post and expire jobs, review applications and keep resume
//! files; job seekers
//! browse the board and apply. Two write operations, applying to a job
//! and expiring one, publish `new-application` and `job-expired` events
//! to every authenticated WebSocket listener once the change is stored.
//! Delivery is best-effort: a write never depends on whether anyone
//! received its event.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)      ── AuthUser / MaybeAuthUser (auth/)
//!     ├── WS Handler (ws/)          ── identity gate before upgrade
//!     │
//!     ├── JobService, ApplicationService, AccountService, ResumeService (service/)
//!     │       └── JobNotifier ──► EventBus (domain/)
//!     │
//!     ├── PortalStore (persistence/): MemoryStore | PostgresStore
//!     └── ResumeStorage (storage/): LocalDiskStorage | MemoryStorage
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod server;
pub mod service;
pub mod storage;
pub mod ws;
