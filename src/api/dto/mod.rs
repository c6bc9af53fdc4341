//! Data Transfer Objects for REST request/response serialization.
//!
//! Response bodies use camelCase field names and a `{success, message,
//! data}` envelope.

pub mod application_dto;
pub mod auth_dto;
pub mod common_dto;
pub mod job_dto;
pub mod resume_dto;

pub use application_dto::*;
pub use auth_dto::*;
pub use common_dto::*;
pub use job_dto::*;
pub use resume_dto::*;
