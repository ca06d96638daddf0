//! Core business logic for eventz.
//!
//! Services own the registration workflow, payments, ticket issuance and
//! the organizer-facing features. Each service is cheap to clone and holds
//! the repositories it needs.

pub mod services;

pub use services::*;

#[cfg(test)]
mod test_fixtures;
