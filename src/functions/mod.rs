//! Privileged User Creation Function and the client the dashboard backend
//! uses to reach it.

pub mod client;
pub mod create_user;

pub use client::{HttpUserProvisioner, ProvisionError, ProvisionRequest, ProvisionResponse, UserProvisioner};
pub use create_user::{router, FunctionError, FunctionState};
