//! HTTP implementation of the Playbook remote gateway contract.
//!
//! [`PlayApi`] implements [`pb_core::PlayGateway`] against the remote play
//! store; [`ApiClient`] carries the transport details (auth header, timeout,
//! error-body handling).

pub mod client;
pub mod service;

pub use client::{ApiClient, ClientConfig, DEFAULT_BASE_URL};
pub use service::PlayApi;
