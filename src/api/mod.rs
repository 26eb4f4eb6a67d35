//! REST API layer for HTTP request/response handling.
//!
//! This layer translates HTTP requests into service calls and formats
//! responses according to API contracts. Request inspection happens before
//! this layer, in [`crate::security`].
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`extractors`] - the authenticated caller
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - request tracing
//! - [`routes`] - Route configuration
//! - [`validation`] - custom field validators

pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod validation;
