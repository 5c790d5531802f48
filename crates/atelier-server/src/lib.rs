//! # atelier-server
//!
//! HTTP daemon exposing the share engine: principal extraction from
//! bearer tokens, the authorization middleware composition, and the
//! sharing API surface.

pub mod config;
pub mod http;
