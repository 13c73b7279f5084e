//! HTTP facade over a host application's session lifecycle.
//!
//! The [`api`] router translates four HTTP calls into operations on a
//! [`host::SessionHost`], draining the [`work`] units the host hands back.

pub mod api;
pub mod config;
pub mod host;
pub mod work;
