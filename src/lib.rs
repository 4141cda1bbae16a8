//! Hospitalsrv - hospital website and admin dashboard front end
//!
//! This library provides the core functionality for hospitalsrv, which serves
//! the public site and the admin dashboard as a thin client of the hospital
//! backend REST API.

pub mod actions;
pub mod api;
pub mod cli;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;
