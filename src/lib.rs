//! LetsHang API server core: cookie-bound session resolution, event time
//! windows, and the thin routes built on them.

pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod hang;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod validate;
pub mod window;
