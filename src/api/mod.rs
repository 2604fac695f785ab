pub mod constants;
pub mod jwt;
pub mod middleware;
pub mod services;
