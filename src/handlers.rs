pub mod access;
pub mod auth;
pub mod receiving;
pub mod sales;
