pub mod access_control;
pub mod auth;
pub mod receipt_query;
pub mod receiving_service;
pub mod reconciliation;
pub mod sales_service;

#[cfg(test)]
pub(crate) mod fixtures;
