//! SeaORM entities for the relational store.

pub mod device;
pub mod oauth_client;
pub mod oauth_client_scope;
pub mod oauth_scope;
pub mod user;
