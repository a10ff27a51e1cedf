pub mod catalog;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod response;
pub mod routes;
pub mod services;
