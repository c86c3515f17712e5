//! Client-side interaction layer for the career roadmap backend: skill tags,
//! session binding, backend exchanges and timeline rendering.

pub mod config;
pub mod controller;
pub mod errors;
pub mod gateway;
pub mod notice;
pub mod roadmap;
pub mod role;
pub mod session;
pub mod skills;
pub mod upload;
