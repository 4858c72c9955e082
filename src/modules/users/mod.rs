//! User registration, the role catalogue and the current user.

pub mod controller;
pub mod repository;
pub mod router;
pub mod service;
