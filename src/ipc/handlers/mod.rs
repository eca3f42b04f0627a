pub mod activity;
pub mod analytics;
pub mod attendance;
pub mod auth;
pub mod authorities;
pub mod classes;
pub mod core;
pub mod homework;
pub mod marks;
pub mod profile;
pub mod students;
