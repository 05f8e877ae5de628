pub mod db;
pub mod guidance;
pub mod models;
pub mod repository;
pub mod sample;
pub mod service;
pub mod stats;
pub mod transition;
