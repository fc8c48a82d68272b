pub mod config;
pub mod controllers;
pub mod db;
pub mod error;
pub mod models;
pub mod net;
pub mod registry;
pub mod services;

// Convenient re-exports (so call sites can do `quizhub::Registry`, etc.)
pub use registry::Registry;
