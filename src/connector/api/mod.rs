pub mod container;
pub mod controller;
pub mod router;

pub use container::{Container, ContainerConfig, API_KEY_ENV};
pub use router::Router;
