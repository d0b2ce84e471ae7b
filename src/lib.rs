pub mod conf;
pub mod error;
pub mod owners;
pub mod plugins;
pub mod providers;
pub mod resolver;
pub mod routes;
pub mod templates;

pub use error::OwnersError;
pub use owners::{OwnersData, OwnersSource, OwnersSourceFactory, PullRef};
