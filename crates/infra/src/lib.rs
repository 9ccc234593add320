pub mod clock;
pub mod dates;
pub mod db;
pub mod error;
pub mod event_store;
pub mod filters;
pub mod models;
pub mod regions;
pub mod repos;
pub mod seed;
pub mod store;
pub mod workflow;

pub use clock::Clock;
pub use error::{StoreError, StoreResult};
pub use event_store::{EventStore, Source};
pub use store::LocalStore;
