pub mod api;
pub mod app;
pub mod config;
pub mod models;
pub mod notice;
pub mod persistence;
pub mod routes;
pub mod store;
pub mod telemetry;
pub mod utils;
pub mod view;

pub use api::{ApiClient, ClientError, Operation};
pub use app::{AppMessage, AppOptions, TiPostApp};
pub use models::{Post, PostDraft, PostId};
pub use persistence::{FileStorage, MemoryStorage, PersistenceError, Persistor, Storage};
pub use store::{PostStore, Snapshot};
