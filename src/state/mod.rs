pub mod database;
pub mod schema;

pub use database::Database;

use std::sync::Arc;
use tokio::sync::Mutex;

/// Database handle shared between the server, conversations and shutdown.
pub type SharedDatabase = Arc<Mutex<Database>>;
