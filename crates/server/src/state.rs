use sea_orm::DatabaseConnection;

/// Shared by every handler. The connection is a pool handle, cloning is cheap.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
}

impl ServerState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}
