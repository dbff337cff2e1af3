use sea_orm::DatabaseConnection;

use crate::gateway::ZarinpalGateway;

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub gateway: ZarinpalGateway,
}
