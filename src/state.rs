use std::sync::Arc;

use crate::{
    auth::AuthService,
    config::AppConfig,
    database::{DbPool, MysqlStore},
    notifier::Notifier,
    scheduler::Scheduler,
};

/// Service objects shared by every worker, built once at startup.
pub struct AppState {
    pub auth: AuthService<MysqlStore>,
    pub scheduler: Scheduler<MysqlStore>,
}

impl AppState {
    pub fn new(config: &AppConfig, pool: DbPool, notifier: Arc<dyn Notifier>) -> Self {
        let store = MysqlStore::new(pool);
        Self {
            auth: AuthService::new(
                store.clone(),
                config.secret_key.as_bytes(),
                notifier,
                config.auth_settings(),
            ),
            scheduler: Scheduler::new(store),
        }
    }
}
