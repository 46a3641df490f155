mod accounts;
mod slots;

use std::convert::TryFrom;

use diesel::{
    r2d2::ConnectionManager,
    result::{DatabaseErrorInformation, DatabaseErrorKind},
    MysqlConnection,
};
use r2d2::PooledConnection;
use thiserror::Error;

pub type DbPool = r2d2::Pool<ConnectionManager<MysqlConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<MysqlConnection>>;

/// Datastore failures. These are fatal for the request that hit them.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sin conexión a la base de datos: {0}")]
    Connection(String),

    #[error("error de base de datos: {0}")]
    Query(String),

    #[error("registro duplicado: {0}")]
    Conflict(String),

    #[error("operación cancelada")]
    Canceled,
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::Conflict(info.message().to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(err: r2d2::Error) -> Self {
        StoreError::Connection(err.to_string())
    }
}

no_arg_sql_function!(
    last_insert_id,
    diesel::sql_types::Unsigned<diesel::sql_types::Bigint>
);

/// Id generated by the last insert on this connection.
fn last_insert_id_i32(conn: &MysqlConnection) -> Result<i32, StoreError> {
    use diesel::RunQueryDsl;

    let id = diesel::select(last_insert_id).get_result::<u64>(conn)?;
    i32::try_from(id).map_err(|_| StoreError::Query(format!("id fuera de rango: {}", id)))
}

pub fn create_pool(database_url: &str, max_size: u32) -> Result<DbPool, StoreError> {
    let manager = ConnectionManager::<MysqlConnection>::new(database_url);
    r2d2::Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(StoreError::from)
}

/// MySQL-backed implementation of every store trait. Cloning only clones the
/// pool handle.
#[derive(Clone)]
pub struct MysqlStore {
    pool: DbPool,
}

impl MysqlStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConn, StoreError> {
        get_db_conn(&self.pool)
    }
}

pub fn get_db_conn(pool: &DbPool) -> Result<DbConn, StoreError> {
    pool.get().map_err(StoreError::from)
}
