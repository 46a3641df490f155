use crate::schema::sesion;
use chrono::NaiveDateTime;

/// Server-held half of a session ticket, keyed by the id handed to the client.
#[derive(Queryable, Insertable, Debug, Clone, PartialEq)]
#[table_name = "sesion"]
pub struct SessionData {
    #[column_name = "id_sesion"]
    pub session_id: String,
    #[column_name = "id_usuario"]
    pub user_id: i32,
    #[column_name = "nombre_usuario"]
    pub username: String,
    pub email: String,
    #[column_name = "tipo_usuario"]
    pub role: String,
    #[column_name = "id_paciente"]
    pub patient_id: Option<i32>,
    pub token: String,
    #[column_name = "token_firmado"]
    pub envelope: String,
    #[column_name = "creado"]
    pub created_at: NaiveDateTime,
}
