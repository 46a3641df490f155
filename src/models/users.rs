use crate::schema::usuario;

#[derive(Queryable, Debug, Clone)]
pub struct UserData {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role_id: i32,
    pub patient_id: Option<i32>,
    pub employee_id: Option<i32>,
}

#[derive(Insertable)]
#[table_name = "usuario"]
pub struct NewUser {
    #[column_name = "nombre_usuario"]
    pub username: String,
    pub email: String,
    #[column_name = "telefono"]
    pub phone: Option<String>,
    #[column_name = "contrasenia"]
    pub password_hash: String,
    #[column_name = "id_rol"]
    pub role_id: i32,
    #[column_name = "id_paciente"]
    pub patient_id: Option<i32>,
}
