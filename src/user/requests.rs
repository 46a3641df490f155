use serde::Deserialize;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub nombre_usuario: String,
    pub nombre: String,
    #[serde(default)]
    pub segundo_nombre: String,
    pub apellido: String,
    #[serde(default)]
    pub segundo_apellido: String,
    pub email: String,
    #[serde(default)]
    pub telefono: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub opcion: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LogoutRequest {
    pub session_id: String,
}

#[derive(Deserialize)]
pub struct SessionRequest {
    pub session_id: String,
    pub token: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetTokenQuery {
    pub token: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct ListSlotsRequest {
    pub fecha: Option<String>,
}

#[derive(Deserialize)]
pub struct ReserveRequest {
    pub session_id: String,
    pub token: String,
    pub cita_id: i32,
    #[serde(default)]
    pub motivo: Option<String>,
}

#[derive(Deserialize)]
pub struct CancelRequest {
    pub session_id: String,
    pub token: String,
    pub id_cita: i32,
}
