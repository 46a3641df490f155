use serde::Serialize;

#[derive(Default, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub err: String,
    pub session_id: String,
    pub token: String,
    pub nombre_usuario: String,
    pub tipo_usuario: String,
}

#[derive(Default, Serialize)]
pub struct HomeResponse {
    pub success: bool,
    pub err: String,
    pub nombre_usuario: String,
    pub tipo_usuario: String,
    pub email: String,
}

#[derive(Default, Serialize)]
pub struct ResetTokenResponse {
    pub success: bool,
    pub err: String,
    pub token_valido: bool,
    pub email: String,
}

#[derive(Default, Serialize)]
pub struct SlotItem {
    pub id_cita: i32,
    pub fecha: String,
    pub hora: String,
    pub id_doctor: i32,
    pub id_sucursal: i32,
}

#[derive(Default, Serialize)]
pub struct ListSlotsResponse {
    pub success: bool,
    pub err: String,
    pub citas: Vec<SlotItem>,
}

#[derive(Default, Serialize)]
pub struct ReserveResponse {
    pub success: bool,
    pub err: String,
    pub msg: String,
    pub id_cita: i32,
    pub id_cita_disponible: i32,
    pub fecha: String,
    pub hora: String,
    pub fecha_movimiento: String,
}

#[derive(Default, Serialize)]
pub struct BookingItem {
    pub id_cita: i32,
    pub id_cita_disponible: i32,
    pub fecha_movimiento: String,
    pub finalizada: bool,
    pub cancelada: bool,
    pub motivo: String,
}

#[derive(Default, Serialize)]
pub struct MyBookingsResponse {
    pub success: bool,
    pub err: String,
    pub citas: Vec<BookingItem>,
}

crate::impl_err_response! {
    LoginResponse,
    HomeResponse,
    ResetTokenResponse,
    ListSlotsResponse,
    ReserveResponse,
    MyBookingsResponse,
}
