mod requests;
mod responses;
mod utils;

use crate::{
    auth::{AuthError, Registration},
    protocol::SimpleResponse,
    scheduler::BookingConfirmation,
    state::AppState,
    utils::{
        assert_email_str, assert_not_empty, blocking, format_date_str, format_datetime_str,
        format_time_str, non_empty, parse_date_str,
    },
};
use actix_web::{get, post, web, HttpResponse, Responder};

use self::{requests::*, responses::*, utils::get_patient_from_session};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(home)
        .service(forgot_password)
        .service(check_reset_token)
        .service(reset_password)
        .service(list_slots)
        .service(reserve)
        .service(my_bookings)
        .service(cancel_booking);
}

crate::post_funcs! {
    (register, "/register", RegisterRequest, SimpleResponse),
    (login, "/login", LoginRequest, LoginResponse),
    (logout, "/logout", LogoutRequest, SimpleResponse),
    (home, "/home", SessionRequest, HomeResponse),
    (forgot_password, "/forgot-password", ForgotPasswordRequest, SimpleResponse),
    (reset_password, "/reset-password", ResetPasswordRequest, SimpleResponse),
    (list_slots, "/citas", ListSlotsRequest, ListSlotsResponse),
    (reserve, "/citas/reservar", ReserveRequest, ReserveResponse),
    (my_bookings, "/citas/mis-citas", SessionRequest, MyBookingsResponse),
    (cancel_booking, "/citas/cancelar", CancelRequest, SimpleResponse),
}

async fn register_impl(
    state: web::Data<AppState>,
    info: web::Json<RegisterRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    assert_not_empty("nombre_usuario", &info.nombre_usuario)?;
    assert_not_empty("nombre", &info.nombre)?;
    assert_not_empty("apellido", &info.apellido)?;
    assert_not_empty("password", &info.password)?;
    assert_email_str(&info.email)?;

    let form = Registration {
        username: info.nombre_usuario.trim().to_string(),
        first_name: info.nombre.trim().to_string(),
        second_name: non_empty(info.segundo_nombre),
        last_name: info.apellido.trim().to_string(),
        second_last_name: non_empty(info.segundo_apellido),
        email: info.email.trim().to_string(),
        phone: non_empty(info.telefono),
        password: info.password,
        confirm_password: info.confirm_password,
    };
    blocking(move || state.auth.register(form)).await?;

    Ok(SimpleResponse::ok_with("Usuario registrado exitosamente"))
}

async fn login_impl(
    state: web::Data<AppState>,
    info: web::Json<LoginRequest>,
) -> anyhow::Result<LoginResponse> {
    let info = info.into_inner();

    let (ticket, session_id) = blocking(move || -> Result<_, AuthError> {
        let ticket = state.auth.login(&info.email, &info.password, &info.opcion)?;
        let session_id = state.auth.start_session(&ticket)?;
        Ok((ticket, session_id))
    })
    .await?;

    Ok(LoginResponse {
        success: true,
        err: "".to_string(),
        session_id,
        token: ticket.envelope,
        nombre_usuario: ticket.account.user.username,
        tipo_usuario: ticket.role.to_string(),
    })
}

async fn logout_impl(
    state: web::Data<AppState>,
    info: web::Json<LogoutRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    blocking(move || state.auth.end_session(&info.session_id)).await?;

    Ok(SimpleResponse::ok_with("Has cerrado sesión exitosamente."))
}

async fn home_impl(
    state: web::Data<AppState>,
    info: web::Json<SessionRequest>,
) -> anyhow::Result<HomeResponse> {
    let info = info.into_inner();
    let session =
        blocking(move || state.auth.resume_session(&info.session_id, &info.token)).await?;

    Ok(HomeResponse {
        success: true,
        err: "".to_string(),
        nombre_usuario: session.username,
        tipo_usuario: session.role,
        email: session.email,
    })
}

async fn forgot_password_impl(
    state: web::Data<AppState>,
    info: web::Json<ForgotPasswordRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    assert_not_empty("email", &info.email)?;

    blocking(move || state.auth.request_password_reset(&info.email)).await?;

    Ok(SimpleResponse::ok_with(
        "Si la cuenta existe, recibirás un enlace para restablecer tu contraseña.",
    ))
}

/// Target of the mailed reset link. Tells the client whether the token is
/// still good before it asks for the new password.
#[get("/reset-password")]
async fn check_reset_token(
    state: web::Data<AppState>,
    query: web::Query<ResetTokenQuery>,
) -> impl Responder {
    match state.auth.verify_reset_token(&query.token) {
        Ok(email) => HttpResponse::Ok().json(ResetTokenResponse {
            success: true,
            err: "".to_string(),
            token_valido: true,
            email,
        }),
        Err(err) => HttpResponse::Ok().json(ResetTokenResponse::err(err)),
    }
}

async fn reset_password_impl(
    state: web::Data<AppState>,
    info: web::Json<ResetPasswordRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    assert_not_empty("password", &info.password)?;

    blocking(move || {
        state
            .auth
            .reset_password(&info.token, &info.password, &info.confirm_password)
    })
    .await?;

    Ok(SimpleResponse::ok_with("Contraseña actualizada"))
}

async fn list_slots_impl(
    state: web::Data<AppState>,
    info: web::Json<ListSlotsRequest>,
) -> anyhow::Result<ListSlotsResponse> {
    let info = info.into_inner();
    let date = match info.fecha.and_then(non_empty) {
        Some(fecha) => Some(parse_date_str(fecha)?),
        None => None,
    };

    let slots = blocking(move || state.scheduler.list_available()).await?;

    let slots = slots
        .into_iter()
        .filter(|slot| date.map_or(true, |date| slot.date == date))
        .map(|slot| SlotItem {
            id_cita: slot.id,
            fecha: format_date_str(&slot.date),
            hora: format_time_str(&slot.time),
            id_doctor: slot.doctor_id,
            id_sucursal: slot.branch_id,
        })
        .collect();

    Ok(ListSlotsResponse {
        success: true,
        err: "".to_string(),
        citas: slots,
    })
}

async fn reserve_impl(
    state: web::Data<AppState>,
    info: web::Json<ReserveRequest>,
) -> anyhow::Result<ReserveResponse> {
    let info = info.into_inner();

    let BookingConfirmation { booking, slot } =
        blocking(move || -> anyhow::Result<BookingConfirmation> {
            let patient_id = get_patient_from_session(&state, &info.session_id, &info.token)?;
            Ok(state.scheduler.reserve(patient_id, info.cita_id, info.motivo)?)
        })
        .await?;

    Ok(ReserveResponse {
        success: true,
        err: "".to_string(),
        msg: "Cita reservada exitosamente".to_string(),
        id_cita: booking.id,
        id_cita_disponible: slot.id,
        fecha: format_date_str(&slot.date),
        hora: format_time_str(&slot.time),
        fecha_movimiento: format_datetime_str(&booking.created_at),
    })
}

async fn my_bookings_impl(
    state: web::Data<AppState>,
    info: web::Json<SessionRequest>,
) -> anyhow::Result<MyBookingsResponse> {
    let info = info.into_inner();

    let bookings = blocking(move || -> anyhow::Result<_> {
        let patient_id = get_patient_from_session(&state, &info.session_id, &info.token)?;
        Ok(state.scheduler.bookings_for(patient_id)?)
    })
    .await?;

    let bookings = bookings
        .into_iter()
        .map(|booking| BookingItem {
            id_cita: booking.id,
            id_cita_disponible: booking.slot_id,
            fecha_movimiento: format_datetime_str(&booking.created_at),
            finalizada: booking.finished,
            cancelada: booking.cancelled,
            motivo: booking.reason.unwrap_or_default(),
        })
        .collect();

    Ok(MyBookingsResponse {
        success: true,
        err: "".to_string(),
        citas: bookings,
    })
}

async fn cancel_booking_impl(
    state: web::Data<AppState>,
    info: web::Json<CancelRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();

    blocking(move || -> anyhow::Result<()> {
        let patient_id = get_patient_from_session(&state, &info.session_id, &info.token)?;
        Ok(state.scheduler.cancel(patient_id, info.id_cita)?)
    })
    .await?;

    Ok(SimpleResponse::ok_with("Cita cancelada"))
}
