use std::fmt;

use actix_web::{error::BlockingError, web};
use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::database::StoreError;

/// Declares `#[post]` handlers that delegate to `<name>_impl` and answer with
/// the response type, or with `<response>::err` when the impl fails.
/// Datastore failures answer 500 with a generic message; every other error
/// answers 200 with its own message.
#[macro_export]
macro_rules! post_funcs {
    ( $( ( $func_name:ident, $url:expr, $request:ty, $response:ty ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[post($url)]
                async fn $func_name(
                    state: web::Data<AppState>,
                    info: web::Json<$request>
                ) -> impl Responder {
                    match [<$func_name _impl>](state, info).await {
                        Ok(response) => HttpResponse::Ok().json(response),
                        Err(err) if $crate::utils::is_fatal(&err) => {
                            tracing::error!("{} failed: {:#}", stringify!($func_name), err);
                            HttpResponse::InternalServerError()
                                .json(<$response>::err("Error interno del servidor"))
                        }
                        Err(err) => HttpResponse::Ok().json(<$response>::err(err)),
                    }
                }
            }
        )+
    };
}

pub fn is_fatal(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.is::<StoreError>())
}

/// Runs blocking datastore work on the blocking pool.
pub async fn blocking<F, I, E>(f: F) -> anyhow::Result<I>
where
    F: FnOnce() -> Result<I, E> + Send + 'static,
    I: Send + 'static,
    E: Into<anyhow::Error> + fmt::Debug + Send + 'static,
{
    web::block(f).await.map_err(|err| match err {
        BlockingError::Error(err) => err.into(),
        BlockingError::Canceled => StoreError::Canceled.into(),
    })
}

pub fn assert_not_empty(field: &str, value: &str) -> anyhow::Result<()> {
    if value.trim().is_empty() {
        bail!("El campo {} es obligatorio", field)
    }
    Ok(())
}

pub fn assert_email_str(email: &str) -> anyhow::Result<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && domain.contains('.') => Ok(()),
        _ => bail!("Formato de correo inválido"),
    }
}

/// Empty form fields mean "not given".
pub fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn parse_date_str<S: AsRef<str>>(s: S) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.as_ref().trim(), "%Y-%m-%d").context("Formato de fecha inválido")
}

pub fn format_date_str(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_time_str(time: &NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn format_datetime_str(time: &NaiveDateTime) -> String {
    const TIME_FMT: &str = "%Y-%m-%dT%H:%M:%S";

    format!("{}+00:00", time.format(TIME_FMT))
}
