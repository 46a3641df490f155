use crate::{scheduler::ReservationError, state::AppState};

/// Patient behind a live session. Runs on the blocking pool.
pub fn get_patient_from_session(
    state: &AppState,
    session_id: &str,
    token: &str,
) -> anyhow::Result<i32> {
    let session = state.auth.resume_session(session_id, token)?;
    let patient_id = session
        .patient_id
        .ok_or(ReservationError::PatientNotFound)?;
    Ok(patient_id)
}
