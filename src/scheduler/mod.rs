use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::{
    database::StoreError,
    models::{
        appointments::{Booking, NewBooking},
        patients::Patient,
        slots::Slot,
    },
};

#[derive(Error, Debug)]
pub enum ReservationError {
    #[error("La cita no existe o ya no está disponible")]
    SlotNotFound,

    #[error("La cita acaba de ser reservada por otro paciente")]
    SlotAlreadyTaken,

    #[error("Paciente no encontrado")]
    PatientNotFound,

    #[error("La reservación no existe")]
    BookingNotFound,

    #[error("La cita ya fue atendida")]
    BookingFinished,

    #[error("La reservación ya fue cancelada")]
    BookingCancelled,

    #[error("{0}")]
    Store(#[from] StoreError),
}

pub trait SlotStore: Send + Sync {
    /// Slots flagged available, ordered by date, time, id.
    fn available_slots(&self) -> Result<Vec<Slot>, StoreError>;

    fn find_slot(&self, slot_id: i32) -> Result<Option<Slot>, StoreError>;

    fn find_patient(&self, patient_id: i32) -> Result<Option<Patient>, StoreError>;

    /// Flips the slot from available to unavailable and inserts `booking`,
    /// both or neither. `Ok(None)` when the slot was no longer available at
    /// commit time.
    fn claim_slot(&self, booking: NewBooking) -> Result<Option<Booking>, StoreError>;

    fn find_booking(&self, booking_id: i32) -> Result<Option<Booking>, StoreError>;

    /// Bookings of one patient, newest first.
    fn bookings_for_patient(&self, patient_id: i32) -> Result<Vec<Booking>, StoreError>;

    /// Marks the booking cancelled and its slot available again, both or
    /// neither. `Ok(false)` when the booking was already cancelled or finished.
    fn release_slot(&self, booking_id: i32) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingConfirmation {
    pub booking: Booking,
    pub slot: Slot,
}

pub struct Scheduler<S> {
    store: S,
}

impl<S: SlotStore> Scheduler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn list_available(&self) -> Result<Vec<Slot>, ReservationError> {
        Ok(self.store.available_slots()?)
    }

    #[instrument(skip(self, reason))]
    pub fn reserve(
        &self,
        patient_id: i32,
        slot_id: i32,
        reason: Option<String>,
    ) -> Result<BookingConfirmation, ReservationError> {
        let slot = match self.store.find_slot(slot_id)? {
            Some(slot) if slot.available => slot,
            _ => return Err(ReservationError::SlotNotFound),
        };
        if self.store.find_patient(patient_id)?.is_none() {
            return Err(ReservationError::PatientNotFound);
        }

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let new_booking = NewBooking {
            created_at: Utc::now().naive_utc(),
            finished: false,
            cancelled: false,
            reason,
            patient_id,
            slot_id,
        };

        let booking = match self.store.claim_slot(new_booking)? {
            Some(booking) => booking,
            None => {
                warn!("slot taken between lookup and claim");
                return Err(ReservationError::SlotAlreadyTaken);
            }
        };

        info!(booking_id = booking.id, "slot reserved");
        Ok(BookingConfirmation {
            booking,
            slot: Slot {
                available: false,
                ..slot
            },
        })
    }

    pub fn bookings_for(&self, patient_id: i32) -> Result<Vec<Booking>, ReservationError> {
        Ok(self.store.bookings_for_patient(patient_id)?)
    }

    #[instrument(skip(self))]
    pub fn cancel(&self, patient_id: i32, booking_id: i32) -> Result<(), ReservationError> {
        let booking = match self.store.find_booking(booking_id)? {
            Some(booking) if booking.patient_id == patient_id => booking,
            _ => return Err(ReservationError::BookingNotFound),
        };
        if booking.finished {
            return Err(ReservationError::BookingFinished);
        }
        if booking.cancelled || !self.store.release_slot(booking_id)? {
            return Err(ReservationError::BookingCancelled);
        }

        info!(slot_id = booking.slot_id, "booking cancelled");
        Ok(())
    }
}
