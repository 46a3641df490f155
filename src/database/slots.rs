use diesel::{
    mysql::Mysql, prelude::*, query_builder::QueryFragment, query_dsl::methods::ExecuteDsl,
};

use super::{last_insert_id_i32, MysqlStore, StoreError};
use crate::{
    models::{
        appointments::{Booking, NewBooking},
        patients::Patient,
        slots::Slot,
    },
    scheduler::SlotStore,
};

impl SlotStore for MysqlStore {
    fn available_slots(&self) -> Result<Vec<Slot>, StoreError> {
        use crate::schema::citas_disponibles;

        let conn = self.conn()?;
        let slots = citas_disponibles::table
            .filter(citas_disponibles::disponible.eq(true))
            .order((
                citas_disponibles::fecha_disponible.asc(),
                citas_disponibles::hora_disponible.asc(),
                citas_disponibles::id_cita_disponibles.asc(),
            ))
            .get_results::<Slot>(&conn)?;
        Ok(slots)
    }

    fn find_slot(&self, slot_id: i32) -> Result<Option<Slot>, StoreError> {
        use crate::schema::citas_disponibles;

        let conn = self.conn()?;
        let slot = citas_disponibles::table
            .filter(citas_disponibles::id_cita_disponibles.eq(slot_id))
            .first::<Slot>(&conn)
            .optional()?;
        Ok(slot)
    }

    fn find_patient(&self, patient_id: i32) -> Result<Option<Patient>, StoreError> {
        use crate::schema::paciente;

        let conn = self.conn()?;
        let patient = paciente::table
            .filter(paciente::id_paciente.eq(patient_id))
            .first::<Patient>(&conn)
            .optional()?;
        Ok(patient)
    }

    fn claim_slot(&self, booking: NewBooking) -> Result<Option<Booking>, StoreError> {
        use crate::schema::cita;

        let conn = self.conn()?;
        conn.transaction::<_, StoreError, _>(|| {
            // concurrent claims serialize on the row lock; the loser sees
            // zero affected rows
            let flipped = claim_statement(booking.slot_id).execute(&conn)?;
            if flipped == 0 {
                return Ok(None);
            }

            diesel::insert_into(cita::table)
                .values(&booking)
                .execute(&conn)?;
            let id = last_insert_id_i32(&conn)?;
            Ok(Some(booking.into_booking(id)))
        })
    }

    fn find_booking(&self, booking_id: i32) -> Result<Option<Booking>, StoreError> {
        use crate::schema::cita;

        let conn = self.conn()?;
        let booking = cita::table
            .filter(cita::id_cita.eq(booking_id))
            .first::<Booking>(&conn)
            .optional()?;
        Ok(booking)
    }

    fn bookings_for_patient(&self, patient_id: i32) -> Result<Vec<Booking>, StoreError> {
        use crate::schema::cita;

        let conn = self.conn()?;
        let bookings = cita::table
            .filter(cita::id_paciente.eq(patient_id))
            .order((cita::fecha_movimiento.desc(), cita::id_cita.desc()))
            .get_results::<Booking>(&conn)?;
        Ok(bookings)
    }

    fn release_slot(&self, booking_id: i32) -> Result<bool, StoreError> {
        use crate::schema::cita;

        let conn = self.conn()?;
        conn.transaction::<_, StoreError, _>(|| {
            let booking = match cita::table
                .filter(cita::id_cita.eq(booking_id))
                .first::<Booking>(&conn)
                .optional()?
            {
                Some(booking) => booking,
                None => return Ok(false),
            };

            if cancel_statement(booking_id).execute(&conn)? == 0 {
                return Ok(false);
            }
            release_statement(booking.slot_id).execute(&conn)?;
            Ok(true)
        })
    }
}

/// Marks the slot taken only while it is still available.
fn claim_statement(
    slot_id: i32,
) -> impl RunQueryDsl<MysqlConnection> + ExecuteDsl<MysqlConnection> + QueryFragment<Mysql> {
    use crate::schema::citas_disponibles;

    diesel::update(
        citas_disponibles::table
            .filter(citas_disponibles::id_cita_disponibles.eq(slot_id))
            .filter(citas_disponibles::disponible.eq(true)),
    )
    .set(citas_disponibles::disponible.eq(false))
}

/// Cancels the booking only while it is neither cancelled nor finished.
fn cancel_statement(
    booking_id: i32,
) -> impl RunQueryDsl<MysqlConnection> + ExecuteDsl<MysqlConnection> + QueryFragment<Mysql> {
    use crate::schema::cita;

    diesel::update(
        cita::table
            .filter(cita::id_cita.eq(booking_id))
            .filter(cita::cancelada.eq(false))
            .filter(cita::finalizada.eq(false)),
    )
    .set(cita::cancelada.eq(true))
}

fn release_statement(
    slot_id: i32,
) -> impl RunQueryDsl<MysqlConnection> + ExecuteDsl<MysqlConnection> + QueryFragment<Mysql> {
    use crate::schema::citas_disponibles;

    diesel::update(
        citas_disponibles::table.filter(citas_disponibles::id_cita_disponibles.eq(slot_id)),
    )
    .set(citas_disponibles::disponible.eq(true))
}
