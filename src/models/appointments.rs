use crate::schema::cita;
use chrono::NaiveDateTime;

#[derive(Queryable, Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: i32,
    pub created_at: NaiveDateTime,
    pub finished: bool,
    pub cancelled: bool,
    pub reason: Option<String>,
    pub patient_id: i32,
    pub slot_id: i32,
}

#[derive(Insertable, Debug, Clone)]
#[table_name = "cita"]
pub struct NewBooking {
    #[column_name = "fecha_movimiento"]
    pub created_at: NaiveDateTime,
    #[column_name = "finalizada"]
    pub finished: bool,
    #[column_name = "cancelada"]
    pub cancelled: bool,
    #[column_name = "motivo"]
    pub reason: Option<String>,
    #[column_name = "id_paciente"]
    pub patient_id: i32,
    #[column_name = "id_cita_disponible"]
    pub slot_id: i32,
}

impl NewBooking {
    pub fn into_booking(self, id: i32) -> Booking {
        Booking {
            id,
            created_at: self.created_at,
            finished: self.finished,
            cancelled: self.cancelled,
            reason: self.reason,
            patient_id: self.patient_id,
            slot_id: self.slot_id,
        }
    }
}
