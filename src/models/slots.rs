use chrono::{NaiveDate, NaiveTime};

/// A bookable (doctor, branch, date, time) unit. Rows are created by
/// administrative data entry; this service only flips `available`.
#[derive(Queryable, Debug, Clone, PartialEq)]
pub struct Slot {
    pub id: i32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub available: bool,
    pub doctor_id: i32,
    pub branch_id: i32,
}
