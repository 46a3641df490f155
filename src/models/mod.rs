pub mod appointments;
pub mod patients;
pub mod sessions;
pub mod slots;
pub mod users;
