#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Barrier, Mutex},
};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use farmacia_server::{
    auth::{
        hash_password, Account, AccountStore, IdentifierKind, Role, SessionStore,
        EMAIL_UNIQUE_KEY, PHONE_UNIQUE_KEY,
    },
    database::StoreError,
    models::{
        appointments::{Booking, NewBooking},
        patients::{NewPatient, Patient},
        sessions::SessionData,
        slots::Slot,
        users::{NewUser, UserData},
    },
    scheduler::SlotStore,
};

#[derive(Default)]
struct Inner {
    roles: Vec<(i32, String)>,
    users: Vec<UserData>,
    patients: Vec<Patient>,
    sessions: HashMap<String, SessionData>,
    slots: BTreeMap<i32, Slot>,
    bookings: Vec<Booking>,
    writes: usize,
}

/// In-memory datastore with the same all-or-nothing semantics as the MySQL
/// store. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    claim_gate: Arc<Mutex<Option<Arc<Barrier>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let store = Self::without_roles();
        {
            let mut inner = store.inner.lock().unwrap();
            for (id, role) in [Role::Usuario, Role::Doctor, Role::Empleado, Role::Administrador]
                .iter()
                .enumerate()
            {
                inner.roles.push((id as i32 + 1, role.as_str().to_string()));
            }
        }
        store
    }

    pub fn without_roles() -> Self {
        Self::default()
    }

    /// Makes every `claim_slot` wait until `parties` callers have arrived,
    /// so they all race past the availability lookup first.
    pub fn gate_claims(&self, parties: usize) {
        *self.claim_gate.lock().unwrap() = Some(Arc::new(Barrier::new(parties)));
    }

    pub fn add_patient(&self, id: i32) -> Patient {
        let patient = Patient {
            id,
            first_name: format!("Paciente {}", id),
            second_name: None,
            last_name: "Prueba".to_string(),
            second_last_name: None,
            age: None,
            address: None,
        };
        self.inner.lock().unwrap().patients.push(patient.clone());
        patient
    }

    pub fn add_account(
        &self,
        username: &str,
        email: &str,
        phone: Option<&str>,
        password: &str,
        role: Role,
    ) -> UserData {
        let patient_id = if role == Role::Usuario {
            let next = self.inner.lock().unwrap().patients.len() as i32 + 1;
            Some(self.add_patient(next).id)
        } else {
            None
        };

        let mut inner = self.inner.lock().unwrap();
        let role_id = inner
            .roles
            .iter()
            .find(|(_, name)| name == role.as_str())
            .map(|(id, _)| *id)
            .unwrap();
        let user = UserData {
            id: inner.users.len() as i32 + 1,
            username: username.to_string(),
            email: email.to_string(),
            phone: phone.map(str::to_string),
            password_hash: hash_password(password).unwrap(),
            role_id,
            patient_id,
            employee_id: None,
        };
        inner.users.push(user.clone());
        user
    }

    pub fn add_slot(&self, id: i32, date: &str, time: &str, available: bool) -> Slot {
        let slot = Slot {
            id,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            available,
            doctor_id: 1,
            branch_id: 1,
        };
        self.inner.lock().unwrap().slots.insert(id, slot.clone());
        slot
    }

    pub fn finish_booking(&self, booking_id: i32) {
        let mut inner = self.inner.lock().unwrap();
        let booking = inner
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .unwrap();
        booking.finished = true;
    }

    pub fn slot(&self, id: i32) -> Option<Slot> {
        self.inner.lock().unwrap().slots.get(&id).cloned()
    }

    pub fn bookings(&self) -> Vec<Booking> {
        self.inner.lock().unwrap().bookings.clone()
    }

    pub fn user(&self, id: i32) -> Option<UserData> {
        self.inner
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    pub fn patient_count(&self) -> usize {
        self.inner.lock().unwrap().patients.len()
    }

    pub fn session_count(&self) -> usize {
        self.inner.lock().unwrap().sessions.len()
    }

    pub fn has_session(&self, session_id: &str) -> bool {
        self.inner.lock().unwrap().sessions.contains_key(session_id)
    }

    pub fn writes(&self) -> usize {
        self.inner.lock().unwrap().writes
    }
}

impl AccountStore for MemoryStore {
    fn find_account(
        &self,
        kind: IdentifierKind,
        value: &str,
    ) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let user = inner.users.iter().find(|u| match kind {
            IdentifierKind::Email => u.email == value,
            IdentifierKind::Username => u.username == value,
            IdentifierKind::Phone => u.phone.as_deref() == Some(value),
        });
        Ok(user.map(|user| {
            let role = inner
                .roles
                .iter()
                .find(|(id, _)| *id == user.role_id)
                .map(|(_, name)| name.clone())
                .unwrap_or_default();
            Account {
                user: user.clone(),
                role,
            }
        }))
    }

    fn find_role_id(&self, role: Role) -> Result<Option<i32>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .roles
            .iter()
            .find(|(_, name)| name == role.as_str())
            .map(|(id, _)| *id))
    }

    fn create_patient_account(
        &self,
        patient: NewPatient,
        user: NewUser,
    ) -> Result<i32, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "Duplicate entry '{}' for key 'usuario.{}'",
                user.email, EMAIL_UNIQUE_KEY
            )));
        }
        if inner.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!(
                "Duplicate entry '{}' for key 'usuario.usuario_nombre_unique'",
                user.username
            )));
        }

        if user.phone.is_some() && inner.users.iter().any(|u| u.phone == user.phone) {
            return Err(StoreError::Conflict(format!(
                "Duplicate entry '{}' for key 'usuario.{}'",
                user.phone.as_deref().unwrap_or_default(),
                PHONE_UNIQUE_KEY
            )));
        }

        let patient_id = inner.patients.len() as i32 + 1;
        inner.patients.push(Patient {
            id: patient_id,
            first_name: patient.first_name,
            second_name: patient.second_name,
            last_name: patient.last_name,
            second_last_name: patient.second_last_name,
            age: patient.age,
            address: patient.address,
        });
        let user_id = inner.users.len() as i32 + 1;
        inner.users.push(UserData {
            id: user_id,
            username: user.username,
            email: user.email,
            phone: user.phone,
            password_hash: user.password_hash,
            role_id: user.role_id,
            patient_id: Some(patient_id),
            employee_id: None,
        });
        inner.writes += 2;
        Ok(user_id)
    }

    fn update_password(&self, user_id: i32, password_hash: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == user_id) {
            user.password_hash = password_hash.to_string();
        }
        inner.writes += 1;
        Ok(())
    }
}

impl SessionStore for MemoryStore {
    fn insert_session(&self, session: &SessionData) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .sessions
            .insert(session.session_id.clone(), session.clone());
        inner.writes += 1;
        Ok(())
    }

    fn find_session(&self, session_id: &str) -> Result<Option<SessionData>, StoreError> {
        Ok(self.inner.lock().unwrap().sessions.get(session_id).cloned())
    }

    fn delete_session(&self, session_id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.remove(session_id);
        inner.writes += 1;
        Ok(())
    }

    fn purge_sessions_before(&self, before: NaiveDateTime) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let count = inner.sessions.len();
        inner.sessions.retain(|_, session| session.created_at >= before);
        let purged = count - inner.sessions.len();
        inner.writes += purged;
        Ok(purged)
    }
}

impl SlotStore for MemoryStore {
    fn available_slots(&self) -> Result<Vec<Slot>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut slots: Vec<Slot> = inner
            .slots
            .values()
            .filter(|s| s.available)
            .cloned()
            .collect();
        slots.sort_by_key(|s| (s.date, s.time, s.id));
        Ok(slots)
    }

    fn find_slot(&self, slot_id: i32) -> Result<Option<Slot>, StoreError> {
        Ok(self.slot(slot_id))
    }

    fn find_patient(&self, patient_id: i32) -> Result<Option<Patient>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.patients.iter().find(|p| p.id == patient_id).cloned())
    }

    fn claim_slot(&self, booking: NewBooking) -> Result<Option<Booking>, StoreError> {
        let gate = self.claim_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.wait();
        }

        let mut inner = self.inner.lock().unwrap();
        match inner.slots.get_mut(&booking.slot_id) {
            Some(slot) if slot.available => slot.available = false,
            _ => return Ok(None),
        }
        let id = inner.bookings.len() as i32 + 1;
        let booking = booking.into_booking(id);
        inner.bookings.push(booking.clone());
        inner.writes += 2;
        Ok(Some(booking))
    }

    fn find_booking(&self, booking_id: i32) -> Result<Option<Booking>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.bookings.iter().find(|b| b.id == booking_id).cloned())
    }

    fn bookings_for_patient(&self, patient_id: i32) -> Result<Vec<Booking>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut bookings: Vec<Booking> = inner
            .bookings
            .iter()
            .filter(|b| b.patient_id == patient_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(bookings)
    }

    fn release_slot(&self, booking_id: i32) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let slot_id = match inner
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id && !b.cancelled && !b.finished)
        {
            Some(booking) => {
                booking.cancelled = true;
                booking.slot_id
            }
            None => return Ok(false),
        };
        if let Some(slot) = inner.slots.get_mut(&slot_id) {
            slot.available = true;
        }
        inner.writes += 2;
        Ok(true)
    }
}
