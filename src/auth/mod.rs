mod envelope;
mod password;

use std::{fmt, str::FromStr, sync::Arc};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::{
    database::StoreError,
    models::{
        patients::NewPatient,
        sessions::SessionData,
        users::{NewUser, UserData},
    },
    notifier::{Notifier, NotifierError},
};

pub use self::envelope::{EnvelopeError, TimedSigner};
pub use self::password::{hash_password, verify_password};

/// Domain-separation salt for session envelopes.
pub const SESSION_SALT: &str = "token-salt";
/// Domain-separation salt for password-reset envelopes.
pub const RESET_SALT: &str = "reset-salt";

const TOKEN_BYTES: usize = 32;

/// Name of the unique index on `usuario.email`.
pub const EMAIL_UNIQUE_KEY: &str = "usuario_email_unique";
/// Name of the unique index on `usuario.telefono`.
pub const PHONE_UNIQUE_KEY: &str = "usuario_telefono_unique";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("El usuario no está registrado")]
    UnknownIdentifier,

    #[error("Debe seleccionar el tipo de usuario")]
    RoleNotSelected,

    #[error("Tipo de usuario incorrecto para este correo")]
    RoleMismatch,

    #[error("Correo o contraseña incorrectos")]
    BadCredential,

    #[error("El token ha expirado. Por favor, vuelve a iniciar sesión.")]
    Expired,

    #[error("Token inválido.")]
    Invalid,

    #[error("Las contraseñas no coinciden.")]
    PasswordMismatch,

    #[error("El nombre de usuario ya está en uso. Elige otro.")]
    UsernameTaken,

    #[error("El correo ya está registrado")]
    EmailTaken,

    #[error("El teléfono ya está registrado")]
    PhoneTaken,

    #[error("Rol no válido.")]
    RoleUnavailable,

    #[error("No se pudo enviar el correo: {0}")]
    NotifierFailure(#[from] NotifierError),

    #[error("Error al procesar la contraseña: {0}")]
    Hashing(String),

    #[error("{0}")]
    Store(#[from] StoreError),
}

impl From<EnvelopeError> for AuthError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Expired => AuthError::Expired,
            EnvelopeError::Invalid => AuthError::Invalid,
            EnvelopeError::Encoding(msg) => AuthError::Hashing(msg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Usuario,
    Doctor,
    Empleado,
    Administrador,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Usuario => "Usuario",
            Role::Doctor => "Doctor",
            Role::Empleado => "Empleado",
            Role::Administrador => "Administrador",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Usuario" => Ok(Role::Usuario),
            "Doctor" => Ok(Role::Doctor),
            "Empleado" => Ok(Role::Empleado),
            "Administrador" => Ok(Role::Administrador),
            _ => Err(AuthError::RoleNotSelected),
        }
    }
}

/// Account columns an identifier may match, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Email,
    Username,
    Phone,
}

impl IdentifierKind {
    pub const PREFERENCE: [IdentifierKind; 3] = [
        IdentifierKind::Email,
        IdentifierKind::Username,
        IdentifierKind::Phone,
    ];
}

/// A user row together with the name of its role.
#[derive(Debug, Clone)]
pub struct Account {
    pub user: UserData,
    pub role: String,
}

pub trait AccountStore: Send + Sync {
    fn find_account(
        &self,
        kind: IdentifierKind,
        value: &str,
    ) -> Result<Option<Account>, StoreError>;

    fn find_role_id(&self, role: Role) -> Result<Option<i32>, StoreError>;

    /// Inserts the patient and the account pointing at it as one unit.
    fn create_patient_account(
        &self,
        patient: NewPatient,
        user: NewUser,
    ) -> Result<i32, StoreError>;

    fn update_password(&self, user_id: i32, password_hash: &str) -> Result<(), StoreError>;
}

pub trait SessionStore: Send + Sync {
    fn insert_session(&self, session: &SessionData) -> Result<(), StoreError>;
    fn find_session(&self, session_id: &str) -> Result<Option<SessionData>, StoreError>;
    fn delete_session(&self, session_id: &str) -> Result<(), StoreError>;

    /// Deletes every session created before `before`; returns how many.
    fn purge_sessions_before(&self, before: NaiveDateTime) -> Result<usize, StoreError>;
}

/// What a session envelope carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub token: String,
    pub role: Role,
}

/// The server-held random token plus the signed envelope handed to the client.
#[derive(Debug, Clone)]
pub struct SessionTicket {
    pub token: String,
    pub envelope: String,
    pub role: Role,
    pub account: Account,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Valid,
    Expired,
    Invalid,
}

#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: String,
    pub first_name: String,
    pub second_name: Option<String>,
    pub last_name: String,
    pub second_last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub session_max_age: Duration,
    pub reset_max_age: Duration,
    pub public_base_url: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_max_age: Duration::seconds(3600),
            reset_max_age: Duration::seconds(3600),
            public_base_url: "http://127.0.0.1:8080".to_string(),
        }
    }
}

/// 32 bytes from the OS RNG, URL-safe base64 encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub struct AuthService<S> {
    store: S,
    session_signer: TimedSigner,
    reset_signer: TimedSigner,
    notifier: Arc<dyn Notifier>,
    settings: AuthSettings,
}

impl<S: AccountStore + SessionStore> AuthService<S> {
    pub fn new(
        store: S,
        secret: &[u8],
        notifier: Arc<dyn Notifier>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            store,
            session_signer: TimedSigner::new(secret, SESSION_SALT),
            reset_signer: TimedSigner::new(secret, RESET_SALT),
            notifier,
            settings,
        }
    }

    fn find_account(&self, identifier: &str) -> Result<Option<Account>, StoreError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Ok(None);
        }
        for kind in IdentifierKind::PREFERENCE.iter() {
            if let Some(account) = self.store.find_account(*kind, identifier)? {
                return Ok(Some(account));
            }
        }
        Ok(None)
    }

    /// `requested_role` is the raw role choice from the login form. It is
    /// only parsed once the identifier is known to exist.
    #[instrument(skip(self, password))]
    pub fn login(
        &self,
        identifier: &str,
        password: &str,
        requested_role: &str,
    ) -> Result<SessionTicket, AuthError> {
        let account = match self.find_account(identifier)? {
            Some(account) => account,
            None => {
                warn!("login rejected: unknown identifier");
                return Err(AuthError::UnknownIdentifier);
            }
        };
        let requested_role: Role = requested_role.parse()?;

        if account.role != requested_role.as_str() {
            warn!(actual = %account.role, "login rejected: role mismatch");
            return Err(AuthError::RoleMismatch);
        }

        match verify_password(password, &account.user.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id = account.user.id, "login rejected: bad credential");
                return Err(AuthError::BadCredential);
            }
            Err(err) => {
                warn!(user_id = account.user.id, "stored password hash unreadable: {}", err);
                return Err(AuthError::BadCredential);
            }
        }

        let token = generate_token();
        let claims = SessionClaims {
            token: token.clone(),
            role: requested_role,
        };
        let envelope = self.session_signer.sign(&claims)?;

        info!(user_id = account.user.id, role = %requested_role, "login succeeded");
        Ok(SessionTicket {
            token,
            envelope,
            role: requested_role,
            account,
        })
    }

    pub fn validate_session(&self, envelope: &str, server_held: &str) -> SessionStatus {
        self.validate_session_at(envelope, server_held, Utc::now())
    }

    pub fn validate_session_at(
        &self,
        envelope: &str,
        server_held: &str,
        now: DateTime<Utc>,
    ) -> SessionStatus {
        let claims: SessionClaims =
            match self
                .session_signer
                .unsign_at(envelope, self.settings.session_max_age, now)
            {
                Ok(claims) => claims,
                Err(EnvelopeError::Expired) => return SessionStatus::Expired,
                Err(_) => return SessionStatus::Invalid,
            };

        if bool::from(claims.token.as_bytes().ct_eq(server_held.as_bytes())) {
            SessionStatus::Valid
        } else {
            SessionStatus::Invalid
        }
    }

    /// Claims inside a session envelope, subject to the same expiry.
    pub fn decode_session(&self, envelope: &str) -> Result<SessionClaims, AuthError> {
        Ok(self
            .session_signer
            .unsign(envelope, self.settings.session_max_age)?)
    }

    /// Persists the server-held half of `ticket`; returns the session id.
    /// Sessions older than the session max age are dropped first.
    pub fn start_session(&self, ticket: &SessionTicket) -> Result<String, AuthError> {
        let now = Utc::now();
        let purged = self
            .store
            .purge_sessions_before((now - self.settings.session_max_age).naive_utc())?;
        if purged > 0 {
            debug!(purged, "expired sessions removed");
        }

        let user = &ticket.account.user;
        let session = SessionData {
            session_id: generate_token(),
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: ticket.role.as_str().to_string(),
            patient_id: user.patient_id,
            token: ticket.token.clone(),
            envelope: ticket.envelope.clone(),
            created_at: now.naive_utc(),
        };
        self.store.insert_session(&session)?;
        Ok(session.session_id)
    }

    pub fn resume_session(
        &self,
        session_id: &str,
        envelope: &str,
    ) -> Result<SessionData, AuthError> {
        let session = self
            .store
            .find_session(session_id)?
            .ok_or(AuthError::Invalid)?;

        match self.validate_session(envelope, &session.token) {
            SessionStatus::Valid => Ok(session),
            SessionStatus::Expired => {
                self.store.delete_session(session_id)?;
                Err(AuthError::Expired)
            }
            SessionStatus::Invalid => Err(AuthError::Invalid),
        }
    }

    pub fn end_session(&self, session_id: &str) -> Result<(), AuthError> {
        self.store.delete_session(session_id)?;
        Ok(())
    }

    #[instrument(skip(self, form), fields(username = %form.username))]
    pub fn register(&self, form: Registration) -> Result<i32, AuthError> {
        let role_id = self
            .store
            .find_role_id(Role::Usuario)?
            .ok_or(AuthError::RoleUnavailable)?;

        if self
            .store
            .find_account(IdentifierKind::Username, &form.username)?
            .is_some()
        {
            return Err(AuthError::UsernameTaken);
        }
        if self
            .store
            .find_account(IdentifierKind::Email, &form.email)?
            .is_some()
        {
            return Err(AuthError::EmailTaken);
        }
        if let Some(phone) = &form.phone {
            if self
                .store
                .find_account(IdentifierKind::Phone, phone)?
                .is_some()
            {
                return Err(AuthError::PhoneTaken);
            }
        }
        if form.password != form.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let password_hash =
            hash_password(&form.password).map_err(|err| AuthError::Hashing(err.to_string()))?;
        let patient = NewPatient {
            first_name: form.first_name,
            second_name: form.second_name,
            last_name: form.last_name,
            second_last_name: form.second_last_name,
            age: None,
            address: None,
        };
        let user = NewUser {
            username: form.username,
            email: form.email,
            phone: form.phone,
            password_hash,
            role_id,
            patient_id: None,
        };

        let user_id = match self.store.create_patient_account(patient, user) {
            Ok(id) => id,
            Err(StoreError::Conflict(msg)) if msg.contains(EMAIL_UNIQUE_KEY) => {
                return Err(AuthError::EmailTaken)
            }
            Err(StoreError::Conflict(msg)) if msg.contains(PHONE_UNIQUE_KEY) => {
                return Err(AuthError::PhoneTaken)
            }
            Err(StoreError::Conflict(_)) => return Err(AuthError::UsernameTaken),
            Err(err) => return Err(err.into()),
        };

        info!(user_id, "account registered");
        Ok(user_id)
    }

    /// Succeeds whether or not `identifier` names an account.
    #[instrument(skip(self))]
    pub fn request_password_reset(&self, identifier: &str) -> Result<(), AuthError> {
        let account = match self.find_account(identifier)? {
            Some(account) => account,
            None => {
                info!("password reset requested for unknown identifier");
                return Ok(());
            }
        };

        let envelope = self.reset_signer.sign(&account.user.email)?;
        let link = format!(
            "{}/farmacia-alejo/reset-password?token={}",
            self.settings.public_base_url.trim_end_matches('/'),
            envelope
        );
        let body = format!(
            "Hola {},\n\nPara restablecer tu contraseña visita el siguiente enlace:\n{}\n\n\
             El enlace expira en {} minutos.",
            account.user.username,
            link,
            self.settings.reset_max_age.num_minutes()
        );

        self.notifier.send(
            &account.user.email,
            "Restablecer contraseña - Farmacia Alejo",
            &body,
        )?;
        info!(user_id = account.user.id, "password reset link sent");
        Ok(())
    }

    /// Email of the account a reset link was minted for.
    pub fn verify_reset_token(&self, envelope: &str) -> Result<String, AuthError> {
        Ok(self
            .reset_signer
            .unsign(envelope, self.settings.reset_max_age)?)
    }

    #[instrument(skip(self, envelope, new_password, confirm_password))]
    pub fn reset_password(
        &self,
        envelope: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        let email = self.verify_reset_token(envelope)?;
        if new_password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let account = self
            .store
            .find_account(IdentifierKind::Email, &email)?
            .ok_or(AuthError::UnknownIdentifier)?;
        let password_hash =
            hash_password(new_password).map_err(|err| AuthError::Hashing(err.to_string()))?;
        self.store.update_password(account.user.id, &password_hash)?;

        info!(user_id = account.user.id, "password reset");
        Ok(())
    }
}
