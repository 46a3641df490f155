use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::{last_insert_id_i32, MysqlStore, StoreError};
use crate::{
    auth::{Account, AccountStore, IdentifierKind, Role, SessionStore},
    models::{
        patients::NewPatient,
        sessions::SessionData,
        users::{NewUser, UserData},
    },
};

impl AccountStore for MysqlStore {
    fn find_account(
        &self,
        kind: IdentifierKind,
        value: &str,
    ) -> Result<Option<Account>, StoreError> {
        use crate::schema::{rol, usuario};

        let conn = self.conn()?;
        let accounts = usuario::table
            .inner_join(rol::table.on(usuario::id_rol.eq(rol::id_rol)))
            .select((usuario::all_columns, rol::tipo_rol));
        let row = match kind {
            IdentifierKind::Email => accounts
                .filter(usuario::email.eq(value))
                .first::<(UserData, String)>(&conn),
            IdentifierKind::Username => accounts
                .filter(usuario::nombre_usuario.eq(value))
                .first::<(UserData, String)>(&conn),
            IdentifierKind::Phone => accounts
                .filter(usuario::telefono.eq(value))
                .first::<(UserData, String)>(&conn),
        }
        .optional()?;

        Ok(row.map(|(user, role)| Account { user, role }))
    }

    fn find_role_id(&self, role: Role) -> Result<Option<i32>, StoreError> {
        use crate::schema::rol;

        let conn = self.conn()?;
        let id = rol::table
            .filter(rol::tipo_rol.eq(role.as_str()))
            .select(rol::id_rol)
            .first::<i32>(&conn)
            .optional()?;
        Ok(id)
    }

    fn create_patient_account(
        &self,
        patient: NewPatient,
        mut user: NewUser,
    ) -> Result<i32, StoreError> {
        use crate::schema::{paciente, usuario};

        let conn = self.conn()?;
        conn.transaction::<_, StoreError, _>(|| {
            diesel::insert_into(paciente::table)
                .values(&patient)
                .execute(&conn)?;
            user.patient_id = Some(last_insert_id_i32(&conn)?);

            diesel::insert_into(usuario::table)
                .values(&user)
                .execute(&conn)?;
            last_insert_id_i32(&conn)
        })
    }

    fn update_password(&self, user_id: i32, password_hash: &str) -> Result<(), StoreError> {
        use crate::schema::usuario;

        let conn = self.conn()?;
        diesel::update(usuario::table.filter(usuario::id_usuario.eq(user_id)))
            .set(usuario::contrasenia.eq(password_hash))
            .execute(&conn)?;
        Ok(())
    }
}

impl SessionStore for MysqlStore {
    fn insert_session(&self, session: &SessionData) -> Result<(), StoreError> {
        use crate::schema::sesion;

        let conn = self.conn()?;
        diesel::insert_into(sesion::table)
            .values(session)
            .execute(&conn)?;
        Ok(())
    }

    fn find_session(&self, session_id: &str) -> Result<Option<SessionData>, StoreError> {
        use crate::schema::sesion;

        let conn = self.conn()?;
        let session = sesion::table
            .filter(sesion::id_sesion.eq(session_id))
            .first::<SessionData>(&conn)
            .optional()?;
        Ok(session)
    }

    fn delete_session(&self, session_id: &str) -> Result<(), StoreError> {
        use crate::schema::sesion;

        let conn = self.conn()?;
        diesel::delete(sesion::table.filter(sesion::id_sesion.eq(session_id))).execute(&conn)?;
        Ok(())
    }

    fn purge_sessions_before(&self, before: NaiveDateTime) -> Result<usize, StoreError> {
        use crate::schema::sesion;

        let conn = self.conn()?;
        let purged = diesel::delete(sesion::table.filter(sesion::creado.lt(before))).execute(&conn)?;
        Ok(purged)
    }
}
