table! {
    cita (id_cita) {
        id_cita -> Integer,
        fecha_movimiento -> Datetime,
        finalizada -> Bool,
        cancelada -> Bool,
        motivo -> Nullable<Varchar>,
        id_paciente -> Integer,
        id_cita_disponible -> Integer,
    }
}

table! {
    citas_disponibles (id_cita_disponibles) {
        id_cita_disponibles -> Integer,
        fecha_disponible -> Date,
        hora_disponible -> Time,
        disponible -> Bool,
        id_doctor -> Integer,
        id_sucursal -> Integer,
    }
}

table! {
    paciente (id_paciente) {
        id_paciente -> Integer,
        nombre -> Varchar,
        segundo_nombre -> Nullable<Varchar>,
        apellido -> Varchar,
        segundo_apellido -> Nullable<Varchar>,
        edad -> Nullable<Integer>,
        direccion -> Nullable<Varchar>,
    }
}

table! {
    rol (id_rol) {
        id_rol -> Integer,
        tipo_rol -> Varchar,
    }
}

table! {
    sesion (id_sesion) {
        id_sesion -> Varchar,
        id_usuario -> Integer,
        nombre_usuario -> Varchar,
        email -> Varchar,
        tipo_usuario -> Varchar,
        id_paciente -> Nullable<Integer>,
        token -> Varchar,
        token_firmado -> Varchar,
        creado -> Datetime,
    }
}

table! {
    usuario (id_usuario) {
        id_usuario -> Integer,
        nombre_usuario -> Varchar,
        email -> Varchar,
        telefono -> Nullable<Varchar>,
        contrasenia -> Varchar,
        id_rol -> Integer,
        id_paciente -> Nullable<Integer>,
        id_empleado -> Nullable<Integer>,
    }
}

allow_tables_to_appear_in_same_query!(
    cita,
    citas_disponibles,
    paciente,
    rol,
    sesion,
    usuario,
);
