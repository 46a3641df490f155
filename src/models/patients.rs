use crate::schema::paciente;

#[derive(Queryable, Debug, Clone, PartialEq)]
pub struct Patient {
    pub id: i32,
    pub first_name: String,
    pub second_name: Option<String>,
    pub last_name: String,
    pub second_last_name: Option<String>,
    pub age: Option<i32>,
    pub address: Option<String>,
}

#[derive(Insertable, Debug, Clone, Default)]
#[table_name = "paciente"]
pub struct NewPatient {
    #[column_name = "nombre"]
    pub first_name: String,
    #[column_name = "segundo_nombre"]
    pub second_name: Option<String>,
    #[column_name = "apellido"]
    pub last_name: String,
    #[column_name = "segundo_apellido"]
    pub second_last_name: Option<String>,
    #[column_name = "edad"]
    pub age: Option<i32>,
    #[column_name = "direccion"]
    pub address: Option<String>,
}
