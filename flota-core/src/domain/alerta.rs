use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Prioridad {
    #[serde(rename = "CRÍTICA")]
    Critica,
    #[serde(rename = "ALTA")]
    Alta,
}

impl fmt::Display for Prioridad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Prioridad::Critica => "CRÍTICA",
            Prioridad::Alta => "ALTA",
        })
    }
}

/// An expiring (or expired) vehicle document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alerta {
    pub patente: String,
    pub tipo_documento: String,
    pub nombre_legible: String,
    pub fecha_vencimiento: NaiveDate,
    pub dias_restantes: i64,
    pub mensaje: String,
    pub prioridad: Prioridad,
    pub movil_nro: Option<String>,
    pub descripcion_modelo: Option<String>,
}
