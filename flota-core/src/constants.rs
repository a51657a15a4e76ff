/// Collection names as they exist in the document store.
/// These must stay in sync with data loaded by the legacy ETL.
pub const VEHICULOS: &str = "Vehiculos";
pub const MANTENIMIENTO: &str = "Mantenimiento";
pub const FINANZAS: &str = "Finanzas";
pub const DOCUMENTACION: &str = "Documentacion";
pub const POLIZAS: &str = "polizas_seguros";

/// Marker stored on vehicles created through the API instead of the ETL
pub const TIPO_REGISTRO_MANUAL: &str = "MANUAL_CREADO";

/// Root folder (relative to the media root) for per-vehicle digital documents
pub const DOC_RAIZ: &str = "Documentos-Digitales";

/// Default upload ceiling for receipts and policy files (50 MiB)
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Content types accepted for receipts, policies and vehicle documents
pub const ALLOWED_CONTENT_TYPES: [&str; 4] = ["application/pdf", "image/jpeg", "image/jpg", "image/png"];

/// Descriptions containing any of these words are bookkeeping entries, not real expenses
pub const ADMIN_KEYWORDS: [&str; 5] = ["administrativo", "correccion", "ajuste", "devolucion", "descuento"];

/// Strings the legacy data uses in place of a null
pub const NULL_MARKERS: [&str; 5] = ["NONE", "NAN", "N/A", "NULL", "SIN VENCIMIENTO"];

/// Expiring document types tracked for alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VencimientoConfig {
    pub tipo_documento: &'static str,
    pub nombre_legible: &'static str,
    /// Days before expiry at which an alert is raised
    pub dias_critico: i64,
}

pub const VENCIMIENTOS: [VencimientoConfig; 4] = [
    VencimientoConfig {
        tipo_documento: "Poliza_Detalle",
        nombre_legible: "Póliza de Seguro",
        dias_critico: 15,
    },
    VencimientoConfig {
        tipo_documento: "VTV",
        nombre_legible: "Verificación Técnica Vehicular (VTV)",
        dias_critico: 30,
    },
    VencimientoConfig {
        tipo_documento: "GAS",
        nombre_legible: "Oblea GNC",
        dias_critico: 30,
    },
    VencimientoConfig {
        tipo_documento: "TARJ YPF",
        nombre_legible: "Tarjeta YPF",
        dias_critico: 15,
    },
];

/// Look up the alert configuration for a document type
pub fn vencimiento_config(tipo_documento: &str) -> Option<&'static VencimientoConfig> {
    VENCIMIENTOS.iter().find(|v| v.tipo_documento == tipo_documento)
}

pub fn is_allowed_content_type(content_type: &str) -> bool {
    ALLOWED_CONTENT_TYPES.contains(&content_type.trim().to_ascii_lowercase().as_str())
}
