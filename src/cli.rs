//! Command line surface: `serve` plus client subcommands against a running API.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use flota_core::reconcile::fechas::parse_fecha_str;
use flota_core::storage::{BlobUpload, Document};
use flota_core::{Alerta, CostoItem, NuevoCosto, Origen, Vehiculo, VehiculoInput, VehiculoUpdate};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::app::archivos_use_case::content_type_por_extension;
use crate::client::FlotaClient;
use crate::config::Config;
use crate::format::{fecha, moneda};
use crate::server;

#[derive(Parser)]
#[command(name = "flota")]
#[command(about = "Fleet control: vehicles, expenses, documents and insurance policies")]
#[command(version)]
pub struct Cli {
    /// Base URL of the API for client commands
    #[arg(long, env = "FLOTA_API_URL", global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Vehicle records
    Vehiculos {
        #[command(subcommand)]
        cmd: VehiculosCmd,
    },
    /// Expenses of a vehicle
    Costos {
        #[command(subcommand)]
        cmd: CostosCmd,
    },
    /// Documents about to expire across the fleet
    Alertas {
        /// Window for document types without their own
        #[arg(long)]
        dias: Option<i64>,
    },
    /// Fleet totals, 365-day cost summary and critical alerts
    Dashboard,
    /// Insurance policies
    Polizas {
        #[command(subcommand)]
        cmd: PolizasCmd,
    },
    /// Stored files
    Archivos {
        #[command(subcommand)]
        cmd: ArchivosCmd,
    },
}

#[derive(Subcommand)]
pub enum VehiculosCmd {
    List {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 100)]
        limit: u32,
        /// Matches plate, móvil or model description
        #[arg(long)]
        filtro: Option<String>,
    },
    Show {
        patente: String,
    },
    Create {
        patente: String,
        #[arg(long)]
        anio: Option<i32>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        modelo: Option<String>,
        #[arg(long)]
        descripcion_modelo: Option<String>,
        #[arg(long)]
        nro_movil: Option<String>,
        #[arg(long, default_value = "Nafta")]
        tipo_combustible: String,
        #[arg(long)]
        inactivo: bool,
    },
    Update {
        patente: String,
        #[arg(long)]
        activo: Option<bool>,
        #[arg(long)]
        anio: Option<i32>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        modelo: Option<String>,
        #[arg(long)]
        descripcion_modelo: Option<String>,
        #[arg(long)]
        nro_movil: Option<String>,
        #[arg(long)]
        tipo_combustible: Option<String>,
        #[arg(long)]
        tipo: Option<String>,
        #[arg(long)]
        area: Option<String>,
        #[arg(long)]
        ubicacion: Option<String>,
        #[arg(long)]
        responsable: Option<String>,
    },
    Delete {
        patente: String,
    },
}

#[derive(Subcommand)]
pub enum CostosCmd {
    /// Unified maintenance and fines view
    Unificado { patente: String },
    /// Period report; defaults to the last 365 days
    Reporte {
        patente: String,
        #[arg(long)]
        desde: Option<String>,
        #[arg(long)]
        hasta: Option<String>,
    },
    /// Register a manual expense
    Crear {
        patente: String,
        /// Finanzas or Mantenimiento
        #[arg(long)]
        origen: String,
        #[arg(long)]
        tipo_costo: String,
        /// YYYY-MM-DD
        #[arg(long)]
        fecha: String,
        #[arg(long)]
        importe: f64,
        #[arg(long, default_value = "")]
        descripcion: String,
        /// Receipt (PDF, JPG or PNG)
        #[arg(long)]
        comprobante: Option<PathBuf>,
    },
    /// Delete an expense from either source
    Borrar {
        id: String,
        /// costos/Mantenimiento or finanzas/Finanzas
        #[arg(long)]
        origen: String,
    },
}

#[derive(Subcommand)]
pub enum PolizasCmd {
    List,
}

#[derive(Subcommand)]
pub enum ArchivosCmd {
    /// Download a file from the object store
    Descargar {
        file_id: String,
        /// Output path; defaults to the server-provided filename
        #[arg(long, short)]
        salida: Option<PathBuf>,
    },
}

fn fecha_arg(nombre: &str, valor: Option<&str>) -> anyhow::Result<Option<chrono::NaiveDate>> {
    valor
        .map(|v| parse_fecha_str(v).ok_or_else(|| anyhow!("Fecha inválida en --{nombre}: '{v}'")))
        .transpose()
}

/// Bare file name for a download; never a path outside the current directory
fn nombre_local(servidor: Option<&str>, file_id: &str) -> PathBuf {
    servidor
        .and_then(|n| Path::new(n).file_name())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(file_id))
}

async fn leer_adjunto(path: &Path) -> anyhow::Result<BlobUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("No se pudo leer {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archivo".to_string());
    Ok(BlobUpload {
        content_type: content_type_por_extension(&filename).to_string(),
        filename,
        bytes,
        metadata: Document::new(),
    })
}

fn texto(valor: &Option<String>) -> &str {
    valor.as_deref().unwrap_or("-")
}

fn imprimir_vehiculo(v: &Vehiculo) {
    println!("Patente:          {}", v.patente);
    println!("Móvil:            {}", texto(&v.nro_movil));
    println!("Activo:           {}", if v.activo { "Sí" } else { "No" });
    println!(
        "Año:              {}",
        v.anio.map(|a| a.to_string()).unwrap_or_else(|| "-".into())
    );
    println!("Modelo:           {}", texto(&v.modelo));
    println!("Descripción:      {}", texto(&v.descripcion_modelo));
    println!("Color:            {}", texto(&v.color));
    println!("Combustible:      {}", texto(&v.tipo_combustible));
    println!("Área:             {}", texto(&v.area));
    println!("Responsable:      {}", texto(&v.responsable));
    if let Some(costo) = v.costo_adquisicion {
        println!("Costo adquisición: {}", moneda(costo));
    }
    if !v.documentos_digitales.is_empty() {
        println!("Documentos:");
        for d in &v.documentos_digitales {
            println!("  - {} {}", d.tipo, d.nombre_archivo.as_deref().unwrap_or(""));
        }
    }
}

fn imprimir_costos(items: &[CostoItem]) {
    for c in items {
        println!(
            "{}  {:<14} {:<24} {:>16}  {}",
            fecha(c.fecha),
            c.origen,
            c.tipo,
            moneda(c.importe),
            c.descripcion
        );
    }
}

fn imprimir_alertas(alertas: &[Alerta]) {
    if alertas.is_empty() {
        println!("Sin alertas");
        return;
    }
    for a in alertas {
        println!(
            "[{}] {} (móvil {}) {} vence {}: {}",
            a.prioridad,
            a.patente,
            a.movil_nro.as_deref().unwrap_or("-"),
            a.nombre_legible,
            fecha(a.fecha_vencimiento),
            a.mensaje
        );
    }
}

pub async fn run(cli: Cli, mut config: Config) -> anyhow::Result<()> {
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    let client = FlotaClient::new(config.api_url.clone());

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            info!("Starting API on port {}", config.port);
            server::start_server(&config).await?;
        }
        Commands::Vehiculos { cmd } => match cmd {
            VehiculosCmd::List { skip, limit, filtro } => {
                let vehiculos = client.listar_vehiculos(skip, limit, filtro.as_deref()).await?;
                for v in &vehiculos {
                    println!(
                        "{:<10} {:<6} {:<4} {:<30} {}",
                        v.patente,
                        texto(&v.nro_movil),
                        v.anio.map(|a| a.to_string()).unwrap_or_default(),
                        texto(&v.descripcion_modelo),
                        if v.activo { "activo" } else { "inactivo" }
                    );
                }
                println!("{} vehículos", vehiculos.len());
            }
            VehiculosCmd::Show { patente } => {
                imprimir_vehiculo(&client.obtener_vehiculo(&patente).await?);
            }
            VehiculosCmd::Create {
                patente,
                anio,
                color,
                modelo,
                descripcion_modelo,
                nro_movil,
                tipo_combustible,
                inactivo,
            } => {
                let input = VehiculoInput {
                    patente,
                    activo: !inactivo,
                    anio,
                    color,
                    modelo,
                    descripcion_modelo,
                    nro_movil,
                    tipo_combustible: Some(tipo_combustible),
                };
                let v = client.crear_vehiculo(&input).await?;
                println!("✅ Vehículo {} creado", v.patente);
            }
            VehiculosCmd::Update {
                patente,
                activo,
                anio,
                color,
                modelo,
                descripcion_modelo,
                nro_movil,
                tipo_combustible,
                tipo,
                area,
                ubicacion,
                responsable,
            } => {
                let update = VehiculoUpdate {
                    activo,
                    anio,
                    color,
                    modelo,
                    descripcion_modelo,
                    nro_movil,
                    tipo_combustible,
                    tipo,
                    area,
                    ubicacion,
                    responsable,
                };
                let v = client.actualizar_vehiculo(&patente, &update).await?;
                imprimir_vehiculo(&v);
            }
            VehiculosCmd::Delete { patente } => {
                client.eliminar_vehiculo(&patente).await?;
                println!("🗑️  Vehículo {} eliminado", patente);
            }
        },
        Commands::Costos { cmd } => match cmd {
            CostosCmd::Unificado { patente } => {
                let gastos = client.gastos_unificados(&patente).await?;
                imprimir_costos(&gastos.gastos);
                println!();
                println!("Mantenimiento: {}", moneda(gastos.total_mantenimiento));
                println!("Multas:        {}", moneda(gastos.total_multas));
                println!("Otras:         {}", moneda(gastos.total_otras));
                println!("Total:         {}", moneda(gastos.total_general));
            }
            CostosCmd::Reporte { patente, desde, hasta } => {
                let desde = fecha_arg("desde", desde.as_deref())?;
                let hasta = fecha_arg("hasta", hasta.as_deref())?;
                let reporte = client.reporte(&patente, desde, hasta).await?;
                println!(
                    "Reporte {} del {} al {}",
                    reporte.patente,
                    fecha(reporte.fecha_inicio),
                    fecha(reporte.fecha_fin)
                );
                imprimir_costos(&reporte.detalles);
                println!();
                println!("Mantenimiento: {}", moneda(reporte.total_mantenimiento));
                println!("Infracciones:  {}", moneda(reporte.total_infracciones));
                println!("Otros:         {}", moneda(reporte.total_otros));
                println!("Total:         {}", moneda(reporte.total_general));
                if reporte.omitidos > 0 {
                    println!("({} registros sin fecha omitidos)", reporte.omitidos);
                }
                if !reporte.alertas.is_empty() {
                    println!();
                    imprimir_alertas(&reporte.alertas);
                }
            }
            CostosCmd::Crear {
                patente,
                origen,
                tipo_costo,
                fecha,
                importe,
                descripcion,
                comprobante,
            } => {
                let adjunto = match comprobante {
                    Some(path) => Some(leer_adjunto(&path).await?),
                    None => None,
                };
                let costo = NuevoCosto {
                    patente,
                    tipo_costo,
                    fecha,
                    descripcion,
                    importe,
                    origen,
                };
                let creado = client.crear_costo(&costo, adjunto).await?;
                println!("✅ {} (id {})", creado.message, creado.costo_id);
                if let Some(file_id) = creado.file_id {
                    println!("   Comprobante: {}", file_id);
                }
            }
            CostosCmd::Borrar { id, origen } => {
                let origen = Origen::parse_lenient(&origen)
                    .ok_or_else(|| anyhow!("Origen inválido: debe ser 'costos' o 'finanzas'"))?;
                let respuesta = client.eliminar_costo(origen, &id).await?;
                println!("🗑️  {}", respuesta.message);
            }
        },
        Commands::Alertas { dias } => {
            imprimir_alertas(&client.alertas(dias).await?);
        }
        Commands::Dashboard => {
            let d = client.dashboard().await?;
            println!("Vehículos:       {} ({} activos)", d.total_vehiculos, d.vehiculos_activos);
            println!("Mantenimiento:   {}", moneda(d.resumen_costos.total_mantenimiento));
            println!("Infracciones:    {}", moneda(d.resumen_costos.total_infracciones));
            println!("Total (365 días): {}", moneda(d.resumen_costos.total_general));
            println!("Alertas críticas: {}", d.alertas_criticas_count);
            imprimir_alertas(&d.alertas_criticas);
        }
        Commands::Polizas { cmd } => match cmd {
            PolizasCmd::List => {
                for p in client.listar_polizas().await? {
                    println!(
                        "{:<20} {:<24} {}  {} ({})",
                        p.numero_poliza,
                        p.empresa,
                        p.fecha_subida.format("%d/%m/%Y"),
                        p.filename,
                        p.file_id
                    );
                }
            }
        },
        Commands::Archivos { cmd } => match cmd {
            ArchivosCmd::Descargar { file_id, salida } => {
                let descarga = client.descargar(&file_id, false).await?;
                let destino =
                    salida.unwrap_or_else(|| nombre_local(descarga.filename.as_deref(), &file_id));
                tokio::fs::write(&destino, &descarga.bytes)
                    .await
                    .with_context(|| format!("No se pudo escribir {}", destino.display()))?;
                println!("📥 {} ({} bytes)", destino.display(), descarga.bytes.len());
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_commands() {
        let cli = Cli::try_parse_from([
            "flota",
            "--api-url",
            "http://api:8000",
            "costos",
            "crear",
            "AB123CD",
            "--origen",
            "Finanzas",
            "--tipo-costo",
            "Multa",
            "--fecha",
            "2024-03-01",
            "--importe",
            "1500.5",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://api:8000"));
        match cli.command {
            Commands::Costos {
                cmd: CostosCmd::Crear { importe, descripcion, .. },
            } => {
                assert_eq!(importe, 1500.5);
                assert_eq!(descripcion, "");
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["flota", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000) }));
    }

    #[test]
    fn test_fecha_arg() {
        assert_eq!(
            fecha_arg("desde", Some("01/02/2024")).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2024, 2, 1)
        );
        assert!(fecha_arg("desde", Some("ayer")).is_err());
        assert_eq!(fecha_arg("desde", None).unwrap(), None);
    }

    #[test]
    fn test_nombre_local_stays_in_current_dir() {
        assert_eq!(nombre_local(Some("../../.bashrc"), "abc"), PathBuf::from(".bashrc"));
        assert_eq!(nombre_local(Some("/etc/passwd"), "abc"), PathBuf::from("passwd"));
        assert_eq!(nombre_local(Some("vtv.pdf"), "abc"), PathBuf::from("vtv.pdf"));
        assert_eq!(nombre_local(Some(".."), "abc"), PathBuf::from("abc"));
        assert_eq!(nombre_local(None, "abc"), PathBuf::from("abc"));
    }
}
