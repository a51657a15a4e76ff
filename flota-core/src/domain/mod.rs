mod alerta;
mod costo;
mod documento;
mod poliza;
mod vehiculo;

pub use alerta::*;
pub use costo::*;
pub use documento::*;
pub use poliza::*;
pub use vehiculo::*;
