//! Display helpers for the CLI (Argentine conventions).

use chrono::NaiveDate;

/// `1234.5` renders as `$ 1.234,50`
pub fn moneda(importe: f64) -> String {
    let cents = (importe.abs() * 100.0).round() as u64;
    let enteros = (cents / 100).to_string();
    let decimales = cents % 100;

    let mut agrupado = String::with_capacity(enteros.len() + enteros.len() / 3);
    for (i, c) in enteros.chars().enumerate() {
        if i > 0 && (enteros.len() - i) % 3 == 0 {
            agrupado.push('.');
        }
        agrupado.push(c);
    }

    let signo = if importe < 0.0 && cents > 0 { "-" } else { "" };
    format!("{signo}$ {agrupado},{decimales:02}")
}

/// `dd/mm/yyyy`
pub fn fecha(fecha: NaiveDate) -> String {
    fecha.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moneda() {
        assert_eq!(moneda(1234.56), "$ 1.234,56");
        assert_eq!(moneda(0.0), "$ 0,00");
        assert_eq!(moneda(999.999), "$ 1.000,00");
        assert_eq!(moneda(1_500_000.5), "$ 1.500.000,50");
        assert_eq!(moneda(-45.1), "-$ 45,10");
    }

    #[test]
    fn test_fecha() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(fecha(d), "07/03/2025");
    }
}
