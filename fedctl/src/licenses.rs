//! License window arithmetic.
//!
//! A license runs for one calendar year from its start date. The same
//! window computation is used when a persona is registered, edited, or
//! renewed, and by the expiry sweep, so the rules live in one place.

use chrono::{Datelike, NaiveDate};

use crate::api::models::personas::EstadoLicencia;
use crate::types::PersonaId;

/// Compute the license expiry date: start + 1 calendar year.
///
/// Feb 29 on a leap year clamps to Feb 28 of the following year.
pub fn license_expiry(start: NaiveDate) -> NaiveDate {
    start
        .with_year(start.year() + 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(start.year() + 1, 2, 28).expect("Feb 28 always exists"))
}

/// Derive the license status from its expiry date.
///
/// ACTIVO iff the expiry date has not passed. Administrative states
/// (SUSPENDIDO, INACTIVO) are never derived here; they are set explicitly
/// and preserved by the sweep.
pub fn estado_for_expiry(expiry: NaiveDate, today: NaiveDate) -> EstadoLicencia {
    if expiry >= today {
        EstadoLicencia::Activo
    } else {
        EstadoLicencia::Vencido
    }
}

/// Credential identifier for a persona's license year: `FJV-{persona_id}-{year}`.
pub fn credencial_identificador(persona_id: PersonaId, start: NaiveDate) -> String {
    format!("FJV-{}-{}", persona_id, start.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expiry_is_one_year_out() {
        assert_eq!(license_expiry(date(2024, 3, 1)), date(2025, 3, 1));
        assert_eq!(license_expiry(date(2023, 12, 31)), date(2024, 12, 31));
    }

    #[test]
    fn leap_day_clamps_to_feb_28() {
        assert_eq!(license_expiry(date(2024, 2, 29)), date(2025, 2, 28));
    }

    #[test]
    fn estado_tracks_expiry() {
        let expiry = date(2025, 3, 1);
        assert_eq!(estado_for_expiry(expiry, date(2025, 3, 1)), EstadoLicencia::Activo);
        assert_eq!(estado_for_expiry(expiry, date(2025, 2, 28)), EstadoLicencia::Activo);
        assert_eq!(estado_for_expiry(expiry, date(2025, 3, 2)), EstadoLicencia::Vencido);
    }

    #[test]
    fn identificador_format() {
        assert_eq!(credencial_identificador(42, date(2024, 3, 1)), "FJV-42-2024");
    }
}
