//! Arithmétique de dates et d'heures : seul endroit du crate où l'on calcule
//! des décalages de jours, des durées de vacation et des dates tableur.

use crate::error::ValidationError;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};

const MINUTES_PER_DAY: i64 = 24 * 60;
/// Jours entre l'époque des numéros de série tableur (1899-12-30) et 1970-01-01.
const SERIAL_UNIX_OFFSET: i64 = 25_569;

/// Décalage en jours entiers de `date` par rapport au début du programme.
///
/// Négatif ou au-delà de la longueur du programme : l'enregistrement est hors
/// fenêtre, ce que l'appelant doit signaler sans le rejeter.
pub fn day_offset(date: NaiveDate, program_start: NaiveDate) -> i64 {
    date.signed_duration_since(program_start).num_days()
}

/// Ramène un instant à sa date UTC (minuit UTC), indépendamment du fuseau d'origine.
pub fn utc_date<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    instant.with_timezone(&Utc).date_naive()
}

pub fn in_program(offset: i64, program_length_days: u32) -> bool {
    (0..i64::from(program_length_days)).contains(&offset)
}

/// Formatage "au fil de la frappe" d'une saisie horaire.
///
/// Ne garde que les chiffres ; les deux premiers sont les heures (bornées à 23),
/// les deux suivants les minutes (bornées à 59). Moins de trois chiffres :
/// renvoyés tels quels pour ne pas gêner la saisie.
pub fn parse_time_input(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 3 {
        return digits;
    }
    let hours = digits[..2].parse::<u32>().unwrap_or(0).min(23);
    let minutes = &digits[2..digits.len().min(4)];
    if minutes.len() < 2 {
        return format!("{hours:02}:{minutes}");
    }
    let minutes = minutes.parse::<u32>().unwrap_or(0).min(59);
    format!("{hours:02}:{minutes:02}")
}

/// Validation stricte `^([01]?\d|2[0-3]):[0-5]\d$`.
pub fn is_valid_time(s: &str) -> bool {
    let Some((h, m)) = s.split_once(':') else {
        return false;
    };
    let hb = h.as_bytes();
    let mb = m.as_bytes();
    let hours_ok = match hb {
        [d] => d.is_ascii_digit(),
        [b'0' | b'1', d] => d.is_ascii_digit(),
        [b'2', b'0'..=b'3'] => true,
        _ => false,
    };
    let minutes_ok = matches!(mb, [b'0'..=b'5', d] if d.is_ascii_digit());
    hours_ok && minutes_ok
}

/// Analyse stricte d'une heure `H:MM` / `HH:MM`.
pub fn parse_time(s: &str) -> Result<NaiveTime, ValidationError> {
    let s = s.trim();
    if !is_valid_time(s) {
        return Err(ValidationError::InvalidTime(s.to_owned()));
    }
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| ValidationError::InvalidTime(s.to_owned()))
}

pub fn format_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Forme canonique `HH:MM` d'une heure valide (`6:00` → `06:00`).
pub fn normalize_time(s: &str) -> Result<String, ValidationError> {
    parse_time(s).map(format_time)
}

/// Durée d'une vacation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyDuration {
    pub minutes: i64,
    /// Écart en jours calendaires entre prise et fin de service.
    pub day_span: i64,
}

impl DutyDuration {
    /// Vacation de plus de 24 h : un seul repli a été appliqué, le calcul
    /// n'est plus fiable et doit être signalé.
    pub fn is_multi_day(&self) -> bool {
        self.day_span > 1 || self.minutes > MINUTES_PER_DAY
    }

    pub fn hours_minutes(&self) -> String {
        format!("{}h{:02}", self.minutes / 60, self.minutes.rem_euclid(60))
    }
}

/// Durée `release - pickup` en minutes, avec au plus un repli de minuit.
pub fn duration(pickup: NaiveDateTime, release: NaiveDateTime) -> DutyDuration {
    let raw = minutes_of_day(release.time()) - minutes_of_day(pickup.time());
    let day_span = day_offset(release.date(), pickup.date());
    let wraps = day_span > 0 || (day_span == 0 && raw < 0);
    DutyDuration {
        minutes: if wraps { raw + MINUTES_PER_DAY } else { raw },
        day_span,
    }
}

fn minutes_of_day(t: NaiveTime) -> i64 {
    i64::from(t.num_seconds_from_midnight() / 60)
}

/// Date à partir d'un numéro de série tableur (jours depuis 1899-12-30).
pub fn serial_to_date(serial: i64) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    epoch.checked_add_signed(Duration::try_days(serial - SERIAL_UNIX_OFFSET)?)
}

fn is_serial(raw: &str) -> bool {
    raw.len() == 5 && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Décode une cellule de date : numéro de série à 5 chiffres, sinon date littérale.
pub fn excel_serial_to_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if is_serial(raw) {
        let serial: i64 = raw
            .parse()
            .map_err(|_| ValidationError::InvalidDate(raw.to_owned()))?;
        return serial_to_date(serial).ok_or_else(|| ValidationError::InvalidDate(raw.to_owned()));
    }
    parse_literal_date(raw)
}

fn parse_literal_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Ok(date);
        }
    }
    if let Ok(dt) = raw.parse::<DateTime<Utc>>() {
        return Ok(utc_date(&dt));
    }
    Err(ValidationError::InvalidDate(raw.to_owned()))
}

/// Sérialisation serde `HH:MM` des heures locales.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_time(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        decode(&raw).map_err(D::Error::custom)
    }

    fn decode(raw: &str) -> Result<NaiveTime, String> {
        super::parse_time(raw)
            .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
            .map_err(|_| format!("invalid time: {raw}"))
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(t: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
            match t {
                Some(t) => s.serialize_some(&super::super::format_time(*t)),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
            let raw: Option<String> = Option::deserialize(d)?;
            raw.filter(|s| !s.trim().is_empty())
                .map(|s| super::decode(&s).map_err(D::Error::custom))
                .transpose()
        }
    }
}
