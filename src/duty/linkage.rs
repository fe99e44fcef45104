use crate::error::Advisory;
use crate::model::{DutySlot, Flight, FlightId, SlotId};
use crate::time_window;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

/// Vols rattachables à une vacation : la veille, le jour même ou le lendemain
/// de la prise de service (`max_days` = 1 par défaut).
pub fn candidate_flights<'f>(slot: &DutySlot, flights: &'f [Flight], max_days: u32) -> Vec<&'f Flight> {
    flights
        .iter()
        .filter(|f| time_window::day_offset(f.date, slot.pickup_date).abs() <= i64::from(max_days))
        .collect()
}

/// Différence symétrique sur les vols engagés ; `true` si le vol vient d'être ajouté.
pub fn toggle_engagement(slot: &mut DutySlot, flight_id: &FlightId) -> bool {
    if slot.engaged_flights.remove(flight_id) {
        false
    } else {
        slot.engaged_flights.insert(flight_id.clone());
        true
    }
}

/// Vols engagés dont la date tombe hors de `[start, start + window_days)` ;
/// un seul avertissement par vol.
pub fn flights_outside_window<'s, I>(
    slots: I,
    flights: &[Flight],
    start: NaiveDate,
    window_days: i64,
) -> Vec<Advisory>
where
    I: IntoIterator<Item = &'s DutySlot>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for slot in slots {
        for flight in flights.iter().filter(|f| slot.engaged_flights.contains(&f.id)) {
            let offset = time_window::day_offset(flight.date, start);
            if !(0..window_days).contains(&offset) && seen.insert(&flight.id) {
                out.push(Advisory::FlightOutsideWindow {
                    flight: flight.id.clone(),
                    day_offset: offset,
                });
            }
        }
    }
    out
}

pub(super) fn engaged_elsewhere(slots: &[DutySlot], slot_id: &SlotId, flight_id: &FlightId) -> Vec<SlotId> {
    slots
        .iter()
        .filter(|s| &s.id != slot_id && s.engaged_flights.contains(flight_id))
        .map(|s| s.id.clone())
        .collect()
}

pub(super) fn dangling_references(slots: &[DutySlot], flights: &[Flight]) -> Vec<Advisory> {
    let known: HashSet<&FlightId> = flights.iter().map(|f| &f.id).collect();
    let mut out = Vec::new();
    for s in slots {
        for id in s.engaged_flights.iter().filter(|id| !known.contains(id)) {
            out.push(Advisory::DanglingFlight {
                slot: s.id.clone(),
                flight: id.clone(),
            });
        }
    }
    out
}

pub(super) fn shared_engagements(slots: &[DutySlot]) -> Vec<Advisory> {
    let mut by_flight: BTreeMap<&FlightId, Vec<&SlotId>> = BTreeMap::new();
    for s in slots {
        for f in &s.engaged_flights {
            by_flight.entry(f).or_default().push(&s.id);
        }
    }

    let mut out = Vec::new();
    for (flight, holders) in by_flight.into_iter().filter(|(_, h)| h.len() > 1) {
        for slot in &holders {
            out.push(Advisory::FlightEngagedElsewhere {
                flight: flight.clone(),
                slot: (*slot).clone(),
                others: holders
                    .iter()
                    .filter(|other| *other != slot)
                    .map(|other| (*other).clone())
                    .collect(),
            });
        }
    }
    out
}
