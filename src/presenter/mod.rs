//! Presenters (C13, §4.11): turn core entities into the wire formats the
//! external interfaces promise — Torznab RSS/XML and Stremio JSON. Kept
//! separate from the use cases so the same `SearchOutcome`/`RankedStream`
//! can be rendered by more than one surface without re-querying anything.

pub mod stremio;
pub mod torznab;
