//! Record model for the Student Profile Ledger (SPL).
//!
//! A [`Profile`] is the value stored on the ledger under a student's user id.
//! It always carries three [`ClassRecord`] slots, one per school year, plus a
//! list of audit tags (`bc`). Unset slots are zero-valued records, so the
//! persisted JSON shape never changes.
//!
//! # Key Types
//!
//! - [`Profile`] — the full ledger record for one student
//! - [`ClassRecord`] — one academic year (grade 10, 11 or 12)
//! - [`Subject`] — a subject name with an untyped score
//! - [`ClassLevel`] — selector for one of the three class slots

pub mod level;
pub mod profile;

pub use level::ClassLevel;
pub use profile::{ClassRecord, Profile, Subject};
