//! Who is where.
//!
//! `PresenceStore` holds channel rosters behind one coarse lock; `LothSlot`
//! holds the session's time-limited selection and lives beside it, not in it.

mod loth;
mod participant;
mod store;

pub use loth::{format_countdown, Loth, LothSlot};
pub use participant::{Participant, Role, Status};
pub use store::{PresenceStore, Roster};
