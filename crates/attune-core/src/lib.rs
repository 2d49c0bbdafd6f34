//! Attune engine: per-turn activity selection and pairwise compatibility.
//!
//! Every entry point is a pure function of its inputs. The activity catalog is
//! an immutable snapshot passed into each call; randomness comes from a
//! caller-supplied RNG so tests can seed it.

pub mod audit;
pub mod balance;
pub mod catalog;
pub mod compatibility;
pub mod error;
pub mod filter;
pub mod phase;
pub mod scorer;
pub mod selector;
pub mod session;
pub mod text;
pub mod validator;
pub mod virtual_profile;

pub use audit::{audit_sequence, PlayedPick, SequenceAudit};
pub use balance::choose_type;
pub use catalog::ActivityCatalog;
pub use compatibility::{calculate_compatibility, calculate_compatibility_weighted};
pub use error::EngineError;
pub use filter::{FilterReason, FilterStats};
pub use phase::{IntensityBand, Phase, PhaseSchedule};
pub use scorer::ScoreBreakdown;
pub use selector::{rng_for, select_activity, FunnelStats, SelectedActivity, Selection, Selector};
pub use session::{Card, Offer, PlayerOrder, SelectionMode, SessionPlanner, SessionSettings};
pub use validator::{CandidateChecks, Rejection};
