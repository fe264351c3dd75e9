//! Database models for the profile store.

mod profile;

pub use profile::{Profile, UpsertProfile};
