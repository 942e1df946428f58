//! Pure realm-switch logic for Realmshift.
//!
//! This crate contains the Light/Dark dimension mechanic independent of any
//! engine. The engine implements a handful of small traits (scene, respawn,
//! audio) and drives [`dimension::DimensionMachine::tick`] once per frame;
//! everything else is plain data and functions, unit-testable off-engine.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`activation`] | Realm root containers, enabled and disabled as a pair |
//! | [`collaborators`] | Engine/gameplay boundary traits and the per-call context |
//! | [`config`] | Per-level constants (durations, parameter name, home realm) |
//! | [`dimension`] | Realm switch state machine and survival-timer coupling |
//! | [`dissolve`] | Cross-fade driver over per-realm shader parameters |
//! | [`error`] | Configuration and collaborator errors |
//! | [`interact`] | `Activatable` interactables: doors, switches, traps, plates |
//! | [`keys`] | Light/Dark key ring |
//! | [`platforms`] | Per-realm platform registry and shard proximity glow |
//! | [`realm`] | `RealmId` |
//! | [`timer`] | Dark-realm survival countdown and HUD readout |
//! | [`transition`] | Resumable cross-fade state |

pub mod activation;
pub mod collaborators;
pub mod config;
pub mod dimension;
pub mod dissolve;
pub mod error;
pub mod interact;
pub mod keys;
pub mod platforms;
pub mod realm;
pub mod timer;
pub mod transition;
