//! Tag Manager Library
//!
//! Referee for a two-team tag game: tracks agent positions, arbitrates tag
//! requests against the game rules, expires tags, enforces field boundaries
//! and publishes templated notifications.

pub mod api;
pub mod config;
pub mod domain;
pub mod game;
pub mod infrastructure;
