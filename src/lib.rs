//! # Impostor Game Library
//!
//! This library provides the core logic for a pass-and-play impostor party
//! game. A single host device collects player names, assigns secret roles
//! from a category's word packs, and walks the group through per-player
//! reveal screens. The crate covers the role-distribution engine, the match
//! lifecycle around it, and the storage seam the surrounding application
//! implements.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]

pub mod assign;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod game;
pub mod player;
pub mod settings;
pub mod store;
