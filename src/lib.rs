//! Procedural renderer for the ToDoList iOS app icon set.
//!
//! Each icon is built from scratch at its target size: a rounded glass
//! surface ([`effects`]), a centred label ([`text`]), then a global glow and
//! tone pass. [`icon_gen`] drives the whole set and writes the PNGs.

pub mod contents_json;
pub mod effects;
pub mod icon_gen;
pub mod text;
