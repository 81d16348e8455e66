//! Oralia Library
//!
//! Core library for the MIDI-driven piano theory trainer.

pub mod app;
pub mod engine;
pub mod state;
pub mod theory;
pub mod widgets;
