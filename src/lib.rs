//! Core library for rfid-lastfm-scrobbler
pub mod config;
pub mod models;
pub mod api;
pub mod schedule;
pub mod scrobble;
