//! Spotify Web API adapter

pub mod client;
pub mod models;

pub use client::{SpotifyClient, SPOTIFY_API_URL};
