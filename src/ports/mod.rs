pub mod operator;
pub mod plex;
pub mod spotify;
