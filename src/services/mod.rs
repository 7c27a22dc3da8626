pub mod plex;
pub mod prematch;
pub mod report;
pub mod spotify;
pub mod sync;
