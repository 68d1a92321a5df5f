mod log_file;
mod models;
mod song_file;
mod staging;
mod time_dimension;

pub use log_file::{
    process_log_file, song_plays, songplay_from_row, time_from_row, user_from_row,
    LogFileSummary, SONG_PLAY_PAGE,
};
pub use models::{ArtistRecord, SongRecord, SongplayRecord, TimeRecord, UserRecord};
pub use song_file::{artist_from_row, process_song_file, song_from_row, upsert_artist, upsert_song};
pub use staging::{StagingArea, StagingFile};
pub use time_dimension::{format_timestamp, timestamp_from_millis, TIMESTAMP_FORMAT};
