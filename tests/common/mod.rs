//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{write_song_file, TestWarehouse, SONG_1};
//!
//! #[test]
//! fn test_load_one_song() {
//!     let mut env = TestWarehouse::new();
//!     write_song_file(env.song_dir(), "A/A/A/song.json", &SONG_1);
//!     env.run().unwrap();
//!     assert_eq!(env.count("songs"), 1);
//! }
//! ```

mod constants;
mod fixtures;
mod warehouse;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{
    event, user_1, user_2, write_json_lines, write_song_file, SongFixture, SONG_1, SONG_2,
};
pub use warehouse::TestWarehouse;
