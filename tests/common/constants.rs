//! Shared constants for end-to-end tests
//!
//! When the test data set changes, update only this file.

// ============================================================================
// Songs
// ============================================================================

pub const SONG_1_ID: &str = "SOMZWCG12A8C13C480";
pub const SONG_1_TITLE: &str = "I Didn't Mean To";
pub const SONG_1_DURATION: f64 = 218.93179;

pub const SONG_2_ID: &str = "SOCIWDW12A8C13D406";
pub const SONG_2_TITLE: &str = "Soul Deep";
pub const SONG_2_DURATION: f64 = 148.03546;

// ============================================================================
// Artists
// ============================================================================

pub const ARTIST_1_ID: &str = "ARD7TVE1187B99BFB1";
pub const ARTIST_1_NAME: &str = "Casual";

pub const ARTIST_2_ID: &str = "ARMJAGH1187FB546F3";
pub const ARTIST_2_NAME: &str = "The Box Tops";

// ============================================================================
// Users
// ============================================================================

pub const USER_1_ID: i64 = 8;
pub const USER_1_FIRST_NAME: &str = "Kaylee";
pub const USER_1_LAST_NAME: &str = "Summers";

pub const USER_2_ID: i64 = 26;
pub const USER_2_FIRST_NAME: &str = "Ryan";
pub const USER_2_LAST_NAME: &str = "Smith";

// ============================================================================
// Event timestamps (epoch millis) and their warehouse form
// ============================================================================

/// 2018-11-01 21:01:46.796 UTC
pub const TS_1: i64 = 1541106106796;
pub const TS_1_TEXT: &str = "2018-11-01 21:01:46.796";

/// 2018-11-01 21:05:52.796 UTC
pub const TS_2: i64 = 1541106352796;
pub const TS_2_TEXT: &str = "2018-11-01 21:05:52.796";

/// 2018-11-02 09:32:12.796 UTC
pub const TS_3: i64 = 1541151132796;
