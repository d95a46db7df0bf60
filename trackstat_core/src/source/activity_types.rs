//! Tables mapping the activity codes written by other programs onto our
//! own activity types.

use crate::model::ActivityType;

/// Strava writes numeric codes into the GPX track type.
const STRAVA_TYPES: &[(&str, ActivityType)] = &[
    ("4", ActivityType::Hike),
    ("9", ActivityType::Run),
    ("10", ActivityType::Walk),
];

/// Garmin uses the same names in its GPX exports as in the underlying FIT
/// files.
const GARMIN_TYPES: &[(&str, ActivityType)] = &[
    ("hiking", ActivityType::Hike),
    ("running", ActivityType::Run),
    ("walking", ActivityType::Walk),
];

/// Known exporters, recognised by the start of the GPX 'creator' attribute.
const EXPORTERS: &[(&str, &[(&str, ActivityType)])] = &[
    ("StravaGPX", STRAVA_TYPES),
    ("Garmin Connect", GARMIN_TYPES),
];

/// The numeric values of the FIT 'sport' enum that we recognise, for when
/// the decoder hands us the raw value rather than its name.
const FIT_SPORT_CODES: &[(u8, ActivityType)] = &[
    (1, ActivityType::Run),
    (11, ActivityType::Walk),
    (17, ActivityType::Hike),
];

fn lookup(table: &[(&str, ActivityType)], code: &str) -> Option<ActivityType> {
    table
        .iter()
        .find(|(name, _)| *name == code)
        .map(|(_, activity_type)| *activity_type)
}

/// Works out the activity type of a GPX track. A track type which is
/// already one of ours wins, then the exporter's own codes are tried.
pub fn resolve_track_activity_type(track_type: Option<&str>, creator: &str) -> ActivityType {
    let Some(track_type) = track_type.map(str::trim) else {
        return ActivityType::Unknown;
    };

    if let Some(activity_type) = ActivityType::from_name(track_type) {
        return activity_type;
    }

    EXPORTERS
        .iter()
        .find(|(signature, _)| creator.starts_with(signature))
        .and_then(|(_, table)| lookup(table, track_type))
        .unwrap_or(ActivityType::Unknown)
}

/// Maps the name of a FIT sport, e.g. "running", onto an activity type.
pub fn activity_type_from_sport(sport: &str) -> ActivityType {
    lookup(GARMIN_TYPES, &sport.to_ascii_lowercase()).unwrap_or(ActivityType::Unknown)
}

/// Maps the raw value of the FIT 'sport' enum.
pub(crate) fn activity_type_from_sport_code(code: u8) -> ActivityType {
    FIT_SPORT_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, activity_type)| *activity_type)
        .unwrap_or(ActivityType::Unknown)
}
