use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::score::ScoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Happy,
    Meh,
    Sad,
    Angry,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Happy, Mood::Meh, Mood::Sad, Mood::Angry];

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Meh => "Meh",
            Mood::Sad => "Sad",
            Mood::Angry => "Angry",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mood {
    type Err = ScoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Mood::ALL
            .into_iter()
            .find(|mood| mood.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ScoreError::InvalidInput(format!("unknown mood {value:?}")))
    }
}

/// Wellness zones in ascending order of burnout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Zone {
    Energized,
    MildStress,
    WarningZone,
    BurnoutZone,
    Critical,
}

impl Zone {
    pub const ALL: [Zone; 5] = [
        Zone::Energized,
        Zone::MildStress,
        Zone::WarningZone,
        Zone::BurnoutZone,
        Zone::Critical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Zone::Energized => "Energized",
            Zone::MildStress => "Mild Stress",
            Zone::WarningZone => "Warning Zone",
            Zone::BurnoutZone => "Burnout Zone",
            Zone::Critical => "Critical",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Zone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct NewCheckIn {
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub mood: String,
    pub energy_level: i32,
    pub meaningfulness: i32,
    pub stress_triggers: Vec<String>,
    pub recovery_activities: Vec<String>,
    pub notes: Option<String>,
    pub source_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CheckIn {
    pub id: Uuid,
    pub journaler_email: String,
    pub journaler_name: String,
    pub created_at: DateTime<Utc>,
    pub mood: Mood,
    pub energy_level: i32,
    pub meaningfulness: i32,
    pub stress_triggers: Vec<String>,
    pub recovery_activities: Vec<String>,
    pub notes: Option<String>,
    pub burnout_score: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneCount {
    pub zone: Zone,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneSummary {
    pub thresholds: [f64; 4],
    /// True when the population had no spread and fixed cut points were used.
    pub fallback: bool,
    pub total: usize,
    pub zones: Vec<ZoneCount>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayStat {
    pub day: String,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyHighlights {
    pub total: usize,
    pub most_common_mood: Mood,
    pub most_common_mood_count: usize,
    pub highest_meaning: Option<DayStat>,
    pub lowest_energy: Option<DayStat>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyTrend {
    pub date: NaiveDate,
    pub check_ins: usize,
    pub avg_score: f64,
    pub avg_energy: f64,
    pub avg_meaning: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Trims labels, drops blanks and removes case-insensitive duplicates,
/// keeping the first spelling.
pub fn normalize_labels<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();

    for label in labels {
        let trimmed = label.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            out.push(trimmed.to_string());
        }
    }

    out
}
