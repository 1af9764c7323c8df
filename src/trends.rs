use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::models::{CheckIn, DailyTrend, DayStat, LabelCount, Mood, WeeklyHighlights};

const SCALE_CEILING: i32 = 10;

pub fn day_label(check_in: &CheckIn) -> String {
    check_in.created_at.format("%a %b %-d").to_string()
}

pub fn weekly_highlights(check_ins: &[CheckIn]) -> Option<WeeklyHighlights> {
    if check_ins.is_empty() {
        return None;
    }

    let mut mood_counts: Vec<(Mood, usize)> = Vec::new();
    let mut highest_meaning: Option<DayStat> = None;
    let mut lowest_energy: Option<DayStat> = None;

    for check_in in check_ins {
        match mood_counts.iter_mut().find(|(mood, _)| *mood == check_in.mood) {
            Some(entry) => entry.1 += 1,
            None => mood_counts.push((check_in.mood, 1)),
        }

        let best_meaning = highest_meaning.as_ref().map_or(0, |stat| stat.value);
        if check_in.meaningfulness > best_meaning {
            highest_meaning = Some(DayStat {
                day: day_label(check_in),
                value: check_in.meaningfulness,
            });
        }

        let worst_energy = lowest_energy
            .as_ref()
            .map_or(SCALE_CEILING, |stat| stat.value);
        if check_in.energy_level < worst_energy {
            lowest_energy = Some(DayStat {
                day: day_label(check_in),
                value: check_in.energy_level,
            });
        }
    }

    // Strict comparison keeps the earliest mood on ties.
    let (most_common_mood, most_common_mood_count) = mood_counts
        .iter()
        .copied()
        .reduce(|best, candidate| if candidate.1 > best.1 { candidate } else { best })?;

    Some(WeeklyHighlights {
        total: check_ins.len(),
        most_common_mood,
        most_common_mood_count,
        highest_meaning,
        lowest_energy,
    })
}

pub fn daily_rollup(check_ins: &[CheckIn]) -> Vec<DailyTrend> {
    let mut days: BTreeMap<NaiveDate, (usize, i64, i64, i64)> = BTreeMap::new();

    for check_in in check_ins {
        let entry = days
            .entry(check_in.created_at.date_naive())
            .or_insert((0, 0, 0, 0));
        entry.0 += 1;
        entry.1 += check_in.burnout_score as i64;
        entry.2 += check_in.energy_level as i64;
        entry.3 += check_in.meaningfulness as i64;
    }

    days.into_iter()
        .map(|(date, (count, score, energy, meaning))| {
            let n = count as f64;
            DailyTrend {
                date,
                check_ins: count,
                avg_score: score as f64 / n,
                avg_energy: energy as f64 / n,
                avg_meaning: meaning as f64 / n,
            }
        })
        .collect()
}

impl DailyTrend {
    pub fn rounded_score(&self) -> i32 {
        (self.avg_score + 0.5).floor() as i32
    }
}

/// Counts labels case-insensitively, keeping the first spelling seen.
pub fn tally_labels<'a, I>(lists: I) -> Vec<LabelCount>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut counts: HashMap<String, LabelCount> = HashMap::new();

    for list in lists {
        for label in crate::models::normalize_labels(list) {
            counts
                .entry(label.to_lowercase())
                .or_insert_with(|| LabelCount { label, count: 0 })
                .count += 1;
        }
    }

    let mut values: Vec<LabelCount> = counts.into_values().collect();
    values.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    values
}

pub fn trigger_counts(check_ins: &[CheckIn]) -> Vec<LabelCount> {
    tally_labels(check_ins.iter().map(|c| c.stress_triggers.as_slice()))
}

pub fn recovery_counts(check_ins: &[CheckIn]) -> Vec<LabelCount> {
    tally_labels(check_ins.iter().map(|c| c.recovery_activities.as_slice()))
}
