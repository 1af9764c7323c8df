use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{CheckIn, DailyTrend, LabelCount, Zone, ZoneSummary};
use crate::trends;
use crate::zones;

const BAR_WIDTH: usize = 40;
const RECENT_ENTRIES: usize = 5;
const EMPTY_WINDOW: &str = "No check-ins recorded for this window.";

fn zone_glyph(zone: Zone) -> char {
    match zone {
        Zone::Energized => '+',
        Zone::MildStress => '-',
        Zone::WarningZone => '~',
        Zone::BurnoutZone => '#',
        Zone::Critical => '!',
    }
}

/// Proportional stacked bar; cell edges come from cumulative counts so the
/// bar is always exactly `width` cells.
pub fn zone_bar(summary: &ZoneSummary, width: usize) -> String {
    let mut bar = String::with_capacity(width);
    let mut cumulative = 0usize;
    let mut drawn = 0usize;

    for zone in &summary.zones {
        cumulative += zone.count;
        let edge = (cumulative * width + summary.total / 2) / summary.total;
        for _ in drawn..edge {
            bar.push(zone_glyph(zone.zone));
        }
        drawn = edge.max(drawn);
    }

    bar
}

fn plural_days(count: usize) -> &'static str {
    if count == 1 {
        "day"
    } else {
        "days"
    }
}

/// One journal line in the shape the summary log uses.
pub fn format_log_line(check_in: &CheckIn) -> String {
    format!(
        "Mood: {}, Energy: {}, Meaning: {}, Notes: {}",
        check_in.mood,
        check_in.energy_level,
        check_in.meaningfulness,
        check_in.notes.as_deref().filter(|n| !n.trim().is_empty()).unwrap_or("none")
    )
}

fn write_labels(output: &mut String, labels: &[LabelCount], empty: &str) {
    if labels.is_empty() {
        let _ = writeln!(output, "{empty}");
        return;
    }
    let total: usize = labels.iter().map(|l| l.count).sum();
    for label in labels {
        let _ = writeln!(output, "- {}: {}x", label.label, label.count);
    }
    let _ = writeln!(output, "- Total: {total}");
}

/// Zone input for the dashboard view, one score per day.
pub fn day_scores(daily: &[DailyTrend]) -> Vec<i32> {
    // Day means are rounded to whole scores before classification, so close
    // means can land on the same value and collapse the quantiles.
    daily.iter().map(|d| d.rounded_score()).collect()
}

pub fn build_report(
    journaler: Option<&str>,
    since_days: i64,
    cutoff: NaiveDate,
    check_ins: &[CheckIn],
) -> String {
    let daily = trends::daily_rollup(check_ins);
    let scores = day_scores(&daily);

    let mut output = String::new();
    let label = journaler.unwrap_or("all journalers");

    let _ = writeln!(output, "# Wellness Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} days of check-ins since {})",
        label, since_days, cutoff
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Burnout Zones");

    match zones::classify_zones(&scores) {
        None => {
            let _ = writeln!(output, "{EMPTY_WINDOW}");
        }
        Some(summary) => {
            let [t0, t1, t2, t3] = summary.thresholds;
            let source = if summary.fallback {
                "fixed"
            } else {
                "population"
            };
            let _ = writeln!(
                output,
                "Thresholds ({source}): {t0:.1} / {t1:.1} / {t2:.1} / {t3:.1}"
            );
            let _ = writeln!(output);
            let _ = writeln!(output, "`[{}]`", zone_bar(&summary, BAR_WIDTH));
            let _ = writeln!(output);
            for zone in &summary.zones {
                let _ = writeln!(
                    output,
                    "- {} {}: {} {} ({:.0}%)",
                    zone_glyph(zone.zone),
                    zone.zone,
                    zone.count,
                    plural_days(zone.count),
                    zone.percent
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Weekly Highlights");

    match trends::weekly_highlights(check_ins) {
        None => {
            let _ = writeln!(output, "{EMPTY_WINDOW}");
        }
        Some(highlights) => {
            let _ = writeln!(output, "- Total check-ins: {}", highlights.total);
            let _ = writeln!(
                output,
                "- Most common mood: {} ({})",
                highlights.most_common_mood, highlights.most_common_mood_count
            );
            if let Some(stat) = highlights.highest_meaning {
                let _ = writeln!(
                    output,
                    "- Highest meaningful day: {} ({})",
                    stat.day, stat.value
                );
            }
            if let Some(stat) = highlights.lowest_energy {
                let _ = writeln!(
                    output,
                    "- Lowest energy day: {} ({})",
                    stat.day, stat.value
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Daily Trends");

    if daily.is_empty() {
        let _ = writeln!(output, "{EMPTY_WINDOW}");
    } else {
        let _ = writeln!(
            output,
            "| Day | Check-ins | Avg score | Avg energy | Avg meaning |"
        );
        let _ = writeln!(output, "| --- | ---: | ---: | ---: | ---: |");
        for day in daily.iter() {
            let _ = writeln!(
                output,
                "| {} | {} | {:.1} | {:.1} | {:.1} |",
                day.date, day.check_ins, day.avg_score, day.avg_energy, day.avg_meaning
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Stress Triggers");
    write_labels(
        &mut output,
        &trends::trigger_counts(check_ins),
        "No stress triggers logged.",
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recovery Activities");
    write_labels(
        &mut output,
        &trends::recovery_counts(check_ins),
        "No recovery activities logged.",
    );

    let mut recent = check_ins.to_vec();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Journal Entries");

    if recent.is_empty() {
        let _ = writeln!(output, "{EMPTY_WINDOW}");
    } else {
        for check_in in recent.iter().take(RECENT_ENTRIES) {
            let _ = writeln!(
                output,
                "- {} ({}, {}) score {}: {}",
                check_in.created_at.date_naive(),
                check_in.journaler_name,
                check_in.journaler_email,
                check_in.burnout_score,
                format_log_line(check_in)
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mood;
    use crate::trends::tests::{sample_check_in, ALL_TRIGGERS};

    fn cutoff() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn empty_window_reports_no_data() {
        let report = build_report(None, 7, cutoff(), &[]);
        assert!(report.contains("Generated for all journalers"));
        assert!(report.contains(&format!("## Burnout Zones\n{EMPTY_WINDOW}")));
        assert!(report.contains("No stress triggers logged."));
        assert!(report.contains(&format!("## Recent Journal Entries\n{EMPTY_WINDOW}")));
    }

    #[test]
    fn report_includes_zone_bar_and_entries() {
        let check_ins = vec![
            sample_check_in(2, 9, Mood::Happy, 5, 5, &[]),
            sample_check_in(3, 9, Mood::Meh, 3, 3, &["Work"]),
            sample_check_in(4, 9, Mood::Sad, 2, 2, &["Work", "Sleep"]),
            sample_check_in(5, 9, Mood::Angry, 1, 1, &["Work", "Sleep", "Health"]),
            sample_check_in(6, 9, Mood::Angry, 1, 1, &ALL_TRIGGERS),
        ];

        let report = build_report(Some("robin@example.com"), 7, cutoff(), &check_ins);
        assert!(report.contains("Generated for robin@example.com"));
        assert!(report.contains("Thresholds (population)"));
        assert!(report.contains("- + Energized: 1 day (20%)"));
        assert!(report.contains("- ! Critical: 1 day (20%)"));
        assert!(report.contains("- Work: 4x"));
        assert!(report.contains("- Most common mood: Angry (2)"));
        assert!(report.contains("Mood: Angry, Energy: 1, Meaning: 1, Notes: day 6"));
    }

    #[test]
    fn close_day_means_share_a_rounded_score() {
        let day = |d: u32, avg_score: f64| DailyTrend {
            date: NaiveDate::from_ymd_opt(2026, 3, d).unwrap(),
            check_ins: 2,
            avg_score,
            avg_energy: 3.0,
            avg_meaning: 3.0,
        };
        let scores = day_scores(&[day(2, 45.2), day(3, 45.4), day(4, 45.5)]);
        assert_eq!(scores, vec![45, 45, 46]);

        let summary = zones::classify_zones(&scores[..2]).unwrap();
        assert!(summary.fallback);
        assert_eq!(summary.zones[Zone::WarningZone.index()].count, 2);
    }

    #[test]
    fn bar_is_always_full_width() {
        let summary = zones::classify_zones(&[3, 20, 20, 41, 55, 62, 77, 88, 90]).unwrap();
        let bar = zone_bar(&summary, BAR_WIDTH);
        assert_eq!(bar.chars().count(), BAR_WIDTH);

        let uniform = zones::classify_zones(&[50, 50]).unwrap();
        assert_eq!(zone_bar(&uniform, 10), "~~~~~~~~~~");
    }

    #[test]
    fn blank_notes_render_as_none() {
        let mut check_in = sample_check_in(2, 9, Mood::Meh, 3, 3, &[]);
        check_in.notes = Some("  ".to_string());
        assert_eq!(
            format_log_line(&check_in),
            "Mood: Meh, Energy: 3, Meaning: 3, Notes: none"
        );
    }
}
