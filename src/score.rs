use thiserror::Error;

use crate::models::{Mood, NewCheckIn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

const SCALE_MIN: i32 = 1;
const SCALE_MAX: i32 = 5;
const POINTS_PER_STEP: i32 = 20;
const MAX_COMPONENT: i32 = 100;

pub fn mood_weight(mood: Mood) -> i32 {
    match mood {
        Mood::Happy => 10,
        Mood::Meh => 40,
        Mood::Sad => 70,
        Mood::Angry => 90,
    }
}

/// Scores a check-in from its raw mood label.
pub fn compute_burnout_score(
    mood: &str,
    energy: i32,
    meaningfulness: i32,
    stress_trigger_count: usize,
) -> Result<i32, ScoreError> {
    let mood: Mood = mood.parse()?;
    burnout_score(mood, energy, meaningfulness, stress_trigger_count)
}

/// Mean of the mood, energy, meaningfulness and stress components, rounded
/// half-up into 0..=100.
pub fn burnout_score(
    mood: Mood,
    energy: i32,
    meaningfulness: i32,
    stress_trigger_count: usize,
) -> Result<i32, ScoreError> {
    check_scale("energy", energy)?;
    check_scale("meaningfulness", meaningfulness)?;

    let mood_score = mood_weight(mood);
    let energy_score = MAX_COMPONENT - energy * POINTS_PER_STEP;
    let meaning_score = MAX_COMPONENT - meaningfulness * POINTS_PER_STEP;
    let stress_score = stress_component(stress_trigger_count);

    let total = mood_score + energy_score + meaning_score + stress_score;
    // All components are non-negative, so adding half the divisor rounds half-up.
    Ok((total + 2) / 4)
}

pub fn score_check_in(check_in: &NewCheckIn) -> Result<i32, ScoreError> {
    let triggers = crate::models::normalize_labels(&check_in.stress_triggers);
    compute_burnout_score(
        &check_in.mood,
        check_in.energy_level,
        check_in.meaningfulness,
        triggers.len(),
    )
}

fn stress_component(count: usize) -> i32 {
    let saturation = (MAX_COMPONENT / POINTS_PER_STEP) as usize;
    (count.min(saturation) as i32) * POINTS_PER_STEP
}

fn check_scale(field: &str, value: i32) -> Result<(), ScoreError> {
    if (SCALE_MIN..=SCALE_MAX).contains(&value) {
        Ok(())
    } else {
        Err(ScoreError::InvalidInput(format!(
            "{field} must be between {SCALE_MIN} and {SCALE_MAX}, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn calm_day_rounds_up_to_three() {
        assert_eq!(compute_burnout_score("Happy", 5, 5, 0), Ok(3));
    }

    #[test]
    fn worst_day_rounds_up_to_eighty_eight() {
        assert_eq!(compute_burnout_score("Angry", 1, 1, 5), Ok(88));
    }

    #[test]
    fn mid_scale_day() {
        // 40 + 40 + 40 + 40
        assert_eq!(burnout_score(Mood::Meh, 3, 3, 2), Ok(40));
    }

    #[test]
    fn triggers_saturate_at_five() {
        let five = burnout_score(Mood::Sad, 2, 2, 5).unwrap();
        let nine = burnout_score(Mood::Sad, 2, 2, 9).unwrap();
        assert_eq!(five, nine);
        assert_eq!(stress_component(0), 0);
        assert_eq!(stress_component(3), 60);
        assert_eq!(stress_component(12), 100);
    }

    #[test]
    fn rejects_out_of_range_scales() {
        assert!(matches!(
            compute_burnout_score("Happy", 0, 3, 0),
            Err(ScoreError::InvalidInput(_))
        ));
        assert!(matches!(
            compute_burnout_score("Happy", 3, 6, 0),
            Err(ScoreError::InvalidInput(_))
        ));
        assert!(matches!(
            compute_burnout_score("Bored", 3, 3, 0),
            Err(ScoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn every_valid_input_stays_in_range() {
        for mood in Mood::ALL {
            for energy in 1..=5 {
                for meaning in 1..=5 {
                    for triggers in 0..=7 {
                        let score = burnout_score(mood, energy, meaning, triggers).unwrap();
                        assert!((0..=100).contains(&score));
                    }
                }
            }
        }
    }

    #[test]
    fn score_is_monotonic_in_each_input() {
        for mood in Mood::ALL {
            for energy in 1..5 {
                for meaning in 1..5 {
                    for triggers in 0..5 {
                        let score = |e, m, t| burnout_score(mood, e, m, t).unwrap();
                        let base = score(energy, meaning, triggers);
                        assert!(score(energy + 1, meaning, triggers) <= base);
                        assert!(score(energy, meaning + 1, triggers) <= base);
                        assert!(score(energy, meaning, triggers + 1) >= base);
                    }
                }
            }
        }
    }

    #[test]
    fn duplicate_triggers_count_once() {
        let check_in = NewCheckIn {
            email: "sam@example.com".to_string(),
            display_name: "Sam".to_string(),
            created_at: Utc::now(),
            mood: "meh".to_string(),
            energy_level: 3,
            meaningfulness: 3,
            stress_triggers: vec!["Work".into(), "work".into(), "Sleep".into()],
            recovery_activities: Vec::new(),
            notes: None,
            source_key: None,
        };
        // 40 + 40 + 40 + 40
        assert_eq!(score_check_in(&check_in), Ok(40));
    }
}
