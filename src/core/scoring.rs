use crate::core::labels::{format_goal, format_level, format_style};
use crate::models::{Compatibility, CriterionDetail, CriterionResult, FitnessAttributes};

/// Fixed normalization denominator.
///
/// Style overlap is uncapped, so a raw score can exceed this and the
/// normalized score can go above 1.0. That is left unclamped.
pub const MAX_RAW_SCORE: u32 = 25;

pub const GOAL_POINTS: u32 = 3;
pub const STYLE_POINTS: u32 = 3;
pub const TIME_SLOT_POINTS: u32 = 2;
pub const TIME_SLOT_CAP: u32 = 6;
pub const GYM_POINTS: u32 = 3;
pub const LOCATION_POINTS: u32 = 2;
pub const LEVEL_POINTS: u32 = 1;
pub const AVAILABILITY_POINTS: u32 = 2;
pub const AVAILABILITY_CAP: u32 = 8;

/// Calculate the compatibility score (raw / 25, two decimals) and the match
/// reasons for a pair of fitness profiles.
///
/// Reasons come in a fixed order: goal, styles, time slots, gym or location,
/// level, availability. Criteria that did not trigger are omitted.
pub fn calculate_compatibility(
    me: &FitnessAttributes,
    other: &FitnessAttributes,
) -> (f64, Vec<String>) {
    let compatibility = evaluate(me, other);
    let reasons = compatibility.criteria.iter().map(match_reason).collect();
    (compatibility.score, reasons)
}

/// Score a pair of profiles and keep the per-criterion breakdown
pub fn evaluate(me: &FitnessAttributes, other: &FitnessAttributes) -> Compatibility {
    let criteria: Vec<CriterionResult> = [
        goal_criterion(me, other),
        style_criterion(me, other),
        time_slot_criterion(me, other),
        place_criterion(me, other),
        level_criterion(me, other),
        availability_criterion(me, other),
    ]
    .into_iter()
    .flatten()
    .collect();

    let raw = criteria.iter().map(|c| c.points).sum();

    Compatibility {
        raw,
        score: normalize(raw),
        criteria,
    }
}

/// `raw / MAX_RAW_SCORE` rounded to two decimal places
#[inline]
pub fn normalize(raw: u32) -> f64 {
    let percent = (raw as f64 * 100.0) / MAX_RAW_SCORE as f64;
    percent.round() / 100.0
}

/// Human-readable explanation for one triggered criterion
pub fn match_reason(result: &CriterionResult) -> String {
    match &result.detail {
        CriterionDetail::Goal(goal) => {
            format!("Same fitness goal: {}", format_goal(goal.as_str()))
        }
        CriterionDetail::Styles(styles) => {
            let labels: Vec<String> = styles.iter().map(|s| format_style(s)).collect();
            format!(
                "You share {} training {}: {}",
                styles.len(),
                plural(styles.len(), "style", "styles"),
                labels.join(", ")
            )
        }
        CriterionDetail::TimeSlots(n) => format!(
            "{} matching preferred time {}",
            n,
            plural(*n, "slot", "slots")
        ),
        CriterionDetail::Gym => "You train at the same gym".to_string(),
        CriterionDetail::Location => "You're in the same location".to_string(),
        CriterionDetail::Level(level) => {
            format!("Both at {} level", format_level(level.as_str()))
        }
        CriterionDetail::Availability(n) => format!(
            "Available on {} of the same {}",
            n,
            plural(*n, "day", "days")
        ),
    }
}

#[inline]
fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}

fn goal_criterion(me: &FitnessAttributes, other: &FitnessAttributes) -> Option<CriterionResult> {
    match (me.goal, other.goal) {
        (Some(a), Some(b)) if a == b => Some(CriterionResult {
            points: GOAL_POINTS,
            detail: CriterionDetail::Goal(a),
        }),
        _ => None,
    }
}

fn style_criterion(me: &FitnessAttributes, other: &FitnessAttributes) -> Option<CriterionResult> {
    let shared: Vec<String> = me.styles.intersection(&other.styles).cloned().collect();
    if shared.is_empty() {
        return None;
    }

    Some(CriterionResult {
        points: STYLE_POINTS * shared.len() as u32,
        detail: CriterionDetail::Styles(shared),
    })
}

fn time_slot_criterion(
    me: &FitnessAttributes,
    other: &FitnessAttributes,
) -> Option<CriterionResult> {
    let shared = me
        .preferred_time_slots
        .intersection(&other.preferred_time_slots)
        .count();
    if shared == 0 {
        return None;
    }

    Some(CriterionResult {
        points: (TIME_SLOT_POINTS * shared as u32).min(TIME_SLOT_CAP),
        detail: CriterionDetail::TimeSlots(shared),
    })
}

/// Same gym beats same location; at most one of the two fires.
///
/// A gym only counts when both sides name one; blank names are treated as
/// absent. Locations compare exactly, blank included.
fn place_criterion(me: &FitnessAttributes, other: &FitnessAttributes) -> Option<CriterionResult> {
    if let (Some(a), Some(b)) = (named_gym(me), named_gym(other)) {
        if a.to_lowercase() == b.to_lowercase() {
            return Some(CriterionResult {
                points: GYM_POINTS,
                detail: CriterionDetail::Gym,
            });
        }
    }

    if me.location == other.location {
        return Some(CriterionResult {
            points: LOCATION_POINTS,
            detail: CriterionDetail::Location,
        });
    }

    None
}

fn named_gym(attrs: &FitnessAttributes) -> Option<&str> {
    attrs
        .gym_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
}

fn level_criterion(me: &FitnessAttributes, other: &FitnessAttributes) -> Option<CriterionResult> {
    match (me.level, other.level) {
        (Some(a), Some(b)) if a == b => Some(CriterionResult {
            points: LEVEL_POINTS,
            detail: CriterionDetail::Level(a),
        }),
        _ => None,
    }
}

fn availability_criterion(
    me: &FitnessAttributes,
    other: &FitnessAttributes,
) -> Option<CriterionResult> {
    let shared = me
        .availability_days
        .intersection(&other.availability_days)
        .count();
    if shared == 0 {
        return None;
    }

    Some(CriterionResult {
        points: (AVAILABILITY_POINTS * shared as u32).min(AVAILABILITY_CAP),
        detail: CriterionDetail::Availability(shared),
    })
}
