//! Display labels for fitness attribute keys.
//!
//! Used when rendering match reasons and served as-is to UI surfaces. Keys
//! missing from a table fall back to the raw key with its first letter
//! upper-cased.

use std::collections::BTreeMap;

pub const GOAL_LABELS: &[(&str, &str)] = &[
    ("bulking", "Bulking"),
    ("cutting", "Cutting"),
    ("maintenance", "Maintenance"),
    ("endurance", "Endurance"),
    ("flexibility", "Flexibility"),
    ("general", "General Fitness"),
];

pub const LEVEL_LABELS: &[(&str, &str)] = &[
    ("beginner", "Beginner"),
    ("intermediate", "Intermediate"),
    ("advanced", "Advanced"),
];

pub const STYLE_LABELS: &[(&str, &str)] = &[
    ("strength", "Strength Training"),
    ("hiit", "HIIT"),
    ("cardio", "Cardio"),
    ("yoga", "Yoga"),
    ("pilates", "Pilates"),
    ("crossfit", "CrossFit"),
    ("powerlifting", "Powerlifting"),
    ("bodybuilding", "Bodybuilding"),
    ("calisthenics", "Calisthenics"),
    ("running", "Running"),
    ("cycling", "Cycling"),
    ("swimming", "Swimming"),
    ("boxing", "Boxing"),
    ("martial_arts", "Martial Arts"),
    ("climbing", "Climbing"),
];

pub const TIME_SLOT_LABELS: &[(&str, &str)] = &[
    ("early_morning", "Early Morning (5-7 AM)"),
    ("morning", "Morning (7-10 AM)"),
    ("midday", "Midday (10 AM-2 PM)"),
    ("afternoon", "Afternoon (2-5 PM)"),
    ("evening", "Evening (5-8 PM)"),
    ("night", "Night (8-11 PM)"),
];

pub const DAY_LABELS: &[(&str, &str)] = &[
    ("mon", "Monday"),
    ("tue", "Tuesday"),
    ("wed", "Wednesday"),
    ("thu", "Thursday"),
    ("fri", "Friday"),
    ("sat", "Saturday"),
    ("sun", "Sunday"),
];

#[inline]
fn lookup(table: &[(&str, &str)], key: &str) -> String {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| capitalize(key))
}

/// Upper-case the first character, leave the rest untouched
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn format_goal(goal: &str) -> String {
    lookup(GOAL_LABELS, goal)
}

pub fn format_level(level: &str) -> String {
    lookup(LEVEL_LABELS, level)
}

pub fn format_style(style: &str) -> String {
    lookup(STYLE_LABELS, style)
}

pub fn format_time_slot(slot: &str) -> String {
    lookup(TIME_SLOT_LABELS, slot)
}

pub fn format_time_slots<S: AsRef<str>>(slots: &[S]) -> Vec<String> {
    slots.iter().map(|s| format_time_slot(s.as_ref())).collect()
}

pub fn format_day(day: &str) -> String {
    lookup(DAY_LABELS, day)
}

pub fn format_days<S: AsRef<str>>(days: &[S]) -> Vec<String> {
    days.iter().map(|d| format_day(d.as_ref())).collect()
}

/// Copy a label table into an owned map for serialization
pub fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
