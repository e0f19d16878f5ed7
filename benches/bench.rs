// Criterion benchmarks for Buddy Match

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use buddy_match::core::{calculate_compatibility, evaluate, rank, Matcher};
use buddy_match::models::{
    FitnessAttributes, FitnessGoal, FitnessLevel, FitnessProfile, ScoredCandidate, TimeSlot,
    Weekday,
};
use std::collections::HashSet;

const STYLES: [&str; 8] = [
    "strength", "hiit", "yoga", "running", "cycling", "boxing", "pilates", "crossfit",
];
const GOALS: [FitnessGoal; 6] = [
    FitnessGoal::Bulking,
    FitnessGoal::Cutting,
    FitnessGoal::Maintenance,
    FitnessGoal::Endurance,
    FitnessGoal::Flexibility,
    FitnessGoal::General,
];
const LEVELS: [FitnessLevel; 3] = [
    FitnessLevel::Beginner,
    FitnessLevel::Intermediate,
    FitnessLevel::Advanced,
];
const SLOTS: [TimeSlot; 6] = [
    TimeSlot::EarlyMorning,
    TimeSlot::Morning,
    TimeSlot::Midday,
    TimeSlot::Afternoon,
    TimeSlot::Evening,
    TimeSlot::Night,
];
const DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn create_attributes(id: usize) -> FitnessAttributes {
    FitnessAttributes {
        level: Some(LEVELS[id % LEVELS.len()]),
        styles: (0..1 + id % 3)
            .map(|i| STYLES[(id + i) % STYLES.len()].to_string())
            .collect(),
        goal: Some(GOALS[id % GOALS.len()]),
        preferred_time_slots: (0..1 + id % 2).map(|i| SLOTS[(id + i) % SLOTS.len()]).collect(),
        availability_days: (0..1 + id % 4).map(|i| DAYS[(id + i) % DAYS.len()]).collect(),
        location: if id % 2 == 0 { "Austin, TX" } else { "Dallas, TX" }.to_string(),
        gym_name: (id % 5 == 0).then(|| "Iron Temple".to_string()),
    }
}

fn create_candidate(id: usize) -> FitnessProfile {
    FitnessProfile {
        user_id: id.to_string(),
        display_name: Some(format!("User {}", id)),
        attributes: create_attributes(id),
    }
}

fn bench_compatibility(c: &mut Criterion) {
    let me = create_attributes(0);
    let other = create_attributes(6);

    c.bench_function("calculate_compatibility", |b| {
        b.iter(|| calculate_compatibility(black_box(&me), black_box(&other)));
    });

    c.bench_function("evaluate", |b| {
        b.iter(|| evaluate(black_box(&me), black_box(&other)));
    });
}

fn bench_rank(c: &mut Criterion) {
    let scored: Vec<ScoredCandidate> = (0..1000)
        .map(|i| ScoredCandidate {
            user_id: i.to_string(),
            display_name: None,
            attributes: FitnessAttributes::default(),
            compatibility_score: (i * 37 % 100) as f64 / 100.0,
            match_reasons: vec![],
            criteria: vec![],
        })
        .collect();

    c.bench_function("rank_1000_top_20", |b| {
        b.iter(|| rank(black_box(&scored), black_box(20)));
    });
}

fn bench_matching(c: &mut Criterion) {
    let matcher = Matcher::with_default_rules();
    let me = create_attributes(0);
    let excluded: HashSet<String> = ["3".to_string(), "7".to_string()].into_iter().collect();

    let mut group = c.benchmark_group("matching");

    for candidate_count in [10, 50, 100, 500, 1000].iter() {
        let candidates: Vec<FitnessProfile> = (1..=*candidate_count).map(create_candidate).collect();

        group.bench_with_input(
            BenchmarkId::new("find_matches", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    matcher.find_matches(
                        black_box("0"),
                        black_box(&me),
                        black_box(candidates.clone()),
                        black_box(&excluded),
                        black_box(Some(20)),
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_compatibility, bench_rank, bench_matching);

criterion_main!(benches);
