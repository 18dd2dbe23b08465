//! Synthetic student dataset.

use super::StudentRecord;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Feedback phrases drawn uniformly for each generated student.
pub const FEEDBACK_SAMPLES: [&str; 6] = [
    "Needs more practice in math",
    "Good understanding but slow in problem solving",
    "Excellent engagement",
    "Struggles with assignments",
    "Strong in theory but weak in application",
    "Very consistent performance",
];

const PASS_THRESHOLD: f64 = 0.78;

/// Weighted performance score in `[0, 1]` used to derive the `passed` label.
fn performance_score(attendance: f64, assignments: f64, final_score: f64) -> f64 {
    0.25 * attendance / 100.0 + 0.25 * assignments / 10.0 + 0.5 * final_score / 100.0
}

/// Generate `n` labelled student records with ids `1..=n`.
///
/// With `seed = None` the generator is seeded from OS entropy.
pub fn generate_records(n: usize, seed: Option<u64>) -> Vec<StudentRecord> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    (1..=n)
        .map(|id| {
            let attendance = rng.gen_range(70..=100) as f64;
            let assignments = rng.gen_range(5..=10) as f64;
            let midterm: i32 = rng.gen_range(50..=95);
            let final_score = (midterm + rng.gen_range(-10..=10)).clamp(0, 100) as f64;
            let feedback = FEEDBACK_SAMPLES
                .choose(&mut rng)
                .copied()
                .unwrap_or(FEEDBACK_SAMPLES[0]);
            let passed = performance_score(attendance, assignments, final_score) >= PASS_THRESHOLD;

            StudentRecord {
                student_id: Some(id as u32),
                attendance,
                assignments_completed: assignments,
                midterm_score: midterm as f64,
                final_score,
                feedback: feedback.to_string(),
                passed: Some(u8::from(passed)),
            }
        })
        .collect()
}
