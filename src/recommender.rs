//! Rule-based study advice from a raw student record.

use crate::data::StudentRecord;

pub const IMPROVE_ATTENDANCE: &str = "Improve attendance for better performance.";
pub const COMPLETE_ASSIGNMENTS: &str = "Complete more assignments regularly.";
pub const MORE_REVISION: &str = "Spend more time on revision and mock tests.";
pub const KEEP_GOING: &str = "Great job! Maintain your performance.";

/// Advice for one student, in a fixed order. Never empty.
///
/// Thresholds apply to fractions of the scale: attendance out of 100,
/// assignments out of 10, final score out of 100.
pub fn recommendations(record: &StudentRecord) -> Vec<&'static str> {
    let mut recs = Vec::new();
    if record.attendance / 100.0 < 0.5 {
        recs.push(IMPROVE_ATTENDANCE);
    }
    if record.assignments_completed / 10.0 < 0.5 {
        recs.push(COMPLETE_ASSIGNMENTS);
    }
    if record.final_score / 100.0 < 0.4 {
        recs.push(MORE_REVISION);
    }
    if recs.is_empty() {
        recs.push(KEEP_GOING);
    }
    recs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_student() {
        let record = StudentRecord::new(95.0, 9.0, 80.0, 85.0, "Excellent");
        assert_eq!(recommendations(&record), vec![KEEP_GOING]);
    }

    #[test]
    fn test_every_rule_fires() {
        let record = StudentRecord::new(40.0, 3.0, 30.0, 35.0, "Needs improvement");
        assert_eq!(
            recommendations(&record),
            vec![IMPROVE_ATTENDANCE, COMPLETE_ASSIGNMENTS, MORE_REVISION]
        );
    }

    #[test]
    fn test_thresholds_are_strict() {
        let record = StudentRecord::new(50.0, 5.0, 40.0, 40.0, "");
        assert_eq!(recommendations(&record), vec![KEEP_GOING]);
    }
}
