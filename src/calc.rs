use serde::Serialize;

use crate::model::{parse_score_or_zero, Course, Evaluation, Section, Student, Weight};

/// Mark at or above which a student counts as approved in course stats.
pub const PASS_MARK: f64 = 5.0;

/// Entered scores above this trigger the advisory warning banner.
pub const WARNING_THRESHOLD: f64 = 10.0;

/// Mean of the coerced scores across all of the section's sub-items.
/// Ungraded and unparseable cells count as 0; an empty section
/// short-circuits to 0 so the result is always finite.
pub fn section_average(section: &Section, student: &Student) -> f64 {
    if section.sub_items.is_empty() {
        return 0.0;
    }
    let sum: f64 = section
        .sub_items
        .iter()
        .map(|sub| parse_score_or_zero(student.grades.get(&sub.id)))
        .sum();
    sum / (section.sub_items.len() as f64)
}

/// Weighted sum of section averages. Deliberately *not* renormalized:
/// if the section weights do not sum to 100 the result is proportionally
/// off, and that is surfaced rather than corrected.
pub fn evaluation_grade(evaluation: &Evaluation, student: &Student) -> f64 {
    evaluation
        .sections
        .iter()
        .map(|s| section_average(s, student) * (s.weight.or_zero() / 100.0))
        .sum()
}

/// Same weighted-sum policy one level up, over the course's evaluations.
pub fn course_grade(course: &Course, student: &Student) -> f64 {
    course
        .evaluations
        .iter()
        .map(|e| evaluation_grade(e, student) * (e.weight.or_zero() / 100.0))
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightValidity {
    pub total: f64,
    pub is_valid: bool,
}

/// Sibling-weight feedback for the UI. Never blocks computation or saving;
/// the aggregation above proceeds with whatever weights are present.
pub fn weight_validity<'a, I>(weights: I) -> WeightValidity
where
    I: IntoIterator<Item = &'a Weight>,
{
    let total: f64 = weights.into_iter().map(Weight::or_zero).sum();
    WeightValidity {
        total,
        is_valid: total == 100.0,
    }
}

/// True if any recorded score under this section exceeds the warning
/// threshold. Advisory only; the average is computed with the value as-is.
pub fn score_warning(section: &Section, student: &Student) -> bool {
    section
        .sub_items
        .iter()
        .any(|sub| parse_score_or_zero(student.grades.get(&sub.id)) > WARNING_THRESHOLD)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStats {
    pub approved_pct: f64,
    pub failed_pct: f64,
    pub average: f64,
}

/// Pass/fail split and mean of final course grades across all students.
pub fn course_stats(course: &Course) -> CourseStats {
    if course.students.is_empty() {
        return CourseStats {
            approved_pct: 0.0,
            failed_pct: 0.0,
            average: 0.0,
        };
    }

    let total = course.students.len() as f64;
    let mut approved = 0usize;
    let mut sum = 0.0;
    for s in &course.students {
        let grade = course_grade(course, s);
        if grade >= PASS_MARK {
            approved += 1;
        }
        sum += grade;
    }

    CourseStats {
        approved_pct: 100.0 * (approved as f64) / total,
        failed_pct: 100.0 * ((course.students.len() - approved) as f64) / total,
        average: sum / total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ScoreEntry, SubItem};

    fn section_with_scores(weight: Weight, scores: &[Option<f64>]) -> (Section, Student) {
        let mut section = Section::new("Exámenes", weight);
        let mut student = Student::new("Ana");
        for (i, score) in scores.iter().enumerate() {
            let sub = SubItem::new(format!("Item {}", i + 1));
            if let Some(v) = score {
                student.grades.insert(sub.id.clone(), ScoreEntry::Number(*v));
            }
            section.sub_items.push(sub);
        }
        (section, student)
    }

    #[test]
    fn empty_section_averages_to_zero() {
        let (section, student) = section_with_scores(Weight::set(50.0), &[]);
        assert_eq!(section_average(&section, &student), 0.0);
    }

    #[test]
    fn missing_scores_count_as_zero_in_the_mean() {
        let (section, student) = section_with_scores(Weight::set(100.0), &[Some(8.0), None]);
        assert_eq!(section_average(&section, &student), 4.0);
    }

    #[test]
    fn unparseable_text_never_poisons_the_average() {
        let (mut section, mut student) = section_with_scores(Weight::set(100.0), &[Some(6.0)]);
        let sub = SubItem::new("Item 2");
        student
            .grades
            .insert(sub.id.clone(), ScoreEntry::Text("n/a".into()));
        section.sub_items.push(sub);

        let avg = section_average(&section, &student);
        assert!(avg.is_finite());
        assert_eq!(avg, 3.0);
    }

    #[test]
    fn evaluation_grade_is_an_unrenormalized_weighted_sum() {
        let (sec_a, mut student) = section_with_scores(Weight::set(60.0), &[Some(8.0)]);
        let (sec_b, other) = section_with_scores(Weight::set(40.0), &[Some(5.0)]);
        student.grades.extend(other.grades);

        let mut evaluation = Evaluation::new("1ª Evaluación", Weight::set(100.0));
        evaluation.sections = vec![sec_a, sec_b];

        assert!((evaluation_grade(&evaluation, &student) - 7.4).abs() < 1e-9);

        // Weights summing below 100 shrink the grade; nothing renormalizes.
        evaluation.sections[1].weight = Weight::set(20.0);
        assert!((evaluation_grade(&evaluation, &student) - 5.8).abs() < 1e-9);
    }

    #[test]
    fn unset_weight_contributes_nothing() {
        let (sec, student) = section_with_scores(Weight::unset(), &[Some(9.0)]);
        let mut evaluation = Evaluation::new("1ª Evaluación", Weight::set(100.0));
        evaluation.sections = vec![sec];
        assert_eq!(evaluation_grade(&evaluation, &student), 0.0);
    }

    #[test]
    fn course_grade_composes_evaluations() {
        let mut course = Course {
            id: "c1".into(),
            name: "Matemáticas".into(),
            evaluations: Vec::new(),
            students: Vec::new(),
            sections: None,
        };
        let mut student = Student::new("Ana");

        for (weight, grade) in [(33.0, 6.0), (33.0, 7.0), (34.0, 8.0)] {
            let mut ev = Evaluation::new("Ev", Weight::set(weight));
            let mut sec = Section::new("Única", Weight::set(100.0));
            let sub = SubItem::new("Item 1");
            student.grades.insert(sub.id.clone(), ScoreEntry::Number(grade));
            sec.sub_items.push(sub);
            ev.sections.push(sec);
            course.evaluations.push(ev);
        }

        let expected = 6.0 * 0.33 + 7.0 * 0.33 + 8.0 * 0.34;
        assert!((course_grade(&course, &student) - expected).abs() < 1e-9);
    }

    #[test]
    fn weight_validity_reports_without_blocking() {
        let exact = [Weight::set(50.0), Weight::set(50.0)];
        let v = weight_validity(exact.iter());
        assert_eq!(v.total, 100.0);
        assert!(v.is_valid);

        let short = [Weight::set(50.0), Weight::set(40.0)];
        let v = weight_validity(short.iter());
        assert_eq!(v.total, 90.0);
        assert!(!v.is_valid);

        let with_unset = [Weight::set(70.0), Weight::unset()];
        assert_eq!(weight_validity(with_unset.iter()).total, 70.0);
    }

    #[test]
    fn score_warning_fires_above_ten_only() {
        let (section, student) = section_with_scores(Weight::set(100.0), &[Some(10.0), Some(9.5)]);
        assert!(!score_warning(&section, &student));

        let (section, student) = section_with_scores(Weight::set(100.0), &[Some(12.0)]);
        assert!(score_warning(&section, &student));
        // The oversized value still feeds the average unchanged.
        assert_eq!(section_average(&section, &student), 12.0);
    }

    #[test]
    fn course_stats_split_and_mean() {
        let mut course = Course {
            id: "c1".into(),
            name: "Matemáticas".into(),
            evaluations: Vec::new(),
            students: Vec::new(),
            sections: None,
        };
        let mut ev = Evaluation::new("Única", Weight::set(100.0));
        let mut sec = Section::new("Exámenes", Weight::set(100.0));
        let sub = SubItem::new("Examen 1");
        sec.sub_items.push(sub.clone());
        ev.sections.push(sec);
        course.evaluations.push(ev);

        for (name, score) in [("Ana", 8.0), ("Benito", 4.0)] {
            let mut st = Student::new(name);
            st.grades.insert(sub.id.clone(), ScoreEntry::Number(score));
            course.students.push(st);
        }

        let stats = course_stats(&course);
        assert_eq!(stats.approved_pct, 50.0);
        assert_eq!(stats.failed_pct, 50.0);
        assert!((stats.average - 6.0).abs() < 1e-9);

        course.students.clear();
        let empty = course_stats(&course);
        assert_eq!(empty.average, 0.0);
        assert_eq!(empty.approved_pct, 0.0);
    }
}
