use crate::model::{new_id, Course, Evaluation, Weight};

/// Name given to the synthetic evaluation that wraps a legacy course's
/// sections.
pub const LEGACY_EVALUATION_NAME: &str = "Evaluación Principal";

/// Normalize one persisted course record into the current three-level
/// schema. Returns the course plus whether anything changed.
///
/// Legacy records hang sections directly off the course; those become a
/// single synthetic evaluation at weight 100 wrapping the old sections.
/// A record with neither shape just gets an empty evaluations list.
/// Already-current records pass through untouched, which is what makes
/// the whole pass idempotent.
pub fn migrate_course(mut course: Course) -> (Course, bool) {
    let has_legacy_sections = course
        .sections
        .as_ref()
        .map(|s| !s.is_empty())
        .unwrap_or(false);

    if has_legacy_sections && course.evaluations.is_empty() {
        let sections = course.sections.take().unwrap_or_default();
        course.evaluations = vec![Evaluation {
            id: new_id(),
            name: LEGACY_EVALUATION_NAME.to_string(),
            weight: Weight::set(100.0),
            sections,
        }];
        return (course, true);
    }

    // An empty legacy list carries no data; drop the field either way.
    if course.sections.take().is_some() {
        return (course, true);
    }

    (course, false)
}

/// Run the migration over a whole persisted collection. The caller
/// replaces persisted state with the result iff anything changed.
pub fn migrate_courses(courses: Vec<Course>) -> (Vec<Course>, usize) {
    let mut changed = 0usize;
    let migrated = courses
        .into_iter()
        .map(|c| {
            let (c, did) = migrate_course(c);
            if did {
                changed += 1;
            }
            c
        })
        .collect();
    (migrated, changed)
}
