//! Subjects and their glyph ranges
//!
//! A subject is a cosmetic choice (an animal, or one of the special
//! battery/bandwidth pictures) backed by a half-open range of code points in
//! the runcat icon font. Frames for a subject are simply the code points of
//! its range, in order.

use crate::error::{PetError, Result};
use rand::Rng;

/// Subject used when none is configured
pub const DEFAULT_SUBJECT: &str = "cat";

/// One named glyph range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub name: String,
    /// First code point
    pub start: u32,
    /// One past the last code point
    pub end: u32,
    /// Whether the subject can be picked for the zoo
    pub zoo: bool,
}

impl Subject {
    pub fn new(name: impl Into<String>, start: u32, end: u32) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            zoo: true,
        }
    }

    /// Number of frames in one cycle
    pub fn period(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    fn glyph(&self, offset: u32) -> Result<char> {
        char::from_u32(self.start + offset).ok_or_else(|| {
            PetError::config(format!(
                "subject '{}' contains invalid code point {:#x}",
                self.name,
                self.start + offset
            ))
        })
    }

    /// One single-glyph frame per code point of the range
    pub fn frames(&self) -> Result<Vec<String>> {
        (0..self.period())
            .map(|offset| self.glyph(offset).map(String::from))
            .collect()
    }
}

/// Lookup table of known subjects
///
/// Custom subjects are inserted ahead of the special entries so the special
/// entries always stay at the end of the table.
#[derive(Debug, Clone)]
pub struct SubjectTable {
    subjects: Vec<Subject>,
}

impl Default for SubjectTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SubjectTable {
    /// Glyph ranges of the bundled runcat font
    pub fn builtin() -> Self {
        let animals = [
            ("cat", 0xE000, 0xE005),
            ("parrot", 0xE005, 0xE00F),
            ("horse", 0xE00F, 0xE014),
            ("dog", 0xE014, 0xE01A),
            ("rabbit", 0xE01A, 0xE01E),
            ("frog", 0xE01E, 0xE024),
            ("dino", 0xE024, 0xE02A),
            ("penguin", 0xE02A, 0xE030),
        ];
        let specials = [("eiffel", 0xE030, 0xE03A), ("pigeon", 0xE03A, 0xE042)];

        let mut subjects: Vec<Subject> = animals
            .iter()
            .map(|(name, start, end)| Subject::new(*name, *start, *end))
            .collect();
        subjects.extend(specials.iter().map(|(name, start, end)| Subject {
            zoo: false,
            ..Subject::new(*name, *start, *end)
        }));

        Self { subjects }
    }

    /// Add or replace a subject
    pub fn insert(&mut self, subject: Subject) -> Result<()> {
        if subject.start >= subject.end {
            return Err(PetError::config(format!(
                "subject '{}' has an empty glyph range",
                subject.name
            )));
        }

        if let Some(existing) = self.subjects.iter_mut().find(|s| s.name == subject.name) {
            let zoo = existing.zoo;
            *existing = Subject { zoo, ..subject };
            return Ok(());
        }

        let position = self
            .subjects
            .iter()
            .position(|s| !s.zoo)
            .unwrap_or(self.subjects.len());
        self.subjects.insert(position, subject);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Subject> {
        self.subjects
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| PetError::config(format!("unknown subject '{}'", name)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.subjects.iter().map(|s| s.name.as_str())
    }

    /// Subjects that may appear in the zoo
    pub fn zoo_candidates(&self) -> Vec<&Subject> {
        self.subjects.iter().filter(|s| s.zoo).collect()
    }

    /// Pick `count` distinct zoo subjects at random
    pub fn pick_zoo<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Result<Vec<&Subject>> {
        let candidates = self.zoo_candidates();
        if count == 0 || count > candidates.len() {
            return Err(PetError::config(format!(
                "zoo needs between 1 and {} animals, got {}",
                candidates.len(),
                count
            )));
        }

        Ok(rand::seq::index::sample(rng, candidates.len(), count)
            .into_iter()
            .map(|i| candidates[i])
            .collect())
    }
}

/// Frames followed by the inner frames in reverse, for a back-and-forth swing
///
/// `[a, b, c, d]` becomes `[a, b, c, d, c, b]`.
pub fn bounce_frames<T: Clone>(frames: &[T]) -> Vec<T> {
    let mut out = frames.to_vec();
    if frames.len() > 2 {
        out.extend(frames[1..frames.len() - 1].iter().rev().cloned());
    }
    out
}

/// Longest composite cycle a zoo may have
pub const MAX_ZOO_FRAMES: u64 = 10_000;

/// Interleave several subjects into one composite animation
///
/// Frame `i` concatenates, for every subject, its glyph at `i % period`. The
/// combined cycle is the least common multiple of the individual periods so
/// every subject completes whole cycles.
pub fn zoo_frames(subjects: &[&Subject]) -> Result<Vec<String>> {
    if subjects.is_empty() {
        return Err(PetError::config("zoo has no animals"));
    }
    if let Some(empty) = subjects.iter().find(|s| s.period() == 0) {
        return Err(PetError::config(format!(
            "subject '{}' has an empty glyph range",
            empty.name
        )));
    }

    let mut length = 1;
    for subject in subjects {
        length = lcm(length, u64::from(subject.period()));
        if length > MAX_ZOO_FRAMES {
            return Err(PetError::config(format!(
                "zoo cycle exceeds {} frames; pick subjects with shorter ranges",
                MAX_ZOO_FRAMES
            )));
        }
    }

    (0..length)
        .map(|i| {
            subjects
                .iter()
                .map(|s| s.glyph((i % u64::from(s.period())) as u32))
                .collect::<Result<String>>()
        })
        .collect()
}

/// Comma-separated subject names, used as the zoo label
pub fn zoo_label(subjects: &[&Subject]) -> String {
    subjects
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn lcm(a: u64, b: u64) -> u64 {
    a / gcd(a, b) * b
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_specials_are_last() {
        let table = SubjectTable::builtin();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(&names[names.len() - 2..], &["eiffel", "pigeon"]);
        assert!(table.zoo_candidates().iter().all(|s| s.name != "eiffel"));
    }

    #[test]
    fn test_subject_frames() {
        let subject = Subject::new("tiny", 0xE100, 0xE103);
        let frames = subject.frames().unwrap();
        assert_eq!(frames, vec!["\u{e100}", "\u{e101}", "\u{e102}"]);
    }

    #[test]
    fn test_unknown_subject() {
        let table = SubjectTable::builtin();
        assert!(table.get("unicorn").unwrap_err().is_config());
        assert_eq!(table.get("cat").unwrap().period(), 5);
    }

    #[test]
    fn test_insert_custom_before_specials() {
        let mut table = SubjectTable::builtin();
        table.insert(Subject::new("owl", 0xE200, 0xE204)).unwrap();

        let names: Vec<&str> = table.names().collect();
        assert_eq!(&names[names.len() - 3..], &["owl", "eiffel", "pigeon"]);
        assert!(table.insert(Subject::new("void", 0xE300, 0xE300)).is_err());
    }

    #[test]
    fn test_replace_keeps_zoo_flag() {
        let mut table = SubjectTable::builtin();
        table.insert(Subject::new("eiffel", 0xE400, 0xE402)).unwrap();
        let eiffel = table.get("eiffel").unwrap();
        assert_eq!(eiffel.start, 0xE400);
        assert!(!eiffel.zoo);
    }

    #[test]
    fn test_bounce_frames() {
        assert_eq!(bounce_frames(&[1, 2, 3, 4]), vec![1, 2, 3, 4, 3, 2]);
        assert_eq!(bounce_frames(&[1, 2]), vec![1, 2]);
        assert_eq!(bounce_frames(&[1]), vec![1]);
    }

    #[test]
    fn test_zoo_frames_cycle_is_lcm() {
        let a = Subject::new("a", 0xE000, 0xE002);
        let b = Subject::new("b", 0xE010, 0xE013);
        let frames = zoo_frames(&[&a, &b]).unwrap();

        assert_eq!(frames.len(), 6);
        assert_eq!(frames[0], "\u{e000}\u{e010}");
        assert_eq!(frames[1], "\u{e001}\u{e011}");
        assert_eq!(frames[2], "\u{e000}\u{e012}");
        assert_eq!(frames[5], "\u{e001}\u{e012}");
    }

    #[test]
    fn test_zoo_frames_rejects_huge_cycle() {
        let a = Subject::new("a", 0xE000, 0xE000 + 9_973);
        let b = Subject::new("b", 0xF0000, 0xF0000 + 9_967);

        let err = zoo_frames(&[&a, &b]).unwrap_err();
        assert!(err.is_config());

        let short = Subject::new("short", 0xE000, 0xE002);
        assert!(zoo_frames(&[&a, &short]).unwrap_err().is_config());
        assert_eq!(zoo_frames(&[&short]).unwrap().len(), 2);
    }

    #[test]
    fn test_pick_zoo() {
        let table = SubjectTable::builtin();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);

        let picked = table.pick_zoo(3, &mut rng).unwrap();
        assert_eq!(picked.len(), 3);
        assert!(picked.iter().all(|s| s.zoo));
        assert_ne!(picked[0].name, picked[1].name);

        assert!(table.pick_zoo(0, &mut rng).is_err());
        assert!(table.pick_zoo(100, &mut rng).is_err());
        assert_eq!(zoo_label(&picked).matches(", ").count(), 2);
    }
}
