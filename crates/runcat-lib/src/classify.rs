//! State classification
//!
//! Maps a percentage onto a named bucket using an ordered threshold table.
//! Thresholds are not limited to `0..=100`: temperature and cpu-delta values
//! are passed through unclamped, so their tables may use larger thresholds.

/// Ordered mapping from state name to threshold
///
/// Entries are kept sorted ascending by threshold. The sort is stable, so
/// entries sharing a threshold keep the order they were given in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThresholdTable {
    entries: Vec<(String, i64)>,
}

impl ThresholdTable {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut entries: Vec<(String, i64)> = entries
            .into_iter()
            .map(|(name, threshold)| (name.into(), threshold))
            .collect();
        entries.sort_by_key(|(_, threshold)| *threshold);
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(name, t)| (name.as_str(), *t))
    }

    /// See [`classify`]
    pub fn classify(&self, percent: i64) -> String {
        classify(percent, self)
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for ThresholdTable {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Name of the highest threshold not exceeding `percent`, or empty
///
/// Walks the table in ascending order and keeps overwriting the match, so on
/// equal thresholds the entry listed last wins.
pub fn classify(percent: i64, table: &ThresholdTable) -> String {
    let mut state = "";
    for (name, threshold) in table.iter() {
        if threshold <= percent {
            state = name;
        }
    }
    state.to_string()
}
