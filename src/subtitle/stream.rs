use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;
use crate::subtitle::{serializer, SubtitleEntry, Timecode};

/// Stream-level behaviour, fixed when the stream is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    /// Keep overlapping entries instead of rejecting them. Overlaps are then
    /// reported by `find_overlapping`.
    pub allow_overlap: bool,
}

/// An entry whose carried sequence index does not match its position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceMismatch {
    /// 0-based stream position
    pub position: usize,
    /// Index the entry carries
    pub found: usize,
    /// Index it would get from `renumber`
    pub expected: usize,
}

/// Ordered collection of subtitle entries.
///
/// Entries are always held in non-decreasing start order. In strict mode (the
/// default) no two entries overlap; in permissive mode overlaps are accepted
/// and can be listed with [`SubtitleStream::find_overlapping`]. Every fallible
/// operation either applies completely or leaves the stream untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleStream {
    entries: Vec<SubtitleEntry>,
    options: StreamOptions,
}

impl SubtitleStream {
    /// Empty strict stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty stream with the given options
    pub fn with_options(options: StreamOptions) -> Self {
        SubtitleStream {
            entries: Vec::new(),
            options,
        }
    }

    pub fn options(&self) -> StreamOptions {
        self.options
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at a 0-based position
    pub fn get(&self, position: usize) -> Option<&SubtitleEntry> {
        self.entries.get(position)
    }

    /// Entries in canonical order. Call again to restart.
    pub fn entries(&self) -> std::slice::Iter<'_, SubtitleEntry> {
        self.entries.iter()
    }

    /// Insert keeping start order; an entry sharing its start time with
    /// existing ones goes after them. Returns the position it landed at.
    pub fn insert(&mut self, entry: SubtitleEntry) -> Result<usize, SubtitleError> {
        let position = self.insertion_point(&entry);
        if !self.options.allow_overlap {
            self.check_neighbours(&entry, position)?;
        }
        self.entries.insert(position, entry);
        Ok(position)
    }

    /// Remove and return the entry at `position`
    pub fn remove(&mut self, position: usize) -> Result<SubtitleEntry, SubtitleError> {
        if position >= self.entries.len() {
            return Err(SubtitleError::IndexOutOfRange {
                index: position,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(position))
    }

    /// Swap the entry at `position` for `entry`, re-sorting as needed.
    /// Returns the new position and the entry that was replaced.
    pub fn replace(&mut self, position: usize, entry: SubtitleEntry) -> Result<(usize, SubtitleEntry), SubtitleError> {
        let removed = self.remove(position)?;
        match self.insert(entry) {
            Ok(new_position) => Ok((new_position, removed)),
            Err(e) => {
                self.entries.insert(position, removed);
                Err(e)
            }
        }
    }

    /// Replace the text of the entry at `position`, keeping its timing
    pub fn set_text<I, S>(&mut self, position: usize, lines: I) -> Result<(), SubtitleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(position)
            .ok_or(SubtitleError::IndexOutOfRange { index: position, len })?;
        *entry = entry.with_text(lines)?;
        Ok(())
    }

    /// Move every entry by `delta_ms`. Nothing changes if any entry would
    /// start before zero.
    pub fn shift_all(&mut self, delta_ms: i64) -> Result<(), SubtitleError> {
        let shifted = self
            .entries
            .iter()
            .map(|entry| entry.shift(delta_ms))
            .collect::<Result<Vec<_>, _>>()?;
        self.entries = shifted;
        Ok(())
    }

    /// Multiply every start and end by `factor`, e.g. `25.0 / 23.976` to
    /// retime between frame rates. All or nothing.
    pub fn scale_all(&mut self, factor: f64) -> Result<(), SubtitleError> {
        let scaled = self
            .entries
            .iter()
            .map(|entry| entry.scale(factor))
            .collect::<Result<Vec<_>, _>>()?;
        // Rounding is monotonic, so order and non-overlap carry over
        self.entries = scaled;
        Ok(())
    }

    /// Shift so the earliest entry starts at zero
    pub fn shift_to_zero(&mut self) -> Result<(), SubtitleError> {
        match self.entries.first() {
            Some(first) => {
                let delta = i64::try_from(first.start().as_millis()).map_err(|_| {
                    SubtitleError::InvalidTimecode(format!("{} is too large to shift", first.start()))
                })?;
                self.shift_all(-delta)
            }
            None => Ok(()),
        }
    }

    /// Pairs of positions `(i, j)`, `i < j`, whose time ranges intersect
    pub fn find_overlapping(&self) -> BTreeSet<(usize, usize)> {
        let mut pairs = BTreeSet::new();
        for (i, entry) in self.entries.iter().enumerate() {
            // Later entries start no earlier, so stop at the first one that
            // starts after this one ends
            for (offset, later) in self.entries[i + 1..].iter().enumerate() {
                if later.start() >= entry.end() {
                    break;
                }
                pairs.insert((i, i + 1 + offset));
            }
        }
        pairs
    }

    /// Reassign sequence indices 1..=N in stream order
    pub fn renumber(&mut self) {
        for (position, entry) in self.entries.iter_mut().enumerate() {
            entry.set_index(position + 1);
        }
    }

    /// Entries whose carried index differs from what `renumber` would give
    pub fn check_sequence(&self) -> Vec<SequenceMismatch> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(position, entry)| entry.index() != position + 1)
            .map(|(position, entry)| SequenceMismatch {
                position,
                found: entry.index(),
                expected: position + 1,
            })
            .collect()
    }

    /// End of the latest-ending entry
    pub fn duration(&self) -> Option<Timecode> {
        self.entries.iter().map(SubtitleEntry::end).max()
    }

    /// The whole text as one line, entries separated by spaces
    pub fn script(&self) -> String {
        self.entries
            .iter()
            .flat_map(|entry| entry.lines().iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// New stream holding copies of the entries in `range`
    pub fn slice(&self, range: Range<usize>) -> Result<SubtitleStream, SubtitleError> {
        let len = self.entries.len();
        let entries = self.entries.get(range.clone()).ok_or(SubtitleError::IndexOutOfRange {
            index: range.end.max(range.start),
            len,
        })?;
        Ok(SubtitleStream {
            entries: entries.to_vec(),
            options: self.options,
        })
    }

    fn insertion_point(&self, entry: &SubtitleEntry) -> usize {
        self.entries.partition_point(|existing| existing.start() <= entry.start())
    }

    // Strict streams never hold overlaps and are sorted by start, so ends are
    // sorted too: only the entries either side of the slot can collide.
    fn check_neighbours(&self, entry: &SubtitleEntry, position: usize) -> Result<(), SubtitleError> {
        let before = position.checked_sub(1);
        for neighbour in [before, Some(position)].into_iter().flatten() {
            if let Some(existing) = self.entries.get(neighbour) {
                if existing.overlaps(entry) {
                    return Err(SubtitleError::OverlapError {
                        start: entry.start(),
                        end: entry.end(),
                        position: neighbour,
                    });
                }
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SubtitleStream {
    type Item = &'a SubtitleEntry;
    type IntoIter = std::slice::Iter<'a, SubtitleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for SubtitleStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serializer::serialize(self))
    }
}
