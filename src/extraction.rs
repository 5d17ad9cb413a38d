//! Segment-group extraction and field addressing.
//!
//! [`extract`] carves a contiguous run of lines out of a line sequence, stopping
//! at the first boundary tag. [`FieldPath`] addresses a single value inside such
//! a run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::segment::Line;

/// A contiguous run of lines borrowed from a line sequence.
///
/// Groups are produced by [`extract`], handed to a record creator and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentGroup<'a> {
    lines: &'a [Line],
    start: usize,
}

impl<'a> SegmentGroup<'a> {
    /// Index of the first line of the group in the original sequence.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Index one past the last line of the group in the original sequence.
    pub fn end(&self) -> usize {
        self.start + self.lines.len()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &'a [Line] {
        self.lines
    }

    pub fn iter(&self) -> std::slice::Iter<'a, Line> {
        self.lines.iter()
    }
}

/// Extract the group starting at `start` and ending just before the next line
/// whose tag is in `boundary` (or at the end of `lines`).
///
/// `start == lines.len()` yields an empty group, as does a `start` line that is
/// itself a boundary tag.
///
/// # Panics
///
/// Panics if `start > lines.len()`.
///
/// # Example
///
/// ```
/// use edifact_inbound::{extract, Line};
///
/// let lines: Vec<Line> = ["S01+1", "RFF+TN:17", "S02+2", "UNT+4+1"]
///     .iter()
///     .map(|raw| Line::parse(raw))
///     .collect();
///
/// let group = extract(&lines, 1, &["S01", "S02", "UNT"]);
/// assert_eq!(group.start(), 1);
/// assert_eq!(group.len(), 1);
/// ```
pub fn extract<'a>(lines: &'a [Line], start: usize, boundary: &[&str]) -> SegmentGroup<'a> {
    assert!(
        start <= lines.len(),
        "extract start {} is past the end of a {}-line sequence",
        start,
        lines.len()
    );

    let remaining = &lines[start..];
    let len = remaining
        .iter()
        .position(|line| boundary.iter().any(|tag| *tag == line.tag()))
        .unwrap_or(remaining.len());

    SegmentGroup {
        lines: &remaining[..len],
        start,
    }
}

/// Address of a value inside a segment group.
///
/// Textual form: `TAG[QUALIFIER]+ELEMENT:COMPONENT`, where the qualifier and
/// component are optional.
///
/// - `UNB+2` - whole element 2 of the `UNB` segment
/// - `RFF[TN]+1:1` - component 1 of element 1 of the `RFF` segment qualified `TN`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    /// Segment tag the value lives in
    pub segment: String,

    /// Required value of element 1, component 0
    pub qualifier: Option<String>,

    /// Element index (the tag is element 0)
    pub element: usize,

    /// Component index, or the whole element when absent
    pub component: Option<usize>,
}

impl FieldPath {
    /// Parse a field path from its textual form.
    pub fn parse(path: &str) -> Result<Self, String> {
        let (head, position) = path
            .split_once('+')
            .ok_or_else(|| format!("Field path '{}' has no element position", path))?;

        let (segment, qualifier) = match head.split_once('[') {
            Some((segment, rest)) => {
                let qualifier = rest
                    .strip_suffix(']')
                    .ok_or_else(|| format!("Field path '{}' has an unclosed qualifier", path))?;
                if qualifier.is_empty() {
                    return Err(format!("Field path '{}' has an empty qualifier", path));
                }
                (segment, Some(qualifier.to_string()))
            }
            None => (head, None),
        };

        if segment.is_empty() {
            return Err(format!("Field path '{}' has no segment tag", path));
        }

        let (element, component) = match position.split_once(':') {
            Some((element, component)) => (element, Some(component)),
            None => (position, None),
        };

        let element = element
            .parse::<usize>()
            .map_err(|_| format!("Field path '{}' has an invalid element index", path))?;
        let component = component
            .map(|c| c.parse::<usize>())
            .transpose()
            .map_err(|_| format!("Field path '{}' has an invalid component index", path))?;

        Ok(Self {
            segment: segment.to_string(),
            qualifier,
            element,
            component,
        })
    }

    /// True if `line` is the segment this path points into.
    pub fn matches(&self, line: &Line) -> bool {
        line.tag() == self.segment
            && self
                .qualifier
                .as_deref()
                .map_or(true, |q| line.qualifier() == Some(q))
    }
}

impl TryFrom<String> for FieldPath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segment)?;
        if let Some(qualifier) = &self.qualifier {
            write!(f, "[{}]", qualifier)?;
        }
        write!(f, "+{}", self.element)?;
        if let Some(component) = self.component {
            write!(f, ":{}", component)?;
        }
        Ok(())
    }
}

/// Something a [`FieldPath`] can be resolved against.
pub trait FieldSource {
    /// Resolve the value at `path`.
    ///
    /// Returns `Some(value)` if a matching segment has that position, `None`
    /// otherwise.
    fn locate(&self, path: &FieldPath) -> Option<String>;
}

impl FieldSource for Line {
    fn locate(&self, path: &FieldPath) -> Option<String> {
        if !path.matches(self) {
            return None;
        }
        self.value(path.element, path.component)
    }
}

impl FieldSource for SegmentGroup<'_> {
    /// The first segment matching the path's tag and qualifier wins.
    fn locate(&self, path: &FieldPath) -> Option<String> {
        self.iter()
            .find(|line| path.matches(line))
            .and_then(|line| line.value(path.element, path.component))
    }
}
