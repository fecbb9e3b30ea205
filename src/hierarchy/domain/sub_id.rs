use serde::Serialize;
use std::cmp::Ordering;

/// NewType wrapper for the legacy SUB_ID column with numeric-aware ordering
///
/// Values with a leading run of digits compare by that number first (of any
/// length, so "10" sorts after "9"), then by the remaining suffix ("26" < "26W").
/// Values without a numeric prefix fall back to plain string ordering.
/// The raw text is the final tie-break, which keeps `Ord` consistent with `Eq`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubId(String);

impl SubId {
    /// Creates a SubId, trimming the padding legacy CHAR columns carry
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Splits the value into its leading digits and the rest
    fn numeric_prefix(&self) -> Option<(&str, &str)> {
        let digits = self.0.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            None
        } else {
            Some(self.0.split_at(digits))
        }
    }
}

/// Compares two ASCII digit runs as unbounded integers
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl Ord for SubId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric_prefix(), other.numeric_prefix()) {
            (Some((a_num, a_suffix)), Some((b_num, b_suffix))) => compare_digit_runs(a_num, b_num)
                .then_with(|| a_suffix.cmp(b_suffix))
                .then_with(|| self.0.cmp(&other.0)),
            _ => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for SubId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for SubId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SubId {
    fn from(raw: &str) -> Self {
        SubId::new(raw)
    }
}
