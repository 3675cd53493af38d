/// Temporal granularity of an order's start/end dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Hourly,
    Day,
    Month,
    Year,
}

impl Granularity {
    /// Number of leading characters of a `yyyymmddHH` timestamp kept at this
    /// granularity. `None` keeps the timestamp unchanged.
    pub fn prefix_len(self) -> Option<usize> {
        match self {
            Granularity::Hourly => None,
            Granularity::Day => Some(8),
            Granularity::Month => Some(6),
            Granularity::Year => Some(4),
        }
    }

    /// Textual truncation of a `yyyymmddHH` timestamp.
    ///
    /// No calendar checks are made: input shorter than the prefix is returned
    /// unchanged and malformed input passes straight through.
    pub fn truncate(self, timestamp: &str) -> &str {
        match self.prefix_len() {
            Some(n) => char_prefix(timestamp, n),
            None => timestamp,
        }
    }
}

fn char_prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_per_granularity() {
        assert_eq!(Granularity::Hourly.truncate("2021010112"), "2021010112");
        assert_eq!(Granularity::Day.truncate("2021010112"), "20210101");
        assert_eq!(Granularity::Month.truncate("2021010112"), "202101");
        assert_eq!(Granularity::Year.truncate("2021010112"), "2021");
    }

    #[test]
    fn short_input_is_kept() {
        assert_eq!(Granularity::Day.truncate("202101"), "202101");
        assert_eq!(Granularity::Year.truncate(""), "");
    }

    #[test]
    fn non_ascii_does_not_split_characters() {
        assert_eq!(Granularity::Year.truncate("２０２１０１"), "２０２１");
    }
}
