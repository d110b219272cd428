use regex::Regex;
use std::sync::LazyLock;

static AVERAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"average (\w+)").unwrap_or_else(|e| panic!("invalid average regex: {e}"))
});

static GROUP_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"show (.+) by (.+)").unwrap_or_else(|e| panic!("invalid group regex: {e}"))
});

static UNIQUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"unique (.+)").unwrap_or_else(|e| panic!("invalid unique regex: {e}"))
});

/// What a query asks for. Column tokens are the raw lower-cased keywords; they
/// are resolved against the table later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    ListColumns,
    RowCount,
    Average(String),
    GroupCount { target: String, by: String },
    Unique(String),
    Unrecognized,
}

impl Intent {
    /// Applies the first matching rule to the lower-cased, trimmed query.
    pub fn parse(query: &str) -> Self {
        let query = query.trim().to_lowercase();

        if query.contains("columns") {
            return Self::ListColumns;
        }
        if query.contains("total") && (query.contains("rows") || query.contains("records")) {
            return Self::RowCount;
        }
        if let Some(caps) = AVERAGE.captures(&query)
            && let Some(token) = caps.get(1)
        {
            return Self::Average(token.as_str().to_owned());
        }
        if let Some(caps) = GROUP_COUNT.captures(&query)
            && let (Some(target), Some(by)) = (caps.get(1), caps.get(2))
        {
            return Self::GroupCount {
                target: target.as_str().to_owned(),
                by: by.as_str().to_owned(),
            };
        }
        if let Some(caps) = UNIQUE.captures(&query)
            && let Some(token) = caps.get(1)
        {
            return Self::Unique(token.as_str().to_owned());
        }
        Self::Unrecognized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order() {
        assert_eq!(Intent::parse("show columns"), Intent::ListColumns);
        // "columns" wins over every later rule.
        assert_eq!(Intent::parse("average columns"), Intent::ListColumns);
        assert_eq!(Intent::parse("  Total ROWS "), Intent::RowCount);
        assert_eq!(Intent::parse("total records please"), Intent::RowCount);
        assert_eq!(Intent::parse("total"), Intent::Unrecognized);
    }

    #[test]
    fn test_average_takes_one_word() {
        assert_eq!(
            Intent::parse("Average Done Unit"),
            Intent::Average("done".to_owned())
        );
    }

    #[test]
    fn test_group_count_is_greedy() {
        assert_eq!(
            Intent::parse("show total maintenance by user"),
            Intent::GroupCount {
                target: "total maintenance".to_owned(),
                by: "user".to_owned(),
            }
        );
        assert_eq!(
            Intent::parse("show a by b by c"),
            Intent::GroupCount {
                target: "a by b".to_owned(),
                by: "c".to_owned(),
            }
        );
    }

    #[test]
    fn test_unique_and_fallback() {
        assert_eq!(Intent::parse("unique service"), Intent::Unique("service".to_owned()));
        assert_eq!(Intent::parse("hello"), Intent::Unrecognized);
        assert_eq!(Intent::parse(""), Intent::Unrecognized);
    }
}
