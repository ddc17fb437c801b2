use crate::error::UsageError;
use std::collections::HashSet;
use std::fmt;

/// Upper bound on the number of hosts one expression may expand to.
pub const MAX_HOSTS: usize = 65_536;

/// An expanded list of host names, parsed from the compact bracket notation
/// used by cluster schedulers (`node[1-4,7],login1`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hostlist {
    hosts: Vec<String>,
    index: HashSet<String>,
}

impl Hostlist {
    /// Fails on malformed input and on expressions naming more than
    /// [`MAX_HOSTS`] hosts.
    pub fn parse(expr: &str) -> Result<Self, UsageError> {
        let invalid = || UsageError::InvalidHostlist(expr.to_string());
        let mut hosts = Vec::new();

        for term in split_top_level(expr).ok_or_else(invalid)? {
            let term = term.trim();
            if term.is_empty() {
                continue;
            }
            match term.find('[') {
                None => {
                    if term.contains(']') {
                        return Err(invalid());
                    }
                    if hosts.len() >= MAX_HOSTS {
                        return Err(invalid());
                    }
                    hosts.push(term.to_string());
                }
                Some(open) => {
                    let close = term.find(']').ok_or_else(invalid)?;
                    if close < open {
                        return Err(invalid());
                    }
                    let prefix = &term[..open];
                    let ranges = &term[open + 1..close];
                    let suffix = &term[close + 1..];
                    if suffix.contains('[') || suffix.contains(']') {
                        return Err(invalid());
                    }
                    for range in ranges.split(',') {
                        expand_range(range.trim(), prefix, suffix, &mut hosts)
                            .ok_or_else(invalid)?;
                    }
                }
            }
        }

        let mut index = HashSet::with_capacity(hosts.len());
        hosts.retain(|h| index.insert(h.clone()));
        Ok(Self { hosts, index })
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }

    pub fn contains(&self, host: &str) -> bool {
        self.index.contains(host)
    }

    /// True if at least one host appears in both lists.
    pub fn intersects(&self, other: &Hostlist) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.hosts.iter().any(|h| large.contains(h))
    }
}

impl fmt::Display for Hostlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hosts.join(","))
    }
}

/// Split on commas that are not inside brackets. `None` on unbalanced brackets.
fn split_top_level(expr: &str) -> Option<Vec<&str>> {
    let mut terms = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in expr.char_indices() {
        match c {
            '[' => {
                if depth > 0 {
                    return None;
                }
                depth += 1;
            }
            ']' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                terms.push(&expr[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    terms.push(&expr[start..]);
    Some(terms)
}

fn expand_range(range: &str, prefix: &str, suffix: &str, hosts: &mut Vec<String>) -> Option<()> {
    let (lo, hi) = range.split_once('-').unwrap_or((range, range));
    if lo.is_empty() || !lo.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if hi.is_empty() || !hi.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let width = lo.len();
    let start: u64 = lo.parse().ok()?;
    let end: u64 = hi.parse().ok()?;
    if end < start || end - start >= (MAX_HOSTS - hosts.len()) as u64 {
        return None;
    }
    for n in start..=end {
        hosts.push(format!("{prefix}{n:0width$}{suffix}"));
    }
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(expr: &str) -> Vec<String> {
        Hostlist::parse(expr)
            .unwrap()
            .iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_plain_names() {
        assert_eq!(hosts("a1,b1"), vec!["a1", "b1"]);
        assert_eq!(hosts(""), Vec::<String>::new());
    }

    #[test]
    fn test_bracket_ranges() {
        assert_eq!(
            hosts("node[1-3,7],login1"),
            vec!["node1", "node2", "node3", "node7", "login1"]
        );
    }

    #[test]
    fn test_zero_padding_and_suffix() {
        assert_eq!(hosts("gpu[08-10]-ib"), vec!["gpu08-ib", "gpu09-ib", "gpu10-ib"]);
    }

    #[test]
    fn test_duplicates_are_dropped() {
        assert_eq!(hosts("n[1-2],n2"), vec!["n1", "n2"]);
    }

    #[test]
    fn test_malformed() {
        for expr in ["node[1-3", "node]1[", "node[3-1]", "node[a-b]", "n[1]x[2]", "n[[1]]"] {
            assert!(Hostlist::parse(expr).is_err(), "{expr} should not parse");
        }
    }

    #[test]
    fn test_intersects() {
        let job = Hostlist::parse("a2,b1").unwrap();
        assert!(job.intersects(&Hostlist::parse("b[1-2]").unwrap()));
        assert!(!job.intersects(&Hostlist::parse("c1").unwrap()));
        assert!(!Hostlist::default().intersects(&job));
    }

    #[test]
    fn test_expansion_is_bounded() {
        assert_eq!(Hostlist::parse("n[1-65536]").unwrap().len(), MAX_HOSTS);
        assert_eq!(
            Hostlist::parse("n[1-20000000]"),
            Err(UsageError::InvalidHostlist("n[1-20000000]".to_string()))
        );
        assert!(Hostlist::parse("a[1-65536],b1").is_err());
        assert!(Hostlist::parse("a[1-40000],b[1-40000]").is_err());
    }

    #[test]
    fn test_intersects_large_lists() {
        let left = Hostlist::parse("n[1-30000]").unwrap();
        let right = Hostlist::parse("n[30000-60000]").unwrap();
        assert!(left.intersects(&right));
        assert!(right.intersects(&left));
        assert!(!left.intersects(&Hostlist::parse("m[1-30000]").unwrap()));
    }

    #[test]
    fn test_display_joins_expanded_hosts() {
        assert_eq!(Hostlist::parse("n[1-2]").unwrap().to_string(), "n1,n2");
    }
}
