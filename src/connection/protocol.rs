//! Database protocols and fuzzy scheme matching

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which database driver a connection string targets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Postgres,
    Mysql,
    Sqlite,
    Libsql,
}

impl Protocol {
    /// All protocols in declaration order, which is also the tie-break order
    pub const ALL: [Protocol; 4] = [
        Protocol::Postgres,
        Protocol::Mysql,
        Protocol::Sqlite,
        Protocol::Libsql,
    ];

    /// Accepted literal spellings of the scheme
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Protocol::Postgres => &["postgres", "postgresql"],
            Protocol::Mysql => &["mysql"],
            Protocol::Sqlite => &["sqlite"],
            Protocol::Libsql => &["libsql"],
        }
    }

    /// Canonical scheme
    pub fn as_str(&self) -> &'static str {
        self.aliases()[0]
    }

    /// Port the driver uses when none is given
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Protocol::Postgres => Some(5432),
            Protocol::Mysql => Some(3306),
            Protocol::Sqlite | Protocol::Libsql => None,
        }
    }

    /// File-based protocols keep a path instead of host/port/user
    pub fn is_file_based(&self) -> bool {
        matches!(self, Protocol::Sqlite)
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Postgres => write!(f, "PostgreSQL"),
            Protocol::Mysql => write!(f, "MySQL"),
            Protocol::Sqlite => write!(f, "SQLite"),
            Protocol::Libsql => write!(f, "libSQL"),
        }
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Protocol::Postgres
    }
}

/// Acceptance rules for a typed scheme
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    /// Normalized edit distance must be strictly below this
    pub threshold: f64,
    /// Minimum number of leading characters shared with the alias
    pub min_prefix: usize,
    /// Schemes shorter than this are never accepted
    pub min_scheme_len: usize,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            min_prefix: 2,
            min_scheme_len: 4,
        }
    }
}

impl MatchRules {
    /// Check the rules can accept anything at all
    pub fn is_valid(&self) -> bool {
        self.threshold > 0.0 && self.threshold <= 1.0 && self.min_scheme_len > 0
    }
}

/// Result of matching a scheme against the alias table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProtocolMatch {
    pub protocol: Protocol,
    /// Alias the scheme was matched against
    pub alias: &'static str,
    /// Absolute edit distance to `alias`; 0 for exact matches
    pub distance: usize,
}

/// Match a scheme against the known protocols.
///
/// Smallest absolute distance wins; ties keep the earlier protocol in
/// [`Protocol::ALL`].
pub fn match_protocol(scheme: &str, rules: &MatchRules) -> Option<ProtocolMatch> {
    let scheme = scheme.to_lowercase();
    let scheme_len = scheme.chars().count();

    if scheme_len < rules.min_scheme_len {
        debug!(%scheme, min = rules.min_scheme_len, "scheme too short to match");
        return None;
    }

    let mut best: Option<ProtocolMatch> = None;

    for protocol in Protocol::ALL {
        for &alias in protocol.aliases() {
            if scheme == alias {
                return Some(ProtocolMatch {
                    protocol,
                    alias,
                    distance: 0,
                });
            }

            let distance = edit_distance(&scheme, alias);
            let longest = scheme_len.max(alias.chars().count());
            let normalized = distance as f64 / longest as f64;

            if normalized >= rules.threshold
                || common_prefix_len(&scheme, alias) < rules.min_prefix
            {
                continue;
            }

            if best.map_or(true, |b| distance < b.distance) {
                best = Some(ProtocolMatch {
                    protocol,
                    alias,
                    distance,
                });
            }
        }
    }

    if best.is_none() {
        debug!(%scheme, "no protocol within threshold");
    }

    best
}

/// Edit distance where insert, delete, substitute and adjacent transposition
/// each cost 1 (optimal string alignment).
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();
    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Three rows: i-2, i-1, i
    let mut prev2 = vec![0; b_len + 1];
    let mut prev = (0..=b_len).collect::<Vec<_>>();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);

            if i > 1
                && j > 1
                && a_chars[i - 1] == b_chars[j - 2]
                && a_chars[i - 2] == b_chars[j - 1]
            {
                curr[j] = curr[j].min(prev2[j - 2] + 1);
            }
        }
        std::mem::swap(&mut prev2, &mut prev);
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}
