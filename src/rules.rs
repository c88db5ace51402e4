//! Head-rule tables
//!
//! A [`HeadRules`] table says, for each phrasal category, which child carries
//! the lexical head. Tables are plain values: build one in code, parse one
//! from text with [`HeadRules::parse`], or start from [`HeadRules::english`].

use pest::Parser;
use pest_derive::Parser;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "head_rules.pest"]
struct HeadRulesParser;

/// Error type for head-rule loading failures
#[derive(Debug, Error)]
pub enum HeadRuleError {
    #[error("Head rule error: {0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),

    #[error("Head rule error: category {category} defined twice (line {line})")]
    DuplicateCategory { category: String, line: usize },

    #[error("Failed to read head rules from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Order in which a node's children are scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchDirection {
    LeftToRight,
    RightToLeft,
}

/// Matches a child's base category
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PosPattern {
    Exact(String),
    /// `NN*`
    Prefix(String),
    /// `*`
    Any,
}

impl PosPattern {
    /// Total: `*` is Any, a trailing `*` makes a prefix, anything else is exact
    pub fn parse(text: &str) -> Self {
        match text.strip_suffix('*') {
            Some("") => PosPattern::Any,
            Some(prefix) => PosPattern::Prefix(prefix.to_string()),
            None => PosPattern::Exact(text.to_string()),
        }
    }

    pub fn matches(&self, pos: &str) -> bool {
        match self {
            PosPattern::Exact(p) => p == pos,
            PosPattern::Prefix(p) => pos.starts_with(p.as_str()),
            PosPattern::Any => true,
        }
    }
}

/// Rule for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadRule {
    /// Direction used when no pattern matches
    pub default_direction: SearchDirection,
    /// Tried in order; the first child matching the first successful pair wins
    pub priorities: Vec<(SearchDirection, PosPattern)>,
}

impl HeadRule {
    pub fn new(default_direction: SearchDirection) -> Self {
        Self {
            default_direction,
            priorities: Vec::new(),
        }
    }

    /// Append a search in `direction` for each pattern, in order
    pub fn then<'p>(
        mut self,
        direction: SearchDirection,
        patterns: impl IntoIterator<Item = &'p str>,
    ) -> Self {
        self.priorities.extend(
            patterns
                .into_iter()
                .map(|p| (direction, PosPattern::parse(p))),
        );
        self
    }
}

/// Category → head rule table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadRules {
    rules: FxHashMap<String, HeadRule>,
    head_final: FxHashSet<String>,
}

/// Categories whose head is on the right when no rule applies
const HEAD_FINAL: &[&str] = &["NP", "NML", "NX"];

impl Default for HeadRules {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadRules {
    /// An empty table: every category falls back to its default direction
    pub fn new() -> Self {
        Self {
            rules: FxHashMap::default(),
            head_final: HEAD_FINAL.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Replace the set of categories searched right-to-left by default
    pub fn with_head_final<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.head_final = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn insert(&mut self, category: impl Into<String>, rule: HeadRule) -> Option<HeadRule> {
        self.rules.insert(category.into(), rule)
    }

    pub fn get(&self, category: &str) -> Option<&HeadRule> {
        self.rules.get(category)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Fallback scan direction for `category`
    pub fn default_direction(&self, category: &str) -> SearchDirection {
        match self.rules.get(category) {
            Some(rule) => rule.default_direction,
            None if self.head_final.contains(category) => SearchDirection::RightToLeft,
            None => SearchDirection::LeftToRight,
        }
    }

    /// Parse a rule table
    ///
    /// ```text
    /// # category  direction patterns... [; direction patterns...]
    /// PP    left IN TO VBG VBN RP FW ; left PP
    /// NP    right NN* NX POS ; left NP
    /// PRN   left
    /// ```
    pub fn parse(text: &str) -> Result<Self, HeadRuleError> {
        let mut pairs = HeadRulesParser::parse(Rule::rules, text).map_err(Box::new)?;
        let mut table = HeadRules::new();

        let Some(rules) = pairs.next() else {
            return Ok(table);
        };
        for rule in rules.into_inner() {
            if rule.as_rule() != Rule::rule {
                continue;
            }
            let line = rule.as_span().start_pos().line_col().0;
            let mut inner = rule.into_inner();
            let Some(category) = inner.next().map(|p| p.as_str().to_string()) else {
                continue;
            };

            let mut head_rule: Option<HeadRule> = None;
            for priority in inner {
                let mut parts = priority.into_inner();
                let Some(direction) = parts.next().map(|d| parse_direction(d.as_str())) else {
                    continue;
                };
                let current = head_rule.get_or_insert_with(|| HeadRule::new(direction));
                current
                    .priorities
                    .extend(parts.map(|p| (direction, PosPattern::parse(p.as_str()))));
            }

            if table.rules.contains_key(&category) {
                return Err(HeadRuleError::DuplicateCategory { category, line });
            }
            // A bare category gets the same fallback as an unlisted one
            let head_rule =
                head_rule.unwrap_or_else(|| HeadRule::new(table.default_direction(&category)));
            table.rules.insert(category, head_rule);
        }

        Ok(table)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HeadRuleError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| HeadRuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Modified Collins head rules for the Penn Treebank
    pub fn english() -> Self {
        use SearchDirection::{LeftToRight as L, RightToLeft as R};

        type Group = (SearchDirection, &'static [&'static str]);
        type Table = &'static [(&'static str, &'static [Group])];
        #[rustfmt::skip]
        const ENGLISH: Table = &[
            ("ADJP", &[(L, &["NNS", "QP", "NN", "$", "ADVP", "JJ", "VBN", "VBG", "ADJP", "JJR", "NP", "JJS", "DT", "FW", "RBR", "RBS", "SBAR", "RB"])]),
            ("ADVP", &[(R, &["RB", "RBR", "RBS", "FW", "ADVP", "TO", "CD", "JJR", "JJ", "IN", "NP", "JJS", "NN"])]),
            ("CONJP", &[(R, &["CC", "RB", "IN"])]),
            ("FRAG", &[(R, &[])]),
            ("INTJ", &[(L, &[])]),
            ("LST", &[(R, &["LS", ":"])]),
            ("NAC", &[(L, &["NN", "NNS", "NNP", "NNPS", "NP", "NAC", "EX", "$", "CD", "QP", "PRP", "VBG", "JJ", "JJS", "JJR", "ADJP", "FW"])]),
            ("NP", &[
                (R, &["NN*", "NX", "NML", "POS", "JJR"]),
                (L, &["NP"]),
                (R, &["$", "ADJP", "PRN"]),
                (R, &["CD"]),
                (R, &["JJ", "JJS", "RB", "QP"]),
            ]),
            ("NML", &[(R, &["NN*", "NX", "NML", "POS", "JJR"]), (L, &["NP"])]),
            ("NX", &[(R, &["NN*", "NX", "NML"])]),
            ("PP", &[(L, &["IN", "TO", "VBG", "VBN", "RP", "FW", "JJ", "SYM"]), (L, &["PP"])]),
            ("PRN", &[(L, &[])]),
            ("PRT", &[(R, &["RP"])]),
            ("QP", &[(L, &["$", "IN", "NNS", "NN", "JJ", "RB", "DT", "CD", "NCD", "QP", "JJR", "JJS"])]),
            ("RRC", &[(R, &["VP", "NP", "ADVP", "ADJP", "PP"])]),
            ("S", &[(L, &["TO", "IN", "VP", "S", "SBAR", "ADJP", "UCP", "NP"])]),
            ("SBAR", &[(L, &["WHNP", "WHPP", "WHADVP", "WHADJP", "IN", "DT", "S", "SQ", "SINV", "SBAR", "FRAG"])]),
            ("SBARQ", &[(L, &["SQ", "S", "SINV", "SBARQ", "FRAG"])]),
            ("SINV", &[(L, &["VBZ", "VBD", "VBP", "VB", "MD", "VP", "S", "SINV", "ADJP", "NP"])]),
            ("SQ", &[(L, &["VBZ", "VBD", "VBP", "VB", "MD", "VP", "SQ"])]),
            ("UCP", &[(R, &[])]),
            ("VP", &[(L, &["TO", "VBD", "VBN", "MD", "VBZ", "VB", "VBG", "VBP", "VP", "ADJP", "NN", "NNS", "NP"])]),
            ("WHADJP", &[(L, &["CC", "WRB", "JJ", "ADJP"])]),
            ("WHADVP", &[(R, &["CC", "WRB"])]),
            ("WHNP", &[(L, &["WDT", "WP", "WP$", "WHADJP", "WHPP", "WHNP"])]),
            ("WHPP", &[(R, &["IN", "TO", "FW"])]),
            ("X", &[(R, &[])]),
        ];

        let mut table = HeadRules::new();
        for &(category, groups) in ENGLISH {
            let Some(&(first, _)) = groups.first() else {
                continue;
            };
            let rule = groups
                .iter()
                .fold(HeadRule::new(first), |rule, &(direction, patterns)| {
                    rule.then(direction, patterns.iter().copied())
                });
            table.insert(category, rule);
        }
        table
    }
}

impl FromStr for HeadRules {
    type Err = HeadRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Grammar only admits left/right/l/r in any case
fn parse_direction(text: &str) -> SearchDirection {
    if text.as_bytes().first().is_some_and(|b| b.eq_ignore_ascii_case(&b'r')) {
        SearchDirection::RightToLeft
    } else {
        SearchDirection::LeftToRight
    }
}
