//! Ordered title patterns and the first-match title matcher.
//!
//! Patterns are plain data: a name and a regex with named groups. A
//! `PatternSet` is tried in order and the first pattern that matches at the
//! start of the title wins, so sets are written most-specific-first.
//! Supporting a new phrasing means adding one entry, either to the built-in
//! tables below or to a YAML pattern file loaded at runtime.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::{HarvesterError, Result};

/// Built-in appointment phrasings, most specific first.
pub const APPOINTMENT_PATTERNS: &[(&str, &str)] = &[
    // Real Decreto 368/2019, de 31 de mayo, por el que se nombra Magistrado de la Sala Primera
    // del Tribunal Supremo a don José Luis Seoane Spiegelberg.
    (
        "position-before-person",
        r"Real Decreto .+ nombra (?P<position>President.|Magistrad.) (?:del|de la) (?:(?P<chamber>Sala .+?) (?:del|de la) )?(?P<court>[^,]+)(?: correspondiente[^,]+)??(?:,.+)? a do(?:n|ña) (?P<person>.+)\.",
    ),
    // Real Decreto 899/2018, de 13 de julio, por el que se nombra a don Javier María Calderón
    // González, Magistrado de la Audiencia Provincial de Madrid correspondiente al orden penal.
    (
        "person-before-position",
        r"Real Decreto .+ nombra a do(?:n|ña) (?P<person>.+), (?P<position>President.|Magistrad.) (?:del|de la) (?:(?P<chamber>Sala .+?) (?:del|de la) )?(?P<court>[^,]+?)(?: correspondiente[^,]+)?(?:,.+)?\.",
    ),
];

/// Built-in situation phrasings.
pub const SITUATION_PATTERNS: &[(&str, &str)] = &[
    // Acuerdo de 30 de abril de 2019, de la Comisión Permanente del Consejo General del Poder
    // Judicial, por el que se declara la jubilación forzosa del Magistrado don Alberto
    // Gumersindo Jorge Barreiro, al cumplir la edad legalmente establecida.
    (
        "retirement",
        r"Acuerdo .+ jubilación .+ Magistrad. do(?:n|ña) (?P<person>[^.,]+).+",
    ),
];

/// A named regex matched against item titles.
#[derive(Debug, Clone)]
pub struct TitlePattern {
    name: String,
    regex: Regex,
}

impl TitlePattern {
    /// Compile a pattern, anchoring it at the start of the title.
    pub fn new(name: impl Into<String>, source: &str) -> Result<Self> {
        let name = name.into();
        let regex = Regex::new(&format!("^(?:{source})")).map_err(|source| {
            HarvesterError::InvalidPattern {
                name: name.clone(),
                source,
            }
        })?;
        Ok(Self { name, regex })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the capture groups this pattern defines.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.regex.capture_names().flatten()
    }

    fn captures(&self, title: &str) -> Option<BTreeMap<String, Option<String>>> {
        let caps = self.regex.captures(title)?;
        Some(
            self.group_names()
                .map(|group| {
                    let value = caps.name(group).map(|m| m.as_str().to_string());
                    (group.to_string(), value)
                })
                .collect(),
        )
    }
}

/// Result of a successful title match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMatch {
    /// Position of the winning pattern in its set.
    pub pattern_index: usize,

    /// Name of the winning pattern.
    pub pattern_name: String,

    /// Every named group of the winning pattern; `None` when the group did
    /// not take part in the match.
    pub captures: BTreeMap<String, Option<String>>,
}

impl TitleMatch {
    /// Captured text for a group, if the group exists and participated.
    pub fn get(&self, group: &str) -> Option<&str> {
        self.captures.get(group).and_then(|value| value.as_deref())
    }
}

/// Try `patterns` in order and return the first match.
///
/// `None` means no pattern matched, which callers treat as an extraction
/// failure for that title.
///
/// # Examples
/// ```
/// use boe_harvester::patterns::{match_title, TitlePattern};
///
/// let patterns = vec![TitlePattern::new("greeting", r"Hola (?P<who>\w+)").unwrap()];
/// let found = match_title("Hola mundo", &patterns).unwrap();
/// assert_eq!(found.get("who"), Some("mundo"));
/// assert!(match_title("Adiós mundo", &patterns).is_none());
/// ```
pub fn match_title(title: &str, patterns: &[TitlePattern]) -> Option<TitleMatch> {
    patterns
        .iter()
        .enumerate()
        .find_map(|(pattern_index, pattern)| {
            pattern.captures(title).map(|captures| TitleMatch {
                pattern_index,
                pattern_name: pattern.name.clone(),
                captures,
            })
        })
}

/// An ordered, immutable-once-built list of title patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<TitlePattern>,
}

impl PatternSet {
    /// Compile a set from `(name, regex)` pairs, keeping their order.
    pub fn from_sources(sources: &[(&str, &str)]) -> Result<Self> {
        let patterns = sources
            .iter()
            .map(|(name, source)| TitlePattern::new(*name, source))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Append a pattern after the existing ones.
    pub fn push(&mut self, pattern: TitlePattern) {
        self.patterns.push(pattern);
    }

    pub fn patterns(&self) -> &[TitlePattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Match a title against this set. See [`match_title`].
    pub fn match_title(&self, title: &str) -> Option<TitleMatch> {
        match_title(title, &self.patterns)
    }
}

/// Built-in appointment pattern set.
pub fn appointment_patterns() -> Result<PatternSet> {
    PatternSet::from_sources(APPOINTMENT_PATTERNS)
}

/// Built-in situation pattern set.
pub fn situation_patterns() -> Result<PatternSet> {
    PatternSet::from_sources(SITUATION_PATTERNS)
}

/// One pattern entry in a YAML pattern file.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternEntry {
    pub name: String,
    pub regex: String,
}

/// Extra patterns loaded at runtime.
///
/// ```yaml
/// appointments:
///   - name: en-propiedad
///     regex: 'Real Decreto .+ nombra en propiedad a do(?:n|ña) (?P<person>.+), ...'
/// situations: []
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatternFile {
    #[serde(default)]
    pub appointments: Vec<PatternEntry>,

    #[serde(default)]
    pub situations: Vec<PatternEntry>,
}

impl PatternFile {
    /// Parse a pattern file from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(HarvesterError::PatternFile)
    }

    /// Read and parse a pattern file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }
}

/// The pattern sets used by both pipelines.
#[derive(Debug, Clone)]
pub struct PatternTables {
    pub appointments: PatternSet,
    pub situations: PatternSet,
}

impl PatternTables {
    /// Built-in tables only.
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            appointments: appointment_patterns()?,
            situations: situation_patterns()?,
        })
    }

    /// Append the patterns of `file` after the built-ins.
    pub fn with_file(mut self, file: &PatternFile) -> Result<Self> {
        for entry in &file.appointments {
            self.appointments
                .push(TitlePattern::new(&entry.name, &entry.regex)?);
        }
        for entry in &file.situations {
            self.situations
                .push(TitlePattern::new(&entry.name, &entry.regex)?);
        }
        Ok(self)
    }
}
