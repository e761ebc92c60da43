//! Short ASCII file names for long, descriptive Czech file names.
//!
//! `Zápis o přítomnosti středověkých jam (1905–1977).jpg` becomes
//! `zapis-pritomnosti-stredovekych-jam.jpg`: parenthesized metadata and
//! everything after the first comma or dash is dropped, stopwords and
//! numbers are filtered, at most four words are kept, and Czech letters are
//! transliterated.
//!
//! Generation is deterministic given the names already assigned in the
//! run.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use super::normalize::normalize_for_matching;

/// Words kept per name
pub const DEFAULT_MAX_WORDS: usize = 4;

/// Stem used when nothing usable survives
pub const DEFAULT_PLACEHOLDER: &str = "tabule";

/// Directory holding the numbered panel PDFs
pub const DEFAULT_MEDIA_ROOT: &str = "files/Tabule";

/// Common Czech function words, units and archive boilerplate (ASCII forms)
pub const CZECH_STOPWORDS: &[&str] = &[
    "a", "v", "na", "z", "ze", "do", "od", "u", "o", "pro", "pri", "pred", "po", "roku", "leta",
    "let", "st", "stol", "c", "p", "cp", "inv", "foto", "fotila", "fotil", "nalezen", "nalezena",
    "nalezeno", "podle", "archiv", "muzeum", "misto", "ulozeni", "str", "mapa", "poli", "pole",
    "mezi", "lety", "bliznosti", "typ", "typu", "se", "tak", "kol", "tzv", "tis",
];

/// Map Czech letters with diacritics to their ASCII base letter.
/// Anything outside the Czech alphabet is passed through unchanged.
pub fn transliterate_czech(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' => 'a',
            'č' => 'c',
            'ď' => 'd',
            'é' | 'ě' => 'e',
            'í' => 'i',
            'ň' => 'n',
            'ó' => 'o',
            'ř' => 'r',
            'š' => 's',
            'ť' => 't',
            'ú' | 'ů' => 'u',
            'ý' => 'y',
            'ž' => 'z',
            'Á' => 'A',
            'Č' => 'C',
            'Ď' => 'D',
            'É' | 'Ě' => 'E',
            'Í' => 'I',
            'Ň' => 'N',
            'Ó' => 'O',
            'Ř' => 'R',
            'Š' => 'S',
            'Ť' => 'T',
            'Ú' | 'Ů' => 'U',
            'Ý' => 'Y',
            'Ž' => 'Z',
            other => other,
        })
        .collect()
}

/// Split a file name into stem and extension. The extension starts at the
/// last dot that has a non-dot character somewhere before it, so `.hidden`
/// has no extension.
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(dot) if file_name[..dot].chars().any(|c| c != '.') => {
            (&file_name[..dot], &file_name[dot..])
        }
        _ => (file_name, ""),
    }
}

/// File names handed out so far in one run.
///
/// Threaded through every `ShortNamer::generate` call; uniqueness is by
/// file name alone, across all directories.
#[derive(Debug, Clone, Default)]
pub struct AssignedNames {
    names: HashSet<String>,
}

impl AssignedNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Reserve `stem + extension`, appending `-1`, `-2`, ... to the stem
    /// until the name is free. Returns the reserved name.
    pub fn claim(&mut self, stem: &str, extension: &str) -> String {
        let mut candidate = format!("{}{}", stem, extension);
        let mut counter = 1;
        while self.names.contains(&candidate) {
            candidate = format!("{}-{}{}", stem, counter, extension);
            counter += 1;
        }
        self.names.insert(candidate.clone());
        candidate
    }
}

/// Generates short names from long descriptive ones
#[derive(Debug, Clone)]
pub struct ShortNamer {
    stopwords: HashSet<String>,
    max_words: usize,
    placeholder: String,
    media_root: String,
}

impl Default for ShortNamer {
    fn default() -> Self {
        Self::new(CZECH_STOPWORDS.iter().copied())
    }
}

impl ShortNamer {
    /// Create a namer with the given stopwords (compared in lowercase ASCII)
    pub fn new(stopwords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            stopwords: stopwords
                .into_iter()
                .map(|word| {
                    let word: String = word.into();
                    transliterate_czech(&word.to_lowercase())
                })
                .collect(),
            max_words: DEFAULT_MAX_WORDS,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            media_root: DEFAULT_MEDIA_ROOT.to_string(),
        }
    }

    /// Set the maximum number of words (at least one)
    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words.max(1);
        self
    }

    /// Set the fallback stem
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        let placeholder: String = placeholder.into();
        let placeholder = sanitize_stem(&placeholder);
        if !placeholder.is_empty() {
            self.placeholder = placeholder;
        }
        self
    }

    /// Set the directory whose numbered PDFs keep their panel number
    pub fn with_media_root(mut self, media_root: impl Into<String>) -> Self {
        let media_root: String = media_root.into();
        self.media_root = media_root.trim_end_matches('/').to_string();
        self
    }

    pub fn max_words(&self) -> usize {
        self.max_words
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn media_root(&self) -> &str {
        &self.media_root
    }

    /// Generate the new file name (not path) for `old_path` and record it
    /// in `assigned`
    pub fn generate(&self, old_path: &str, assigned: &mut AssignedNames) -> String {
        let old_path = normalize_for_matching(old_path);
        let (parent, file_name) = match old_path.rsplit_once('/') {
            Some((parent, name)) => (parent, name),
            None => ("", old_path.as_str()),
        };
        let (stem, extension) = split_extension(file_name);
        let extension = extension.to_lowercase();

        if parent == self.media_root && extension == ".pdf" {
            if let Some(base) = numbered_panel_stem(stem) {
                return assigned.claim(&base, &extension);
            }
        }

        let words = self.meaningful_words(file_name);
        let base = sanitize_stem(&words.join("-"));
        let base = if base.is_empty() {
            self.placeholder.clone()
        } else {
            base
        };

        assigned.claim(&base, &extension)
    }

    /// Pick up to `max_words` lowercase words that carry the subject of the
    /// file name
    pub fn meaningful_words(&self, file_name: &str) -> Vec<String> {
        let (stem, _) = split_extension(file_name);
        let stem = parenthesized().replace_all(stem, "");

        // The first comma/dash separated segment holds the subject
        let mut segments = stem.split(is_separator);
        let first = segments.next().unwrap_or_default();
        let subject = if segments.next().is_some() {
            first.trim()
        } else {
            &*stem
        };

        let tokens: Vec<&str> = word().find_iter(subject).map(|m| m.as_str()).collect();

        let mut selected: Vec<String> = tokens
            .iter()
            .filter(|token| self.is_meaningful(token))
            .map(|token| token.to_lowercase())
            .collect();

        if selected.is_empty() {
            // Filtering was too aggressive; take the leading words as they are
            selected = tokens
                .iter()
                .take(self.max_words)
                .filter(|token| token.chars().count() >= 2)
                .map(|token| token.to_lowercase())
                .collect();
        }
        selected.truncate(self.max_words);

        if selected.len() < 2 && tokens.len() > selected.len() {
            for token in &tokens {
                let lower = token.to_lowercase();
                if !selected.contains(&lower) {
                    selected.push(lower);
                    if selected.len() >= 2 {
                        break;
                    }
                }
            }
        }
        selected.truncate(self.max_words);

        selected
    }

    fn is_meaningful(&self, token: &str) -> bool {
        let numeric = token.chars().all(char::is_numeric);
        let short = token.chars().count() < 2;
        let stopword = self
            .stopwords
            .contains(&transliterate_czech(&token.to_lowercase()));

        !numeric && !short && !stopword
    }
}

/// `1-PRAVĚKÁ` -> `1-praveka`, `7-8-PRVOREPUBLIKOVÁ2` -> `7-8-prvorepublikova2`
fn numbered_panel_stem(stem: &str) -> Option<String> {
    let captures = numbered_panel().captures(stem)?;
    let description: String = transliterate_czech(&captures[2])
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();

    if description.is_empty() {
        return None;
    }
    Some(format!("{}-{}", &captures[1], description))
}

/// Transliterate, lowercase, keep `[a-z0-9-]`, collapse and trim dashes
fn sanitize_stem(raw: &str) -> String {
    let ascii: String = transliterate_czech(raw)
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();

    ascii
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn is_separator(c: char) -> bool {
    matches!(c, ',' | '-' | '\u{2013}' | '\u{2014}')
}

fn parenthesized() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\([^)]*\)").expect("parenthesis pattern is valid"))
}

fn word() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w+").expect("word pattern is valid"))
}

fn numbered_panel() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+(?:-\d+)?)\s*-\s*(.+)$").expect("panel pattern is valid")
    })
}
