//! Message flags.

/// Message flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Message has been read.
    Seen,
    /// Message has been answered.
    Answered,
    /// Message is flagged for special attention.
    Flagged,
    /// Message is marked for deletion.
    Deleted,
    /// Message is a draft.
    Draft,
    /// Message is recent (first session to see it).
    Recent,
    /// Any other flag or keyword, kept verbatim.
    Keyword(String),
}

impl Flag {
    /// Parses a flag string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "\\SEEN" => Self::Seen,
            "\\ANSWERED" => Self::Answered,
            "\\FLAGGED" => Self::Flagged,
            "\\DELETED" => Self::Deleted,
            "\\DRAFT" => Self::Draft,
            "\\RECENT" => Self::Recent,
            _ => Self::Keyword(s.to_string()),
        }
    }

    /// Returns the flag as an IMAP string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Seen => "\\Seen",
            Self::Answered => "\\Answered",
            Self::Flagged => "\\Flagged",
            Self::Deleted => "\\Deleted",
            Self::Draft => "\\Draft",
            Self::Recent => "\\Recent",
            Self::Keyword(s) => s,
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Collection of message flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    flags: Vec<Flag>,
}

impl Flags {
    /// Creates an empty flags collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates flags from a vector.
    #[must_use]
    pub fn from_vec(flags: Vec<Flag>) -> Self {
        let mut collected = Self::new();
        for flag in flags {
            collected.insert(flag);
        }
        collected
    }

    /// Adds a flag.
    pub fn insert(&mut self, flag: Flag) {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
    }

    /// Returns true if the flag is present.
    #[must_use]
    pub fn contains(&self, flag: &Flag) -> bool {
        self.flags.contains(flag)
    }

    /// Returns true if a flag with this exact name is present, ignoring case.
    ///
    /// Works for system flags and keywords alike, e.g. `\Unseen` or `$Junk`.
    #[must_use]
    pub fn contains_named(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f.as_str().eq_ignore_ascii_case(name))
    }

    /// Returns true if any flag name contains `needle`, ignoring ASCII case.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_ascii_lowercase();
        self.flags
            .iter()
            .any(|f| f.as_str().to_ascii_lowercase().contains(&needle))
    }

    /// Returns true if the message has been seen.
    #[must_use]
    pub fn is_seen(&self) -> bool {
        self.contains(&Flag::Seen)
    }

    /// Returns true if the message is flagged.
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        self.contains(&Flag::Flagged)
    }

    /// Returns an iterator over the flags.
    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }

    /// Returns the number of flags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns true if there are no flags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl IntoIterator for Flags {
    type Item = Flag;
    type IntoIter = std::vec::IntoIter<Flag>;

    fn into_iter(self) -> Self::IntoIter {
        self.flags.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_system_flags_case_insensitive() {
        assert_eq!(Flag::parse("\\Seen"), Flag::Seen);
        assert_eq!(Flag::parse("\\SEEN"), Flag::Seen);
        assert_eq!(Flag::parse("\\flagged"), Flag::Flagged);
        assert_eq!(Flag::parse("\\Draft"), Flag::Draft);
    }

    #[test]
    fn parse_keyword_keeps_spelling() {
        assert_eq!(
            Flag::parse("$HasAttachment"),
            Flag::Keyword("$HasAttachment".to_string())
        );
        assert_eq!(Flag::Keyword("\\Unseen".into()).as_str(), "\\Unseen");
    }

    #[test]
    fn from_vec_deduplicates() {
        let flags = Flags::from_vec(vec![Flag::Seen, Flag::Seen, Flag::Flagged]);
        assert_eq!(flags.len(), 2);
        assert!(flags.is_seen());
        assert!(flags.is_flagged());
    }

    #[test]
    fn contains_named_matches_keywords() {
        let flags = Flags::from_vec(vec![Flag::parse("\\Unseen"), Flag::Seen]);
        assert!(flags.contains_named("\\UNSEEN"));
        assert!(flags.contains_named("\\seen"));
        assert!(!flags.contains_named("\\Flagged"));
    }

    #[test]
    fn mentions_is_substring_search() {
        let flags = Flags::from_vec(vec![Flag::parse("$HasAttachment")]);
        assert!(flags.mentions("attachment"));
        assert!(!Flags::new().mentions("attachment"));
    }

    #[test]
    fn display() {
        assert_eq!(Flag::Answered.to_string(), "\\Answered");
        assert_eq!(Flag::Keyword("Work".into()).to_string(), "Work");
    }
}
