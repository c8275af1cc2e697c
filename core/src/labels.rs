use crate::LabelId;

/// Ordered emotion names; position is the label id.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    names: Vec<String>,
    lowered: Vec<String>,
}

impl LabelIndex {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let lowered = names.iter().map(|n| normalize(n)).collect();
        Self { names, lowered }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name_of(&self, label_id: LabelId) -> Option<&str> {
        self.names.get(label_id as usize).map(String::as_str)
    }

    /// First position whose name matches. The case-insensitive form trims and
    /// lower-cases both sides before comparing.
    pub fn id_of(&self, name: &str, case_insensitive: bool) -> Option<LabelId> {
        let pos = if case_insensitive {
            let wanted = normalize(name);
            self.lowered.iter().position(|n| *n == wanted)
        } else {
            self.names.iter().position(|n| n == name)
        };
        pos.map(|p| p as LabelId)
    }

    pub fn contains(&self, label_id: LabelId) -> bool {
        (label_id as usize) < self.names.len()
    }
}

/// Trim then lower-case; the form emotion names are compared in.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emotions() -> LabelIndex {
        LabelIndex::new(["sadness", "joy", "love", "anger", "fear", "surprise"])
    }

    #[test]
    fn resolves_names_both_ways() {
        let idx = emotions();
        assert_eq!(idx.name_of(1), Some("joy"));
        assert_eq!(idx.name_of(6), None);
        assert_eq!(idx.id_of("fear", false), Some(4));
        assert_eq!(idx.id_of("missing", true), None);
    }

    #[test]
    fn case_insensitive_lookup_trims_and_lowercases() {
        let idx = LabelIndex::new(["Sadness", "JOY"]);
        assert_eq!(idx.id_of("  joy ", true), Some(1));
        assert_eq!(idx.id_of("sadness", true), Some(0));
        assert_eq!(idx.id_of("joy", false), None);
    }

    #[test]
    fn first_duplicate_wins() {
        let idx = LabelIndex::new(["joy", "anger", "Joy"]);
        assert_eq!(idx.id_of("JOY", true), Some(0));
    }
}
