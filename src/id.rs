/// Hands out user ids as decimal strings starting at `"1"`. Ids are never reused.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> String {
        let id = self.next;
        self.next += 1;
        id.to_string()
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_at_one_and_increments() {
        let mut ids = IdSequence::new();
        assert_eq!(ids.next_id(), "1");
        assert_eq!(ids.next_id(), "2");
        assert_eq!(ids.next_id(), "3");
    }

    #[test]
    fn ids_are_never_reused() {
        let mut ids = IdSequence::default();
        let issued: Vec<String> = (0..100).map(|_| ids.next_id()).collect();
        let unique: std::collections::HashSet<&String> = issued.iter().collect();
        assert_eq!(unique.len(), 100);
        assert_eq!(issued.last().map(String::as_str), Some("100"));
    }
}
