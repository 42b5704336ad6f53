/// Monotonic id allocator.
///
/// Hands out `1, 2, 3, ...`. Values are never reused, even if the record
/// they were assigned to is later rejected by a caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Take the next id.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
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

    #[test]
    fn starts_at_one_and_increments() {
        let mut seq = IdSequence::new();
        assert_eq!(seq.next_id(), 1);
        assert_eq!(seq.next_id(), 2);
        assert_eq!(seq.next_id(), 3);
    }
}
