use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction of a vote cast on a post or comment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    /// Signed amount applied to the vote count (and to karma for posts).
    pub const fn delta(self) -> i64 {
        match self {
            Vote::Up => 1,
            Vote::Down => -1,
        }
    }
}

/// Classification of a counted action.
///
/// Every mutation that counts toward the action total records exactly one
/// kind, so the breakdown always sums to the total. The serialized name is
/// the same label `as_str` returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "posts")]
    Post,
    #[serde(rename = "comments")]
    Comment,
    #[serde(rename = "votes")]
    Vote,
    #[serde(rename = "messages")]
    Message,
    #[serde(rename = "joins")]
    Join,
    #[serde(rename = "leaves")]
    Leave,
}

impl ActionKind {
    /// All kinds, in breakdown order.
    pub const ALL: [ActionKind; 6] = [
        ActionKind::Post,
        ActionKind::Comment,
        ActionKind::Vote,
        ActionKind::Message,
        ActionKind::Join,
        ActionKind::Leave,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ActionKind::Post => "posts",
            ActionKind::Comment => "comments",
            ActionKind::Vote => "votes",
            ActionKind::Message => "messages",
            ActionKind::Join => "joins",
            ActionKind::Leave => "leaves",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
