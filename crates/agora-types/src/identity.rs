use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw id value.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw id value.
            pub const fn value(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

define_id!(
    /// Identity of a registered user. Assigned at registration, never reused.
    UserId,
    "u/"
);

define_id!(
    /// Identity of a post. One global sequence shared by every community.
    PostId,
    "p/"
);

define_id!(
    /// Identity of a comment or reply. Separate sequence from posts.
    CommentId,
    "c/"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_kind_prefix() {
        assert_eq!(UserId::new(3).to_string(), "u/3");
        assert_eq!(PostId::new(12).to_string(), "p/12");
        assert_eq!(CommentId::new(1).to_string(), "c/1");
    }

    #[test]
    fn ids_order_by_raw_value() {
        assert!(PostId::new(1) < PostId::new(2));
        assert_eq!(CommentId::from(7).value(), 7);
    }

    #[test]
    fn serde_is_transparent() {
        let json = serde_json::to_string(&UserId::new(42)).unwrap();
        assert_eq!(json, "42");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, UserId::new(42));
    }
}
