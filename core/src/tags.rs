//! Cache tags shared by queries (which provide them) and mutations (which
//! invalidate them).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    LogIn,
    Transaction,
    AllUsers,
    AllProducts,
    AllOrders,
    Blogs,
}

impl Tag {
    pub const ALL: [Tag; 6] = [
        Tag::LogIn,
        Tag::Transaction,
        Tag::AllUsers,
        Tag::AllProducts,
        Tag::AllOrders,
        Tag::Blogs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::LogIn => "logIn",
            Tag::Transaction => "transaction",
            Tag::AllUsers => "allUsers",
            Tag::AllProducts => "allProducts",
            Tag::AllOrders => "allOrders",
            Tag::Blogs => "blogs",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when the two tag sets share at least one tag.
pub fn intersects(a: &[Tag], b: &[Tag]) -> bool {
    a.iter().any(|tag| b.contains(tag))
}
