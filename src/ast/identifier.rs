use std::{fmt::Display, hash::Hash, rc::Rc};

/// A name as written in source.
///
/// Whether the name is an unsigned decimal literal is decided once, when the
/// identifier is built. Equality and hashing only look at the name.
#[derive(Debug, Clone)]
pub struct Identifier {
    name: Rc<str>,
    literal: Option<u64>,
}

impl Identifier {
    pub fn new(name: &str) -> Self {
        let literal = if !name.is_empty() && name.bytes().all(|byte| byte.is_ascii_digit()) {
            name.parse::<u64>().ok()
        } else {
            None
        };

        Identifier {
            name: Rc::from(name),
            literal,
        }
    }

    /// The empty identifier carried by temporaries.
    pub fn anonymous() -> Self {
        Identifier::new("")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    pub fn is_numeric_literal(&self) -> bool {
        self.literal.is_some()
    }

    pub fn literal_value(&self) -> Option<u64> {
        self.literal
    }

    /// `$`-prefixed names refer to compiler intrinsics.
    pub fn is_system(&self) -> bool {
        self.name.starts_with('$')
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
