//! String Interner - Deduplicate tag and attribute names
//!
//! Every element of a document shares a handful of names ("div", "meta",
//! "data-mobile-role"), so they are stored once per tree and compared as ids.

use std::collections::HashMap;

/// Interned string ID - just 4 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct InternedString(pub u32);

impl InternedString {
    /// Empty string
    pub const EMPTY: InternedString = InternedString(0);
}

/// String interner for deduplicating names
#[derive(Debug)]
pub struct StringInterner {
    strings: Vec<Box<str>>,
    map: HashMap<Box<str>, u32>,
}

impl StringInterner {
    /// Create a new interner with the names the rewriter looks at pre-interned
    pub fn new() -> Self {
        let mut interner = Self {
            strings: Vec::with_capacity(64),
            map: HashMap::with_capacity(64),
        };

        // Index 0 is always the empty string
        interner.intern("");

        const COMMON_TAGS: &[&str] = &[
            "html", "head", "body", "div", "span", "p", "a", "br", "pre",
            "header", "nav", "main", "section", "article", "aside", "footer",
            "script", "style", "link", "meta", "title", "map", "area",
        ];

        const COMMON_ATTRS: &[&str] = &[
            "id", "class", "href", "src", "rel", "name", "content",
            "itemprop", "data-mobile-role",
        ];

        for tag in COMMON_TAGS {
            interner.intern(tag);
        }
        for attr in COMMON_ATTRS {
            interner.intern(attr);
        }

        interner
    }

    /// Intern a string, returning its ID.
    /// Names are case-folded: HTML tag and attribute names are ASCII
    /// case-insensitive.
    pub fn intern(&mut self, s: &str) -> InternedString {
        if let Some(&idx) = self.map.get(s) {
            return InternedString(idx);
        }
        if s.bytes().any(|b| b.is_ascii_uppercase()) {
            return self.intern(&s.to_ascii_lowercase());
        }

        let idx = self.strings.len() as u32;
        self.strings.push(s.into());
        self.map.insert(s.into(), idx);
        InternedString(idx)
    }

    /// Look up a string without interning it
    pub fn lookup(&self, s: &str) -> Option<InternedString> {
        if let Some(&idx) = self.map.get(s) {
            return Some(InternedString(idx));
        }
        if s.bytes().any(|b| b.is_ascii_uppercase()) {
            return self.lookup(&s.to_ascii_lowercase());
        }
        None
    }

    /// Get the string for an interned ID
    #[inline]
    pub fn get(&self, id: InternedString) -> &str {
        self.strings.get(id.0 as usize).map(|s| &**s).unwrap_or("")
    }

    /// Number of interned strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
