//! Parameter table for a single scan.

use std::collections::HashMap;

use crate::bind::BindStyle;

/// Ordered parameter names, with optional name→index reuse.
#[derive(Debug, Default)]
pub struct ParamTable {
    names: Vec<String>,
    lookup: HashMap<String, usize>,
    combine: bool,
}

impl ParamTable {
    /// Create a table for one scan. Duplicates are only combined when asked
    /// for and when `style` is not `Question`.
    pub fn new(style: BindStyle, combine_duplicates: bool) -> Self {
        Self {
            names: Vec::new(),
            lookup: HashMap::new(),
            combine: combine_duplicates && style.can_combine(),
        }
    }

    /// Record an occurrence of `name` and return its 1-based index.
    pub fn add(&mut self, name: &str) -> usize {
        if self.combine {
            if let Some(&index) = self.lookup.get(name) {
                return index;
            }
            self.names.push(name.to_string());
            let index = self.names.len();
            self.lookup.insert(name.to_string(), index);
            index
        } else {
            self.names.push(name.to_string());
            self.names.len()
        }
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}
