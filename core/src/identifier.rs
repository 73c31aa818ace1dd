//! Interned names for capabilities, operations and functions.
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

static INTERNER: Lazy<interner::Interner> = Lazy::new(interner::Interner::new);

/// An interned name.
///
/// Capability names, operation names and record keys are compared and hashed very often during
/// dispatch, so they are interned once and then handled as a `Copy` symbol.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct Ident(interner::Symbol);

impl Ident {
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(INTERNER.intern(s.as_ref()))
    }

    /// Return the string representation of this identifier.
    pub fn label(&self) -> &'static str {
        INTERNER.lookup(self.0)
    }

    pub fn into_label(self) -> String {
        self.label().to_owned()
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.label())
    }
}

impl PartialOrd for Ident {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// Ordering is alphabetical, not by interning order: capability sets are listed sorted by name.
impl Ord for Ident {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.label().cmp(other.label())
    }
}

impl From<&str> for Ident {
    fn from(val: &str) -> Self {
        Self::new(val)
    }
}

impl From<String> for Ident {
    fn from(val: String) -> Self {
        Self::new(val)
    }
}

impl From<&String> for Ident {
    fn from(val: &String) -> Self {
        Self::new(val)
    }
}

#[allow(clippy::from_over_into)]
impl Into<String> for Ident {
    fn into(self) -> String {
        self.into_label()
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        self.label()
    }
}

mod interner {
    use std::collections::HashMap;
    use std::sync::{Mutex, RwLock};

    use typed_arena::Arena;

    /// Index of an interned string in the [Interner].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Symbol(u32);

    /// Append-only string table. Strings live in an arena that is never freed, which is what
    /// makes handing out `'static` slices sound: the interner itself is a process-wide static.
    pub(crate) struct Interner(RwLock<Table>);

    struct Table {
        // The arena is not `Sync` on its own.
        arena: Mutex<Arena<u8>>,
        map: HashMap<&'static str, Symbol>,
        vec: Vec<&'static str>,
    }

    impl Interner {
        pub(crate) fn new() -> Self {
            Self(RwLock::new(Table {
                arena: Mutex::new(Arena::new()),
                map: HashMap::new(),
                vec: Vec::new(),
            }))
        }

        /// Return the symbol of `string`, storing it first if it has never been seen.
        pub(crate) fn intern(&self, string: &str) -> Symbol {
            if let Some(sym) = self.read().map.get(string) {
                return *sym;
            }

            let mut table = self.0.write().unwrap_or_else(|poisoned| poisoned.into_inner());
            // Another writer may have interned the same string between the two locks.
            if let Some(sym) = table.map.get(string) {
                return *sym;
            }

            // SAFETY: the arena never deallocates and the table lives inside a static
            // interner, so the allocation outlives every reader.
            let stored: &'static str = {
                let arena = table.arena.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                unsafe { std::mem::transmute::<&str, &'static str>(arena.alloc_str(string)) }
            };
            let sym = Symbol(table.vec.len() as u32);
            table.vec.push(stored);
            table.map.insert(stored, sym);
            sym
        }

        /// Return the string of a symbol. A symbol only exists once its string was interned, so
        /// this can't fail.
        pub(crate) fn lookup(&self, sym: Symbol) -> &'static str {
            self.read().vec[sym.0 as usize]
        }

        fn read(&self) -> std::sync::RwLockReadGuard<'_, Table> {
            self.0.read().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

}

#[cfg(test)]
mod tests {
    use super::Ident;

    #[test]
    fn idents_sort_by_label() {
        // Intern in reverse order so that symbol order and label order disagree.
        let z = Ident::new("Zeta");
        let a = Ident::new("Alpha");
        let mut names = vec![z, a];
        names.sort();
        assert_eq!(names, vec![a, z]);
    }
}
