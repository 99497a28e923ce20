// src/config/credentials.rs
//! Ordered, de-duplicated key pools and model lists.

/// Split a delimited env value on `,` `;` or newlines; trimmed, empties dropped.
pub fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split([',', ';', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn push_unique(out: &mut Vec<String>, item: &str) {
    let item = item.trim();
    if !item.is_empty() && !out.iter().any(|x| x == item) {
        out.push(item.to_string());
    }
}

/// API keys for one provider, in insertion order, duplicates collapsed.
///
/// NOTE: no `Debug` derive; keys must never reach logs.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialPool {
    keys: Vec<String>,
}

impl CredentialPool {
    /// Primary, then secondary, then each entry of the delimited list.
    pub fn assemble(primary: Option<&str>, secondary: Option<&str>, list: Option<&str>) -> Self {
        let mut keys = Vec::new();
        for k in primary.into_iter().chain(secondary) {
            push_unique(&mut keys, k);
        }
        if let Some(list) = list {
            for k in split_list(list) {
                push_unique(&mut keys, k);
            }
        }
        Self { keys }
    }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Vec::new();
        for k in keys {
            push_unique(&mut out, k.as_ref());
        }
        Self { keys: out }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl std::fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPool")
            .field("len", &self.keys.len())
            .finish()
    }
}

/// Ordered, de-duplicated model identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelList {
    models: Vec<String>,
}

impl ModelList {
    /// Overrides first, then the delimited list, then the built-in defaults.
    pub fn assemble(overrides: &[Option<&str>], list: Option<&str>, defaults: &[&str]) -> Self {
        let mut models = Vec::new();
        for m in overrides.iter().flatten() {
            push_unique(&mut models, m);
        }
        if let Some(list) = list {
            for m in split_list(list) {
                push_unique(&mut models, m);
            }
        }
        for m in defaults {
            push_unique(&mut models, m);
        }
        Self { models }
    }

    pub fn single(model: &str) -> Self {
        Self::assemble(&[Some(model)], None, &[])
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }
}
