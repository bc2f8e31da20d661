use std::collections::HashSet;

use crate::config::LookupConfig;
use crate::parser::references::CandidateReference;

/// Allow-list gate applied to every candidate reference.
///
/// Built once per run from the optional [`LookupConfig`]. With no configuration every
/// candidate is accepted. Matching is an exact set-membership test on a lookup key.
#[derive(Debug, Clone, Default)]
pub struct DeclRefFilter {
    keys: Option<HashSet<String>>,
    func_only: bool,
}

impl DeclRefFilter {
    pub fn pass_through() -> Self {
        Self::default()
    }

    pub fn new(config: Option<&LookupConfig>) -> Self {
        match config {
            Some(config) => Self::from_config(config),
            None => Self::pass_through(),
        }
    }

    pub fn from_config(config: &LookupConfig) -> Self {
        let mut keys = HashSet::new();
        for api in config.call_entries() {
            if config.func_only {
                // An unqualified entry matches the name with or without a receiver
                if !api.is_qualified() {
                    keys.insert(api.name.clone());
                }
                keys.insert(format!(".{}", api.name));
            } else {
                keys.insert(api.qualified_name());
            }
        }

        Self {
            keys: Some(keys),
            func_only: config.func_only,
        }
    }

    pub fn is_pass_through(&self) -> bool {
        self.keys.is_none()
    }

    pub fn func_only(&self) -> bool {
        self.func_only
    }

    pub fn accepts(&self, candidate: &CandidateReference) -> bool {
        self.accepts_name(candidate.qualifier.as_deref(), &candidate.name)
    }

    pub fn accepts_name(&self, qualifier: Option<&str>, name: &str) -> bool {
        match &self.keys {
            None => true,
            Some(keys) => keys.contains(&self.lookup_key(qualifier, name)),
        }
    }

    fn lookup_key(&self, qualifier: Option<&str>, name: &str) -> String {
        if self.func_only {
            match qualifier {
                Some(q) if !q.is_empty() => format!(".{}", name),
                _ => name.to_string(),
            }
        } else {
            crate::parser::references::full_name(qualifier, name)
        }
    }
}
