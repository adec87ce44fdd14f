//! Variable scope of a single resolver frame

use std::collections::{BTreeMap, HashMap};

use crate::expand::VariableSource;

/// Variables visible while resolving one level of the task tree.
///
/// Always carries `args`; reading it through [`Environment::get`] marks the
/// frame's arguments as consumed.
#[derive(Debug, Clone)]
pub struct Environment {
    variables: HashMap<String, String>,
    locals: BTreeMap<String, String>,
    args_used: bool,
}

/// Where a lookup is answered from, in the order they are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provider {
    Frame,
    Locals,
    Exported,
    Process,
}

const PROVIDERS: [Provider; 4] = [
    Provider::Frame,
    Provider::Locals,
    Provider::Exported,
    Provider::Process,
];

impl Environment {
    #[must_use]
    pub fn new(args: impl Into<String>) -> Self {
        Environment {
            variables: HashMap::from([("args".to_string(), args.into())]),
            locals: BTreeMap::new(),
            args_used: false,
        }
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.variables.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn with_locals(mut self, locals: BTreeMap<String, String>) -> Self {
        self.locals = locals;
        self
    }

    /// Record values from a property-only statement.
    pub fn set_locals<I: IntoIterator<Item = (String, String)>>(&mut self, values: I) {
        self.locals.extend(values);
    }

    #[must_use]
    pub fn locals(&self) -> &BTreeMap<String, String> {
        &self.locals
    }

    pub fn mark_args_used(&mut self) {
        self.args_used = true;
    }

    #[must_use]
    pub fn args_used(&self) -> bool {
        self.args_used
    }

    /// Lookup view that also consults the exported overlay and the process
    /// environment.
    pub fn scope<'a>(&'a mut self, exported: &'a BTreeMap<String, String>) -> Scope<'a> {
        Scope {
            env: self,
            exported,
        }
    }
}

/// An [`Environment`] joined with the variables exported so far.
pub struct Scope<'a> {
    env: &'a mut Environment,
    exported: &'a BTreeMap<String, String>,
}

impl Scope<'_> {
    /// Resolve `key` through every provider, falling back to `fallback`.
    pub fn get(&mut self, key: &str, fallback: Option<&str>) -> Option<String> {
        PROVIDERS
            .iter()
            .find_map(|provider| self.provide(*provider, key))
            .or_else(|| fallback.map(str::to_string))
    }

    fn provide(&mut self, provider: Provider, key: &str) -> Option<String> {
        match provider {
            Provider::Frame => {
                let value = self.env.variables.get(key)?.clone();
                if key == "args" {
                    self.env.args_used = true;
                }
                Some(value)
            }
            Provider::Locals => self.env.locals.get(key).cloned(),
            Provider::Exported => self.exported.get(key).cloned(),
            Provider::Process => std::env::var(key).ok(),
        }
    }
}

impl VariableSource for Scope<'_> {
    fn lookup(&mut self, name: &str) -> Option<String> {
        self.get(name, None)
    }
}
