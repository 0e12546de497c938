//! Parameter registry.
//!
//! Interns each configured parameter name into a [`ParamKey`] once, at controller
//! construction. Writes then go through a fixed per-parameter key table; names are never
//! looked up on the hot path. Two parameters configured with the same name share a key,
//! the same way they would share a parameter inside the animation system.

use hashbrown::HashMap;

use crate::error::ControllerError;
use crate::ids::{IdAllocator, ParamKey};
use crate::params::{Parameter, ParameterNames};

#[derive(Debug, Clone)]
pub struct ParameterRegistry {
    by_name: HashMap<String, ParamKey>,
    /// Interned names, indexed by `ParamKey.0`.
    names: Vec<String>,
    keys: [ParamKey; Parameter::COUNT],
}

impl ParameterRegistry {
    /// Intern every name in `names`. Fails on an empty name.
    pub fn resolve(names: &ParameterNames) -> Result<Self, ControllerError> {
        names.validate()?;

        let mut ids = IdAllocator::new();
        let mut by_name = HashMap::with_capacity(Parameter::COUNT);
        let mut interned = Vec::with_capacity(Parameter::COUNT);
        let mut keys = [ParamKey(0); Parameter::COUNT];

        for param in Parameter::ALL {
            let name = names.name(param);
            let key = *by_name.entry(name.to_string()).or_insert_with(|| {
                interned.push(name.to_string());
                ids.alloc_param()
            });
            keys[param.index()] = key;
        }

        Ok(Self {
            by_name,
            names: interned,
            keys,
        })
    }

    /// Key for a logical parameter.
    #[inline]
    pub fn key(&self, param: Parameter) -> ParamKey {
        self.keys[param.index()]
    }

    /// Key for an interned name, if any parameter was configured with it.
    pub fn lookup(&self, name: &str) -> Option<ParamKey> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, key: ParamKey) -> Option<&str> {
        self.names.get(key.0 as usize).map(String::as_str)
    }

    /// Number of distinct interned names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Every logical parameter with its key, in [`Parameter::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Parameter, ParamKey)> + '_ {
        Parameter::ALL.iter().map(move |p| (*p, self.key(*p)))
    }
}
