//! Name-keyed registry of generator factories.

use std::{collections::BTreeMap, sync::Arc};

use gengen_core::{Error, OptionValues, Result, validate_name};
use parking_lot::Mutex;

use crate::Generator;

/// Creates fresh generator instances.
pub trait GeneratorFactory: Send + Sync {
    fn create(&self) -> Box<dyn Generator>;
}

impl<F> GeneratorFactory for F
where
    F: Fn() -> Box<dyn Generator> + Send + Sync,
{
    fn create(&self) -> Box<dyn Generator> {
        self()
    }
}

/// Registry of generator factories, keyed by generator name.
///
/// All operations serialize on one lock.
#[derive(Default)]
pub struct FactoryRegistry {
    factories: Mutex<BTreeMap<String, Arc<dyn GeneratorFactory>>>,
}

impl FactoryRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`.
    ///
    /// # Errors
    ///
    /// Fails if `name` is not a valid identifier or is already registered.
    pub fn register_factory(
        &self,
        name: &str,
        factory: impl GeneratorFactory + 'static,
    ) -> Result<()> {
        validate_name(name, "generator")?;
        let mut factories = self.factories.lock();
        if factories.contains_key(name) {
            return Err(Error::duplicate_name(name, "generator"));
        }
        factories.insert(name.to_string(), Arc::new(factory));
        tracing::debug!(generator = name, "registered generator factory");
        Ok(())
    }

    /// Remove the factory registered under `name`.
    pub fn unregister_factory(&self, name: &str) -> Result<()> {
        self.factories
            .lock()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::UnregisteredGenerator {
                name: name.to_string(),
            })
    }

    /// Create a generator and apply `values` to its options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unregistered name, or the
    /// configuration error raised while applying option values.
    pub fn create(&self, name: &str, values: &OptionValues) -> Result<Box<dyn Generator>> {
        let factory = {
            let factories = self.factories.lock();
            match factories.get(name) {
                Some(factory) => Arc::clone(factory),
                None => {
                    let names: Vec<String> = factories.keys().cloned().collect();
                    return Err(Error::not_found(name, &names));
                }
            }
        };

        let mut generator = factory.create();
        generator.base_mut().set_option_values(values)?;
        // Options may have changed the generator's internal structure.
        generator.base_mut().invalidate();
        Ok(generator)
    }

    /// Names of all registered generators, sorted.
    pub fn enumerate(&self) -> Vec<String> {
        self.factories.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.factories.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.lock().is_empty()
    }
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("generators", &self.enumerate())
            .finish()
    }
}
