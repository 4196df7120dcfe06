//! Generators built into the gengen binary.

mod brighten;
mod scale;

use std::sync::Arc;

use gengen_core::Result;
use gengen_generator::{FactoryRegistry, FieldRegistry, Generator};

use brighten::Brighten;
use scale::Scale;

/// Register every built-in generator.
pub fn register_all(factories: &FactoryRegistry, fields: &Arc<FieldRegistry>) -> Result<()> {
    let f = Arc::clone(fields);
    factories.register_factory("brighten", move || -> Box<dyn Generator> {
        Box::new(Brighten::new(&f))
    })?;

    let f = Arc::clone(fields);
    factories.register_factory("scale", move || -> Box<dyn Generator> {
        Box::new(Scale::new(&f))
    })?;

    Ok(())
}
