//! Declared-field plumbing shared by params, inputs and options.

use std::{fmt, sync::Arc};

use crate::{
    input::InputCell,
    instance::{Category, InstanceRegistry, Registration},
    option::OptionSlot,
    param::ParamCell,
};

/// The instance registry used by generators.
pub type FieldRegistry = InstanceRegistry<FieldToken>;

/// What a generator recovers from a record when it scans its own range.
#[derive(Clone)]
pub struct FieldToken(pub(crate) TokenKind);

#[derive(Clone)]
pub(crate) enum TokenKind {
    Owner,
    Param(Arc<ParamCell>),
    Input(Arc<InputCell>),
    Option(Arc<dyn OptionSlot>),
}

impl fmt::Debug for FieldToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            TokenKind::Owner => f.write_str("Owner"),
            TokenKind::Param(cell) => write!(f, "Param({})", cell.name()),
            TokenKind::Input(cell) => write!(f, "Input({})", cell.name()),
            TokenKind::Option(slot) => write!(f, "Option({})", slot.name()),
        }
    }
}

impl FieldToken {
    pub(crate) fn owner() -> Self {
        FieldToken(TokenKind::Owner)
    }

    pub(crate) fn param(cell: Arc<ParamCell>) -> Self {
        FieldToken(TokenKind::Param(cell))
    }

    pub(crate) fn input(cell: Arc<InputCell>) -> Self {
        FieldToken(TokenKind::Input(cell))
    }

    pub(crate) fn option(slot: Arc<dyn OptionSlot>) -> Self {
        FieldToken(TokenKind::Option(slot))
    }
}

/// An address inside a generator's range, waiting for a field to claim it.
pub(crate) struct Field {
    pub(crate) registry: Arc<FieldRegistry>,
    pub(crate) address: u64,
    pub(crate) owner: u64,
}

impl Field {
    /// Announce the field at this address.
    pub(crate) fn register(self, category: Category, token: FieldToken) -> Registration<FieldToken> {
        Registration::new(&self.registry, self.address, 0, category, self.owner, token)
    }
}
