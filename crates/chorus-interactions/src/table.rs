//! The core-side bond table and the mirrored map over it.

use chorus_core::{FactoryError, MapKey};
use chorus_map::{CoreError, CoreMirror, ObjectMap};
use chorus_object::{Factory, ObjectRef};
use indexmap::IndexMap;

use crate::bonds::{BondParams, CoulombPair, HarmonicBond, TabulatedBond};

/// The mirrored interaction map: bond handles on the synchronized side,
/// plain [`BondParams`] in the [`BondTable`] behind it.
pub type Interactions = ObjectMap<BondTable>;

/// Domain storage for bonded interactions.
///
/// Plain data a force loop could read directly: one [`BondParams`] per
/// key, with the sequential key assignment the mirror contract asks
/// for. Handles appear only in the [`CoreMirror`] impl, which copies a
/// bond's parameters at insertion; changing a bond handle afterwards
/// does not rewrite entries already in the table, re-insert at the same
/// key to update one.
#[derive(Clone, Debug, PartialEq)]
pub struct BondTable {
    bonds: IndexMap<MapKey, BondParams>,
    next: MapKey,
}

impl Default for BondTable {
    fn default() -> Self {
        Self {
            bonds: IndexMap::new(),
            next: MapKey(0),
        }
    }
}

impl BondTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The parameters stored at `key`.
    pub fn bond(&self, key: MapKey) -> Option<&BondParams> {
        self.bonds.get(&key)
    }

    /// Read-only view of every stored bond, in insertion order.
    pub fn bonds(&self) -> &IndexMap<MapKey, BondParams> {
        &self.bonds
    }

    /// Number of stored bonds.
    pub fn len(&self) -> usize {
        self.bonds.len()
    }

    /// `true` if no bonds are stored.
    pub fn is_empty(&self) -> bool {
        self.bonds.is_empty()
    }

    /// Total energy of every bond that is defined at separation `r`.
    ///
    /// Bonds outside their domain at `r` contribute nothing.
    pub fn total_energy(&self, r: f64) -> f64 {
        self.bonds
            .values()
            .filter_map(|bond| bond.energy(r))
            .sum()
    }
}

fn extract(element: &ObjectRef) -> Result<BondParams, CoreError> {
    if let Some(bond) = element.downcast_ref::<HarmonicBond>() {
        return Ok(bond.params());
    }
    if let Some(bond) = element.downcast_ref::<CoulombPair>() {
        return Ok(bond.params());
    }
    if let Some(bond) = element.downcast_ref::<TabulatedBond>() {
        return Ok(bond.params());
    }
    Err(CoreError::new(format!(
        "object {} is not a bond type this table stores",
        element.id()
    )))
}

impl CoreMirror for BondTable {
    fn insert_in_core(&mut self, element: &ObjectRef) -> Result<MapKey, CoreError> {
        let params = extract(element)?;
        let key = self.next;
        self.next = key.successor();
        self.bonds.insert(key, params);
        Ok(key)
    }

    fn insert_at_in_core(&mut self, key: MapKey, element: &ObjectRef) -> Result<(), CoreError> {
        let params = extract(element)?;
        self.next = self.next.max(key.successor());
        self.bonds.insert(key, params);
        Ok(())
    }

    fn erase_in_core(&mut self, key: MapKey) -> Result<(), CoreError> {
        self.bonds.shift_remove(&key);
        Ok(())
    }

    fn len_in_core(&self) -> usize {
        self.bonds.len()
    }
}

/// Register the three bond types and the mirrored map under their
/// stable names: `HarmonicBond`, `CoulombPair`, `TabulatedBond`, and
/// `Interactions`.
///
/// Every context in a group must call this against its own factory, or
/// replicated constructions will split.
pub fn register_interaction_types(factory: &mut Factory) -> Result<(), FactoryError> {
    factory.register::<HarmonicBond>("HarmonicBond")?;
    factory.register::<CoulombPair>("CoulombPair")?;
    factory.register::<TabulatedBond>("TabulatedBond")?;
    factory.register::<Interactions>("Interactions")?;
    Ok(())
}
