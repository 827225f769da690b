//! Dataset registry and active-set tracker

use heapless::Vec;

use ardueye_protocol::DisplayHint;

use super::descriptor::{Descriptor, DEFAULT_DATASETS};
use crate::config::MAX_DATASETS;

/// Registry construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// More than [`MAX_DATASETS`] descriptors
    TooMany,
    /// Two descriptors share an id
    DuplicateId(u8),
}

/// Result of [`DatasetRegistry::activate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Activation {
    /// Appended to the active set
    Activated,
    /// Already streaming; the active set is unchanged
    AlreadyActive,
    /// No descriptor with this id
    Unknown,
}

/// Descriptor table plus the ordered list of active datasets
///
/// The active list holds descriptor indices in activation order. It always
/// contains exactly the descriptors whose `active` flag is set.
#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    descriptors: Vec<Descriptor, MAX_DATASETS>,
    active: Vec<usize, MAX_DATASETS>,
}

impl Default for DatasetRegistry {
    fn default() -> Self {
        Self {
            descriptors: Vec::from_slice(&DEFAULT_DATASETS).unwrap_or_default(),
            active: Vec::new(),
        }
    }
}

impl DatasetRegistry {
    /// Build a registry from a custom descriptor table
    ///
    /// All descriptors start inactive.
    pub fn from_descriptors(table: &[Descriptor]) -> Result<Self, RegistryError> {
        let mut descriptors = Vec::new();
        for (i, desc) in table.iter().enumerate() {
            if table[..i].iter().any(|d| d.id == desc.id) {
                return Err(RegistryError::DuplicateId(desc.id));
            }
            let mut desc = *desc;
            desc.active = false;
            descriptors.push(desc).map_err(|_| RegistryError::TooMany)?;
        }
        Ok(Self {
            descriptors,
            active: Vec::new(),
        })
    }

    fn index_of(&self, id: u8) -> Option<usize> {
        self.descriptors.iter().position(|d| d.id == id)
    }

    /// Mark a dataset active, appending it to the active set if needed
    pub fn activate(&mut self, id: u8) -> Activation {
        let Some(index) = self.index_of(id) else {
            return Activation::Unknown;
        };
        if self.descriptors[index].active {
            return Activation::AlreadyActive;
        }
        // Capacity equals the descriptor count, so this cannot fail
        if self.active.push(index).is_err() {
            return Activation::AlreadyActive;
        }
        self.descriptors[index].active = true;
        Activation::Activated
    }

    /// Mark a dataset inactive and remove it from the active set
    ///
    /// Returns true if it was active.
    pub fn deactivate(&mut self, id: u8) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.descriptors[index].active = false;
        match self.active.iter().position(|&i| i == index) {
            Some(slot) => {
                self.active.remove(slot);
                true
            }
            None => false,
        }
    }

    /// True if the dataset is being streamed
    pub fn is_active(&self, id: u8) -> bool {
        self.descriptor(id).is_some_and(|d| d.active)
    }

    /// Ids of the active datasets, in activation order
    pub fn active_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.active.iter().map(|&i| self.descriptors[i].id)
    }

    /// Number of active datasets
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Look up a descriptor by id
    pub fn descriptor(&self, id: u8) -> Option<&Descriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    /// All descriptors, in table order
    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// Change the display hint of a dataset
    ///
    /// Returns false if the id is unknown.
    pub fn set_hint(&mut self, id: u8, hint: DisplayHint) -> bool {
        match self.descriptors.iter_mut().find(|d| d.id == id) {
            Some(desc) => {
                desc.hint = hint;
                true
            }
            None => false,
        }
    }

    /// Display hint of a dataset
    pub fn hint(&self, id: u8) -> Option<DisplayHint> {
        self.descriptor(id).map(|d| d.hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ids;
    use proptest::prelude::*;

    fn active(registry: &DatasetRegistry) -> std::vec::Vec<u8> {
        registry.active_ids().collect()
    }

    fn assert_consistent(registry: &DatasetRegistry) {
        let flagged = registry.descriptors().iter().filter(|d| d.is_active()).count();
        assert_eq!(flagged, registry.active_count());
        for id in registry.active_ids() {
            assert!(registry.is_active(id));
        }
    }

    #[test]
    fn test_default_table() {
        let registry = DatasetRegistry::default();
        assert_eq!(registry.descriptors().len(), MAX_DATASETS);
        assert_eq!(registry.hint(ids::RAW), Some(DisplayHint::Image));
        assert_eq!(registry.hint(ids::FPS), Some(DisplayHint::Text));
        assert_eq!(registry.descriptor(ids::FLOW_X).unwrap().label, Some("flow-x"));
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_start_start_stop() {
        let mut registry = DatasetRegistry::default();
        assert_eq!(registry.activate(48), Activation::Activated);
        assert_eq!(registry.activate(50), Activation::Activated);
        assert!(registry.deactivate(48));

        assert_eq!(active(&registry), [50]);
        assert_consistent(&registry);
    }

    #[test]
    fn test_activation_order_kept() {
        let mut registry = DatasetRegistry::default();
        registry.activate(ids::FPS);
        registry.activate(ids::RAW);
        registry.activate(ids::FLOW_Y);
        assert_eq!(active(&registry), [ids::FPS, ids::RAW, ids::FLOW_Y]);
    }

    #[test]
    fn test_double_start_is_idempotent() {
        let mut registry = DatasetRegistry::default();
        registry.activate(48);
        assert_eq!(registry.activate(48), Activation::AlreadyActive);
        assert_eq!(active(&registry), [48]);
    }

    #[test]
    fn test_unknown_ids_ignored() {
        let mut registry = DatasetRegistry::default();
        assert_eq!(registry.activate(49), Activation::Unknown);
        assert!(!registry.deactivate(49));
        assert!(!registry.set_hint(49, DisplayHint::Text));
        assert_eq!(registry.hint(49), None);
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_set_hint() {
        let mut registry = DatasetRegistry::default();
        assert!(registry.set_hint(ids::FLOW_X, DisplayHint::Dump));
        assert_eq!(registry.hint(ids::FLOW_X), Some(DisplayHint::Dump));
    }

    #[test]
    fn test_custom_table() {
        let table = [
            Descriptor::new(1, DisplayHint::Text, 4),
            Descriptor::new(2, DisplayHint::Chart, 8),
        ];
        let mut registry = DatasetRegistry::from_descriptors(&table).unwrap();
        registry.activate(2);
        assert_eq!(active(&registry), [2]);

        let dup = [table[0], table[0]];
        assert_eq!(
            DatasetRegistry::from_descriptors(&dup).unwrap_err(),
            RegistryError::DuplicateId(1)
        );

        let seven = [table[0]; 7];
        assert!(DatasetRegistry::from_descriptors(&seven).is_err());
    }

    fn op() -> impl Strategy<Value = (bool, u8)> {
        let id = prop_oneof![
            Just(ids::RAW),
            Just(ids::FLOW_X),
            Just(ids::FLOW_Y),
            Just(ids::FPS),
            Just(ids::CMD),
            Just(ids::MAXES),
            Just(49u8),
        ];
        (any::<bool>(), id)
    }

    proptest! {
        #[test]
        fn prop_active_set_matches_flags(ops in proptest::collection::vec(op(), 0..64)) {
            let mut registry = DatasetRegistry::default();
            let mut model: std::vec::Vec<u8> = std::vec::Vec::new();

            for (start, id) in ops {
                let known = registry.descriptor(id).is_some();
                if start {
                    registry.activate(id);
                    if known && !model.contains(&id) {
                        model.push(id);
                    }
                } else {
                    registry.deactivate(id);
                    model.retain(|&m| m != id);
                }
            }

            prop_assert_eq!(active(&registry), model);
            assert_consistent(&registry);
        }
    }
}
