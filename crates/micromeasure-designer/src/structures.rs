//! Structure registry.
//!
//! A structure is a named, ordered group of shapes of a single type whose
//! measurements are reported together. The registry keeps structures in
//! creation order and drops a structure as soon as its last shape leaves it.

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::model::ShapeType;

/// Prefix of generated structure names.
pub const AUTO_NAME_PREFIX: &str = "structure_";

#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub name: String,
    pub shape_type: ShapeType,
    pub members: Vec<u64>,
}

/// Where a shape sat inside the registry, used to put it back exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSlot {
    pub name: String,
    /// Position of the structure in the registry
    pub structure_index: usize,
    /// Position of the shape inside the structure
    pub member_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureRegistry {
    structures: Vec<Structure>,
}

impl StructureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Structure> {
        self.structures.iter().find(|s| s.name == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.structures.iter().position(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Structure> {
        self.structures.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.structures.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    pub fn clear(&mut self) {
        self.structures.clear();
    }

    /// Lowest unused `structure_NNN` name.
    pub fn next_auto_name(&self) -> String {
        (0..)
            .map(|n| format!("{AUTO_NAME_PREFIX}{n:03}"))
            .find(|name| !self.contains(name))
            .unwrap_or_default()
    }

    /// Checks whether a shape of `shape_type` may join `structure_name`.
    ///
    /// A structure only accepts shapes of the type it already holds. On
    /// rejection the caller picks another name or abandons the shape.
    pub fn check_creation_allowed(
        &self,
        shape_type: ShapeType,
        structure_name: &str,
    ) -> Result<(), RegistryError> {
        if structure_name.trim().is_empty() {
            return Err(RegistryError::InvalidName(structure_name.to_string()));
        }
        match self.get(structure_name) {
            Some(existing) if !existing.members.is_empty() && existing.shape_type != shape_type => {
                Err(RegistryError::TypeMismatch {
                    structure: structure_name.to_string(),
                    existing: existing.shape_type,
                    requested: shape_type,
                })
            }
            _ => Ok(()),
        }
    }

    /// Appends a shape to a structure, creating the structure on first use.
    /// Without a name the next generated name is used. Returns the name.
    pub fn save_object(
        &mut self,
        structure_name: Option<&str>,
        id: u64,
        shape_type: ShapeType,
    ) -> Result<String, RegistryError> {
        let name = match structure_name {
            Some(name) => name.to_string(),
            None => self.next_auto_name(),
        };
        self.check_creation_allowed(shape_type, &name)?;
        match self.position(&name) {
            Some(index) => self.structures[index].members.push(id),
            None => self.structures.push(Structure {
                name: name.clone(),
                shape_type,
                members: vec![id],
            }),
        }
        Ok(name)
    }

    /// Puts a shape back at a recorded slot. A structure that no longer exists
    /// is recreated at its old position.
    pub fn insert_at(&mut self, slot: &StructureSlot, id: u64, shape_type: ShapeType) {
        match self.position(&slot.name) {
            Some(index) => {
                let members = &mut self.structures[index].members;
                let at = slot.member_index.min(members.len());
                members.insert(at, id);
            }
            None => {
                let at = slot.structure_index.min(self.structures.len());
                self.structures.insert(
                    at,
                    Structure {
                        name: slot.name.clone(),
                        shape_type,
                        members: vec![id],
                    },
                );
            }
        }
    }

    /// Removes a shape, pruning its structure if it becomes empty.
    pub fn delete_object(&mut self, id: u64) -> Result<StructureSlot, RegistryError> {
        let (structure_index, member_index) = self
            .locate(id)
            .ok_or(RegistryError::ShapeNotFound(id))?;
        let structure = &mut self.structures[structure_index];
        structure.members.remove(member_index);
        let slot = StructureSlot {
            name: structure.name.clone(),
            structure_index,
            member_index,
        };
        if structure.members.is_empty() {
            self.structures.remove(structure_index);
        }
        Ok(slot)
    }

    /// Renames a structure in place, keeping its position.
    pub fn rename_structure(&mut self, from: &str, to: &str) -> Result<(), RegistryError> {
        if to.trim().is_empty() {
            return Err(RegistryError::InvalidName(to.to_string()));
        }
        let index = self
            .position(from)
            .ok_or_else(|| RegistryError::StructureNotFound(from.to_string()))?;
        if from == to {
            return Ok(());
        }
        if self.contains(to) {
            return Err(RegistryError::NameTaken(to.to_string()));
        }
        self.structures[index].name = to.to_string();
        Ok(())
    }

    /// Structure name and index within it of a shape.
    pub fn find_object(&self, id: u64) -> Result<(String, usize), RegistryError> {
        self.locate(id)
            .map(|(s, m)| (self.structures[s].name.clone(), m))
            .ok_or(RegistryError::ShapeNotFound(id))
    }

    fn locate(&self, id: u64) -> Option<(usize, usize)> {
        self.structures.iter().enumerate().find_map(|(s, structure)| {
            structure
                .members
                .iter()
                .position(|&member| member == id)
                .map(|m| (s, m))
        })
    }
}
