//! The rule-object registry: one arena owning every live object.
//!
//! The registry owns the id space (ids are assigned at registration and
//! never reused) and maintains, per event kind and per modifier kind, the
//! insertion-ordered list of objects that must be consulted. Cross
//! references between objects are positions resolved through `find`, never
//! held references; looking up an unregistered id is an invariant
//! violation surfaced as `MatchError::UnregisteredObject`.

use std::collections::HashMap;

use crate::action::EventKind;
use crate::game::MatchError;
use crate::ids::ObjectId;
use crate::modifier::ModifierKind;
use crate::object::{GameObject, RuleObject};
use crate::position::ObjectPosition;

#[derive(Debug, Default)]
pub struct Registry {
    next_id: u32,
    objects: HashMap<ObjectId, GameObject>,
    listeners: HashMap<EventKind, Vec<ObjectId>>,
    modifiers: HashMap<ModifierKind, Vec<ObjectId>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Register an object: assign the next id, stamp it into the object's
    /// position, and index its declared subscriptions.
    pub fn register(&mut self, mut object: GameObject) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        let mut position = object.position();
        position.id = id;
        object.set_position(position);

        for kind in object.listens() {
            self.listeners.entry(kind).or_default().push(id);
        }
        for kind in object.modifier_kinds() {
            self.modifiers.entry(kind).or_default().push(id);
        }
        self.objects.insert(id, object);
        id
    }

    /// Remove an object and all its index entries.
    pub fn unregister(&mut self, id: ObjectId) -> Result<GameObject, MatchError> {
        let object = self
            .objects
            .remove(&id)
            .ok_or(MatchError::UnregisteredObject(id))?;
        for ids in self.listeners.values_mut() {
            ids.retain(|x| *x != id);
        }
        for ids in self.modifiers.values_mut() {
            ids.retain(|x| *x != id);
        }
        Ok(object)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn get(&self, id: ObjectId) -> Result<&GameObject, MatchError> {
        self.objects.get(&id).ok_or(MatchError::UnregisteredObject(id))
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Result<&mut GameObject, MatchError> {
        self.objects
            .get_mut(&id)
            .ok_or(MatchError::UnregisteredObject(id))
    }

    /// Temporarily remove an object for a dispatch call; pair with `put`.
    pub fn take(&mut self, id: ObjectId) -> Result<GameObject, MatchError> {
        self.objects
            .remove(&id)
            .ok_or(MatchError::UnregisteredObject(id))
    }

    pub fn put(&mut self, id: ObjectId, object: GameObject) {
        self.objects.insert(id, object);
    }

    /// Ids subscribed to an event kind, in registration order. Game
    /// priority ordering is layered on top by the processor.
    pub fn subscribers_for(&self, kind: EventKind) -> Vec<ObjectId> {
        self.listeners.get(&kind).cloned().unwrap_or_default()
    }

    /// Ids contributing a modifier kind, in registration order.
    pub fn modifiers_for(&self, kind: ModifierKind) -> Vec<ObjectId> {
        self.modifiers.get(&kind).cloned().unwrap_or_default()
    }

    /// Resolve a position to its object. The id is the authoritative part
    /// of the address.
    pub fn find(&self, position: &ObjectPosition) -> Option<&GameObject> {
        self.objects.get(&position.id)
    }

    /// All live ids (diagnostics and structural checks).
    pub fn ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.objects.keys().copied().collect();
        ids.sort();
        ids
    }

    /// All live objects in id order (deterministic scans).
    pub fn objects_sorted(&self) -> Vec<&GameObject> {
        self.ids()
            .into_iter()
            .map(|id| self.objects.get(&id).expect("id listed but missing"))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PlayerId;
    use crate::position::Area;
    use crate::system::{SystemHandler, SystemRole};

    fn system_object(player: PlayerId) -> GameObject {
        GameObject::System(SystemHandler::new(
            SystemRole::DefeatWatcher,
            ObjectPosition::new(player, Area::System, ObjectId::from_raw(0)),
        ))
    }

    #[test]
    fn test_register_assigns_fresh_ids_and_stamps_position() {
        let mut registry = Registry::new();
        let a = registry.register(system_object(PlayerId::P0));
        let b = registry.register(system_object(PlayerId::P1));
        assert_ne!(a, b);
        assert_eq!(registry.get(a).unwrap().position().id, a);
        assert_eq!(registry.get(b).unwrap().position().player, PlayerId::P1);
    }

    #[test]
    fn test_subscriber_index_in_insertion_order() {
        let mut registry = Registry::new();
        let a = registry.register(system_object(PlayerId::P0));
        let b = registry.register(system_object(PlayerId::P1));
        assert_eq!(
            registry.subscribers_for(EventKind::AfterMakeDamage),
            vec![a, b]
        );
        assert!(registry.subscribers_for(EventKind::OnRoundStart).is_empty());
    }

    #[test]
    fn test_unregister_clears_index() {
        let mut registry = Registry::new();
        let a = registry.register(system_object(PlayerId::P0));
        let b = registry.register(system_object(PlayerId::P1));
        registry.unregister(a).unwrap();
        assert_eq!(registry.subscribers_for(EventKind::AfterMakeDamage), vec![b]);
        assert!(matches!(
            registry.get(a),
            Err(MatchError::UnregisteredObject(_))
        ));
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut registry = Registry::new();
        let a = registry.register(system_object(PlayerId::P0));
        registry.unregister(a).unwrap();
        let b = registry.register(system_object(PlayerId::P0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_find_by_position() {
        let mut registry = Registry::new();
        let a = registry.register(system_object(PlayerId::P0));
        let position = registry.get(a).unwrap().position();
        assert!(registry.find(&position).is_some());
        registry.unregister(a).unwrap();
        assert!(registry.find(&position).is_none());
    }
}
