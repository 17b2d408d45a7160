//! rampart is the simulation core of a tower-defense game, designed to be stepped once per rendered frame.
//!
//! It owns an entity store, the level's enemy paths, a uniform spatial grid and a pool of
//! projectile handles, and advances them through an ordered pipeline of gameplay systems:
//! movement, spatial indexing, status effects, targeting, firing, projectile resolution and cleanup.
//!
//! A macro is used to define the entity store and its components, and generates
//! the store as plain data (one slot table per component) plus accessor methods at compile time.
//! Systems are free functions over the store, so each one can be driven and tested on its own.
//!
//! # Key Features
//!
//! - **Generational Handles**: Entities are slot indices plus a generation, so a destroyed entity's handle never resolves again
//! - **Per-Component Tables**: Every component lives in its own slot table and can be attached or stripped independently
//! - **Explicit Pipeline**: The frame order is a validated [`schedule::Schedule`], not an accident of call order
//! - **Projectile Pooling**: Spent projectiles are parked and reused instead of reallocated
//! - **Serialization**: Stores, components and definitions derive serde traits
//!
//! # Defining a Store
//!
//! ```rust,ignore
//! use rampart::entity_store;
//! use serde::{Serialize, Deserialize};
//!
//! // Components must implement: `Default + Clone + Debug + Serialize + Deserialize`
//! #[derive(Default, Clone, Debug, Serialize, Deserialize)]
//! struct Position { x: f32, y: f32 }
//!
//! #[derive(Default, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
//! enum Kind { #[default] Unassigned, Mover }
//!
//! entity_store! {
//!     Store<Kind> {
//!         position: Position => POSITION,
//!     }
//! }
//! ```
//!
//! ## Entity and Component Access
//!
//! ```rust,ignore
//! let mut store = Store::default();
//!
//! // Spawn entities with default components by mask
//! let entity = store.spawn_entities(POSITION, 1)[0];
//!
//! // Lookup and modify a component
//! if let Some(position) = store.get_position_mut(entity) {
//!     position.x += 1.0;
//! }
//!
//! // Strip components by mask, or destroy the whole entity
//! store.remove_components(entity, POSITION);
//! store.destroy(entity);
//!
//! // Handles of destroyed entities never resolve again
//! assert!(store.get_position(entity).is_none());
//! ```
//!
//! # Running a Level
//!
//! ```rust,ignore
//! let mut session = Session::new(definitions, "meadow", SimConfig::default())?;
//! session.place_tower("arrow_mk1", Vec2::new(140.0, 60.0))?;
//! loop {
//!     let report = session.update(frame_dt);
//!     // draw session.simulation().renderables() and session.hud()
//! }
//! ```

#[doc(hidden)]
pub use paste as __paste;

#[macro_export]
macro_rules! entity_store {
    (
        $store:ident<$kind:ty> {
            $($name:ident: $type:ty => $mask:ident),* $(,)?
        }
    ) => {
        $crate::__paste::paste! {

        /// Component masks
        #[repr(u32)]
        #[allow(clippy::upper_case_acronyms)]
        #[allow(non_camel_case_types)]
        pub enum Component {
            $($mask,)*
        }

        $(pub const $mask: u32 = 1 << (Component::$mask as u32);)*

        /// Every component mask combined
        pub const ALL_COMPONENTS: u32 = 0 $(| $mask)*;

        /// Entity handle, an index into storage and a generation counter to prevent stale references.
        /// Index 0 is reserved and never handed out.
        #[derive(Default, Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub struct Entity {
            pub index: u32,
            pub generation: u32,
        }

        impl Entity {
            /// The reserved "no entity" handle
            pub const INVALID: Entity = Entity { index: 0, generation: 0 };

            pub fn is_valid(&self) -> bool {
                self.index != 0
            }
        }

        impl std::fmt::Display for Entity {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}v{}", self.index, self.generation)
            }
        }

        /// Per-slot bookkeeping shared by every component table
        #[derive(Default, Debug, Clone, serde::Serialize, serde::Deserialize)]
        pub struct Slots {
            pub generations: Vec<u32>,
            pub alive: Vec<bool>,
            pub masks: Vec<u32>,
            pub kinds: Vec<$kind>,
            pub free: Vec<u32>,
        }

        /// Component slot tables, one per component, indexed by entity index.
        /// Deserializing checks that every table covers every slot.
        #[derive(Default, Debug, Clone, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "StoreSnapshot")]
        pub struct $store {
            pub slots: Slots,
            $(pub $name: Vec<Option<$type>>,)*
            live: usize,
        }

        /// Unchecked serialized form of the store
        #[doc(hidden)]
        #[derive(serde::Deserialize)]
        pub struct StoreSnapshot {
            slots: Slots,
            $($name: Vec<Option<$type>>,)*
            live: usize,
        }

        impl TryFrom<StoreSnapshot> for $store {
            type Error = String;

            fn try_from(snapshot: StoreSnapshot) -> Result<Self, Self::Error> {
                let slots = &snapshot.slots;
                let len = slots.generations.len();
                if slots.alive.len() != len || slots.masks.len() != len || slots.kinds.len() != len {
                    return Err(format!("slot bookkeeping does not cover {} slots", len));
                }
                $(
                    if snapshot.$name.len() != len {
                        return Err(format!(
                            "`{}` table has {} slots, expected {}",
                            stringify!($name),
                            snapshot.$name.len(),
                            len
                        ));
                    }
                )*
                if slots.alive.first().copied().unwrap_or(false) {
                    return Err("slot 0 is reserved".to_string());
                }
                for &index in &slots.free {
                    let slot = index as usize;
                    if index == 0 || slot >= len || slots.alive[slot] {
                        return Err(format!("free list holds unusable slot {}", index));
                    }
                }
                let alive = slots.alive.iter().filter(|alive| **alive).count();
                if alive != snapshot.live {
                    return Err(format!(
                        "{} live entities recorded, {} slots alive",
                        snapshot.live, alive
                    ));
                }

                Ok(Self {
                    slots: snapshot.slots,
                    $($name: snapshot.$name,)*
                    live: snapshot.live,
                })
            }
        }

        impl $store {
            /// Spawn a batch of new entities, each with default values for the components in `mask`
            pub fn spawn_entities(&mut self, mask: u32, count: usize) -> Vec<Entity> {
                let mut entities = Vec::with_capacity(count);
                for _ in 0..count {
                    let entity = self.allocate();
                    self.add_components(entity, mask);
                    entities.push(entity);
                }
                entities
            }

            /// Destroy an entity and every component attached to it.
            /// Returns false, and changes nothing, for stale or unknown handles.
            pub fn destroy(&mut self, entity: Entity) -> bool {
                let Some(slot) = self.slot(entity) else {
                    return false;
                };
                $(self.$name[slot] = None;)*
                self.slots.alive[slot] = false;
                self.slots.masks[slot] = 0;
                self.slots.kinds[slot] = <$kind>::default();
                // A slot whose generation is exhausted is retired for good
                if let Some(next) = self.slots.generations[slot].checked_add(1) {
                    self.slots.generations[slot] = next;
                    self.slots.free.push(entity.index);
                }
                self.live -= 1;
                true
            }

            /// Despawn a batch of entities, returning the ones that were actually alive
            pub fn despawn_entities(&mut self, entities: &[Entity]) -> Vec<Entity> {
                entities
                    .iter()
                    .copied()
                    .filter(|&entity| self.destroy(entity))
                    .collect()
            }

            pub fn is_alive(&self, entity: Entity) -> bool {
                self.slot(entity).is_some()
            }

            /// Number of live entities
            pub fn len(&self) -> usize {
                self.live
            }

            pub fn is_empty(&self) -> bool {
                self.live == 0
            }

            /// Get the role discriminant stored alongside an entity
            pub fn kind(&self, entity: Entity) -> Option<$kind> {
                self.slot(entity).map(|slot| self.slots.kinds[slot])
            }

            pub fn set_kind(&mut self, entity: Entity, kind: $kind) -> bool {
                let Some(slot) = self.slot(entity) else {
                    return false;
                };
                self.slots.kinds[slot] = kind;
                true
            }

            /// Get the current component mask for an entity
            pub fn component_mask(&self, entity: Entity) -> Option<u32> {
                self.slot(entity).map(|slot| self.slots.masks[slot])
            }

            /// Query for all live entities that carry every component in `mask`, in slot order
            pub fn query_entities(&self, mask: u32) -> Vec<Entity> {
                self.slots
                    .alive
                    .iter()
                    .enumerate()
                    .filter(|(slot, alive)| **alive && self.slots.masks[*slot] & mask == mask)
                    .map(|(slot, _)| Entity {
                        index: slot as u32,
                        generation: self.slots.generations[slot],
                    })
                    .collect()
            }

            /// Attach default values for every component in `mask` the entity does not have yet
            pub fn add_components(&mut self, entity: Entity, mask: u32) -> bool {
                let Some(slot) = self.slot(entity) else {
                    return false;
                };
                $(
                    if mask & $mask != 0 && self.$name[slot].is_none() {
                        self.$name[slot] = Some(<$type>::default());
                    }
                )*
                self.slots.masks[slot] |= mask & ALL_COMPONENTS;
                true
            }

            /// Strip every component in `mask` from an entity, keeping the entity alive
            pub fn remove_components(&mut self, entity: Entity, mask: u32) -> bool {
                let Some(slot) = self.slot(entity) else {
                    return false;
                };
                $(
                    if mask & $mask != 0 {
                        self.$name[slot] = None;
                    }
                )*
                self.slots.masks[slot] &= !mask;
                true
            }

            $(
                #[doc = "Get the `" $name "` component of an entity"]
                pub fn [<get_ $name>](&self, entity: Entity) -> Option<&$type> {
                    self.slot(entity).and_then(|slot| self.$name[slot].as_ref())
                }

                #[doc = "Get a mutable reference to the `" $name "` component of an entity"]
                pub fn [<get_ $name _mut>](&mut self, entity: Entity) -> Option<&mut $type> {
                    let slot = self.slot(entity)?;
                    self.$name[slot].as_mut()
                }

                #[doc = "Attach or overwrite the `" $name "` component of an entity"]
                pub fn [<set_ $name>](&mut self, entity: Entity, value: $type) -> bool {
                    let Some(slot) = self.slot(entity) else {
                        return false;
                    };
                    self.$name[slot] = Some(value);
                    self.slots.masks[slot] |= $mask;
                    true
                }

                #[doc = "Detach and return the `" $name "` component of an entity"]
                pub fn [<take_ $name>](&mut self, entity: Entity) -> Option<$type> {
                    let slot = self.slot(entity)?;
                    self.slots.masks[slot] &= !$mask;
                    self.$name[slot].take()
                }

                pub fn [<has_ $name>](&self, entity: Entity) -> bool {
                    self.[<get_ $name>](entity).is_some()
                }
            )*

            // Implementation details

            fn slot(&self, entity: Entity) -> Option<usize> {
                let slot = entity.index as usize;
                if entity.index == 0 || slot >= self.slots.generations.len() {
                    return None;
                }
                if self.slots.generations[slot] != entity.generation || !self.slots.alive[slot] {
                    return None;
                }
                Some(slot)
            }

            fn allocate(&mut self) -> Entity {
                if self.slots.generations.is_empty() {
                    self.push_slot();
                }
                self.live += 1;

                if let Some(index) = self.slots.free.pop() {
                    let slot = index as usize;
                    self.slots.alive[slot] = true;
                    return Entity {
                        index,
                        generation: self.slots.generations[slot],
                    };
                }

                let index = self.slots.generations.len() as u32;
                self.push_slot();
                self.slots.alive[index as usize] = true;
                Entity { index, generation: 0 }
            }

            fn push_slot(&mut self) {
                self.slots.generations.push(0);
                self.slots.alive.push(false);
                self.slots.masks.push(0);
                self.slots.kinds.push(<$kind>::default());
                $(self.$name.push(None);)*
            }
        }

        }
    };
}

#[macro_export]
macro_rules! has_components {
    ($store:expr, $entity:expr, $mask:expr) => {
        $store
            .component_mask($entity)
            .is_some_and(|mask| mask & $mask == $mask)
    };
}

pub mod components;
pub mod config;
pub mod definitions;
pub mod error;
pub mod path;
pub mod pool;
pub mod schedule;
pub mod session;
pub mod simulation;
pub mod spatial;
pub mod spawn;
pub mod store;
pub mod systems;
pub mod upgrade;

pub use config::{SimConfig, TargetingQuery};
pub use error::{SimError, SimResult};
pub use glam::Vec2;
pub use schedule::{FrameReport, Schedule, Stage};
pub use session::{HudSnapshot, Outcome, Session, SpeedMode};
pub use simulation::Simulation;
pub use store::{Entity, EntityKind, EntityStore};
