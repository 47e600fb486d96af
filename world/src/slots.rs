//! Slot storage and per-activation state transitions.

use whack_core::{HitOutcome, NotInteractable, Occupant, SlotId, SlotSnapshot};

use crate::timers::TimerHandle;

#[derive(Clone, Debug)]
struct Slot {
    id: SlotId,
    occupant: Option<Occupant>,
    visible: bool,
    hit: bool,
    expiry: Option<TimerHandle>,
}

impl Slot {
    fn new(id: SlotId) -> Self {
        Self {
            id,
            occupant: None,
            visible: false,
            hit: false,
            expiry: None,
        }
    }

    fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            id: self.id,
            occupant: self.occupant,
            visible: self.visible,
            hit: self.hit,
        }
    }
}

/// Fixed-size, ordered collection of slots created once per session.
#[derive(Debug)]
pub(crate) struct SlotPool {
    slots: Vec<Slot>,
}

impl SlotPool {
    pub(crate) fn new(count: u32) -> Self {
        Self {
            slots: (0..count).map(|index| Slot::new(SlotId::new(index))).collect(),
        }
    }

    pub(crate) fn snapshots(&self) -> Vec<SlotSnapshot> {
        self.slots.iter().map(Slot::snapshot).collect()
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.slots.iter().map(|slot| slot.id)
    }

    /// Starts a fresh activation hosting `occupant`, clearing any earlier hit.
    ///
    /// A slot that is still showing a target is re-armed with the new
    /// occupant. Returns `false` only for unknown slots.
    pub(crate) fn activate(&mut self, id: SlotId, occupant: Occupant) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };

        slot.occupant = Some(occupant);
        slot.visible = true;
        slot.hit = false;
        true
    }

    /// Hides and empties the slot, returning whether it was visible.
    pub(crate) fn deactivate(&mut self, id: SlotId) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        slot.expiry = None;
        if !slot.visible {
            return false;
        }

        slot.visible = false;
        slot.occupant = None;
        slot.hit = false;
        true
    }

    /// Marks the current activation as struck and reports what was hit.
    pub(crate) fn resolve_hit(&mut self, id: SlotId) -> Result<HitOutcome, NotInteractable> {
        let rejection = NotInteractable { slot: id };
        let slot = self.slot_mut(id).ok_or(rejection)?;
        if !slot.visible || slot.hit {
            return Err(rejection);
        }
        let occupant = slot.occupant.ok_or(rejection)?;

        slot.hit = true;
        Ok(HitOutcome { slot: id, occupant })
    }

    /// Records the pending deactivation timer, returning the one it replaces.
    pub(crate) fn replace_expiry(
        &mut self,
        id: SlotId,
        handle: TimerHandle,
    ) -> Option<TimerHandle> {
        self.slot_mut(id)
            .and_then(|slot| slot.expiry.replace(handle))
    }

    pub(crate) fn expiry(&self, id: SlotId) -> Option<TimerHandle> {
        self.slots.get(id.index()).and_then(|slot| slot.expiry)
    }

    fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        self.slots.get_mut(id.index()).filter(|slot| slot.id == id)
    }
}
