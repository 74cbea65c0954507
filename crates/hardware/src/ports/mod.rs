//! Latency-buffered ports between pipeline stages.
//!
//! Ports are the sole means of inter-stage communication. This module provides:
//! 1. **Typed Channels:** One writer, one reader, carrying a single element type.
//! 2. **Cycle Discipline:** A value written at cycle `c` becomes readable at
//!    `c + latency`, never earlier. Unread values persist until consumed or
//!    flushed.
//! 3. **Fabric Validation:** Endpoints are declared by name during simulator
//!    construction; `validate` then rejects dangling, duplicated, or
//!    type-mismatched pairings before the first cycle runs.
//!
//! The registry is owned by the simulator, not process-global. Stages receive
//! their endpoints at construction and never look anything up afterwards.

use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::common::Cycle;

/// Internal shared state of one named channel.
struct Channel<T> {
    name: Rc<str>,
    /// Cycles between a write and its earliest visibility. Always >= 1.
    latency: Cycle,
    /// Maximum writes accepted in a single cycle.
    bandwidth: u32,
    queue: VecDeque<(Cycle, T)>,
    last_write_cycle: Cycle,
    writes_this_cycle: u32,
}

impl<T> Channel<T> {
    fn new(name: Rc<str>) -> Self {
        Self {
            name,
            latency: 1,
            bandwidth: 1,
            queue: VecDeque::new(),
            last_write_cycle: 0,
            writes_this_cycle: 0,
        }
    }

    fn write(&mut self, value: T, cycle: Cycle) {
        if cycle == self.last_write_cycle {
            self.writes_this_cycle += 1;
        } else {
            self.last_write_cycle = cycle;
            self.writes_this_cycle = 1;
        }
        if self.writes_this_cycle > self.bandwidth {
            // Two writes through a bandwidth-1 port in one cycle is a wiring
            // bug in the simulator itself, not a recoverable condition.
            panic!(
                "port '{}': bandwidth {} exceeded at cycle {}",
                self.name, self.bandwidth, cycle
            );
        }
        self.queue.push_back((cycle, value));
    }

    fn read(&mut self, cycle: Cycle) -> Option<T> {
        match self.queue.front() {
            Some(&(written, _)) if written + self.latency <= cycle => {
                self.queue.pop_front().map(|(_, v)| v)
            }
            _ => None,
        }
    }
}

/// The writing end of a channel.
pub struct WritePort<T> {
    channel: Rc<RefCell<Channel<T>>>,
}

impl<T> WritePort<T> {
    /// Appends `value` at `cycle`.
    ///
    /// # Panics
    ///
    /// Panics if more than `bandwidth` writes land on this port in one cycle.
    pub fn write(&self, value: T, cycle: Cycle) {
        self.channel.borrow_mut().write(value, cycle);
    }
}

/// The reading end of a channel.
pub struct ReadPort<T> {
    channel: Rc<RefCell<Channel<T>>>,
}

impl<T> ReadPort<T> {
    /// Pops the oldest value whose latency has elapsed by `cycle`, if any.
    /// Never blocks; an empty result simply means "nothing arrived yet".
    pub fn read(&self, cycle: Cycle) -> Option<T> {
        self.channel.borrow_mut().read(cycle)
    }

    /// Discards every pending value. Used on branch misprediction.
    pub fn flush(&self) {
        self.channel.borrow_mut().queue.clear();
    }
}

/// Per-name bookkeeping for validation.
struct Slot {
    type_id: TypeId,
    type_name: &'static str,
    writers: u32,
    readers: u32,
    /// Reader count the writer declared it expects.
    fanout: u32,
    channel: Rc<dyn Any>,
}

/// Registry pairing write and read endpoints by name.
///
/// Lives only for the duration of simulator construction: declare every
/// endpoint, call [`PortMap::validate`], then drop the map. The channels
/// themselves stay alive inside the stage-held endpoints.
#[derive(Default)]
pub struct PortMap {
    slots: HashMap<Rc<str>, Slot>,
    mismatches: Vec<String>,
}

impl PortMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot<T: 'static>(&mut self, name: &str) -> Option<Rc<RefCell<Channel<T>>>> {
        let key: Rc<str> = Rc::from(name);
        let slot = self.slots.entry(Rc::clone(&key)).or_insert_with(|| Slot {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            writers: 0,
            readers: 0,
            fanout: 1,
            channel: Rc::new(RefCell::new(Channel::<T>::new(key))),
        });
        if slot.type_id != TypeId::of::<T>() {
            self.mismatches.push(format!(
                "port '{}': declared as both {} and {}",
                name,
                slot.type_name,
                type_name::<T>()
            ));
            return None;
        }
        slot.channel
            .clone()
            .downcast::<RefCell<Channel<T>>>()
            .ok()
    }

    /// Declares the writing end of the channel `name`.
    pub fn write_port<T: 'static>(&mut self, name: &str, bandwidth: u32, fanout: u32) -> WritePort<T> {
        match self.slot::<T>(name) {
            Some(channel) => {
                let slot = self.slots.get_mut(name).unwrap();
                slot.writers += 1;
                slot.fanout = fanout;
                channel.borrow_mut().bandwidth = bandwidth;
                WritePort { channel }
            }
            // Type clash: hand back a detached channel so construction can
            // finish; validate() reports the recorded mismatch.
            None => WritePort {
                channel: Rc::new(RefCell::new(Channel::new(Rc::from(name)))),
            },
        }
    }

    /// Declares the reading end of the channel `name`.
    pub fn read_port<T: 'static>(&mut self, name: &str, latency: Cycle) -> ReadPort<T> {
        match self.slot::<T>(name) {
            Some(channel) => {
                let slot = self.slots.get_mut(name).unwrap();
                slot.readers += 1;
                channel.borrow_mut().latency = latency.max(1);
                ReadPort { channel }
            }
            None => ReadPort {
                channel: Rc::new(RefCell::new(Channel::new(Rc::from(name)))),
            },
        }
    }

    /// Checks that every declared channel has exactly one writer and the
    /// declared number of readers, and that no type clashes were recorded.
    pub fn validate(&self) -> Result<(), crate::common::SimError> {
        let mut problems = self.mismatches.clone();
        let mut names: Vec<&Rc<str>> = self.slots.keys().collect();
        names.sort();
        for name in names {
            let slot = &self.slots[name];
            if slot.writers == 0 {
                problems.push(format!("port '{}': no write end declared", name));
            } else if slot.writers > 1 {
                problems.push(format!("port '{}': {} write ends declared", name, slot.writers));
            }
            if slot.readers == 0 {
                problems.push(format!("port '{}': no read end declared", name));
            } else if slot.readers != slot.fanout {
                problems.push(format!(
                    "port '{}': {} read ends declared, fanout is {}",
                    name, slot.readers, slot.fanout
                ));
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(crate::common::SimError::PortFabric(problems))
        }
    }
}
