#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure dispatch system that automates the operator's start presses.
//!
//! An interactive shell forwards its start button directly; headless shells
//! run this system instead, so a staged delivery is collected and an arrived
//! courier hands its parcel over without a human in the loop.

use courier_core::{Command, Event};

/// Pure system that reacts to delivery lifecycle events with start commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dispatch;

impl Dispatch {
    /// Creates a new dispatch system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Consumes world events and emits the start commands an operator would
    /// otherwise issue by hand.
    pub fn handle(&self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::DeliveryStaged { .. } | Event::CourierArrived { .. } => {
                    out.push(Command::Start);
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{CellCoord, DeliveryPhase, Direction, TerrainColor, TerrainMap};
    use courier_world::{apply, query, World};

    #[test]
    fn staging_triggers_a_pickup_start() {
        let dispatch = Dispatch::new();
        let mut out = Vec::new();

        dispatch.handle(
            &[Event::DeliveryStaged {
                courier: CellCoord::new(1, 2),
                facing: Direction::East,
                source: CellCoord::new(2, 2),
                destination: CellCoord::new(7, 7),
            }],
            &mut out,
        );

        assert_eq!(out, vec![Command::Start]);
    }

    #[test]
    fn arrival_triggers_a_handover_start() {
        let dispatch = Dispatch::new();
        let mut out = Vec::new();

        dispatch.handle(
            &[Event::CourierArrived {
                at: CellCoord::new(7, 7),
            }],
            &mut out,
        );

        assert_eq!(out, vec![Command::Start]);
    }

    #[test]
    fn unrelated_events_emit_nothing() {
        let dispatch = Dispatch::new();
        let mut out = Vec::new();

        dispatch.handle(
            &[
                Event::MapLoaded {
                    columns: 10,
                    rows: 10,
                },
                Event::CourierAdvanced {
                    from: CellCoord::new(1, 2),
                    to: CellCoord::new(2, 2),
                    facing: Direction::East,
                },
            ],
            &mut out,
        );

        assert!(out.is_empty());
    }

    #[test]
    fn dispatch_drives_a_full_delivery_against_the_world() {
        let road = TerrainColor::from_rgb(120, 120, 120);
        let map = TerrainMap::from_cells(10, 10, vec![road; 100]).expect("map builds");

        let dispatch = Dispatch::new();
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::LoadMap { map }, &mut events);
        apply(&mut world, Command::Randomize, &mut events);

        let mut delivered = false;
        for _ in 0..1_000 {
            let mut commands = Vec::new();
            dispatch.handle(&events, &mut commands);
            if events
                .drain(..)
                .any(|event| matches!(event, Event::PackageDelivered { .. }))
            {
                delivered = true;
                break;
            }

            commands.push(Command::Tick);
            for command in commands {
                apply(&mut world, command, &mut events);
            }
        }

        assert!(delivered);
        assert_eq!(query::phase(&world), DeliveryPhase::Delivered);
    }
}
