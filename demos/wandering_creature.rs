//! Wandering Creature
//!
//! This demo drives a small creature that idles, wanders off once it gets
//! restless, and goes back to idling when it has covered enough ground.
//!
//! Key concepts:
//! - Machine configuration loaded from JSON
//! - Timer entries that advance once per whole second
//! - Watchers that request state changes when a threshold is crossed
//! - Hooks that read and write the shared blackboard
//!
//! Run with: RUST_LOG=debug cargo run --example wandering_creature

use blackboard_fsm::blackboard::{Blackboard, Comparison, Response, WatcherDescriptor};
use blackboard_fsm::core::Notification;
use blackboard_fsm::machine::{simulate, Behavior, StateContext};
use blackboard_fsm::{key_enum, MachineConfig, StateMachineBuilder};

key_enum! {
    enum Activity {
        Idle,
        Move,
    }
}

key_enum! {
    enum Need {
        Restlessness,
        Distance,
        Health,
    }
}

const CONFIG: &str = r#"{
    "states": ["Idle", "Move"],
    "start": "Idle",
    "entries": [
        { "id": "Health", "start_value": 100 },
        { "id": "Distance" },
        { "id": "Restlessness", "is_timer": true, "interval": 2 }
    ]
}"#;

struct Idle;

impl Behavior<Activity, Need> for Idle {
    fn on_enter(&mut self, ctx: &mut StateContext<'_, Activity, Need>) {
        let _ = ctx.blackboard_mut().set_value(&Need::Restlessness, 0.0);
    }
}

struct Move {
    speed: f32,
}

impl Behavior<Activity, Need> for Move {
    fn on_enter(&mut self, ctx: &mut StateContext<'_, Activity, Need>) {
        let _ = ctx.blackboard_mut().set_value(&Need::Distance, 0.0);
    }

    fn logic_tick(&mut self, ctx: &mut StateContext<'_, Activity, Need>, delta: f32) {
        let _ = ctx.blackboard_mut().increase(&Need::Distance, self.speed * delta);
    }

    fn physics_tick(&mut self, ctx: &mut StateContext<'_, Activity, Need>, _delta: f32) {
        if ctx.time_in_state() > 10.0 {
            ctx.change_state(Activity::Idle);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,blackboard_fsm=debug".into()),
        )
        .init();

    println!("=== Wandering Creature Demo ===\n");

    let factory = |id: &Activity, _: &Blackboard<Need, Activity>| {
        let behavior: Box<dyn Behavior<Activity, Need>> = match id {
            Activity::Idle => Box::new(Idle),
            Activity::Move => Box::new(Move { speed: 1.5 }),
        };
        Some(behavior)
    };

    let mut config: MachineConfig<Activity, Need> = MachineConfig::from_json(CONFIG).unwrap();
    // Watchers with callbacks are attached in code; plain ones could live in JSON too.
    for entry in &mut config.entries {
        match entry.id {
            Need::Restlessness => entry.watchers.push(WatcherDescriptor::new(
                Comparison::GreaterThan,
                2.5,
                Response::ChangeState(Activity::Move),
            )),
            Need::Distance => entry.watchers.push(WatcherDescriptor::new(
                Comparison::GreaterThan,
                6.0,
                Response::callback(|commands| commands.change_state(Activity::Idle)),
            )),
            Need::Health => {}
        }
    }

    let mut machine = StateMachineBuilder::new()
        .config(config)
        .build(&factory)
        .unwrap();
    machine.subscribe(|notification| {
        if let Notification::StateChanged { previous, current } = notification {
            println!("  {:?} -> {:?}", previous, current);
        }
    });
    machine.initialize().unwrap();

    simulate(&mut machine, 60, 0.5).unwrap();

    println!("\nAfter {:.1}s:", machine.blackboard().elapsed());
    println!("  state:    {:?}", machine.current_state());
    println!("  distance: {:?}", machine.blackboard().get_value(&Need::Distance));
    println!("  path:     {:?}", machine.history().get_path());

    println!("\n=== Demo Complete ===");
}
