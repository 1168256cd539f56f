//! Integration tests for property lifecycles across a container.

use propsync_codec::CborWriter;
use propsync_core::{
    Color, ManualClock, MapData, Permission, PropertyContainer, Schedule, ScheduleUnit,
    SyncPolicy, Value,
};
use proptest::prelude::*;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

fn send(container: &mut PropertyContainer, name: &str) {
    let mut buf = [0u8; 256];
    let mut writer = CborWriter::new(&mut buf);
    let property = container.get_mut(name).unwrap();
    property.append(&mut writer, false).unwrap();
    property.append_completed();
}

#[test]
fn local_change_then_remote_fetch() {
    let clock = Arc::new(ManualClock::new(0, 1_000));
    let mut container = PropertyContainer::new(clock.clone());
    let calls = Rc::new(Cell::new(0));
    let seen = calls.clone();
    container
        .add("color", Permission::ReadWrite, Color::new(10.0, 20.0, 30.0))
        .on_update(move |_| seen.set(seen.get() + 1))
        .sync_policy(SyncPolicy::MostRecentWins);
    send(&mut container, "color");

    // A local edit at t=2000 beats a remote value stamped 1500.
    clock.set_unix_time(2_000);
    container
        .get_mut("color")
        .unwrap()
        .get_mut::<Color>()
        .unwrap()
        .bri = 90.0;
    assert_eq!(container.update_local_timestamps(), 1);

    let records = [
        MapData::named("color:hue").with_value(200.0),
        MapData::named("color:sat").with_value(50.0),
        MapData::named("color:bri").with_value(50.0),
    ];
    container.apply("color", 1_500, true, &records);
    let property = container.get("color").unwrap();
    assert_eq!(property.get::<Color>().unwrap().bri, 90.0);
    assert_eq!(calls.get(), 0);
    assert!(property.is_different_from_cloud());

    // A newer remote value wins.
    container.apply("color", 2_500, true, &records);
    let property = container.get("color").unwrap();
    assert_eq!(property.get::<Color>(), Some(&Color::new(200.0, 50.0, 50.0)));
    assert_eq!(calls.get(), 1);
}

#[test]
fn schedule_round_trips_through_shadow() {
    let clock = Arc::new(ManualClock::new(0, 0));
    let mut container = PropertyContainer::new(clock);
    container.add("sched", Permission::ReadWrite, Schedule::default());

    let mask = Schedule::fixed_delta_mask(ScheduleUnit::Minutes, 15);
    let records = [
        MapData::named("sched:frm").with_value(1_000.0),
        MapData::named("sched:to").with_value(2_000.0),
        MapData::named("sched:len").with_value(60.0),
        MapData::named("sched:msk").with_value(f64::from(mask)),
    ];
    assert!(container.apply("sched", 0, false, &records));
    let property = container.get("sched").unwrap();
    assert_eq!(
        property.value(),
        &Value::Schedule(Schedule::new(1_000, 2_000, 60, mask))
    );
    assert!(property.is_echo_requested());
}

#[test]
fn echo_is_sent_once() {
    let clock = Arc::new(ManualClock::new(0, 0));
    let mut container = PropertyContainer::new(clock);
    container.add("level", Permission::ReadWrite, 1u32);
    send(&mut container, "level");

    container.apply("level", 10, false, &[MapData::named("level").with_value(4.0)]);
    assert!(container.get("level").unwrap().should_be_updated());
    send(&mut container, "level");
    assert!(!container.get("level").unwrap().should_be_updated());
    assert_eq!(
        container.get("level").unwrap().cloud_value(),
        &Value::UnsignedInt(4)
    );
}

#[derive(Debug, Clone)]
enum Step {
    SetValue(i32),
    Advance(u64),
    Send,
    Request,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (-50i32..50).prop_map(Step::SetValue),
        (0u64..2_000).prop_map(Step::Advance),
        Just(Step::Send),
        Just(Step::Request),
    ]
}

proptest! {
    #[test]
    fn should_be_updated_is_a_pure_query(
        steps in prop::collection::vec(step(), 0..40),
        delta in 0.0f32..10.0,
    ) {
        let clock = Arc::new(ManualClock::new(0, 0));
        let mut container = PropertyContainer::new(clock.clone());
        container.add("n", Permission::Read, 0i32).publish_on_change_every(delta, 300);

        for step in steps {
            match step {
                Step::SetValue(v) => container.get_mut("n").unwrap().set_value(v).unwrap(),
                Step::Advance(ms) => clock.advance(ms),
                Step::Send => send(&mut container, "n"),
                Step::Request => container.request_update_for_all(),
            }
            let property = container.get("n").unwrap();
            let first = property.should_be_updated();
            prop_assert_eq!(first, property.should_be_updated());
        }
    }
}
