//! Fleet store behaviour: initialization, merging and change notifications

use fleet_sim::simulation::{
    FleetStore, Location, OperatingStatus, StoreError, Telemetry, VehicleId, VehicleRecord,
    FLEET_SIZE,
};
use futures::StreamExt;

fn record(id: u32, battery: f64) -> VehicleRecord {
    VehicleRecord::new(
        VehicleId(id),
        42.0,
        battery,
        Location::new(48.86 + id as f64 * 0.001, 2.35),
        OperatingStatus::Moving,
        Telemetry::default(),
    )
}

fn fleet() -> Vec<VehicleRecord> {
    (1..=FLEET_SIZE).map(|id| record(id, 100.0)).collect()
}

#[test]
fn test_initialize_then_snapshot_round_trip() {
    let store = FleetStore::new();
    let vehicles = fleet();
    store.initialize(vehicles.clone()).unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), FLEET_SIZE as usize);
    let ids: Vec<VehicleId> = snapshot.ids().collect();
    assert_eq!(ids, VehicleId::fleet().collect::<Vec<_>>());
    for vehicle in &vehicles {
        assert_eq!(snapshot.get(vehicle.id), Some(vehicle));
    }
}

#[test]
fn test_initialize_rejects_duplicate_ids() {
    let store = FleetStore::new();
    store.initialize(vec![record(1, 80.0), record(2, 70.0)]).unwrap();
    let before = store.snapshot();

    let result = store.initialize(vec![record(3, 50.0), record(4, 50.0), record(3, 40.0)]);
    assert_eq!(result, Err(StoreError::DuplicateIdentifier(VehicleId(3))));

    let after = store.snapshot();
    assert!(after.ptr_eq(&before), "Prior snapshot must stay authoritative");
    assert_eq!(after.len(), 2);
    assert!(!after.contains(VehicleId(3)));
}

#[test]
fn test_rejected_initialize_publishes_nothing() {
    let store = FleetStore::new();
    let mut updates = store.subscribe();

    assert!(store.initialize(vec![record(1, 50.0), record(1, 60.0)]).is_err());
    assert!(updates.try_recv().is_none());
}

#[test]
fn test_initialize_overwrites_previous_fleet() {
    let store = FleetStore::new();
    store.initialize(fleet()).unwrap();
    store.initialize(vec![record(7, 33.0)]).unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get(VehicleId(7)).map(|v| v.battery), Some(33.0));
}

#[test]
fn test_apply_update_inserts_unknown_id_verbatim() {
    let store = FleetStore::new();
    store.initialize(vec![record(1, 90.0)]).unwrap();

    let newcomer = record(42, 55.5);
    store.apply_update(newcomer.clone());

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get(VehicleId(42)), Some(&newcomer));
}

#[test]
fn test_apply_update_clamps_battery_of_known_vehicle() {
    let store = FleetStore::new();
    store.initialize(vec![record(1, 50.0), record(2, 50.0)]).unwrap();

    store.apply_update(record(1, 130.0));
    store.apply_update(record(2, -12.0));

    let snapshot = store.snapshot();
    assert_eq!(snapshot.get(VehicleId(1)).map(|v| v.battery), Some(100.0));
    assert_eq!(snapshot.get(VehicleId(2)).map(|v| v.battery), Some(0.0));
}

#[test]
fn test_apply_update_lets_battery_increase() {
    let store = FleetStore::new();
    store.initialize(vec![record(1, 20.0)]).unwrap();

    let mut charged = record(1, 60.0);
    charged.status = OperatingStatus::Charging;
    charged.speed = 0.0;
    store.apply_update(charged.clone());

    assert_eq!(store.snapshot().get(VehicleId(1)), Some(&charged));
}

#[test]
fn test_snapshots_are_copy_on_write() {
    let store = FleetStore::new();
    store.initialize(vec![record(1, 80.0)]).unwrap();
    let old = store.snapshot();

    store.apply_update(record(1, 10.0));

    assert_eq!(old.get(VehicleId(1)).map(|v| v.battery), Some(80.0));
    assert_eq!(store.snapshot().get(VehicleId(1)).map(|v| v.battery), Some(10.0));
    assert!(!old.ptr_eq(&store.snapshot()));
}

#[test]
fn test_readers_see_whole_commits_during_updates() {
    let store = FleetStore::new();
    store.initialize(fleet()).unwrap();
    // Queued notifications keep extra references to every committed map
    let _updates = store.subscribe();
    let held = store.snapshot();

    std::thread::scope(|scope| {
        let reader = scope.spawn(|| {
            let mut last = 100.0;
            for _ in 0..500 {
                let snapshot = store.snapshot();
                assert_eq!(snapshot.len(), FLEET_SIZE as usize);
                let battery = snapshot.get(VehicleId(1)).map(|v| v.battery).unwrap_or(-1.0);
                assert!(battery <= last, "Reader went back in time: {} after {}", battery, last);
                last = battery;
            }
        });
        for step in 1..=100 {
            store.apply_update(record(1, 100.0 - step as f64 * 0.5));
        }
        reader.join().unwrap();
    });

    assert_eq!(held.get(VehicleId(1)).map(|v| v.battery), Some(100.0));
    assert_eq!(store.snapshot().get(VehicleId(1)).map(|v| v.battery), Some(50.0));
}

#[tokio::test]
async fn test_subscriber_sees_every_commit_in_order() {
    let store = FleetStore::new();
    let mut updates = store.subscribe();

    store.initialize(vec![record(1, 90.0), record(2, 90.0)]).unwrap();
    store.apply_update(record(1, 80.0));
    store.apply_update(record(2, 70.0));
    store.apply_update(record(1, 60.0));

    let first = updates.recv().await.expect("initialize notification");
    assert_eq!(first.get(VehicleId(1)).map(|v| v.battery), Some(90.0));

    let second = updates.recv().await.expect("first update");
    assert_eq!(second.get(VehicleId(1)).map(|v| v.battery), Some(80.0));
    assert_eq!(second.get(VehicleId(2)).map(|v| v.battery), Some(90.0));

    let third = updates.recv().await.expect("second update");
    assert_eq!(third.get(VehicleId(2)).map(|v| v.battery), Some(70.0));

    let fourth = updates.recv().await.expect("third update");
    assert_eq!(fourth.get(VehicleId(1)).map(|v| v.battery), Some(60.0));
    assert!(fourth.ptr_eq(&store.snapshot()));

    assert!(updates.try_recv().is_none());
}

#[tokio::test]
async fn test_subscription_only_sees_later_commits() {
    let store = FleetStore::new();
    store.initialize(fleet()).unwrap();

    let mut updates = store.subscribe();
    store.apply_update(record(3, 12.0));

    let snapshot = updates.recv().await.expect("update notification");
    assert_eq!(snapshot.get(VehicleId(3)).map(|v| v.battery), Some(12.0));
    assert!(updates.try_recv().is_none());
}

#[tokio::test]
async fn test_closing_twice_leaves_other_subscribers_alone() {
    let store = FleetStore::new();
    let mut closed = store.subscribe();
    let mut open = store.subscribe();
    assert_eq!(store.subscriber_count(), 2);

    store.initialize(vec![record(1, 90.0)]).unwrap();
    closed.close();
    closed.close();
    assert!(closed.is_closed());

    store.apply_update(record(1, 85.0));

    assert!(closed.recv().await.is_none());
    assert!(closed.next().await.is_none());
    closed.close();
    assert!(closed.next().await.is_none());
    assert_eq!(open.recv().await.map(|s| s.len()), Some(1));
    let latest = open.recv().await.expect("update after close");
    assert_eq!(latest.get(VehicleId(1)).map(|v| v.battery), Some(85.0));
    assert_eq!(store.subscriber_count(), 1);
}

#[tokio::test]
async fn test_dropped_subscription_is_pruned() {
    let store = FleetStore::new();
    let dropped = store.subscribe();
    let _kept = store.subscribe();
    drop(dropped);

    store.apply_update(record(1, 50.0));
    assert_eq!(store.subscriber_count(), 1);
}

#[tokio::test]
async fn test_subscription_ends_when_store_is_dropped() {
    let store = FleetStore::new();
    let mut updates = store.subscribe();
    store.apply_update(record(5, 40.0));
    drop(store);

    let snapshot = updates.next().await.expect("queued notification");
    assert!(snapshot.contains(VehicleId(5)));
    assert!(updates.next().await.is_none());
}

#[test]
fn test_snapshot_serializes_records_in_id_order() {
    let store = FleetStore::new();
    store.initialize(vec![record(2, 20.0), record(1, 10.0)]).unwrap();

    let json = serde_json::to_string(&store.snapshot()).unwrap();
    let decoded: Vec<VehicleRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].id, VehicleId(1));
    assert_eq!(decoded[1].id, VehicleId(2));
}
