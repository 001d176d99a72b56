use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::{Instant, sleep, sleep_until};

use warden::{
    Config, Event, EventKind, HandlerError, HandlerFn, HandlerRef, RuntimeError, Subscription,
    Warden,
};

const TTL: Duration = Duration::from_secs(5);

/// (kind, host, sorted names of the other online hosts)
type Seen = (EventKind, String, Vec<String>);

fn recorder(tx: UnboundedSender<Seen>) -> HandlerRef {
    HandlerFn::arc("recorder", move |ev: Event| {
        let tx = tx.clone();
        async move {
            let mut online: Vec<String> = ev.online_names().map(str::to_owned).collect();
            online.sort();
            let _ = tx.send((ev.kind, ev.host.name.clone(), online));
            Ok::<_, HandlerError>(())
        }
    })
}

fn sub(kind: EventKind, hosts: &[&str], tx: &UnboundedSender<Seen>) -> Subscription {
    Subscription::new(kind, hosts.iter().copied(), recorder(tx.clone()))
}

fn warden_with(subs: Vec<Subscription>) -> Arc<Warden> {
    Warden::builder(Config::with_ttl(TTL))
        .with_subscriptions(subs)
        .build()
}

/// Lets spawned handler tasks and the sweeper run without moving the clock.
async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

async fn next(rx: &mut UnboundedReceiver<Seen>) -> Seen {
    rx.recv().await.expect("recorder channel closed")
}

fn seen(kind: EventKind, host: &str, online: &[&str]) -> Seen {
    (
        kind,
        host.to_owned(),
        online.iter().map(|s| (*s).to_owned()).collect(),
    )
}

fn names(hosts: Vec<warden::Host>) -> Vec<String> {
    let mut n: Vec<String> = hosts.into_iter().map(|h| h.name).collect();
    n.sort();
    n
}

#[tokio::test(start_paused = true)]
async fn silent_host_goes_offline_after_ttl() {
    let (tx, mut rx) = unbounded_channel();
    let warden = warden_with(vec![
        sub(EventKind::Online, &[], &tx),
        sub(EventKind::Offline, &[], &tx),
    ]);
    let t0 = Instant::now();

    warden.heartbeat("a", "10.0.0.1").await;
    assert_eq!(next(&mut rx).await, seen(EventKind::Online, "a", &[]));

    sleep_until(t0 + Duration::from_secs(3)).await;
    assert_eq!(names(warden.hosts().await), ["a"]);

    sleep_until(t0 + TTL + Duration::from_millis(10)).await;
    assert!(warden.hosts().await.is_empty());
    assert_eq!(next(&mut rx).await, seen(EventKind::Offline, "a", &[]));

    settle().await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn refresh_is_not_a_transition_and_extends_deadline() {
    let (tx, mut rx) = unbounded_channel();
    let warden = warden_with(vec![
        sub(EventKind::Online, &[], &tx),
        sub(EventKind::Offline, &[], &tx),
    ]);
    let t0 = Instant::now();

    warden.heartbeat("a", "10.0.0.1").await;
    assert_eq!(next(&mut rx).await.0, EventKind::Online);

    sleep_until(t0 + Duration::from_secs(2)).await;
    warden.heartbeat("a", "10.0.0.2").await;
    settle().await;
    assert!(rx.try_recv().is_err(), "refresh must not fire");

    let hosts = warden.hosts().await;
    assert_eq!(hosts[0].address, "10.0.0.2");

    // Original deadline (t0 + 5s) has passed; the refreshed one (t0 + 7s) has not.
    sleep_until(t0 + Duration::from_millis(6_900)).await;
    settle().await;
    assert_eq!(warden.len().await, 1);
    assert!(rx.try_recv().is_err());

    sleep_until(t0 + Duration::from_millis(7_010)).await;
    assert_eq!(next(&mut rx).await, seen(EventKind::Offline, "a", &[]));
    assert!(warden.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn offline_snapshot_holds_remaining_hosts() {
    let (tx, mut rx) = unbounded_channel();
    let warden = warden_with(vec![sub(EventKind::Offline, &[], &tx)]);
    let t0 = Instant::now();

    warden.heartbeat("a", "10.0.0.1").await;
    sleep_until(t0 + Duration::from_secs(1)).await;
    warden.heartbeat("b", "10.0.0.2").await;

    sleep_until(t0 + TTL + Duration::from_millis(10)).await;
    assert_eq!(next(&mut rx).await, seen(EventKind::Offline, "a", &["b"]));
    assert_eq!(names(warden.hosts().await), ["b"]);

    sleep_until(t0 + Duration::from_secs(1) + TTL + Duration::from_millis(10)).await;
    assert_eq!(next(&mut rx).await, seen(EventKind::Offline, "b", &[]));
}

#[tokio::test(start_paused = true)]
async fn online_all_fires_once_on_completion_in_either_order() {
    for order in [["a", "b"], ["b", "a"]] {
        let (tx, mut rx) = unbounded_channel();
        let warden = warden_with(vec![sub(EventKind::OnlineAll, &["a", "b"], &tx)]);

        warden.heartbeat(order[0], "10.0.0.1").await;
        settle().await;
        assert!(rx.try_recv().is_err());

        sleep(Duration::from_secs(1)).await;
        warden.heartbeat(order[1], "10.0.0.2").await;
        assert_eq!(
            next(&mut rx).await,
            seen(EventKind::OnlineAll, order[1], &[order[0]])
        );

        // Outsiders and refreshes never re-fire the group.
        warden.heartbeat("c", "10.0.0.3").await;
        warden.heartbeat(order[0], "10.0.0.1").await;
        settle().await;
        assert!(rx.try_recv().is_err());

        warden.shutdown().await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn online_all_refires_when_group_is_completed_again() {
    let (tx, mut rx) = unbounded_channel();
    let warden = warden_with(vec![sub(EventKind::OnlineAll, &["a", "b"], &tx)]);
    let t0 = Instant::now();

    warden.heartbeat("a", "10.0.0.1").await;
    warden.heartbeat("b", "10.0.0.2").await;
    assert_eq!(next(&mut rx).await, seen(EventKind::OnlineAll, "b", &["a"]));

    // Keep b alive while a expires.
    sleep_until(t0 + Duration::from_secs(3)).await;
    warden.heartbeat("b", "10.0.0.2").await;
    sleep_until(t0 + TTL + Duration::from_millis(10)).await;
    settle().await;
    assert_eq!(names(warden.hosts().await), ["b"]);

    warden.heartbeat("a", "10.0.0.1").await;
    assert_eq!(next(&mut rx).await, seen(EventKind::OnlineAll, "a", &["b"]));
}

#[tokio::test(start_paused = true)]
async fn offline_all_fires_when_last_watched_host_leaves() {
    let (tx, mut rx) = unbounded_channel();
    let warden = warden_with(vec![sub(EventKind::OfflineAll, &["a", "b"], &tx)]);
    let t0 = Instant::now();

    warden.heartbeat("a", "10.0.0.1").await;
    warden.heartbeat("b", "10.0.0.2").await;
    warden.heartbeat("c", "10.0.0.3").await;

    sleep_until(t0 + Duration::from_secs(3)).await;
    warden.heartbeat("b", "10.0.0.2").await;
    warden.heartbeat("c", "10.0.0.3").await;

    // a leaves at t0+5s: b is still up.
    sleep_until(t0 + TTL + Duration::from_millis(10)).await;
    settle().await;
    assert!(rx.try_recv().is_err());

    sleep_until(t0 + Duration::from_secs(6)).await;
    warden.heartbeat("c", "10.0.0.3").await;

    // b leaves at t0+8s: the group is gone, c remains.
    sleep_until(t0 + Duration::from_millis(8_010)).await;
    assert_eq!(next(&mut rx).await, seen(EventKind::OfflineAll, "b", &["c"]));

    settle().await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn simultaneous_expiry_fires_group_once() {
    let (tx, mut rx) = unbounded_channel();
    let (off_tx, mut off_rx) = unbounded_channel();
    let warden = warden_with(vec![
        sub(EventKind::OfflineAll, &["a", "b"], &tx),
        sub(EventKind::Offline, &[], &off_tx),
    ]);

    warden.heartbeat("a", "10.0.0.1").await;
    warden.heartbeat("b", "10.0.0.2").await;

    sleep(TTL + Duration::from_millis(10)).await;

    let (kind, host, online) = next(&mut rx).await;
    assert_eq!(kind, EventKind::OfflineAll);
    assert!(online.is_empty());
    assert!(host == "a" || host == "b");

    let first = next(&mut off_rx).await;
    let second = next(&mut off_rx).await;
    let mut departed = vec![first.1.clone(), second.1.clone()];
    departed.sort();
    assert_eq!(departed, ["a", "b"]);
    // One departure saw the other still online, the second saw nobody.
    let mut sizes = vec![first.2.len(), second.2.len()];
    sizes.sort();
    assert_eq!(sizes, [0, 1]);

    settle().await;
    assert!(rx.try_recv().is_err());
    assert!(off_rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn fleet_wide_offline_all_fires_on_empty_table_with_offline_tag() {
    let (tx, mut rx) = unbounded_channel();
    let warden = warden_with(vec![sub(EventKind::OfflineAll, &[], &tx)]);
    let t0 = Instant::now();

    warden.heartbeat("a", "10.0.0.1").await;
    sleep_until(t0 + Duration::from_secs(1)).await;
    warden.heartbeat("b", "10.0.0.2").await;

    sleep_until(t0 + TTL + Duration::from_millis(10)).await;
    settle().await;
    assert!(rx.try_recv().is_err(), "b is still online");

    sleep_until(t0 + Duration::from_secs(1) + TTL + Duration::from_millis(10)).await;
    assert_eq!(next(&mut rx).await, seen(EventKind::Offline, "b", &[]));
}

#[tokio::test(start_paused = true)]
async fn listings_are_independent_snapshots() {
    let warden = warden_with(Vec::new());
    warden.heartbeat("a", "10.0.0.1").await;

    let mut first = warden.hosts().await;
    first[0].name = "mutated".into();
    first[0].address = "0.0.0.0".into();
    first.clear();
    assert_eq!(names(warden.hosts().await), ["a"]);

    let before = warden.hosts().await;
    warden.heartbeat("b", "10.0.0.2").await;
    assert_eq!(names(before), ["a"]);
    assert_eq!(names(warden.hosts().await), ["a", "b"]);
}

#[tokio::test(start_paused = true)]
async fn handler_snapshot_is_frozen_at_dispatch() {
    let (tx, mut rx) = unbounded_channel();
    let warden = warden_with(vec![sub(EventKind::Online, &[], &tx)]);

    warden.heartbeat("a", "10.0.0.1").await;
    warden.heartbeat("b", "10.0.0.2").await;
    warden.heartbeat("c", "10.0.0.3").await;

    assert_eq!(next(&mut rx).await, seen(EventKind::Online, "a", &[]));
    assert_eq!(next(&mut rx).await, seen(EventKind::Online, "b", &["a"]));
    assert_eq!(next(&mut rx).await, seen(EventKind::Online, "c", &["a", "b"]));
}

#[tokio::test(start_paused = true)]
async fn late_registration_applies_to_later_transitions() {
    let (tx, mut rx) = unbounded_channel();
    let warden = warden_with(Vec::new());

    warden.heartbeat("a", "10.0.0.1").await;
    warden
        .register(EventKind::Online, ["b"], recorder(tx.clone()))
        .await;
    settle().await;
    assert!(rx.try_recv().is_err());

    warden.heartbeat("c", "10.0.0.3").await;
    warden.heartbeat("b", "10.0.0.2").await;
    assert_eq!(next(&mut rx).await, seen(EventKind::Online, "b", &["a", "c"]));

    settle().await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn failing_and_panicking_handlers_are_isolated() {
    let (tx, mut rx) = unbounded_channel();
    let failing: HandlerRef = HandlerFn::arc("failing", |_ev: Event| async {
        Err::<(), _>(HandlerError::Fail {
            error: "boom".into(),
        })
    });
    let panicking: HandlerRef = HandlerFn::arc("panicking", |ev: Event| async move {
        if !ev.host.name.is_empty() {
            panic!("handler bug");
        }
        Ok::<_, HandlerError>(())
    });
    let warden = warden_with(vec![
        Subscription::new(EventKind::Online, Vec::<String>::new(), failing),
        Subscription::new(EventKind::Online, Vec::<String>::new(), panicking),
        sub(EventKind::Online, &[], &tx),
    ]);

    warden.heartbeat("a", "10.0.0.1").await;
    warden.heartbeat("b", "10.0.0.2").await;

    assert_eq!(next(&mut rx).await.1, "a");
    assert_eq!(next(&mut rx).await.1, "b");
    assert_eq!(warden.len().await, 2);
    warden.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn heartbeat_does_not_wait_for_handlers() {
    let started = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&started);
    let slow: HandlerRef = HandlerFn::arc("slow", move |_ev: Event| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            sleep(Duration::from_secs(3600)).await;
            Ok::<_, HandlerError>(())
        }
    });
    let warden = warden_with(vec![Subscription::new(
        EventKind::Online,
        Vec::<String>::new(),
        slow,
    )]);

    let t0 = Instant::now();
    warden.heartbeat("a", "10.0.0.1").await;
    warden.heartbeat("b", "10.0.0.2").await;
    assert_eq!(Instant::now(), t0);

    settle().await;
    assert_eq!(started.load(Ordering::SeqCst), 2);
    assert_eq!(warden.in_flight(), 2);
    assert_eq!(names(warden.hosts().await), ["a", "b"]);
}

#[tokio::test(start_paused = true)]
async fn shutdown_abandons_handlers_after_grace() {
    let slow: HandlerRef = HandlerFn::arc("slow", |_ev: Event| async {
        sleep(Duration::from_secs(3600)).await;
        Ok::<_, HandlerError>(())
    });
    let cfg = Config {
        ttl: TTL,
        grace: Duration::from_secs(1),
    };
    let warden = Warden::builder(cfg)
        .with_subscription(Subscription::new(
            EventKind::Online,
            Vec::<String>::new(),
            slow,
        ))
        .build();

    warden.heartbeat("a", "10.0.0.1").await;
    settle().await;

    let t0 = Instant::now();
    let err = warden.shutdown().await.unwrap_err();
    assert!(Instant::now() - t0 >= Duration::from_secs(1));
    match err {
        RuntimeError::GraceExceeded { grace, pending } => {
            assert_eq!(grace, Duration::from_secs(1));
            assert_eq!(pending, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn shutdown_waits_for_short_handlers_and_stops_expiry() {
    let (tx, mut rx) = unbounded_channel();
    let done = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&done);
    let short: HandlerRef = HandlerFn::arc("short", move |_ev: Event| {
        let counter = Arc::clone(&counter);
        async move {
            sleep(Duration::from_millis(200)).await;
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, HandlerError>(())
        }
    });
    let warden = warden_with(vec![
        Subscription::new(EventKind::Online, Vec::<String>::new(), short),
        sub(EventKind::Offline, &[], &tx),
    ]);

    warden.heartbeat("a", "10.0.0.1").await;
    warden.shutdown().await.unwrap();
    assert_eq!(done.load(Ordering::SeqCst), 1);
    assert_eq!(warden.in_flight(), 0);

    // Second call is harmless.
    warden.shutdown().await.unwrap();

    // The sweeper is gone: nothing expires any more.
    sleep(TTL * 3).await;
    settle().await;
    assert_eq!(names(warden.hosts().await), ["a"]);
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn parked_sweeper_wakes_on_each_arrival_into_empty_table() {
    let (tx, mut rx) = unbounded_channel();
    let warden = warden_with(vec![
        sub(EventKind::Online, &[], &tx),
        sub(EventKind::Offline, &[], &tx),
    ]);

    for _ in 0..3 {
        // Long idle period: the sweeper has found the table empty and parked.
        sleep(TTL * 12).await;
        settle().await;
        assert!(warden.is_empty().await);
        assert!(rx.try_recv().is_err());

        let arrived = Instant::now();
        warden.heartbeat("a", "10.0.0.1").await;
        assert_eq!(next(&mut rx).await, seen(EventKind::Online, "a", &[]));

        sleep_until(arrived + TTL - Duration::from_millis(10)).await;
        settle().await;
        assert_eq!(names(warden.hosts().await), ["a"]);

        sleep_until(arrived + TTL + Duration::from_millis(10)).await;
        assert!(warden.is_empty().await);
        assert_eq!(next(&mut rx).await, seen(EventKind::Offline, "a", &[]));
    }

    settle().await;
    assert!(rx.try_recv().is_err());
}
