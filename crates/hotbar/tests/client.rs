use hotbar::domain::bind::KeyBind;
use hotbar::domain::category::Category;
use hotbar::domain::config::HostConfig;
use hotbar::domain::events::{
    EventKind, Notification, PlayerInfo, RefreshArrayListEvent, Severity, ToggleModuleEvent, WorldInfo,
};
use hotbar::domain::input::{ClickRequest, CrosshairTarget, InputState, MouseButton, Rotation};
use hotbar::events::EventReceiverExt;
use hotbar::features::autoclicker::{CLICK_PRIORITY, NAME};
use hotbar::kernel::module::listener::Listener;
use hotbar::kernel::module::{Module, ModuleBehavior, ModuleInfo, Transition};
use hotbar::{Client, ClientError};

const BURST: ClickRequest = ClickRequest { button: MouseButton::Left, count: 3 };

/// Aims once when it first ticks and, optionally, attacks every tick.
#[derive(Debug)]
struct Aim {
    burst: bool,
    rotation: Rotation,
    priority: u32,
    ttl: u32,
    aimed: bool,
}

impl Aim {
    const fn new(burst: bool, rotation: Rotation, priority: u32, ttl: u32) -> Self {
        Self { burst, rotation, priority, ttl, aimed: false }
    }
}

impl ModuleBehavior for Aim {
    fn listeners() -> Vec<Listener<Self>> {
        vec![Listener::on(EventKind::Tick, |aim, _, ctx| {
            let id = ctx.id();
            if aim.burst {
                ctx.arbiters.attack.submit(id, CLICK_PRIORITY + 40, 1, BURST);
            }
            if !aim.aimed {
                ctx.arbiters.rotation.submit(id, aim.priority, aim.ttl, aim.rotation);
                aim.aimed = true;
            }
            Ok(())
        })]
    }
}

fn client() -> Client {
    Client::init(&HostConfig::default(), 42).expect("client initializes")
}

fn join(client: &mut Client) {
    client.join_world(WorldInfo::new("overworld"), PlayerInfo::new("steve")).expect("join");
}

fn hold_attack(client: &mut Client) {
    client
        .set_input(InputState { attack_pressed: true, use_pressed: false, crosshair: CrosshairTarget::Entity })
        .expect("input");
}

#[test]
fn builtin_modules_are_registered() {
    let client = client();
    assert!(hotbar::features::is_enabled("AutoClicker"));
    assert!(client.modules().get(NAME).is_some());
}

#[test]
fn zero_tick_rate_is_rejected() {
    let mut config = HostConfig::default();
    config.tick.rate_hz = 0;
    assert!(matches!(Client::init(&config, 1), Err(ClientError::Kernel { .. })));
}

#[test]
fn ticks_report_granted_clicks() {
    let mut client = client();
    join(&mut client);
    client.set_enabled(NAME, true).expect("enable");
    hold_attack(&mut client);

    let reports: Vec<_> = (0..20).map(|_| client.tick().expect("tick")).collect();
    assert_eq!(reports.last().map(|r| r.tick), Some(20));
    let clicks: u32 = reports.iter().map(hotbar::TickReport::clicks).sum();
    assert!((5..=8).contains(&clicks), "got {clicks}");
    assert!(reports.iter().all(|r| r.interact.is_none() && r.rotation.is_none()));
}

#[test]
fn enabling_before_joining_defers_until_the_world_loads() {
    let mut client = client();
    let mut toggles = client.subscribe::<ToggleModuleEvent>().expect("subscribe");

    assert_eq!(client.set_enabled(NAME, true).expect("enable"), Transition::Deferred);
    assert!(toggles.drain().is_empty());

    hold_attack(&mut client);
    assert!((0..20).all(|_| client.tick().expect("tick").attack.is_none()));

    join(&mut client);
    assert!((0..20).any(|_| client.tick().expect("tick").attack.is_some()));
}

#[test]
fn disconnect_drops_pending_requests() {
    let mut client = client();
    join(&mut client);
    client.set_enabled(NAME, true).expect("enable");
    hold_attack(&mut client);
    for _ in 0..5 {
        client.tick().expect("tick");
    }

    client.disconnect().expect("disconnect");
    assert!(!client.modules().session().is_active());
    assert!(client.modules().arbiters().attack.is_empty());
    assert!((0..20).all(|_| client.tick().expect("tick").clicks() == 0));

    client.disconnect().expect("disconnecting twice is a no-op");
}

#[test]
fn key_binds_toggle_modules() {
    let mut client = client();
    let mut notifications = client.subscribe::<Notification>().expect("subscribe");
    join(&mut client);
    client.set_bind(NAME, KeyBind::new(82)).expect("bind");

    client.press_key(81).expect("press");
    assert!(notifications.drain().is_empty());

    client.press_key(82).expect("press");
    client.press_key(82).expect("press");
    let severities: Vec<Severity> = notifications.drain().iter().map(|n| n.severity).collect();
    assert_eq!(severities, vec![Severity::Enabled, Severity::Disabled]);
}

#[test]
fn hiding_refreshes_the_array_list() {
    let mut client = client();
    let mut refresh = client.subscribe::<RefreshArrayListEvent>().expect("subscribe");

    assert!(client.set_hidden(NAME, true).expect("hide"));
    assert!(!client.set_hidden(NAME, true).expect("already hidden"));
    assert_eq!(refresh.drain().len(), 1);
}

#[test]
fn state_survives_a_restart() {
    let mut first = client();
    join(&mut first);
    first.set_enabled(NAME, true).expect("enable");
    first.set_range(NAME, "Left/CPS", 10, 12).expect("in bounds");
    first.select_choice(NAME, "Left/Technique", "Stabilized").expect("known choice");
    first.set_bind(NAME, KeyBind::new(82)).expect("bind");
    let snapshots = first.shutdown().expect("shutdown");

    let json = serde_json::to_string(&snapshots).expect("serialize");
    let snapshots = serde_json::from_str::<Vec<_>>(&json).expect("deserialize");

    let mut second = client();
    assert_eq!(second.load(&snapshots).expect("load"), 1);
    let module = second.modules().get(NAME).expect("registered");
    assert_eq!(module.state().bind, KeyBind::new(82));
    assert!(module.state().enabled, "combat modules persist their enabled flag");
    assert_eq!(module.tag().as_deref(), Some("10-12"));

    join(&mut second);
    hold_attack(&mut second);
    let clicks: u32 = (0..20).map(|_| second.tick().expect("tick").clicks()).sum();
    assert_eq!(clicks, 11);
}

#[test]
fn shutdown_closes_the_client() {
    let mut client = client();
    let mut toggles = client.subscribe::<ToggleModuleEvent>().expect("subscribe");
    join(&mut client);

    let snapshots = client.shutdown().expect("shutdown");
    assert_eq!(snapshots.len(), 1);
    assert!(!client.is_running());
    assert!(toggles.drain().is_empty());
    assert!(toggles.try_recv().is_err(), "channels are closed");

    assert!(matches!(client.tick(), Err(ClientError::ShutDown { .. })));
    assert!(matches!(client.set_enabled(NAME, true), Err(ClientError::ShutDown { .. })));
    assert!(matches!(client.shutdown(), Err(ClientError::ShutDown { .. })));
}

#[test]
fn competing_modules_share_the_arbiters() {
    let aura = Rotation::new(90.0, 10.0);
    let tower = Rotation::new(0.0, 90.0);
    let mut client = client();
    client
        .register(Module::new(ModuleInfo::new("Aura", Category::Combat), Aim::new(true, aura, 5, 3)))
        .expect("register");
    client
        .register(Module::new(ModuleInfo::new("Tower", Category::World), Aim::new(false, tower, 1, 6)))
        .expect("register");
    join(&mut client);
    for name in [NAME, "Aura", "Tower"] {
        client.set_enabled(name, true).expect("enable");
    }
    hold_attack(&mut client);

    let reports: Vec<_> = (0..8).map(|_| client.tick().expect("tick")).collect();
    assert!(reports.iter().all(|r| r.attack == Some(BURST)), "the higher priority wins every tick");

    let rotations: Vec<_> = reports.iter().map(|r| r.rotation).collect();
    let held = |rotation, ticks| std::iter::repeat_n(rotation, ticks);
    let expected: Vec<_> =
        held(Some(aura), 3).chain(held(Some(tower), 3)).chain(held(None, 2)).collect();
    assert_eq!(rotations, expected, "rotation is held until it expires, then handed over");

    client.set_enabled("Aura", false).expect("disable");
    assert!((0..20).any(|_| client.tick().expect("tick").attack.is_some_and(|c| c != BURST)));
}
