//! End-to-end bootstrap sequencer scenarios.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use bootseq::{
    BootEnv, BootstrapError, BootstrapState, Bootstrapper, EmptyLoader, InitContext, InitError,
    LoadError, MemorySink, Module, ModuleDescriptor, RegistryError, Severity, StaticLoader,
};

/// What a stub module should do when its `init` runs.
#[derive(Clone)]
enum Behavior {
    Succeed,
    Fail,
    Hang(Duration),
}

/// Stub module that appends its id to a shared log when initialized.
struct StubModule {
    id: String,
    priority: i32,
    behavior: Behavior,
    init_log: Arc<Mutex<Vec<String>>>,
    seen_args: Arc<Mutex<Option<serde_json::Value>>>,
}

impl StubModule {
    fn new(
        id: &str,
        priority: i32,
        behavior: Behavior,
        init_log: &Arc<Mutex<Vec<String>>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            priority,
            behavior,
            init_log: init_log.clone(),
            seen_args: Arc::new(Mutex::new(None)),
        })
    }
}

#[async_trait]
impl Module for StubModule {
    fn id(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn init(&self, ctx: InitContext<'_>) -> Result<(), InitError> {
        self.init_log.lock().unwrap().push(self.id.clone());
        *self.seen_args.lock().unwrap() = Some(ctx.args.clone());
        match &self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => Err(InitError::Failed("deliberate test failure".into())),
            Behavior::Hang(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(())
            }
        }
    }
}

fn env() -> BootEnv {
    BootEnv::new().with_entry_module("devhub.App")
}

/// Scenario 1: registration order never influences initialization order.
#[tokio::test]
async fn initializes_in_priority_order_regardless_of_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut boot = Bootstrapper::new(Arc::new(EmptyLoader));

    // Registered in reverse priority order on purpose.
    boot.register(
        ModuleDescriptor::new("analytics", 20),
        StubModule::new("analytics", 20, Behavior::Succeed, &log),
    )
    .unwrap();
    boot.register(
        ModuleDescriptor::new("crash", 10).required(true),
        StubModule::new("crash", 10, Behavior::Succeed, &log),
    )
    .unwrap();

    let ready = boot.start(env()).await.unwrap();
    assert_eq!(ready.entry_module, "devhub.App");
    assert!(!ready.debug);
    assert_eq!(boot.current_state(), BootstrapState::Running);
    assert_eq!(*log.lock().unwrap(), vec!["crash", "analytics"]);
}

/// Scenario 2: an optional module's init failure is invisible to control
/// flow; later modules still run and Running is reached.
#[tokio::test]
async fn optional_failure_is_fail_soft() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::new(MemorySink::new());
    let mut boot = Bootstrapper::new(Arc::new(EmptyLoader)).with_sink(sink.clone());

    boot.register(
        ModuleDescriptor::new("crash", 10).required(true),
        StubModule::new("crash", 10, Behavior::Succeed, &log),
    )
    .unwrap();
    boot.register(
        ModuleDescriptor::new("analytics", 20),
        StubModule::new("analytics", 20, Behavior::Fail, &log),
    )
    .unwrap();
    boot.register(
        ModuleDescriptor::new("splash", 30),
        StubModule::new("splash", 30, Behavior::Succeed, &log),
    )
    .unwrap();

    boot.start(env()).await.unwrap();
    assert_eq!(boot.current_state(), BootstrapState::Running);
    // The failing optional did not stop the module after it.
    assert_eq!(*log.lock().unwrap(), vec!["crash", "analytics", "splash"]);

    let recorded = sink.events_for("analytics");
    assert!(recorded.iter().any(|e| e.severity == Severity::Warning));
}

/// Scenario 3: a failing required module aborts the boot; nothing after it
/// in priority order is initialized.
#[tokio::test]
async fn required_failure_is_fatal_and_aborts_remaining_inits() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut boot = Bootstrapper::new(Arc::new(EmptyLoader));

    boot.register(
        ModuleDescriptor::new("crash", 10).required(true),
        StubModule::new("crash", 10, Behavior::Fail, &log),
    )
    .unwrap();
    boot.register(
        ModuleDescriptor::new("analytics", 20),
        StubModule::new("analytics", 20, Behavior::Succeed, &log),
    )
    .unwrap();

    let err = boot.start(env()).await.unwrap_err();
    match err {
        BootstrapError::RequiredModuleFailed { module_id, .. } => {
            assert_eq!(module_id, "crash");
        }
        other => panic!("expected RequiredModuleFailed, got {other}"),
    }
    assert_eq!(boot.current_state(), BootstrapState::Failed);
    assert_eq!(*log.lock().unwrap(), vec!["crash"]);
}

/// Scenario 4: duplicate ids are rejected at the registration call site,
/// before `start` is ever invoked.
#[tokio::test]
async fn duplicate_registration_fails_immediately() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut boot = Bootstrapper::new(Arc::new(EmptyLoader));

    boot.register(
        ModuleDescriptor::new("crash", 10),
        StubModule::new("crash", 10, Behavior::Succeed, &log),
    )
    .unwrap();

    let err = boot
        .register(
            ModuleDescriptor::new("crash", 99),
            StubModule::new("crash", 99, Behavior::Succeed, &log),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        BootstrapError::Registry(RegistryError::DuplicateModule { .. })
    ));
    assert_eq!(boot.current_state(), BootstrapState::Uninitialized);
}

/// A duplicate id surfaced by conditional loading is a declaration conflict,
/// not an absent optional: `start` fails with the registry error instead of
/// falling back to fail-soft handling, and the machine stays in Registering.
#[tokio::test]
async fn duplicate_id_from_conditional_load_is_fatal() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let dev_tools = StubModule::new("dev-tools", 5, Behavior::Succeed, &log);
    let loader = StaticLoader::new().provide_instance("dev-tools", dev_tools);

    let mut boot = Bootstrapper::new(Arc::new(loader));
    boot.register(
        ModuleDescriptor::new("dev-tools", 5),
        StubModule::new("dev-tools", 5, Behavior::Succeed, &log),
    )
    .unwrap();
    boot.declare_optional("dev-tools");

    let err = boot.start(env()).await.unwrap_err();
    match err {
        BootstrapError::Registry(RegistryError::DuplicateModule { id }) => {
            assert_eq!(id, "dev-tools");
        }
        other => panic!("expected DuplicateModule, got {other}"),
    }
    // Failed is reserved for init failures; a declaration conflict never
    // reaches Initializing.
    assert_eq!(boot.current_state(), BootstrapState::Registering);
    assert!(log.lock().unwrap().is_empty());
}

/// Scenario 5: a missing entry-module name is a fatal configuration error
/// and the machine never leaves Configuring.
#[tokio::test]
async fn missing_entry_module_is_configuration_error() {
    let mut boot = Bootstrapper::new(Arc::new(EmptyLoader));

    let err = boot.start(BootEnv::new()).await.unwrap_err();
    assert!(matches!(err, BootstrapError::Config(_)));
    assert_eq!(boot.current_state(), BootstrapState::Configuring);
}

/// An absent optional module never fails the boot; its absence is recorded
/// through the sink only.
#[tokio::test]
async fn absent_optional_module_is_silent() {
    let sink = Arc::new(MemorySink::new());
    let mut boot =
        Bootstrapper::new(Arc::new(StaticLoader::new())).with_sink(sink.clone());
    boot.declare_optional("dev-tools");

    let ready = boot.start(env()).await.unwrap();
    assert_eq!(ready.entry_module, "devhub.App");
    assert_eq!(boot.current_state(), BootstrapState::Running);

    let recorded = sink.events_for("dev-tools");
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].severity, Severity::Debug);
}

/// A resolved optional module takes part in ordered initialization with
/// `required = false`.
#[tokio::test]
async fn resolved_optional_module_participates_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let dev_tools = StubModule::new("dev-tools", 5, Behavior::Succeed, &log);
    let loader = StaticLoader::new().provide_instance("dev-tools", dev_tools);

    let mut boot = Bootstrapper::new(Arc::new(loader));
    boot.declare_optional("dev-tools");
    boot.register(
        ModuleDescriptor::new("crash", 10).required(true),
        StubModule::new("crash", 10, Behavior::Succeed, &log),
    )
    .unwrap();

    boot.start(env()).await.unwrap();
    // Priority 5 beats priority 10 even though it was discovered, not
    // statically registered.
    assert_eq!(*log.lock().unwrap(), vec!["dev-tools", "crash"]);
}

/// A lookup that errors internally is converted to "not found": the cause is
/// recorded at Warning severity and never reaches control flow.
#[tokio::test]
async fn failed_lookup_is_recorded_not_raised() {
    let sink = Arc::new(MemorySink::new());
    let loader = StaticLoader::new().provide("dev-tools", || {
        Err(LoadError::MalformedMetadata {
            name: "dev-tools".into(),
            reason: "bad manifest".into(),
        })
    });

    let mut boot = Bootstrapper::new(Arc::new(loader)).with_sink(sink.clone());
    boot.declare_optional("dev-tools");

    boot.start(env()).await.unwrap();
    assert_eq!(boot.current_state(), BootstrapState::Running);

    let recorded = sink.events_for("dev-tools");
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].severity, Severity::Warning);
}

/// A hung optional module is skipped once its budget elapses; boot completes.
#[tokio::test]
async fn hung_optional_module_is_skipped_after_budget() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::new(MemorySink::new());
    let mut boot = Bootstrapper::new(Arc::new(EmptyLoader))
        .with_sink(sink.clone())
        .with_init_budget(Duration::from_millis(50));

    boot.register(
        ModuleDescriptor::new("slow", 10),
        StubModule::new("slow", 10, Behavior::Hang(Duration::from_secs(30)), &log),
    )
    .unwrap();
    boot.register(
        ModuleDescriptor::new("splash", 20),
        StubModule::new("splash", 20, Behavior::Succeed, &log),
    )
    .unwrap();

    boot.start(env()).await.unwrap();
    assert_eq!(boot.current_state(), BootstrapState::Running);
    assert!(sink
        .events_for("slow")
        .iter()
        .any(|e| e.severity == Severity::Warning && e.message.contains("timed out")));
}

/// A hung required module fails the boot with a timeout as the cause.
#[tokio::test]
async fn hung_required_module_is_fatal() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut boot =
        Bootstrapper::new(Arc::new(EmptyLoader)).with_init_budget(Duration::from_millis(50));

    boot.register(
        ModuleDescriptor::new("ota", 10).required(true),
        StubModule::new("ota", 10, Behavior::Hang(Duration::from_secs(30)), &log),
    )
    .unwrap();

    let err = boot.start(env()).await.unwrap_err();
    match err {
        BootstrapError::RequiredModuleFailed { module_id, source } => {
            assert_eq!(module_id, "ota");
            assert!(matches!(source, InitError::TimedOut(_)));
        }
        other => panic!("expected RequiredModuleFailed, got {other}"),
    }
    assert_eq!(boot.current_state(), BootstrapState::Failed);
}

/// The descriptor's init budget override beats the sequencer default.
#[tokio::test]
async fn descriptor_budget_overrides_default() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut boot =
        Bootstrapper::new(Arc::new(EmptyLoader)).with_init_budget(Duration::from_millis(10));

    // Default budget (10ms) would kill this module; its own budget lets the
    // 50ms init finish.
    boot.register(
        ModuleDescriptor::new("crash", 10)
            .required(true)
            .with_init_budget(Duration::from_secs(5)),
        StubModule::new("crash", 10, Behavior::Hang(Duration::from_millis(50)), &log),
    )
    .unwrap();

    boot.start(env()).await.unwrap();
    assert_eq!(boot.current_state(), BootstrapState::Running);
}

/// Each module sees its own descriptor's init args and the shared config.
#[tokio::test]
async fn init_context_carries_descriptor_args() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let ota = StubModule::new("ota", 10, Behavior::Succeed, &log);
    let mut boot = Bootstrapper::new(Arc::new(EmptyLoader));

    boot.register(
        ModuleDescriptor::new("ota", 10).with_args(json!({"channel": "staging"})),
        ota.clone(),
    )
    .unwrap();

    let boot_env = env().with_deployment_key("dk-12345").with_debug(true);
    let ready = boot.start(boot_env).await.unwrap();
    assert!(ready.debug);

    let seen = ota.seen_args.lock().unwrap().clone().unwrap();
    assert_eq!(seen["channel"], "staging");
    let config = boot.configuration().unwrap();
    assert_eq!(config.deployment_key.as_deref(), Some("dk-12345"));
}

/// `start` is one-shot: a second call is an InvalidState error and does not
/// disturb the running process.
#[tokio::test]
async fn start_is_one_shot() {
    let mut boot = Bootstrapper::new(Arc::new(EmptyLoader));
    boot.start(env()).await.unwrap();
    assert_eq!(boot.current_state(), BootstrapState::Running);

    let err = boot.start(env()).await.unwrap_err();
    assert!(matches!(err, BootstrapError::InvalidState { .. }));
    assert_eq!(boot.current_state(), BootstrapState::Running);
}

/// Registration after `start` is refused.
#[tokio::test]
async fn registration_after_start_is_refused() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut boot = Bootstrapper::new(Arc::new(EmptyLoader));
    boot.start(env()).await.unwrap();

    let err = boot
        .register(
            ModuleDescriptor::new("late", 10),
            StubModule::new("late", 10, Behavior::Succeed, &log),
        )
        .unwrap_err();
    assert!(matches!(err, BootstrapError::InvalidState { .. }));
}

/// A module gated on a feature flag the build lacks never initializes.
#[tokio::test]
async fn feature_gated_module_excluded_without_flag() {
    struct PushModule {
        init_log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Module for PushModule {
        fn id(&self) -> &str {
            "push"
        }

        fn priority(&self) -> i32 {
            10
        }

        fn required_feature_flags(&self) -> Vec<String> {
            vec!["push".to_string()]
        }

        async fn init(&self, _ctx: InitContext<'_>) -> Result<(), InitError> {
            self.init_log.lock().unwrap().push("push".to_string());
            Ok(())
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));

    // Without the flag: excluded, even though it is marked required.
    let mut boot = Bootstrapper::new(Arc::new(EmptyLoader));
    boot.register(
        ModuleDescriptor::new("push", 10).required(true),
        Arc::new(PushModule { init_log: log.clone() }),
    )
    .unwrap();
    boot.start(env()).await.unwrap();
    assert!(log.lock().unwrap().is_empty());
    assert!(boot.modules().unwrap().get("push").is_none());

    // With the flag: retained and initialized.
    let mut boot = Bootstrapper::new(Arc::new(EmptyLoader));
    boot.register(
        ModuleDescriptor::new("push", 10).required(true),
        Arc::new(PushModule { init_log: log.clone() }),
    )
    .unwrap();
    boot.start(env().with_features("push")).await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["push"]);
}
