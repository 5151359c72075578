//! Minimal host: assemble a module set, boot it, print the entry point.
//!
//! Run with:
//! `BOOTSEQ_ENTRY_MODULE=devhub.App BOOTSEQ_FEATURES=push cargo run --example host_startup`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use bootseq::prelude::*;
use bootseq::EmptyLoader;

struct CrashReporting;

#[async_trait]
impl Module for CrashReporting {
    fn id(&self) -> &str {
        "crash-reporting"
    }

    fn priority(&self) -> i32 {
        10
    }

    async fn init(&self, ctx: InitContext<'_>) -> std::result::Result<(), InitError> {
        println!("crash reporting up (debug build: {})", ctx.config.debug);
        Ok(())
    }
}

struct OtaUpdate;

#[async_trait]
impl Module for OtaUpdate {
    fn id(&self) -> &str {
        "ota-update"
    }

    fn priority(&self) -> i32 {
        20
    }

    async fn init(&self, ctx: InitContext<'_>) -> std::result::Result<(), InitError> {
        match &ctx.config.deployment_key {
            Some(key) => println!("ota update syncing against {key}"),
            None => println!("ota update idle: no deployment key in this build"),
        }
        println!("ota args: {}", ctx.args);
        Ok(())
    }
}

struct PushNotifications;

#[async_trait]
impl Module for PushNotifications {
    fn id(&self) -> &str {
        "push"
    }

    fn priority(&self) -> i32 {
        30
    }

    fn required_feature_flags(&self) -> Vec<String> {
        vec!["push".to_string()]
    }

    async fn init(&self, _ctx: InitContext<'_>) -> std::result::Result<(), InitError> {
        println!("push notifications registered");
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let mut boot = Bootstrapper::new(Arc::new(EmptyLoader));
    boot.register(
        ModuleDescriptor::new("crash-reporting", 10).required(true),
        Arc::new(CrashReporting),
    )?;
    boot.register(
        ModuleDescriptor::new("ota-update", 20).with_args(json!({"channel": "production"})),
        Arc::new(OtaUpdate),
    )?;
    boot.register(ModuleDescriptor::new("push", 30), Arc::new(PushNotifications))?;
    boot.declare_optional("dev-tools");

    let ready = boot.start(BootEnv::from_process_env()).await?;
    println!(
        "bootstrap complete: entry module {:?}, debug {}",
        ready.entry_module, ready.debug
    );
    Ok(())
}
