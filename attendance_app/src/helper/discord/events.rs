use std::sync::atomic::{AtomicBool, Ordering};

use serenity::async_trait;
use serenity::prelude::*;

use crate::modules::{checkin, report};
use crate::prelude::*;

/// Forwards gateway events to the modules.
///
/// Every module handler logs its own failures.
pub struct HEventHandler {
    data: Arc<HBotData>,
    /// Set once the startup backfill has been started. `ready` fires again
    /// after reconnects and that should not rescan everything.
    backfill_started: AtomicBool,
}

impl HEventHandler {
    /// Creates a new handler.
    pub fn new(data: Arc<HBotData>) -> Self {
        Self {
            data,
            backfill_started: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl EventHandler for HEventHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        log::info!("Logged in as {}.", ready.user.tag());

        if !self.backfill_started.swap(true, Ordering::AcqRel) {
            checkin::backfill::scan_missed_checkins(&ctx.http, &self.data).await;
        }
    }

    async fn message(&self, ctx: Context, new_message: Message) {
        tokio::join!(
            checkin::message(&ctx, &self.data, &new_message),
            report::message(&ctx.http, &self.data, &new_message),
        );
    }
}
