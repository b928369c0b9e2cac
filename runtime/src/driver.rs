//! The live driver: ticks every generator on its own cadence and paces the
//! session engine, delivering through the injected collaborators.
//!
//! Delivery policy is applied here, not in the generators: tick timestamps
//! get per-kind publish jitter, every enqueued record passes through
//! duplicate injection, and `Emission::After` follow-ups go to the injected
//! scheduler.

use chrono::{DateTime, Utc};
use datagen_core::clock::Clock;
use datagen_core::config::DatagenConfig;
use datagen_core::envelope::{Emission, EventRecord};
use datagen_core::error::DatagenError;
use datagen_core::events::EventKind;
use datagen_core::scheduler::Scheduler;
use datagen_core::sink::{EventSink, RunHistory};
use datagen_core::variates::{now_with_publish_jitter, seeded_rng};
use datagen_generators::series::with_duplicates;
use datagen_generators::session::{SessionEngine, SessionState};
use datagen_generators::{EventGenerator, build_fleet, generate_history};
use rand::RngCore;
use rand::rngs::SmallRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Owns the collaborators and spawns the per-generator loops.
pub struct LiveDriver {
    cfg: DatagenConfig,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn Scheduler>,
    sink: Arc<dyn EventSink>,
}

impl LiveDriver {
    /// Creates a driver around the injected collaborators.
    #[must_use]
    pub fn new(
        cfg: DatagenConfig,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn Scheduler>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            cfg,
            clock,
            scheduler,
            sink,
        }
    }

    /// Runs the one-time history backfill unless a prior run left evidence.
    ///
    /// Returns the number of enqueued history records. Backfilled records
    /// already carry their duplicates, so they bypass live delivery policy.
    ///
    /// # Errors
    ///
    /// Fails when the review corpus cannot be loaded.
    pub fn run_backfill(&self, history: &dyn RunHistory) -> Result<usize, DatagenError> {
        if history.has_prior_run_evidence() {
            tracing::info!("prior run evidence found, skipping history backfill");
            return Ok(0);
        }
        let records = generate_history(&self.cfg, self.clock.now())?;
        let count = records.len();
        for record in records {
            self.sink.enqueue(record);
        }
        Ok(count)
    }

    /// Spawns one tokio task per periodic generator plus the session loop.
    ///
    /// The returned handles never resolve on their own; abort them to stop
    /// the feed.
    ///
    /// # Errors
    ///
    /// Fails when the review corpus cannot be loaded.
    pub fn spawn(&self, seed: u64) -> Result<Vec<JoinHandle<()>>, DatagenError> {
        let fleet = build_fleet(&self.cfg, seed)?;
        let mut delivery_seeds = seeded_rng(seed.wrapping_add(1));

        let mut handles = Vec::with_capacity(fleet.generators.len() + 1);
        for generator in fleet.generators {
            handles.push(tokio::spawn(generator_loop(
                generator,
                self.cfg.clone(),
                Arc::clone(&self.clock),
                Arc::clone(&self.scheduler),
                Arc::clone(&self.sink),
                seeded_rng(delivery_seeds.next_u64()),
            )));
        }
        handles.push(tokio::spawn(session_loop(
            fleet.sessions,
            self.cfg.clone(),
            Arc::clone(&self.clock),
            Arc::clone(&self.scheduler),
            Arc::clone(&self.sink),
            seeded_rng(delivery_seeds.next_u64()),
        )));
        tracing::info!(tasks = handles.len(), seed, "live generation started");
        Ok(handles)
    }
}

async fn generator_loop(
    mut generator: Box<dyn EventGenerator>,
    cfg: DatagenConfig,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn Scheduler>,
    sink: Arc<dyn EventSink>,
    mut rng: SmallRng,
) {
    let interval = generator.interval();
    if interval.is_zero() {
        tracing::error!("generator interval is zero, loop not started");
        return;
    }
    let jitter_secs = cfg.max_publish_delay_for(generator.policy_kind());

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let at = now_with_publish_jitter(&mut rng, clock.now(), jitter_secs);
        for emission in generator.produce(at) {
            deliver(&cfg, &scheduler, &sink, &mut rng, emission);
        }
    }
}

async fn session_loop(
    mut engine: SessionEngine,
    cfg: DatagenConfig,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn Scheduler>,
    sink: Arc<dyn EventSink>,
    mut rng: SmallRng,
) {
    let jitter_secs = cfg.max_publish_delay_for(EventKind::Click);
    loop {
        let at = session_now(&mut rng, &clock, jitter_secs);
        match engine.start(at) {
            Ok((mut session, emissions)) => {
                for emission in emissions {
                    deliver(&cfg, &scheduler, &sink, &mut rng, emission);
                }
                drive_session(
                    &mut engine,
                    &mut session,
                    &cfg,
                    &clock,
                    &scheduler,
                    &sink,
                    &mut rng,
                    jitter_secs,
                )
                .await;
            },
            Err(error) => tracing::warn!(%error, "session could not start"),
        }
        tokio::time::sleep(engine.session_gap()).await;
    }
}

#[allow(clippy::too_many_arguments)]
async fn drive_session(
    engine: &mut SessionEngine,
    session: &mut SessionState,
    cfg: &DatagenConfig,
    clock: &Arc<dyn Clock>,
    scheduler: &Arc<dyn Scheduler>,
    sink: &Arc<dyn EventSink>,
    rng: &mut SmallRng,
    jitter_secs: u64,
) {
    while !session.ended {
        tokio::time::sleep(engine.click_delay()).await;
        let at = session_now(rng, clock, jitter_secs);
        for emission in engine.step(session, at) {
            deliver(cfg, scheduler, sink, rng, emission);
        }
    }
}

fn session_now(rng: &mut SmallRng, clock: &Arc<dyn Clock>, jitter_secs: u64) -> DateTime<Utc> {
    now_with_publish_jitter(rng, clock.now(), jitter_secs)
}

/// Applies delivery policy to one emission: immediate records are enqueued
/// with duplicate injection; delayed records go to the scheduler and get
/// the same treatment when they fire.
fn deliver(
    cfg: &DatagenConfig,
    scheduler: &Arc<dyn Scheduler>,
    sink: &Arc<dyn EventSink>,
    rng: &mut SmallRng,
    emission: Emission,
) {
    match emission {
        Emission::Now(record) => enqueue_with_policy(cfg, sink, rng, record),
        Emission::After { delay, record } => {
            schedule_follow_up(cfg, scheduler, sink, rng, delay, record);
        },
    }
}

fn schedule_follow_up(
    cfg: &DatagenConfig,
    scheduler: &Arc<dyn Scheduler>,
    sink: &Arc<dyn EventSink>,
    rng: &mut SmallRng,
    delay: Duration,
    record: EventRecord,
) {
    let cfg = cfg.clone();
    let sink = Arc::clone(sink);
    let mut follow_rng = seeded_rng(rng.next_u64());
    scheduler.schedule(
        delay,
        Box::new(move || enqueue_with_policy(&cfg, &sink, &mut follow_rng, record)),
    );
}

fn enqueue_with_policy(
    cfg: &DatagenConfig,
    sink: &Arc<dyn EventSink>,
    rng: &mut SmallRng,
    record: EventRecord,
) {
    let ratio = cfg.duplicates_ratio_for(record.payload.kind());
    for copy in with_duplicates(rng, ratio, record) {
        sink.enqueue(copy);
    }
}
