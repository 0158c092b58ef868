//! Schedule Verifier
//!
//! # Overview
//!
//! Drives the exhaustive search over every schedule variation and streams
//! the resulting Kripke structure into a [`PersistentStore`] and a
//! [`View`].
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────────┐
//!  │ queue: Job { pool, threads, predecessor }                    │
//!  └──────────────┬───────────────────────────────────────────────┘
//!                 │ batch of `workers` jobs
//!                 ▼
//!  ┌──────────────────────────────┐   pure, one scoped thread per job
//!  │ expand: thread pathways      │
//!  │   × odometer product         │
//!  │   → R / E / W node chains    │
//!  └──────────────┬───────────────┘
//!                 │ in queue order
//!                 ▼
//!  ┌──────────────────────────────┐
//!  │ apply: store.add / add_edge  │
//!  │   final W ─▶ CycleDetector   │──new──▶ queue Job(W pool, W)
//!  │                              │──seen─▶ branch closed
//!  │   commit job's new states    │
//!  └──────────────────────────────┘
//! ```
//!
//! Expansion never touches shared state, so a batch can be expanded in
//! parallel. Store writes, cycle detection and view commits happen
//! sequentially in queue order, which keeps the output identical to a
//! single-worker run.
//!
//! # Commit Order
//!
//! A state is committed when its outgoing edges are complete: states
//! first created by a job at the end of that job, and a final `W` that
//! spawned a job at the end of the spawned job.

use super::config::VerifierConfig;
use super::cycle::{CycleDetector, HashTableCycleDetector};
use super::report::{LivenessViolation, VerificationReport, VerificationStats};
use crate::domain::clock::ScheduleTiming;
use crate::domain::kripke::{KripkeEdge, PersistentStore, StepKind, StepMarker, View};
use crate::domain::pool::ExecutablePool;
use crate::domain::scheduling::{Schedule, ScheduleThread, Timeslot};
use crate::domain::variations::{Pathway, ScheduleThreadVariations, SnapshotSectionPath};
use crate::error::{ConfigurationError, VerificationError, VerificationResult};
use llfsm_core::{Constraint, ExecutableId, PropertyList, StateId, TimeNs, Value};
use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::{debug, info, trace, warn};

/// Exhaustive verifier for one schedule
#[derive(Debug, Clone)]
pub struct ScheduleVerifier {
    schedule: Schedule,
    config: VerifierConfig,
}

/// Where a job continues from
#[derive(Debug, Clone)]
struct Predecessor {
    state: StateId,
    slot: Timeslot,
}

/// Pending exploration of one scheduling cycle
#[derive(Debug)]
struct Job {
    pool: ExecutablePool,
    threads: Vec<ScheduleThread>,
    predecessor: Option<Predecessor>,
    initial: bool,
}

/// Edge into a node, missing only its target
#[derive(Debug, Clone)]
struct Incoming {
    clock_name: Option<String>,
    constraint: Option<Constraint>,
    reset_clock: bool,
    take_snapshot: bool,
    time: TimeNs,
}

impl Incoming {
    fn to(&self, target: StateId) -> KripkeEdge {
        let edge = KripkeEdge::new(target)
            .constrained(self.constraint.clone())
            .resetting(self.reset_clock)
            .snapshotting(self.take_snapshot)
            .after(self.time);
        match &self.clock_name {
            Some(name) => edge.clock(name.clone()),
            None => edge,
        }
    }
}

#[derive(Debug)]
struct Node {
    properties: PropertyList,
    is_initial: bool,
    incoming: Incoming,
}

/// One expanded schedule variation
#[derive(Debug)]
struct Variation {
    nodes: Vec<Node>,
    pool: ExecutablePool,
    threads: Vec<ScheduleThread>,
    /// Timeslot that ends last; the next cycle's gap is measured from it
    last_slot: Timeslot,
    /// `cycles_executed` after every step
    cycles: Vec<(ExecutableId, u64)>,
}

/// Per-run layout derived from the schedule
#[derive(Debug)]
struct Layout {
    timing: ScheduleTiming,
    cycle_length: TimeNs,
    repeated: bool,
    /// Global index of the first timeslot of every section, per thread
    section_slots: Vec<Vec<usize>>,
}

impl Layout {
    fn new(schedule: &Schedule) -> Self {
        let mut next = 0;
        let section_slots = schedule
            .threads
            .iter()
            .map(|thread| {
                thread
                    .sections
                    .iter()
                    .map(|section| {
                        let first = next;
                        next += section.timeslots.len();
                        first
                    })
                    .collect()
            })
            .collect();
        Self {
            timing: schedule.timing(),
            cycle_length: schedule.cycle_length(),
            repeated: schedule.has_repeated_executables(),
            section_slots,
        }
    }

    fn properties(&self, pool: &ExecutablePool, marker: &StepMarker, slot: usize) -> PropertyList {
        let mut properties = PropertyList::new();
        properties.insert("fsms".into(), pool.snapshot());
        properties.insert("pc".into(), Value::from(marker));
        if self.repeated {
            properties.insert("slot".into(), Value::U64(u64::try_from(slot).unwrap_or(u64::MAX)));
        }
        properties
    }
}

impl ScheduleVerifier {
    /// Verifier for `schedule`
    #[must_use]
    pub const fn new(schedule: Schedule, config: VerifierConfig) -> Self {
        Self { schedule, config }
    }

    /// Schedule being verified
    #[must_use]
    pub const fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Run configuration
    #[must_use]
    pub const fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Explores every execution of the schedule starting from `pool`.
    ///
    /// `view` is reset before exploring and finished exactly once after the
    /// queue drains. On error or cancellation `finish` is not called, and
    /// whatever was already stored and committed stays intact.
    ///
    /// # Errors
    ///
    /// - [`VerificationError::Configuration`] for a schedule that does not
    ///   validate against `pool`, or any error raised while executing
    /// - [`VerificationError::Store`] / [`VerificationError::View`] from the
    ///   sinks
    /// - [`VerificationError::Cancelled`] when the token fires
    /// - [`VerificationError::JobLimitExceeded`] when `max_jobs` is reached
    ///   with work still queued
    pub fn verify<V: View, S: PersistentStore>(
        &self,
        pool: &ExecutablePool,
        view: &mut V,
        store: &mut S,
    ) -> VerificationResult<VerificationReport> {
        self.schedule.validate(pool)?;
        let layout = Layout::new(&self.schedule);
        view.reset(self.config.using_clocks)?;

        info!(
            threads = self.schedule.threads.len(),
            executables = pool.len(),
            cycle_length = layout.cycle_length,
            workers = self.config.workers,
            "Starting schedule verification"
        );

        let mut run = Run {
            view,
            store,
            detector: HashTableCycleDetector::new(),
            committed: HashSet::new(),
            queue: VecDeque::new(),
            stats: VerificationStats::default(),
            liveness: Vec::new(),
            reported: BTreeSet::new(),
            starvation_limit: self.config.starvation_limit,
        };
        run.push(Job {
            pool: pool.cloned(),
            threads: self.schedule.threads.clone(),
            predecessor: None,
            initial: true,
        });

        while !run.queue.is_empty() {
            if self.config.is_cancelled() {
                info!(jobs = run.stats.jobs_processed, "Verification cancelled");
                return Err(VerificationError::Cancelled {
                    jobs: run.stats.jobs_processed,
                });
            }
            let mut width = self.config.workers.max(1).min(run.queue.len());
            if let Some(limit) = self.config.max_jobs {
                let remaining = limit.saturating_sub(run.stats.jobs_processed);
                if remaining == 0 {
                    return Err(VerificationError::JobLimitExceeded { limit });
                }
                width = width.min(remaining);
            }

            let batch: Vec<Job> = run.queue.drain(..width).collect();
            let expansions = self.expand_batch(&batch, &layout)?;
            for (job, variations) in batch.into_iter().zip(expansions) {
                run.apply(job, variations)?;
            }
        }

        run.store.flush()?;
        run.view.finish()?;

        info!(
            jobs = run.stats.jobs_processed,
            variations = run.stats.schedule_variations,
            states = run.stats.states_committed,
            cycles_closed = run.stats.cycles_closed,
            liveness = run.liveness.len(),
            "Schedule verification complete"
        );
        Ok(VerificationReport {
            stats: run.stats,
            liveness: run.liveness,
        })
    }

    fn expand_batch(&self, batch: &[Job], layout: &Layout) -> VerificationResult<Vec<Vec<Variation>>> {
        if batch.len() == 1 {
            return Ok(vec![expand(&batch[0], layout)?]);
        }
        std::thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|job| scope.spawn(move || expand(job, layout)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .map_err(|_| VerificationError::WorkerPanicked)?
                        .map_err(VerificationError::from)
                })
                .collect()
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Expansion
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn expand(job: &Job, layout: &Layout) -> Result<Vec<Variation>, ConfigurationError> {
    let per_thread = job
        .threads
        .iter()
        .map(|thread| ScheduleThreadVariations::new(&job.pool, thread, &layout.timing).map(|v| v.pathways))
        .collect::<Result<Vec<_>, _>>()?;

    if per_thread.iter().any(Vec::is_empty) {
        return Ok(Vec::new());
    }

    let mut variations = Vec::new();
    let mut odometer = vec![0usize; per_thread.len()];
    loop {
        let chosen: Vec<&Pathway> = odometer
            .iter()
            .zip(&per_thread)
            .map(|(&index, pathways)| &pathways[index])
            .collect();
        variations.push(expand_variation(job, &chosen, layout)?);

        let Some(wheel) = (0..odometer.len())
            .rev()
            .find(|&t| odometer[t] + 1 < per_thread[t].len())
        else {
            break;
        };
        odometer[wheel] += 1;
        for later in &mut odometer[wheel + 1..] {
            *later = 0;
        }
    }
    debug!(
        threads = job.threads.len(),
        variations = variations.len(),
        "Expanded job"
    );
    Ok(variations)
}

struct Scheduled<'p> {
    start: TimeNs,
    thread: usize,
    section: usize,
    path: &'p SnapshotSectionPath,
}

fn expand_variation(job: &Job, chosen: &[&Pathway], layout: &Layout) -> Result<Variation, ConfigurationError> {
    let mut order: Vec<Scheduled<'_>> = chosen
        .iter()
        .enumerate()
        .flat_map(|(thread, pathway)| {
            pathway
                .sections
                .iter()
                .enumerate()
                .map(move |(section, path)| Scheduled {
                    start: path.steps.first().map_or(0, |step| step.timeslot.starting_time),
                    thread,
                    section,
                    path,
                })
        })
        .collect();
    order.sort_by_key(|entry| (entry.start, entry.thread));

    let mut global = job.pool.cloned();
    let mut bases: Vec<ExecutablePool> = chosen.iter().map(|pathway| pathway.entry.cloned()).collect();
    let mut nodes = Vec::new();
    let mut cycles = Vec::new();
    let mut now: Option<TimeNs> = None;
    let mut latest: Option<Timeslot> = None;

    for (position, entry) in order.iter().enumerate() {
        let path = entry.path;
        let Some(first) = path.steps.first() else {
            continue;
        };
        let base = &bases[entry.thread];
        let first_slot = layout
            .section_slots
            .get(entry.thread)
            .and_then(|sections| sections.get(entry.section))
            .copied()
            .unwrap_or(0);

        let root = first.executable();
        let read_pool = global.overlaid(base, &path.snapshot);
        let root_machine = path
            .snapshot
            .get(root)
            .ok_or(ConfigurationError::UnknownExecutable(root))?;
        let read_marker = StepMarker::new(
            root_machine.name(),
            root_machine.machine().current_state(),
            StepKind::TakeSnapshot,
        );
        // Sections of other threads may still be running: the snapshot
        // waits for the later of its start and the last emitted node.
        let read_at = now.map_or(entry.start, |now| entry.start.max(now));
        let snapshot_time = match (now, &job.predecessor) {
            (Some(now), _) => read_at - now,
            (None, Some(predecessor)) => predecessor
                .slot
                .after_executing_time_until(entry.start, layout.cycle_length),
            (None, None) => 0,
        };
        nodes.push(Node {
            properties: layout.properties(&read_pool, &read_marker, first_slot),
            is_initial: job.initial && position == 0,
            incoming: Incoming {
                clock_name: None,
                constraint: None,
                reset_clock: false,
                take_snapshot: true,
                time: snapshot_time,
            },
        });

        let mut at = read_at;
        for (index, step) in path.steps.iter().enumerate() {
            let executable = step.executable();
            let name = path
                .snapshot
                .get(executable)
                .ok_or(ConfigurationError::UnknownExecutable(executable))?
                .name()
                .to_owned();
            let kind = if index + 1 == path.steps.len() {
                StepKind::SaveSnapshot
            } else {
                StepKind::Execute
            };
            let ringlet = &step.ringlet.ringlet;
            let marker = StepMarker::new(name.clone(), ringlet.executed_state(), kind);
            let pool = global.overlaid(base, &path.observed_after(index)?);
            let end = step.timeslot.end_time().max(at);
            nodes.push(Node {
                properties: layout.properties(&pool, &marker, first_slot + index),
                is_initial: false,
                incoming: Incoming {
                    clock_name: Some(name),
                    constraint: step.ringlet.edge_constraint(),
                    reset_clock: ringlet.transitioned,
                    take_snapshot: false,
                    time: end - at,
                },
            });
            at = end;
            cycles.push((executable, step.cycles_executed()));
            if latest
                .as_ref()
                .map_or(true, |slot| step.timeslot.end_time() >= slot.end_time())
            {
                latest = Some(step.timeslot.clone());
            }
        }
        now = Some(at);

        global = global.overlaid(base, &path.after);
        bases[entry.thread] = path.after.cloned();
    }

    let last_slot = latest.ok_or_else(|| {
        ConfigurationError::MalformedSchedule("schedule variation executed no timeslots".into())
    })?;
    Ok(Variation {
        nodes,
        pool: global,
        threads: chosen.iter().map(|pathway| pathway.thread()).collect(),
        last_slot,
        cycles,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Application
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Mutable state of one verification run
struct Run<'r, V, S> {
    view: &'r mut V,
    store: &'r mut S,
    detector: HashTableCycleDetector<PropertyList>,
    committed: HashSet<StateId>,
    queue: VecDeque<Job>,
    stats: VerificationStats,
    liveness: Vec<LivenessViolation>,
    reported: BTreeSet<ExecutableId>,
    starvation_limit: u64,
}

impl<V: View, S: PersistentStore> Run<'_, V, S> {
    fn push(&mut self, job: Job) {
        self.queue.push_back(job);
        self.stats.max_queue_length = self.stats.max_queue_length.max(self.queue.len());
    }

    /// Writes one expanded job into the store, queues its successors and
    /// commits what it completed
    fn apply(&mut self, job: Job, variations: Vec<Variation>) -> VerificationResult<()> {
        let mut created = Vec::new();
        let mut deferred = HashSet::new();
        self.stats.schedule_variations += variations.len();

        for variation in variations {
            let mut previous = job.predecessor.as_ref().map(|p| p.state);
            let mut last = None;
            for node in &variation.nodes {
                let known = self.store.len();
                let (id, _) = self.store.add(node.properties.clone(), node.is_initial)?;
                if self.store.len() > known {
                    created.push(id);
                }
                if let Some(source) = previous {
                    self.store.add_edge(node.incoming.to(id), source)?;
                }
                previous = Some(id);
                last = Some((id, &node.properties));
            }

            self.check_liveness(&variation.cycles);

            let Some((id, properties)) = last else {
                continue;
            };
            if self.detector.in_cycle(properties) {
                self.stats.cycles_closed += 1;
                trace!(state = %id, "Cycle closed");
                continue;
            }
            deferred.insert(id);
            self.push(Job {
                pool: variation.pool,
                threads: variation.threads,
                predecessor: Some(Predecessor {
                    state: id,
                    slot: variation.last_slot,
                }),
                initial: false,
            });
        }

        if let Some(predecessor) = &job.predecessor {
            self.commit(predecessor.state)?;
        }
        created.sort_unstable();
        for id in created.into_iter().filter(|id| !deferred.contains(id)) {
            self.commit(id)?;
        }
        self.stats.jobs_processed += 1;
        Ok(())
    }

    fn commit(&mut self, id: StateId) -> VerificationResult<()> {
        if !self.committed.insert(id) {
            return Ok(());
        }
        let state = self.store.state(id)?;
        self.view.commit(&state)?;
        self.stats.states_committed += 1;
        Ok(())
    }

    fn check_liveness(&mut self, cycles: &[(ExecutableId, u64)]) {
        for &(executable, count) in cycles {
            if count > self.starvation_limit && self.reported.insert(executable) {
                warn!(
                    executable = %executable,
                    cycles = count,
                    limit = self.starvation_limit,
                    "Liveness violation detected"
                );
                self.liveness.push(LivenessViolation::Stuck {
                    executable,
                    cycles: count,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::kripke::{KripkeState, KripkeStructure};
    use crate::domain::machine::{ExecutableInformation, ExecutableType, Llfsm, State};
    use crate::domain::scheduling::SnapshotSection;
    use crate::error::ViewError;

    #[derive(Default)]
    struct Counting {
        commits: Vec<KripkeState>,
        finished: usize,
    }

    impl View for Counting {
        fn reset(&mut self, _using_clocks: bool) -> Result<(), ViewError> {
            Ok(())
        }

        fn commit(&mut self, state: &KripkeState) -> Result<(), ViewError> {
            self.commits.push(state.clone());
            Ok(())
        }

        fn finish(&mut self) -> Result<(), ViewError> {
            self.finished += 1;
            Ok(())
        }
    }

    fn pool(machines: Vec<Llfsm>) -> ExecutablePool {
        ExecutablePool::new(
            machines
                .into_iter()
                .enumerate()
                .map(|(i, machine)| {
                    (
                        ExecutableInformation::new(ExecutableId::new(i), machine.name().to_owned()),
                        ExecutableType::Controllable(machine),
                    )
                })
                .collect(),
        )
        .unwrap()
    }

    fn idle(name: &str) -> Llfsm {
        Llfsm::builder(name).state(State::new("Idle")).build().unwrap()
    }

    fn single_slot(id: usize, start: TimeNs) -> ScheduleThread {
        ScheduleThread::new(vec![SnapshotSection::new(vec![Timeslot::new(
            ExecutableId::new(id),
            start,
            10,
        )])])
    }

    #[test]
    fn test_idle_machine_closes_cycle() {
        let pool = pool(vec![idle("M")]);
        let verifier = ScheduleVerifier::new(Schedule::new(vec![single_slot(0, 0)]), VerifierConfig::default());
        let mut view = Counting::default();
        let mut store = KripkeStructure::new();

        let report = verifier.verify(&pool, &mut view, &mut store).unwrap();

        assert_eq!(view.finished, 1);
        assert_eq!(view.commits.len(), store.len());
        assert!(report.stats.cycles_closed >= 1);
        let unique: HashSet<_> = view.commits.iter().map(|s| s.properties.clone()).collect();
        assert_eq!(unique.len(), view.commits.len());
        assert_eq!(store.initial_states().count(), 1);
    }

    #[test]
    fn test_repeated_executable_adds_slot() {
        let pool = pool(vec![idle("M")]);
        let thread = ScheduleThread::new(vec![
            SnapshotSection::new(vec![Timeslot::new(ExecutableId::new(0), 0, 10)]),
            SnapshotSection::new(vec![Timeslot::new(ExecutableId::new(0), 20, 10)]),
        ]);
        let verifier = ScheduleVerifier::new(Schedule::new(vec![thread]), VerifierConfig::default());
        let mut store = KripkeStructure::new();
        verifier.verify(&pool, &mut Counting::default(), &mut store).unwrap();

        let slots: BTreeSet<_> = store
            .iter()
            .filter_map(|state| state.properties.get("slot").cloned())
            .collect();
        assert_eq!(slots, BTreeSet::from([Value::U64(0), Value::U64(1)]));
    }

    #[test]
    fn test_two_threads_interleave_by_start() {
        let pool = pool(vec![idle("A"), idle("B")]);
        let schedule = Schedule::new(vec![single_slot(1, 20), single_slot(0, 0)]);
        let verifier = ScheduleVerifier::new(schedule, VerifierConfig::default());
        let mut store = KripkeStructure::new();
        verifier.verify(&pool, &mut Counting::default(), &mut store).unwrap();

        let initial = store.initial_states().next().unwrap();
        assert_eq!(initial.pc(), Some("A.Idle.R"));
        let w = store.state(initial.edges[0].target).unwrap();
        assert_eq!(w.pc(), Some("A.Idle.W"));
        let next = store.state(w.edges[0].target).unwrap();
        assert_eq!(next.pc(), Some("B.Idle.R"));
        assert_eq!(w.edges[0].time, 10, "gap between A ending and B starting");
    }

    #[test]
    fn test_invalid_schedule_is_rejected_before_reset() {
        let pool = pool(vec![idle("A")]);
        let verifier = ScheduleVerifier::new(Schedule::new(vec![single_slot(3, 0)]), VerifierConfig::default());
        let mut view = Counting::default();
        let err = verifier
            .verify(&pool, &mut view, &mut KripkeStructure::new())
            .unwrap_err();
        assert!(matches!(
            err,
            VerificationError::Configuration(ConfigurationError::UnknownExecutable(_))
        ));
        assert_eq!(view.finished, 0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sensor = |name: &str| {
            Llfsm::builder(name)
                .sensor("in", llfsm_core::ValueType::Bool)
                .state(State::new("Low").transition("High", |ctx| ctx.bool_external("in")))
                .state(State::new("High").transition("Low", |ctx| !ctx.bool_external("in")))
                .build()
                .unwrap()
        };
        let pool = pool(vec![sensor("A"), sensor("B")]);
        let schedule = Schedule::new(vec![single_slot(0, 0), single_slot(1, 20)]);

        let run = |workers| {
            let verifier = ScheduleVerifier::new(schedule.clone(), VerifierConfig::builder().workers(workers).build());
            let mut view = Counting::default();
            let report = verifier.verify(&pool, &mut view, &mut KripkeStructure::new()).unwrap();
            (view.commits, report.stats)
        };
        let (sequential, stats) = run(1);
        let (parallel, parallel_stats) = run(4);
        assert_eq!(sequential, parallel);
        assert_eq!(stats.states_committed, parallel_stats.states_committed);
        assert_eq!(stats.jobs_processed, parallel_stats.jobs_processed);
    }
}
