//! Per-tick composition of the decision components.
//!
//! Every tick runs intel encoding, scouting, construction and engagement
//! in that fixed order against one shared wallet, so later components see
//! what earlier ones already spent.

use std::path::{Path, PathBuf};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::{AgentConfig, ConfigError, EngagementMode};
use crate::construction::ConstructionScheduler;
use crate::engagement::{
    Engagement, EngagementDecision, EngagementPolicy, LearnedPolicy, OnnxClassifier,
    RandomPolicy, RuleBasedPolicy,
};
use crate::intel::{CircleEncoder, FrameDumper, IntelEncoder, IntelTensor};
use crate::scout::ScoutDirector;
use crate::training::{Outcome, TrainingError, TrainingLog};
use crate::world::{Order, Roster, Snapshot, Wallet};

/// The agent's decision core for one match at a time.
pub struct Orchestrator {
    config: AgentConfig,
    roster: Roster,
    encoder: CircleEncoder,
    frames: Option<FrameDumper>,
    scout: ScoutDirector,
    construction: ConstructionScheduler,
    engagement: Engagement,
    training: TrainingLog,
    rng: SmallRng,
    ticks: u64,
    last_decision: Option<EngagementDecision>,
}

impl Orchestrator {
    /// Validates `config` and builds the configured engagement policy.
    ///
    /// Fails before any tick on an unknown mode, out-of-range settings, or
    /// a learned mode whose model cannot be loaded.
    pub fn new(config: AgentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = seeded_rng(config.player.seed);
        let roster = config.roster()?;

        let policy: Box<dyn EngagementPolicy> = match config.engagement_mode()? {
            EngagementMode::RuleBased => Box::new(RuleBasedPolicy::new(
                roster.combat_unit,
                config.engagement.withdraw_threshold,
                config.engagement.attack_threshold,
            )),
            EngagementMode::Random => {
                Box::new(RandomPolicy::new(SmallRng::seed_from_u64(rng.gen())))
            }
            EngagementMode::Learned => {
                let path = Path::new(config.player.model_location.trim());
                Box::new(LearnedPolicy::new(Box::new(OnnxClassifier::load(path)?)))
            }
        };
        Self::build(config, roster, policy, rng)
    }

    /// Builds an orchestrator around a caller-supplied policy.
    pub fn with_policy(
        config: AgentConfig,
        policy: Box<dyn EngagementPolicy>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let roster = config.roster()?;
        let rng = seeded_rng(config.player.seed);
        Self::build(config, roster, policy, rng)
    }

    fn build(
        config: AgentConfig,
        roster: Roster,
        policy: Box<dyn EngagementPolicy>,
        rng: SmallRng,
    ) -> Result<Self, ConfigError> {
        let player = &config.player;
        let frames = player
            .plot_map_intel
            .then(|| FrameDumper::new(&player.intel_frame_dir, player.intel_frame_every));
        info!(
            race = ?roster.race,
            policy = policy.name(),
            worker_scout = player.use_worker_scout,
            "agent configured"
        );
        Ok(Orchestrator {
            encoder: CircleEncoder::new(roster.combat_unit),
            frames,
            scout: ScoutDirector::new(&roster, &config.scout, player.use_worker_scout),
            construction: ConstructionScheduler::new(
                roster.clone(),
                config.construction.clone(),
                player.max_num_workers,
            ),
            engagement: Engagement::new(
                policy,
                roster.combat_unit,
                config.engagement.withdraw_hold_secs,
            ),
            training: TrainingLog::new(player.save_training_data),
            rng,
            ticks: 0,
            last_decision: None,
            roster,
            config,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn scout(&self) -> &ScoutDirector {
        &self.scout
    }

    pub fn construction(&self) -> &ConstructionScheduler {
        &self.construction
    }

    pub fn engagement(&self) -> &Engagement {
        &self.engagement
    }

    pub fn training(&self) -> &TrainingLog {
        &self.training
    }

    /// Decision executed on the last tick, if any.
    pub fn last_decision(&self) -> Option<&EngagementDecision> {
        self.last_decision.as_ref()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Clears every ledger and starts capturing training data.
    pub fn new_game(&mut self) {
        self.scout.reset();
        self.construction.reset();
        self.engagement.reset();
        self.training.begin_match();
        self.ticks = 0;
        self.last_decision = None;
        debug!("new game");
    }

    /// Ends the match, saving training data on a win.
    pub fn game_over(&mut self, outcome: Outcome) -> Result<Option<PathBuf>, TrainingError> {
        info!(?outcome, ticks = self.ticks, "game over");
        let dir = self.config.player.training_data_dir.clone();
        self.training.finish(&dir, outcome)
    }

    /// Renders the intel tensor for a snapshot.
    pub fn encode(&self, snapshot: &Snapshot) -> IntelTensor {
        self.encoder.encode(snapshot)
    }

    /// Runs one full decision pass and returns the orders to execute.
    pub fn tick(&mut self, snapshot: &Snapshot) -> Vec<Order> {
        let intel = self.encoder.encode(snapshot);
        if let Some(frames) = self.frames.as_mut() {
            if let Err(e) = frames.maybe_write(self.ticks, &intel) {
                warn!(error = %e, "disabling intel frames");
                self.frames = None;
            }
        }

        let mut wallet = Wallet::from_snapshot(snapshot);
        let mut orders = Vec::new();
        self.scout
            .step(snapshot, &mut wallet, &mut self.rng, &mut orders);
        let scout = self.scout.state().scout_tag;
        self.construction
            .step(snapshot, &mut wallet, &mut self.rng, scout, &mut orders);
        self.last_decision =
            self.engagement
                .step(snapshot, &intel, &mut self.training, &mut orders);

        self.ticks += 1;
        debug!(
            tick = self.ticks,
            game_loop = snapshot.game_loop,
            orders = orders.len(),
            "tick done"
        );
        orders
    }
}

fn seeded_rng(seed: u64) -> SmallRng {
    if seed != 0 {
        SmallRng::seed_from_u64(seed)
    } else {
        SmallRng::from_entropy()
    }
}
