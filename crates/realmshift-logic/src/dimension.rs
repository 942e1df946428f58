//! Dimension switch state machine.
//!
//! Owns which realm is active, serializes realm transitions (at most one in
//! flight) and couples them to the dark-realm survival timer.
//!
//! # Frame order
//!
//! Input and collision handlers call [`DimensionMachine::toggle`],
//! [`DimensionMachine::force_switch`] or [`DimensionMachine::player_died`]
//! during the engine's primary update. The engine then calls
//! [`DimensionMachine::tick`] once in a late pass, which:
//!
//! 1. advances a running survival timer and handles its expiry,
//! 2. starts a timer armed by a Dark-ward transition that completed on an
//!    earlier frame (only if the player is still settled in Dark),
//! 3. advances the cross-fade and applies dissolve values and activation.
//!
//! # Timer coupling
//!
//! | Event | Timer effect |
//! |-------|--------------|
//! | Transition into Dark completes | armed, starts next tick |
//! | Any request toward Light | cancelled immediately (also disarms) |
//! | Expiry | `force_switch(Light)` + one respawn request |
//!
//! A death while a transition is in flight queues the home realm; the machine
//! switches there on the tick the transition lands.
//!
//! ```
//! use realmshift_logic::activation::ActivationStore;
//! use realmshift_logic::config::LevelConfig;
//! use realmshift_logic::dimension::{DimensionMachine, SwitchOutcome};
//! use realmshift_logic::dissolve::DissolveSet;
//! use realmshift_logic::realm::RealmId;
//!
//! let mut machine = DimensionMachine::new(
//!     LevelConfig::default(),
//!     ActivationStore::new(Some(1), Some(2)),
//!     DissolveSet::empty(),
//!     DissolveSet::empty(),
//! );
//! let outcome = machine.toggle().unwrap();
//! assert_eq!(outcome, SwitchOutcome::Started { from: RealmId::Light, to: RealmId::Dark });
//! assert_eq!(machine.toggle().unwrap(), SwitchOutcome::Ignored);
//! ```

use crate::activation::ActivationStore;
use crate::collaborators::{FrameContext, RespawnReason};
use crate::config::LevelConfig;
use crate::dissolve::{self, DissolveSet, HIDDEN, SHOWN};
use crate::error::ConfigurationError;
use crate::realm::RealmId;
use crate::timer::{SurvivalTimer, TimerEvent};
use crate::transition::{TransitionFrame, TransitionState};

/// Result of a switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// A transition was started.
    Started { from: RealmId, to: RealmId },
    /// Requested realm is already the settled one; nothing to do.
    AlreadyActive,
    /// A transition is in flight; the request was dropped.
    Ignored,
}

/// What happened during one `tick`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub transition: Option<TransitionFrame>,
    pub timer: TimerEvent,
    pub timer_started: bool,
}

impl Default for TickReport {
    fn default() -> Self {
        Self {
            transition: None,
            timer: TimerEvent::Idle,
            timer_started: false,
        }
    }
}

/// The realm core. One instance per loaded level.
#[derive(Debug, Clone)]
pub struct DimensionMachine {
    config: LevelConfig,
    store: ActivationStore,
    light_targets: DissolveSet,
    dark_targets: DissolveSet,
    active: RealmId,
    transition: TransitionState,
    timer: SurvivalTimer,
    /// The in-flight transition should arm the timer when it lands in Dark.
    arm_on_arrival: bool,
    timer_armed: bool,
    /// Home realm to switch to once the in-flight transition lands.
    pending_home: Option<RealmId>,
}

impl DimensionMachine {
    pub fn new(
        config: LevelConfig,
        store: ActivationStore,
        light_targets: DissolveSet,
        dark_targets: DissolveSet,
    ) -> Self {
        Self {
            active: config.initial_realm,
            config,
            store,
            light_targets,
            dark_targets,
            transition: TransitionState::Idle,
            timer: SurvivalTimer::Stopped,
            arm_on_arrival: false,
            timer_armed: false,
            pending_home: None,
        }
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Settled realm. Changes only when a transition completes.
    pub fn active_realm(&self) -> RealmId {
        self.active
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_transitioning()
    }

    /// Realm currently being faded in, if any.
    pub fn destination(&self) -> Option<RealmId> {
        self.transition.destination()
    }

    pub fn transition(&self) -> &TransitionState {
        &self.transition
    }

    pub fn timer(&self) -> &SurvivalTimer {
        &self.timer
    }

    /// A completed Dark-ward transition is waiting to start the timer.
    pub fn timer_armed(&self) -> bool {
        self.timer_armed
    }

    pub fn store(&self) -> &ActivationStore {
        &self.store
    }

    pub fn dissolve_targets(&self, realm: RealmId) -> &DissolveSet {
        match realm {
            RealmId::Light => &self.light_targets,
            RealmId::Dark => &self.dark_targets,
        }
    }

    /// Home realm queued by a death during a transition.
    pub fn pending_home(&self) -> Option<RealmId> {
        self.pending_home
    }

    /// Level start: show the initial realm, hide the other one.
    ///
    /// Nothing is written if the level config or the realm containers are
    /// invalid.
    pub fn initialize(&mut self, ctx: &mut FrameContext) -> Result<(), ConfigurationError> {
        if let Err(e) = self.check_setup() {
            log::error!("Realm setup failed: {}", e);
            return Err(e);
        }
        let active = self.active;
        dissolve::apply(self.dissolve_targets(active), SHOWN, ctx.scene.surfaces());
        dissolve::apply(
            self.dissolve_targets(active.opposite()),
            HIDDEN,
            ctx.scene.surfaces(),
        );
        self.store.apply_exclusive(active, ctx.scene.containers())?;
        log::info!("Level starts in {}", active);
        Ok(())
    }

    /// Flip Light ↔ Dark. Dropped while a transition is in flight.
    pub fn toggle(&mut self) -> Result<SwitchOutcome, ConfigurationError> {
        if self.is_transitioning() {
            log::debug!("Toggle ignored, transition already running");
            return Ok(SwitchOutcome::Ignored);
        }
        self.begin(self.active.opposite())
    }

    /// Switch to an explicit realm.
    ///
    /// While a transition is in flight the request is dropped, but a request
    /// toward Light still cancels the survival timer and disarms a pending
    /// start.
    pub fn force_switch(&mut self, target: RealmId) -> Result<SwitchOutcome, ConfigurationError> {
        if self.is_transitioning() {
            if target == RealmId::Light {
                self.cancel_timer();
            }
            log::debug!("Force switch to {} ignored, transition already running", target);
            return Ok(SwitchOutcome::Ignored);
        }
        if target == self.active {
            return Ok(SwitchOutcome::AlreadyActive);
        }
        self.begin(target)
    }

    /// The player died: respawn them, then put them back in the home realm
    /// if they died elsewhere.
    pub fn player_died(
        &mut self,
        reason: RespawnReason,
        ctx: &mut FrameContext,
    ) -> Result<SwitchOutcome, ConfigurationError> {
        if let Err(e) = ctx.request_respawn(reason) {
            log::warn!("{}, respawn skipped", e);
        }
        let died_in = ctx.death_realm().unwrap_or(self.active);
        let home = self.config.home_realm;
        if self.is_transitioning() {
            if self.destination() == Some(home) {
                return Ok(SwitchOutcome::Ignored);
            }
            log::info!("Player died in {} mid-switch, {} queued", died_in, home);
            self.pending_home = Some(home);
            return self.force_switch(home);
        }
        if died_in == home {
            return Ok(SwitchOutcome::AlreadyActive);
        }
        log::info!("Player died in {}, returning to {}", died_in, home);
        self.force_switch(home)
    }

    /// Late per-frame pass. Never fails; missing collaborators are skipped.
    pub fn tick(&mut self, dt: f32, ctx: &mut FrameContext) -> TickReport {
        let mut report = TickReport {
            timer: self.timer.tick(dt),
            ..TickReport::default()
        };
        if report.timer == TimerEvent::Expired {
            self.expire(ctx);
        }

        if self.timer_armed {
            self.timer_armed = false;
            if self.active == RealmId::Dark && !self.is_transitioning() {
                self.timer.start(self.config.survival_duration);
                report.timer_started = true;
                log::info!(
                    "Survival timer started ({:.2}s)",
                    self.config.survival_duration
                );
            }
        }

        if let Some(frame) = self.transition.advance(dt) {
            self.drive(frame, ctx);
            report.transition = Some(frame);
        }

        if !self.is_transitioning() {
            if let Some(home) = self.pending_home.take() {
                if let Err(e) = self.force_switch(home) {
                    log::error!("Could not return to {}: {}", home, e);
                }
            }
        }

        report
    }

    fn check_setup(&self) -> Result<(), ConfigurationError> {
        if let Some(e) = self.config.validate().into_iter().next() {
            return Err(e);
        }
        self.store.validate()
    }

    fn begin(&mut self, to: RealmId) -> Result<SwitchOutcome, ConfigurationError> {
        if let Err(e) = self.check_setup() {
            log::error!("Cannot switch to {}: {}", to, e);
            return Err(e);
        }
        if to == RealmId::Light {
            self.cancel_timer();
        }
        self.arm_on_arrival = to == RealmId::Dark;
        let from = self.active;
        self.transition = TransitionState::begin(from, to, self.config.transition_duration);
        log::info!("Switching to {}", to);
        Ok(SwitchOutcome::Started { from, to })
    }

    fn cancel_timer(&mut self) {
        if self.timer.is_running() || self.timer_armed || self.arm_on_arrival {
            log::info!("Survival timer cancelled");
        }
        self.timer.cancel();
        self.arm_on_arrival = false;
        self.timer_armed = false;
    }

    fn expire(&mut self, ctx: &mut FrameContext) {
        log::info!("Survival timer expired in {}", self.active);
        if let Err(e) = self.force_switch(RealmId::Light) {
            log::error!("Could not leave {} after expiry: {}", self.active, e);
        }
        if let Err(e) = ctx.request_respawn(RespawnReason::TimeExpired) {
            log::warn!("{}, respawn skipped", e);
        }
    }

    fn drive(&mut self, frame: TransitionFrame, ctx: &mut FrameContext) {
        if frame.first {
            self.store.set_active(frame.to, true, ctx.scene.containers());
        }

        dissolve::cross_fade(
            self.dissolve_targets(frame.from),
            self.dissolve_targets(frame.to),
            frame.progress,
            ctx.scene.surfaces(),
        );

        if frame.finished {
            self.store.set_active(frame.from, false, ctx.scene.containers());
            self.active = frame.to;
            ctx.play(self.config.switch_clip.as_deref());
            if frame.to == RealmId::Dark && self.arm_on_arrival {
                self.timer_armed = true;
            }
            self.arm_on_arrival = false;
            log::info!("Now in {}", frame.to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::{ContainerId, ContainerSwitch};
    use crate::collaborators::{AudioSink, RespawnHandler};
    use crate::dissolve::{DissolveTarget, SurfaceId, SurfaceWriter};
    use crate::error::AudioError;
    use std::collections::HashMap;

    const LIGHT_ROOT: ContainerId = 1;
    const DARK_ROOT: ContainerId = 2;
    const DT: f32 = 1.0 / 120.0;

    #[derive(Default)]
    struct Scene {
        values: HashMap<SurfaceId, f32>,
        active: HashMap<ContainerId, bool>,
        writes: usize,
    }

    impl SurfaceWriter for Scene {
        fn write_scalar(&mut self, target: &DissolveTarget, value: f32) {
            self.values.insert(target.surface, value);
            self.writes += 1;
        }
    }

    impl ContainerSwitch for Scene {
        fn set_container_active(&mut self, container: ContainerId, active: bool) {
            self.active.insert(container, active);
        }
    }

    impl Scene {
        fn value(&self, surface: SurfaceId) -> f32 {
            self.values[&surface]
        }

        fn is_active(&self, container: ContainerId) -> bool {
            self.active.get(&container).copied().unwrap_or(false)
        }
    }

    #[derive(Default)]
    struct Player {
        respawns: Vec<RespawnReason>,
        died_in: Option<RealmId>,
    }

    impl RespawnHandler for Player {
        fn respawn(&mut self, reason: RespawnReason) {
            self.respawns.push(reason);
        }

        fn death_realm(&self) -> Option<RealmId> {
            self.died_in
        }
    }

    #[derive(Default)]
    struct Speaker {
        played: Vec<String>,
    }

    impl AudioSink for Speaker {
        fn play_one_shot(&mut self, clip: &str) -> Result<(), AudioError> {
            self.played.push(clip.to_string());
            Ok(())
        }
    }

    // Light surfaces 10..12, dark surfaces 20..22.
    fn machine_with(config: LevelConfig) -> DimensionMachine {
        let parameter = config.dissolve_parameter.clone();
        DimensionMachine::new(
            config,
            ActivationStore::new(Some(LIGHT_ROOT), Some(DARK_ROOT)),
            DissolveSet::cache([10, 11, 12], &parameter),
            DissolveSet::cache([20, 21, 22], &parameter),
        )
    }

    fn machine() -> DimensionMachine {
        machine_with(LevelConfig::default())
    }

    fn ticks(
        machine: &mut DimensionMachine,
        n: usize,
        scene: &mut Scene,
        player: &mut Player,
        speaker: &mut Speaker,
    ) {
        for _ in 0..n {
            let mut ctx = FrameContext::new(&mut *scene)
                .with_respawn(&mut *player)
                .with_audio(&mut *speaker);
            machine.tick(DT, &mut ctx);
        }
    }

    fn run_to_dark(
        machine: &mut DimensionMachine,
        scene: &mut Scene,
        player: &mut Player,
        speaker: &mut Speaker,
    ) {
        machine.toggle().unwrap();
        ticks(machine, 61, scene, player, speaker);
        assert!(machine.timer().is_running());
    }

    #[test]
    fn test_new_settles_in_initial_realm() {
        let m = machine();
        assert_eq!(m.active_realm(), RealmId::Light);
        assert!(!m.is_transitioning());
        assert_eq!(*m.timer(), SurvivalTimer::Stopped);

        let dark_start = machine_with(LevelConfig {
            initial_realm: RealmId::Dark,
            ..LevelConfig::default()
        });
        assert_eq!(dark_start.active_realm(), RealmId::Dark);
    }

    #[test]
    fn test_initialize_shows_active_hides_other() {
        let mut m = machine();
        let mut scene = Scene::default();
        m.initialize(&mut FrameContext::new(&mut scene)).unwrap();
        assert_eq!(scene.value(10), 0.0);
        assert_eq!(scene.value(20), 1.0);
        assert!(scene.is_active(LIGHT_ROOT));
        assert!(!scene.is_active(DARK_ROOT));
    }

    #[test]
    fn test_initialize_missing_container() {
        let mut m = DimensionMachine::new(
            LevelConfig::default(),
            ActivationStore::new(Some(LIGHT_ROOT), None),
            DissolveSet::empty(),
            DissolveSet::empty(),
        );
        let mut scene = Scene::default();
        let err = m.initialize(&mut FrameContext::new(&mut scene)).unwrap_err();
        assert_eq!(err, ConfigurationError::MissingRealmContainer(RealmId::Dark));
        assert_eq!(scene.writes, 0);
    }

    #[test]
    fn test_toggle_missing_container_no_state_change() {
        let mut m = DimensionMachine::new(
            LevelConfig::default(),
            ActivationStore::new(None, Some(DARK_ROOT)),
            DissolveSet::empty(),
            DissolveSet::empty(),
        );
        assert_eq!(
            m.toggle(),
            Err(ConfigurationError::MissingRealmContainer(RealmId::Light))
        );
        assert!(!m.is_transitioning());
        assert_eq!(m.active_realm(), RealmId::Light);
        assert_eq!(
            m.force_switch(RealmId::Dark),
            Err(ConfigurationError::MissingRealmContainer(RealmId::Light))
        );
        assert!(!m.is_transitioning());
    }

    #[test]
    fn test_half_second_at_120hz() {
        let mut m = machine();
        let mut scene = Scene::default();
        let mut player = Player::default();
        let mut speaker = Speaker::default();

        assert_eq!(
            m.toggle().unwrap(),
            SwitchOutcome::Started {
                from: RealmId::Light,
                to: RealmId::Dark
            }
        );

        ticks(&mut m, 30, &mut scene, &mut player, &mut speaker);
        assert!((scene.value(10) - 0.5).abs() < 0.01);
        assert!((scene.value(20) - 0.5).abs() < 0.01);
        assert_eq!(m.active_realm(), RealmId::Light);

        ticks(&mut m, 30, &mut scene, &mut player, &mut speaker);
        for s in [10, 11, 12] {
            assert_eq!(scene.value(s), 1.0);
        }
        for s in [20, 21, 22] {
            assert_eq!(scene.value(s), 0.0);
        }
        assert_eq!(m.active_realm(), RealmId::Dark);
        assert!(!m.is_transitioning());
        assert!(!m.timer().is_running());
        assert!(m.timer_armed());

        ticks(&mut m, 1, &mut scene, &mut player, &mut speaker);
        assert_eq!(
            *m.timer(),
            SurvivalTimer::Running {
                elapsed: 0.0,
                duration: 10.0
            }
        );
    }

    #[test]
    fn test_incoming_active_from_first_tick() {
        let mut m = machine();
        let mut scene = Scene::default();
        m.initialize(&mut FrameContext::new(&mut scene)).unwrap();
        m.toggle().unwrap();
        assert!(!scene.is_active(DARK_ROOT));

        m.tick(DT, &mut FrameContext::new(&mut scene));
        assert!(scene.is_active(DARK_ROOT));
        assert!(scene.is_active(LIGHT_ROOT));

        for _ in 0..58 {
            m.tick(DT, &mut FrameContext::new(&mut scene));
        }
        assert!(m.is_transitioning());
        assert!(scene.is_active(LIGHT_ROOT));

        m.tick(DT, &mut FrameContext::new(&mut scene));
        assert!(!m.is_transitioning());
        assert!(!scene.is_active(LIGHT_ROOT));
        assert!(m.store().is_active(RealmId::Dark));
    }

    #[test]
    fn test_dissolve_monotonic_and_snapped() {
        let mut m = machine_with(LevelConfig {
            transition_duration: 0.37,
            ..LevelConfig::default()
        });
        let mut scene = Scene::default();
        m.toggle().unwrap();
        let mut prev_out = 0.0;
        let mut prev_in = 1.0;
        let deltas = [0.013, 0.02, 0.0, 0.031, 0.007, 0.05];
        let mut i = 0;
        while m.is_transitioning() {
            m.tick(deltas[i % deltas.len()], &mut FrameContext::new(&mut scene));
            let out = scene.value(10);
            let inc = scene.value(20);
            assert!(out >= prev_out);
            assert!(inc <= prev_in);
            prev_out = out;
            prev_in = inc;
            i += 1;
        }
        assert_eq!(scene.value(10), 1.0);
        assert_eq!(scene.value(20), 0.0);
    }

    #[test]
    fn test_mid_transition_toggle_ignored() {
        let mut m = machine();
        let mut scene = Scene::default();
        m.toggle().unwrap();
        for _ in 0..20 {
            m.tick(DT, &mut FrameContext::new(&mut scene));
        }
        let before = m.clone();
        assert_eq!(m.toggle().unwrap(), SwitchOutcome::Ignored);
        assert_eq!(*m.transition(), *before.transition());
        assert_eq!(m.active_realm(), before.active_realm());
        assert_eq!(*m.timer(), *before.timer());
        assert_eq!(m.timer_armed(), before.timer_armed());

        while m.is_transitioning() {
            m.tick(DT, &mut FrameContext::new(&mut scene));
        }
        assert_eq!(m.active_realm(), RealmId::Dark);
    }

    #[test]
    fn test_force_light_before_dark_completes_blocks_timer() {
        for cut in [0, 1, 30, 59] {
            let mut m = machine();
            let mut scene = Scene::default();
            m.toggle().unwrap();
            for _ in 0..cut {
                m.tick(DT, &mut FrameContext::new(&mut scene));
            }
            assert!(m.is_transitioning());
            assert_eq!(m.force_switch(RealmId::Light).unwrap(), SwitchOutcome::Ignored);
            for _ in 0..400 {
                m.tick(DT, &mut FrameContext::new(&mut scene));
                assert!(!m.timer().is_running(), "timer ran after cut at {}", cut);
            }
        }
    }

    #[test]
    fn test_toggle_back_before_timer_start() {
        let mut m = machine();
        let mut scene = Scene::default();
        m.toggle().unwrap();
        for _ in 0..60 {
            m.tick(DT, &mut FrameContext::new(&mut scene));
        }
        assert!(m.timer_armed());
        m.toggle().unwrap();
        assert!(!m.timer_armed());
        for _ in 0..100 {
            m.tick(DT, &mut FrameContext::new(&mut scene));
            assert!(!m.timer().is_running());
        }
        assert_eq!(m.active_realm(), RealmId::Light);
    }

    #[test]
    fn test_leaving_dark_cancels_timer_immediately() {
        let mut m = machine();
        let mut scene = Scene::default();
        let mut player = Player::default();
        let mut speaker = Speaker::default();
        run_to_dark(&mut m, &mut scene, &mut player, &mut speaker);

        m.toggle().unwrap();
        assert_eq!(*m.timer(), SurvivalTimer::Stopped);
        assert_eq!(m.active_realm(), RealmId::Dark);
        assert_eq!(m.destination(), Some(RealmId::Light));
    }

    #[test]
    fn test_expiry_returns_to_light_and_respawns_once() {
        let mut m = machine_with(LevelConfig {
            survival_duration: 1.0,
            ..LevelConfig::default()
        });
        let mut scene = Scene::default();
        let mut player = Player::default();
        let mut speaker = Speaker::default();
        run_to_dark(&mut m, &mut scene, &mut player, &mut speaker);

        ticks(&mut m, 130, &mut scene, &mut player, &mut speaker);
        assert_eq!(player.respawns, vec![RespawnReason::TimeExpired]);
        assert_eq!(m.destination(), Some(RealmId::Light));

        ticks(&mut m, 600, &mut scene, &mut player, &mut speaker);
        assert_eq!(m.active_realm(), RealmId::Light);
        assert_eq!(player.respawns.len(), 1);
        assert!(!m.timer().is_running());
    }

    #[test]
    fn test_expiry_without_respawn_handler_still_switches() {
        let mut m = machine_with(LevelConfig {
            survival_duration: 0.1,
            ..LevelConfig::default()
        });
        let mut scene = Scene::default();
        m.toggle().unwrap();
        for _ in 0..300 {
            m.tick(DT, &mut FrameContext::new(&mut scene));
        }
        assert_eq!(m.active_realm(), RealmId::Light);
    }

    #[test]
    fn test_force_current_realm_is_noop() {
        let mut m = machine();
        let mut scene = Scene::default();
        let mut player = Player::default();
        let mut speaker = Speaker::default();
        assert_eq!(
            m.force_switch(RealmId::Light).unwrap(),
            SwitchOutcome::AlreadyActive
        );
        assert!(!m.is_transitioning());
        ticks(&mut m, 10, &mut scene, &mut player, &mut speaker);
        assert_eq!(scene.writes, 0);
        assert!(speaker.played.is_empty());
    }

    #[test]
    fn test_audio_once_per_completed_switch() {
        let mut m = machine();
        let mut scene = Scene::default();
        let mut player = Player::default();
        let mut speaker = Speaker::default();
        m.toggle().unwrap();
        ticks(&mut m, 30, &mut scene, &mut player, &mut speaker);
        assert!(speaker.played.is_empty());
        ticks(&mut m, 40, &mut scene, &mut player, &mut speaker);
        assert_eq!(speaker.played, vec!["realm_shift".to_string()]);
        m.toggle().unwrap();
        ticks(&mut m, 70, &mut scene, &mut player, &mut speaker);
        assert_eq!(speaker.played.len(), 2);
    }

    #[test]
    fn test_zero_duration_completes_in_one_tick() {
        let mut m = machine_with(LevelConfig {
            transition_duration: 0.0,
            ..LevelConfig::default()
        });
        let mut scene = Scene::default();
        m.force_switch(RealmId::Dark).unwrap();
        let report = m.tick(DT, &mut FrameContext::new(&mut scene));
        let frame = report.transition.unwrap();
        assert!(frame.first && frame.finished);
        assert_eq!(m.active_realm(), RealmId::Dark);
        assert_eq!(scene.value(20), 0.0);
        assert_eq!(scene.value(10), 1.0);
        let report = m.tick(DT, &mut FrameContext::new(&mut scene));
        assert!(report.timer_started);
    }

    #[test]
    fn test_empty_dissolve_sets_still_switch() {
        let mut m = DimensionMachine::new(
            LevelConfig::default(),
            ActivationStore::new(Some(LIGHT_ROOT), Some(DARK_ROOT)),
            DissolveSet::empty(),
            DissolveSet::empty(),
        );
        let mut scene = Scene::default();
        m.toggle().unwrap();
        for _ in 0..61 {
            m.tick(DT, &mut FrameContext::new(&mut scene));
        }
        assert_eq!(m.active_realm(), RealmId::Dark);
        assert_eq!(scene.writes, 0);
        assert!(scene.is_active(DARK_ROOT));
        assert!(!scene.is_active(LIGHT_ROOT));
    }

    #[test]
    fn test_died_in_dark_returns_home() {
        let mut m = machine();
        let mut scene = Scene::default();
        let mut player = Player::default();
        let mut speaker = Speaker::default();
        run_to_dark(&mut m, &mut scene, &mut player, &mut speaker);

        player.died_in = Some(RealmId::Dark);
        let outcome = {
            let mut ctx = FrameContext::new(&mut scene).with_respawn(&mut player);
            m.player_died(RespawnReason::Hazard, &mut ctx).unwrap()
        };
        assert_eq!(
            outcome,
            SwitchOutcome::Started {
                from: RealmId::Dark,
                to: RealmId::Light
            }
        );
        assert_eq!(player.respawns, vec![RespawnReason::Hazard]);
        assert!(!m.timer().is_running());
    }

    #[test]
    fn test_died_in_home_realm_no_switch() {
        let mut m = machine();
        let mut scene = Scene::default();
        let mut player = Player {
            died_in: Some(RealmId::Light),
            ..Player::default()
        };
        let outcome = {
            let mut ctx = FrameContext::new(&mut scene).with_respawn(&mut player);
            m.player_died(RespawnReason::Fell, &mut ctx).unwrap()
        };
        assert_eq!(outcome, SwitchOutcome::AlreadyActive);
        assert!(!m.is_transitioning());
        assert_eq!(player.respawns, vec![RespawnReason::Fell]);
    }

    #[test]
    fn test_died_without_handler_uses_active_realm() {
        let mut m = machine_with(LevelConfig {
            initial_realm: RealmId::Dark,
            ..LevelConfig::default()
        });
        let mut scene = Scene::default();
        let outcome = m
            .player_died(RespawnReason::Enemy, &mut FrameContext::new(&mut scene))
            .unwrap();
        assert!(matches!(outcome, SwitchOutcome::Started { to: RealmId::Light, .. }));
    }

    #[test]
    fn test_died_mid_switch_returns_home_after_landing() {
        let mut m = machine();
        let mut scene = Scene::default();
        let mut player = Player::default();
        let mut speaker = Speaker::default();
        m.toggle().unwrap();
        ticks(&mut m, 30, &mut scene, &mut player, &mut speaker);

        player.died_in = Some(RealmId::Dark);
        let outcome = {
            let mut ctx = FrameContext::new(&mut scene).with_respawn(&mut player);
            m.player_died(RespawnReason::Hazard, &mut ctx).unwrap()
        };
        assert_eq!(outcome, SwitchOutcome::Ignored);
        assert_eq!(m.pending_home(), Some(RealmId::Light));

        for _ in 0..7200 {
            ticks(&mut m, 1, &mut scene, &mut player, &mut speaker);
            assert!(!m.timer().is_running());
        }
        assert_eq!(m.active_realm(), RealmId::Light);
        assert!(!m.is_transitioning());
        assert_eq!(m.pending_home(), None);
        assert_eq!(player.respawns, vec![RespawnReason::Hazard]);
        assert_eq!(scene.value(10), 0.0);
        assert_eq!(scene.value(20), 1.0);
        assert!(scene.is_active(LIGHT_ROOT));
        assert!(!scene.is_active(DARK_ROOT));
    }

    #[test]
    fn test_died_while_heading_home_queues_nothing() {
        let mut m = machine();
        let mut scene = Scene::default();
        let mut player = Player::default();
        let mut speaker = Speaker::default();
        run_to_dark(&mut m, &mut scene, &mut player, &mut speaker);
        m.toggle().unwrap();
        ticks(&mut m, 10, &mut scene, &mut player, &mut speaker);

        player.died_in = Some(RealmId::Dark);
        let outcome = {
            let mut ctx = FrameContext::new(&mut scene).with_respawn(&mut player);
            m.player_died(RespawnReason::Enemy, &mut ctx).unwrap()
        };
        assert_eq!(outcome, SwitchOutcome::Ignored);
        assert_eq!(m.pending_home(), None);
        ticks(&mut m, 60, &mut scene, &mut player, &mut speaker);
        assert_eq!(m.active_realm(), RealmId::Light);
        assert!(!m.is_transitioning());
    }

    #[test]
    fn test_initialize_blank_parameter_writes_nothing() {
        let mut m = machine_with(LevelConfig {
            dissolve_parameter: String::new(),
            ..LevelConfig::default()
        });
        let mut scene = Scene::default();
        let err = m.initialize(&mut FrameContext::new(&mut scene)).unwrap_err();
        assert_eq!(err, ConfigurationError::MissingDissolveParameter);
        assert_eq!(scene.writes, 0);
        assert!(scene.active.is_empty());

        assert_eq!(m.toggle(), Err(ConfigurationError::MissingDissolveParameter));
        assert!(!m.is_transitioning());
    }

    #[test]
    fn test_invalid_duration_blocks_switch() {
        let mut m = machine_with(LevelConfig {
            transition_duration: f32::NAN,
            ..LevelConfig::default()
        });
        assert!(matches!(
            m.force_switch(RealmId::Dark),
            Err(ConfigurationError::InvalidDuration {
                field: "transition_duration",
                ..
            })
        ));
        assert!(!m.is_transitioning());
        assert_eq!(m.active_realm(), RealmId::Light);
    }
}
