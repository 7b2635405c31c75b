//! Presentation-layer contract
//!
//! The simulation never calls into the UI. It queues [`GameEvent`]s, and
//! the host drains them into a [`UiSink`] once per frame. Player decisions
//! travel back as [`Command`](crate::sim::Command)s.

use crate::persistence::Progress;
use crate::sim::{GameEvent, HintKind, StatsSnapshot, TechFlags};

/// What a presentation layer must be able to show
pub trait UiSink {
    /// Level-up shop; answer with `Command::ChooseUpgrade`
    fn display_shop_modal(&mut self);
    /// Pause menu; answer with `Command::Resume` or `Command::Restart`
    fn display_pause_menu(&mut self, stats: &StatsSnapshot);
    /// Tech tree; answer with `Command::UnlockTech` or `Command::CloseTechTree`
    fn show_tech_tree_modal(&mut self, flags: &TechFlags);
    fn update_experience_bar(&mut self, current: u32, max: u32);
    fn display_level(&mut self, level: u32, pop: bool);
    fn display_game_over_screen(&mut self, level: u32);
    fn update_plasma_ui(&mut self, count: u32);

    /// Tech tree entry point is offered only while plasma is owned
    fn set_tech_tree_button_visible(&mut self, _visible: bool) {}
    fn show_hint(&mut self, _kind: HintKind, _duration_ms: f64) {}
    /// Any open modal should close; the game is running again
    fn hide_modals(&mut self) {}
    fn ship_destroyed(&mut self) {}
}

/// Feed queued events to a sink.
///
/// Returns the newest progress snapshot among the events, which the host
/// should persist.
pub fn dispatch(events: Vec<GameEvent>, sink: &mut dyn UiSink) -> Option<Progress> {
    let mut to_save = None;
    for event in events {
        match event {
            GameEvent::ShopOpened => sink.display_shop_modal(),
            GameEvent::PauseMenu(stats) => sink.display_pause_menu(&stats),
            GameEvent::Resumed => sink.hide_modals(),
            GameEvent::TechTreeOpened(flags) => sink.show_tech_tree_modal(&flags),
            GameEvent::ExperienceChanged { current, max } => {
                sink.update_experience_bar(current, max)
            }
            GameEvent::LevelChanged { level, pop } => sink.display_level(level, pop),
            GameEvent::PlasmaChanged(count) => {
                sink.update_plasma_ui(count);
                sink.set_tech_tree_button_visible(count > 0);
            }
            GameEvent::ProgressChanged(progress) => to_save = Some(progress),
            GameEvent::Hint { kind, duration_ms } => sink.show_hint(kind, duration_ms),
            GameEvent::ShipDestroyed => sink.ship_destroyed(),
            GameEvent::GameOver { level } => sink.display_game_over_screen(level),
        }
    }
    to_save
}

/// Sink that narrates to the log; used by the headless runner
#[derive(Debug, Default)]
pub struct LogUi {
    pub shop_opened: u32,
    pub game_over_level: Option<u32>,
}

impl UiSink for LogUi {
    fn display_shop_modal(&mut self) {
        self.shop_opened += 1;
        log::info!("Shop opened");
    }

    fn display_pause_menu(&mut self, stats: &StatsSnapshot) {
        log::info!("Paused: {:?}", stats);
    }

    fn show_tech_tree_modal(&mut self, flags: &TechFlags) {
        log::info!("Tech tree: {:?}", flags);
    }

    fn update_experience_bar(&mut self, current: u32, max: u32) {
        log::debug!("XP {}/{}", current, max);
    }

    fn display_level(&mut self, level: u32, _pop: bool) {
        log::info!("Level {}", level);
    }

    fn display_game_over_screen(&mut self, level: u32) {
        self.game_over_level = Some(level);
        log::info!("GAME OVER - level {}", level);
    }

    fn update_plasma_ui(&mut self, count: u32) {
        log::info!("Plasma: {}", count);
    }

    fn show_hint(&mut self, kind: HintKind, duration_ms: f64) {
        log::info!("Hint {:?} for {} ms", kind, duration_ms);
    }
}
