//! Space Ship Idle entry point
//!
//! Native: a headless autopilot session that logs what happens.
//! Web: keyboard/touch input, LocalStorage progress and a DOM text HUD
//! around the same simulation tick.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, KeyboardEvent, MouseEvent, TouchEvent};

    use space_ship_idle::persistence::Progress;
    use space_ship_idle::platform::{FrameClock, InputState, KeyValueStore, LocalStore, TouchSample};
    use space_ship_idle::sim::{
        Command, GamePhase, GameState, HintKind, PauseReason, StatsSnapshot, TechFlags, TechKind,
        UpgradeKind, tick,
    };
    use space_ship_idle::tuning::Tuning;
    use space_ship_idle::ui::{UiSink, dispatch};

    /// HUD and modals rendered as plain text into existing elements
    struct DomUi {
        document: Document,
    }

    impl DomUi {
        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_visible(&self, id: &str, visible: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let classes = el.class_list();
                let _ = if visible {
                    classes.remove_1("hidden")
                } else {
                    classes.add_1("hidden")
                };
            }
        }
    }

    impl UiSink for DomUi {
        fn display_shop_modal(&mut self) {
            self.set_text("shop-modal", "Level up! [1] Magnet  [2] Laser  [3] Speed");
            self.set_visible("shop-modal", true);
        }

        fn display_pause_menu(&mut self, stats: &StatsSnapshot) {
            let text = format!(
                "Paused - level {}, {} kills, {} XP, {} plasma, {:.0}s  [Esc] resume  [R] restart",
                stats.level,
                stats.kills,
                stats.xp_collected,
                stats.plasma,
                stats.time_survived_ms / 1000.0
            );
            self.set_text("pause-menu", &text);
            self.set_visible("pause-menu", true);
        }

        fn show_tech_tree_modal(&mut self, flags: &TechFlags) {
            let entries: Vec<String> = TechKind::ALL
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    let mark = if flags.has(*t) { "x" } else { " " };
                    format!("[{}] {} ({})", i + 1, t.storage_key(), mark)
                })
                .collect();
            self.set_text("tech-tree-modal", &entries.join("  "));
            self.set_visible("tech-tree-modal", true);
        }

        fn update_experience_bar(&mut self, current: u32, max: u32) {
            self.set_text("xp", &format!("XP {}/{}", current, max));
        }

        fn display_level(&mut self, level: u32, _pop: bool) {
            self.set_text("level", &format!("Level {}", level));
        }

        fn display_game_over_screen(&mut self, level: u32) {
            self.set_text("game-over", &format!("Game over at level {}  [R] restart", level));
            self.set_visible("game-over", true);
        }

        fn update_plasma_ui(&mut self, count: u32) {
            self.set_text("plasma", &format!("Plasma {}", count));
        }

        fn set_tech_tree_button_visible(&mut self, visible: bool) {
            self.set_visible("tech-tree-btn", visible);
        }

        fn show_hint(&mut self, kind: HintKind, _duration_ms: f64) {
            let text = match kind {
                HintKind::EliteSpotted => "Elite enemy incoming!",
                HintKind::WaveIncoming => "Enemy wave incoming!",
            };
            self.set_text("hint", text);
            self.set_visible("hint", true);
        }

        fn hide_modals(&mut self) {
            for id in ["shop-modal", "pause-menu", "tech-tree-modal", "game-over"] {
                self.set_visible(id, false);
            }
        }
    }

    struct Game {
        state: GameState,
        input: InputState,
        clock: FrameClock,
        store: Option<LocalStore>,
        ui: DomUi,
    }

    impl Game {
        fn frame(&mut self, time: f64) {
            for _ in 0..self.clock.advance(time) {
                let input = self.input.snapshot();
                tick(&mut self.state, &input);
            }
            self.flush_events();
        }

        fn flush_events(&mut self) {
            let events = self.state.drain_events();
            if let Some(progress) = dispatch(events, &mut self.ui)
                && let Some(store) = self.store.as_mut()
                && let Err(e) = progress.save(store)
            {
                log::warn!("Could not save progress: {}", e);
            }
        }

        fn command(&mut self, command: Command) {
            if let Err(e) = self.state.apply_command(command) {
                log::warn!("{}", e);
            }
            self.flush_events();
        }
    }

    /// Keys that answer modals rather than steer the ship
    fn command_for_key(phase: GamePhase, key: &str) -> Option<Command> {
        let digit = key.parse::<usize>().ok().and_then(|d| d.checked_sub(1));
        match phase {
            GamePhase::Paused(PauseReason::Shop) => {
                let choices = [UpgradeKind::Magnet, UpgradeKind::Laser, UpgradeKind::Speed];
                digit
                    .and_then(|i| choices.get(i))
                    .map(|k| Command::ChooseUpgrade(*k))
            }
            GamePhase::Paused(PauseReason::TechTree) => match key {
                "Escape" | "t" | "T" => Some(Command::CloseTechTree),
                _ => digit
                    .and_then(|i| TechKind::ALL.get(i))
                    .map(|t| Command::UnlockTech(*t)),
            },
            GamePhase::Running | GamePhase::Paused(PauseReason::Menu) if key == "t" || key == "T" => {
                Some(Command::OpenTechTree)
            }
            GamePhase::Paused(PauseReason::Menu) | GamePhase::GameOver
                if key == "r" || key == "R" =>
            {
                Some(Command::Restart)
            }
            _ => None,
        }
    }

    fn touch_samples(event: &TouchEvent) -> Vec<TouchSample> {
        let list = event.changed_touches();
        (0..list.length())
            .filter_map(|i| list.get(i))
            .map(|t| TouchSample {
                identifier: t.identifier(),
                client: Some(Vec2::new(t.client_x() as f32, t.client_y() as f32)),
            })
            .collect()
    }

    /// Inner window size, if the browser reports one
    fn window_size(window: &web_sys::Window) -> Option<Vec2> {
        let width = window.inner_width().ok()?.as_f64()?;
        let height = window.inner_height().ok()?.as_f64()?;
        Some(Vec2::new(width as f32, height as f32))
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {}", e).into());
        }
        log::info!("Space Ship Idle starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        let store = LocalStore::open();
        if store.is_none() {
            log::warn!("LocalStorage unavailable; progress will not be kept");
        }
        let progress = store
            .as_ref()
            .map(|s| Progress::load(s as &dyn KeyValueStore))
            .unwrap_or_default();

        let viewport = window_size(&window).unwrap_or(Vec2::new(1280.0, 720.0));
        let seed = js_sys::Date::now() as u64;
        let mut state = GameState::with_viewport(seed, Tuning::default(), progress, viewport);
        state.emit(space_ship_idle::sim::GameEvent::PlasmaChanged(progress.plasma));
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            state,
            input: InputState::new(),
            clock: FrameClock::new(),
            store,
            ui: DomUi {
                document: document.clone(),
            },
        }));

        setup_keyboard(&window, game.clone());
        setup_mouse(&window, game.clone());
        setup_touch(&document, game.clone());
        setup_auto_pause(&window, &document, game.clone());
        setup_resize(&window, game.clone());
        request_animation_frame(game);
    }

    fn setup_keyboard(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                if let Some(command) = command_for_key(g.state.phase, &key) {
                    g.command(command);
                    event.prevent_default();
                    return;
                }
                if g.input.key_down(&key, &event.code()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.key(), &event.code());
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_mouse(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        for (name, pressed) in [("mousedown", true), ("mouseup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut().input.mouse_button(event.button(), pressed);
            });
            let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_touch(document: &Document, game: Rc<RefCell<Game>>) {
        if let Some(base) = document.get_element_by_id("joystick") {
            {
                let game = game.clone();
                let base_el = base.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                    let first = touch_samples(&event).into_iter().next();
                    let rect = base_el.get_bounding_client_rect();
                    let origin = Some(Vec2::new(rect.left() as f32, rect.top() as f32));
                    game.borrow_mut().input.joystick_start(first, origin);
                    event.prevent_default();
                });
                let _ = base
                    .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
                closure.forget();
            }
            {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                    game.borrow_mut().input.joystick_move(&touch_samples(&event));
                    event.prevent_default();
                });
                let _ = base
                    .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
                closure.forget();
            }
            {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                    game.borrow_mut().input.joystick_end(&touch_samples(&event));
                });
                let _ = base
                    .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
                closure.forget();
            }
            {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                    game.borrow_mut().input.joystick_cancel();
                });
                let _ = base.add_event_listener_with_callback(
                    "touchcancel",
                    closure.as_ref().unchecked_ref(),
                );
                closure.forget();
            }
        }

        if let Some(btn) = document.get_element_by_id("shoot-btn") {
            for (name, pressed) in [("touchstart", true), ("touchend", false)] {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                    event.prevent_default();
                    game.borrow_mut().input.shoot_button(pressed);
                });
                let _ = btn.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn setup_auto_pause(window: &web_sys::Window, document: &Document, game: Rc<RefCell<Game>>) {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    if g.state.is_running() {
                        g.input.request_pause();
                        log::info!("Auto-paused (tab hidden)");
                    }
                } else {
                    g.clock.reset();
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.state.is_running() {
                    g.input.request_pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        let window_clone = window.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if let Some(viewport) = window_size(&window_clone) {
                game.borrow_mut().state.resize(viewport);
                log::info!("Viewport resized to {}x{}", viewport.x, viewport.y);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game.borrow_mut().frame(time);
            request_animation_frame(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use space_ship_idle::persistence::Progress;
    use space_ship_idle::platform::MemoryStore;
    use space_ship_idle::sim::{
        Command, GamePhase, GameState, PauseReason, TechKind, TickInput, UpgradeKind, tick,
    };
    use space_ship_idle::tuning::Tuning;
    use space_ship_idle::ui::{LogUi, dispatch};

    /// Play one autopilot session and return the final state
    pub fn run(seed: u64, max_ticks: u64, tuning: Tuning) -> GameState {
        let mut store = MemoryStore::new();
        let progress = Progress::load(&store);
        let mut state = GameState::new(seed, tuning, progress);
        let mut ui = LogUi::default();
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        for _ in 0..max_ticks {
            tick(&mut state, &input);

            match state.phase {
                GamePhase::Paused(PauseReason::Shop) => {
                    let choice = match state.level % 3 {
                        0 => UpgradeKind::Magnet,
                        1 => UpgradeKind::Speed,
                        _ => UpgradeKind::Laser,
                    };
                    apply(&mut state, Command::ChooseUpgrade(choice));
                }
                GamePhase::Running => buy_affordable_tech(&mut state),
                _ => {}
            }

            if let Some(progress) = dispatch(state.drain_events(), &mut ui)
                && let Err(e) = progress.save(&mut store)
            {
                log::warn!("Could not save progress: {}", e);
            }
            if state.phase == GamePhase::GameOver {
                break;
            }
        }

        log::info!(
            "Session over: level {}, {} kills, {} XP, {} plasma, {:.1}s simulated, {} shops",
            state.level,
            state.kills,
            state.xp_collected,
            state.progression.plasma,
            state.time_ms / 1000.0,
            ui.shop_opened
        );
        state
    }

    fn apply(state: &mut GameState, command: Command) {
        if let Err(e) = state.apply_command(command) {
            log::warn!("{}", e);
        }
    }

    fn buy_affordable_tech(state: &mut GameState) {
        let costs = &state.tuning.tech_costs;
        let Some(tech) = TechKind::ALL
            .into_iter()
            .find(|t| !state.progression.tech.has(*t) && state.progression.plasma >= t.cost(costs))
        else {
            return;
        };
        apply(state, Command::OpenTechTree);
        apply(state, Command::UnlockTech(tech));
        apply(state, Command::CloseTechTree);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Space Ship Idle (native, headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let max_ticks = args.next().and_then(|s| s.parse().ok()).unwrap_or(60 * 60 * 5);
    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| space_ship_idle::Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Ignoring tuning file {}: {}", path, e);
                space_ship_idle::Tuning::default()
            }
        },
        None => space_ship_idle::Tuning::default(),
    };

    log::info!("Seed {}, up to {} ticks", seed, max_ticks);
    headless::run(seed, max_ticks, tuning);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
