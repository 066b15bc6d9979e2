//! Bubble Pop entry point
//!
//! Handles platform-specific initialization and runs the animation loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlImageElement, HtmlInputElement, MouseEvent, TouchEvent};

    use bubble_pop::audio::{AudioManager, SoundEffect};
    use bubble_pop::consts::*;
    use bubble_pop::renderer::Canvas2dRenderer;
    use bubble_pop::sim::{GameEvent, GameState, TickInput, tick, to_canvas_space};
    use bubble_pop::{Roster, Settings};

    /// App instance holding all state
    struct App {
        state: GameState,
        renderer: Option<Canvas2dRenderer>,
        audio: AudioManager,
        roster: Roster,
        settings: Settings,
        input: TickInput,
        accumulator: f32,
        last_time: f64,
    }

    impl App {
        fn new(seed: u64, canvas_size: Vec2, roster: Roster, settings: Settings) -> Self {
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);
            Self {
                state: GameState::new(seed, canvas_size, roster.names()),
                renderer: None,
                audio,
                roster,
                settings,
                input: TickInput::default(),
                accumulator: 0.0,
                last_time: 0.0,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.taps.clear();
                self.input.toggle_calm = false;
                self.input.toggle_star = false;

                self.audio.set_calm(self.state.mode.calm);
                for event in self.state.drain_events() {
                    match event {
                        GameEvent::Popped { family_idx } => self.audio.play(SoundEffect::Pop {
                            family: family_idx.is_some(),
                        }),
                        GameEvent::NameRevealed { .. } => self.audio.play(SoundEffect::NameChime),
                        GameEvent::Spawned { .. } => {}
                    }
                }
            }
        }

        /// Render the current frame
        fn render(&self) {
            if let Some(ref renderer) = self.renderer {
                if let Err(e) = renderer.render(&self.state, &self.roster) {
                    log::warn!("Render error: {:?}", e);
                }
            }
        }

        /// Reflect mode toggles onto the mode buttons
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(btn) = document.get_element_by_id("calm-btn") {
                let class = if self.state.mode.calm {
                    "mode-btn active"
                } else {
                    "mode-btn"
                };
                let _ = btn.set_attribute("class", class);
            }
            if let Some(btn) = document.get_element_by_id("star-btn") {
                let class = if self.state.mode.star {
                    "mode-btn active"
                } else {
                    "mode-btn"
                };
                let _ = btn.set_attribute("class", class);
            }
        }
    }

    /// Convert a client coordinate to canvas backing-store pixels
    fn tap_point(canvas: &HtmlCanvasElement, client_x: f32, client_y: f32) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        to_canvas_space(
            Vec2::new(client_x, client_y),
            Vec2::new(rect.left() as f32, rect.top() as f32),
            Vec2::new(rect.width() as f32, rect.height() as f32),
            Vec2::new(canvas.width() as f32, canvas.height() as f32),
        )
    }

    /// Size the canvas backing store to its CSS box at device resolution
    fn fit_canvas(canvas: &HtmlCanvasElement) -> Vec2 {
        let window = web_sys::window().unwrap();
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width.max(1));
        canvas.set_height(height.max(1));
        Vec2::new(canvas.width() as f32, canvas.height() as f32)
    }

    /// Roster override from the hosting page, if present
    fn page_roster(document: &web_sys::Document) -> Option<Roster> {
        let json = document.get_element_by_id("roster")?.text_content()?;
        match Roster::from_json(&json) {
            Ok(roster) => Some(roster),
            Err(e) => {
                log::warn!("Page roster is malformed ({e}), using the embedded one");
                None
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Bubble Pop starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let canvas_size = fit_canvas(&canvas);
        let roster = page_roster(&document).unwrap_or_else(Roster::embedded);
        let mut settings = Settings::default();
        settings.reduced_motion = window
            .match_media("(prefers-reduced-motion: reduce)")
            .ok()
            .flatten()
            .map(|mq| mq.matches())
            .unwrap_or(false);
        let reduced_motion = settings.reduced_motion;

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(
            seed,
            canvas_size,
            roster.clone(),
            settings,
        )));
        log::info!(
            "Initialized with seed {} and {} roster members",
            seed,
            roster.len()
        );

        match Canvas2dRenderer::new(canvas.clone(), &roster) {
            Ok(mut renderer) => {
                renderer.set_reduced_motion(reduced_motion);
                app.borrow_mut().renderer = Some(renderer);
            }
            Err(e) => log::error!("Failed to create renderer: {:?}", e),
        }

        setup_input_handlers(&canvas, app.clone());
        setup_mode_buttons(app.clone());
        setup_photo_input(app.clone());
        setup_install_prompt();
        setup_mute_on_blur(app.clone());
        setup_resize(canvas.clone(), app.clone());

        request_animation_frame(app);

        log::info!("Bubble Pop running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Touch - every changed touch is its own tap
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                a.audio.resume();
                let touches = event.changed_touches();
                for i in 0..touches.length() {
                    if let Some(touch) = touches.get(i) {
                        let p = tap_point(
                            &canvas_clone,
                            touch.client_x() as f32,
                            touch.client_y() as f32,
                        );
                        a.input.taps.push(p);
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                a.audio.resume();
                let p = tap_point(
                    &canvas_clone,
                    event.client_x() as f32,
                    event.client_y() as f32,
                );
                a.input.taps.push(p);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_mode_buttons(app: Rc<RefCell<App>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        if let Some(btn) = document.get_element_by_id("calm-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().input.toggle_calm = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("star-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().input.toggle_star = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// A photo picked by the user becomes the fallback for roster slots whose
    /// file never loads (useful when the page is hosted without photos).
    fn setup_photo_input(app: Rc<RefCell<App>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        let Some(input) = document
            .get_element_by_id("photo-input")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };

        let input_clone = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(file) = input_clone.files().and_then(|files| files.get(0)) else {
                return;
            };
            let Ok(url) = web_sys::Url::create_object_url_with_blob(&file) else {
                log::warn!("Could not create object URL for the chosen photo");
                return;
            };
            match HtmlImageElement::new() {
                Ok(img) => {
                    img.set_src(&url);
                    if let Some(renderer) = app.borrow_mut().renderer.as_mut() {
                        renderer.set_fallback_image(img);
                        log::info!("Fallback photo installed");
                    }
                }
                Err(e) => log::warn!("Could not create image element: {:?}", e),
            }
        });
        let _ = input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Wire the install button to the browser's deferred install prompt
    fn setup_install_prompt() {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();
        let deferred: Rc<RefCell<Option<web_sys::Event>>> = Rc::new(RefCell::new(None));

        {
            let deferred = deferred.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                event.prevent_default();
                *deferred.borrow_mut() = Some(event);
                let document = web_sys::window().unwrap().document().unwrap();
                if let Some(btn) = document.get_element_by_id("install-btn") {
                    let _ = btn.set_attribute("class", "mode-btn");
                }
            });
            let _ = window.add_event_listener_with_callback(
                "beforeinstallprompt",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("install-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let Some(event) = deferred.borrow_mut().take() else {
                    return;
                };
                // BeforeInstallPromptEvent has no web-sys binding; call
                // prompt() through reflection
                if let Ok(prompt) = js_sys::Reflect::get(event.as_ref(), &"prompt".into())
                    && let Ok(prompt) = prompt.dyn_into::<js_sys::Function>()
                {
                    let _ = prompt.call0(event.as_ref());
                }
                let document = web_sys::window().unwrap().document().unwrap();
                if let Some(btn) = document.get_element_by_id("install-btn") {
                    let _ = btn.set_attribute("class", "mode-btn hidden");
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_mute_on_blur(app: Rc<RefCell<App>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut a = app.borrow_mut();
            if !a.settings.mute_on_blur {
                return;
            }
            let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
            a.audio.set_muted(hidden);
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(canvas: HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let size = fit_canvas(&canvas);
            app.borrow_mut().state.resize(size);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            app_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn app_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();

            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            a.last_time = time;

            a.update(dt);
            a.render();
            a.update_hud();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec2;

    use bubble_pop::Roster;
    use bubble_pop::sim::{GameEvent, GameState, TickInput, tick};

    env_logger::init();
    log::info!("Bubble Pop (native) starting...");
    log::info!("Native mode is a headless demo - run with `trunk serve` for the web version");

    let roster = Roster::embedded();
    let mut state = GameState::new(42, Vec2::new(800.0, 600.0), roster.names());

    // Scripted session: tap a drifting diagonal every half second
    let mut pops = 0u32;
    for i in 0..600u64 {
        let mut input = TickInput::default();
        if i % 30 == 0 {
            input.taps.push(Vec2::new(
                (i * 7 % 700) as f32 + 50.0,
                (i * 11 % 500) as f32 + 50.0,
            ));
        }
        tick(&mut state, &input);
        for event in state.drain_events() {
            if let GameEvent::Popped { family_idx } = event {
                pops += 1;
                if family_idx.is_some() {
                    log::info!("Family bubble popped!");
                }
            }
        }
    }

    log::info!(
        "After 10 simulated seconds: score {}, {} pops, {} bubbles on screen",
        state.score,
        pops,
        state.bubbles.len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
