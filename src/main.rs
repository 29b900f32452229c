//! Lumen Scenes entry point
//!
//! wasm: binds the animator to requestAnimationFrame and DOM input.
//! native: runs a headless preview of a scene and logs frame summaries.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use lumen_scenes::platform::{FrameClock, ScrollTracker, client_to_ndc};
    use lumen_scenes::renderer::InstancedRenderState;
    use lumen_scenes::{Animator, QualityPreset, RenderError, Scene, SceneKind, Settings};

    /// Page-level state shared by the rAF chain and event listeners
    struct App {
        kind: SceneKind,
        settings: Settings,
        animator: Animator,
        clock: FrameClock,
        scroll: ScrollTracker,
        /// Raw pointer in NDC, smoothed by the animator
        pointer: Vec2,
        render_state: Option<InstancedRenderState>,
    }

    impl App {
        fn new(kind: SceneKind, settings: Settings) -> Self {
            let animator = Animator::new(Scene::build(kind, &settings), &settings);
            Self {
                kind,
                settings,
                animator,
                clock: FrameClock::new(),
                scroll: ScrollTracker::new(),
                pointer: Vec2::ZERO,
                render_state: None,
            }
        }

        fn frame(&mut self, time: f64) {
            let (dt, seconds) = self.clock.tick(time);
            let scroll = if self.kind.scroll_driven() {
                read_scroll(&mut self.scroll, dt)
            } else {
                None
            };
            self.animator.advance(dt, seconds, self.pointer, scroll);
            self.render();
        }

        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(self.animator.frame(), &self.settings) {
                    Ok(_) => {
                        if !self.animator.resources().all_keys_ready() {
                            render_state.register_resources(self.animator.resources_mut());
                        }
                    }
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        log::warn!("Surface lost, reconfiguring");
                        render_state.release_resources(self.animator.resources_mut());
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        fn toggle_core(&mut self) -> bool {
            self.animator.toggle_core();
            let active = self.animator.core().is_active();
            log::info!("Core {}", if active { "active" } else { "idle" });
            active
        }

        /// Rebuild the scene at the next quality preset and persist it
        fn cycle_quality(&mut self) {
            self.settings.quality = match self.settings.quality {
                QualityPreset::Low => QualityPreset::Medium,
                QualityPreset::Medium => QualityPreset::High,
                QualityPreset::High => QualityPreset::Low,
            };
            self.settings.save();

            let core_active = self.animator.core().is_active();
            let resources = self.animator.resources().clone();
            self.animator = Animator::new(Scene::build(self.kind, &self.settings), &self.settings);
            *self.animator.resources_mut() = resources;
            self.animator.set_core_active(core_active);
            log::info!("Quality set to {}", self.settings.quality.as_str());
        }
    }

    /// Document scroll as a normalized offset, `None` if the DOM is unavailable
    fn read_scroll(tracker: &mut ScrollTracker, dt: f32) -> Option<lumen_scenes::anim::ScrollState> {
        let window = web_sys::window()?;
        let element = window.document()?.document_element()?;
        let scroll_top = window.scroll_y().ok()? as f32;
        let viewport = window.inner_height().ok()?.as_f64()? as f32;
        let content = element.scroll_height() as f32;
        Some(tracker.update(scroll_top, content, viewport, dt))
    }

    fn prefers_reduced_motion(window: &web_sys::Window) -> bool {
        window
            .match_media("(prefers-reduced-motion: reduce)")
            .ok()
            .flatten()
            .is_some_and(|mq| mq.matches())
    }

    /// Size the canvas backing store to its CSS size times the pixel ratio
    fn fit_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    async fn init_renderer(
        canvas: &HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Result<InstancedRenderState, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        InstancedRenderState::new(surface, &adapter, width, height).await
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Lumen scenes starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let (width, height) = fit_canvas(&window, &canvas);

        let mut settings = Settings::load();
        if prefers_reduced_motion(&window) {
            settings.reduced_motion = true;
        }
        let kind = canvas
            .get_attribute("data-scene")
            .and_then(|s| SceneKind::from_str(&s))
            .unwrap_or_default();

        let app = Rc::new(RefCell::new(App::new(kind, settings)));

        match init_renderer(&canvas, width, height).await {
            Ok(render_state) => {
                let mut a = app.borrow_mut();
                render_state.register_resources(a.animator.resources_mut());
                a.render_state = Some(render_state);
            }
            // The animator keeps running; unready resources are skipped
            Err(e) => log::error!("Rendering unavailable: {e}"),
        }

        setup_input_handlers(&canvas, app.clone());
        setup_core_toggle(app.clone());
        setup_resize(canvas, app.clone());

        request_animation_frame(app);

        log::info!("Lumen scenes running: {}", kind.as_str());
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Pointer position relative to the canvas
        {
            let app = app.clone();
            let canvas = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let rect = canvas.get_bounding_client_rect();
                let x = event.client_x() as f32 - rect.left() as f32;
                let y = event.client_y() as f32 - rect.top() as f32;
                app.borrow_mut().pointer =
                    client_to_ndc(x, y, rect.width() as f32, rect.height() as f32);
            });
            let _ = window
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer gone: ease back to the centre
        if let Some(root) = window.document().and_then(|d| d.document_element()) {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().pointer = Vec2::ZERO;
            });
            let _ = root
                .add_event_listener_with_callback("pointerleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard: space toggles the core, Q cycles quality
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                match event.code().as_str() {
                    "Space" => {
                        event.prevent_default();
                        let active = app.borrow_mut().toggle_core();
                        sync_toggle_button(active);
                    }
                    "KeyQ" => app.borrow_mut().cycle_quality(),
                    _ => {}
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_core_toggle(app: Rc<RefCell<App>>) {
        let document = web_sys::window().and_then(|w| w.document());
        if let Some(btn) = document.and_then(|d| d.get_element_by_id("core-toggle")) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let active = app.borrow_mut().toggle_core();
                sync_toggle_button(active);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn sync_toggle_button(active: bool) {
        let document = web_sys::window().and_then(|w| w.document());
        if let Some(btn) = document.and_then(|d| d.get_element_by_id("core-toggle")) {
            let _ = btn.set_attribute("aria-pressed", if active { "true" } else { "false" });
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (width, height) = fit_canvas(&window, &canvas);
            if let Some(ref mut render_state) = app.borrow_mut().render_state {
                render_state.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod preview {
    use std::path::PathBuf;

    use clap::Parser;
    use glam::{Vec2, Vec3};

    use lumen_scenes::anim::{Frame, ResourceRegistry, ScrollState};
    use lumen_scenes::platform::{FrameClock, ScrollTracker};
    use lumen_scenes::{Animator, ConfigError, QualityPreset, Scene, SceneKind, Settings};

    /// Headless preview of a procedural hero scene
    #[derive(Parser, Debug)]
    #[command(name = "lumen-scenes", version, about)]
    pub struct Args {
        /// Scene to build: particles, assembly or core
        #[arg(long, default_value = "particles")]
        pub scene: String,

        /// Number of frames to simulate
        #[arg(long, default_value_t = 120)]
        pub frames: u32,

        /// Simulated display refresh rate
        #[arg(long, default_value_t = 60.0)]
        pub fps: f64,

        /// Settings JSON file (defaults when omitted)
        #[arg(long)]
        pub settings: Option<PathBuf>,

        /// Quality preset override: low, medium or high
        #[arg(long)]
        pub quality: Option<String>,

        /// Pointer position in NDC
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        pub pointer_x: f32,

        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        pub pointer_y: f32,

        /// Fixed scroll offset; scroll-driven scenes sweep 0..1 when omitted
        #[arg(long)]
        pub scroll: Option<f32>,

        /// Toggle the liquid core at this frame
        #[arg(long)]
        pub toggle_at: Option<u32>,

        /// Log a summary every N frames
        #[arg(long, default_value_t = 30)]
        pub log_every: u32,
    }

    fn load_settings(args: &Args) -> Result<Settings, ConfigError> {
        let mut settings = match &args.settings {
            Some(path) => Settings::load_from_path(path)?,
            None => Settings::default(),
        };
        if let Some(q) = &args.quality {
            settings.quality = QualityPreset::from_str(q).ok_or_else(|| ConfigError::Invalid {
                field: "quality",
                reason: format!("unknown preset `{q}`"),
            })?;
        }
        Ok(settings)
    }

    fn summarize(frame: &Frame) -> (Vec3, f32) {
        if frame.transforms.is_empty() {
            return (Vec3::ZERO, 0.0);
        }
        let n = frame.transforms.len() as f32;
        let centroid = frame
            .transforms
            .iter()
            .map(|t| t.transform.translation)
            .sum::<Vec3>()
            / n;
        let spread = frame
            .transforms
            .iter()
            .map(|t| t.transform.translation.distance(centroid))
            .fold(0.0f32, f32::max);
        (centroid, spread)
    }

    pub fn run(args: Args) -> Result<(), ConfigError> {
        let settings = load_settings(&args)?;
        let kind = SceneKind::from_str(&args.scene).ok_or_else(|| ConfigError::Invalid {
            field: "scene",
            reason: format!("unknown scene `{}`", args.scene),
        })?;

        let mut animator = Animator::new(Scene::build(kind, &settings), &settings);
        *animator.resources_mut() = ResourceRegistry::all_ready();

        let mut clock = FrameClock::new();
        let mut tracker = ScrollTracker::new();
        let pointer = Vec2::new(args.pointer_x, args.pointer_y);
        let frame_ms = 1000.0 / args.fps.max(1.0);
        // Simulated page: five viewports tall
        let (viewport, content) = (1000.0, 5000.0);

        for i in 0..args.frames {
            let (dt, seconds) = clock.tick(i as f64 * frame_ms);

            if args.toggle_at == Some(i) {
                animator.toggle_core();
                log::info!("Frame {i}: core toggled");
            }

            let scroll = match args.scroll {
                Some(offset) => Some(ScrollState::new(offset, 0.0)),
                None if kind.scroll_driven() => {
                    let progress = i as f32 / args.frames.saturating_sub(1).max(1) as f32;
                    Some(tracker.update(progress * (content - viewport), content, viewport, dt))
                }
                None => None,
            };

            let frame = animator.advance(dt, seconds, pointer, scroll);
            if args.log_every > 0 && i % args.log_every == 0 {
                let (centroid, spread) = summarize(frame);
                log::info!(
                    "Frame {i}: t={seconds:.2}s entities={} centroid=({:.3}, {:.3}, {:.3}) spread={spread:.3} camera_z={:.2} explosion={:.2}",
                    frame.transforms.len(),
                    centroid.x,
                    centroid.y,
                    centroid.z,
                    frame.camera.eye.z,
                    frame.explosion,
                );
            }
        }

        let stats = animator.stats();
        println!(
            "{}: {} frames, {} entities, {} fps, {} skipped",
            kind.as_str(),
            stats.frame,
            animator.frame().transforms.len(),
            stats.fps,
            stats.skipped
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    env_logger::init();
    log::info!("Lumen scenes (native preview) starting...");

    let args = preview::Args::parse();
    match preview::run(args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}
