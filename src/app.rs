use crate::config::{CarouselConfig, CarouselConfigOverrides, WindowConfig, DEFAULT_CONFIG_PATH};
use crate::input::InputTranslator;
use crate::picking::ViewportRect;
use crate::session::{CarouselSession, FrameSnapshot};
use crate::time::SessionClock;

use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

pub fn run() -> Result<()> {
    run_with_overrides(CarouselConfigOverrides::default())
}

pub fn run_with_overrides(overrides: CarouselConfigOverrides) -> Result<()> {
    let config_path = overrides.config_path.clone().unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());
    let mut config = CarouselConfig::load_or_default(&config_path);
    if !overrides.is_empty() {
        log::info!("[config] CLI overrides applied: {:?}", overrides.applied_fields());
    }
    config.apply_overrides(&overrides);
    let event_loop = EventLoop::new().context("Failed to create winit event loop")?;
    let mut app = App::new(config)?;
    event_loop.run_app(&mut app).context("Event loop execution failed")?;
    Ok(())
}

/// Window host for the carousel. Drawing belongs to the renderer collaborator, which
/// consumes the `FrameSnapshot` produced here; the heading is mirrored into the title bar.
pub struct App {
    session: CarouselSession,
    input: InputTranslator,
    clock: SessionClock,
    window: Option<Window>,
    window_config: WindowConfig,
    shown_heading: Option<String>,
    should_close: bool,
}

impl App {
    pub fn new(config: CarouselConfig) -> Result<Self> {
        let session = CarouselSession::new(&config)?;
        Ok(Self {
            session,
            input: InputTranslator::new(),
            clock: SessionClock::new(FRAME_INTERVAL),
            window: None,
            window_config: config.window,
            shown_heading: None,
            should_close: false,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.session.set_viewport(ViewportRect::from_size(size.width as f32, size.height as f32));
    }

    fn present(&mut self, frame: &FrameSnapshot) {
        if frame.heading != self.shown_heading {
            if let (Some(window), Some(heading)) = (self.window.as_ref(), frame.heading.as_deref()) {
                window.set_title(&format!("{} | {heading}", self.window_config.title));
            }
            self.shown_heading = frame.heading.clone();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title(self.window_config.title.clone())
            .with_inner_size(PhysicalSize::new(self.window_config.width, self.window_config.height));
        match event_loop.create_window(attrs) {
            Ok(window) => {
                let size = window.inner_size();
                self.window = Some(window);
                self.resize(size);
            }
            Err(err) => {
                log::error!("[app] Failed to create window: {err}");
                self.should_close = true;
            }
        }
    }

    fn window_event(&mut self, _el: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => self.should_close = true,
            WindowEvent::Resized(size) => self.resize(*size),
            WindowEvent::KeyboardInput { event: KeyEvent { logical_key, state, .. }, .. } => {
                if let Key::Named(NamedKey::Escape) = logical_key {
                    if *state == ElementState::Pressed {
                        self.should_close = true;
                    }
                }
            }
            _ => {}
        }
        if let Some(raw) = self.input.translate(&event) {
            let now = self.clock.now();
            self.session.handle_input(&raw, now);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_close {
            event_loop.exit();
            return;
        }
        let frame_start = Instant::now();
        let now = self.clock.begin_frame_at(frame_start);
        let frame = self.session.frame(now);
        self.present(&frame);
        for event in self.session.drain_events() {
            log::debug!("[carousel] {event}");
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.clock.next_deadline(frame_start)));
    }
}
