// ============================================================================
// app.rs — Gray-Scott
// Windowed viewer: winit event loop driving the simulation on a fixed tick
// and presenting its frame through wgpu.
// ============================================================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow},
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes},
};

use crate::config::RunConfig;
use crate::error::{Result, SimError};
use crate::input::{key_action, KeyAction};
use crate::metrics::FieldDiagnostics;
use crate::pipeline::PresentPipeline;
use crate::simulation::Simulation;

// ======================== Application ========================

pub struct App {
    sim: Simulation,
    gpu: Option<GpuState>,
    config: RunConfig,
    tick_interval: Duration,
    next_tick: Instant,
    last_diag: Option<FieldDiagnostics>,
    failure: Option<SimError>,
}

struct GpuState {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    present: PresentPipeline,
    window: Arc<Window>,
}

impl App {
    pub fn new(config: RunConfig) -> Result<Self> {
        let sim = Simulation::new(&config)?;
        Ok(Self {
            sim,
            gpu: None,
            tick_interval: Duration::from_millis(config.tick_interval_ms.max(1)),
            next_tick: Instant::now(),
            config,
            last_diag: None,
            failure: None,
        })
    }

    /// Error that stopped the event loop, if any.
    pub fn take_failure(&mut self) -> Option<SimError> {
        self.failure.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SimError) {
        log::error!("{}", err);
        self.failure = Some(err);
        event_loop.exit();
    }

    fn tick(&mut self) {
        self.sim.on_tick();

        let ticks = self.sim.ticks();
        let interval = self.config.diag_interval as u64;
        if interval > 0 && ticks % interval == 0 {
            let diag = FieldDiagnostics::from_world(self.sim.world());
            diag.log(ticks, self.last_diag.as_ref());
            self.last_diag = Some(diag);
        }
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if let Some(gpu) = &mut self.gpu {
            gpu.surface_config.width = width;
            gpu.surface_config.height = height;
            gpu.surface.configure(&gpu.device, &gpu.surface_config);
            gpu.present.resize(&gpu.device, &gpu.queue, width, height);
        }
        self.sim.on_viewport_resized(width, height)
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        let window = match event_loop.create_window(window_attributes(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, SimError::Gpu(format!("window: {e}"))),
        };

        let gpu = match pollster::block_on(init_gpu(window.clone())) {
            Ok(gpu) => gpu,
            Err(e) => return self.fail(event_loop, e),
        };

        let size = window.inner_size();
        self.gpu = Some(gpu);
        if let Err(e) = self.resize(size.width.max(1), size.height.max(1)) {
            return self.fail(event_loop, e);
        }

        log::info!(
            "Viewer ready: grid {}x{}, tick {:?}",
            self.config.grid.width,
            self.config.grid.height,
            self.tick_interval
        );
        self.sim.params().log_summary();

        self.next_tick = Instant::now();
        window.request_redraw();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_tick {
            self.tick();
            self.next_tick += self.tick_interval;
            // A slow device renders fewer frames rather than queueing ticks.
            if self.next_tick < now {
                self.next_tick = now + self.tick_interval;
            }
            if let Some(gpu) = &self.gpu {
                gpu.window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                match &event.logical_key {
                    Key::Named(NamedKey::Escape) => event_loop.exit(),
                    Key::Character(c) => match key_action(c.as_str()) {
                        Some(KeyAction::Reset) => self.sim.on_reset(),
                        Some(KeyAction::Nudge(kind, dir)) => self.sim.nudge_parameter(kind, dir),
                        None => {}
                    },
                    _ => {}
                }
            }

            WindowEvent::Resized(new_size) => {
                if new_size.width > 0 && new_size.height > 0 {
                    if let Err(e) = self.resize(new_size.width, new_size.height) {
                        self.fail(event_loop, e);
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if let Some(gpu) = &mut self.gpu {
                    redraw(gpu, &self.sim);
                }
            }

            _ => {}
        }
    }
}

/// Window sized in logical units so the minimum holds on scaled displays.
fn window_attributes(config: &RunConfig) -> WindowAttributes {
    let [min_w, min_h] = config.min_window;
    let min_size = LogicalSize::new(min_w as f64, min_h as f64);
    WindowAttributes::default()
        .with_title("Gray-Scott")
        .with_inner_size(min_size)
        .with_min_inner_size(min_size)
}

// ======================== GPU Initialization ========================

async fn init_gpu(window: Arc<Window>) -> Result<GpuState> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let surface = instance
        .create_surface(window.clone())
        .map_err(|e| SimError::Gpu(format!("surface: {e}")))?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| SimError::Gpu(String::from("no suitable GPU adapter found")))?;

    log::info!("GPU: {}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("grayscott_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
            },
            None,
        )
        .await
        .map_err(|e| SimError::Gpu(format!("device: {e}")))?;

    let size = window.inner_size();
    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .copied()
        .or_else(|| surface_caps.formats.first().copied())
        .ok_or_else(|| SimError::Gpu(String::from("surface reports no formats")))?;

    let surface_config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode: surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &surface_config);

    let present = PresentPipeline::new(
        &device,
        surface_format,
        surface_config.width,
        surface_config.height,
    );

    Ok(GpuState {
        device,
        queue,
        surface,
        surface_config,
        present,
        window,
    })
}

// ======================== Frame Presentation ========================

fn redraw(gpu: &mut GpuState, sim: &Simulation) {
    gpu.present.upload(&gpu.queue, sim.current_frame());

    let output = match gpu.surface.get_current_texture() {
        Ok(t) => t,
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            log::warn!("Surface lost; reconfiguring");
            gpu.surface.configure(&gpu.device, &gpu.surface_config);
            return;
        }
        Err(e) => {
            log::error!("Surface error: {:?}", e);
            return;
        }
    };

    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("present_encoder"),
        });
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("present_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        gpu.present.draw(&mut pass);
    }

    gpu.queue.submit(std::iter::once(encoder.finish()));
    output.present();
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::Size;

    #[test]
    fn window_minimum_is_in_logical_units() {
        let attrs = window_attributes(&RunConfig::default());
        let expected = Some(Size::Logical(LogicalSize::new(780.0, 800.0)));
        assert_eq!(attrs.min_inner_size, expected);
        assert_eq!(attrs.inner_size, expected);
        assert_eq!(attrs.title, "Gray-Scott");
    }
}
