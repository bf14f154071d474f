//! Platform layer: windowing, event loop and fly-cam input.
//!
//! Assembles the sandbox: loads the mesh/texture assets named in the run
//! configuration, spawns the demo scene and drives the renderer. Keyboard
//! moves the camera (arrows or WASD), relative mouse motion looks around.

use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::{Context, Result};
use winit::{
    dpi::PhysicalSize,
    event::{DeviceEvent, Event, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowAttributes},
};

use asset::{mesh::MeshData, obj, texture::TextureData};
use corelib::{camera::FlyCamera, scene::Scene, transform::Transform, vec3};
use renderer::GpuState;

/// Camera translation speed, units per second.
const MOVE_SPEED: f32 = 2.5;

/// Everything the sandbox needs to start.
pub struct RunConfig {
    pub backends: wgpu::Backends,
    pub width: u32,
    pub height: u32,
    /// OBJ file to display; the built-in cube when absent.
    pub model: Option<PathBuf>,
    /// Diffuse PNG; the procedural checkerboard when absent.
    pub texture: Option<PathBuf>,
}

/// Held-key state, applied to the camera once per frame.
#[derive(Default)]
struct MoveInput {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
}

impl MoveInput {
    fn set_key(&mut self, code: KeyCode, pressed: bool) {
        match code {
            KeyCode::ArrowUp | KeyCode::KeyW => self.forward = pressed,
            KeyCode::ArrowDown | KeyCode::KeyS => self.backward = pressed,
            KeyCode::ArrowLeft | KeyCode::KeyA => self.left = pressed,
            KeyCode::ArrowRight | KeyCode::KeyD => self.right = pressed,
            _ => {}
        }
    }

    fn apply(&self, camera: &mut FlyCamera, dt: f32) {
        let step = MOVE_SPEED * dt;
        if self.forward {
            camera.move_forward(step);
        }
        if self.backward {
            camera.move_backward(step);
        }
        if self.left {
            camera.move_left(step);
        }
        if self.right {
            camera.move_right(step);
        }
    }
}

/// Run the sandbox until the window is closed.
pub fn run(config: RunConfig) -> Result<()> {
    // Assets first; a bad path should fail before a window flashes up.
    let mesh = match &config.model {
        Some(path) => obj::load_obj_from_path(path)
            .with_context(|| format!("failed to load model {}", path.display()))?,
        None => MeshData::cube(),
    };
    let texture = match &config.texture {
        Some(path) => Some(
            TextureData::load_png(path)
                .with_context(|| format!("failed to load texture {}", path.display()))?,
        ),
        None => None,
    };

    let mut scene = Scene::new();
    scene.spawn(
        Transform::from_translation(vec3(0.0, 0.0, -2.0)),
        vec3(0.0, 0.9, 0.0),
    );
    scene.spawn(Transform::from_translation(vec3(0.0, 0.0, -4.0)), vec3(0.0, 0.0, 0.0));

    let mut camera = FlyCamera::new(
        45f32.to_radians(),
        config.width as f32 / config.height as f32,
        0.1,
        100.0,
    );

    let event_loop: EventLoop<()> = EventLoop::new().expect("Failed to create event loop");
    let window = event_loop
        .create_window(
            WindowAttributes::default()
                .with_title("Prism3D")
                .with_inner_size(PhysicalSize::new(config.width.max(1), config.height.max(1))),
        )
        .expect("Failed to create window");
    let window: Arc<Window> = Arc::new(window);

    log::info!(
        "Window created: {}x{}",
        window.inner_size().width,
        window.inner_size().height
    );

    let mut gpu = pollster::block_on(GpuState::new(window.clone(), config.backends));
    gpu.upload_mesh(&mesh);
    if let Some(tex) = &texture {
        gpu.set_texture(tex);
    }

    // Relative mouse mode for free-look.
    if let Err(err) = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
    {
        log::warn!("Cursor grab unavailable: {err}");
    }
    window.set_cursor_visible(false);

    let mut move_input = MoveInput::default();
    let mut last_frame = Instant::now();

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    log::info!("Close requested. Exiting event loop.");
                    window_target.exit();
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(code),
                            state,
                            ..
                        },
                    ..
                } => {
                    if code == KeyCode::Escape {
                        window_target.exit();
                    } else {
                        move_input.set_key(code, state.is_pressed());
                    }
                }
                WindowEvent::Resized(new_size) => {
                    log::info!("Resized: {}x{}", new_size.width, new_size.height);
                    gpu.resize(new_size.width, new_size.height);
                    camera.set_aspect(new_size.width.max(1) as f32 / new_size.height.max(1) as f32);
                }
                WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                    log::info!("Scale factor changed: {scale_factor:.3}");
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let dt = (now - last_frame).as_secs_f32();
                    last_frame = now;

                    move_input.apply(&mut camera, dt);
                    scene.update(dt);

                    match gpu.render(&scene, &camera) {
                        Ok(()) => {}
                        Err(err) if GpuState::is_surface_lost(&err) => {
                            log::warn!("Surface lost/outdated; reconfiguring");
                            gpu.recreate_surface();
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("Out of GPU memory. Exiting.");
                            window_target.exit();
                        }
                        Err(err) => log::warn!("Dropped frame: {err:?}"),
                    }
                }
                _ => {}
            },
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta: (dx, dy) },
                ..
            } => {
                camera.mouse_look(dx as f32, dy as f32);
            }
            Event::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {e:?}"))?;

    Ok(())
}
