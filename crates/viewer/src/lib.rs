use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use objview_mesh::{compute_bounds, BoundingBox, MeshStore};
use rand::Rng;
use wgpu::util::DeviceExt;
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowBuilder},
};

mod scene;

pub use scene::{flatten_mesh, placeholder_model, ModelVertex, DEFAULT_NORMAL};

// This is needed because wgpu uses Direct-X style coordinates while cgmath uses
// OpenGL style coordinates.
//
// This matrix simply transforms the coordinates used by cgmath into the ones
// that wgpu need.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub const SCENE_UNIFORM_BINDING: u32 = 0;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// First draw color, until the color keys or a mouse click change it.
const INITIAL_COLOR: [f32; 4] = [0.5, 1.0, 0.5, 1.0];

struct Camera {
    // Where the camera is located.
    eye: cgmath::Point3<f32>,
    // Where the camera is pointing.
    target: cgmath::Point3<f32>,
    // The orientation of the camera.
    up: cgmath::Vector3<f32>,
    // The aspect ratio of the scene (width:height).
    aspect: f32,
    // The horizontal field of view.
    fovy: f32,
    // Near and far clipping planes.
    znear: f32,
    zfar: f32,
}

impl Camera {
    /// Builds the view projection matrix that maps scene coordinates into
    /// screen coordinates.
    fn build_view_projection_matrix(&self) -> cgmath::Matrix4<f32> {
        let view = cgmath::Matrix4::look_at_rh(self.eye, self.target, self.up);
        let proj = cgmath::perspective(cgmath::Deg(self.fovy), self.aspect, self.znear, self.zfar);
        OPENGL_TO_WGPU_MATRIX * proj * view
    }
}

// We need this for Rust to store our data correctly for the shaders
#[repr(C)]
// This is so we can store this in a buffer
#[derive(Debug, Copy, Clone, bytemuck_derive::Pod, bytemuck_derive::Zeroable)]
struct SceneUniform {
    // We can't use cgmath with bytemuck directly so we'll have
    // to convert the matrices into 4x4 f32 arrays.
    view_proj: [[f32; 4]; 4],
    // The normalization transform: uniform scale into the viewing cube,
    // recentered on the origin.
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

impl SceneUniform {
    fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_proj: cgmath::Matrix4::identity().into(),
            model: cgmath::Matrix4::identity().into(),
            color: INITIAL_COLOR,
        }
    }

    fn update_view_proj(&mut self, camera: &Camera) {
        self.view_proj = camera.build_view_projection_matrix().into();
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

struct State {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    window: Window,
    render_pipeline: wgpu::RenderPipeline,
    depth_view: wgpu::TextureView,
    vertex_buffer: wgpu::Buffer,
    num_vertices: u32,
    camera: Camera,
    uniform: SceneUniform,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    mesh: MeshStore,
    bounds: BoundingBox,
    last_mouse_position: winit::dpi::PhysicalPosition<f64>,
}

impl State {
    // Creating some of the wgpu types requires async code
    async fn new(window: Window, mesh: MeshStore) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // The instance is a handle to our GPU
        // Backends::all => Vulkan + Metal + DX12 + Browser WebGPU
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            dx12_shader_compiler: Default::default(),
        });

        // # Safety
        //
        // The surface needs to live as long as the window that created it.
        // State owns the window so this should be safe.
        let surface = unsafe { instance.create_surface(&window) }?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible graphics adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                    label: None,
                },
                None, // Trace path
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader assumes an sRGB surface texture. Using a different one
        // will result in all the colors coming out darker.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        // A fixed camera looking at the origin, where the normalization
        // transform centers every model.
        let camera = Camera {
            eye: (0.0, 30.0, 80.0).into(),
            target: (0.0, 0.0, 0.0).into(),
            up: cgmath::Vector3::unit_y(),
            aspect: config.width as f32 / config.height as f32,
            fovy: 45.0,
            znear: 0.1,
            zfar: 300.0,
        };

        let mut uniform = SceneUniform::new();
        uniform.update_view_proj(&camera);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        // The bind group is how we can identify this buffer within our shader.
        //
        // Ex:
        //     @group(0) @binding(0)
        //     var<uniform> scene: SceneUniform;
        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: SCENE_UNIFORM_BINDING,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("scene_bind_group_layout"),
            });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: SCENE_UNIFORM_BINDING,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("scene_bind_group"),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[/* bind_group = 0 */ &uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        // Load our shaders and setup the render pipeline.
        let shader = device.create_shader_module(wgpu::include_wgsl!("obj.wgsl"));
        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[ModelVertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // OBJ files in the wild disagree on winding, so draw both
                // sides.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let depth_view = create_depth_texture(&device, &config);

        let (vertex_buffer, num_vertices, bounds, uniform) =
            Self::build_geometry(&device, &mesh, uniform);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            render_pipeline,
            depth_view,
            vertex_buffer,
            num_vertices,
            camera,
            uniform,
            uniform_buffer,
            uniform_bind_group,
            mesh,
            bounds,
            last_mouse_position: winit::dpi::PhysicalPosition { x: 0.0, y: 0.0 },
        })
    }

    // Flattens the current mesh (or the placeholder when no faces loaded)
    // into a vertex buffer and refreshes the model transform.
    fn build_geometry(
        device: &wgpu::Device,
        mesh: &MeshStore,
        mut uniform: SceneUniform,
    ) -> (wgpu::Buffer, u32, BoundingBox, SceneUniform) {
        let fallback;
        let drawn = if mesh.is_empty() {
            fallback = scene::placeholder_model();
            &fallback
        } else {
            mesh
        };

        let data = flatten_mesh(drawn);
        let bounds = compute_bounds(drawn);
        uniform.model = bounds.transform().into();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&data),
            usage: wgpu::BufferUsages::VERTEX,
        });
        (vertex_buffer, data.len() as u32, bounds, uniform)
    }

    /// Replaces the displayed model. Bounds and the vertex buffer are
    /// rebuilt before control returns to the event loop, so the render path
    /// never observes a half-loaded store.
    fn set_mesh(&mut self, mesh: MeshStore) {
        self.mesh = mesh;
        let (vertex_buffer, num_vertices, bounds, uniform) =
            Self::build_geometry(&self.device, &self.mesh, self.uniform);
        self.vertex_buffer = vertex_buffer;
        self.num_vertices = num_vertices;
        self.bounds = bounds;
        self.uniform = uniform;
        log::info!(
            "displaying {} faces, scale factor {:.3}",
            self.mesh.face_count(),
            self.bounds.scale_factor
        );
    }

    // Prompts on stdout for a new model path and loads it. The previous
    // model stays on screen if the file cannot be opened or read.
    fn prompt_reload(&mut self) {
        print!("Enter .obj file to load: ");
        let _ = std::io::stdout().flush();
        let mut path = String::new();
        let stdin = std::io::stdin();
        if stdin.lock().read_line(&mut path).is_err() {
            return;
        }
        let path = path.trim();
        if path.is_empty() {
            return;
        }
        match objview_obj::read_obj(path) {
            Ok(mesh) => self.set_mesh(mesh),
            Err(e) => log::warn!("failed to load {}: {}", path, e),
        }
    }

    fn set_color(&mut self, color: [f32; 4]) {
        self.uniform.color = color;
    }

    fn random_color(&mut self) {
        let mut rng = rand::thread_rng();
        let color = [rng.gen(), rng.gen(), rng.gen(), 1.0];
        log::info!(
            "color {:.2}, {:.2}, {:.2} at {:.0}, {:.0}",
            color[0],
            color[1],
            color[2],
            self.last_mouse_position.x,
            self.last_mouse_position.y
        );
        self.set_color(color);
    }

    fn handle_key(&mut self, keycode: VirtualKeyCode, control_flow: &mut ControlFlow) {
        match keycode {
            VirtualKeyCode::R => self.set_color([1.0, 0.0, 0.0, 1.0]),
            VirtualKeyCode::G => self.set_color([0.0, 1.0, 0.0, 1.0]),
            VirtualKeyCode::B => self.set_color([0.0, 0.0, 1.0, 1.0]),
            VirtualKeyCode::L => self.prompt_reload(),
            VirtualKeyCode::Up => self
                .window
                .set_fullscreen(Some(Fullscreen::Borderless(None))),
            VirtualKeyCode::Down => {
                self.window.set_fullscreen(None);
                self.window
                    .set_inner_size(winit::dpi::PhysicalSize::new(640, 480));
            }
            VirtualKeyCode::Escape => *control_flow = ControlFlow::Exit,
            _ => {}
        }
    }

    fn handle_window_event(&mut self, window_event: WindowEvent, control_flow: &mut ControlFlow) {
        match window_event {
            WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state: ElementState::Pressed,
                        virtual_keycode: Some(keycode),
                        ..
                    },
                ..
            } => self.handle_key(keycode, control_flow),
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.random_color(),
            WindowEvent::CursorMoved { position, .. } => {
                self.last_mouse_position = position;
            }
            WindowEvent::Resized(physical_size) => {
                self.resize(physical_size);
            }
            WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                // new_inner_size is &&mut so we have to dereference it twice
                self.resize(*new_inner_size);
            }
            _ => {}
        }
    }

    pub fn handle_event<T>(&mut self, event: Event<'_, T>, control_flow: &mut ControlFlow) {
        *control_flow = ControlFlow::Wait;
        match event {
            Event::WindowEvent { event, window_id } if window_id == self.window.id() => {
                self.handle_window_event(event, control_flow)
            }
            Event::RedrawRequested(_) => {
                self.update();
                match self.render() {
                    Ok(_) => {}
                    // Reconfigure the surface if lost
                    Err(wgpu::SurfaceError::Lost) => self.resize(self.size),
                    // The system is out of memory, we should probably quit
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    // All other errors (Outdated, Timeout) should be resolved by the next frame
                    Err(e) => log::error!("{:?}", e),
                }
            }
            Event::MainEventsCleared => {
                // RedrawRequested will only trigger once, unless we manually
                // request it.
                self.window.request_redraw();
            }
            _ => (),
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_texture(&self.device, &self.config);
            self.camera.aspect = new_size.width as f32 / new_size.height as f32;
        }
    }

    fn update(&mut self) {
        self.uniform.update_view_proj(&self.camera);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: true,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: true,
                    }),
                    stencil_ops: None,
                }),
            });
            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(0..self.num_vertices, 0..1);
        }

        // submit will accept anything that implements IntoIter
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn print_controls() {
    println!("=== CONTROLS ===");
    println!("R: red    G: green    B: blue");
    println!("L: load a .obj file");
    println!("Up: fullscreen    Down: 640x480 window");
    println!("Left click: random color");
    println!("Esc: quit");
}

/// Opens the viewer window, optionally preloading a model.
///
/// A model that fails to load is reported and replaced by the placeholder;
/// the viewer itself always comes up.
pub fn run(model: Option<PathBuf>) -> anyhow::Result<()> {
    env_logger::init();

    let mesh = match model {
        Some(path) => match objview_obj::read_obj(&path) {
            Ok(mesh) => mesh,
            Err(e) => {
                log::warn!("failed to load {}: {}", path.display(), e);
                MeshStore::new()
            }
        },
        None => MeshStore::new(),
    };

    print_controls();

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("objview")
        .with_inner_size(winit::dpi::PhysicalSize::new(500, 500))
        .build(&event_loop)?;

    let mut state = pollster::block_on(State::new(window, mesh))?;

    // Opens the window and starts processing events.
    event_loop.run(move |event, _, control_flow| {
        state.handle_event(event, control_flow);
    });
}
