pub mod renderer;

pub use renderer::{FrameModel, Renderer};
