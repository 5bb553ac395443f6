pub mod canvas;
pub mod config;
pub mod eraser;
pub mod error;
pub mod id;
pub mod interpolate;
pub mod io;
pub mod spatial;
pub mod state;
pub mod stroke;
pub mod util;

pub use canvas::InfiniteCanvas;
pub use config::CanvasConfig;
pub use error::{Error, Result};
