mod terminal;

pub use terminal::{ProgressView, TerminalView};
