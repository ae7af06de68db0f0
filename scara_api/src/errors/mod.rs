mod panel_error;
pub use panel_error::*;
