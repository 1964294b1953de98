#![forbid(unsafe_code)]

mod rendering;

pub use rendering::{
    render_pattern_to_png, render_pigment_to_png, render_swatch_sheet, PngImageSource,
    SwatchConfig,
};
