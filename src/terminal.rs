//! Terminal presenter: draws images as ASCII shades.
//!
//! Each redraw writes one frame containing the title, the image, the
//! keybinding legend and, in multiclass mode, the class toggle buttons.
//!
//! Recognised presentation options:
//! - `columns` (integer): maximum image width in characters, default 48
//! - `shades` (string): characters from dark to light, default `" .:-=+*#%@"`

use std::io::Write;

use ndarray::Array2;

use crate::presenter::{Legend, PresentationOptions, Presenter};

/// Default maximum image width in characters.
pub const DEFAULT_COLUMNS: usize = 48;

/// Default shade ramp, dark to light.
pub const DEFAULT_SHADES: &str = " .:-=+*#%@";

/// Presenter writing frames to any writer, typically stdout.
pub struct TerminalPresenter<W: Write> {
    out: W,
    columns: usize,
    shades: Vec<char>,
    title: String,
    image: Vec<String>,
    legend: Option<Legend>,
    buttons: Option<Vec<bool>>,
}

impl<W: Write> TerminalPresenter<W> {
    /// Create a presenter writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            columns: DEFAULT_COLUMNS,
            shades: DEFAULT_SHADES.chars().collect(),
            title: String::new(),
            image: Vec::new(),
            legend: None,
            buttons: None,
        }
    }

    /// Consume the presenter and return the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self) -> std::io::Result<()> {
        writeln!(self.out, "{}", "=".repeat(self.columns.max(8)))?;
        writeln!(self.out, "{}", self.title)?;
        for line in &self.image {
            writeln!(self.out, "{}", line)?;
        }
        if let Some(legend) = &self.legend {
            write!(self.out, "{}", legend)?;
            if let Some(states) = &self.buttons {
                let buttons: Vec<String> = legend
                    .buttons
                    .iter()
                    .zip(states)
                    .map(|(caption, active)| {
                        let mark = if *active { "x" } else { " " };
                        format!("({}) {}", mark, caption.replace('\n', " "))
                    })
                    .collect();
                writeln!(self.out, "{}", buttons.join("  "))?;
            }
        }
        self.out.flush()
    }
}

impl<W: Write> Presenter<Array2<f32>> for TerminalPresenter<W> {
    fn configure(&mut self, options: &PresentationOptions) {
        if let Some(columns) = options.get("columns").and_then(|v| v.as_u64()) {
            self.columns = usize::try_from(columns).unwrap_or(DEFAULT_COLUMNS).max(1);
        }
        if let Some(shades) = options
            .get("shades")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
        {
            self.shades = shades.chars().collect();
        }
        for key in options.keys() {
            if key != "columns" && key != "shades" {
                log::debug!("Terminal presenter ignores option '{}'", key);
            }
        }
    }

    fn show_image(&mut self, _index: usize, image: &Array2<f32>) {
        self.image = render_ascii(image, self.columns, &self.shades);
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_legend(&mut self, legend: &Legend) {
        self.legend = Some(legend.clone());
    }

    fn set_button_states(&mut self, states: &[bool]) {
        self.buttons = Some(states.to_vec());
    }

    fn redraw(&mut self) {
        if let Err(e) = self.write_frame() {
            log::warn!("Failed to draw frame: {}", e);
        }
    }
}

/// Render a grayscale image as lines of shade characters.
///
/// Values are scaled between the image minimum and maximum. Wide images are
/// downsampled to `columns` characters; rows are halved to keep the aspect
/// ratio of terminal cells.
pub fn render_ascii(image: &Array2<f32>, columns: usize, shades: &[char]) -> Vec<String> {
    let (height, width) = image.dim();
    if width == 0 || height == 0 || shades.is_empty() {
        return Vec::new();
    }

    let (min, max) = image
        .iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    let range = if max > min { max - min } else { 1.0 };
    let min = if min.is_finite() { min } else { 0.0 };

    let out_cols = width.min(columns.max(1));
    let out_rows = (height * out_cols / width / 2).max(1);
    let top = shades.len() - 1;

    (0..out_rows)
        .map(|row| {
            let y = row * height / out_rows;
            (0..out_cols)
                .map(|col| {
                    let x = col * width / out_cols;
                    let value = image[[y, x]];
                    let t = if value.is_finite() {
                        ((value - min) / range).clamp(0.0, 1.0)
                    } else {
                        0.0
                    };
                    shades[(t * top as f32).round() as usize]
                })
                .collect()
        })
        .collect()
}
