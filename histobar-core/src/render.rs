use histobar_common::{DEFAULT_BAR_GLYPH, DEFAULT_BAR_SCALE};
use std::fmt;

use crate::histogram::Histogram;

/// Printed in place of the chart when the histogram has no categories.
pub const NO_DATA: &str = "No date to plot";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// The highest count is divided by this to get how many samples one glyph stands for.
    pub bar_scale: u64,
    pub bar_glyph: char,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            bar_scale: DEFAULT_BAR_SCALE,
            bar_glyph: DEFAULT_BAR_GLYPH,
        }
    }
}

/// Text bar chart of a [`Histogram`], one line per category.
pub struct Chart<'a> {
    histogram: &'a Histogram,
    options: RenderOptions,
}

impl Histogram {
    pub fn chart(&self, options: RenderOptions) -> Chart<'_> {
        Chart {
            histogram: self,
            options,
        }
    }

    pub fn render(&self, options: &RenderOptions) -> String {
        self.chart(*options).to_string()
    }
}

impl fmt::Display for Chart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(highest) = self.histogram.highest_count() else {
            return f.write_str(NO_DATA);
        };
        let step = match highest.count() / self.options.bar_scale.max(1) {
            0 => 1,
            s => s,
        };
        let width = self.histogram.max().to_string().len();
        for category in self.histogram.categories() {
            let bar_len = (category.count() / step + 1) as usize;
            let bar: String = std::iter::repeat(self.options.bar_glyph)
                .take(bar_len)
                .collect();
            writeln!(
                f,
                "{:>width$}-{:<width$} : {} {}",
                category.from(),
                category.to(),
                bar,
                category.count(),
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.chart(RenderOptions::default()), f)
    }
}
