//! Colour palettes for the per-pollutant chart groups.
//!
//! The group of the i-th pollutant (in source appearance order) draws its series from
//! palette `i % PALETTES.len()`; the j-th series of a group takes colour `j % palette.len()`.

const PLOTLY: &[&str] = &[
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];
const D3: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];
const G10: &[&str] = &[
    "#3366cc", "#dc3912", "#ff9900", "#109618", "#990099", "#0099c6", "#dd4477", "#66aa00",
    "#b82e2e", "#316395",
];
const T10: &[&str] = &[
    "#4c78a8", "#f58518", "#e45756", "#72b7b2", "#54a24b", "#eeca3b", "#b279a2", "#ff9da6",
    "#9d755d", "#bab0ac",
];
const PASTEL: &[&str] = &[
    "#66c5cc", "#f6cf71", "#f89c74", "#dcb0f2", "#87c55f", "#9eb9f3", "#fe88b1", "#c9db74",
    "#8be0a4", "#b3b3b3",
];

pub const PALETTES: [&[&str]; 5] = [PLOTLY, D3, G10, T10, PASTEL];

pub fn palette(index: usize) -> &'static [&'static str] {
    PALETTES[index % PALETTES.len()]
}

pub fn series_color(palette_index: usize, series_index: usize) -> &'static str {
    let colors = palette(palette_index);
    colors[series_index % colors.len()]
}
