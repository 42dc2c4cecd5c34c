//! Chart renderer for the assigned table.
//!
//! Produces a 220mm x 120mm SVG document: per-subgenome trend lines across
//! reference chromosomes (naturally ordered on the x-axis), a dotted vertical
//! spread line per reference chromosome, per-subgenome colored markers, and
//! rotated, rank-staggered query-chromosome labels so neighboring labels do
//! not collide. Colors are generated in HSV space so any subgenome count up
//! to the CLI limit gets a distinct hue.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::assign::Assignment;
use crate::error::{Error, Result};

// 220mm x 120mm page at 4 units per mm
const PAGE_W: f64 = 880.0;
const PAGE_H: f64 = 480.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 150.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 90.0;
const MARKER_RADIUS: f64 = 7.0;

/// Marker shapes cycled across subgenomes.
#[derive(Debug, Clone, Copy)]
enum Marker {
    Circle,
    Square,
    TriangleUp,
    Diamond,
    TriangleDown,
    TriangleLeft,
    TriangleRight,
    Pentagon,
    Star,
    Hexagon,
}

const MARKERS: [Marker; 10] = [
    Marker::Circle,
    Marker::Square,
    Marker::TriangleUp,
    Marker::Diamond,
    Marker::TriangleDown,
    Marker::TriangleLeft,
    Marker::TriangleRight,
    Marker::Pentagon,
    Marker::Star,
    Marker::Hexagon,
];

/// Fill color, edge color and marker shape for one subgenome.
#[derive(Debug, Clone)]
struct SubgenomeStyle {
    main: String,
    edge: String,
    marker: Marker,
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    let i = (h * 6.0).floor() as i64 % 6;
    let f = h * 6.0 - (h * 6.0).floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    match i {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

/// Evenly spaced hues with alternating saturation and varying value, plus a
/// darker edge color per subgenome.
fn generate_styles(subgenomes: usize) -> Vec<SubgenomeStyle> {
    (0..subgenomes)
        .map(|i| {
            let hue = i as f64 / subgenomes as f64;
            let sat = 0.7 + 0.3 * (i % 2) as f64;
            let val = 0.8 - 0.2 * (i % 3) as f64;
            let (r, g, b) = hsv_to_rgb(hue, sat, val);
            let main = format!(
                "#{:02x}{:02x}{:02x}",
                (r * 255.0) as u8,
                (g * 255.0) as u8,
                (b * 255.0) as u8
            );
            let edge = format!(
                "#{:02x}{:02x}{:02x}",
                (r * 200.0) as u8,
                (g * 200.0) as u8,
                (b * 200.0) as u8
            );
            SubgenomeStyle {
                main,
                edge,
                marker: MARKERS[i % MARKERS.len()],
            }
        })
        .collect()
}

/// Numeric rank of an SG label; "SG3" -> 3. Labels outside SG<n>=1.. rank 1
/// so rank arithmetic downstream never underflows.
fn sg_rank(label: &str) -> usize {
    label
        .strip_prefix("SG")
        .and_then(|n| n.parse().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(1)
}

fn polygon_points(cx: f64, cy: f64, radii: &[(f64, f64)]) -> String {
    radii
        .iter()
        .map(|(angle, r)| {
            let x = cx + r * angle.cos();
            let y = cy + r * angle.sin();
            format!("{x:.2},{y:.2}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn regular_polygon(cx: f64, cy: f64, r: f64, sides: usize, start: f64) -> String {
    let radii: Vec<(f64, f64)> = (0..sides)
        .map(|i| (start + i as f64 * std::f64::consts::TAU / sides as f64, r))
        .collect();
    polygon_points(cx, cy, &radii)
}

fn marker_element(marker: Marker, cx: f64, cy: f64, r: f64, fill: &str, edge: &str) -> String {
    let style = format!("fill=\"{fill}\" stroke=\"{edge}\" stroke-width=\"2\"");
    let up = -std::f64::consts::FRAC_PI_2;
    match marker {
        Marker::Circle => {
            format!("<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{r:.2}\" {style}/>")
        }
        Marker::Square => format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" {style}/>",
            cx - r,
            cy - r,
            2.0 * r,
            2.0 * r
        ),
        Marker::TriangleUp => format!(
            "<polygon points=\"{}\" {style}/>",
            regular_polygon(cx, cy, r, 3, up)
        ),
        Marker::Diamond => format!(
            "<polygon points=\"{}\" {style}/>",
            regular_polygon(cx, cy, r, 4, up)
        ),
        Marker::TriangleDown => format!(
            "<polygon points=\"{}\" {style}/>",
            regular_polygon(cx, cy, r, 3, -up)
        ),
        Marker::TriangleLeft => format!(
            "<polygon points=\"{}\" {style}/>",
            regular_polygon(cx, cy, r, 3, std::f64::consts::PI)
        ),
        Marker::TriangleRight => format!(
            "<polygon points=\"{}\" {style}/>",
            regular_polygon(cx, cy, r, 3, 0.0)
        ),
        Marker::Pentagon => format!(
            "<polygon points=\"{}\" {style}/>",
            regular_polygon(cx, cy, r, 5, up)
        ),
        Marker::Star => {
            let radii: Vec<(f64, f64)> = (0..10)
                .map(|i| {
                    let angle = up + i as f64 * std::f64::consts::TAU / 10.0;
                    let radius = if i % 2 == 0 { r } else { 0.45 * r };
                    (angle, radius)
                })
                .collect();
            format!(
                "<polygon points=\"{}\" {style}/>",
                polygon_points(cx, cy, &radii)
            )
        }
        Marker::Hexagon => format!(
            "<polygon points=\"{}\" {style}/>",
            regular_polygon(cx, cy, r, 6, up)
        ),
    }
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the assigned table as an SVG document.
pub fn render_svg(assignments: &[Assignment], subgenomes: usize) -> Result<String> {
    if assignments.is_empty() {
        return Err(Error::Config(
            "nothing to plot: the table has no rows".to_string(),
        ));
    }
    if subgenomes == 0 {
        return Err(Error::Config(
            "subgenome count must be at least 1".to_string(),
        ));
    }

    // Natural x-axis order: chr2 before chr10
    let mut chr_order: Vec<&str> = assignments.iter().map(|a| a.ref_chr.as_str()).collect();
    chr_order.sort_by(|a, b| natord::compare(a, b));
    chr_order.dedup();

    let x_left = MARGIN_LEFT;
    let x_right = PAGE_W - MARGIN_RIGHT;
    let y_top = MARGIN_TOP;
    let y_bottom = PAGE_H - MARGIN_BOTTOM;

    let step = (x_right - x_left) / chr_order.len() as f64;
    let x_of = |chr: &str| -> f64 {
        let idx = chr_order.iter().position(|c| *c == chr).unwrap_or(0);
        x_left + (idx as f64 + 0.5) * step
    };

    let max_distance = assignments
        .iter()
        .map(|a| a.distance)
        .fold(0.0_f64, f64::max);
    let y_max = if max_distance > 0.0 {
        max_distance * 1.05
    } else {
        1.0
    };
    let y_of = |d: f64| -> f64 { y_bottom - (d / y_max) * (y_bottom - y_top) };

    let styles = generate_styles(subgenomes);
    let style_of = |label: &str| -> &SubgenomeStyle {
        let rank = sg_rank(label);
        &styles[(rank - 1).min(styles.len() - 1)]
    };

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"220mm\" height=\"120mm\" \
         viewBox=\"0 0 {PAGE_W} {PAGE_H}\" font-family=\"Arial, sans-serif\">"
    );
    let _ = writeln!(
        svg,
        "<rect x=\"0\" y=\"0\" width=\"{PAGE_W}\" height=\"{PAGE_H}\" fill=\"white\"/>"
    );

    // Title
    let _ = writeln!(
        svg,
        "<text x=\"{:.1}\" y=\"28\" text-anchor=\"middle\" font-size=\"18\">\
         Chromosome Comparison ({subgenomes} Subgenomes)</text>",
        (x_left + x_right) / 2.0
    );

    // Dashed y grid and tick labels
    for tick in 0..=4 {
        let value = y_max * tick as f64 / 4.0;
        let y = y_of(value);
        let _ = writeln!(
            svg,
            "<line x1=\"{x_left}\" y1=\"{y:.1}\" x2=\"{x_right}\" y2=\"{y:.1}\" \
             stroke=\"#cccccc\" stroke-dasharray=\"4,4\" stroke-opacity=\"0.6\"/>"
        );
        let _ = writeln!(
            svg,
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"11\">{value:.3}</text>",
            x_left - 8.0,
            y + 4.0
        );
    }

    // One trend line per subgenome across reference chromosomes
    for rank in 1..=subgenomes {
        let label = format!("SG{rank}");
        let mut points: Vec<(f64, f64)> = assignments
            .iter()
            .filter(|a| a.subgenome == label)
            .map(|a| (x_of(&a.ref_chr), y_of(a.distance)))
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        if points.len() < 2 {
            continue;
        }
        let style = &styles[rank - 1];
        let dash = if rank % 2 == 0 {
            " stroke-dasharray=\"10,6\""
        } else {
            ""
        };
        let path: Vec<String> = points
            .iter()
            .map(|(x, y)| format!("{x:.2},{y:.2}"))
            .collect();
        let _ = writeln!(
            svg,
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"3\" \
             stroke-opacity=\"0.5\"{dash}/>",
            path.join(" "),
            style.main
        );
    }

    // Dotted spread line per reference chromosome
    for chr in &chr_order {
        let distances: Vec<f64> = assignments
            .iter()
            .filter(|a| a.ref_chr == *chr)
            .map(|a| a.distance)
            .collect();
        if distances.len() < 2 {
            continue;
        }
        let lo = distances.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let x = x_of(chr);
        let _ = writeln!(
            svg,
            "<line x1=\"{x:.2}\" y1=\"{:.2}\" x2=\"{x:.2}\" y2=\"{:.2}\" stroke=\"#666666\" \
             stroke-dasharray=\"2,4\" stroke-opacity=\"0.5\" stroke-width=\"1\"/>",
            y_of(hi),
            y_of(lo)
        );
    }

    // Markers
    for a in assignments {
        let style = style_of(&a.subgenome);
        let _ = writeln!(
            svg,
            "{}",
            marker_element(
                style.marker,
                x_of(&a.ref_chr),
                y_of(a.distance),
                MARKER_RADIUS,
                &style.main,
                &style.edge
            )
        );
    }

    // Query-chromosome labels, rotated and rank-staggered to avoid collisions
    for a in assignments {
        let style = style_of(&a.subgenome);
        let x = x_of(&a.ref_chr);
        let y = y_of(a.distance) - (15.0 + 5.0 * sg_rank(&a.subgenome) as f64);
        let _ = writeln!(
            svg,
            "<text x=\"{x:.2}\" y=\"{y:.2}\" font-size=\"10\" fill=\"{}\" \
             transform=\"rotate(-45 {x:.2} {y:.2})\">{}</text>",
            style.main,
            xml_escape(&a.query_chr)
        );
    }

    // Axes
    let _ = writeln!(
        svg,
        "<line x1=\"{x_left}\" y1=\"{y_top}\" x2=\"{x_left}\" y2=\"{y_bottom}\" \
         stroke=\"black\" stroke-width=\"1.5\"/>"
    );
    let _ = writeln!(
        svg,
        "<line x1=\"{x_left}\" y1=\"{y_bottom}\" x2=\"{x_right}\" y2=\"{y_bottom}\" \
         stroke=\"black\" stroke-width=\"1.5\"/>"
    );

    // X tick labels: chromosome names
    for chr in &chr_order {
        let x = x_of(chr);
        let y = y_bottom + 16.0;
        let _ = writeln!(
            svg,
            "<text x=\"{x:.2}\" y=\"{y:.2}\" font-size=\"11\" text-anchor=\"end\" \
             transform=\"rotate(-45 {x:.2} {y:.2})\">{}</text>",
            xml_escape(chr)
        );
    }

    // Axis titles
    let _ = writeln!(
        svg,
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"14\">\
         Reference Chromosome</text>",
        (x_left + x_right) / 2.0,
        PAGE_H - 12.0
    );
    let _ = writeln!(
        svg,
        "<text x=\"18\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"14\" \
         transform=\"rotate(-90 18 {:.1})\">Mash Distance</text>",
        (y_top + y_bottom) / 2.0,
        (y_top + y_bottom) / 2.0
    );

    // Legend
    let legend_x = x_right + 24.0;
    let _ = writeln!(
        svg,
        "<text x=\"{legend_x:.1}\" y=\"{:.1}\" font-size=\"13\">Subgenomes (n={subgenomes})</text>",
        y_top + 4.0
    );
    for (i, style) in styles.iter().enumerate() {
        let y = y_top + 26.0 + i as f64 * 22.0;
        let _ = writeln!(
            svg,
            "{}",
            marker_element(style.marker, legend_x + 8.0, y, 6.0, &style.main, &style.edge)
        );
        let _ = writeln!(
            svg,
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\">SG{}</text>",
            legend_x + 24.0,
            y + 4.0,
            i + 1
        );
    }

    let _ = writeln!(svg, "</svg>");
    Ok(svg)
}

/// Render and write the chart to `path`.
pub fn write_svg_file<P: AsRef<Path>>(
    path: P,
    assignments: &[Assignment],
    subgenomes: usize,
) -> Result<()> {
    let svg = render_svg(assignments, subgenomes)?;
    fs::write(path, svg)?;
    Ok(())
}
