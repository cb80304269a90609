use crate::types::{Bin, Solution};

const MAX_WIDTH: f64 = 80.0;

/// Plain-text summary: one line per bar with its cuts and leftover length.
pub fn format_report(solution: &Solution) -> String {
    let mut out = format!(
        "Stock length: {} (buffer {} per cut)\n",
        solution.capacity, solution.buffer
    );
    for (i, bin) in solution.bins.iter().enumerate() {
        let cuts: Vec<String> = bin.cuts.iter().map(|c| format!("{c:.2}")).collect();
        out.push_str(&format!(
            "Bar {}: [{}] (Unused: {:.2})\n",
            i + 1,
            cuts.join(", "),
            bin.unused
        ));
    }
    out.push_str(&format!(
        "Total bars used: {} ({:.1}% waste)\n",
        solution.bin_count(),
        solution.total_waste_percent()
    ));
    out
}

/// Draws one bar scaled to at most 80 columns. Cuts are `=` segments between
/// `|` marks, labelled when there is room; the offcut is drawn with `.`.
pub fn render_bar(capacity: f64, bin: &Bin) -> String {
    if capacity <= 0.0 {
        return String::new();
    }
    let scale = MAX_WIDTH / capacity;
    let width = (capacity * scale).round() as usize;
    let mut line = vec![' '; width + 1];

    let mut start = 0usize;
    let mut offset = 0.0;
    for &cut in &bin.cuts {
        offset += cut;
        let end = ((offset * scale).round() as usize).min(width);
        draw_segment(&mut line, start, end, '=');

        let label = format!("{cut}");
        let room = end.saturating_sub(start + 1);
        if label.len() <= room {
            let at = start + 1 + (room - label.len()) / 2;
            for (i, ch) in label.chars().enumerate() {
                line[at + i] = ch;
            }
        }
        start = end;
    }

    if start < width {
        draw_segment(&mut line, start, width, '.');
    }
    line.into_iter().collect::<String>().trim_end().to_string()
}

fn draw_segment(line: &mut [char], start: usize, end: usize, fill: char) {
    for cell in line.iter_mut().take(end).skip(start + 1) {
        *cell = fill;
    }
    line[start] = '|';
    line[end] = '|';
}
