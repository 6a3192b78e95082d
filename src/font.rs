//! A tiny 3x5 bitmap font for the HUD. Uppercase letters, digits, and the
//! punctuation the game text uses. Fallback for when no system TTF loads.

pub fn draw_text_line(
    buffer: &mut [u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    text: &str,
    color: (u8, u8, u8),
    scale: usize,
) {
    let mut cx = x;
    for c in text.chars() {
        draw_char(buffer, width, height, cx, y, c, color, scale);
        cx += (3 * scale) + scale; // 3 wide + 1 spacing, scaled
    }
}

pub fn measure_text_width(text: &str, scale: usize) -> usize {
    text.chars().count() * ((3 * scale) + scale)
}

pub fn line_height(scale: usize) -> usize {
    6 * scale
}

fn draw_char(
    buffer: &mut [u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    c: char,
    color: (u8, u8, u8),
    scale: usize,
) {
    // 5 rows, 3 bits per row, MSB is the left column.
    let map: [u8; 5] = match c.to_ascii_uppercase() {
        '0' => [0x7, 0x5, 0x5, 0x5, 0x7],
        '1' => [0x2, 0x6, 0x2, 0x2, 0x7],
        '2' => [0x7, 0x1, 0x7, 0x4, 0x7],
        '3' => [0x7, 0x1, 0x7, 0x1, 0x7],
        '4' => [0x5, 0x5, 0x7, 0x1, 0x1],
        '5' => [0x7, 0x4, 0x7, 0x1, 0x7],
        '6' => [0x7, 0x4, 0x7, 0x5, 0x7],
        '7' => [0x7, 0x1, 0x2, 0x4, 0x4],
        '8' => [0x7, 0x5, 0x7, 0x5, 0x7],
        '9' => [0x7, 0x5, 0x7, 0x1, 0x7],
        'A' => [0x2, 0x5, 0x7, 0x5, 0x5],
        'B' => [0x6, 0x5, 0x6, 0x5, 0x6],
        'C' => [0x3, 0x4, 0x4, 0x4, 0x3],
        'D' => [0x6, 0x5, 0x5, 0x5, 0x6],
        'E' => [0x7, 0x4, 0x6, 0x4, 0x7],
        'F' => [0x7, 0x4, 0x6, 0x4, 0x4],
        'G' => [0x3, 0x4, 0x5, 0x5, 0x3],
        'H' => [0x5, 0x5, 0x7, 0x5, 0x5],
        'I' => [0x7, 0x2, 0x2, 0x2, 0x7],
        'J' => [0x1, 0x1, 0x1, 0x5, 0x2],
        'K' => [0x5, 0x5, 0x6, 0x5, 0x5],
        'L' => [0x4, 0x4, 0x4, 0x4, 0x7],
        'M' => [0x5, 0x7, 0x7, 0x5, 0x5],
        'N' => [0x6, 0x5, 0x5, 0x5, 0x5],
        'O' => [0x2, 0x5, 0x5, 0x5, 0x2],
        'P' => [0x6, 0x5, 0x6, 0x4, 0x4],
        'Q' => [0x2, 0x5, 0x5, 0x2, 0x1],
        'R' => [0x6, 0x5, 0x6, 0x5, 0x5],
        'S' => [0x3, 0x4, 0x2, 0x1, 0x6],
        'T' => [0x7, 0x2, 0x2, 0x2, 0x2],
        'U' => [0x5, 0x5, 0x5, 0x5, 0x7],
        'V' => [0x5, 0x5, 0x5, 0x5, 0x2],
        'W' => [0x5, 0x5, 0x7, 0x7, 0x5],
        'X' => [0x5, 0x5, 0x2, 0x5, 0x5],
        'Y' => [0x5, 0x5, 0x2, 0x2, 0x2],
        'Z' => [0x7, 0x1, 0x2, 0x4, 0x7],
        ':' => [0x0, 0x2, 0x0, 0x2, 0x0],
        '-' => [0x0, 0x0, 0x7, 0x0, 0x0],
        '.' => [0x0, 0x0, 0x0, 0x0, 0x2],
        '?' => [0x7, 0x1, 0x2, 0x0, 0x2],
        '!' => [0x2, 0x2, 0x2, 0x0, 0x2],
        '[' => [0x3, 0x2, 0x2, 0x2, 0x3],
        ']' => [0x6, 0x2, 0x2, 0x2, 0x6],
        '/' => [0x1, 0x1, 0x2, 0x4, 0x4],
        ' ' => [0x0; 5],
        _ => [0x0; 5],
    };

    for (row, bits) in map.iter().enumerate() {
        for col in 0..3 {
            if bits & (0x4 >> col) == 0 {
                continue;
            }
            for sy in 0..scale {
                for sx in 0..scale {
                    let px = x + col * scale + sx;
                    let py = y + row * scale + sy;
                    if px >= width || py >= height {
                        continue;
                    }
                    let idx = (py * width + px) * 3;
                    if idx + 2 < buffer.len() {
                        buffer[idx] = color.0;
                        buffer[idx + 1] = color.1;
                        buffer[idx + 2] = color.2;
                    }
                }
            }
        }
    }
}
