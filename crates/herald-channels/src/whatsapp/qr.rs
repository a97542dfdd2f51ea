//! Terminal QR rendering for bridge pairing.

use herald_core::error::HeraldError;

/// Render a QR code for terminal display using Unicode half-block characters.
///
/// Two module rows share one line of text (`▀`, `▄`, `█`, space), with a
/// one-module light border.
pub fn generate_qr_terminal(qr_data: &str) -> Result<String, HeraldError> {
    use qrcode::{Color, EcLevel, QrCode};

    let code = QrCode::with_error_correction_level(qr_data.as_bytes(), EcLevel::L)
        .map_err(|e| HeraldError::Transport(format!("QR generation failed: {e}")))?;

    let width = code.width();
    let colors: Vec<Color> = code.into_colors();
    // Coordinates include the border, so (0, 0) is outside the code.
    let is_dark = |row: usize, col: usize| -> bool {
        match (row.checked_sub(1), col.checked_sub(1)) {
            (Some(r), Some(c)) if r < width && c < width => colors[r * width + c] == Color::Dark,
            _ => false,
        }
    };

    let size = width + 2;
    let mut out = String::with_capacity((size + 1) * size.div_ceil(2) * 3);
    let mut row = 0;
    while row < size {
        for col in 0..size {
            out.push(match (is_dark(row, col), is_dark(row + 1, col)) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        out.push('\n');
        row += 2;
    }

    Ok(out)
}
