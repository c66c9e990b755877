// Terminal display surface for the rotating attendance token.

use qrcode::render::unicode;
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

use crate::domain::{RotationPhase, RotationState, Token};

pub const REGENERATING_LABEL: &str = "Regenerating QR...";

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("failed to encode token as QR code: {0}")]
    Encode(#[from] QrError),
}

pub fn countdown_label(state: &RotationState) -> String {
    let seconds = state.seconds_remaining;
    match state.phase() {
        RotationPhase::Regenerating => REGENERATING_LABEL.to_string(),
        _ => format!("QR code will refresh in {seconds} seconds"),
    }
}

/// Encodes a token as a half-block Unicode QR code (light modules on dark).
pub fn render_qr(token: &Token) -> Result<String, DisplayError> {
    let code = QrCode::with_error_correction_level(token.as_str().as_bytes(), EcLevel::L)?;
    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}

/// Full screen contents for the current rotation state.
pub fn render_frame(batch_name: &str, state: &RotationState) -> Result<String, DisplayError> {
    let mut frame = format!("Attendance - {batch_name}\n\n");
    if !state.active {
        frame.push_str(&format!("Mark Attendance for {batch_name}\n"));
        return Ok(frame);
    }

    if let Some(token) = &state.current_token {
        frame.push_str(&render_qr(token)?);
        frame.push('\n');
    }
    frame.push_str(&countdown_label(state));
    frame.push('\n');
    frame.push_str("Press Ctrl-C to stop attendance\n");
    Ok(frame)
}
