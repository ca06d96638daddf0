//! QR codes printed on tickets.

use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use eventz_common::{AppError, AppResult};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::{Color, QrCode};
use serde::{Deserialize, Serialize};

/// Current payload version.
pub const PAYLOAD_VERSION: u8 = 1;

/// JSON payload encoded in a ticket QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketQrPayload {
    #[serde(rename = "rId", alias = "registrationId")]
    pub registration_id: String,
    #[serde(rename = "rNo", default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(rename = "eId", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(rename = "v", default)]
    pub version: u8,
}

impl TicketQrPayload {
    #[must_use]
    pub fn new(registration_id: &str, registration_number: &str, event_id: &str) -> Self {
        Self {
            registration_id: registration_id.to_string(),
            registration_number: Some(registration_number.to_string()),
            event_id: Some(event_id.to_string()),
            version: PAYLOAD_VERSION,
        }
    }

    /// JSON text to encode.
    pub fn to_json(&self) -> AppResult<String> {
        serde_json::to_string(self).map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Parse scanned QR text. `None` when it is not a ticket payload.
    #[must_use]
    pub fn parse(data: &str) -> Option<Self> {
        serde_json::from_str(data).ok()
    }
}

/// Module grid of an encoded QR code.
#[derive(Clone)]
pub struct QrMatrix {
    code: QrCode,
}

impl std::fmt::Debug for QrMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrMatrix")
            .field("width", &self.code.width())
            .finish_non_exhaustive()
    }
}

impl QrMatrix {
    /// Encode `data`.
    pub fn encode(data: &str) -> AppResult<Self> {
        let code = QrCode::new(data.as_bytes())
            .map_err(|e| AppError::Internal(format!("QR encoding failed: {e}")))?;
        Ok(Self { code })
    }

    /// Modules per side.
    #[must_use]
    pub fn width(&self) -> usize {
        self.code.width()
    }

    /// Dark modules as `(x, y)`, row by row from the top.
    #[must_use]
    pub fn dark_modules(&self) -> Vec<(usize, usize)> {
        let width = self.width();
        self.code
            .to_colors()
            .iter()
            .enumerate()
            .filter(|(_, color)| **color == Color::Dark)
            .map(|(i, _)| (i % width, i / width))
            .collect()
    }

    /// Render as PNG bytes.
    pub fn to_png(&self) -> AppResult<Vec<u8>> {
        let image = self
            .code
            .render::<Luma<u8>>()
            .min_dimensions(240, 240)
            .build();

        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(image)
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| AppError::Internal(format!("PNG encoding failed: {e}")))?;
        Ok(buffer.into_inner())
    }

    /// Render as a `data:image/png;base64,` URL.
    pub fn to_data_url(&self) -> AppResult<String> {
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(self.to_png()?)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_json_shape() {
        let payload = TicketQrPayload::new("reg1", "REG-1700000000000", "ev1");
        let json: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();

        assert_eq!(json["rId"], "reg1");
        assert_eq!(json["rNo"], "REG-1700000000000");
        assert_eq!(json["eId"], "ev1");
        assert_eq!(json["v"], 1);
    }

    #[test]
    fn test_parse_accepts_alias() {
        let payload = TicketQrPayload::parse(r#"{"registrationId":"reg9"}"#).unwrap();
        assert_eq!(payload.registration_id, "reg9");
        assert!(TicketQrPayload::parse("not json").is_none());
        assert!(TicketQrPayload::parse(r#"{"foo":1}"#).is_none());
    }

    #[test]
    fn test_data_url_is_png() {
        let matrix = QrMatrix::encode(r#"{"rId":"reg1","v":1}"#).unwrap();
        let url = matrix.to_data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let png = STANDARD
            .decode(url.trim_start_matches("data:image/png;base64,"))
            .unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
        assert!(!matrix.dark_modules().is_empty());
        assert!(matrix.dark_modules().iter().all(|(x, y)| *x < matrix.width() && *y < matrix.width()));
    }
}
