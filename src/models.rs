use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::GenerationError;

/// A prompt that passed the only pre-submission check: not blank
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    /// Accepts any text that is non-empty after trimming. The original text
    /// is kept as typed.
    pub fn parse(text: &str) -> Result<Prompt, GenerationError> {
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }
        Ok(Prompt(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Provider API token. Debug output is redacted so it never reaches the log.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Blank tokens count as "not configured"
    pub fn new(token: impl Into<String>) -> Option<Credential> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Credential(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Container format guessed from the leading signature bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
    Unknown,
}

impl ImageFormat {
    pub fn sniff(data: &[u8]) -> ImageFormat {
        if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            ImageFormat::Png
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            ImageFormat::Jpeg
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            ImageFormat::WebP
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            ImageFormat::Gif
        } else {
            ImageFormat::Unknown
        }
    }

    /// File extension used for downloads; unknown data is saved as png
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png | ImageFormat::Unknown => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::WebP => "webp",
            ImageFormat::Gif => "gif",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::WebP => "WebP",
            ImageFormat::Gif => "GIF",
            ImageFormat::Unknown => "unknown",
        }
    }
}

/// Opaque reference to downloaded image bytes, valid for this session only.
///
/// Cloning is cheap: clones share the same buffer.
#[derive(Clone, Debug)]
pub struct ImageHandle {
    data: Arc<[u8]>,
    content_type: Option<String>,
    prompt: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl ImageHandle {
    /// Wraps image bytes. Returns `None` for an empty body, so every handle
    /// refers to at least one byte.
    pub fn new(data: Vec<u8>, content_type: Option<String>, prompt: &str) -> Option<ImageHandle> {
        if data.is_empty() {
            return None;
        }
        Some(ImageHandle {
            data: data.into(),
            content_type,
            prompt: prompt.to_string(),
            created_at: chrono::Utc::now(),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Prompt the image was generated from (used as alt text)
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }

    pub fn format(&self) -> ImageFormat {
        ImageFormat::sniff(&self.data)
    }
}

/// Lifecycle of the generator: exactly one variant holds at a time
#[derive(Clone, Debug, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    Loading,
    Succeeded(ImageHandle),
    Failed(String),
}

impl GenerationState {
    pub fn is_loading(&self) -> bool {
        matches!(self, GenerationState::Loading)
    }

    pub fn image(&self) -> Option<&ImageHandle> {
        match self {
            GenerationState::Succeeded(image) => Some(image),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            GenerationState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Color scheme of the screen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn next(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::System,
            Theme::System => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::System => "System",
        }
    }

    /// Concrete theme to draw with; `System` follows `system`
    pub fn resolve(&self, system: Theme) -> Theme {
        match (self, system) {
            (Theme::System, Theme::Light) => Theme::Light,
            (Theme::System, _) => Theme::Dark,
            (other, _) => *other,
        }
    }

    /// `COLORFGBG` looks like `15;0` (fg;bg). Backgrounds 7 and 15 are light.
    pub fn from_colorfgbg(value: Option<&str>) -> Theme {
        let background = value
            .and_then(|v| v.rsplit(';').next())
            .and_then(|bg| bg.trim().parse::<u8>().ok());
        match background {
            Some(7) | Some(15) => Theme::Light,
            _ => Theme::Dark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_rejects_blank_input() {
        assert_eq!(Prompt::parse(""), Err(GenerationError::EmptyPrompt));
        assert_eq!(Prompt::parse(" \n\t "), Err(GenerationError::EmptyPrompt));
        let prompt = Prompt::parse("  a red fox ").unwrap();
        assert_eq!(prompt.as_str(), "  a red fox ");
    }

    #[test]
    fn test_credential_is_redacted() {
        let cred = Credential::new("hf_secret").unwrap();
        assert_eq!(format!("{:?}", cred), "Credential(***)");
        assert_eq!(cred.expose(), "hf_secret");
        assert!(Credential::new("   ").is_none());
    }

    #[test]
    fn test_image_handle_never_empty() {
        assert!(ImageHandle::new(Vec::new(), None, "x").is_none());
        let handle = ImageHandle::new(vec![0xFF, 0xD8, 0xFF, 0xE0], None, "x").unwrap();
        assert_eq!(handle.len(), 4);
        assert_eq!(handle.format(), ImageFormat::Jpeg);
        assert_eq!(handle.clone().bytes(), handle.bytes());
    }

    #[test]
    fn test_sniff_formats() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        assert_eq!(ImageFormat::sniff(&png), ImageFormat::Png);
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), ImageFormat::WebP);
        assert_eq!(ImageFormat::sniff(b"GIF89a..."), ImageFormat::Gif);
        assert_eq!(ImageFormat::sniff(b"hello"), ImageFormat::Unknown);
        assert_eq!(ImageFormat::Unknown.extension(), "png");
    }

    #[test]
    fn test_theme_cycle_and_resolution() {
        assert_eq!(Theme::Light.next(), Theme::Dark);
        assert_eq!(Theme::Dark.next(), Theme::System);
        assert_eq!(Theme::System.next(), Theme::Light);
        assert_eq!(Theme::from_colorfgbg(Some("0;15")), Theme::Light);
        assert_eq!(Theme::from_colorfgbg(Some("15;0")), Theme::Dark);
        assert_eq!(Theme::from_colorfgbg(None), Theme::Dark);
        assert_eq!(Theme::Light.resolve(Theme::Dark), Theme::Light);
        assert_eq!(Theme::Dark.resolve(Theme::Light), Theme::Dark);
        assert_eq!(Theme::System.resolve(Theme::Light), Theme::Light);
        assert_eq!(Theme::System.resolve(Theme::Dark), Theme::Dark);
        assert_eq!(Theme::System.resolve(Theme::System), Theme::Dark);
    }
}
