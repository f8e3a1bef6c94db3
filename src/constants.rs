//! Application constants
//!
//! Centralized location for provider defaults and user-facing strings.

/// Model used when neither the config file nor the environment names one
pub const DEFAULT_MODEL: &str = "stabilityai/stable-diffusion-xl-base-1.0";

/// Hosted inference router; the model id is appended to form the endpoint
pub const PROVIDER_BASE_URL: &str = "https://router.huggingface.co/hf-inference/models";

/// Environment variables checked for the provider token, in order
pub const CREDENTIAL_ENV_VARS: [&str; 2] = ["HF_TOKEN", "HUGGINGFACE_TOKEN"];

/// Base name of downloaded images (extension follows the sniffed format)
pub const DOWNLOAD_STEM: &str = "generated_image";

/// Default transport timeout; image models routinely take tens of seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Name of the per-user configuration directory under $HOME
pub const CONFIG_DIR_NAME: &str = ".imagegen";

/// Application name
pub const APP_NAME: &str = "ImageGen TUI";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Credit shown at the right of the footer
pub const CREDIT_LINE: &str = "Made by Codeland";

/// Placeholder shown in the empty prompt editor
pub const PROMPT_PLACEHOLDER: &str =
    "A majestic lion leaping from a large rock at sunset";
