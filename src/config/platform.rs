//! Per-platform configuration: `eos_<platform>_config.json`

use std::fmt;

use serde::{Deserialize, Serialize};

use super::credentials::ClientCredentials;
use super::environments::Deployment;
use super::{Config, CURRENT_SCHEMA_VERSION};
use crate::core::flags::{
    AuthScopeFlags, InputStateButtonFlags, IntegratedPlatformManagementFlags, PlatformFlags,
};
use crate::core::Version;

/// Platforms that get their own config file
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    #[value(name = "macos")]
    #[serde(rename = "macos")]
    MacOS,
    Android,
    #[value(name = "ios")]
    #[serde(rename = "ios")]
    IOS,
}

impl Platform {
    pub const fn all() -> &'static [Platform] {
        &[
            Platform::Windows,
            Platform::Linux,
            Platform::MacOS,
            Platform::Android,
            Platform::IOS,
        ]
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOS => "macos",
            Platform::Android => "android",
            Platform::IOS => "ios",
        }
    }

    pub fn file_name(&self) -> String {
        format!("eos_{}_config.json", self.as_str())
    }

    /// Inverse of [`Platform::file_name`]
    pub fn from_file_name(file_name: &str) -> Option<Platform> {
        Self::all()
            .iter()
            .copied()
            .find(|platform| platform.file_name() == file_name)
    }

    pub const fn is_desktop(&self) -> bool {
        matches!(self, Platform::Windows | Platform::Linux | Platform::MacOS)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CPU core masks for the SDK's worker threads. Zero leaves the choice to
/// the SDK.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadAffinity {
    #[serde(rename = "NetworkWork")]
    pub network_work: u64,
    #[serde(rename = "StorageIo")]
    pub storage_io: u64,
    #[serde(rename = "WebSocketIo")]
    pub web_socket_io: u64,
    #[serde(rename = "P2PIo")]
    pub p2p_io: u64,
    #[serde(rename = "HttpRequestIo")]
    pub http_request_io: u64,
    #[serde(rename = "RTCIo")]
    pub rtc_io: u64,
    #[serde(rename = "EmbeddedOverlayMainThread")]
    pub embedded_overlay_main_thread: u64,
    #[serde(rename = "EmbeddedOverlayWorkerThreads")]
    pub embedded_overlay_worker_threads: u64,
}

impl ThreadAffinity {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Settings used when creating the EOS platform on one target platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<Version>,

    /// Deployment to use, from the product config's environments
    pub deployment: Deployment,

    /// Client to use, from the product config's clients
    pub client_credentials: ClientCredentials,

    pub is_server: bool,

    pub platform_options_flags: PlatformFlags,
    pub auth_scope_options_flags: AuthScopeFlags,
    pub integrated_platform_management_flags: IntegratedPlatformManagementFlags,

    /// Time the SDK may spend per tick; zero means no limit
    pub tick_budget_in_milliseconds: u32,

    /// Seconds before network tasks time out; zero or less uses the SDK default
    pub task_network_timeout_seconds: f64,

    pub thread_affinity: ThreadAffinity,

    pub always_send_input_to_overlay: bool,
    pub initial_button_delay_for_overlay: f32,
    pub repeat_button_delay_for_overlay: f32,
    pub toggle_friends_button_combination: InputStateButtonFlags,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_locale_code: Option<String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            schema_version: None,
            deployment: Deployment::default(),
            client_credentials: ClientCredentials::default(),
            is_server: false,
            platform_options_flags: PlatformFlags::empty(),
            auth_scope_options_flags: AuthScopeFlags::empty(),
            integrated_platform_management_flags: IntegratedPlatformManagementFlags::empty(),
            tick_budget_in_milliseconds: 0,
            task_network_timeout_seconds: 0.0,
            thread_affinity: ThreadAffinity::default(),
            always_send_input_to_overlay: false,
            initial_button_delay_for_overlay: 0.0,
            repeat_button_delay_for_overlay: 0.0,
            toggle_friends_button_combination: InputStateButtonFlags::SPECIAL_LEFT,
            override_country_code: None,
            override_locale_code: None,
        }
    }
}

impl PlatformConfig {
    /// A fresh document with the defaults used for `platform`
    pub fn for_platform(platform: Platform) -> Self {
        let mut config = Self {
            schema_version: Some(CURRENT_SCHEMA_VERSION),
            auth_scope_options_flags: AuthScopeFlags::BASIC_PROFILE
                | AuthScopeFlags::FRIENDS_LIST
                | AuthScopeFlags::PRESENCE,
            ..Self::default()
        };

        if platform == Platform::Windows {
            config.platform_options_flags = PlatformFlags::WINDOWS_ENABLE_OVERLAY_D3D9
                | PlatformFlags::WINDOWS_ENABLE_OVERLAY_D3D10
                | PlatformFlags::WINDOWS_ENABLE_OVERLAY_OPENGL;
        }

        if !platform.is_desktop() {
            config.initial_button_delay_for_overlay = 0.5;
            config.repeat_button_delay_for_overlay = 0.25;
        }

        config
    }

    /// Neither a deployment nor a client has been chosen yet
    pub fn is_unassigned(&self) -> bool {
        self.deployment.is_unset() && self.client_credentials.is_empty()
    }
}

impl Config for PlatformConfig {
    fn schema_version(&self) -> Option<Version> {
        self.schema_version
    }

    fn set_schema_version(&mut self, version: Version) {
        self.schema_version = Some(version);
    }

    fn after_load(&mut self) {
        for code in [&mut self.override_country_code, &mut self.override_locale_code] {
            if code.as_deref().is_some_and(|c| c.trim().is_empty()) {
                *code = None;
            }
        }
    }
}
