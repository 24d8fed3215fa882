//! Declarative description of the fields in each config document
//!
//! Every document kind has a [`ConfigSchema`]: an ordered list of fields with
//! a label, help text, a display group and the validators that apply to it.
//! `validate` walks a raw JSON document with it, so problems that the lenient
//! loaders would silently paper over (skipped entries, unknown flag names,
//! nil GUIDs) are still reported.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use super::{DocumentKind, FieldIssue};
use crate::config::{ClientCredentials, Deployment};
use crate::core::flags::{
    AuthScopeFlags, InputStateButtonFlags, IntegratedPlatformManagementFlags, NamedFlags,
    PlatformFlags,
};
use crate::core::SandboxId;

/// The flag set a flags field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Platform,
    AuthScope,
    IntegratedPlatformManagement,
    InputStateButton,
}

impl FlagKind {
    fn is_known(&self, name: &str) -> bool {
        match self {
            FlagKind::Platform => PlatformFlags::from_flag_name(name).is_some(),
            FlagKind::AuthScope => AuthScopeFlags::from_flag_name(name).is_some(),
            FlagKind::IntegratedPlatformManagement => {
                IntegratedPlatformManagementFlags::from_flag_name(name).is_some()
            }
            FlagKind::InputStateButton => InputStateButtonFlags::from_flag_name(name).is_some(),
        }
    }
}

/// What kind of value a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Guid,
    SandboxId,
    Uint,
    Float,
    Bool,
    Flags(FlagKind),
    TextList,
    SetOfClients,
    Environments,
    Deployment,
    ClientCredentials,
    ThreadAffinity,
}

/// A check applied to a text value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValidator {
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
    Regex {
        pattern: &'static str,
        message: Option<&'static str>,
    },
}

impl FieldValidator {
    pub fn validate(&self, value: &str) -> Result<(), String> {
        match self {
            FieldValidator::Length { min, max } => {
                let len = value.chars().count();
                if let Some(min) = min.filter(|min| len < *min) {
                    return Err(format!("Must be at least {} characters long", min));
                }
                if let Some(max) = max.filter(|max| len > *max) {
                    return Err(format!("Must be no more than {} characters long", max));
                }
                Ok(())
            }
            FieldValidator::Regex { pattern, message } => {
                let regex = Regex::new(pattern)
                    .map_err(|e| format!("Invalid validation pattern {}: {}", pattern, e))?;
                if regex.is_match(value) {
                    Ok(())
                } else {
                    Err(message.map_or_else(
                        || format!("Must match the pattern {}", pattern),
                        str::to_string,
                    ))
                }
            }
        }
    }
}

/// One field of a config document
#[derive(Debug, Clone)]
pub struct FieldSchema {
    /// JSON key
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub help: &'static str,
    pub help_url: Option<&'static str>,
    /// Index into the owning schema's groups
    pub group: usize,
    pub validators: Vec<FieldValidator>,
    /// Validation is skipped when the value is empty
    pub optional: bool,
}

impl FieldSchema {
    pub fn new(key: &'static str, label: &'static str, kind: FieldKind, help: &'static str) -> Self {
        Self {
            key,
            label,
            kind,
            help,
            help_url: None,
            group: 0,
            validators: Vec::new(),
            optional: false,
        }
    }

    pub fn group(mut self, group: usize) -> Self {
        self.group = group;
        self
    }

    pub fn help_url(mut self, url: &'static str) -> Self {
        self.help_url = Some(url);
        self
    }

    pub fn validator(mut self, validator: FieldValidator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

static NULL: Value = Value::Null;

const PORTAL_URL: &str = "https://dev.epicgames.com/portal";
const ENCRYPTION_KEY_PATTERN: &str = "^[0-9a-fA-F]{64}$";

/// The fields of one document kind
#[derive(Debug, Clone)]
pub struct ConfigSchema {
    pub kind: DocumentKind,
    pub groups: &'static [&'static str],
    fields: Vec<FieldSchema>,
}

impl ConfigSchema {
    pub fn for_kind(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Product => Self::product(),
            DocumentKind::Platform => Self::platform(),
            DocumentKind::Steam => Self::steam(),
        }
    }

    pub fn product() -> Self {
        Self {
            kind: DocumentKind::Product,
            groups: &["Product Configuration", "Deployment Configuration"],
            fields: vec![
                FieldSchema::new(
                    "ProductName",
                    "Product Name",
                    FieldKind::Text,
                    "Enter your product name as it appears in the EOS Dev Portal here.",
                )
                .help_url(PORTAL_URL)
                .validator(FieldValidator::Length {
                    min: Some(1),
                    max: None,
                }),
                FieldSchema::new(
                    "ProductId",
                    "Product Id",
                    FieldKind::Guid,
                    "Enter your Product Id as it appears in the EOS Dev Portal here.",
                )
                .help_url(PORTAL_URL),
                FieldSchema::new(
                    "ProductVersion",
                    "Version",
                    FieldKind::Text,
                    "Use this to indicate to the EOS SDK your game version.",
                )
                .validator(FieldValidator::Length {
                    min: None,
                    max: Some(64),
                }),
                FieldSchema::new(
                    "Clients",
                    "Client Credentials",
                    FieldKind::SetOfClients,
                    "Enter the client credentials you have defined in the Epic Dev Portal.",
                )
                .group(1),
                FieldSchema::new(
                    "Environments",
                    "Production Environments",
                    FieldKind::Environments,
                    "Enter the details of your deployment and sandboxes as they exist within the Epic Dev Portal.",
                )
                .group(1),
            ],
        }
    }

    pub fn platform() -> Self {
        Self {
            kind: DocumentKind::Platform,
            groups: &["Deployment", "Flags", "Tick Budgets and Timeouts", "Overlay Options"],
            fields: vec![
                FieldSchema::new(
                    "deployment",
                    "Deployment",
                    FieldKind::Deployment,
                    "Select the deployment to use, as defined in the product config.",
                ),
                FieldSchema::new(
                    "clientCredentials",
                    "Client Credentials",
                    FieldKind::ClientCredentials,
                    "Select the client credentials to use, as defined in the product config.",
                ),
                FieldSchema::new(
                    "isServer",
                    "Is Server",
                    FieldKind::Bool,
                    "Check this if your game is a dedicated game server.",
                ),
                FieldSchema::new(
                    "platformOptionsFlags",
                    "Platform Flags",
                    FieldKind::Flags(FlagKind::Platform),
                    "Flags passed when the platform is created.",
                )
                .group(1),
                FieldSchema::new(
                    "authScopeOptionsFlags",
                    "Auth Scope Flags",
                    FieldKind::Flags(FlagKind::AuthScope),
                    "Permissions requested when users log in.",
                )
                .group(1),
                FieldSchema::new(
                    "integratedPlatformManagementFlags",
                    "Integrated Platform Management Flags",
                    FieldKind::Flags(FlagKind::IntegratedPlatformManagement),
                    "How the SDK cooperates with the platform's own services.",
                )
                .group(1),
                FieldSchema::new(
                    "tickBudgetInMilliseconds",
                    "Tick Budget (ms)",
                    FieldKind::Uint,
                    "Time the SDK may spend in each tick. Zero means no limit.",
                )
                .group(2),
                FieldSchema::new(
                    "taskNetworkTimeoutSeconds",
                    "Task Network Timeout Seconds",
                    FieldKind::Float,
                    "Seconds before a network task times out. Zero uses the SDK default.",
                )
                .group(2),
                FieldSchema::new(
                    "threadAffinity",
                    "Thread Affinity",
                    FieldKind::ThreadAffinity,
                    "Core masks for the SDK's worker threads.",
                )
                .group(2),
                FieldSchema::new(
                    "alwaysSendInputToOverlay",
                    "Always Send Input to Overlay",
                    FieldKind::Bool,
                    "Send controller input to the overlay even when it is not focused.",
                )
                .group(3),
                FieldSchema::new(
                    "initialButtonDelayForOverlay",
                    "Initial Button Delay",
                    FieldKind::Float,
                    "Seconds before a held button starts repeating in the overlay.",
                )
                .group(3),
                FieldSchema::new(
                    "repeatButtonDelayForOverlay",
                    "Repeat Button Delay",
                    FieldKind::Float,
                    "Seconds between repeats of a held button in the overlay.",
                )
                .group(3),
                FieldSchema::new(
                    "toggleFriendsButtonCombination",
                    "Toggle Friends Button Combination",
                    FieldKind::Flags(FlagKind::InputStateButton),
                    "Buttons that open the friends overlay when pressed together.",
                )
                .group(3),
                FieldSchema::new(
                    "overrideCountryCode",
                    "Override Country Code",
                    FieldKind::Text,
                    "Two-letter country code reported to the backend instead of the system one.",
                )
                .optional()
                .validator(FieldValidator::Regex {
                    pattern: "^[A-Za-z]{2}$",
                    message: Some("Must be a two-letter country code"),
                }),
                FieldSchema::new(
                    "overrideLocaleCode",
                    "Override Locale Code",
                    FieldKind::Text,
                    "Locale reported to the backend instead of the system one, e.g. en or pt-BR.",
                )
                .optional()
                .validator(FieldValidator::Regex {
                    pattern: "^[A-Za-z]{2,3}([-_][A-Za-z0-9]{2,8})*$",
                    message: Some("Must be a locale code such as en or pt-BR"),
                }),
            ],
        }
    }

    pub fn steam() -> Self {
        Self {
            kind: DocumentKind::Steam,
            groups: &["Steam Configuration"],
            fields: vec![
                FieldSchema::new(
                    "integratedPlatformManagementFlags",
                    "Integrated Platform Management Flags",
                    FieldKind::Flags(FlagKind::IntegratedPlatformManagement),
                    "Whether the Steam library is managed by the SDK or the application.",
                ),
                FieldSchema::new(
                    "overrideLibraryPath",
                    "Override Library Path",
                    FieldKind::Text,
                    "Path to a Steam API library to load instead of the bundled one.",
                )
                .optional(),
                FieldSchema::new(
                    "steamSDKMajorVersion",
                    "Steam SDK Major Version",
                    FieldKind::Uint,
                    "Major version of the Steamworks SDK in use.",
                ),
                FieldSchema::new(
                    "steamSDKMinorVersion",
                    "Steam SDK Minor Version",
                    FieldKind::Uint,
                    "Minor version of the Steamworks SDK in use.",
                ),
                FieldSchema::new(
                    "steamApiInterfaceVersionsArray",
                    "Steam API Interface Versions",
                    FieldKind::TextList,
                    "Steam interface versions the SDK should request.",
                ),
            ],
        }
    }

    /// Fields of a client credentials value
    pub fn client_credentials() -> Vec<FieldSchema> {
        vec![
            FieldSchema::new("ClientId", "Client ID", FieldKind::Text, "Client ID from the Dev Portal.")
                .validator(FieldValidator::Length {
                    min: Some(1),
                    max: None,
                }),
            FieldSchema::new(
                "ClientSecret",
                "Client Secret",
                FieldKind::Text,
                "Client secret from the Dev Portal.",
            )
            .validator(FieldValidator::Length {
                min: Some(1),
                max: None,
            }),
            FieldSchema::new(
                "EncryptionKey",
                "Encryption Key",
                FieldKind::Text,
                "Key used to encrypt Player Data Storage and Title Storage files.",
            )
            .optional()
            .validator(FieldValidator::Regex {
                pattern: ENCRYPTION_KEY_PATTERN,
                message: Some("Encryption key must be exactly 64 hexadecimal characters"),
            }),
        ]
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Fields grouped for display, in group order
    pub fn grouped(&self) -> Vec<(&'static str, Vec<&FieldSchema>)> {
        self.groups
            .iter()
            .enumerate()
            .map(|(index, label)| {
                let fields = self.fields.iter().filter(|f| f.group == index).collect();
                (*label, fields)
            })
            .collect()
    }

    /// Check a raw document with the field validators. Missing fields are not
    /// reported here; the JSON schema covers shape.
    pub fn validate(&self, document: &Value) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        self.validate_against(&self.fields, document, "", &mut issues);
        issues
    }

    fn validate_against(
        &self,
        fields: &[FieldSchema],
        object: &Value,
        path: &str,
        issues: &mut Vec<FieldIssue>,
    ) {
        for field in fields {
            if let Some(value) = object.get(field.key) {
                let field_path = format!("{}/{}", path, field.key);
                self.validate_field(field, value, &field_path, issues);
            }
        }
    }

    fn validate_field(
        &self,
        field: &FieldSchema,
        value: &Value,
        path: &str,
        issues: &mut Vec<FieldIssue>,
    ) {
        match field.kind {
            FieldKind::Text => {
                // null loads as empty text
                let text = match value {
                    Value::Null => "",
                    Value::String(text) => text.as_str(),
                    _ => {
                        issues.push(FieldIssue::error(path, "Expected text"));
                        return;
                    }
                };
                if field.optional && text.is_empty() {
                    return;
                }
                for validator in &field.validators {
                    if let Err(message) = validator.validate(text) {
                        issues.push(FieldIssue::error(path, format!("{}: {}", field.label, message)));
                    }
                }
            }
            FieldKind::Guid => match value.as_str().map(str::trim) {
                None | Some("") => {
                    issues.push(FieldIssue::warning(path, format!("{} is not set", field.label)))
                }
                Some(text) => match Uuid::parse_str(text) {
                    Ok(id) if id.is_nil() => {
                        issues.push(FieldIssue::warning(path, format!("{} is not set", field.label)))
                    }
                    Ok(_) => {}
                    Err(_) => issues.push(FieldIssue::error(
                        path,
                        format!("{}: '{}' is not a GUID", field.label, text),
                    )),
                },
            },
            FieldKind::SandboxId => {
                let raw = value.get("Value").unwrap_or(value);
                if let Some(text) = raw.as_str() {
                    if let Err(e) = SandboxId::parse(text) {
                        issues.push(FieldIssue::error(path, e.to_string()));
                    }
                }
            }
            FieldKind::Flags(kind) => {
                let names: Vec<&str> = match value {
                    Value::String(name) => vec![name.as_str()],
                    Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
                    _ => Vec::new(),
                };
                for name in names {
                    if !kind.is_known(name) {
                        issues.push(FieldIssue::warning(
                            path,
                            format!("{}: unknown flag '{}' will be ignored", field.label, name),
                        ));
                    }
                }
            }
            FieldKind::SetOfClients => {
                let schema = Self::client_credentials();
                self.validate_named_set::<ClientCredentials, _>(value, path, issues, |item, item_path, issues| {
                    self.validate_against(&schema, item, item_path, issues)
                });
            }
            FieldKind::Environments => {
                if let Some(deployments) = value.get("Deployments") {
                    let deployments_path = format!("{}/Deployments", path);
                    self.validate_named_set::<Deployment, _>(deployments, &deployments_path, issues, |item, item_path, issues| {
                        self.validate_deployment(item, item_path, issues)
                    });
                }
                if let Some(sandboxes) = value.get("Sandboxes") {
                    let sandboxes_path = format!("{}/Sandboxes", path);
                    let sandbox_field = FieldSchema::new("Value", "Sandbox", FieldKind::SandboxId, "");
                    self.validate_named_set::<SandboxId, _>(sandboxes, &sandboxes_path, issues, |item, item_path, issues| {
                        self.validate_field(&sandbox_field, item, item_path, issues)
                    });
                }
            }
            FieldKind::Deployment => self.validate_deployment(value, path, issues),
            FieldKind::ClientCredentials => {
                let schema = Self::client_credentials();
                if value.get("ClientId").and_then(Value::as_str).unwrap_or("").is_empty() {
                    issues.push(FieldIssue::warning(path, "No client credentials selected"));
                    return;
                }
                self.validate_against(&schema, value, path, issues);
            }
            FieldKind::Uint | FieldKind::Float | FieldKind::Bool | FieldKind::TextList => {}
            FieldKind::ThreadAffinity => {}
        }
    }

    fn validate_deployment(&self, value: &Value, path: &str, issues: &mut Vec<FieldIssue>) {
        let fields = [
            FieldSchema::new("DeploymentId", "Deployment Id", FieldKind::Guid, ""),
            FieldSchema::new("SandboxId", "Sandbox Id", FieldKind::SandboxId, ""),
        ];
        self.validate_against(&fields, value, path, issues);
    }

    /// Report entries the loader would skip, then check each value. Values
    /// are compared in their loaded form, so differently spelled GUIDs for the
    /// same id count as duplicates.
    fn validate_named_set<T, F>(&self, value: &Value, path: &str, issues: &mut Vec<FieldIssue>, mut check: F)
    where
        T: DeserializeOwned + PartialEq,
        F: FnMut(&Value, &str, &mut Vec<FieldIssue>),
    {
        let Some(items) = value.as_array() else {
            return;
        };

        let mut names: Vec<&str> = Vec::new();
        let mut values: Vec<&Value> = Vec::new();
        let mut loaded: Vec<T> = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let item_path = format!("{}/{}", path, index);
            let name = item.get("Name").and_then(Value::as_str).unwrap_or("");
            let inner = item.get("Value").unwrap_or(&NULL);
            let typed = serde_json::from_value::<T>(inner.clone()).ok();
            let duplicate = values.contains(&inner)
                || typed.as_ref().is_some_and(|typed| loaded.contains(typed));

            if name.is_empty() {
                issues.push(FieldIssue::warning(&item_path, "Entry has no name and will be skipped"));
            } else if names.contains(&name) {
                issues.push(FieldIssue::warning(
                    &item_path,
                    format!("Duplicate name '{}', entry will be skipped", name),
                ));
            } else if duplicate {
                issues.push(FieldIssue::warning(
                    &item_path,
                    format!("'{}' duplicates an earlier value and will be skipped", name),
                ));
            }
            names.push(name);
            values.push(inner);
            loaded.extend(typed);

            check(inner, &format!("{}/Value", item_path), issues);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Severity;
    use serde_json::json;

    #[test]
    fn test_length_validator() {
        let v = FieldValidator::Length {
            min: Some(2),
            max: Some(4),
        };
        assert!(v.validate("ab").is_ok());
        assert!(v.validate("a").unwrap_err().contains("at least 2"));
        assert!(v.validate("abcde").unwrap_err().contains("no more than 4"));
    }

    #[test]
    fn test_regex_validator_messages() {
        let custom = FieldValidator::Regex {
            pattern: "^x+$",
            message: Some("only x"),
        };
        assert_eq!(custom.validate("y"), Err("only x".to_string()));

        let default = FieldValidator::Regex {
            pattern: "^x+$",
            message: None,
        };
        assert!(default.validate("y").unwrap_err().contains("^x+$"));
        assert!(default.validate("xxx").is_ok());
    }

    #[test]
    fn test_product_fields_and_groups() {
        let schema = ConfigSchema::product();
        assert_eq!(schema.fields()[0].key, "ProductName");
        assert_eq!(schema.field("Clients").unwrap().kind, FieldKind::SetOfClients);

        let grouped = schema.grouped();
        assert_eq!(grouped[1].0, "Deployment Configuration");
        assert_eq!(grouped[1].1.len(), 2);
    }

    #[test]
    fn test_valid_product_document_has_no_errors() {
        let document = json!({
            "ProductName": "Game",
            "ProductId": "0123456789abcdef0123456789abcdef",
            "ProductVersion": "1.0",
            "Clients": [
                {"Name": "Client", "Value": {"ClientId": "id", "ClientSecret": "secret", "EncryptionKey": ""}}
            ],
            "Environments": {
                "Deployments": [
                    {"Name": "Deployment", "Value": {
                        "DeploymentId": "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                        "SandboxId": {"Value": "11111111111111111111111111111111"}
                    }}
                ],
                "Sandboxes": [
                    {"Name": "Sandbox", "Value": {"Value": "11111111111111111111111111111111"}}
                ]
            }
        });
        let issues = ConfigSchema::product().validate(&document);
        assert!(issues.is_empty(), "{:?}", issues);
    }

    #[test]
    fn test_product_document_problems_reported() {
        let document = json!({
            "ProductName": "",
            "ProductId": "zzz",
            "Clients": [
                {"Name": "Client", "Value": {"ClientId": "id", "ClientSecret": "s", "EncryptionKey": "abc"}},
                {"Name": "Client", "Value": {"ClientId": "other", "ClientSecret": "s"}}
            ],
            "Environments": {
                "Sandboxes": [{"Name": "Sandbox", "Value": {"Value": "bad"}}]
            }
        });
        let issues = ConfigSchema::product().validate(&document);
        let paths: Vec<_> = issues.iter().map(|i| i.path.as_str()).collect();

        assert!(paths.contains(&"/ProductName"));
        assert!(paths.contains(&"/ProductId"));
        assert!(paths.contains(&"/Clients/0/Value/EncryptionKey"));
        assert!(paths.contains(&"/Clients/1"));
        assert!(paths.contains(&"/Environments/Sandboxes/0/Value"));

        let duplicate = issues.iter().find(|i| i.path == "/Clients/1").unwrap();
        assert_eq!(duplicate.severity, Severity::Warning);
    }

    #[test]
    fn test_equivalent_values_spelled_differently_are_duplicates() {
        let document = json!({
            "Clients": [
                {"Name": "Client", "Value": {"ClientId": "id", "ClientSecret": "s"}},
                {"Name": "Copy", "Value": {"ClientId": "id", "ClientSecret": "s", "EncryptionKey": ""}}
            ],
            "Environments": {
                "Sandboxes": [
                    {"Name": "Sandbox", "Value": {"Value": "11111111111111111111111111111111"}},
                    {"Name": "Hyphenated", "Value": {"Value": "11111111-1111-1111-1111-111111111111"}}
                ]
            }
        });
        let issues = ConfigSchema::product().validate(&document);
        let paths: Vec<_> = issues.iter().map(|i| i.path.as_str()).collect();

        assert!(paths.contains(&"/Clients/1"), "{:?}", issues);
        assert!(paths.contains(&"/Environments/Sandboxes/1"), "{:?}", issues);
        assert!(!paths.contains(&"/Environments/Sandboxes/0"));
    }

    #[test]
    fn test_unknown_flag_names_warned() {
        let document = json!({"platformOptionsFlags": ["LoadingInEditor", "Teleport"]});
        let issues = ConfigSchema::platform().validate(&document);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert!(issues[0].message.contains("Teleport"));
    }

    #[test]
    fn test_platform_optional_codes() {
        let ok = json!({"overrideCountryCode": "", "overrideLocaleCode": "pt-BR"});
        assert!(ConfigSchema::platform().validate(&ok).is_empty());

        let bad = json!({"overrideCountryCode": "USA"});
        let issues = ConfigSchema::platform().validate(&bad);
        assert_eq!(issues[0].path, "/overrideCountryCode");
        assert_eq!(issues[0].severity, Severity::Error);
    }
}
