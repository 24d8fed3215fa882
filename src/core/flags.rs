//! Flag sets stored as lists of names
//!
//! Config files write flag values as JSON arrays of names, e.g.
//! `["LoadingInEditor", "DisableOverlay"]`. Older files used the C-style SDK
//! names (`"EOS_PF_LOADING_IN_EDITOR"`) or a raw number, so reading accepts:
//! - an array of names, OR-ed together
//! - a single name
//! - a non-negative number, taken as raw bits
//! - null, giving the empty set
//!
//! Any other JSON type is an error. Unknown names are skipped with a warning.

use std::fmt;
use std::marker::PhantomData;

use bitflags::{bitflags, Flags};
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserializer, Serializer};
use thiserror::Error;

/// Error converting names to flags on the command line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagsError {
    #[error("Unknown {kind} flag: {name}")]
    UnknownName { kind: &'static str, name: String },
}

/// Flag set with a table of accepted names
pub trait NamedFlags: Flags<Bits = u32> + Copy + 'static {
    /// Human-readable name of the flag set, used in messages
    const KIND: &'static str;

    /// Accepted names. The first entry for each value is the canonical one
    /// used when writing.
    const NAMES: &'static [(&'static str, u32)];

    fn from_flag_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, bits)| Self::from_bits_retain(*bits))
    }

    /// Canonical names of the set bits, and any bits no name covers
    fn to_flag_names(&self) -> (Vec<&'static str>, u32) {
        let bits = self.bits();
        let mut covered = 0u32;
        let mut names = Vec::new();
        for (name, value) in Self::NAMES {
            if *value == 0 || covered & value == *value {
                continue;
            }
            if bits & value == *value {
                names.push(*name);
                covered |= value;
            }
        }
        (names, bits & !covered)
    }
}

/// Parse names given on the command line. Unlike file input, unknown names
/// are an error.
pub fn parse_flag_names<F, I, S>(names: I) -> Result<F, FlagsError>
where
    F: NamedFlags,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut flags = F::empty();
    for name in names {
        let name = name.as_ref().trim();
        let flag = F::from_flag_name(name).ok_or_else(|| FlagsError::UnknownName {
            kind: F::KIND,
            name: name.to_string(),
        })?;
        flags = flags.union(flag);
    }
    Ok(flags)
}

fn serialize_flags<F: NamedFlags, S: Serializer>(flags: &F, serializer: S) -> Result<S::Ok, S::Error> {
    let (names, leftover) = flags.to_flag_names();
    if leftover != 0 {
        // Bits without a name only survive as a number
        return serializer.serialize_u32(flags.bits());
    }

    let mut seq = serializer.serialize_seq(Some(names.len()))?;
    for name in names {
        seq.serialize_element(name)?;
    }
    seq.end()
}

struct FlagsVisitor<F>(PhantomData<F>);

impl<F: NamedFlags> FlagsVisitor<F> {
    fn lookup(name: &str) -> F {
        F::from_flag_name(name).unwrap_or_else(|| {
            tracing::warn!(kind = F::KIND, name = %name, "Ignoring unknown flag name");
            F::empty()
        })
    }
}

impl<'de, F: NamedFlags> Visitor<'de> for FlagsVisitor<F> {
    type Value = F;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(
            formatter,
            "a {} flag name, a list of flag names, or a number",
            F::KIND
        )
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<F, E> {
        Ok(Self::lookup(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<F, E> {
        let bits = u32::try_from(v).map_err(|_| E::custom(format!("{} flags out of range: {}", F::KIND, v)))?;
        Ok(F::from_bits_retain(bits))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<F, E> {
        if v < 0 {
            return Err(E::invalid_value(de::Unexpected::Signed(v), &self));
        }
        self.visit_u64(v as u64)
    }

    // Hand-edited files sometimes hold `1.0`
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<F, E> {
        if v.fract() != 0.0 || v < 0.0 || v > f64::from(u32::MAX) {
            return Err(E::invalid_value(de::Unexpected::Float(v), &self));
        }
        self.visit_u64(v as u64)
    }

    fn visit_unit<E: de::Error>(self) -> Result<F, E> {
        Ok(F::empty())
    }

    fn visit_none<E: de::Error>(self) -> Result<F, E> {
        Ok(F::empty())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<F, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<F, A::Error> {
        let mut flags = F::empty();
        while let Some(name) = seq.next_element::<String>()? {
            flags = flags.union(Self::lookup(&name));
        }
        Ok(flags)
    }
}

fn deserialize_flags<'de, F: NamedFlags, D: Deserializer<'de>>(deserializer: D) -> Result<F, D::Error> {
    deserializer.deserialize_any(FlagsVisitor(PhantomData))
}

macro_rules! named_flags {
    ($ty:ident, $kind:literal, [$(($name:literal, $flag:expr)),* $(,)?]) => {
        impl NamedFlags for $ty {
            const KIND: &'static str = $kind;
            const NAMES: &'static [(&'static str, u32)] = &[$(($name, $flag.bits())),*];
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::empty()
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serialize_flags(self, serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserialize_flags(deserializer)
            }
        }
    };
}

bitflags! {
    /// Options passed when creating the EOS platform
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PlatformFlags: u32 {
        const LOADING_IN_EDITOR = 0x0000_0001;
        const DISABLE_OVERLAY = 0x0000_0002;
        const DISABLE_SOCIAL_OVERLAY = 0x0000_0004;
        const RESERVED1 = 0x0000_0008;
        const WINDOWS_ENABLE_OVERLAY_D3D9 = 0x0000_0010;
        const WINDOWS_ENABLE_OVERLAY_D3D10 = 0x0000_0020;
        const WINDOWS_ENABLE_OVERLAY_OPENGL = 0x0000_0040;
        const CONSOLE_ENABLE_OVERLAY_AUTOMATIC_UNLOADING = 0x0000_0080;
    }
}

named_flags!(PlatformFlags, "platform", [
    ("LoadingInEditor", PlatformFlags::LOADING_IN_EDITOR),
    ("EOS_PF_LOADING_IN_EDITOR", PlatformFlags::LOADING_IN_EDITOR),
    ("DisableOverlay", PlatformFlags::DISABLE_OVERLAY),
    ("EOS_PF_DISABLE_OVERLAY", PlatformFlags::DISABLE_OVERLAY),
    ("DisableSocialOverlay", PlatformFlags::DISABLE_SOCIAL_OVERLAY),
    ("EOS_PF_DISABLE_SOCIAL_OVERLAY", PlatformFlags::DISABLE_SOCIAL_OVERLAY),
    ("Reserved1", PlatformFlags::RESERVED1),
    ("EOS_PF_RESERVED1", PlatformFlags::RESERVED1),
    ("WindowsEnableOverlayD3D9", PlatformFlags::WINDOWS_ENABLE_OVERLAY_D3D9),
    ("EOS_PF_WINDOWS_ENABLE_OVERLAY_D3D9", PlatformFlags::WINDOWS_ENABLE_OVERLAY_D3D9),
    ("WindowsEnableOverlayD3D10", PlatformFlags::WINDOWS_ENABLE_OVERLAY_D3D10),
    ("EOS_PF_WINDOWS_ENABLE_OVERLAY_D3D10", PlatformFlags::WINDOWS_ENABLE_OVERLAY_D3D10),
    ("WindowsEnableOverlayOpengl", PlatformFlags::WINDOWS_ENABLE_OVERLAY_OPENGL),
    ("EOS_PF_WINDOWS_ENABLE_OVERLAY_OPENGL", PlatformFlags::WINDOWS_ENABLE_OVERLAY_OPENGL),
    ("ConsoleEnableOverlayAutomaticUnloading", PlatformFlags::CONSOLE_ENABLE_OVERLAY_AUTOMATIC_UNLOADING),
    ("EOS_PF_CONSOLE_ENABLE_OVERLAY_AUTOMATIC_UNLOADING", PlatformFlags::CONSOLE_ENABLE_OVERLAY_AUTOMATIC_UNLOADING),
    ("None", PlatformFlags::empty()),
    ("EOS_PF_NONE", PlatformFlags::empty()),
]);

bitflags! {
    /// Permissions requested when logging in through the auth interface
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AuthScopeFlags: u32 {
        const BASIC_PROFILE = 0x0001;
        const FRIENDS_LIST = 0x0002;
        const PRESENCE = 0x0004;
        const FRIENDS_MANAGEMENT = 0x0008;
        const EMAIL = 0x0010;
        const COUNTRY = 0x0020;
    }
}

named_flags!(AuthScopeFlags, "auth scope", [
    ("BasicProfile", AuthScopeFlags::BASIC_PROFILE),
    ("FriendsList", AuthScopeFlags::FRIENDS_LIST),
    ("Presence", AuthScopeFlags::PRESENCE),
    ("FriendsManagement", AuthScopeFlags::FRIENDS_MANAGEMENT),
    ("Email", AuthScopeFlags::EMAIL),
    ("Country", AuthScopeFlags::COUNTRY),
    ("NoFlags", AuthScopeFlags::empty()),
]);

bitflags! {
    /// How the SDK cooperates with an integrated platform such as Steam
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IntegratedPlatformManagementFlags: u32 {
        const DISABLED = 0x0001;
        const LIBRARY_MANAGED_BY_APPLICATION = 0x0002;
        const LIBRARY_MANAGED_BY_SDK = 0x0004;
        const DISABLE_PRESENCE_MIRRORING = 0x0008;
        const DISABLE_SDK_MANAGED_SESSIONS = 0x0010;
        const PREFER_EOS_IDENTITY = 0x0020;
        const PREFER_INTEGRATED_IDENTITY = 0x0040;
        const APPLICATION_MANAGED_IDENTITY_LOGIN = 0x0080;
    }
}

named_flags!(IntegratedPlatformManagementFlags, "integrated platform management", [
    ("Disabled", IntegratedPlatformManagementFlags::DISABLED),
    ("EOS_IPMF_Disabled", IntegratedPlatformManagementFlags::DISABLED),
    ("LibraryManagedByApplication", IntegratedPlatformManagementFlags::LIBRARY_MANAGED_BY_APPLICATION),
    ("EOS_IPMF_LibraryManagedByApplication", IntegratedPlatformManagementFlags::LIBRARY_MANAGED_BY_APPLICATION),
    ("EOS_IPMF_ManagedByApplication", IntegratedPlatformManagementFlags::LIBRARY_MANAGED_BY_APPLICATION),
    ("ManagedByApplication", IntegratedPlatformManagementFlags::LIBRARY_MANAGED_BY_APPLICATION),
    ("LibraryManagedBySDK", IntegratedPlatformManagementFlags::LIBRARY_MANAGED_BY_SDK),
    ("ManagedBySDK", IntegratedPlatformManagementFlags::LIBRARY_MANAGED_BY_SDK),
    ("EOS_IPMF_ManagedBySDK", IntegratedPlatformManagementFlags::LIBRARY_MANAGED_BY_SDK),
    ("EOS_IPMF_LibraryManagedBySDK", IntegratedPlatformManagementFlags::LIBRARY_MANAGED_BY_SDK),
    ("DisablePresenceMirroring", IntegratedPlatformManagementFlags::DISABLE_PRESENCE_MIRRORING),
    ("DisableSharedPresence", IntegratedPlatformManagementFlags::DISABLE_PRESENCE_MIRRORING),
    ("EOS_IPMF_DisableSharedPresence", IntegratedPlatformManagementFlags::DISABLE_PRESENCE_MIRRORING),
    ("EOS_IPMF_DisablePresenceMirroring", IntegratedPlatformManagementFlags::DISABLE_PRESENCE_MIRRORING),
    ("DisableSDKManagedSessions", IntegratedPlatformManagementFlags::DISABLE_SDK_MANAGED_SESSIONS),
    ("DisableSessions", IntegratedPlatformManagementFlags::DISABLE_SDK_MANAGED_SESSIONS),
    ("EOS_IPMF_DisableSessions", IntegratedPlatformManagementFlags::DISABLE_SDK_MANAGED_SESSIONS),
    ("EOS_IPMF_DisableSDKManagedSessions", IntegratedPlatformManagementFlags::DISABLE_SDK_MANAGED_SESSIONS),
    ("PreferEOSIdentity", IntegratedPlatformManagementFlags::PREFER_EOS_IDENTITY),
    ("PreferEOS", IntegratedPlatformManagementFlags::PREFER_EOS_IDENTITY),
    ("EOS_IPMF_PreferEOS", IntegratedPlatformManagementFlags::PREFER_EOS_IDENTITY),
    ("EOS_IPMF_PreferEOSIdentity", IntegratedPlatformManagementFlags::PREFER_EOS_IDENTITY),
    ("PreferIntegratedIdentity", IntegratedPlatformManagementFlags::PREFER_INTEGRATED_IDENTITY),
    ("PreferIntegrated", IntegratedPlatformManagementFlags::PREFER_INTEGRATED_IDENTITY),
    ("EOS_IPMF_PreferIntegrated", IntegratedPlatformManagementFlags::PREFER_INTEGRATED_IDENTITY),
    ("EOS_IPMF_PreferIntegratedIdentity", IntegratedPlatformManagementFlags::PREFER_INTEGRATED_IDENTITY),
    ("ApplicationManagedIdentityLogin", IntegratedPlatformManagementFlags::APPLICATION_MANAGED_IDENTITY_LOGIN),
    ("EOS_IPMF_ApplicationManagedIdentityLogin", IntegratedPlatformManagementFlags::APPLICATION_MANAGED_IDENTITY_LOGIN),
]);

bitflags! {
    /// Controller buttons, used for the overlay toggle combination
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InputStateButtonFlags: u32 {
        const DPAD_LEFT = 0x0001;
        const DPAD_RIGHT = 0x0002;
        const DPAD_DOWN = 0x0004;
        const DPAD_UP = 0x0008;
        const FACE_BUTTON_LEFT = 0x0010;
        const FACE_BUTTON_RIGHT = 0x0020;
        const FACE_BUTTON_BOTTOM = 0x0040;
        const FACE_BUTTON_TOP = 0x0080;
        const LEFT_SHOULDER = 0x0100;
        const RIGHT_SHOULDER = 0x0200;
        const LEFT_TRIGGER = 0x0400;
        const RIGHT_TRIGGER = 0x0800;
        const SPECIAL_LEFT = 0x1000;
        const SPECIAL_RIGHT = 0x2000;
        const LEFT_THUMBSTICK = 0x4000;
        const RIGHT_THUMBSTICK = 0x8000;
    }
}

named_flags!(InputStateButtonFlags, "input state button", [
    ("DPad_Left", InputStateButtonFlags::DPAD_LEFT),
    ("DPadLeft", InputStateButtonFlags::DPAD_LEFT),
    ("DPad_Right", InputStateButtonFlags::DPAD_RIGHT),
    ("DPadRight", InputStateButtonFlags::DPAD_RIGHT),
    ("DPad_Down", InputStateButtonFlags::DPAD_DOWN),
    ("DPadDown", InputStateButtonFlags::DPAD_DOWN),
    ("DPad_Up", InputStateButtonFlags::DPAD_UP),
    ("DPadUp", InputStateButtonFlags::DPAD_UP),
    ("FaceButton_Left", InputStateButtonFlags::FACE_BUTTON_LEFT),
    ("FaceButtonLeft", InputStateButtonFlags::FACE_BUTTON_LEFT),
    ("FaceButton_Right", InputStateButtonFlags::FACE_BUTTON_RIGHT),
    ("FaceButtonRight", InputStateButtonFlags::FACE_BUTTON_RIGHT),
    ("FaceButton_Bottom", InputStateButtonFlags::FACE_BUTTON_BOTTOM),
    ("FaceButtonBottom", InputStateButtonFlags::FACE_BUTTON_BOTTOM),
    ("FaceButton_Top", InputStateButtonFlags::FACE_BUTTON_TOP),
    ("FaceButtonTop", InputStateButtonFlags::FACE_BUTTON_TOP),
    ("LeftShoulder", InputStateButtonFlags::LEFT_SHOULDER),
    ("RightShoulder", InputStateButtonFlags::RIGHT_SHOULDER),
    ("LeftTrigger", InputStateButtonFlags::LEFT_TRIGGER),
    ("RightTrigger", InputStateButtonFlags::RIGHT_TRIGGER),
    ("Special_Left", InputStateButtonFlags::SPECIAL_LEFT),
    ("SpecialLeft", InputStateButtonFlags::SPECIAL_LEFT),
    ("Special_Right", InputStateButtonFlags::SPECIAL_RIGHT),
    ("SpecialRight", InputStateButtonFlags::SPECIAL_RIGHT),
    ("LeftThumbstick", InputStateButtonFlags::LEFT_THUMBSTICK),
    ("RightThumbstick", InputStateButtonFlags::RIGHT_THUMBSTICK),
    ("None", InputStateButtonFlags::empty()),
]);
