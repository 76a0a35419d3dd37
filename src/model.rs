//! The extracted schema model.
//!
//! Everything here is plain owned data with `serde` derives, shaped for
//! downstream code generators: configurations and commands carry typed
//! parameter lists, statuses carry a return value space, events carry a
//! recursive body tree. Method paths are kept as the segment lists printed
//! in the manual (`["xConfiguration", "Audio", "Volume"]`), brackets and
//! all; [`Configuration::path_without_brackets`] gives the normalized form
//! with array-index segments replaced by `"N"`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The complete schema recovered from one manual (plus, optionally, one
/// event schema file).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedDocumentation {
    pub configurations: Vec<Configuration>,
    pub commands: Vec<Command>,
    pub statuses: Vec<Status>,
    pub events: Vec<Event>,
}

/// Fields shared by every documented method regardless of category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodHeader {
    /// Space-separated path segments as printed, e.g.
    /// `["xConfiguration", "Audio", "Input", "HDMI[n]", "Level"]`.
    pub path: Vec<String>,
    /// Products this method exists on. Empty means all products.
    pub applies_to: BTreeSet<Product>,
    pub requires_user_role: BTreeSet<UserRole>,
    pub description: String,
}

impl MethodHeader {
    /// The path with the leading category word (`xConfiguration` etc.)
    /// removed, for duplicate detection across re-documented methods.
    pub fn path_tail(&self) -> &[String] {
        self.path.get(1..).unwrap_or(&[])
    }
}

/// A writable setting (`xConfiguration` section).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(flatten)]
    pub header: MethodHeader,
    pub parameters: Vec<Parameter>,
}

/// An invocable method (`xCommand` section). Structurally identical to a
/// configuration; kept distinct because generators treat them differently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Command {
    #[serde(flatten)]
    pub header: MethodHeader,
    pub parameters: Vec<Parameter>,
}

/// A read-only state variable (`xStatus` section).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(flatten)]
    pub header: MethodHeader,
    /// Integer parameters that address array slots inside the path, e.g. the
    /// `[n]` of `xStatus Video Input Connector [n] Connected`.
    pub array_index_parameters: Vec<IntParameter>,
    /// The return value space. `None` only while parsing is in progress.
    pub value_space: Option<ValueSpace>,
}

fn path_with_index_placeholders(path: &[String], positions: &[usize]) -> Vec<String> {
    path.iter()
        .enumerate()
        .map(|(i, segment)| {
            if positions.contains(&i) {
                "N".to_string()
            } else {
                segment.clone()
            }
        })
        .collect()
}

impl Configuration {
    /// The path with every segment addressed by a positional int parameter
    /// replaced by `"N"`.
    pub fn path_without_brackets(&self) -> Vec<String> {
        let positions: Vec<usize> = self
            .parameters
            .iter()
            .filter_map(|p| match p {
                Parameter::Int(ip) => ip.position_in_path,
                _ => None,
            })
            .collect();
        path_with_index_placeholders(&self.header.path, &positions)
    }
}

impl Command {
    pub fn path_without_brackets(&self) -> Vec<String> {
        let positions: Vec<usize> = self
            .parameters
            .iter()
            .filter_map(|p| match p {
                Parameter::Int(ip) => ip.position_in_path,
                _ => None,
            })
            .collect();
        path_with_index_placeholders(&self.header.path, &positions)
    }
}

impl Status {
    pub fn path_without_brackets(&self) -> Vec<String> {
        let positions: Vec<usize> = self
            .array_index_parameters
            .iter()
            .filter_map(|p| p.position_in_path)
            .collect();
        path_with_index_placeholders(&self.header.path, &positions)
    }
}

// ── Parameters ────────────────────────────────────────────────────────────

/// Fields shared by every parameter kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterMeta {
    pub name: String,
    pub description: String,
    /// The italic value-space text as printed, verbatim.
    pub value_space_description: Option<String>,
    pub required: bool,
    pub default_value: Option<String>,
    /// Products this parameter is limited to. `None` means unrestricted.
    pub applies_to: Option<BTreeSet<Product>>,
}

/// A typed method parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Parameter {
    Int(IntParameter),
    String(StringParameter),
    Enum(EnumParameter),
}

impl Parameter {
    pub fn meta(&self) -> &ParameterMeta {
        match self {
            Parameter::Int(p) => &p.meta,
            Parameter::String(p) => &p.meta,
            Parameter::Enum(p) => &p.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut ParameterMeta {
        match self {
            Parameter::Int(p) => &mut p.meta,
            Parameter::String(p) => &mut p.meta,
            Parameter::Enum(p) => &mut p.meta,
        }
    }

    pub fn name(&self) -> &str {
        &self.meta().name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntParameter {
    #[serde(flatten)]
    pub meta: ParameterMeta,
    pub ranges: Vec<IntRange>,
    /// When set, this parameter is spliced into the method path at this
    /// segment index instead of being passed by name.
    pub position_in_path: Option<usize>,
    /// Literal prefix printed before the bracketed index in usage text,
    /// e.g. the `HDMI` of `HDMI[n]`.
    pub name_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringParameter {
    #[serde(flatten)]
    pub meta: ParameterMeta,
    pub min_length: usize,
    pub max_length: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumParameter {
    #[serde(flatten)]
    pub meta: ParameterMeta,
    pub values: EnumValueSet,
}

/// An inclusive integer range, possibly limited to specific products.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntRange {
    pub minimum: i64,
    pub maximum: i64,
    pub description: Option<String>,
    pub applies_to: BTreeSet<Product>,
}

// ── Enum values ───────────────────────────────────────────────────────────

/// One member of an enumerated value space. Identity is the name compared
/// case-insensitively; the manual's casing is preserved for output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub description: Option<String>,
}

impl EnumValue {
    pub fn new(name: impl Into<String>) -> Self {
        EnumValue {
            name: name.into(),
            description: None,
        }
    }
}

impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for EnumValue {}

/// An insertion-ordered set of [`EnumValue`]s with case-insensitive
/// name identity. The manual's ordering is meaningful (it matches the
/// printed list), so a hash set is not usable here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnumValueSet(Vec<EnumValue>);

impl EnumValueSet {
    pub fn new() -> Self {
        EnumValueSet(Vec::new())
    }

    /// Insert preserving order; a value whose name is already present
    /// (ignoring case) is dropped.
    pub fn insert(&mut self, value: EnumValue) -> bool {
        if self.0.contains(&value) {
            false
        } else {
            self.0.push(value);
            true
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|v| v.name.eq_ignore_ascii_case(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut EnumValue> {
        self.0.iter_mut().find(|v| v.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnumValue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<EnumValue> for EnumValueSet {
    fn from_iter<I: IntoIterator<Item = EnumValue>>(iter: I) -> Self {
        let mut set = EnumValueSet::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<'a> IntoIterator for &'a EnumValueSet {
    type Item = &'a EnumValue;
    type IntoIter = std::slice::Iter<'a, EnumValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ── Status value spaces ───────────────────────────────────────────────────

/// The domain of a status's return value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSpace {
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: ValueSpaceKind,
}

impl ValueSpace {
    pub fn new(kind: ValueSpaceKind) -> Self {
        ValueSpace {
            description: None,
            kind,
        }
    }

    /// Mutable access to the enum members, when this is an enum space.
    pub fn enum_values_mut(&mut self) -> Option<&mut EnumValueSet> {
        match &mut self.kind {
            ValueSpaceKind::Enum { values } => Some(values),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ValueSpaceKind {
    Int {
        ranges: Vec<IntRange>,
        /// A sentinel string the device may return instead of an integer,
        /// e.g. `Off` where a VLAN id status has voice VLAN disabled.
        optional_value: Option<String>,
    },
    String,
    Enum {
        values: EnumValueSet,
    },
}

// ── Events ────────────────────────────────────────────────────────────────

/// One feedback event from the event schema file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Event {
    pub path: Vec<String>,
    pub requires_user_role: BTreeSet<UserRole>,
    pub access: EventAccess,
    pub children: Vec<EventChild>,
}

/// Visibility class of an event in the schema file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventAccess {
    #[default]
    PublicApi,
    PublicApiPreview,
    Internal,
    InternalRestricted,
}

impl EventAccess {
    pub fn parse(text: &str) -> Option<EventAccess> {
        match text.to_ascii_lowercase().as_str() {
            "public-api" => Some(EventAccess::PublicApi),
            "public-api-preview" => Some(EventAccess::PublicApiPreview),
            "internal" => Some(EventAccess::Internal),
            "internal-restricted" => Some(EventAccess::InternalRestricted),
            _ => None,
        }
    }
}

/// One node of an event's body tree. Trees nest up to six levels deep in
/// practice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EventChild {
    String {
        path: Vec<String>,
        required: bool,
    },
    Int {
        path: Vec<String>,
        required: bool,
        /// The event body is just this bare value rather than a named
        /// property, as in `{"Standby": {"SecondsToStandby": 30}}`.
        implicit_anonymous_singleton: bool,
    },
    Enum {
        path: Vec<String>,
        required: bool,
        values: EnumValueSet,
    },
    List {
        path: Vec<String>,
        children: Vec<EventChild>,
    },
    Object {
        path: Vec<String>,
        required: bool,
        children: Vec<EventChild>,
    },
}

// ── Closed vocabularies ───────────────────────────────────────────────────

/// Hardware products named in "Applies to:" paragraphs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Product {
    Board,
    BoardPro,
    BoardProG2,
    CodecEQ,
    CodecPlus,
    CodecPro,
    DeskPro,
    DeskMini,
    Desk,
    Room55,
    Room70,
    Room55D,
    Room70G2,
    RoomBar,
    RoomBarPro,
    RoomKit,
    RoomKitEQX,
    RoomKitMini,
    RoomPanorama,
    Room70Panorama,
}

const ALL_PRODUCTS: [(&str, Product); 20] = [
    ("Board", Product::Board),
    ("BoardPro", Product::BoardPro),
    ("BoardProG2", Product::BoardProG2),
    ("CodecEQ", Product::CodecEQ),
    ("CodecPlus", Product::CodecPlus),
    ("CodecPro", Product::CodecPro),
    ("DeskPro", Product::DeskPro),
    ("DeskMini", Product::DeskMini),
    ("Desk", Product::Desk),
    ("Room55", Product::Room55),
    ("Room70", Product::Room70),
    ("Room55D", Product::Room55D),
    ("Room70G2", Product::Room70G2),
    ("RoomBar", Product::RoomBar),
    ("RoomBarPro", Product::RoomBarPro),
    ("RoomKit", Product::RoomKit),
    ("RoomKitEQX", Product::RoomKitEQX),
    ("RoomKitMini", Product::RoomKitMini),
    ("RoomPanorama", Product::RoomPanorama),
    ("Room70Panorama", Product::Room70Panorama),
];

impl Product {
    /// Case-insensitive token lookup. Slashes are treated as underscores
    /// first, so slash-joined tokens never alias a product name.
    pub fn parse(token: &str) -> Option<Product> {
        let normalized = token.replace('/', "_");
        ALL_PRODUCTS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&normalized))
            .map(|(_, product)| *product)
    }
}

/// Privilege levels named in "Requires user role:" paragraphs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum UserRole {
    Admin,
    Integrator,
    User,
    Audit,
    Roomcontrol,
    Touchuser,
    Paireduser,
}

const ALL_USER_ROLES: [(&str, UserRole); 7] = [
    ("Admin", UserRole::Admin),
    ("Integrator", UserRole::Integrator),
    ("User", UserRole::User),
    ("Audit", UserRole::Audit),
    ("Roomcontrol", UserRole::Roomcontrol),
    ("Touchuser", UserRole::Touchuser),
    ("Paireduser", UserRole::Paireduser),
];

impl UserRole {
    pub fn parse(token: &str) -> Option<UserRole> {
        ALL_USER_ROLES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(token))
            .map(|(_, role)| *role)
    }
}
