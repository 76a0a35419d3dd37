//! The section parser: a state machine whose tokens are character styles.
//!
//! Each of the manual's three schema sections (configurations, commands,
//! statuses) is a flat word stream. The parser walks it once, dispatching
//! on the (character style, parser state) pair; the style says what kind
//! of thing a word *is* (a path segment, a value-space literal, a formal
//! parameter name), the state says where in a method's layout the cursor
//! currently sits. Any pair outside the transition table is fatal with
//! full positional context, because a silently mis-parsed word would ship
//! a wrong schema.
//!
//! ## Why a scratch parameter exists
//!
//! A few vendor pages describe a positional index ("Unique ID for each
//! input") without ever declaring it in the usage template. The parser
//! then needs somewhere to sink the following range and description text
//! without polluting the record, so it opens a detached parameter that is
//! never installed into the record's parameter list.

use crate::error::ExtractError;
use crate::model::{
    Command, Configuration, EnumParameter, EnumValue, IntParameter, IntRange, MethodHeader,
    Parameter, ParameterMeta, Product, Status, StringParameter, UserRole,
};
use crate::pipeline::style::{classify, CharacterStyle};
use crate::pipeline::text::{append_word, is_different_paragraph};
use crate::pipeline::values::{
    guess_enum_range, numeric_range_literals, parse_bare_numeric_range, parse_enum_values,
    parse_length_pair, parse_numeric_range, parse_status_value_space,
};
use crate::provider::Word;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Where the cursor sits inside one documented method's visual layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Start,
    /// The software-version/products-covered preamble at the top of a
    /// section, before the first method.
    VersionPreamble,
    MethodNameHeading,
    AppliesTo,
    AppliesToProducts,
    RequiresUserRole,
    RequiresUserRoleRoles,
    Description,
    /// The invocation template directly below the "USAGE:" heading.
    UsageExample,
    /// The parameter name underneath the "where".
    UsageParameterName,
    /// Parameter prose below the value-space summary.
    UsageParameterDescription,
    /// The italic value-space literal after a parameter name.
    Valuespace,
    /// Text to the right of an enum value term describing that value.
    ValuespaceTermDefinition,
    /// Italic product restriction to the right of a value space.
    UsageParameterValueSpaceAppliesTo,
    /// The "Default value:" heading of a configuration.
    UsageDefaultValueHeading,
    UsageDefaultValue,
    /// The status "Value space of the result returned:" heading.
    DescriptionValueSpaceHeading,
    /// Status value-space prose below the italic literal.
    ValuespaceDescription,
}

/// Which schema section is being parsed. Configurations and commands share
/// a layout; statuses have array-index path parameters and a return value
/// space instead of a parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Configurations,
    Commands,
    Statuses,
}

/// The finished records of one section.
#[derive(Debug)]
pub enum SectionRecords {
    Configurations(Vec<Configuration>),
    Commands(Vec<Command>),
    Statuses(Vec<Status>),
}

impl SectionRecords {
    pub fn len(&self) -> usize {
        match self {
            SectionRecords::Configurations(v) => v.len(),
            SectionRecords::Commands(v) => v.len(),
            SectionRecords::Statuses(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Bracketed single-letter array index inside a status path, e.g. the
// "[n]" of "Connector [n]".
static STATUS_PATH_INDEX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[([a-z])\]").unwrap());
// Fused "name[x]" path segment in a configuration path heading.
static CONFIG_PATH_INDEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([a-z]+)\[(\w+|\d+|-?\d+\.\.-?\d)\]").unwrap());
// "prefix[name]" token in a usage template.
static USAGE_INDEX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w*)\[(\w+)\]$").unwrap());
// "prefix[min..max]" token in a usage template.
static USAGE_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w*)\[(-?\d+)\.\.(-?\d+)\]$").unwrap());

// The words of the "Value space of the result returned:" heading, for
// tolerating pages where the vendor dropped part of the phrase.
static VALUE_SPACE_HEADING_WORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["Value", "space", "of", "the", "result", "returned:"]));

/// One record under construction, superset of all three section shapes.
#[derive(Debug, Default)]
struct Record {
    header: MethodHeader,
    parameters: Vec<Parameter>,
    array_index_parameters: Vec<IntParameter>,
    value_space: Option<crate::model::ValueSpace>,
}

/// The parameter currently receiving value-space/description text. Usually
/// it lives in the record's parameter list; the detached variant is the
/// scratch sink described in the module docs.
#[derive(Debug)]
enum ActiveParameter {
    InList(usize),
    Detached(Parameter),
}

/// Single-pass parser for one section's word stream. Feed every word in
/// order, then call [`SectionParser::finish`].
pub struct SectionParser {
    kind: SectionKind,
    state: ParserState,
    done: Vec<Record>,
    current: Record,
    /// False only while the pre-section preamble is being skipped; the
    /// initial `current` is a throwaway sink for preamble text.
    started: bool,

    previous_baseline: Option<f64>,
    previous_word_text: Option<String>,

    // per-method accumulators
    required_parameters: HashSet<String>,
    partial_product_name: Option<String>,
    parameter_usage_index: usize,
    status_value_space: Option<String>,

    // per-parameter accumulators
    active: Option<ActiveParameter>,
    parameter_name: Option<String>,
    parameter_description: Option<String>,
    active_enum_value: Option<String>,
    enum_list_delimiter: &'static str,
    partial_enum_value: Option<String>,
}

impl SectionParser {
    pub fn new(kind: SectionKind) -> Self {
        SectionParser {
            kind,
            state: ParserState::Start,
            done: Vec::new(),
            current: Record::default(),
            started: false,
            previous_baseline: None,
            previous_word_text: None,
            required_parameters: HashSet::new(),
            partial_product_name: None,
            parameter_usage_index: 0,
            status_value_space: None,
            active: None,
            parameter_name: None,
            parameter_description: None,
            active_enum_value: None,
            enum_list_delimiter: "/",
            partial_enum_value: None,
        }
    }

    /// Parse a complete word stream in one call.
    pub fn parse(
        kind: SectionKind,
        words: &[(Word, usize)],
    ) -> Result<SectionRecords, ExtractError> {
        let mut parser = SectionParser::new(kind);
        for (word, page) in words {
            parser.feed(word, *page)?;
        }
        parser.finish()
    }

    fn reset_method_state(&mut self) {
        self.partial_product_name = None;
        self.parameter_usage_index = 0;
        self.status_value_space = None;
        self.required_parameters.clear();
        self.reset_parameter_state();
    }

    fn reset_parameter_state(&mut self) {
        self.active = None;
        self.parameter_name = None;
        self.parameter_description = None;
        self.active_enum_value = None;
        self.enum_list_delimiter = "/";
        self.partial_enum_value = None;
    }

    fn fail(&self, word: &Word, page: usize, style: CharacterStyle, detail: &str) -> ExtractError {
        ExtractError::StructuralParse {
            word: word.text.clone(),
            page,
            state: self.state,
            style,
            detail: detail.to_string(),
        }
    }

    fn active_param(&self) -> Option<&Parameter> {
        match &self.active {
            Some(ActiveParameter::InList(i)) => self.current.parameters.get(*i),
            Some(ActiveParameter::Detached(p)) => Some(p),
            None => None,
        }
    }

    fn active_param_mut(&mut self) -> Option<&mut Parameter> {
        match &mut self.active {
            Some(ActiveParameter::InList(i)) => self.current.parameters.get_mut(*i),
            Some(ActiveParameter::Detached(p)) => Some(p),
            None => None,
        }
    }

    fn active_last_range_mut(&mut self) -> Option<&mut IntRange> {
        match self.active_param_mut() {
            Some(Parameter::Int(p)) => p.ranges.last_mut(),
            _ => None,
        }
    }

    /// The enum value set that value terms currently bind to: an active
    /// enum parameter's values, else a status's enum return value space.
    fn enum_container_mut(&mut self) -> Option<&mut crate::model::EnumValueSet> {
        match &mut self.active {
            Some(ActiveParameter::InList(i)) => {
                if let Some(Parameter::Enum(p)) = self.current.parameters.get_mut(*i) {
                    return Some(&mut p.values);
                }
            }
            Some(ActiveParameter::Detached(Parameter::Enum(p))) => return Some(&mut p.values),
            _ => {}
        }
        self.current
            .value_space
            .as_mut()
            .and_then(|vs| vs.enum_values_mut())
    }

    /// In-progress string defaults keep their wrapping quotes until the
    /// method or parameter ends.
    fn trim_string_default_quote(&mut self) {
        if let Some(Parameter::String(p)) = self.active_param_mut() {
            if let Some(default) = &p.meta.default_value {
                p.meta.default_value = Some(default.trim_end_matches('"').to_string());
            }
        }
    }

    /// Install a freshly created parameter: into the record's parameter
    /// list for configurations and commands, detached for statuses (whose
    /// schema has no named parameters).
    fn install_parameter(&mut self, parameter: Parameter) {
        if self.kind == SectionKind::Statuses {
            self.active = Some(ActiveParameter::Detached(parameter));
        } else {
            self.current.parameters.push(parameter);
            self.active = Some(ActiveParameter::InList(self.current.parameters.len() - 1));
        }
    }

    fn new_parameter_meta(&mut self, name: String) -> ParameterMeta {
        ParameterMeta {
            required: self.required_parameters.contains(&name),
            description: self
                .parameter_description
                .take()
                .map(|d| d + "\n")
                .unwrap_or_default(),
            name,
            ..Default::default()
        }
    }

    pub fn feed(&mut self, word: &Word, page: usize) -> Result<(), ExtractError> {
        let style = classify(word);
        trace!(word = %word.text, style = ?style, state = ?self.state, "token");

        // A status's italic value-space literal accumulates across words;
        // the first word in any other style closes and classifies it.
        if self.kind == SectionKind::Statuses
            && self.status_value_space.is_some()
            && style != CharacterStyle::ValuespaceOrDisclaimer
        {
            let text = self.status_value_space.take().unwrap_or_default();
            self.current.value_space = Some(parse_status_value_space(&text)?);
        }

        // The vendor sometimes documents the same method twice. Once the
        // full path of the record under construction is known, any earlier
        // record with the same path (ignoring the leading section word) is
        // superseded by this one.
        if self.state == ParserState::MethodNameHeading
            && style != CharacterStyle::MethodNameHeading
        {
            let tail = self.current.header.path_tail().to_vec();
            let before = self.done.len();
            self.done.retain(|r| r.header.path_tail() != tail.as_slice());
            if self.done.len() != before {
                debug!(path = ?self.current.header.path, "discarded earlier duplicate record");
            }
        }

        match style {
            CharacterStyle::MethodFamilyHeading => {
                if self.state == ParserState::UsageDefaultValue {
                    self.trim_string_default_quote();
                }
                self.reset_method_state();
                // the family divider carries no data; the method path comes
                // from the following MethodNameHeading words
                self.state = ParserState::Start;
            }

            CharacterStyle::MethodNameHeading => {
                if self.state == ParserState::UsageDefaultValue {
                    self.trim_string_default_quote();
                }

                if self.state != ParserState::MethodNameHeading {
                    // finished the previous method, moving to the next
                    if self.started {
                        self.done.push(std::mem::take(&mut self.current));
                    } else {
                        self.current = Record::default();
                        self.started = true;
                    }
                    self.reset_method_state();
                }

                if self.state == ParserState::MethodNameHeading
                    && self.kind == SectionKind::Statuses
                {
                    if let Some(captures) = STATUS_PATH_INDEX_RE.captures(&word.text) {
                        // can repeat within one path, e.g. Channel [n] ... [n]
                        let name = captures[1].to_string();
                        self.required_parameters.insert(name.clone());
                        self.current.array_index_parameters.push(IntParameter {
                            meta: ParameterMeta {
                                name,
                                required: true,
                                ..Default::default()
                            },
                            position_in_path: Some(self.current.header.path.len()),
                            ..Default::default()
                        });
                    }
                }

                if self.state == ParserState::MethodNameHeading
                    && self.kind != SectionKind::Statuses
                {
                    if let Some(captures) = CONFIG_PATH_INDEX_RE.captures(&word.text) {
                        // a fused "Input[2..8]" segment splits into the
                        // literal name and a bracketed placeholder
                        let name = captures[1].to_string();
                        let placeholder = format!("[{}]", &captures[2]);
                        self.required_parameters.insert(name.clone());
                        self.current.header.path.push(name);
                        self.current.header.path.push(placeholder);
                        self.previous_baseline = Some(word.baseline_y());
                        self.previous_word_text = Some(word.text.clone());
                        return Ok(());
                    }
                }

                self.state = ParserState::MethodNameHeading;
                self.current.header.path.push(word.text.clone());
            }

            CharacterStyle::ProductName => match self.state {
                ParserState::MethodNameHeading if word.text == "Applies" => {
                    self.state = ParserState::AppliesTo;
                }
                ParserState::AppliesTo if word.text == "to:" => {
                    self.state = ParserState::AppliesToProducts;
                }
                ParserState::AppliesTo | ParserState::AppliesToProducts => {
                    self.state = ParserState::AppliesToProducts;
                    let product_name = format!(
                        "{}{}",
                        self.partial_product_name.as_deref().unwrap_or(""),
                        word.text
                    );
                    if let Some(product) = Product::parse(&product_name) {
                        self.current.header.applies_to.insert(product);
                        self.partial_product_name = None;
                    } else if word.text != "All" && word.text != "products" {
                        // a model name tokenized across words, e.g. "Board" + "Pro"
                        self.partial_product_name = Some(product_name);
                    }
                }
                ParserState::Valuespace | ParserState::UsageParameterValueSpaceAppliesTo => {
                    self.state = ParserState::UsageParameterValueSpaceAppliesTo;
                    let prev = self.previous_baseline;
                    if self.active.is_some() {
                        if let Some(p) = self.active_param_mut() {
                            let meta = p.meta_mut();
                            meta.value_space_description = Some(append_word(
                                meta.value_space_description.as_deref(),
                                word,
                                prev,
                            ));
                        }
                    } else {
                        // the entire parameter, not just one value, is
                        // product-restricted; keep the text for its
                        // description once the parameter gets created
                        self.parameter_description = Some(append_word(
                            self.parameter_description.as_deref(),
                            word,
                            prev,
                        ));
                    }
                }
                ParserState::ValuespaceTermDefinition => {
                    if word.text != "[" && word.text != "]" {
                        if let Some(product) = Product::parse(&word.text) {
                            if let Some(range) = self.active_last_range_mut() {
                                range.applies_to.insert(product);
                            }
                        }
                    }
                }
                ParserState::UsageDefaultValue if self.active.is_some() => {
                    let prev = self.previous_baseline;
                    if let Some(p) = self.active_param_mut() {
                        let meta = p.meta_mut();
                        meta.default_value =
                            Some(append_word(meta.default_value.as_deref(), word, prev));
                    }
                }
                _ => {
                    return Err(self.fail(word, page, style, "unexpected state for character style"))
                }
            },

            CharacterStyle::UsageHeading => {
                if word.text == "USAGE:" {
                    self.state = ParserState::UsageExample;
                    if self.kind == SectionKind::Commands
                        && self.current.header.description.contains("multiline")
                    {
                        // multiline commands take a literal payload that the
                        // usage template never shows
                        self.current.parameters.push(Parameter::String(StringParameter {
                            meta: ParameterMeta {
                                name: "body".to_string(),
                                required: true,
                                ..Default::default()
                            },
                            ..Default::default()
                        }));
                    }
                } else {
                    return Err(self.fail(word, page, style, "unexpected word for character style"));
                }
            }

            CharacterStyle::UsageExample => {
                if self.state == ParserState::UsageExample {
                    if self.kind != SectionKind::Statuses {
                        if let Some(captures) = USAGE_INDEX_RE.captures(&word.text) {
                            let mut name = captures[2].to_string();
                            if name.parse::<i64>().is_ok() {
                                name = "n".to_string();
                            }
                            let name_prefix =
                                Some(&captures[1]).filter(|p| !p.is_empty()).map(String::from);
                            if name_prefix.is_some() {
                                self.parameter_usage_index += 1;
                            }
                            self.required_parameters.insert(name.clone());
                            self.current.parameters.push(Parameter::Int(IntParameter {
                                meta: ParameterMeta {
                                    name,
                                    required: true,
                                    ..Default::default()
                                },
                                position_in_path: Some(self.parameter_usage_index),
                                name_prefix,
                                ..Default::default()
                            }));
                        } else if let Some(captures) = USAGE_RANGE_RE.captures(&word.text) {
                            let name_prefix =
                                Some(&captures[1]).filter(|p| !p.is_empty()).map(String::from);
                            if name_prefix.is_some() {
                                self.parameter_usage_index += 1;
                            }
                            let name = name_prefix
                                .clone()
                                .or_else(|| self.previous_word_text.clone())
                                .unwrap_or_default();
                            let minimum = captures[2].parse().unwrap_or(0);
                            let maximum = captures[3].parse().unwrap_or(0);
                            self.required_parameters.insert(name.clone());
                            self.current.parameters.push(Parameter::Int(IntParameter {
                                meta: ParameterMeta {
                                    name,
                                    required: true,
                                    ..Default::default()
                                },
                                ranges: vec![IntRange {
                                    minimum,
                                    maximum,
                                    ..Default::default()
                                }],
                                position_in_path: Some(self.parameter_usage_index),
                                name_prefix,
                                ..Default::default()
                            }));
                        }
                    }
                    self.parameter_usage_index += 1;
                } else if self.state == ParserState::Description
                    && self.kind == SectionKind::Statuses
                {
                    // the page omitted the "Value space of the result
                    // returned:" heading, so the value space was consumed
                    // as description text; recover at the Example
                    self.state = ParserState::UsageExample;
                } else {
                    return Err(self.fail(word, page, style, "unexpected state for character style"));
                }
            }

            CharacterStyle::ParameterName => {
                let positional = if self.kind != SectionKind::Statuses
                    && matches!(
                        self.state,
                        ParserState::UsageParameterName | ParserState::ValuespaceTermDefinition
                    ) {
                    self.current.parameters.iter().position(|p| {
                        word.text == format!("{}:", p.name())
                            && matches!(p, Parameter::Int(ip) if ip.position_in_path.is_some())
                    })
                } else {
                    None
                };

                match self.state {
                    ParserState::UsageExample => {
                        if !word.text.ends_with(']') {
                            self.required_parameters
                                .insert(word.text.trim_matches('"').to_string());
                        }
                        // bracket-wrapped template tokens are optional
                        self.parameter_usage_index += 1;
                    }
                    ParserState::UsageParameterName | ParserState::ValuespaceTermDefinition
                        if positional.is_some() =>
                    {
                        self.active = positional.map(ActiveParameter::InList);
                        self.state = ParserState::UsageParameterDescription;
                    }
                    ParserState::UsageParameterName
                    | ParserState::ValuespaceTermDefinition
                    | ParserState::UsageDefaultValue
                    | ParserState::Valuespace
                    | ParserState::UsageParameterValueSpaceAppliesTo
                    | ParserState::UsageParameterDescription => {
                        self.trim_string_default_quote();
                        self.reset_parameter_state();
                        self.parameter_name = Some(word.text.trim_end_matches(':').to_string());
                        self.state = ParserState::Valuespace;
                    }
                    _ => {
                        return Err(self.fail(
                            word,
                            page,
                            style,
                            "unexpected state for character style",
                        ))
                    }
                }
            }

            CharacterStyle::ValuespaceOrDisclaimer => match self.state {
                ParserState::AppliesToProducts | ParserState::RequiresUserRole => {
                    // the "Not available for ... personal mode devices"
                    // disclaimer; carries no schema data
                    self.state = ParserState::RequiresUserRole;
                }
                ParserState::Valuespace if self.kind == SectionKind::Statuses => {
                    self.status_value_space = Some(append_word(
                        self.status_value_space.as_deref(),
                        word,
                        self.previous_baseline,
                    ));
                }
                ParserState::Valuespace | ParserState::UsageParameterValueSpaceAppliesTo => {
                    self.classify_parameter_value_space(word, page, style)?;
                }
                ParserState::UsageDefaultValue if self.active.is_some() => {
                    let prev = self.previous_baseline;
                    if let Some(p) = self.active_param_mut() {
                        let meta = p.meta_mut();
                        meta.default_value =
                            Some(append_word(meta.default_value.as_deref(), word, prev));
                    }
                }
                ParserState::DescriptionValueSpaceHeading => {
                    // italic clarification inside the heading; skip
                }
                _ => {
                    return Err(self.fail(word, page, style, "unexpected state for character style"))
                }
            },

            CharacterStyle::ValuespaceTerm => {
                let term = word.text.trim_end_matches(':').to_string();
                if let Some(container) = self.enum_container_mut() {
                    let known = container.contains(&term);
                    self.active_enum_value = known.then_some(term);
                    self.state = ParserState::ValuespaceTermDefinition;
                } else if self.active.is_some() {
                    let prev = self.previous_baseline;
                    if let Some(p) = self.active_param_mut() {
                        let meta = p.meta_mut();
                        meta.description = append_word(Some(&meta.description), word, prev);
                    }
                    self.state = ParserState::UsageParameterDescription;
                }
                // with no enum container and no parameter the term has
                // nothing to bind to; skip it
            }

            CharacterStyle::Body => self.feed_body(word, page, style)?,
        }

        self.previous_baseline = Some(word.baseline_y());
        self.previous_word_text = Some(word.text.clone());
        Ok(())
    }

    /// The big prose switch: everything typeset in the default body style.
    fn feed_body(
        &mut self,
        word: &Word,
        page: usize,
        style: CharacterStyle,
    ) -> Result<(), ExtractError> {
        let different_paragraph = is_different_paragraph(word, self.previous_baseline);
        let prev = self.previous_baseline;

        match self.state {
            ParserState::Start => {
                self.state = ParserState::VersionPreamble;
            }
            ParserState::VersionPreamble => {
                // version table and covered-products preamble; skip
            }
            ParserState::MethodNameHeading if word.text == "Applies" => {
                self.state = ParserState::AppliesTo;
            }
            ParserState::AppliesTo if word.text == "to:" => {
                self.state = ParserState::AppliesToProducts;
            }
            ParserState::AppliesTo if word.text == "Requires" => {
                self.state = ParserState::RequiresUserRole;
            }
            ParserState::AppliesToProducts if word.text == "Requires" => {
                self.state = ParserState::RequiresUserRole;
            }
            ParserState::AppliesToProducts => {
                self.current.header.description =
                    append_word(Some(&self.current.header.description), word, prev);
                self.state = ParserState::Description;
            }
            ParserState::RequiresUserRole if word.text == "role:" => {
                self.state = ParserState::RequiresUserRoleRoles;
            }
            ParserState::RequiresUserRoleRoles if !different_paragraph => {
                for role_name in word.text.trim_end_matches(',').split(',') {
                    match UserRole::parse(role_name) {
                        Some(role) => {
                            self.current.header.requires_user_role.insert(role);
                        }
                        None => {
                            return Err(ExtractError::UnrecognizedRole {
                                token: role_name.to_string(),
                                page,
                            })
                        }
                    }
                }
            }
            ParserState::UsageExample => {
                if word.text == "where" {
                    self.state = ParserState::UsageParameterName;
                } else {
                    return Err(self.fail(
                        word,
                        page,
                        style,
                        "unexpected word for state and character style",
                    ));
                }
            }
            ParserState::Valuespace
            | ParserState::ValuespaceDescription
            | ParserState::ValuespaceTermDefinition
                if different_paragraph
                    && word.text == "Example:"
                    && self.kind == SectionKind::Statuses =>
            {
                self.state = ParserState::UsageExample;
            }
            ParserState::UsageParameterDescription
            | ParserState::UsageParameterValueSpaceAppliesTo
            | ParserState::Valuespace
            | ParserState::ValuespaceTermDefinition
                if different_paragraph
                    && self.kind == SectionKind::Configurations
                    && word.text == "Default" =>
            {
                self.state = ParserState::UsageDefaultValueHeading;
                self.active_enum_value = None;
            }
            ParserState::UsageParameterDescription
            | ParserState::UsageParameterValueSpaceAppliesTo
            | ParserState::Valuespace
            | ParserState::ValuespaceTermDefinition
                if different_paragraph
                    && self.kind == SectionKind::Configurations
                    && word.text == "Range:"
                    && matches!(self.active_param(), Some(Parameter::Int(_))) =>
            {
                self.state = ParserState::Valuespace;
            }
            ParserState::UsageParameterDescription
            | ParserState::UsageParameterValueSpaceAppliesTo
            | ParserState::Valuespace => {
                if self.active.is_some() {
                    let range = parse_bare_numeric_range(&word.text)
                        .or_else(|| word.text.parse::<i64>().ok().map(|v| (v, v)));
                    let is_int = matches!(self.active_param(), Some(Parameter::Int(_)));
                    if let (Some((minimum, maximum)), true) = (range, is_int) {
                        // a range printed inside the running prose, e.g.
                        // under an explicit "Range:" heading
                        if let Some(Parameter::Int(p)) = self.active_param_mut() {
                            p.ranges.push(IntRange {
                                minimum,
                                maximum,
                                ..Default::default()
                            });
                        }
                        self.state = ParserState::ValuespaceTermDefinition;
                    } else if let Some(p) = self.active_param_mut() {
                        let meta = p.meta_mut();
                        meta.description = append_word(Some(&meta.description), word, prev);
                        self.state = ParserState::UsageParameterDescription;
                    }
                } else if word.text == ":" && self.state == ParserState::Valuespace {
                    // the colon after a parameter name, occasionally
                    // tokenized as its own word
                } else if self.kind == SectionKind::Statuses {
                    match &mut self.current.value_space {
                        Some(vs) => {
                            vs.description =
                                Some(append_word(vs.description.as_deref(), word, prev));
                            self.state = ParserState::ValuespaceDescription;
                        }
                        None => {
                            return Err(self.fail(
                                word,
                                page,
                                style,
                                "status value-space prose with no value space parsed",
                            ))
                        }
                    }
                } else if self.kind != SectionKind::Statuses && word.text == "Unique" {
                    // "Unique ID for each input": an undeclared positional
                    // index; open the detached scratch sink for its range
                    self.active = Some(ActiveParameter::Detached(Parameter::Int(IntParameter {
                        meta: ParameterMeta {
                            name: "n".to_string(),
                            description: "DELETE ME".to_string(),
                            ..Default::default()
                        },
                        ..Default::default()
                    })));
                    self.state = ParserState::ValuespaceTermDefinition;
                } else {
                    return Err(self.fail(
                        word,
                        page,
                        style,
                        "no current parameter to append description to",
                    ));
                }
            }
            ParserState::ValuespaceTermDefinition => {
                if let Some(name) = self.active_enum_value.clone() {
                    if let Some(container) = self.enum_container_mut() {
                        if let Some(value) = container.get_mut(&name) {
                            value.description =
                                Some(append_word(value.description.as_deref(), word, prev));
                        }
                    }
                } else if let Some(range) = self.active_last_range_mut() {
                    range.description = Some(append_word(range.description.as_deref(), word, prev));
                }
            }
            ParserState::UsageDefaultValueHeading => {
                if word.text == "value:" {
                    self.state = ParserState::UsageDefaultValue;
                } else {
                    return Err(self.fail(
                        word,
                        page,
                        style,
                        "unexpected word for state and character style",
                    ));
                }
            }
            ParserState::UsageDefaultValue if self.active.is_some() => {
                if let Some(p) = self.active_param_mut() {
                    match p {
                        Parameter::Int(param) => {
                            param.meta.default_value = Some(word.text.clone());
                        }
                        Parameter::Enum(param) => {
                            param.meta.default_value = Some(word.text.clone());
                        }
                        Parameter::String(param) => {
                            param.meta.default_value = Some(match &param.meta.default_value {
                                None => word.text.trim_start_matches('"').to_string(),
                                Some(_) => word.text.clone(),
                            });
                        }
                    }
                }
            }
            ParserState::RequiresUserRoleRoles | ParserState::Description => {
                if word.text == "Value"
                    && different_paragraph
                    && self.kind == SectionKind::Statuses
                {
                    self.state = ParserState::DescriptionValueSpaceHeading;
                } else {
                    self.state = ParserState::Description;
                    self.current.header.description =
                        append_word(Some(&self.current.header.description), word, prev);
                }
            }
            ParserState::DescriptionValueSpaceHeading
                if self.kind == SectionKind::Statuses && !different_paragraph =>
            {
                if word.text == "returned:" {
                    self.state = ParserState::Valuespace;
                } else if !VALUE_SPACE_HEADING_WORDS.contains(word.text.as_str()) {
                    return Err(self.fail(
                        word,
                        page,
                        style,
                        "status description paragraph started like the value-space heading \
                         but contains an unexpected word; a paragraph buffer would be needed \
                         to keep it in the description",
                    ));
                }
                // otherwise skip the heading word itself
            }
            _ => {
                // prose with no schema meaning in this state
            }
        }
        Ok(())
    }

    /// Classify the italic value-space literal after a parameter name, or
    /// refine the active parameter with continuation text.
    fn classify_parameter_value_space(
        &mut self,
        word: &Word,
        page: usize,
        style: CharacterStyle,
    ) -> Result<(), ExtractError> {
        let text = word.text.clone();
        let no_param_name = || "found parameter value space without a previously-parsed parameter name";

        enum ActiveKind {
            None,
            Int,
            String,
            Enum,
        }
        let active_kind = match self.active_param_mut() {
            None => ActiveKind::None,
            Some(Parameter::Int(_)) => ActiveKind::Int,
            Some(Parameter::String(_)) => ActiveKind::String,
            Some(Parameter::Enum(_)) => ActiveKind::Enum,
        };

        match active_kind {
            ActiveKind::None if text == "String" => {
                let name = self
                    .parameter_name
                    .take()
                    .ok_or_else(|| self.fail(word, page, style, no_param_name()))?;
                let meta = self.new_parameter_meta(name);
                self.install_parameter(Parameter::String(StringParameter {
                    meta,
                    ..Default::default()
                }));
            }
            ActiveKind::None if text == "Integer" => {
                let name = self
                    .parameter_name
                    .take()
                    .ok_or_else(|| self.fail(word, page, style, no_param_name()))?;
                let meta = self.new_parameter_meta(name);
                self.install_parameter(Parameter::Int(IntParameter {
                    meta,
                    ..Default::default()
                }));
            }
            ActiveKind::None if parse_numeric_range(&text).is_some() => {
                let (minimum, maximum) = parse_numeric_range(&text).unwrap_or((0, 0));
                let name = self
                    .parameter_name
                    .take()
                    .ok_or_else(|| self.fail(word, page, style, no_param_name()))?;
                let meta = self.new_parameter_meta(name);
                self.install_parameter(Parameter::Int(IntParameter {
                    meta,
                    ranges: vec![IntRange {
                        minimum,
                        maximum,
                        ..Default::default()
                    }],
                    ..Default::default()
                }));
            }
            ActiveKind::None => {
                let name = self
                    .parameter_name
                    .take()
                    .ok_or_else(|| self.fail(word, page, style, no_param_name()))?;
                if text.ends_with(',') {
                    self.enum_list_delimiter = ",";
                }
                let tokens: Vec<&str> = text
                    .trim_end_matches(')')
                    .split(self.enum_list_delimiter)
                    .filter(|t| !t.is_empty())
                    .collect();
                let values = if tokens.contains(&"..") {
                    guess_enum_range(&tokens)?
                } else {
                    tokens.into_iter().map(EnumValue::new).collect()
                };
                let meta = self.new_parameter_meta(name);
                self.install_parameter(Parameter::Enum(EnumParameter { meta, values }));
            }
            ActiveKind::String if numeric_range_literals(&text).is_some() => {
                // an integer domain encoded as a string parameter; the
                // bound literals' digit counts are the length limits
                let (min, max) = numeric_range_literals(&text).unwrap_or(("", ""));
                let (min_len, max_len) = (min.len(), max.len());
                if let Some(Parameter::String(p)) = self.active_param_mut() {
                    p.min_length = min_len;
                    p.max_length = max_len;
                }
                self.state = ParserState::UsageParameterValueSpaceAppliesTo;
            }
            ActiveKind::String if parse_length_pair(&text).is_some() => {
                let (min_len, max_len) = parse_length_pair(&text).unwrap_or((0, 0));
                if let Some(Parameter::String(p)) = self.active_param_mut() {
                    p.min_length = min_len;
                    p.max_length = max_len;
                }
                self.state = ParserState::UsageParameterValueSpaceAppliesTo;
            }
            ActiveKind::String if text.starts_with('(') && text.ends_with(',') => {
                // length pair wrapped across words: "(0," then "255)"
                let bound = &text[1..text.len() - 1];
                let min_len: usize = bound.parse().map_err(|_| {
                    self.fail(
                        word,
                        page,
                        style,
                        &format!("failed to parse string length lower bound {bound:?} as an integer"),
                    )
                })?;
                if let Some(Parameter::String(p)) = self.active_param_mut() {
                    p.min_length = min_len;
                }
            }
            ActiveKind::String if text.ends_with(')') => {
                let bound = &text[..text.len() - 1];
                let max_len: usize = bound.parse().map_err(|_| {
                    self.fail(
                        word,
                        page,
                        style,
                        &format!("failed to parse string length upper bound {bound:?} as an integer"),
                    )
                })?;
                if let Some(Parameter::String(p)) = self.active_param_mut() {
                    p.max_length = max_len;
                }
                self.state = ParserState::UsageParameterValueSpaceAppliesTo;
            }
            ActiveKind::Int if parse_numeric_range(&text).is_some() => {
                let (minimum, maximum) = parse_numeric_range(&text).unwrap_or((0, 0));
                if let Some(Parameter::Int(p)) = self.active_param_mut() {
                    // may be followed by more per-product ranges
                    p.ranges.push(IntRange {
                        minimum,
                        maximum,
                        ..Default::default()
                    });
                }
            }
            ActiveKind::Enum => {
                // continuation lines of a wrapped enum list
                if self.enum_list_delimiter == ","
                    && (text.ends_with('_') || text.ends_with('/'))
                {
                    let partial = self.partial_enum_value.take().unwrap_or_default();
                    self.partial_enum_value = Some(partial + &text);
                } else {
                    let merged =
                        format!("{}{}", self.partial_enum_value.take().unwrap_or_default(), text);
                    let additional = parse_enum_values(&merged, self.enum_list_delimiter);
                    if let Some(Parameter::Enum(p)) = self.active_param_mut() {
                        for value in &additional {
                            p.values.insert(value.clone());
                        }
                    }
                }
            }
            _ => {
                // trailing text that clarifies when the value space
                // applies; it lands in the value-space description below
            }
        }

        let prev = self.previous_baseline;
        if let Some(p) = self.active_param_mut() {
            let meta = p.meta_mut();
            meta.value_space_description = Some(match &meta.value_space_description {
                None => word.text.clone(),
                Some(existing) => append_word(Some(existing), word, prev),
            });
        }
        Ok(())
    }

    /// Finalize the stream: close any in-progress default value or status
    /// value-space literal and convert the records to their section shape.
    pub fn finish(mut self) -> Result<SectionRecords, ExtractError> {
        if self.state == ParserState::UsageDefaultValue {
            self.trim_string_default_quote();
        }
        if let Some(text) = self.status_value_space.take() {
            self.current.value_space = Some(parse_status_value_space(&text)?);
        }
        if self.started {
            self.done.push(self.current);
        }

        Ok(match self.kind {
            SectionKind::Configurations => SectionRecords::Configurations(
                self.done
                    .into_iter()
                    .map(|r| Configuration {
                        header: r.header,
                        parameters: r.parameters,
                    })
                    .collect(),
            ),
            SectionKind::Commands => SectionRecords::Commands(
                self.done
                    .into_iter()
                    .map(|r| Command {
                        header: r.header,
                        parameters: r.parameters,
                    })
                    .collect(),
            ),
            SectionKind::Statuses => SectionRecords::Statuses(
                self.done
                    .into_iter()
                    .map(|r| Status {
                        header: r.header,
                        array_index_parameters: r.array_index_parameters,
                        value_space: r.value_space,
                    })
                    .collect(),
            ),
        })
    }
}
