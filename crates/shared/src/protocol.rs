//! A2UI v0.8 wire types.
//!
//! Every message is one JSON object per line with exactly one top-level key.
//! Component and value variants are externally tagged so the variant name is
//! the single key of the serialized object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::data_model::DataEntry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoundValue {
    #[serde(rename = "literalString")]
    LiteralString(String),
    /// Integers keep their integral encoding on the wire.
    #[serde(rename = "literalNumber")]
    LiteralNumber(Number),
    #[serde(rename = "literalBoolean")]
    LiteralBoolean(bool),
    /// Resolved by the client against the data model on every render.
    #[serde(rename = "path")]
    Path(String),
}

impl BoundValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::LiteralString(value.into())
    }

    pub fn number(value: impl Into<Number>) -> Self {
        Self::LiteralNumber(value.into())
    }

    pub fn boolean(value: bool) -> Self {
        Self::LiteralBoolean(value)
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }
}

impl From<&str> for BoundValue {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}

impl From<String> for BoundValue {
    fn from(value: String) -> Self {
        Self::LiteralString(value)
    }
}

impl From<bool> for BoundValue {
    fn from(value: bool) -> Self {
        Self::LiteralBoolean(value)
    }
}

impl From<i64> for BoundValue {
    fn from(value: i64) -> Self {
        Self::number(value)
    }
}

/// Non-finite floats have no JSON encoding and fall back to `0`.
impl From<f64> for BoundValue {
    fn from(value: f64) -> Self {
        Self::LiteralNumber(Number::from_f64(value).unwrap_or_else(|| 0.into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    Start,
    Center,
    End,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Distribution {
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UsageHint {
    H1,
    H2,
    H3,
    H4,
    H5,
    Caption,
    Body,
    Label,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextFieldType {
    ShortText,
    LongText,
    Number,
    Obscured,
    Multiline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateBinding {
    #[serde(rename = "componentId")]
    pub component_id: String,
    #[serde(rename = "dataBinding")]
    pub data_binding: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Children {
    #[serde(rename = "explicitList")]
    ExplicitList(Vec<String>),
    #[serde(rename = "template")]
    Template(TemplateBinding),
}

impl Children {
    pub fn explicit<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ExplicitList(ids.into_iter().map(Into::into).collect())
    }

    pub fn template(component_id: impl Into<String>, data_binding: impl Into<String>) -> Self {
        Self::Template(TemplateBinding {
            component_id: component_id.into(),
            data_binding: data_binding.into(),
        })
    }

    /// Ids these children point at; a template contributes its single
    /// template component.
    pub fn referenced_ids(&self) -> Vec<&str> {
        match self {
            Self::ExplicitList(ids) => ids.iter().map(String::as_str).collect(),
            Self::Template(binding) => vec![binding.component_id.as_str()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionContext {
    pub key: String,
    pub value: BoundValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<ActionContext>>,
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: BoundValue) -> Self {
        self.context.get_or_insert_with(Vec::new).push(ActionContext {
            key: key.into(),
            value,
        });
        self
    }

    /// Shorthand for `navigate` with a literal target.
    pub fn navigate(to: impl Into<String>) -> Self {
        Self::new("navigate").with_context("to", BoundValue::string(to))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    pub text: BoundValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_hint: Option<UsageHint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonProps {
    pub child: String,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFieldProps {
    pub label: BoundValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<BoundValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_field_type: Option<TextFieldType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerProps {
    pub children: Children,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardProps {
    pub child: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListProps {
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Children>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconProps {
    pub name: BoundValue,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DividerProps {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalProps {
    pub entry_point_child: String,
    pub content_child: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckBoxProps {
    pub label: BoundValue,
    pub value: BoundValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderProps {
    pub value: BoundValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Number>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSelectProps {
    pub label: BoundValue,
    pub options: Vec<SelectOption>,
    /// Data-model path holding the comma-separated selected ids.
    pub selected_path: String,
    pub action_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentKind {
    Text(TextProps),
    Button(ButtonProps),
    TextField(TextFieldProps),
    Column(ContainerProps),
    Row(ContainerProps),
    Card(CardProps),
    List(ListProps),
    Icon(IconProps),
    Divider(DividerProps),
    Modal(ModalProps),
    CheckBox(CheckBoxProps),
    Slider(SliderProps),
    MultiSelect(MultiSelectProps),
}

impl ComponentKind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Text(_) => "Text",
            Self::Button(_) => "Button",
            Self::TextField(_) => "TextField",
            Self::Column(_) => "Column",
            Self::Row(_) => "Row",
            Self::Card(_) => "Card",
            Self::List(_) => "List",
            Self::Icon(_) => "Icon",
            Self::Divider(_) => "Divider",
            Self::Modal(_) => "Modal",
            Self::CheckBox(_) => "CheckBox",
            Self::Slider(_) => "Slider",
            Self::MultiSelect(_) => "MultiSelect",
        }
    }

    /// Child ids this component points at, in declaration order.
    pub fn child_ids(&self) -> Vec<&str> {
        match self {
            Self::Button(props) => vec![props.child.as_str()],
            Self::Card(props) => vec![props.child.as_str()],
            Self::Column(props) | Self::Row(props) => props.children.referenced_ids(),
            Self::List(props) => props
                .children
                .as_ref()
                .map(Children::referenced_ids)
                .unwrap_or_default(),
            Self::Modal(props) => vec![
                props.entry_point_child.as_str(),
                props.content_child.as_str(),
            ],
            Self::Text(_)
            | Self::TextField(_)
            | Self::Icon(_)
            | Self::Divider(_)
            | Self::CheckBox(_)
            | Self::Slider(_)
            | Self::MultiSelect(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub component: ComponentKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceUpdate {
    pub surface_id: String,
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataModelUpdate {
    pub surface_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub contents: Vec<DataEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginRendering {
    pub surface_id: String,
    pub root: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSurface {
    pub surface_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Message {
    SurfaceUpdate(SurfaceUpdate),
    DataModelUpdate(DataModelUpdate),
    BeginRendering(BeginRendering),
    DeleteSurface(DeleteSurface),
}

impl Message {
    pub fn surface_id(&self) -> &str {
        match self {
            Self::SurfaceUpdate(m) => &m.surface_id,
            Self::DataModelUpdate(m) => &m.surface_id,
            Self::BeginRendering(m) => &m.surface_id,
            Self::DeleteSurface(m) => &m.surface_id,
        }
    }

    /// One JSON Lines record, without the trailing newline.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Client-originated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAction {
    pub name: String,
    pub surface_id: String,
    pub source_component_id: String,
    pub timestamp: String,
    #[serde(default)]
    pub context: Map<String, Value>,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
