//! Surface builder: accumulates components for one surface and emits the
//! four A2UI message kinds.

use std::collections::HashMap;

use serde_json::Number;

use crate::{
    data_model::DataEntry,
    protocol::{
        Action, Alignment, BeginRendering, BoundValue, ButtonProps, CardProps, CheckBoxProps,
        Children, Component, ComponentKind, ContainerProps, DataModelUpdate, DeleteSurface,
        Direction, Distribution, DividerProps, IconProps, ListProps, Message, ModalProps,
        MultiSelectProps, SelectOption, SliderProps, SurfaceUpdate, TextFieldProps, TextFieldType,
        TextProps, UsageHint,
    },
};

/// Flat id-keyed component collection. Hierarchy lives only in child-id
/// references, so nodes never own each other.
#[derive(Debug, Clone, Default)]
pub struct ComponentTree {
    nodes: Vec<Component>,
    index: HashMap<String, usize>,
}

impl ComponentTree {
    /// Re-inserting an id replaces the earlier node in place.
    pub fn insert(&mut self, component: Component) {
        match self.index.get(&component.id) {
            Some(&slot) => self.nodes[slot] = component,
            None => {
                self.index.insert(component.id.clone(), self.nodes.len());
                self.nodes.push(component);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Component> {
        self.index.get(id).map(|&slot| &self.nodes[slot])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.nodes.iter()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }

    /// Child references that point at ids not present in the tree.
    pub fn dangling_references(&self) -> Vec<(String, String)> {
        self.nodes
            .iter()
            .flat_map(|node| {
                node.component
                    .child_ids()
                    .into_iter()
                    .filter(|child| !self.contains(child))
                    .map(|child| (node.id.clone(), child.to_string()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn to_vec(&self) -> Vec<Component> {
        self.nodes.clone()
    }
}

/// Layout options shared by `Row` and `Column`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Layout {
    pub alignment: Option<Alignment>,
    pub distribution: Option<Distribution>,
}

impl Layout {
    pub const fn aligned(alignment: Alignment) -> Self {
        Self {
            alignment: Some(alignment),
            distribution: None,
        }
    }

    pub const fn distributed(distribution: Distribution) -> Self {
        Self {
            alignment: None,
            distribution: Some(distribution),
        }
    }

    pub const fn new(distribution: Distribution, alignment: Alignment) -> Self {
        Self {
            alignment: Some(alignment),
            distribution: Some(distribution),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SurfaceBuilder {
    surface_id: String,
    tree: ComponentTree,
}

impl SurfaceBuilder {
    pub fn new(surface_id: impl Into<String>) -> Self {
        Self {
            surface_id: surface_id.into(),
            tree: ComponentTree::default(),
        }
    }

    pub fn surface_id(&self) -> &str {
        &self.surface_id
    }

    pub fn tree(&self) -> &ComponentTree {
        &self.tree
    }

    /// Drops every accumulated component; the surface id is kept.
    pub fn reset(&mut self) {
        self.tree.clear();
    }

    pub fn add(&mut self, component: Component) -> &mut Self {
        self.tree.insert(component);
        self
    }

    fn push(&mut self, id: impl Into<String>, component: ComponentKind) -> &mut Self {
        self.add(Component {
            id: id.into(),
            component,
        })
    }

    pub fn text(&mut self, id: impl Into<String>, text: impl Into<BoundValue>) -> &mut Self {
        self.push(
            id,
            ComponentKind::Text(TextProps {
                text: text.into(),
                usage_hint: None,
            }),
        )
    }

    pub fn heading(
        &mut self,
        id: impl Into<String>,
        text: impl Into<BoundValue>,
        hint: UsageHint,
    ) -> &mut Self {
        self.push(
            id,
            ComponentKind::Text(TextProps {
                text: text.into(),
                usage_hint: Some(hint),
            }),
        )
    }

    pub fn button(
        &mut self,
        id: impl Into<String>,
        child_id: impl Into<String>,
        action: Action,
    ) -> &mut Self {
        self.push(
            id,
            ComponentKind::Button(ButtonProps {
                child: child_id.into(),
                action,
            }),
        )
    }

    /// Text + button pair: the label gets `<id>-text`.
    pub fn text_button(
        &mut self,
        id: impl Into<String>,
        label: impl Into<BoundValue>,
        action: Action,
    ) -> &mut Self {
        let id = id.into();
        let text_id = format!("{id}-text");
        self.text(text_id.clone(), label);
        self.button(id, text_id, action)
    }

    pub fn text_field(
        &mut self,
        id: impl Into<String>,
        label: impl Into<BoundValue>,
        text: Option<BoundValue>,
        field_type: Option<TextFieldType>,
    ) -> &mut Self {
        self.push(
            id,
            ComponentKind::TextField(TextFieldProps {
                label: label.into(),
                text,
                text_field_type: field_type,
            }),
        )
    }

    pub fn column<I, S>(&mut self, id: impl Into<String>, children: I, layout: Layout) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(id, ComponentKind::Column(container(children, layout)))
    }

    pub fn row<I, S>(&mut self, id: impl Into<String>, children: I, layout: Layout) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(id, ComponentKind::Row(container(children, layout)))
    }

    pub fn card(&mut self, id: impl Into<String>, child_id: impl Into<String>) -> &mut Self {
        self.push(
            id,
            ComponentKind::Card(CardProps {
                child: child_id.into(),
            }),
        )
    }

    pub fn list(
        &mut self,
        id: impl Into<String>,
        children: Children,
        direction: Direction,
        alignment: Option<Alignment>,
    ) -> &mut Self {
        self.push(
            id,
            ComponentKind::List(ListProps {
                direction,
                children: Some(children),
                alignment,
            }),
        )
    }

    /// List whose instances are expanded client-side from `data_binding`.
    pub fn template_list(
        &mut self,
        id: impl Into<String>,
        template_id: impl Into<String>,
        data_binding: impl Into<String>,
        direction: Direction,
    ) -> &mut Self {
        self.list(
            id,
            Children::template(template_id, data_binding),
            direction,
            None,
        )
    }

    pub fn icon(&mut self, id: impl Into<String>, name: impl Into<BoundValue>) -> &mut Self {
        self.push(id, ComponentKind::Icon(IconProps { name: name.into() }))
    }

    pub fn divider(&mut self, id: impl Into<String>) -> &mut Self {
        self.push(id, ComponentKind::Divider(DividerProps {}))
    }

    pub fn modal(
        &mut self,
        id: impl Into<String>,
        entry_point_child: impl Into<String>,
        content_child: impl Into<String>,
    ) -> &mut Self {
        self.push(
            id,
            ComponentKind::Modal(ModalProps {
                entry_point_child: entry_point_child.into(),
                content_child: content_child.into(),
            }),
        )
    }

    pub fn checkbox(
        &mut self,
        id: impl Into<String>,
        label: impl Into<BoundValue>,
        value: impl Into<BoundValue>,
    ) -> &mut Self {
        self.push(
            id,
            ComponentKind::CheckBox(CheckBoxProps {
                label: label.into(),
                value: value.into(),
            }),
        )
    }

    pub fn slider(
        &mut self,
        id: impl Into<String>,
        value: impl Into<BoundValue>,
        min_value: Option<Number>,
        max_value: Option<Number>,
    ) -> &mut Self {
        self.push(
            id,
            ComponentKind::Slider(SliderProps {
                value: value.into(),
                min_value,
                max_value,
            }),
        )
    }

    pub fn multi_select(
        &mut self,
        id: impl Into<String>,
        label: impl Into<BoundValue>,
        options: Vec<SelectOption>,
        selected_path: impl Into<String>,
        action_name: Option<&str>,
    ) -> &mut Self {
        self.push(
            id,
            ComponentKind::MultiSelect(MultiSelectProps {
                label: label.into(),
                options,
                selected_path: selected_path.into(),
                action_name: action_name.unwrap_or("toggle_multi_select").to_string(),
            }),
        )
    }

    /// Emits every accumulated component. State is kept, so call once per
    /// batch.
    pub fn build_surface_update(&self) -> Message {
        Message::SurfaceUpdate(SurfaceUpdate {
            surface_id: self.surface_id.clone(),
            components: self.tree.to_vec(),
        })
    }

    pub fn build_data_model_update(
        &self,
        path: impl Into<String>,
        contents: Vec<DataEntry>,
    ) -> Message {
        Message::DataModelUpdate(DataModelUpdate {
            surface_id: self.surface_id.clone(),
            path: Some(path.into()),
            contents,
        })
    }

    pub fn build_begin_rendering(&self, root: impl Into<String>) -> Message {
        Message::BeginRendering(BeginRendering {
            surface_id: self.surface_id.clone(),
            root: root.into(),
        })
    }

    pub fn build_delete_surface(&self) -> Message {
        Message::DeleteSurface(DeleteSurface {
            surface_id: self.surface_id.clone(),
        })
    }
}

fn container<I, S>(children: I, layout: Layout) -> ContainerProps
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ContainerProps {
        children: Children::explicit(children),
        alignment: layout.alignment,
        distribution: layout.distribution,
    }
}

#[cfg(test)]
#[path = "tests/builder_tests.rs"]
mod tests;
