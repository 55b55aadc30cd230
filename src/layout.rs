use serde_json::{Map, Value};

use crate::{
    error::{VizletError, VizletResult},
    model::{LayoutKind, PanelConfig, PanelKind, ResultSection, SectionKind},
    node::RenderNode,
    path::{Resolved, display_value, resolve},
};

/// Optional richer host editor for `code-editor` panels. Returning `None`
/// means the integration is unavailable and the panel falls back to the plain
/// `code` rendering.
pub trait EditorIntegration: Send {
    fn mount(&self, user_code: &str) -> Option<RenderNode>;
}

/// Builds panel trees and section renderings from a panel configuration and a
/// result tree.
#[derive(Default)]
pub struct LayoutComposer {
    editor: Option<Box<dyn EditorIntegration>>,
}

impl LayoutComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_editor(editor: Box<dyn EditorIntegration>) -> Self {
        Self {
            editor: Some(editor),
        }
    }

    pub fn compose(&self, layout: LayoutKind, panels: &[PanelConfig], tree: &Value) -> RenderNode {
        let container = RenderNode::element("div")
            .class("viz-layout")
            .class(layout.tag());

        match layout {
            LayoutKind::SplitHorizontal | LayoutKind::SplitVertical => {
                container.children(panels.iter().map(|p| self.render_panel(p, tree)))
            }
            LayoutKind::Tabbed => self.compose_tabbed(container, panels, tree),
        }
    }

    fn compose_tabbed(
        &self,
        container: RenderNode,
        panels: &[PanelConfig],
        tree: &Value,
    ) -> RenderNode {
        let bar = RenderNode::element("div")
            .class("tab-bar")
            .children(panels.iter().enumerate().map(|(i, panel)| {
                let label = match &panel.title {
                    Some(t) => t.clone(),
                    None => format!("Panel {}", i + 1),
                };
                let mut selector = RenderNode::element("button")
                    .class("tab-selector")
                    .attr("data-index", i.to_string())
                    .attr("data-panel", &panel.id)
                    .text(&label);
                selector.set_class("active", i == 0);
                selector
            }));

        let slots = panels.iter().enumerate().map(|(i, panel)| {
            let mut slot = RenderNode::element("div")
                .class("tab-slot")
                .attr("data-index", i.to_string())
                .child(self.render_panel(panel, tree));
            slot.set_class("active", i == 0);
            slot
        });

        container.child(bar).children(slots)
    }

    /// Activates tab `index` on a previously composed tabbed node and
    /// deactivates every other tab. The active tab is always exactly one.
    pub fn select_tab(node: &mut RenderNode, index: usize) -> VizletResult<()> {
        if !node.has_class(LayoutKind::Tabbed.tag()) {
            return Err(VizletError::validation("node is not a tabbed layout"));
        }

        let tab_count = node
            .children
            .iter()
            .filter(|c| c.has_class("tab-slot"))
            .count();
        if index >= tab_count {
            return Err(VizletError::validation(format!(
                "tab index {index} out of range (tabs: {tab_count})"
            )));
        }

        for child in &mut node.children {
            if child.has_class("tab-bar") {
                for (i, selector) in child.children.iter_mut().enumerate() {
                    selector.set_class("active", i == index);
                }
            } else if child.has_class("tab-slot") {
                let i: usize = child
                    .attrs
                    .get("data-index")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(usize::MAX);
                child.set_class("active", i == index);
            }
        }
        Ok(())
    }

    fn render_panel(&self, panel: &PanelConfig, tree: &Value) -> RenderNode {
        let mut node = RenderNode::element("div")
            .class("panel")
            .class(panel_class(panel.kind))
            .attr("data-panel-id", &panel.id);

        if let Some(title) = &panel.title {
            node = node.child(RenderNode::element("h3").class("panel-title").text(title));
        }

        let body = match panel.kind {
            PanelKind::Code => render_code(tree),
            PanelKind::CodeEditor => self.render_code_editor(tree),
            PanelKind::Results => self.render_results(panel, tree),
            PanelKind::Dashboard => render_dashboard(tree),
        };
        node.child(body)
    }

    fn render_code_editor(&self, tree: &Value) -> RenderNode {
        let code = user_code(tree);
        if let Some(editor) = &self.editor
            && let Some(mounted) = editor.mount(code)
        {
            return mounted;
        }
        render_code(tree)
    }

    fn render_results(&self, panel: &PanelConfig, tree: &Value) -> RenderNode {
        if panel.sections.is_empty() {
            return render_default_results(tree);
        }
        RenderNode::element("div")
            .class("results")
            .children(panel.sections.iter().map(|s| render_section(s, tree)))
    }
}

fn panel_class(kind: PanelKind) -> &'static str {
    match kind {
        PanelKind::Code => "panel-code",
        PanelKind::CodeEditor => "panel-code-editor",
        PanelKind::Results => "panel-results",
        PanelKind::Dashboard => "panel-dashboard",
    }
}

fn user_code(tree: &Value) -> &str {
    tree.get("user_code").and_then(Value::as_str).unwrap_or("")
}

fn render_code(tree: &Value) -> RenderNode {
    let code = user_code(tree);
    let shown = if code.is_empty() {
        "No code submitted."
    } else {
        code
    };
    RenderNode::element("pre").class("code-view").text(shown)
}

/// When a results panel has no sections, enumerate the conventional subtrees
/// that happen to be present.
fn render_default_results(tree: &Value) -> RenderNode {
    let mut node = RenderNode::element("div")
        .class("results")
        .class("results-default");

    for (key, label) in [
        ("classes", "Classes"),
        ("functions", "Functions"),
        ("variables", "Variables"),
    ] {
        let Some(map) = non_empty_object(tree.get(key)) else {
            continue;
        };
        let list = RenderNode::element("ul").children(
            map.keys()
                .map(|name| RenderNode::element("li").text(name)),
        );
        node = node.child(
            RenderNode::element("div")
                .class("result-group")
                .attr("data-group", key)
                .child(RenderNode::element("h4").text(label))
                .child(list),
        );
    }
    node
}

fn render_section(section: &ResultSection, tree: &Value) -> RenderNode {
    let mut node = RenderNode::element("div").class("section");
    if let Some(title) = &section.title {
        node = node.child(RenderNode::element("h4").class("section-title").text(title));
    }
    let body = match section.kind {
        SectionKind::Table => render_table(&section.data, tree),
        SectionKind::KeyValue => render_key_value(&section.data, tree),
        SectionKind::List => render_list(&section.data, tree),
    };
    node.child(body)
}

fn render_table(data: &str, tree: &Value) -> RenderNode {
    let Resolved::Value(Value::Array(items)) = resolve(data, tree) else {
        return no_data();
    };
    if items.is_empty() {
        return no_data();
    }

    let header_keys: Vec<&String> = match &items[0] {
        Value::Object(map) => map.keys().collect(),
        _ => Vec::new(),
    };

    let head_cells: Vec<RenderNode> = if header_keys.is_empty() {
        // Single unlabeled column.
        vec![RenderNode::element("th")]
    } else {
        header_keys
            .iter()
            .map(|k| RenderNode::element("th").text(k))
            .collect()
    };
    let thead = RenderNode::element("thead")
        .child(RenderNode::element("tr").children(head_cells));

    let rows = items.iter().map(|item| match item {
        Value::Object(map) if !header_keys.is_empty() => {
            RenderNode::element("tr").children(header_keys.iter().map(|k| {
                let cell = map.get(*k).map(display_value).unwrap_or_default();
                RenderNode::element("td").text(&cell)
            }))
        }
        other => RenderNode::element("tr")
            .child(RenderNode::element("td").text(&display_value(other))),
    });
    let tbody = RenderNode::element("tbody").children(rows);

    RenderNode::element("table")
        .class("section-table")
        .child(thead)
        .child(tbody)
}

fn render_key_value(data: &str, tree: &Value) -> RenderNode {
    let Resolved::Value(Value::Object(map)) = resolve(data, tree) else {
        return no_data();
    };
    if map.is_empty() {
        return no_data();
    }

    RenderNode::element("div")
        .class("section-key-value")
        .children(map.iter().map(|(key, value)| {
            RenderNode::element("div")
                .class("kv-row")
                .child(RenderNode::element("span").class("kv-key").text(key))
                .child(
                    RenderNode::element("span")
                        .class("kv-value")
                        .text(&display_value(value)),
                )
        }))
}

fn render_list(data: &str, tree: &Value) -> RenderNode {
    let items: Vec<String> = match resolve(data, tree) {
        Resolved::Value(Value::Array(items)) => items.iter().map(display_value).collect(),
        Resolved::Value(Value::Object(map)) => map.keys().cloned().collect(),
        _ => Vec::new(),
    };
    if items.is_empty() {
        return no_data();
    }

    RenderNode::element("ul")
        .class("section-list")
        .children(items.iter().map(|item| RenderNode::element("li").text(item)))
}

/// Up to three cards; each appears only when its subtree is non-empty.
fn render_dashboard(tree: &Value) -> RenderNode {
    let mut node = RenderNode::element("div").class("dashboard");

    if let Some(functions) = non_empty_object(tree.get("functions")) {
        node = node.child(card(
            "Functions",
            "functions",
            functions.iter().map(|(name, info)| function_entry(name, info)),
        ));
    }
    if let Some(classes) = non_empty_object(tree.get("classes")) {
        node = node.child(card(
            "Classes",
            "classes",
            classes.iter().map(|(name, info)| class_entry(name, info)),
        ));
    }
    if let Some(variables) = non_empty_object(tree.get("variables")) {
        node = node.child(card(
            "Variables",
            "variables",
            variables.iter().map(|(name, info)| variable_entry(name, info)),
        ));
    }
    node
}

fn card(title: &str, tag: &str, entries: impl IntoIterator<Item = RenderNode>) -> RenderNode {
    RenderNode::element("div")
        .class("card")
        .attr("data-card", tag)
        .child(RenderNode::element("h4").class("card-title").text(title))
        .children(entries)
}

fn function_entry(name: &str, info: &Value) -> RenderNode {
    let mut entry = RenderNode::element("div")
        .class("card-entry")
        .child(RenderNode::element("span").class("entry-name").text(name));

    let (Some(actual), Some(Value::Array(expecteds))) =
        (info.get("return_value"), info.get("expected_results"))
    else {
        return entry;
    };

    // String-serialize both sides before comparing; arrays collapse to their
    // comma-joined form first.
    let actual_text = display_value(actual);
    let matched = expecteds.iter().any(|e| display_value(e) == actual_text);

    entry = entry.child(
        RenderNode::element("span")
            .class("entry-value")
            .text(&actual_text),
    );
    if matched {
        entry.set_class("matched", true);
    } else {
        entry.set_class("mismatched", true);
        let expected_text = expecteds
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join("; ");
        entry = entry.child(
            RenderNode::element("div")
                .class("entry-expected")
                .text(&format!("expected: {expected_text}")),
        );
    }
    entry
}

fn class_entry(name: &str, info: &Value) -> RenderNode {
    let mut entry = RenderNode::element("div")
        .class("card-entry")
        .child(RenderNode::element("span").class("entry-name").text(name));

    if let Some(methods) = non_empty_object(info.get("methods")) {
        entry = entry.child(
            RenderNode::element("span")
                .class("entry-detail")
                .text(&format!("{} methods", methods.len())),
        );
    }
    entry
}

fn variable_entry(name: &str, info: &Value) -> RenderNode {
    let mut entry = RenderNode::element("div")
        .class("card-entry")
        .child(RenderNode::element("span").class("entry-name").text(name));

    if let Some(value) = info.get("value") {
        entry = entry.child(
            RenderNode::element("span")
                .class("entry-value")
                .text(&display_value(value)),
        );
    }
    entry
}

fn no_data() -> RenderNode {
    RenderNode::element("div").class("no-data").text("No data available")
}

fn non_empty_object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value.and_then(Value::as_object).filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn panel(id: &str, kind: &str, sections: Value) -> PanelConfig {
        serde_json::from_value(json!({ "id": id, "type": kind, "sections": sections })).unwrap()
    }

    fn tree() -> Value {
        json!({
            "user_code": "def even_squares(nums):\n    return [n*n for n in nums if n % 2 == 0]",
            "functions": {
                "even_squares": {
                    "type": "function",
                    "return_value": [4, 16],
                    "expected_results": [[4, 16]]
                }
            },
            "classes": {
                "Counter": { "name": "Counter", "methods": { "from_list": {}, "is_positive": {} } }
            },
            "variables": {
                "count": { "type": "int", "value": "42" },
                "result": { "type": "list", "value": "[4, 16]" }
            }
        })
    }

    #[test]
    fn split_concats_panels_in_order() {
        let composer = LayoutComposer::new();
        let panels = vec![
            panel("p1", "code", json!([])),
            panel("p2", "dashboard", json!([])),
        ];
        let node = composer.compose(LayoutKind::SplitVertical, &panels, &tree());
        assert!(node.has_class("layout-split-vertical"));
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.children[0].attrs.get("data-panel-id").unwrap(), "p1");
        assert_eq!(node.children[1].attrs.get("data-panel-id").unwrap(), "p2");
    }

    #[test]
    fn tabbed_defaults_to_first_tab() {
        let composer = LayoutComposer::new();
        let mut panels = vec![
            panel("p1", "code", json!([])),
            panel("p2", "results", json!([])),
        ];
        panels[0].title = Some("Code".to_string());
        let node = composer.compose(LayoutKind::Tabbed, &panels, &tree());

        let bar = &node.children[0];
        assert!(bar.has_class("tab-bar"));
        assert_eq!(bar.children[0].text.as_deref(), Some("Code"));
        assert_eq!(bar.children[1].text.as_deref(), Some("Panel 2"));
        assert!(bar.children[0].has_class("active"));
        assert!(!bar.children[1].has_class("active"));
        assert!(node.children[1].has_class("active"));
        assert!(!node.children[2].has_class("active"));
    }

    #[test]
    fn select_tab_is_mutually_exclusive() {
        let composer = LayoutComposer::new();
        let panels = vec![
            panel("p1", "code", json!([])),
            panel("p2", "results", json!([])),
            panel("p3", "dashboard", json!([])),
        ];
        let mut node = composer.compose(LayoutKind::Tabbed, &panels, &tree());
        LayoutComposer::select_tab(&mut node, 2).unwrap();

        let bar = &node.children[0];
        let active_selectors: Vec<usize> = bar
            .children
            .iter()
            .enumerate()
            .filter(|(_, c)| c.has_class("active"))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(active_selectors, vec![2]);

        let active_slots: Vec<&str> = node
            .children
            .iter()
            .filter(|c| c.has_class("tab-slot") && c.has_class("active"))
            .map(|c| c.attrs.get("data-index").unwrap().as_str())
            .collect();
        assert_eq!(active_slots, vec!["2"]);
    }

    #[test]
    fn select_tab_rejects_out_of_range() {
        let composer = LayoutComposer::new();
        let panels = vec![panel("p1", "code", json!([]))];
        let mut node = composer.compose(LayoutKind::Tabbed, &panels, &tree());
        assert!(LayoutComposer::select_tab(&mut node, 1).is_err());

        let mut split = composer.compose(LayoutKind::SplitHorizontal, &panels, &tree());
        assert!(LayoutComposer::select_tab(&mut split, 0).is_err());
    }

    #[test]
    fn code_panel_shows_user_code_escaped() {
        let composer = LayoutComposer::new();
        let t = json!({ "user_code": "if a < b:" });
        let node = composer.compose(
            LayoutKind::SplitHorizontal,
            &[panel("p1", "code", json!([]))],
            &t,
        );
        let body = &node.children[0].children[0];
        assert_eq!(body.tag, "pre");
        assert_eq!(body.text.as_deref(), Some("if a &lt; b:"));
    }

    #[test]
    fn code_panel_placeholder_when_absent() {
        let composer = LayoutComposer::new();
        let node = composer.compose(
            LayoutKind::SplitHorizontal,
            &[panel("p1", "code", json!([]))],
            &json!({}),
        );
        let body = &node.children[0].children[0];
        assert_eq!(body.text.as_deref(), Some("No code submitted."));
    }

    struct FixedEditor(Option<RenderNode>);
    impl EditorIntegration for FixedEditor {
        fn mount(&self, _user_code: &str) -> Option<RenderNode> {
            self.0.clone()
        }
    }

    #[test]
    fn code_editor_uses_host_integration_when_available() {
        let mounted = RenderNode::element("div").class("host-editor");
        let composer = LayoutComposer::with_editor(Box::new(FixedEditor(Some(mounted))));
        let node = composer.compose(
            LayoutKind::SplitHorizontal,
            &[panel("p1", "code-editor", json!([]))],
            &tree(),
        );
        assert!(node.children[0].children[0].has_class("host-editor"));
    }

    #[test]
    fn code_editor_falls_back_to_plain_code() {
        let composer = LayoutComposer::with_editor(Box::new(FixedEditor(None)));
        let node = composer.compose(
            LayoutKind::SplitHorizontal,
            &[panel("p1", "code-editor", json!([]))],
            &tree(),
        );
        assert_eq!(node.children[0].children[0].tag, "pre");
    }

    #[test]
    fn results_default_view_enumerates_present_subtrees() {
        let composer = LayoutComposer::new();
        let node = composer.compose(
            LayoutKind::SplitHorizontal,
            &[panel("p1", "results", json!([]))],
            &tree(),
        );
        let body = &node.children[0].children[0];
        assert!(body.has_class("results-default"));
        let groups: Vec<&str> = body
            .children
            .iter()
            .map(|g| g.attrs.get("data-group").unwrap().as_str())
            .collect();
        assert_eq!(groups, vec!["classes", "functions", "variables"]);
    }

    #[test]
    fn results_default_view_skips_empty_subtrees() {
        let composer = LayoutComposer::new();
        let t = json!({ "functions": { "f": {} }, "classes": {} });
        let node = composer.compose(
            LayoutKind::SplitHorizontal,
            &[panel("p1", "results", json!([]))],
            &t,
        );
        let body = &node.children[0].children[0];
        assert_eq!(body.children.len(), 1);
        assert_eq!(body.children[0].attrs.get("data-group").unwrap(), "functions");
    }

    #[test]
    fn empty_table_renders_no_data() {
        let t = json!({ "rows": [] });
        let body = render_table("execution.rows", &t);
        assert!(body.has_class("no-data"));
        assert!(render_table("execution.missing", &t).has_class("no-data"));
        assert!(render_table("5", &t).has_class("no-data"));
    }

    #[test]
    fn table_headers_come_from_first_row() {
        let t = json!({
            "rows": [
                { "name": "a", "score": 1 },
                { "name": "b", "score": 2 },
                "stray"
            ]
        });
        let table = render_table("execution.rows", &t);
        assert_eq!(table.tag, "table");

        let head_row = &table.children[0].children[0];
        let headers: Vec<&str> = head_row
            .children
            .iter()
            .map(|th| th.text.as_deref().unwrap())
            .collect();
        assert_eq!(headers, vec!["name", "score"]);

        let body = &table.children[1];
        assert_eq!(body.children.len(), 3);
        assert_eq!(body.children[0].children.len(), 2);
        // Non-object elements collapse into a single cell.
        assert_eq!(body.children[2].children.len(), 1);
        assert_eq!(body.children[2].children[0].text.as_deref(), Some("stray"));
    }

    #[test]
    fn table_of_scalars_uses_one_unlabeled_column() {
        let t = json!({ "rows": [1, 2, 3] });
        let table = render_table("execution.rows", &t);
        let head_row = &table.children[0].children[0];
        assert_eq!(head_row.children.len(), 1);
        assert!(head_row.children[0].text.is_none());
    }

    #[test]
    fn key_value_preserves_insertion_order() {
        let t = json!({ "info": { "zeta": 1, "alpha": 2 } });
        let body = render_key_value("execution.info", &t);
        let keys: Vec<&str> = body
            .children
            .iter()
            .map(|row| row.children[0].text.as_deref().unwrap())
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert!(render_key_value("execution.nope", &t).has_class("no-data"));
    }

    #[test]
    fn list_accepts_arrays_and_objects() {
        let t = json!({ "arr": ["x", "y"], "obj": { "a": 1, "b": 2 }, "empty": [] });
        let arr = render_list("execution.arr", &t);
        assert_eq!(arr.children.len(), 2);
        let obj = render_list("execution.obj", &t);
        let items: Vec<&str> = obj
            .children
            .iter()
            .map(|li| li.text.as_deref().unwrap())
            .collect();
        assert_eq!(items, vec!["a", "b"]);
        assert!(render_list("execution.empty", &t).has_class("no-data"));
        assert!(render_list("literal", &t).has_class("no-data"));
    }

    #[test]
    fn dashboard_marks_matches_and_mismatches() {
        let node = render_dashboard(&tree());
        let functions = &node.children[0];
        assert_eq!(functions.attrs.get("data-card").unwrap(), "functions");
        let entry = &functions.children[1];
        assert!(entry.has_class("matched"));

        let t = json!({
            "functions": {
                "f": { "return_value": [1, 4, 9], "expected_results": [[4, 16]] }
            }
        });
        let node = render_dashboard(&t);
        let entry = &node.children[0].children[1];
        assert!(entry.has_class("mismatched"));
        let expected = entry.children.last().unwrap();
        assert!(expected.has_class("entry-expected"));
        assert_eq!(expected.text.as_deref(), Some("expected: 4,16"));
    }

    #[test]
    fn dashboard_array_string_ambiguity_is_preserved() {
        let t = json!({
            "functions": {
                "f": { "return_value": "1,2", "expected_results": [[1, 2]] }
            }
        });
        let node = render_dashboard(&t);
        assert!(node.children[0].children[1].has_class("matched"));
    }

    #[test]
    fn dashboard_omits_empty_cards() {
        let t = json!({ "functions": {}, "variables": { "x": { "value": "1" } } });
        let node = render_dashboard(&t);
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].attrs.get("data-card").unwrap(), "variables");
    }
}
