//! Integration tests for the editor crate: the sync controller and tree
//! renderer driven through their public API against a recording host.

use docsync_editor::preferences::{FORMAT_KEY, INDENT_KEY};
use docsync_editor::{
    BasicNodeView, CodecRegistry, CommandCounters, CommandKind, Document, EditorError, ErrorSink,
    HostError, IdentitySchema, ImportOutcome, Indentation, MemoryStore, NodeView, Path,
    PreferenceStore, RenderContext, RenderError, Schema, SchemaError, StripAnnotations,
    SyncConfig, SyncController, SyncHost, TransformContext, TreeNode, TreeRenderer, Value,
};
use serde_json::{json, Map};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Default)]
struct RecordingHost {
    errors: RefCell<Vec<String>>,
    clipboard: RefCell<Vec<String>>,
    copies: Cell<u32>,
    saved: RefCell<Vec<(String, String)>>,
    focused: Cell<u32>,
    fail_clipboard: Cell<bool>,
}

impl ErrorSink for RecordingHost {
    fn report_error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }
}

impl SyncHost for RecordingHost {
    fn write_clipboard(&self, text: &str) -> Result<(), HostError> {
        if self.fail_clipboard.get() {
            return Err(HostError("clipboard unavailable".to_string()));
        }
        self.clipboard.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn copy_succeeded(&self) {
        self.copies.set(self.copies.get() + 1);
    }

    fn save_file(&self, filename: &str, contents: &str) -> Result<(), HostError> {
        self.saved
            .borrow_mut()
            .push((filename.to_string(), contents.to_string()));
        Ok(())
    }

    fn focus_source(&self) {
        self.focused.set(self.focused.get() + 1);
    }
}

/// Counts transform calls, i.e. output recomputes
#[derive(Default)]
struct CountingSchema {
    transforms: Cell<u32>,
}

impl Schema for CountingSchema {
    fn transform(&self, value: &Value, _context: &TransformContext) -> Result<Value, SchemaError> {
        self.transforms.set(self.transforms.get() + 1);
        Ok(value.clone())
    }
}

struct FailingSchema;

impl Schema for FailingSchema {
    fn transform(&self, _value: &Value, _context: &TransformContext) -> Result<Value, SchemaError> {
        Err(SchemaError("missing pool".to_string()))
    }
}

fn controller_with(host: &Rc<RecordingHost>, prefs: Rc<dyn PreferenceStore>) -> SyncController {
    let controller = SyncController::new(
        CodecRegistry::with_defaults(),
        SyncConfig::default(),
        host.clone(),
        prefs,
    )
    .unwrap();
    let schema: Rc<dyn Schema> = Rc::new(IdentitySchema);
    controller.set_schema(Some(schema));
    controller
}

fn controller(host: &Rc<RecordingHost>) -> SyncController {
    controller_with(host, Rc::new(MemoryStore::new()))
}

fn scenario_document() -> Document {
    Document::new(json!({ "a": 1, "b": [true, null] }))
}

fn notification_counter(document: &Document) -> (Rc<Cell<u32>>, docsync_editor::Subscription) {
    let count = Rc::new(Cell::new(0));
    let inner = count.clone();
    let subscription = document.subscribe(move |_| inner.set(inner.get() + 1));
    (count, subscription)
}

#[test]
fn test_json_export_scenario() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);
    controller.set_document(Some(scenario_document()));

    let expected = "{\n  \"a\": 1,\n  \"b\": [\n    true,\n    null\n  ]\n}\n";
    assert_eq!(controller.export().unwrap(), expected);
    assert_eq!(controller.source(), expected);
    assert!(host.errors.borrow().is_empty());
}

#[test]
fn test_yaml_minified_scenario() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);
    controller.set_document(Some(scenario_document()));

    controller.set_format("yaml").unwrap();
    controller.set_indentation(Indentation::Minified).unwrap();

    assert_eq!(controller.source(), "{a: 1, b: [true, null]}\n");
}

#[test]
fn test_bad_import_leaves_model_and_buffer_untouched() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);
    let document = scenario_document();
    controller.set_document(Some(document.clone()));
    let (notifications, _subscription) = notification_counter(&document);

    controller.edit_source("{not valid");
    let outcome = controller.import();

    assert!(matches!(&outcome, ImportOutcome::Failed(err) if err.is_parse_error()));
    assert_eq!(document.value(), json!({ "a": 1, "b": [true, null] }));
    assert_eq!(document.version(), 0);
    assert_eq!(notifications.get(), 0);
    assert_eq!(controller.source(), "{not valid");

    let errors = host.errors.borrow();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Error importing: "));
}

#[test]
fn test_empty_import_is_a_no_op() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);
    let document = scenario_document();
    controller.set_document(Some(document.clone()));
    let (notifications, _subscription) = notification_counter(&document);

    controller.edit_source("");
    assert!(matches!(controller.import(), ImportOutcome::Skipped));

    assert_eq!(notifications.get(), 0);
    assert_eq!(document.version(), 0);
    assert!(host.errors.borrow().is_empty());
}

#[test]
fn test_import_resets_document_and_reformats() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);
    let document = scenario_document();
    controller.set_document(Some(document.clone()));
    let (notifications, _subscription) = notification_counter(&document);

    controller.edit_source("{\"x\":   [1,2]}");
    assert!(controller.import().is_applied());

    assert_eq!(document.value(), json!({ "x": [1, 2] }));
    assert_eq!(notifications.get(), 1);
    assert_eq!(controller.source(), "{\n  \"x\": [\n    1,\n    2\n  ]\n}\n");
}

#[test]
fn test_yaml_import() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);
    let document = scenario_document();
    controller.set_document(Some(document.clone()));
    controller.set_format("yaml").unwrap();

    controller.edit_source("pools:\n  - rolls: 2\n");
    assert!(controller.import().is_applied());
    assert_eq!(document.value(), json!({ "pools": [{ "rolls": 2 }] }));
}

#[test]
fn test_preview_truncation_keeps_full_export() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);
    controller.set_document(Some(Document::new(json!({ "text": "x".repeat(20_000) }))));

    let full = controller.export().unwrap();
    assert!(full.chars().count() >= 10_000);

    let notice = controller.config().truncation_notice();
    let preview = controller.source();
    assert_eq!(preview.chars().count(), 10_000 + notice.chars().count());
    assert!(preview.ends_with(&notice));
    assert_eq!(&preview[..10_000], &full[..10_000]);

    let mut counters = CommandCounters::default();
    counters.bump(CommandKind::Copy);
    controller.dispatch(&counters);
    assert_eq!(host.clipboard.borrow().as_slice(), [full]);
}

#[test]
fn test_short_output_is_not_truncated() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);
    controller.set_document(Some(Document::new(json!({ "text": "x".repeat(100) }))));
    assert_eq!(controller.source(), controller.export().unwrap());
}

#[test]
fn test_preview_limit_counts_characters_not_bytes() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);
    let notice = controller.config().truncation_notice();

    // Quotes plus trailing newline: 9,999 characters, nearly 20,000 bytes
    let below = Document::new(json!("é".repeat(9_996)));
    controller.set_document(Some(below));
    let export = controller.export().unwrap();
    assert_eq!(export.chars().count(), 9_999);
    assert!(export.len() > 10_000);
    assert_eq!(controller.source(), export);

    let at_limit = Document::new(json!("é".repeat(9_997)));
    controller.set_document(Some(at_limit));
    let export = controller.export().unwrap();
    assert_eq!(export.chars().count(), 10_000);
    assert_eq!(controller.source(), format!("{export}{notice}"));
}

#[test]
fn test_copy_fires_once_per_increment() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);
    controller.set_document(Some(scenario_document()));

    let mut counters = CommandCounters::default();
    assert!(controller.dispatch(&counters).is_empty());

    counters.bump(CommandKind::Copy);
    assert_eq!(controller.dispatch(&counters), vec![CommandKind::Copy]);
    assert_eq!(host.clipboard.borrow().len(), 1);
    assert_eq!(host.copies.get(), 1);

    // Re-renders deliver the same counters again
    for _ in 0..3 {
        assert!(controller.dispatch(&counters).is_empty());
    }
    assert_eq!(host.clipboard.borrow().len(), 1);
    assert_eq!(host.copies.get(), 1);

    counters.bump(CommandKind::Copy);
    controller.dispatch(&counters);
    assert_eq!(host.clipboard.borrow().len(), 2);
    assert_eq!(host.copies.get(), 2);
}

#[test]
fn test_failed_clipboard_write_is_reported() {
    let host = Rc::new(RecordingHost::default());
    host.fail_clipboard.set(true);
    let mut controller = controller(&host);
    controller.set_document(Some(scenario_document()));

    let mut counters = CommandCounters::default();
    counters.bump(CommandKind::Copy);
    controller.dispatch(&counters);

    assert_eq!(host.copies.get(), 0);
    assert_eq!(
        host.errors.borrow().as_slice(),
        ["Error copying: clipboard unavailable".to_string()]
    );
}

#[test]
fn test_copy_with_failing_transform_reports_output_error() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);
    controller.set_document(Some(scenario_document()));
    let schema: Rc<dyn Schema> = Rc::new(FailingSchema);
    controller.set_schema(Some(schema));
    host.errors.borrow_mut().clear();

    let mut counters = CommandCounters::default();
    counters.bump(CommandKind::Copy);
    assert_eq!(controller.dispatch(&counters), vec![CommandKind::Copy]);

    assert!(host.clipboard.borrow().is_empty());
    assert_eq!(
        host.errors.borrow().as_slice(),
        ["Error getting JSON output: Transform error: missing pool".to_string()]
    );
}

#[test]
fn test_download_saves_untruncated_export() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);
    controller.set_document(Some(scenario_document()));
    controller.set_name("loot_table");
    controller.set_format("yaml").unwrap();

    let mut counters = CommandCounters::default();
    counters.bump(CommandKind::Download);
    controller.dispatch(&counters);
    controller.dispatch(&counters);

    let saved = host.saved.borrow();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, "loot_table.yaml");
    assert_eq!(saved[0].1, controller.export().unwrap());
}

#[test]
fn test_import_start_clears_source_and_focuses() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);
    let document = scenario_document();
    controller.set_document(Some(document.clone()));
    assert!(!controller.source().is_empty());

    let mut counters = CommandCounters::default();
    counters.bump(CommandKind::Import);
    controller.dispatch(&counters);

    assert_eq!(controller.source(), "");
    assert_eq!(host.focused.get(), 1);
    assert_eq!(document.version(), 0);
}

#[test]
fn test_commands_without_document_are_consumed() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);

    let mut counters = CommandCounters::default();
    counters.bump(CommandKind::Copy).bump(CommandKind::Download);
    assert!(controller.dispatch(&counters).is_empty());
    assert_eq!(controller.last_seen(), counters);

    controller.set_document(Some(scenario_document()));
    assert!(controller.dispatch(&counters).is_empty());
    assert!(host.clipboard.borrow().is_empty());
    assert!(host.saved.borrow().is_empty());
}

#[test]
fn test_silent_reset_skips_notification() {
    let document = scenario_document();
    let (notifications, _subscription) = notification_counter(&document);

    document.reset(json!({ "quiet": true }), true);
    assert_eq!(document.value(), json!({ "quiet": true }));
    assert_eq!(notifications.get(), 0);

    document.reset(json!({ "loud": true }), false);
    assert_eq!(notifications.get(), 1);
}

#[test]
fn test_recompute_only_on_triggers() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);
    let counting = Rc::new(CountingSchema::default());
    let schema: Rc<dyn Schema> = counting.clone();
    controller.set_schema(Some(schema.clone()));
    assert_eq!(counting.transforms.get(), 0);

    let document = scenario_document();
    controller.set_document(Some(document.clone()));
    assert_eq!(counting.transforms.get(), 1);

    // Not triggers
    controller.set_document(Some(document.clone()));
    controller.set_schema(Some(schema.clone()));
    controller.set_format("json").unwrap();
    controller.set_indentation(Indentation::TwoSpaces).unwrap();
    controller.set_name("other");
    Document::new(json!({})).set(&"/x".parse().unwrap(), json!(1)).unwrap();
    let mut renderer = TreeRenderer::new(host.clone());
    renderer.set_lang("en_us");
    renderer.set_view(Some(Rc::new(BasicNodeView)));
    renderer.set_document(Some(document.clone()));
    renderer.render();
    assert_eq!(counting.transforms.get(), 1);

    // Triggers
    document.set(&"/a".parse().unwrap(), json!(2)).unwrap();
    assert_eq!(counting.transforms.get(), 2);
    controller.set_indentation(Indentation::Tabs).unwrap();
    assert_eq!(counting.transforms.get(), 3);
    controller.set_format("yaml").unwrap();
    assert_eq!(counting.transforms.get(), 4);
    controller.set_document(Some(Document::new(json!([]))));
    assert_eq!(counting.transforms.get(), 5);
}

#[test]
fn test_rebinding_releases_old_document() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);
    let first = scenario_document();
    let second = Document::new(json!({ "second": true }));

    controller.set_document(Some(first.clone()));
    controller.set_document(Some(second.clone()));
    assert_eq!(first.listener_count(), 0);
    assert_eq!(second.listener_count(), 1);

    let recomputes = controller.recomputes();
    first.set(&"/a".parse().unwrap(), json!(9)).unwrap();
    assert_eq!(controller.recomputes(), recomputes);
    assert_eq!(controller.source(), "{\n  \"second\": true\n}\n");

    drop(controller);
    assert_eq!(second.listener_count(), 0);
}

#[test]
fn test_transform_error_clears_buffer() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);
    controller.set_document(Some(scenario_document()));
    assert!(!controller.source().is_empty());

    let failing: Rc<dyn Schema> = Rc::new(FailingSchema);
    controller.set_schema(Some(failing));

    assert_eq!(controller.source(), "");
    let errors = host.errors.borrow();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Error getting JSON output: "));
    assert!(errors[0].contains("missing pool"));
    assert!(matches!(controller.export(), Err(EditorError::Transform(_))));
}

#[test]
fn test_strip_annotations_on_export() {
    let host = Rc::new(RecordingHost::default());
    let mut controller = controller(&host);
    let schema: Rc<dyn Schema> = Rc::new(StripAnnotations::default());
    controller.set_schema(Some(schema));
    controller.set_indentation(Indentation::Minified).unwrap();
    controller.set_document(Some(Document::new(json!({ "__collapsed": true, "a": 1 }))));

    assert_eq!(controller.source(), "{\"a\":1}\n");
}

#[test]
fn test_preferences_are_persisted_and_restored() {
    let host = Rc::new(RecordingHost::default());
    let prefs = Rc::new(MemoryStore::new());

    let controller = controller_with(&host, prefs.clone());
    assert_eq!(controller.settings().format, "json");
    controller.set_format("yaml").unwrap();
    controller.set_indentation(Indentation::FourSpaces).unwrap();

    assert_eq!(prefs.get(FORMAT_KEY).as_deref(), Some("yaml"));
    assert_eq!(prefs.get(INDENT_KEY).as_deref(), Some("4_spaces"));

    let restored = controller_with(&host, prefs);
    assert_eq!(restored.settings().format, "yaml");
    assert_eq!(restored.settings().indentation, Indentation::FourSpaces);
}

#[test]
fn test_unknown_stored_preferences_fall_back_to_defaults() {
    let host = Rc::new(RecordingHost::default());
    let prefs = Rc::new(MemoryStore::with_values([(FORMAT_KEY, "toml"), (INDENT_KEY, "3_spaces")]));

    let controller = controller_with(&host, prefs);
    assert_eq!(controller.settings().format, "json");
    assert_eq!(controller.settings().indentation, Indentation::TwoSpaces);
}

#[test]
fn test_unknown_format_is_rejected() {
    let host = Rc::new(RecordingHost::default());
    let controller = controller(&host);

    let err = controller.set_format("toml").unwrap_err();
    assert!(matches!(err, EditorError::UnknownFormat(format) if format == "toml"));
    assert_eq!(controller.settings().format, "json");
}

/// Fails on one path, either by panicking or by returning an error
struct FaultyView {
    fault_at: Path,
    panic: bool,
}

impl NodeView for FaultyView {
    fn render_map(
        &self,
        path: &Path,
        map: &Map<String, Value>,
        entries: Vec<(String, TreeNode)>,
        context: &RenderContext,
    ) -> Result<TreeNode, RenderError> {
        BasicNodeView.render_map(path, map, entries, context)
    }

    fn render_list(
        &self,
        path: &Path,
        items: Vec<TreeNode>,
        context: &RenderContext,
    ) -> Result<TreeNode, RenderError> {
        BasicNodeView.render_list(path, items, context)
    }

    fn render_primitive(
        &self,
        path: &Path,
        value: &Value,
        context: &RenderContext,
    ) -> Result<TreeNode, RenderError> {
        if *path == self.fault_at {
            if self.panic {
                panic!("unknown field type");
            }
            return Err(RenderError::new(path.clone(), "unknown field type"));
        }
        BasicNodeView.render_primitive(path, value, context)
    }
}

fn render_with_fault(panic: bool) -> (TreeNode, Rc<RecordingHost>) {
    let host = Rc::new(RecordingHost::default());
    let document = Document::new(json!({ "a": 1, "b": [true, "bad"], "c": "ok" }));

    let mut renderer = TreeRenderer::new(host.clone());
    renderer.set_lang("en_us");
    renderer.set_view(Some(Rc::new(FaultyView {
        fault_at: "/b/1".parse().unwrap(),
        panic,
    })));
    renderer.set_document(Some(document));
    (renderer.render(), host)
}

#[test]
fn test_render_error_is_isolated_to_subtree() {
    for panic in [false, true] {
        let (tree, host) = render_with_fault(panic);

        let list = tree.find(&"/b".parse().unwrap());
        let Some(TreeNode::Element { tag, children, .. }) = list.and_then(|entry| match entry {
            TreeNode::Element { children, .. } => children.first(),
            _ => None,
        }) else {
            panic!("list element missing");
        };
        assert_eq!(tag, "list");
        assert!(!children[0].is_empty());
        assert!(children[1].is_empty());

        assert!(tree.find(&"/a".parse().unwrap()).is_some());
        assert!(tree.find(&"/c".parse().unwrap()).is_some());

        let errors = host.errors.borrow();
        assert_eq!(errors.as_slice(), ["Error rendering the tree: unknown field type".to_string()]);
    }
}

#[test]
fn test_rerender_reflects_current_value_without_stale_handlers() {
    let host = Rc::new(RecordingHost::default());
    let first = Document::new(json!({ "a": 1 }));
    let second = Document::new(json!({ "b": 2 }));

    let mut renderer = TreeRenderer::new(host.clone());
    renderer.set_lang("en_us");
    renderer.set_view(Some(Rc::new(BasicNodeView)));

    renderer.set_document(Some(first.clone()));
    let before = renderer.render();
    assert_eq!(renderer.render(), before);

    renderer.set_document(Some(second.clone()));
    let tree = renderer.render();
    assert!(tree.find(&"/b".parse().unwrap()).is_some());
    assert!(tree.find(&"/a".parse().unwrap()).is_none());

    first.set(&"/a".parse().unwrap(), json!(5)).unwrap();
    assert!(!renderer.is_stale());
    assert_eq!(first.listener_count(), 0);

    second.set(&"/b".parse().unwrap(), json!(3)).unwrap();
    assert!(renderer.is_stale());
    let field = renderer.render();
    assert!(field.outline().contains("\"3\""));
}
