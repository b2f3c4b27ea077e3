use cbx_dom::{Document, Element, MemoryDocument};
use cbx_engine::{ActionEvent, CbxBuilder, EngineConfig, EventKind};
use cbx_test_utils::{
    checkbox_group, constraint_box, form, is_visible, login_form, select, text_input,
};
use pretty_assertions::assert_eq;

#[test]
fn test_submit_blocks_and_scrolls_to_topmost_error() {
    let (doc, form, boxes) = login_form();
    let cbx = CbxBuilder::new().install(doc).unwrap();

    let mut submit = ActionEvent::new(EventKind::Submit, form);
    let outcome = cbx.handle(&mut submit).unwrap().unwrap();

    assert!(outcome.blocked());
    assert_eq!(outcome.blocking, boxes);
    assert_eq!(outcome.scroll_to, Some(50.0));
    assert!(submit.default_prevented());
    assert!(submit.propagation_stopped());
    cbx.with_document(|doc| {
        assert_eq!(doc.last_scroll(), Some((0.0, 50.0)));
        assert_eq!(doc.content(boxes[1]), Some("0 of 8 characters"));
    });
}

#[test]
fn test_submit_proceeds_when_all_valid() {
    let (mut doc, form, boxes) = login_form();
    let user = doc.by_id("user").unwrap();
    let password = doc.by_id("password").unwrap();
    doc.set_value(user, "ada");
    doc.set_value(password, "correct horse");
    let cbx = CbxBuilder::new().install(doc).unwrap();

    let mut submit = ActionEvent::new(EventKind::Submit, form);
    let outcome = cbx.handle(&mut submit).unwrap().unwrap();

    assert!(!outcome.blocked());
    assert_eq!(outcome.checked.iter().map(|o| o.node).collect::<Vec<_>>(), boxes);
    assert_eq!(outcome.scroll_to, None);
    assert!(!submit.default_prevented());
    assert!(!submit.propagation_stopped());
    cbx.with_document(|doc| assert_eq!(doc.last_scroll(), None));
}

#[test]
fn test_submit_only_considers_fields_of_that_form() {
    let (mut doc, form, boxes) = login_form();
    let root = doc.root();
    let other_form = doc.append(root, Element::new("form")).unwrap();
    text_input(&mut doc, other_form, "search", "");
    let search_box = constraint_box("#search", "minTextLength")
        .param("1")
        .top(5.0)
        .append(&mut doc, other_form);
    let cbx = CbxBuilder::new().install(doc).unwrap();

    let mut submit = ActionEvent::new(EventKind::Submit, form);
    let outcome = cbx.handle(&mut submit).unwrap().unwrap();

    assert_eq!(outcome.blocking, boxes);
    cbx.with_document(|doc| assert!(!is_visible(doc, search_box)));
}

#[test]
fn test_click_validates_named_fields_only() {
    let (mut doc, form, boxes) = login_form();
    let button = doc
        .append(form, Element::new("button").attr("data-click-validates", "#password"))
        .unwrap();
    let cbx = CbxBuilder::new().install(doc).unwrap();

    let mut click = ActionEvent::new(EventKind::Click, button);
    let outcome = cbx.handle(&mut click).unwrap().unwrap();

    assert_eq!(outcome.checked.len(), 1);
    assert_eq!(outcome.blocking, vec![boxes[1]]);
    assert_eq!(outcome.scroll_to, Some(120.0));
    assert!(click.default_prevented());
}

#[test]
fn test_non_cancelable_action_is_still_reported() {
    let (doc, form, _) = login_form();
    let cbx = CbxBuilder::new().install(doc).unwrap();

    let mut submit = ActionEvent::new(EventKind::Submit, form).non_cancelable();
    let outcome = cbx.handle(&mut submit).unwrap().unwrap();

    assert!(outcome.blocked());
    assert!(!submit.default_prevented());
    assert!(submit.propagation_stopped());
}

#[test]
fn test_unknown_constraint_blocks_submission() {
    let mut doc = MemoryDocument::new();
    let form = form(&mut doc);
    text_input(&mut doc, form, "code", "anything");
    let node = constraint_box("#code", "minFoo")
        .message("misconfigured")
        .top(30.0)
        .append(&mut doc, form);
    let cbx = CbxBuilder::new().install(doc).unwrap();

    let mut submit = ActionEvent::new(EventKind::Submit, form);
    let outcome = cbx.handle(&mut submit).unwrap().unwrap();

    assert_eq!(outcome.blocking, vec![node]);
    cbx.with_document(|doc| assert_eq!(doc.content(node), Some("misconfigured")));
}

#[test]
fn test_blank_triggers_still_guard_their_fields() {
    let mut doc = MemoryDocument::new();
    let form = form(&mut doc);
    text_input(&mut doc, form, "nick", "");
    let node = constraint_box("#nick", "minTextLength")
        .param("1")
        .triggers("")
        .top(20.0)
        .append(&mut doc, form);
    let cbx = CbxBuilder::new().install(doc).unwrap();

    let mut submit = ActionEvent::new(EventKind::Submit, form);
    let outcome = cbx.handle(&mut submit).unwrap().unwrap();

    assert_eq!(outcome.blocking, vec![node]);
    assert!(submit.default_prevented());
}

/// Newsletter checkbox revealing a required email box nested in it
fn newsletter_form() -> (MemoryDocument, cbx_dom::NodeId, cbx_dom::NodeId, cbx_dom::NodeId) {
    let mut doc = MemoryDocument::new();
    let form = form(&mut doc);
    let newsletter = checkbox_group(&mut doc, form, "newsletter", 1, &[])[0];
    text_input(&mut doc, form, "email", "");
    let outer = constraint_box("#newsletter-0", "maxSet")
        .param("0")
        .top(10.0)
        .append(&mut doc, form);
    let inner = constraint_box("#email", "minTextLength")
        .param("1")
        .message("email is required")
        .class("cbx--error")
        .top(40.0)
        .append(&mut doc, outer);
    (doc, form, newsletter, inner)
}

#[test]
fn test_invalid_child_of_hidden_parent_does_not_block() {
    let (doc, form, _, inner) = newsletter_form();
    let cbx = CbxBuilder::new().error_marker("cbx--error").install(doc).unwrap();

    let mut submit = ActionEvent::new(EventKind::Submit, form);
    let outcome = cbx.handle(&mut submit).unwrap().unwrap();

    assert_eq!(outcome.checked.len(), 2);
    assert!(!outcome.blocked());
    cbx.with_document(|doc| {
        assert!(is_visible(doc, inner));
        assert!(!doc.is_rendered(inner));
    });
}

#[test]
fn test_invalid_child_of_shown_parent_blocks() {
    let (mut doc, form, newsletter, inner) = newsletter_form();
    doc.set_checked(newsletter, true);
    let cbx = CbxBuilder::new().error_marker("cbx--error").install(doc).unwrap();

    let mut submit = ActionEvent::new(EventKind::Submit, form);
    let outcome = cbx.handle(&mut submit).unwrap().unwrap();

    assert_eq!(outcome.blocking, vec![inner]);
    assert_eq!(outcome.scroll_to, Some(40.0));
}

#[test]
fn test_select_counts_selected_options() {
    let mut doc = MemoryDocument::new();
    let form = form(&mut doc);
    let lang = select(&mut doc, form, "lang", &["", "rust", "go"], Some(0));
    let node = constraint_box("#lang", "minSet")
        .param("1")
        .message("pick a language")
        .append(&mut doc, form);
    let cbx = CbxBuilder::new().install(doc).unwrap();

    let mut submit = ActionEvent::new(EventKind::Submit, form);
    assert!(cbx.handle(&mut submit).unwrap().unwrap().blocked());

    cbx.with_document(|doc| {
        let rust = doc.options(lang)[1];
        doc.set_selected(rust, true);
    });
    let mut submit = ActionEvent::new(EventKind::Submit, form);
    assert!(!cbx.handle(&mut submit).unwrap().unwrap().blocked());
    cbx.with_document(|doc| assert!(!is_visible(doc, node)));
}

#[test]
fn test_configured_prefix_drives_markers() {
    let mut doc = MemoryDocument::new();
    let form = form(&mut doc);
    text_input(&mut doc, form, "name", "");
    let node = doc
        .append(
            form,
            Element::new("div")
                .class("chk")
                .attr("data-selectors", "#name")
                .attr("data-constraint", "minTextLength")
                .attr("data-param", "1"),
        )
        .unwrap();
    let config = EngineConfig::from_toml_str("class_prefix = \"chk\"").unwrap();
    let cbx = CbxBuilder::new().config(config).install(doc).unwrap();

    let mut submit = ActionEvent::new(EventKind::Submit, form);
    let outcome = cbx.handle(&mut submit).unwrap().unwrap();

    assert_eq!(outcome.blocking, vec![node]);
    cbx.with_document(|doc| {
        assert!(doc.has_class(node, "chk--visible"));
        let rule = doc.hide_rules().next().map(|r| r.selector.as_str());
        assert_eq!(rule, Some(".chk:not(.chk--visible)"));
    });
}
