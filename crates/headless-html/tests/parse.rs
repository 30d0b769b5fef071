//! Parsing real markup through html5ever into the DOM

use headless_dom::{DocumentMode, DomError, ElementKind, ElementQuery, Node, NodeType};

#[test]
fn builds_implied_structure() {
    let doc = headless_html::parse("<!DOCTYPE html><title>Hi</title><p id=x>one<b>two</b></p>")
        .unwrap();

    let html = doc.document_element().unwrap();
    assert_eq!(doc.element(html).unwrap().tag_name(), "HTML");
    assert!(doc.head().is_some());
    assert!(doc.body().is_some());
    assert_eq!(doc.title().unwrap(), "Hi");

    let p = doc.get_element_by_id("x").unwrap();
    assert_eq!(doc.tree().text_content(p), "onetwo");
    assert_eq!(doc.tree().parent(p), doc.body());
}

#[test]
fn records_doctype_and_mode() {
    let standards = headless_html::parse("<!DOCTYPE html><p>x").unwrap();
    let doctype = standards.doctype().unwrap();
    assert_eq!(doctype.name, "html");
    assert_eq!(standards.mode(), DocumentMode::NoQuirks);
    assert_eq!(standards.compat_mode(), "CSS1Compat");

    let quirks = headless_html::parse("<p>no doctype").unwrap();
    assert!(quirks.doctype().is_none());
    assert_eq!(quirks.mode(), DocumentMode::Quirks);
    assert_eq!(quirks.compat_mode(), "BackCompat");
}

#[test]
fn missing_title_is_an_error() {
    let doc = headless_html::parse("<html><body>hi</body></html>").unwrap();
    assert_eq!(doc.title(), Err(DomError::MissingElement("title")));
}

#[test]
fn specializes_element_variants() {
    let doc = headless_html::parse(
        r#"<a href="/x">a</a><img src="i.png"><form><input type=checkbox checked>
           <select><option>One</option><option value=2 selected>Two</option></select>
           <textarea>text</textarea><button>b</button></form><div></div>"#,
    )
    .unwrap();

    let kinds: Vec<ElementKind> = doc
        .tree()
        .descendants(doc.root())
        .filter_map(|id| doc.element(id))
        .map(|e| e.kind())
        .filter(|&k| k != ElementKind::Generic)
        .collect();
    assert_eq!(
        kinds,
        vec![
            ElementKind::Anchor,
            ElementKind::Image,
            ElementKind::Form,
            ElementKind::Input,
            ElementKind::Select,
            ElementKind::Option,
            ElementKind::Option,
            ElementKind::TextArea,
            ElementKind::Button,
        ]
    );

    let form = doc.get_elements_by_tag_name("form").item(0).unwrap();
    let form = doc.element(form).unwrap();
    assert_eq!(form.as_form().unwrap().elements().len(), 4);

    let select = doc.query_selector("select").unwrap().unwrap();
    let options = doc.element(select).unwrap().as_select().unwrap().options();
    assert_eq!(options[0].value(), "One");
    assert_eq!(options[1].value(), "2");
    assert!(options[1].selected());

    let checked = doc.query_selector(":checked").unwrap().unwrap();
    assert_eq!(doc.element(checked).unwrap().kind(), ElementKind::Input);
}

#[test]
fn keeps_text_nodes_merged() {
    let doc = headless_html::parse("<p>a&amp;b c</p>").unwrap();
    let p = doc.query_selector("p").unwrap().unwrap();
    let children: Vec<_> = doc.tree().children(p).collect();
    assert_eq!(children.len(), 1);
    let text = doc.tree().get(children[0]).unwrap();
    assert_eq!(text.node_type(), NodeType::Text);
    assert_eq!(text.as_text(), Some("a&b c"));
}

#[test]
fn misnested_markup_stays_consistent() {
    let doc = headless_html::parse("<b>1<p>2</b>3</p><table><tr><td>x</td></tr>y</table>").unwrap();
    let tree = doc.tree();

    for id in tree.descendants(doc.root()) {
        let forward: Vec<_> = tree.children(id).collect();
        let mut backward = Vec::new();
        let mut cursor = tree.get(id).and_then(Node::last_child);
        while let Some(c) = cursor {
            backward.push(c);
            cursor = tree.get(c).and_then(Node::previous_sibling);
        }
        backward.reverse();
        assert_eq!(forward, backward);
    }
    assert!(tree.text_content(doc.root()).contains('y'));
}

#[test]
fn template_contents_are_children() {
    let doc = headless_html::parse("<template><span>t</span></template>").unwrap();
    let template = doc.query_selector("template").unwrap().unwrap();
    let span = doc.tree().query_selector(template, "span").unwrap();
    assert!(span.is_some());
}

#[test]
fn base_uri_prefers_base_element() {
    let doc = headless_html::parse_with_base("<p>x", "/srv/site/index.html").unwrap();
    assert_eq!(doc.base_uri(), "/srv/site/index.html");

    let doc = headless_html::parse_with_base(
        "<head><base href='http://cdn.example/'></head>",
        "/srv/site/index.html",
    )
    .unwrap();
    assert_eq!(doc.base_uri(), "http://cdn.example/");
}

#[test]
fn collects_style_sheets_in_document_order() {
    let doc = headless_html::parse(
        r#"<head>
            <link rel=stylesheet href=a.css>
            <style>p { color: red }</style>
            <link rel=stylesheet href=b.css disabled>
            <link rel=icon href=favicon.ico>
        </head>"#,
    )
    .unwrap();

    let sheets = doc.style_sheets();
    assert_eq!(sheets.length(), 2);
    let link = sheets.item(0).unwrap();
    assert_eq!(doc.element(link.owner_node()).unwrap().tag_name(), "LINK");
    assert!(link.css_rules().is_none());
    let style = sheets.item(1).unwrap();
    assert_eq!(style.css_rules().unwrap()[0].selector_text.as_deref(), Some("p"));
}

#[test]
fn attribute_names_are_case_insensitive() {
    let doc = headless_html::parse("<div DATA-Role=main></div>").unwrap();
    let div = doc.query_selector("[data-role=main]").unwrap().unwrap();
    let div = doc.element(div).unwrap();
    assert_eq!(div.get_attribute("data-role"), Some("main"));
    assert_eq!(div.attributes().get_attribute_names(), vec!["data-role"]);
}
