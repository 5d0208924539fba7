//! Builds a model tree from a `tdoc` document.
//!
//! Lists become flat `listItem` blocks carrying `listType` and `listIndent`,
//! so every list entry is a text block directly inside its container.

use tdoc::{ChecklistItem, Document, InlineStyle, Paragraph, Span};

use super::{Attributes, Element, Node, ROOT, Text};

pub fn import_tdoc(document: &Document) -> Element {
    let mut children = Vec::new();
    for paragraph in &document.paragraphs {
        import_paragraph(paragraph, &mut children);
    }
    Element::new(ROOT).with_children(children)
}

fn import_paragraph(paragraph: &Paragraph, out: &mut Vec<Node>) {
    match paragraph {
        Paragraph::Text { content } => out.push(text_block("paragraph", content)),
        Paragraph::Header1 { content } => out.push(text_block("heading1", content)),
        Paragraph::Header2 { content } => out.push(text_block("heading2", content)),
        Paragraph::Header3 { content } => out.push(text_block("heading3", content)),
        Paragraph::CodeBlock { content } => out.push(text_block("codeBlock", content)),
        Paragraph::Quote { children } => {
            let mut nested = Vec::new();
            for child in children {
                import_paragraph(child, &mut nested);
            }
            out.push(Node::Element(
                Element::new("blockQuote").with_children(nested),
            ));
        }
        Paragraph::OrderedList { entries } => import_entries(entries, "numbered", 0, out),
        Paragraph::UnorderedList { entries } => import_entries(entries, "bulleted", 0, out),
        Paragraph::Checklist { items } => import_checklist(items, 0, out),
    }
}

fn import_entries(entries: &[Vec<Paragraph>], list_type: &str, indent: usize, out: &mut Vec<Node>) {
    for entry in entries {
        for paragraph in entry {
            match paragraph {
                Paragraph::Text { content }
                | Paragraph::Header1 { content }
                | Paragraph::Header2 { content }
                | Paragraph::Header3 { content }
                | Paragraph::CodeBlock { content } => {
                    out.push(list_item(list_type, indent, content));
                }
                Paragraph::OrderedList { entries } => {
                    import_entries(entries, "numbered", indent + 1, out);
                }
                Paragraph::UnorderedList { entries } => {
                    import_entries(entries, "bulleted", indent + 1, out);
                }
                Paragraph::Checklist { items } => import_checklist(items, indent + 1, out),
                Paragraph::Quote { .. } => import_paragraph(paragraph, out),
            }
        }
    }
}

fn import_checklist(items: &[ChecklistItem], indent: usize, out: &mut Vec<Node>) {
    for item in items {
        let mut element = Element::new("listItem")
            .with_attribute("listType", "todo")
            .with_attribute("listIndent", indent.to_string());
        if item.checked {
            element = element.with_attribute("listChecked", "true");
        }
        out.push(Node::Element(element.with_children(import_spans(&item.content))));
        import_checklist(&item.children, indent + 1, out);
    }
}

fn text_block(name: &str, content: &[Span]) -> Node {
    Node::Element(Element::new(name).with_children(import_spans(content)))
}

fn list_item(list_type: &str, indent: usize, content: &[Span]) -> Node {
    Node::Element(
        Element::new("listItem")
            .with_attribute("listType", list_type)
            .with_attribute("listIndent", indent.to_string())
            .with_children(import_spans(content)),
    )
}

fn import_spans(spans: &[Span]) -> Vec<Node> {
    let mut out = Vec::new();
    flatten_spans(spans, &Attributes::new(), &mut out);
    out
}

fn flatten_spans(spans: &[Span], inherited: &Attributes, out: &mut Vec<Node>) {
    for span in spans {
        let mut attributes = inherited.clone();
        if let Some(key) = style_attribute(span.style) {
            attributes.insert(key.to_string(), "true".to_string());
        }
        if let Some(target) = &span.link_target {
            attributes.insert("linkHref".to_string(), target.to_string());
        }
        if !span.text.is_empty() {
            out.push(Node::Text(
                Text::new(span.text.clone()).with_attributes(attributes.clone()),
            ));
        }
        flatten_spans(&span.children, &attributes, out);
    }
}

/// Text attribute for an inline style. Links are carried by `linkHref`.
fn style_attribute(style: InlineStyle) -> Option<&'static str> {
    match style {
        InlineStyle::None | InlineStyle::Link => None,
        InlineStyle::Bold => Some("bold"),
        InlineStyle::Italic => Some("italic"),
        InlineStyle::Highlight => Some("highlight"),
        InlineStyle::Underline => Some("underline"),
        InlineStyle::Strike => Some("strikethrough"),
        InlineStyle::Code => Some("code"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stringify;

    fn text_paragraph(text: &str) -> Paragraph {
        Paragraph::new_text().with_content(vec![Span::new_text(text)])
    }

    #[test]
    fn imports_text_paragraphs_and_quotes() {
        let quote = Paragraph::new_quote().with_children(vec![text_paragraph("Nested")]);
        let document = Document::new().with_paragraphs(vec![text_paragraph("Hello"), quote]);
        let root = import_tdoc(&document);
        assert_eq!(
            stringify(&root, None),
            "<paragraph>Hello</paragraph><blockQuote><paragraph>Nested</paragraph></blockQuote>"
        );
    }

    #[test]
    fn imports_lists_as_flat_items() {
        let nested = Paragraph::new_unordered_list().with_entries(vec![vec![text_paragraph("b")]]);
        let list = Paragraph::new_ordered_list()
            .with_entries(vec![vec![text_paragraph("a"), nested]]);
        let root = import_tdoc(&Document::new().with_paragraphs(vec![list]));
        assert_eq!(
            stringify(&root, None),
            "<listItem listIndent=\"0\" listType=\"numbered\">a</listItem>\
             <listItem listIndent=\"1\" listType=\"bulleted\">b</listItem>"
        );
    }

    #[test]
    fn imports_checklist_state_and_nesting() {
        let child = ChecklistItem::new(true).with_content(vec![Span::new_text("child")]);
        let mut parent = ChecklistItem::new(false).with_content(vec![Span::new_text("parent")]);
        parent.children = vec![child];
        let checklist = Paragraph::new_checklist().with_checklist_items(vec![parent]);
        let root = import_tdoc(&Document::new().with_paragraphs(vec![checklist]));
        assert_eq!(
            stringify(&root, None),
            "<listItem listIndent=\"0\" listType=\"todo\">parent</listItem>\
             <listItem listChecked=\"true\" listIndent=\"1\" listType=\"todo\">child</listItem>"
        );
    }

    #[test]
    fn inline_styles_become_text_attributes() {
        let mut bold = Span::new_text("World");
        bold.style = InlineStyle::Bold;
        let paragraph =
            Paragraph::new_text().with_content(vec![Span::new_text("Hello "), bold, Span::new_text("!")]);
        let root = import_tdoc(&Document::new().with_paragraphs(vec![paragraph]));
        assert_eq!(
            stringify(&root, None),
            "<paragraph>Hello <$text bold=\"true\">World</$text>!</paragraph>"
        );
    }

    #[test]
    fn empty_spans_leave_an_empty_block() {
        let root = import_tdoc(&Document::new().with_paragraphs(vec![text_paragraph("")]));
        let paragraph = root.descendant(&[0]).unwrap();
        assert!(paragraph.is_empty());
    }
}
