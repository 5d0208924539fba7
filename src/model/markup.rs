//! Compact text form of a model tree and its selection.
//!
//! `<paragraph>He[llo</paragraph><heading1>Wor]ld</heading1>` describes a
//! root with two blocks and a selection from offset 2 of the first block to
//! offset 3 of the second. `[]` marks a collapsed selection. Text attributes
//! are written as `<$text bold="true">...</$text>`. The root element itself
//! is implicit. The characters `<`, `[` and `]` cannot appear in text.

use crate::error::ModelError;

use super::{Attributes, Element, Node, Position, ROOT, Range, Selection, TEXT, Text};

/// Renders the children of `root`, with selection markers for the first
/// range of `selection`.
pub fn stringify(root: &Element, selection: Option<&Selection>) -> String {
    let markers = selection.map(|selection| {
        let range = selection.first_range();
        (range.start().clone(), range.end().clone())
    });
    let mut out = String::new();
    let mut path = Vec::new();
    write_children(root, &mut path, markers.as_ref(), &mut out);
    out
}

fn write_markers(
    path: &[usize],
    offset: usize,
    markers: Option<&(Position, Position)>,
    out: &mut String,
) {
    let Some((start, end)) = markers else {
        return;
    };
    let here = Position::at(path, offset);
    if *start == here {
        out.push('[');
    }
    if *end == here {
        out.push(']');
    }
}

fn write_children(
    element: &Element,
    path: &mut Vec<usize>,
    markers: Option<&(Position, Position)>,
    out: &mut String,
) {
    let mut offset = 0;
    write_markers(path, offset, markers, out);
    for child in element.children() {
        match child {
            Node::Element(child) => {
                out.push('<');
                out.push_str(child.name());
                write_attributes(child.attributes(), out);
                out.push('>');
                path.push(offset);
                write_children(child, path, markers, out);
                path.pop();
                out.push_str("</");
                out.push_str(child.name());
                out.push('>');
                offset += 1;
            }
            Node::Text(text) => {
                let styled = !text.attributes().is_empty();
                if styled {
                    out.push('<');
                    out.push_str(TEXT);
                    write_attributes(text.attributes(), out);
                    out.push('>');
                }
                let len = text.len();
                for (idx, ch) in text.data().chars().enumerate() {
                    out.push(ch);
                    offset += 1;
                    if idx + 1 < len {
                        write_markers(path, offset, markers, out);
                    }
                }
                if styled {
                    out.push_str("</");
                    out.push_str(TEXT);
                    out.push('>');
                }
            }
        }
        write_markers(path, offset, markers, out);
    }
}

fn write_attributes(attributes: &Attributes, out: &mut String) {
    for (key, value) in attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }
}

enum Frame {
    Element { element: Element, offset: usize },
    TextAttributes(Attributes),
}

/// Parses markup into a root element and the selection it marks, if any.
pub fn parse_markup(markup: &str) -> Result<(Element, Option<Selection>), ModelError> {
    let mut stack: Vec<Frame> = vec![Frame::Element {
        element: Element::new(ROOT),
        offset: 0,
    }];
    let mut start: Option<Position> = None;
    let mut end: Option<Position> = None;
    let mut chars = markup.char_indices();

    while let Some((at, ch)) = chars.next() {
        match ch {
            '<' => {
                let mut tag = String::new();
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if next == '>' {
                        closed = true;
                        break;
                    }
                    tag.push(next);
                }
                if !closed {
                    return Err(markup_error(at, "unterminated tag"));
                }
                if let Some(name) = tag.strip_prefix('/') {
                    close_tag(&mut stack, name.trim(), at)?;
                } else {
                    open_tag(&mut stack, &tag, at)?;
                }
            }
            '[' | ']' => {
                let (path, offset) = current_location(&stack);
                let position = Position::at(&path, offset);
                let slot = if ch == '[' { &mut start } else { &mut end };
                if slot.replace(position).is_some() {
                    return Err(markup_error(at, "duplicate selection marker"));
                }
            }
            _ => {
                let attributes = current_text_attributes(&stack);
                let element = current_element(&mut stack, at)?;
                element.push_child(Node::Text(Text::new(ch).with_attributes(attributes)));
            }
        }
    }

    if stack.len() != 1 {
        return Err(markup_error(markup.len(), "unclosed element"));
    }
    let root = match stack.pop() {
        Some(Frame::Element { element, .. }) => element,
        _ => return Err(markup_error(markup.len(), "unclosed element")),
    };
    let selection = match (start, end) {
        (Some(start), Some(end)) => Some(Selection::from_range(Range::new(start, end), false)),
        (None, None) => None,
        _ => return Err(markup_error(markup.len(), "unbalanced selection markers")),
    };
    Ok((root, selection))
}

fn markup_error(offset: usize, message: &str) -> ModelError {
    ModelError::Markup {
        offset,
        message: message.to_string(),
    }
}

fn open_tag(stack: &mut Vec<Frame>, tag: &str, at: usize) -> Result<(), ModelError> {
    let mut parts = tag.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    if name.is_empty() {
        return Err(markup_error(at, "empty tag name"));
    }
    let attributes = parse_attributes(parts.next().unwrap_or_default(), at)?;
    if name == TEXT {
        stack.push(Frame::TextAttributes(attributes));
        return Ok(());
    }
    let (_, offset) = current_location(stack);
    let mut element = Element::new(name);
    element.attributes = attributes;
    stack.push(Frame::Element { element, offset });
    Ok(())
}

fn close_tag(stack: &mut Vec<Frame>, name: &str, at: usize) -> Result<(), ModelError> {
    if stack.len() < 2 {
        return Err(markup_error(at, "closing tag without opening tag"));
    }
    match stack.pop() {
        Some(Frame::TextAttributes(_)) if name == TEXT => Ok(()),
        Some(Frame::Element { element, .. }) if element.name() == name => {
            current_element(stack, at)?.push_child(Node::Element(element));
            Ok(())
        }
        _ => Err(markup_error(at, "mismatched closing tag")),
    }
}

fn parse_attributes(source: &str, at: usize) -> Result<Attributes, ModelError> {
    let mut attributes = Attributes::new();
    let mut rest = source.trim();
    while !rest.is_empty() {
        let (key, after_key) = rest
            .split_once("=\"")
            .ok_or_else(|| markup_error(at, "malformed attribute"))?;
        let (value, after_value) = after_key
            .split_once('"')
            .ok_or_else(|| markup_error(at, "unterminated attribute value"))?;
        attributes.insert(key.trim().to_string(), value.to_string());
        rest = after_value.trim_start();
    }
    Ok(attributes)
}

fn current_element(stack: &mut [Frame], at: usize) -> Result<&mut Element, ModelError> {
    stack
        .iter_mut()
        .rev()
        .find_map(|frame| match frame {
            Frame::Element { element, .. } => Some(element),
            Frame::TextAttributes(_) => None,
        })
        .ok_or_else(|| markup_error(at, "text outside of any element"))
}

fn current_text_attributes(stack: &[Frame]) -> Attributes {
    let mut attributes = Attributes::new();
    for frame in stack {
        if let Frame::TextAttributes(frame_attributes) = frame {
            attributes.extend(frame_attributes.clone());
        }
    }
    attributes
}

/// Path of the innermost open element and the offset at its end.
fn current_location(stack: &[Frame]) -> (Vec<usize>, usize) {
    let mut path = Vec::new();
    let mut innermost_size = 0;
    for (depth, frame) in stack.iter().enumerate() {
        if let Frame::Element { element, offset } = frame {
            if depth > 0 {
                path.push(*offset);
            }
            innermost_size = element.max_offset();
        }
    }
    (path, innermost_size)
}
