//! Detached element tree and its XML serialization

/// An element detached from its document, with owned attributes and children
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SvgNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<SvgChild>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SvgChild {
    Element(SvgNode),
    Text(String),
}

impl SvgNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: SvgNode) -> Self {
        self.children.push(SvgChild::Element(child));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replace an attribute in place, or append it when absent.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(pos).1)
    }

    /// Make the element its own namespace root: `xmlns` and `xmlns:xlink`
    /// lead the attribute list.
    pub fn declare_namespaces(&mut self) {
        self.remove_attribute("xmlns");
        self.remove_attribute("xmlns:xlink");
        self.attributes
            .insert(0, ("xmlns".to_string(), SVG_NS.to_string()));
        self.attributes
            .insert(1, ("xmlns:xlink".to_string(), XLINK_NS.to_string()));
    }

    /// Direct element children
    pub fn child_elements(&self) -> impl Iterator<Item = &SvgNode> {
        self.children.iter().filter_map(|c| match c {
            SvgChild::Element(e) => Some(e),
            SvgChild::Text(_) => None,
        })
    }

    /// This element and all descendant elements in document order
    pub fn elements(&self) -> Vec<&SvgNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            let kids: Vec<&SvgNode> = node.child_elements().collect();
            stack.extend(kids.into_iter().rev());
        }
        out
    }

    /// Visit this element and all descendant elements in document order.
    pub fn for_each_element_mut<F: FnMut(&mut SvgNode)>(&mut self, f: &mut F) {
        f(self);
        for child in &mut self.children {
            if let SvgChild::Element(e) = child {
                e.for_each_element_mut(f);
            }
        }
    }

    /// Serialize as standalone XML markup.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attributes {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            escape_into(v, true, out);
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                SvgChild::Element(e) => e.write_xml(out),
                SvgChild::Text(t) => escape_into(t, false, out),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\n' if attribute => out.push_str("&#10;"),
            '\t' if attribute => out.push_str("&#9;"),
            '\u{a0}' => out.push_str("&#160;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SvgNode {
        SvgNode::new("svg")
            .with_attribute("viewBox", "0 0 10 10")
            .with_child(
                SvgNode::new("g")
                    .with_attribute("id", "a")
                    .with_child(SvgNode::new("rect").with_attribute("width", "5")),
            )
            .with_child(SvgNode::new("circle").with_attribute("r", "2"))
    }

    #[test]
    fn elements_are_in_document_order() {
        let tree = sample();
        let names: Vec<&str> = tree.elements().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["svg", "g", "rect", "circle"]);

        let mut seen = Vec::new();
        let mut tree = tree;
        tree.for_each_element_mut(&mut |n| seen.push(n.name.clone()));
        assert_eq!(seen, vec!["svg", "g", "rect", "circle"]);
    }

    #[test]
    fn serializes_with_escaping() {
        let mut node = SvgNode::new("text").with_attribute("font-family", "\"A&B\"");
        node.children.push(SvgChild::Text("1 < 2 & 3".into()));
        assert_eq!(
            node.to_xml(),
            "<text font-family=\"&quot;A&amp;B&quot;\">1 &lt; 2 &amp; 3</text>"
        );
    }

    #[test]
    fn empty_elements_self_close() {
        assert_eq!(SvgNode::new("path").with_attribute("d", "M0 0").to_xml(), "<path d=\"M0 0\"/>");
    }

    #[test]
    fn namespaces_lead_and_replace() {
        let mut node = sample().with_attribute("xmlns", "bogus");
        node.declare_namespaces();
        assert_eq!(node.attributes[0], ("xmlns".to_string(), SVG_NS.to_string()));
        assert_eq!(node.attributes[1].0, "xmlns:xlink");
        assert_eq!(node.attributes.iter().filter(|(k, _)| k == "xmlns").count(), 1);
    }

    #[test]
    fn set_attribute_replaces_in_place() {
        let mut node = sample();
        node.set_attribute("viewBox", "0 0 1 1");
        assert_eq!(node.attributes.len(), 1);
        assert_eq!(node.attribute("viewBox"), Some("0 0 1 1"));
        assert_eq!(node.remove_attribute("viewBox").as_deref(), Some("0 0 1 1"));
        assert!(node.attribute("viewBox").is_none());
    }
}
