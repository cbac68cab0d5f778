use crate::book::Property;
use crate::dom_tree::{NodeData, NodeId};
use crate::{Document, QuireError, Result};

impl Document {
    /// Extract book properties from `<meta name content>` tags in the head.
    ///
    /// Properties keep the order in which their name first appears. When a
    /// name repeats, the contents are joined with a newline.
    pub fn extract_properties(&self) -> Vec<Property> {
        let mut properties: Vec<Property> = Vec::new();

        for (name, content) in self.meta_tags() {
            match properties.iter_mut().find(|p| p.key == name) {
                Some(existing) => {
                    existing.value.push('\n');
                    existing.value.push_str(content);
                }
                None => properties.push(Property::new(name, content)),
            }
        }

        properties
    }

    /// Get the content of the first meta tag with the given name
    pub fn meta_content(&self, name: &str) -> Option<String> {
        self.meta_tags().into_iter().find(|(n, _)| *n == name).map(|(_, content)| content.to_string())
    }

    /// Writes properties into the head as `<meta name content>` tags.
    ///
    /// A property already present with the same content, either as one tag
    /// or as the joined value of repeated tags, is left alone, so
    /// consolidating twice changes nothing.
    pub fn consolidate_metadata(&mut self, properties: &[Property]) -> Result<()> {
        let head = self.head().ok_or(QuireError::MissingElement("head"))?;

        for property in properties {
            let present = self.meta_tags().into_iter().any(|(n, c)| n == property.key && c == property.value)
                || self.extract_properties().contains(property);
            if present {
                continue;
            }
            self.tree_mut().append(
                head,
                NodeData::element("meta", &[("name", property.key.as_str()), ("content", property.value.as_str())]),
            );
        }

        Ok(())
    }

    /// `(name, content)` pairs of the head's meta tags, in document order.
    fn meta_tags(&self) -> Vec<(&str, &str)> {
        let Some(head) = self.head() else {
            return Vec::new();
        };
        let tree = self.tree();

        tree.descendants(head)
            .filter(|&id: &NodeId| tree.is_named(id, "meta"))
            .filter_map(|id| Some((tree.attr(id, "name")?, tree.attr(id, "content")?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML_WITH_META: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>A Basic Zhook</title>
            <meta name="title" content="A Basic Zhook">
            <meta name="creator" content="Peregrin Took">
            <meta name="creator" content="Meriadoc Brandybuck">
            <meta property="og:title" content="Ignored">
        </head>
        <body><h1>A Basic Zhook</h1></body>
        </html>
    "#;

    #[test]
    fn test_extract_properties() {
        let doc = Document::parse(HTML_WITH_META).unwrap();
        let properties = doc.extract_properties();

        assert_eq!(
            properties,
            vec![
                Property::new("title", "A Basic Zhook"),
                Property::new("creator", "Peregrin Took\nMeriadoc Brandybuck"),
            ]
        );
    }

    #[test]
    fn test_meta_content() {
        let doc = Document::parse(HTML_WITH_META).unwrap();
        assert_eq!(doc.meta_content("creator"), Some("Peregrin Took".to_string()));
        assert_eq!(doc.meta_content("og:title"), None);
    }

    #[test]
    fn test_consolidating_metadata() {
        let mut doc = Document::parse("<html><head><title>Foo</title></head><body><p>Foo</p></body></html>").unwrap();
        let properties = vec![Property::new("title", "Foo"), Property::new("creator", "Peregrin Took")];

        doc.consolidate_metadata(&properties).unwrap();
        doc.consolidate_metadata(&properties).unwrap();

        assert_eq!(
            doc.to_html(),
            "<html><head><title>Foo</title><meta name=\"title\" content=\"Foo\">\
             <meta name=\"creator\" content=\"Peregrin Took\"></head><body><p>Foo</p></body></html>"
        );
    }

    #[test]
    fn test_consolidating_joined_properties() {
        let mut doc = Document::parse(HTML_WITH_META).unwrap();
        let before = doc.to_html();
        let properties = doc.extract_properties();

        doc.consolidate_metadata(&properties).unwrap();
        assert_eq!(doc.to_html(), before);
    }

    #[test]
    fn test_no_meta() {
        let doc = Document::parse("<p>Nothing here</p>").unwrap();
        assert!(doc.extract_properties().is_empty());
    }
}
