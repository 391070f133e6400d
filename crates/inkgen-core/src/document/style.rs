//! Ordered `style` attribute declarations.

use std::fmt;

/// Ordered `property:value` declarations of an SVG `style` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    declarations: Vec<(String, String)>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `a:b;c:d`. Malformed declarations are skipped.
    pub fn parse(source: &str) -> Self {
        let declarations = source
            .split(';')
            .filter_map(|decl| {
                let (name, value) = decl.split_once(':')?;
                let name = name.trim();
                let value = value.trim();
                (!name.is_empty()).then(|| (name.to_string(), value.to_string()))
            })
            .collect();
        Self { declarations }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets a declaration, keeping its position if it already exists.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.declarations.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => self.declarations.push((name.to_string(), value)),
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.declarations.retain(|(key, _)| key != name);
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{name}:{value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_roundtrip_order() {
        let style = Style::parse("font-size:12px; fill : #000 ;;bogus;stroke:none");
        assert_eq!(style.get("fill"), Some("#000"));
        assert_eq!(style.to_string(), "font-size:12px;fill:#000;stroke:none");
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut style = Style::parse("font-size:12px;fill:red");
        style.set("font-size", "24px");
        style.set("stroke", "none");
        assert_eq!(style.to_string(), "font-size:24px;fill:red;stroke:none");
        style.remove("fill");
        assert_eq!(style.get("fill"), None);
    }
}
