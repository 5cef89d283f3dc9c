//! Element locators, rendered as Playwright locator expressions

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a scenario finds an element on the page.
///
/// Test ids, role names and CSS classes are the contract with the app and
/// are passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Locator {
    /// `data-testid` attribute
    TestId { id: String },

    /// ARIA role plus accessible name
    Role { role: String, name: String },

    /// Visible text; substring match unless `exact`
    Text {
        text: String,
        #[serde(default)]
        exact: bool,
    },

    /// Raw CSS selector
    Css { selector: String },

    /// `child` searched inside `parent`
    Within {
        parent: Box<Locator>,
        child: Box<Locator>,
    },

    /// Narrow `base` to elements containing `has_text`
    Filter { base: Box<Locator>, has_text: String },

    /// The `index`-th match of `base`
    Nth { base: Box<Locator>, index: usize },
}

impl Locator {
    pub fn test_id(id: &str) -> Self {
        Locator::TestId { id: id.to_string() }
    }

    pub fn button(name: &str) -> Self {
        Locator::Role {
            role: "button".to_string(),
            name: name.to_string(),
        }
    }

    pub fn text(text: &str) -> Self {
        Locator::Text {
            text: text.to_string(),
            exact: false,
        }
    }

    pub fn exact_text(text: &str) -> Self {
        Locator::Text {
            text: text.to_string(),
            exact: true,
        }
    }

    pub fn css(selector: &str) -> Self {
        Locator::Css {
            selector: selector.to_string(),
        }
    }

    pub fn child(self, child: Locator) -> Self {
        Locator::Within {
            parent: Box::new(self),
            child: Box::new(child),
        }
    }

    pub fn has_text(self, text: &str) -> Self {
        Locator::Filter {
            base: Box::new(self),
            has_text: text.to_string(),
        }
    }

    pub fn nth(self, index: usize) -> Self {
        Locator::Nth {
            base: Box::new(self),
            index,
        }
    }

    /// JavaScript expression evaluating to this locator on `page`
    pub fn to_js(&self) -> String {
        format!("page.{}", self.call_chain())
    }

    fn call_chain(&self) -> String {
        match self {
            Locator::TestId { id } => format!("getByTestId({})", js_str(id)),
            Locator::Role { role, name } => {
                format!("getByRole({}, {{ name: {} }})", js_str(role), js_str(name))
            }
            Locator::Text { text, exact: false } => format!("getByText({})", js_str(text)),
            Locator::Text { text, exact: true } => {
                format!("getByText({}, {{ exact: true }})", js_str(text))
            }
            Locator::Css { selector } => format!("locator({})", js_str(selector)),
            Locator::Within { parent, child } => {
                format!("{}.{}", parent.call_chain(), child.call_chain())
            }
            Locator::Filter { base, has_text } => {
                format!("{}.filter({{ hasText: {} }})", base.call_chain(), js_str(has_text))
            }
            Locator::Nth { base, index } => format!("{}.nth({})", base.call_chain(), index),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::TestId { id } => write!(f, "testid={}", id),
            Locator::Role { role, name } => write!(f, "role={}[name={:?}]", role, name),
            Locator::Text { text, exact } => {
                write!(f, "text={:?}", text)?;
                if *exact {
                    write!(f, "[exact]")?;
                }
                Ok(())
            }
            Locator::Css { selector } => write!(f, "{}", selector),
            Locator::Within { parent, child } => write!(f, "{} >> {}", parent, child),
            Locator::Filter { base, has_text } => write!(f, "{}[has-text={:?}]", base, has_text),
            Locator::Nth { base, index } => write!(f, "{} >> nth={}", base, index),
        }
    }
}

/// Quote a string as a JavaScript literal. JSON string syntax is valid JS.
pub(crate) fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Locator::test_id("loginHeader"), r#"page.getByTestId("loginHeader")"# ; "test id")]
    #[test_case(Locator::button("new blog"), r#"page.getByRole("button", { name: "new blog" })"# ; "role")]
    #[test_case(Locator::text("likes 3"), r#"page.getByText("likes 3")"# ; "text")]
    #[test_case(Locator::exact_text("Testuser"), r#"page.getByText("Testuser", { exact: true })"# ; "exact text")]
    #[test_case(Locator::css(".blogHeader").nth(2), r#"page.locator(".blogHeader").nth(2)"# ; "nth")]
    fn test_to_js(locator: Locator, expected: &str) {
        assert_eq!(locator.to_js(), expected);
    }

    #[test]
    fn test_filtered_child() {
        let locator = Locator::css(".blog")
            .has_text("A good blog Ada Lovelace")
            .child(Locator::button("show"));
        assert_eq!(
            locator.to_js(),
            r#"page.locator(".blog").filter({ hasText: "A good blog Ada Lovelace" }).getByRole("button", { name: "show" })"#
        );
    }

    #[test]
    fn test_strings_are_escaped() {
        let locator = Locator::text("it's a \"quote\"\n");
        assert_eq!(locator.to_js(), r#"page.getByText("it's a \"quote\"\n")"#);
    }

    #[test]
    fn test_display() {
        let locator = Locator::css(".blog").has_text("x").child(Locator::button("like"));
        assert_eq!(locator.to_string(), r#".blog[has-text="x"] >> role=button[name="like"]"#);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
by: within
parent:
  by: css
  selector: .blog
child:
  by: role
  role: button
  name: delete
"#;
        let locator: Locator = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(locator, Locator::css(".blog").child(Locator::button("delete")));
    }
}
