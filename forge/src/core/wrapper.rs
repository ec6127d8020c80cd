//! Top-level embedding patterns for the synthesized expression.

use serde::Serialize;

/// Marker replaced by the inner expression.
const SLOT: &str = "PAYLOAD";

/// A way to make the template engine evaluate an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Wrapper {
    /// Text probed against the oracle to see if the pattern survives.
    pub probe: &'static str,
    pub pattern: &'static str,
    /// Whether the evaluated value shows up in the rendered output.
    pub visible: bool,
}

/// Candidate wrappers in priority order.
pub const WRAPPERS: [Wrapper; 4] = [
    Wrapper {
        probe: "{{}}",
        pattern: "{{PAYLOAD}}",
        visible: true,
    },
    Wrapper {
        probe: "{%print()%}",
        pattern: "{%print(PAYLOAD)%}",
        visible: true,
    },
    Wrapper {
        probe: "{%if()%}{%endif%}",
        pattern: "{%if(PAYLOAD)%}{%endif%}",
        visible: false,
    },
    Wrapper {
        probe: "{% set x= %}",
        pattern: "{% set x=PAYLOAD %}",
        visible: false,
    },
];

impl Wrapper {
    /// Substitute `inner` into the pattern. A leading `-` right after `{{`
    /// would read as a whitespace-control marker, so it is spaced off.
    pub fn embed(&self, inner: &str) -> String {
        let Some((head, tail)) = self.pattern.split_once(SLOT) else {
            return self.pattern.to_string();
        };
        let gap = if inner.starts_with('-') && (head.ends_with("{{") || head.ends_with("{%")) {
            " "
        } else {
            ""
        };
        format!("{head}{gap}{inner}{tail}")
    }
}

/// First wrapper whose probe the oracle accepts.
pub fn select_wrapper(mut accepts: impl FnMut(&str) -> bool) -> Option<Wrapper> {
    WRAPPERS.into_iter().find(|wrapper| accepts(wrapper.probe))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolation_is_preferred() {
        let wrapper = select_wrapper(|_| true).expect("wrapper");
        assert_eq!(wrapper.embed("7*7"), "{{7*7}}");
        assert!(wrapper.visible);
    }

    #[test]
    fn falls_back_to_assignment() {
        let wrapper = select_wrapper(|text| {
            !text.contains("{{") && !text.contains("print") && !text.contains("if")
        })
        .expect("assignment wrapper");
        assert_eq!(wrapper.embed("a"), "{% set x=a %}");
        assert!(!wrapper.visible);
    }

    #[test]
    fn leading_minus_is_spaced_from_the_delimiter() {
        let [interpolation, print, _, assignment] = WRAPPERS;
        assert_eq!(interpolation.embed("-5"), "{{ -5}}");
        assert_eq!(interpolation.embed("5-1"), "{{5-1}}");
        assert_eq!(print.embed("-5"), "{%print(-5)%}");
        assert_eq!(assignment.embed("-5"), "{% set x=-5 %}");
    }

    #[test]
    fn nothing_accepted_yields_none() {
        assert!(select_wrapper(|_| false).is_none());
    }
}
