//! Derivation trees: the resolved goals behind a payload, kept so callers can
//! inspect every sub-expression after the fact.

use serde::Serialize;

use crate::core::goal::Goal;
use crate::core::precedence::Precedence;

/// One resolved goal and the nodes its winning plan resolved into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub goal: Goal,
    /// Rule that expanded the goal, if a registered rule did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<&'static str>,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn leaf(goal: Goal, text: impl Into<String>) -> Self {
        Self {
            goal,
            rule: None,
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn realized_precedence(&self) -> Option<Precedence> {
        match &self.goal {
            Goal::Literal(_) | Goal::Unsatisfiable => None,
            goal if goal.has_variable_precedence() => realized_precedence(&self.children),
            goal => goal
                .fixed_precedence()
                .or_else(|| realized_precedence(&self.children)),
        }
    }
}

/// Precedence class a resolved forest realizes: the loosest binding class
/// found among the nodes that carry one.
///
/// Composite goals that can be lowered into calls (sums, products, access,
/// function calls) have no class of their own and report whatever their
/// winning plan realized. Bare literals carry no class.
pub fn realized_precedence(nodes: &[Node]) -> Option<Precedence> {
    nodes
        .iter()
        .filter_map(Node::realized_precedence)
        .min_by_key(|precedence| precedence.rank())
}

/// Concatenated text of a forest.
pub fn unparse(nodes: &[Node]) -> String {
    nodes.iter().map(|node| node.text.as_str()).collect()
}

/// Lazy post-order walk over every sub-expression of a forest.
///
/// Literal leaves and `Alternatives` groupings are yielded but not descended
/// into: their children are raw tokens rather than expressions.
pub struct Subexpressions<'a> {
    stack: Vec<(&'a Node, bool)>,
}

impl<'a> Subexpressions<'a> {
    pub fn new(nodes: &'a [Node]) -> Self {
        Self {
            stack: nodes.iter().rev().map(|node| (node, false)).collect(),
        }
    }
}

impl<'a> Iterator for Subexpressions<'a> {
    type Item = (&'a str, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, expanded)) = self.stack.pop() {
            if expanded || !descends(node) {
                return Some((node.text.as_str(), node));
            }
            self.stack.push((node, true));
            self.stack
                .extend(node.children.iter().rev().map(|child| (child, false)));
        }
        None
    }
}

fn descends(node: &Node) -> bool {
    !node.children.is_empty()
        && !matches!(node.goal, Goal::Literal(_) | Goal::Alternatives(_))
}

/// Every sub-expression, post-order.
pub fn subexpressions(nodes: &[Node]) -> Subexpressions<'_> {
    Subexpressions::new(nodes)
}

/// Sub-expressions the predicate flags, in post-order.
///
/// Used to bisect which part of an accepted payload breaks at render time:
/// the first hit is the smallest failing sub-expression.
pub fn find_bad_expressions<'a>(
    nodes: &'a [Node],
    mut is_bad: impl FnMut(&str) -> bool,
) -> Vec<(&'a str, &'a Node)> {
    subexpressions(nodes)
        .filter(|(text, _)| !text.is_empty() && is_bad(text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::goal::lit;

    fn expression(precedence: Precedence, text: &str) -> Node {
        Node {
            goal: Goal::Expression(precedence, vec![lit(text)]),
            rule: None,
            text: text.to_string(),
            children: vec![Node::leaf(lit(text), text)],
        }
    }

    fn sum_of(a: Node, b: Node, plus: &str) -> Node {
        let text = format!("{}{}{}", a.text, plus, b.text);
        let inner = Node {
            goal: Goal::Expression(Precedence::Plus, Vec::new()),
            rule: None,
            text: text.clone(),
            children: vec![a, Node::leaf(lit(plus), plus), b],
        };
        Node {
            goal: Goal::sum(Goal::Integer(1), Goal::Integer(2)),
            rule: Some("plus_infix"),
            text,
            children: vec![inner],
        }
    }

    #[test]
    fn composite_reports_realized_precedence() {
        let sum = sum_of(
            expression(Precedence::Atom, "1"),
            expression(Precedence::Atom, "2"),
            "+",
        );
        assert_eq!(sum.realized_precedence(), Some(Precedence::Plus));
    }

    #[test]
    fn forest_takes_loosest_class() {
        let nodes = vec![
            expression(Precedence::Access, "a.b"),
            Node::leaf(lit("|"), "|"),
            expression(Precedence::PlainFilter, "x|f"),
        ];
        assert_eq!(realized_precedence(&nodes), Some(Precedence::PlainFilter));
        assert_eq!(realized_precedence(&[Node::leaf(lit("x"), "x")]), None);
    }

    #[test]
    fn subexpressions_are_post_order() {
        let tree = vec![sum_of(
            expression(Precedence::Atom, "1"),
            expression(Precedence::Atom, "2"),
            "+",
        )];
        let texts: Vec<&str> = subexpressions(&tree).map(|(text, _)| text).collect();
        assert_eq!(texts, vec!["1", "1", "+", "2", "2", "1+2", "1+2"]);
    }

    #[test]
    fn subexpressions_restart_from_scratch() {
        let tree = vec![expression(Precedence::Atom, "x")];
        assert_eq!(subexpressions(&tree).count(), subexpressions(&tree).count());
    }

    #[test]
    fn alternatives_are_not_descended() {
        let grouping = Node {
            goal: Goal::Alternatives(Vec::new()),
            rule: None,
            text: "' '".into(),
            children: vec![Node::leaf(lit("' '"), "' '")],
        };
        let tree = [grouping];
        let texts: Vec<&str> = subexpressions(&tree).map(|(text, _)| text).collect();
        assert_eq!(texts, vec!["' '"]);
    }

    #[test]
    fn find_bad_expressions_reports_smallest_first() {
        let tree = vec![sum_of(
            expression(Precedence::Atom, "1"),
            expression(Precedence::Atom, "2"),
            "+",
        )];
        let bad = find_bad_expressions(&tree, |text| text.contains('2'));
        assert_eq!(bad.first().map(|(text, _)| *text), Some("2"));
        assert_eq!(unparse(&tree), "1+2");
    }
}
