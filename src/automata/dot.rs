//! Facilities to generate a DOT representation of a minimal automaton.

use std::io;

use super::MinimalDfa;
use crate::Symbol;

type Edge = (usize, Symbol, usize);

impl<'a> dot::Labeller<'a, usize, Edge> for MinimalDfa {
    fn graph_id(&'a self) -> dot::Id<'a> {
        dot::Id::new("automaton").expect("valid graph identifier")
    }

    fn node_id(&'a self, n: &usize) -> dot::Id<'a> {
        dot::Id::new(format!("q{}", n)).expect("valid node identifier")
    }

    fn node_shape(&'a self, node: &usize) -> Option<dot::LabelText<'a>> {
        if self.is_final(*node) {
            return Some(dot::LabelText::LabelStr("doublecircle".into()));
        }
        None
    }

    fn node_label(&'a self, n: &usize) -> dot::LabelText<'a> {
        if *n == 0 {
            return dot::LabelText::LabelStr(format!("{} (Init)", self.node_id(n).name()).into());
        }
        dot::LabelText::LabelStr(self.node_id(n).name())
    }

    fn edge_label(&'a self, e: &Edge) -> dot::LabelText<'a> {
        dot::LabelText::LabelStr(e.1.to_string().into())
    }

    fn kind(&self) -> dot::Kind {
        dot::Kind::Digraph
    }
}

impl<'a> dot::GraphWalk<'a, usize, Edge> for MinimalDfa {
    fn nodes(&'a self) -> dot::Nodes<'a, usize> {
        (0..self.num_states()).collect::<Vec<_>>().into()
    }

    fn edges(&'a self) -> dot::Edges<'a, Edge> {
        self.transitions()
            .map(|(src, symbol, dst)| (src, symbol.clone(), dst))
            .collect::<Vec<_>>()
            .into()
    }

    fn source(&'a self, edge: &Edge) -> usize {
        edge.0
    }

    fn target(&'a self, edge: &Edge) -> usize {
        edge.2
    }
}

impl MinimalDfa {
    /// Renders the automaton in the DOT format of Graphviz.
    ///
    /// Final states are drawn as double circles and the start state is labeled `(Init)`.
    /// The rejecting sink, if any, is included.
    pub fn dot(&self) -> io::Result<String> {
        let mut buf = Vec::new();
        dot::render(self, &mut buf)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use crate::Automaton;

    #[test]
    fn test_dot_marks_start_and_finals() {
        let dfa = Automaton::atomic("a").minimize().unwrap();
        let dot = dfa.dot().unwrap();
        assert!(dot.starts_with("digraph automaton {"));
        assert!(dot.contains("q0 (Init)"));
        assert_eq!(dot.matches("doublecircle").count(), 1);
        // one edge per state on the only symbol
        assert_eq!(dot.matches("->").count(), 3);
        assert!(dot.contains("q0 -> q1"));
    }
}
